//! Device control seam
//!
//! Everything the crate needs from the endpoint: monitor roles, the global
//! monitors layout mode, connector enumeration, video matrix routing, call
//! count and uptime. The concrete command protocol lives behind
//! [`DeviceControl`]; [`SimulatedDevice`] is an in-process endpoint.

mod simulated;

pub use simulated::{DeviceCommand, SimulatedDevice};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::error::DeviceError;

pub type ConnectorId = u32;
pub type SourceId = u32;

/// Declares a string-valued device setting. Known values get variants, any
/// other value the device reports is carried through `Other`.
macro_rules! device_value {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            /// Known values in presentation order
            pub fn template() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                    Self::Other(value) => value,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $(stringify!($variant) => Self::$variant,)+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

device_value! {
    /// Which layout a display attached to an output shows
    MonitorRole { Auto, First, Second, Third, PresentationOnly, Recorder }
}

device_value! {
    /// Global monitor layout mode
    MonitorsMode { Auto, Single, Dual, DualPresentationOnly, Triple, TriplePresentationOnly }
}

device_value! {
    /// Layout used when several sources share one matrix output
    MatrixLayout { Equal, Prominent }
}

impl Default for MatrixLayout {
    fn default() -> Self {
        Self::Equal
    }
}

/// How a matrix assignment combines with what the output already shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixMode {
    Replace,
    Add,
}

impl MatrixMode {
    /// First source of a route replaces, every later one adds
    pub fn for_position(position: usize) -> Self {
        if position == 0 {
            Self::Replace
        } else {
            Self::Add
        }
    }
}

impl fmt::Display for MatrixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("Replace"),
            Self::Add => f.write_str("Add"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixAssignment {
    pub output: ConnectorId,
    pub source: SourceId,
    pub mode: MatrixMode,
    pub layout: MatrixLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConnector {
    pub id: ConnectorId,
    pub monitor_role: MonitorRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConnector {
    pub id: SourceId,
    pub name: String,
}

#[async_trait]
pub trait DeviceControl: Send + Sync {
    async fn output_connectors(&self) -> Result<Vec<OutputConnector>, DeviceError>;

    async fn input_connectors(&self) -> Result<Vec<InputConnector>, DeviceError>;

    async fn monitor_role(&self, output: ConnectorId) -> Result<MonitorRole, DeviceError>;

    async fn set_monitor_role(
        &self,
        output: ConnectorId,
        role: &MonitorRole,
    ) -> Result<(), DeviceError>;

    async fn monitors_mode(&self) -> Result<MonitorsMode, DeviceError>;

    async fn set_monitors_mode(&self, mode: &MonitorsMode) -> Result<(), DeviceError>;

    /// Values the device accepts for an output's monitor role
    async fn monitor_role_values(&self) -> Result<Vec<MonitorRole>, DeviceError>;

    /// Values the device accepts for the monitors layout mode
    async fn monitors_mode_values(&self) -> Result<Vec<MonitorsMode>, DeviceError>;

    /// Ordering-sensitive: a sequence of assignments is not idempotent
    async fn assign_matrix(&self, assignment: &MatrixAssignment) -> Result<(), DeviceError>;

    async fn reset_matrix(&self, output: ConnectorId) -> Result<(), DeviceError>;

    async fn active_call_count(&self) -> Result<u32, DeviceError>;

    async fn uptime(&self) -> Result<Duration, DeviceError>;
}
