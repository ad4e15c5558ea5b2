//! Automatic triggers
//!
//! Host event subscriptions are armed once per process. The standby and
//! call-disconnect guards decide whether the Default preset should be
//! reapplied.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::device::DeviceControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subscription {
    CallDisconnect,
    PanelClicked,
    PromptResponse,
    StandbyState,
    TextInputResponse,
    WidgetAction,
}

impl Subscription {
    pub const ALL: [Subscription; 6] = [
        Self::CallDisconnect,
        Self::PanelClicked,
        Self::PromptResponse,
        Self::StandbyState,
        Self::TextInputResponse,
        Self::WidgetAction,
    ];
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    armed: BTreeSet<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// False, with a warning, if the kind was already armed
    pub fn arm(&mut self, kind: Subscription) -> bool {
        if !self.armed.insert(kind) {
            warn!(subscription = %kind, "Subscription already armed, ignoring");
            return false;
        }
        info!(subscription = %kind, "Subscription armed");
        true
    }

    pub fn start_all(&mut self) -> usize {
        let armed = Subscription::ALL
            .into_iter()
            .filter(|kind| self.arm(*kind))
            .count();
        info!(armed, total = self.armed.len(), "Subscriptions started");
        armed
    }

    pub fn is_armed(&self, kind: Subscription) -> bool {
        self.armed.contains(&kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyState {
    Off,
    Halfwake,
    EnteringStandby,
    Standby,
}

impl FromStr for StandbyState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Off" => Ok(Self::Off),
            "Halfwake" => Ok(Self::Halfwake),
            "EnteringStandby" => Ok(Self::EnteringStandby),
            "Standby" => Ok(Self::Standby),
            other => Err(format!("unknown standby state `{other}`")),
        }
    }
}

/// Preset to reapply after a standby transition
pub fn standby_target(state: StandbyState, default: Option<usize>) -> Option<usize> {
    match state {
        StandbyState::Off => default,
        _ => None,
    }
}

/// Preset to reapply after a call ends, only once no call remains active
pub async fn call_disconnect_target(
    device: &dyn DeviceControl,
    default: Option<usize>,
) -> Option<usize> {
    let default = default?;
    match device.active_call_count().await {
        Ok(0) => Some(default),
        Ok(calls) => {
            info!(calls, "Call ended but others remain active, keeping layout");
            None
        }
        Err(err) => {
            error!(error = %err, "Failed to read active call count, keeping layout");
            None
        }
    }
}
