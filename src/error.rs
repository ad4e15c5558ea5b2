//! Typed errors for preset, device, storage and UI operations.
//!
//! [`Error`] is the top-level library error. Validation failures turn into a
//! re-prompt of the dialog that produced them. Only [`Error::Malformed`] is
//! meant to reach the top.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ui(#[from] UiError),
    /// The persisted structure cannot be used safely, e.g. the preset list is
    /// not a sequence.
    #[error("malformed configuration: {details}")]
    Malformed { details: String },
}

/// User input rejected by a dialog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("preset name must be 1-20 printable ASCII characters (got {len} characters)")]
    PresetName { len: usize },
    #[error("pin must be 4-8 digits")]
    PinFormat,
    #[error("output name must be printable ASCII")]
    OutputNameCharset,
    #[error("output name weight {weight:.2} exceeds {max:.1}")]
    OutputNameWeight { weight: f64, max: f64 },
}

/// A command or status read against the endpoint failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("{operation} failed: {details}")]
    Command {
        operation: &'static str,
        details: String,
    },
    #[error("unknown connector {connector}")]
    UnknownConnector { connector: u32 },
}

impl DeviceError {
    pub fn command(operation: &'static str, details: impl Into<String>) -> Self {
        Self::Command {
            operation,
            details: details.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key `{key}` not found in `{component}`")]
    NotFound { component: String, key: String },
    #[error("stored data at `{location}` is corrupt: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("io failed at `{path}`: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(component: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            component: component.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UiError {
    #[error("prompt has {count} options, at most {max} allowed")]
    TooManyOptions { count: usize, max: usize },
    #[error("unrecognised feedback id `{id}`")]
    UnknownFeedback { id: String },
}
