//! Error types for the Overtone editor.

use std::fmt;

use crate::types::ParamId;

/// Errors that can occur in the editor subsystem.
#[derive(Debug)]
pub enum EditorError {
    /// A call into the host edit controller failed or was rejected.
    HostCallFailed(String),
    /// The host has no parameter with this id.
    UnknownParameter(ParamId),
    /// A range-typed control was bound to a parameter without a range.
    NotARange(ParamId),
    /// A named widget slot was not present in the widget tree.
    MissingWidget(String),
    /// A message payload could not be decoded.
    MalformedMessage(String),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostCallFailed(msg) => write!(f, "Host call failed: {}", msg),
            Self::UnknownParameter(id) => write!(f, "Unknown parameter: {:#010x}", id),
            Self::NotARange(id) => write!(f, "Parameter {:#010x} has no value range", id),
            Self::MissingWidget(slot) => write!(f, "Missing widget slot: {}", slot),
            Self::MalformedMessage(msg) => write!(f, "Malformed message: {}", msg),
        }
    }
}

impl std::error::Error for EditorError {}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
