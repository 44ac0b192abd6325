// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the daemon
//!
//! Startup failures (no display, no RandR) end the process. Everything else
//! aborts at most the current reconciliation pass.

use thiserror::Error;

use crate::topology::{ModeId, OutputId};

/// Main daemon error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The X display could not be opened
    #[error("could not open display {display:?}: {source}")]
    Open {
        display: String,
        #[source]
        source: x11rb::errors::ConnectError,
    },

    /// The X server does not speak RandR
    #[error("the display server does not support the RandR extension")]
    MissingExtension,

    /// The connection to the topology source is unusable
    #[error("topology source unavailable: {0}")]
    SourceUnavailable(String),

    /// An output references a mode the mode table does not contain
    #[error("output {output} references mode {mode} missing from the mode table")]
    UnknownMode { output: OutputId, mode: ModeId },

    /// The layout could not be applied
    #[error("failed to apply layout: {0}")]
    Apply(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<x11rb::errors::ConnectionError> for AppError {
    fn from(err: x11rb::errors::ConnectionError) -> Self {
        AppError::SourceUnavailable(err.to_string())
    }
}

impl From<x11rb::errors::ReplyError> for AppError {
    fn from(err: x11rb::errors::ReplyError) -> Self {
        AppError::SourceUnavailable(err.to_string())
    }
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
