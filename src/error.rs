//! Error types for Taskify.
//!
//! The task operations themselves never fail (bad input and unknown ids are
//! no-ops), so these errors come from the edges: the config file and the
//! storage slot.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskifyError {
    /// Config file exists but could not be parsed
    #[error("Configuration error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// Config value out of range
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Persisted task list parsed but breaks a list invariant
    #[error("Malformed task list: {reason}")]
    MalformedState { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaskifyError>;
