//! Error taxonomy
//!
//! Locator and resolver failures are recovered into an HTTP status for the
//! caller. Window errors are only ever logged: by the time the arbiter runs
//! the navigation response is already committed.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a request before any window work happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Invalid parameters: {0}")]
    InvalidReference(String),

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Selection cancelled")]
    Cancelled,
}

impl NavigationError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            NavigationError::InvalidReference(_) => 400,
            NavigationError::UnknownProject(_)
            | NavigationError::NotFound(_)
            | NavigationError::Cancelled => 404,
        }
    }
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("No window for project '{project}' appeared")]
    WindowNotFound { project: String },

    #[error("{program} {args:?} exited with status {status}: {stderr}")]
    ExternalProcessFailure {
        program: String,
        args: Vec<String>,
        status: i32,
        stderr: String,
    },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected output from {program}: {detail}")]
    Malformed { program: String, detail: String },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(
        "This program requires {} to be installed. Install them using: sudo apt install {}",
        .tools.join(", "),
        .tools.join(" ")
    )]
    RequiredToolMissing { tools: Vec<String> },

    #[error(
        "Another instance is already running (pid {}, lock {})",
        .pid.map_or_else(|| "unknown".to_string(), |pid| pid.to_string()),
        .lock_path.display()
    )]
    AlreadyRunning {
        pid: Option<u32>,
        lock_path: PathBuf,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WindowResult<T> = std::result::Result<T, WindowError>;
