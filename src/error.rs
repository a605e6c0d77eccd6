//! Failures of a single subsetting invocation.
//!
//! Every variant is terminal for the current job only; front ends report it
//! and let the user try again.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// Subsetter is not on the search path (or the configured path is not a file)
    #[error("subsetting tool '{0}' was not found on the search path")]
    ExecutableNotFound(String),

    /// Source font does not exist or is not a regular file
    #[error("input font does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Output directory is missing and could not be created
    #[error("output directory {} is unavailable: {source}", .path.display())]
    OutputDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Subsetter exited non-zero; the message is its stderr, verbatim
    #[error("{stderr}")]
    SubsetFailed { exit_status: i32, stderr: String },

    /// Subsetter reported success but left no output file behind
    #[error("subsetting tool exited successfully but {} was not created", .0.display())]
    OutputMissing(PathBuf),

    #[error("unexpected error while running the subsetting tool: {0}")]
    UnexpectedError(String),
}

impl InvokeError {
    /// Short title used as a dialog heading or a console prefix.
    pub fn title(&self) -> &'static str {
        match self {
            InvokeError::ExecutableNotFound(_) => "Subsetter not found",
            InvokeError::InputNotFound(_) => "Input not found",
            InvokeError::OutputDirUnavailable { .. } => "Output directory unavailable",
            InvokeError::SubsetFailed { .. } => "Subsetting failed",
            InvokeError::OutputMissing(_) => "Output missing",
            InvokeError::UnexpectedError(_) => "Unexpected error",
        }
    }
}
