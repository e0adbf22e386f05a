/// Top-level error type for a conversion run.
use thiserror::Error;

use crate::cli::UsageError;
use crate::context::ContextError;
use crate::export::ExportError;

/// Anything that stops a run.
#[derive(Debug, Error)]
pub enum CvtError {
    /// Malformed command line.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The execution context could not be built.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The exporter reported failure.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl CvtError {
    /// Return the process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Context(_) | Self::Export(_) => 1,
        }
    }
}
