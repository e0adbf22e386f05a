/// Errors from execution context synthesis. All of them are fatal.
use thiserror::Error;

use super::defaults::DefaultsError;

/// Why an execution context could not be built.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Neither the acting user nor the real uid has a passwd entry.
    #[error("you do not exist in the passwd database (uid {uid})")]
    UnknownUser {
        /// The real uid that was looked up last.
        uid: u32,
    },

    /// The built-in option table could not be loaded.
    #[error("unable to initialize sudoers default values: {0}")]
    Defaults(#[from] DefaultsError),
}
