/// Errors from reading, converting and writing a policy.
use std::io;

use thiserror::Error;

use crate::context::DefaultsError;

/// A syntax error at a known location.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{file}:{line}: {message}")]
pub struct ParseError {
    /// Policy file name; filled in by the loader.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            file: String::new(),
            line,
            message: message.into(),
        }
    }

    /// Attach the file the error occurred in.
    #[must_use]
    pub fn in_file(mut self, file: &str) -> Self {
        file.clone_into(&mut self.file);
        self
    }
}

/// Why a conversion failed. Any of these fails the whole run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The policy host refused to set up environment tables.
    #[error("unable to initialize environment tables")]
    HostInit,

    #[error("unable to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Parse(#[from] ParseError),

    /// A `Defaults` setting failed type checking.
    #[error("{file}:{line}: {source}")]
    Defaults {
        file: String,
        line: usize,
        #[source]
        source: DefaultsError,
    },

    /// An alias name was defined twice in the same table.
    #[error("{file}:{line}: duplicate {table} \"{name}\"")]
    DuplicateAlias {
        file: String,
        line: usize,
        table: &'static str,
        name: String,
    },

    #[error("{file}:{line}: too many levels of includes")]
    IncludeDepth { file: String, line: usize },

    #[error("unable to serialize policy: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unable to write {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },
}
