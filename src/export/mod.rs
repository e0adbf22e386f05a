/// Policy exporters: read a sudoers policy and write it in another format.
pub mod errors;
pub mod json;
pub mod lexer;
pub mod loader;
pub mod parser;

pub use errors::{ExportError, ParseError};
pub use json::JsonExporter;

use crate::cli::args::{OutputFormat, OutputTarget, PolicySource};
use crate::context::ExecutionContext;

/// Converts a policy source into one output format.
pub trait Exporter {
    /// Read `input`, convert it and write the result to `output`.
    ///
    /// Nothing is written unless the whole policy converts.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` on any read, parse, validation or write failure.
    fn export(
        &self,
        ctx: &ExecutionContext,
        input: &PolicySource,
        output: &OutputTarget,
    ) -> Result<(), ExportError>;
}

/// One exporter per supported format.
#[derive(Clone, Copy)]
pub struct Exporters<'a> {
    pub json: &'a dyn Exporter,
}

impl<'a> Exporters<'a> {
    /// Route a format to its exporter.
    #[must_use]
    pub fn select(&self, format: OutputFormat) -> &'a dyn Exporter {
        match format {
            OutputFormat::Json => self.json,
        }
    }
}
