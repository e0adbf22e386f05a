/// CLI layer: argument parsing and user-facing text.
pub mod args;
pub mod output;

pub use args::{
    Cli, InvocationConfig, OutputFormat, OutputTarget, ParsedArgs, PolicySource, UsageError,
    parse_args,
};
pub use output::{program_name, write_error, write_help, write_usage, write_version};
