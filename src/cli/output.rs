/// Help, usage, version and diagnostic text.
///
/// Every function writes to a caller-supplied stream and returns; deciding
/// whether to exit is left to the driver.
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;

/// Name used when `argv[0]` is missing or unusable.
pub const DEFAULT_PROGRAM_NAME: &str = "cvtsudoers";

/// Parser compatibility level of the sudoers grammar this tool reads.
pub const GRAMMAR_VERSION: u32 = 46;

/// Basename of `argv[0]`, or [`DEFAULT_PROGRAM_NAME`].
#[must_use]
pub fn program_name(argv0: Option<&OsStr>) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_owned())
}

/// One-line synopsis.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_usage(out: &mut dyn Write, prog: &str) -> io::Result<()> {
    writeln!(
        out,
        "usage: {prog} [-hV] [-f format] [-o output_file] [sudoers_file]"
    )
}

/// Description, synopsis and option list.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_help(out: &mut dyn Write, prog: &str) -> io::Result<()> {
    writeln!(out, "{prog} - convert between sudoers file formats\n")?;
    write_usage(out, prog)?;
    writeln!(
        out,
        "\nOptions:\n\
         \x20 -f, --format=JSON        specify output format\n\
         \x20 -h, --help               display help message and exit\n\
         \x20 -o, --output=output_file write sudoers in JSON format to output_file\n\
         \x20 -V, --version            display version information and exit"
    )
}

/// Tool version and grammar version, one per line.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_version(out: &mut dyn Write, prog: &str) -> io::Result<()> {
    writeln!(out, "{prog} version {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "{prog} grammar version {GRAMMAR_VERSION}")
}

/// A diagnostic line, `prog: message`.
///
/// Write failures are ignored: there is nowhere left to report them.
pub fn write_error(out: &mut dyn Write, prog: &str, err: &dyn std::fmt::Display) {
    let _ = writeln!(out, "{prog}: {err}");
}
