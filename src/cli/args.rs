/// CLI argument definitions via clap derive.
///
/// clap's own `--help`/`--version` handling is disabled: the tool prints
/// its own texts and every outcome is returned to the caller instead of
/// exiting from inside the parser.
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Argument spelling meaning standard input or standard output.
pub const STDIO_SENTINEL: &str = "-";

/// cvtsudoers: convert a sudoers file to JSON.
#[derive(Debug, Parser)]
#[command(
    name = "cvtsudoers",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true,
    infer_long_args = true
)]
pub struct Cli {
    /// Output format (only JSON is supported).
    #[arg(short = 'f', long = "format", value_name = "format", allow_hyphen_values = true)]
    pub format: Option<String>,

    /// Display help message and exit.
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Write the converted policy to this file ('-' for stdout).
    #[arg(
        short = 'o',
        long = "output",
        value_name = "output_file",
        allow_hyphen_values = true
    )]
    pub output: Option<String>,

    /// Display version information and exit.
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// Policy file to read ('-' or absent for stdin).
    #[arg(value_name = "sudoers_file")]
    pub inputs: Vec<String>,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON document.
    #[default]
    Json,
}

impl OutputFormat {
    /// Parse a `--format` value, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns `UsageError::UnsupportedFormat` for anything but `json`.
    pub fn parse(value: &str) -> Result<Self, UsageError> {
        if value.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(UsageError::UnsupportedFormat(value.to_owned()))
        }
    }
}

/// Where the policy is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    Stdin,
    File(PathBuf),
}

impl PolicySource {
    /// `None` and `-` mean standard input.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some(STDIO_SENTINEL) => Self::Stdin,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for PolicySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where the converted document is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` and `-` mean standard output.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some(STDIO_SENTINEL) => Self::Stdout,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A fully validated invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub input: PolicySource,
    pub output: OutputTarget,
    pub format: OutputFormat,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    /// `-h`: print help and stop.
    Help,
    /// `-V`: print version and stop.
    Version,
    /// Convert a policy.
    Run(InvocationConfig),
}

/// Malformed command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// `-f` with anything but `json`.
    #[error("unsupported output format {0}")]
    UnsupportedFormat(String),

    /// More than one positional argument.
    #[error("too many input files ({0}); only one is supported")]
    TooManyInputs(usize),

    /// Unknown option, missing option value and friends.
    #[error("{0}")]
    Invalid(String),
}

impl From<clap::Error> for UsageError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        Self::Invalid(first.trim_start_matches("error: ").to_owned())
    }
}

/// Long options, in the order `--xyz` prefixes are matched against.
const LONG_OPTIONS: &[&str] = &["format", "help", "output", "version"];

/// Interpret the full argument vector (including `argv[0]`).
///
/// Options take effect in command-line order: the first `-h`, `-V` or
/// unsupported `-f` decides the result, and anything after it is not
/// looked at. A repeated `-f` or `-o` keeps its last value.
///
/// # Errors
///
/// Returns `UsageError` on any malformed command line.
pub fn parse_args<I, T>(args: I) -> Result<ParsedArgs, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if let Some(decided) = first_terminal(args.get(1..).unwrap_or_default()) {
        return decided;
    }

    let cli = Cli::try_parse_from(&args)?;

    if cli.help {
        return Ok(ParsedArgs::Help);
    }
    if cli.version {
        return Ok(ParsedArgs::Version);
    }

    let format = cli
        .format
        .as_deref()
        .map_or(Ok(OutputFormat::default()), OutputFormat::parse)?;

    if cli.inputs.len() > 1 {
        return Err(UsageError::TooManyInputs(cli.inputs.len()));
    }

    Ok(ParsedArgs::Run(InvocationConfig {
        input: PolicySource::from_arg(cli.inputs.first().map(String::as_str)),
        output: OutputTarget::from_arg(cli.output.as_deref()),
        format,
    }))
}

/// Walk options in order until one ends argument processing.
///
/// Returns `None` when none does, or when an unrecognized option comes
/// first; clap then reports the full command line.
fn first_terminal(args: &[OsString]) -> Option<Result<ParsedArgs, UsageError>> {
    let mut rest = args.iter().map(|arg| arg.to_string_lossy());

    while let Some(arg) = rest.next() {
        if arg == "--" {
            return None;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_owned())),
                None => (long, None),
            };
            let mut matches = LONG_OPTIONS.iter().filter(|opt| opt.starts_with(name));
            let (Some(&option), None) = (matches.next(), matches.next()) else {
                return None;
            };
            match option {
                "help" => return Some(Ok(ParsedArgs::Help)),
                "version" => return Some(Ok(ParsedArgs::Version)),
                _ => {
                    let value = match inline {
                        Some(value) => value,
                        None => rest.next()?.into_owned(),
                    };
                    if option == "format" {
                        if let Err(err) = OutputFormat::parse(&value) {
                            return Some(Err(err));
                        }
                    }
                }
            }
            continue;
        }

        let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty()) else {
            continue;
        };
        for (i, flag) in cluster.char_indices() {
            match flag {
                'h' => return Some(Ok(ParsedArgs::Help)),
                'V' => return Some(Ok(ParsedArgs::Version)),
                'f' | 'o' => {
                    let attached = &cluster[i + 1..];
                    let value = if attached.is_empty() {
                        rest.next()?.into_owned()
                    } else {
                        attached.to_owned()
                    };
                    if flag == 'f' {
                        if let Err(err) = OutputFormat::parse(&value) {
                            return Some(Err(err));
                        }
                    }
                    break;
                }
                _ => return None,
            }
        }
    }
    None
}
