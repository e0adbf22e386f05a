/// Pipeline driver: arguments in, an [`Outcome`] out.
///
/// Parse arguments, build the execution context, hand both to the selected
/// exporter. Each stage can end the run early; nothing loops back.
use std::ffi::OsString;
use std::io::Write;

use crate::cli::{
    InvocationConfig, ParsedArgs, parse_args, program_name, write_error, write_help, write_usage,
    write_version,
};
use crate::context::{SystemProbe, synthesize};
use crate::errors::CvtError;
use crate::export::Exporters;

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Help text printed.
    Help,
    /// Version printed.
    Version,
    /// Bad command line.
    UsageError,
    /// The execution context could not be built.
    Fatal,
    /// The policy was converted and written.
    Converted,
    /// The exporter reported failure.
    ConversionFailed,
}

impl Outcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Help | Self::Version | Self::Converted => 0,
            Self::UsageError | Self::Fatal | Self::ConversionFailed => 1,
        }
    }
}

/// Wires the OS probe and the exporters together for one run.
pub struct Driver<'a> {
    pub probe: &'a dyn SystemProbe,
    pub exporters: Exporters<'a>,
}

impl Driver<'_> {
    /// Run the whole pipeline for `args` (including `argv[0]`).
    ///
    /// Help and version go to `stdout`; diagnostics go to `stderr`.
    pub fn run<I>(&self, args: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Outcome
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let prog = program_name(args.first().map(OsString::as_os_str));

        let config = match parse_args(&args) {
            Ok(ParsedArgs::Help) => {
                return match write_help(stdout, &prog) {
                    Ok(()) => Outcome::Help,
                    Err(err) => {
                        write_error(stderr, &prog, &err);
                        Outcome::Fatal
                    }
                };
            }
            Ok(ParsedArgs::Version) => {
                return match write_version(stdout, &prog) {
                    Ok(()) => Outcome::Version,
                    Err(err) => {
                        write_error(stderr, &prog, &err);
                        Outcome::Fatal
                    }
                };
            }
            Ok(ParsedArgs::Run(config)) => config,
            Err(err) => {
                write_error(stderr, &prog, &err);
                let _ = write_usage(stderr, &prog);
                return Outcome::UsageError;
            }
        };

        match self.convert(&config) {
            Ok(()) => Outcome::Converted,
            Err(err) => {
                log::debug!("run failed with exit code {}", err.exit_code());
                write_error(stderr, &prog, &err);
                match err {
                    CvtError::Context(_) => Outcome::Fatal,
                    CvtError::Usage(_) => Outcome::UsageError,
                    CvtError::Export(_) => Outcome::ConversionFailed,
                }
            }
        }
    }

    fn convert(&self, config: &InvocationConfig) -> Result<(), CvtError> {
        let ctx = synthesize(self.probe)?;
        log::debug!(
            "converting {} to {} as {:?}",
            config.input,
            config.output,
            config.format
        );
        self.exporters
            .select(config.format)
            .export(&ctx, &config.input, &config.output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputTarget, PolicySource};
    use crate::context::ExecutionContext;
    use crate::context::testing::FakeProbe;
    use crate::export::{ExportError, Exporter, JsonExporter};
    use crate::policy_host::CliHost;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;

    /// What the exporter was called with.
    #[derive(Debug, Clone)]
    struct Call {
        input: PolicySource,
        output: OutputTarget,
        user: String,
        short_host: String,
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
        fail: bool,
    }

    impl Exporter for Recorder {
        fn export(
            &self,
            ctx: &ExecutionContext,
            input: &PolicySource,
            output: &OutputTarget,
        ) -> Result<(), ExportError> {
            self.calls.borrow_mut().push(Call {
                input: input.clone(),
                output: output.clone(),
                user: ctx.identity.name.clone(),
                short_host: ctx.host.short_host.clone(),
            });
            if self.fail {
                Err(ExportError::HostInit)
            } else {
                Ok(())
            }
        }
    }

    fn probe() -> FakeProbe {
        FakeProbe::new(1000, 1000)
            .with_user("alice", 1000)
            .with_hostname("web1.example.com")
    }

    struct Run {
        outcome: Outcome,
        stdout: String,
        stderr: String,
    }

    fn run_with(probe: &FakeProbe, exporter: &dyn Exporter, args: &[&str]) -> Run {
        let driver = Driver {
            probe,
            exporters: Exporters { json: exporter },
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let argv = std::iter::once("cvtsudoers")
            .chain(args.iter().copied())
            .map(OsString::from);
        let outcome = driver.run(argv, &mut stdout, &mut stderr);
        Run {
            outcome,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }

    #[test]
    fn test_default_run_reads_stdin_writes_stdout() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &[]);
        assert_eq!(run.outcome, Outcome::Converted);
        assert_eq!(run.outcome.exit_code(), 0);

        let calls = rec.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input, PolicySource::Stdin);
        assert_eq!(calls[0].output, OutputTarget::Stdout);
        assert_eq!(calls[0].user, "alice");
        assert_eq!(calls[0].short_host, "web1");
    }

    #[test]
    fn test_dash_means_stdin() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-"]);
        assert_eq!(run.outcome, Outcome::Converted);
        assert_eq!(rec.calls.borrow()[0].input, PolicySource::Stdin);
    }

    #[test]
    fn test_output_routing() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-f", "JSON", "-o", "/tmp/out.json", "/etc/sudoers"]);
        assert_eq!(run.outcome, Outcome::Converted);
        let calls = rec.calls.borrow();
        assert_eq!(calls[0].output, OutputTarget::File(PathBuf::from("/tmp/out.json")));
        assert_eq!(calls[0].input, PolicySource::File(PathBuf::from("/etc/sudoers")));
    }

    #[test]
    fn test_unsupported_format() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-f", "ldif"]);
        assert_eq!(run.outcome, Outcome::UsageError);
        assert_eq!(run.outcome.exit_code(), 1);
        assert!(run.stderr.contains("unsupported output format ldif"));
        assert!(run.stderr.contains("usage: cvtsudoers"));
        assert!(rec.calls.borrow().is_empty());
    }

    #[test]
    fn test_two_inputs_rejected() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["a", "b"]);
        assert_eq!(run.outcome, Outcome::UsageError);
        assert!(run.stderr.contains("usage:"));
        assert!(rec.calls.borrow().is_empty());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-x"]);
        assert_eq!(run.outcome, Outcome::UsageError);
        assert!(run.stderr.starts_with("cvtsudoers: "));
    }

    #[test]
    fn test_version() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-V"]);
        assert_eq!(run.outcome, Outcome::Version);
        assert_eq!(run.outcome.exit_code(), 0);
        let lines: Vec<&str> = run.stdout.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("cvtsudoers version "));
        assert_eq!(lines[1], "cvtsudoers grammar version 46");
        assert!(rec.calls.borrow().is_empty());
    }

    #[test]
    fn test_help() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-h", "-f", "ldif"]);
        assert_eq!(run.outcome, Outcome::Help);
        assert!(run.stdout.contains("usage: cvtsudoers"));
        assert!(run.stdout.contains("--format"));
        assert!(run.stderr.is_empty());
        assert!(rec.calls.borrow().is_empty());
    }

    #[test]
    fn test_bad_format_before_help_fails() {
        let rec = Recorder::default();
        let run = run_with(&probe(), &rec, &["-f", "ldif", "-h"]);
        assert_eq!(run.outcome, Outcome::UsageError);
        assert!(run.stdout.is_empty());
        assert!(run.stderr.contains("unsupported output format ldif"));
    }

    #[test]
    fn test_hostname_failure_still_exports() {
        let rec = Recorder::default();
        let probe = FakeProbe::new(1000, 1000).with_user("alice", 1000);
        let run = run_with(&probe, &rec, &[]);
        assert_eq!(run.outcome, Outcome::Converted);
        assert_eq!(rec.calls.borrow()[0].short_host, "localhost");
    }

    #[test]
    fn test_missing_identity_is_fatal() {
        let rec = Recorder::default();
        let probe = FakeProbe::new(1000, 1000);
        let run = run_with(&probe, &rec, &[]);
        assert_eq!(run.outcome, Outcome::Fatal);
        assert_eq!(run.outcome.exit_code(), 1);
        assert!(run.stderr.contains("you do not exist in the passwd database"));
        assert!(rec.calls.borrow().is_empty());
    }

    #[test]
    fn test_acting_user_when_elevated() {
        let rec = Recorder::default();
        let probe = FakeProbe::new(0, 0)
            .with_user("root", 0)
            .with_user("alice", 1000)
            .with_env("SUDO_USER", "alice");
        run_with(&probe, &rec, &[]);
        assert_eq!(rec.calls.borrow()[0].user, "alice");
    }

    #[test]
    fn test_exporter_failure() {
        let rec = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let run = run_with(&probe(), &rec, &[]);
        assert_eq!(run.outcome, Outcome::ConversionFailed);
        assert_eq!(run.outcome.exit_code(), 1);
        assert_eq!(rec.calls.borrow().len(), 1);
    }

    #[test]
    fn test_end_to_end_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sudoers");
        let output = dir.path().join("sudoers.json");
        fs::write(&input, "alice ALL=(ALL) ALL\n").unwrap();

        let exporter = JsonExporter::new(CliHost);
        let run = run_with(
            &probe(),
            &exporter,
            &["-o", output.to_str().unwrap(), input.to_str().unwrap()],
        );
        assert_eq!(run.outcome, Outcome::Converted);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["User_Specs"][0]["User_List"][0]["username"], "alice");
        assert_eq!(
            written["User_Specs"][0]["Cmnd_Specs"][0]["Commands"][0]["command"],
            "ALL"
        );
    }
}
