/// Built-in `Defaults` option table.
///
/// The grammar evaluator assumes every option below exists with its
/// built-in value, whether or not the policy file ever sets it. The same
/// table type-checks `Defaults` lines read from a policy.
use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Value type of a `Defaults` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Boolean, set by name and cleared by `!name`.
    Flag,
    /// Signed integer.
    Integer,
    /// Floating-point number (timeouts in minutes).
    Float,
    /// Octal file mode.
    Mode,
    /// Free-form string.
    Str,
    /// Whitespace-separated list supporting `=`, `+=` and `-=`.
    List,
    /// One of a fixed set of words.
    Tuple(&'static [&'static str]),
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Mode(u32),
    /// `None` when the option is unset.
    Str(Option<String>),
    List(Vec<String>),
    Tuple(String),
}

/// How a list setting combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOp {
    /// `name=value`
    ListAssign,
    /// `name+=value`
    ListAdd,
    /// `name-=value`
    ListRemove,
}

/// Operator between option name and value in a policy `Defaults` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingOp {
    Assign,
    Add,
    Remove,
}

/// A `Defaults` setting after validation against the option table.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List { op: ListOp, items: Vec<String> },
}

/// Errors building the option table or validating a setting against it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefaultsError {
    /// The same option appears twice in the built-in table.
    #[error("duplicate defaults entry \"{0}\"")]
    Duplicate(String),

    /// A built-in default does not parse as its declared kind.
    #[error("invalid built-in value for \"{name}\": {value}")]
    InvalidBuiltin { name: String, value: String },

    /// No such option.
    #[error("unknown defaults entry \"{0}\"")]
    UnknownOption(String),

    /// A value was given to a boolean flag.
    #[error("option \"{0}\" does not take a value")]
    UnexpectedValue(String),

    /// A non-flag option was set without a value.
    #[error("no value specified for \"{0}\"")]
    MissingValue(String),

    /// `!name` on an option that cannot be disabled.
    #[error("option \"{0}\" cannot be negated")]
    NotNegatable(String),

    /// `+=` or `-=` on an option that is not a list.
    #[error("option \"{0}\" is not a list")]
    NotAList(String),

    /// The value does not parse as the option's kind.
    #[error("value \"{value}\" is invalid for option \"{name}\"")]
    InvalidValue { name: String, value: String },
}

/// One row of the option table.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    /// Whether `!name` is accepted for non-flag options.
    pub negatable: bool,
    /// Textual built-in value; `None` leaves the option unset.
    pub default: Option<&'static str>,
}

impl OptionSpec {
    const fn flag(name: &'static str, on: bool) -> Self {
        Self {
            name,
            kind: OptionKind::Flag,
            negatable: true,
            default: if on { Some("on") } else { None },
        }
    }

    const fn value(
        name: &'static str,
        kind: OptionKind,
        negatable: bool,
        default: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            kind,
            negatable,
            default,
        }
    }
}

const LECTURE: &[&str] = &["never", "once", "always"];
const LISTPW: &[&str] = &["never", "any", "all", "always"];
const TIMESTAMP_TYPE: &[&str] = &["global", "ppid", "tty", "kernel"];
const LOG_FORMAT: &[&str] = &["sudo", "json"];
const INTERCEPT_TYPE: &[&str] = &["dso", "trace"];
const FDEXEC: &[&str] = &["never", "digest_only", "always"];

/// Built-in options and their values.
pub const BUILTIN_OPTIONS: &[OptionSpec] = &[
    // Flags.
    OptionSpec::flag("always_query_group_plugin", false),
    OptionSpec::flag("always_set_home", false),
    OptionSpec::flag("authenticate", true),
    OptionSpec::flag("case_insensitive_group", true),
    OptionSpec::flag("case_insensitive_user", true),
    OptionSpec::flag("closefrom_override", false),
    OptionSpec::flag("compress_io", true),
    OptionSpec::flag("env_editor", true),
    OptionSpec::flag("env_reset", true),
    OptionSpec::flag("fast_glob", false),
    OptionSpec::flag("fqdn", false),
    OptionSpec::flag("ignore_audit_errors", true),
    OptionSpec::flag("ignore_dot", true),
    OptionSpec::flag("ignore_iolog_errors", false),
    OptionSpec::flag("ignore_local_sudoers", false),
    OptionSpec::flag("ignore_logfile_errors", true),
    OptionSpec::flag("ignore_unknown_defaults", false),
    OptionSpec::flag("insults", false),
    OptionSpec::flag("intercept", false),
    OptionSpec::flag("intercept_allow_setid", false),
    OptionSpec::flag("intercept_authenticate", false),
    OptionSpec::flag("intercept_verify", true),
    OptionSpec::flag("iolog_flush", true),
    OptionSpec::flag("log_allowed", true),
    OptionSpec::flag("log_denied", true),
    OptionSpec::flag("log_exit_status", false),
    OptionSpec::flag("log_host", false),
    OptionSpec::flag("log_input", false),
    OptionSpec::flag("log_output", false),
    OptionSpec::flag("log_server_keepalive", true),
    OptionSpec::flag("log_server_verify", true),
    OptionSpec::flag("log_stderr", true),
    OptionSpec::flag("log_stdin", true),
    OptionSpec::flag("log_stdout", true),
    OptionSpec::flag("log_subcmds", false),
    OptionSpec::flag("log_ttyin", true),
    OptionSpec::flag("log_ttyout", true),
    OptionSpec::flag("log_year", false),
    OptionSpec::flag("long_otp_prompt", false),
    OptionSpec::flag("mail_all_cmnds", false),
    OptionSpec::flag("mail_always", false),
    OptionSpec::flag("mail_badpass", false),
    OptionSpec::flag("mail_no_host", false),
    OptionSpec::flag("mail_no_perms", false),
    OptionSpec::flag("mail_no_user", true),
    OptionSpec::flag("match_group_by_gid", false),
    OptionSpec::flag("netgroup_tuple", false),
    OptionSpec::flag("noexec", false),
    OptionSpec::flag("noninteractive_auth", false),
    OptionSpec::flag("pam_acct_mgmt", true),
    OptionSpec::flag("pam_rhost", false),
    OptionSpec::flag("pam_ruser", true),
    OptionSpec::flag("pam_session", true),
    OptionSpec::flag("pam_setcred", true),
    OptionSpec::flag("pam_silent", true),
    OptionSpec::flag("passprompt_override", false),
    OptionSpec::flag("path_info", true),
    OptionSpec::flag("preserve_groups", false),
    OptionSpec::flag("pwfeedback", false),
    OptionSpec::flag("requiretty", false),
    OptionSpec::flag("root_sudo", true),
    OptionSpec::flag("rootpw", false),
    OptionSpec::flag("runas_allow_unknown_id", false),
    OptionSpec::flag("runas_check_shell", false),
    OptionSpec::flag("runaspw", false),
    OptionSpec::flag("selinux", true),
    OptionSpec::flag("set_home", false),
    OptionSpec::flag("set_logname", true),
    OptionSpec::flag("set_utmp", true),
    OptionSpec::flag("setenv", false),
    OptionSpec::flag("shell_noargs", false),
    OptionSpec::flag("stay_setuid", false),
    OptionSpec::flag("sudoedit_checkdir", true),
    OptionSpec::flag("sudoedit_follow", false),
    OptionSpec::flag("syslog_pid", false),
    OptionSpec::flag("targetpw", false),
    OptionSpec::flag("tty_tickets", true),
    OptionSpec::flag("umask_override", false),
    OptionSpec::flag("use_loginclass", false),
    OptionSpec::flag("use_netgroups", true),
    OptionSpec::flag("use_pty", false),
    OptionSpec::flag("user_command_timeouts", false),
    OptionSpec::flag("utmp_runas", false),
    OptionSpec::flag("visiblepw", false),
    // Numbers, modes and fixed word sets.
    OptionSpec::value("fdexec", OptionKind::Tuple(FDEXEC), false, Some("digest_only")),
    OptionSpec::value("intercept_type", OptionKind::Tuple(INTERCEPT_TYPE), false, Some("dso")),
    OptionSpec::value("iolog_mode", OptionKind::Mode, false, Some("0600")),
    OptionSpec::value("lecture", OptionKind::Tuple(LECTURE), true, Some("once")),
    OptionSpec::value("listpw", OptionKind::Tuple(LISTPW), true, Some("any")),
    OptionSpec::value("log_format", OptionKind::Tuple(LOG_FORMAT), false, Some("sudo")),
    OptionSpec::value("loglinelen", OptionKind::Integer, true, Some("80")),
    OptionSpec::value("maxseq", OptionKind::Integer, false, Some("2176782336")),
    OptionSpec::value("passwd_timeout", OptionKind::Float, true, Some("5")),
    OptionSpec::value("passwd_tries", OptionKind::Integer, false, Some("3")),
    OptionSpec::value("syslog_maxlen", OptionKind::Integer, false, Some("960")),
    OptionSpec::value("timestamp_timeout", OptionKind::Float, true, Some("5")),
    OptionSpec::value("timestamp_type", OptionKind::Tuple(TIMESTAMP_TYPE), false, Some("tty")),
    OptionSpec::value("umask", OptionKind::Mode, true, Some("0022")),
    OptionSpec::value("verifypw", OptionKind::Tuple(LISTPW), true, Some("all")),
    // Strings.
    OptionSpec::value("admin_flag", OptionKind::Str, true, None),
    OptionSpec::value("apparmor_profile", OptionKind::Str, false, None),
    OptionSpec::value("askpass", OptionKind::Str, false, None),
    OptionSpec::value("authfail_message", OptionKind::Str, false, Some("%d incorrect password attempt(s)")),
    OptionSpec::value("badpass_message", OptionKind::Str, false, Some("Sorry, try again.")),
    OptionSpec::value("command_timeout", OptionKind::Str, true, None),
    OptionSpec::value("editor", OptionKind::Str, false, Some("/usr/bin/vi")),
    OptionSpec::value("env_file", OptionKind::Str, true, None),
    OptionSpec::value("exempt_group", OptionKind::Str, true, None),
    OptionSpec::value("group_plugin", OptionKind::Str, true, None),
    OptionSpec::value("iolog_dir", OptionKind::Str, false, Some("/var/log/sudo-io")),
    OptionSpec::value("iolog_file", OptionKind::Str, false, Some("%{seq}")),
    OptionSpec::value("iolog_group", OptionKind::Str, true, None),
    OptionSpec::value("iolog_user", OptionKind::Str, true, None),
    OptionSpec::value("lecture_file", OptionKind::Str, true, None),
    OptionSpec::value("limitprivs", OptionKind::Str, false, None),
    OptionSpec::value("log_server_cabundle", OptionKind::Str, true, None),
    OptionSpec::value("log_server_peer_cert", OptionKind::Str, true, None),
    OptionSpec::value("log_server_peer_key", OptionKind::Str, true, None),
    OptionSpec::value("log_server_timeout", OptionKind::Str, true, Some("30")),
    OptionSpec::value("logfile", OptionKind::Str, true, None),
    OptionSpec::value("mailerflags", OptionKind::Str, true, Some("-t")),
    OptionSpec::value("mailerpath", OptionKind::Str, true, Some("/usr/sbin/sendmail")),
    OptionSpec::value("mailfrom", OptionKind::Str, true, None),
    OptionSpec::value("mailsub", OptionKind::Str, false, Some("*** SECURITY information for %h ***")),
    OptionSpec::value("mailto", OptionKind::Str, true, Some("root")),
    OptionSpec::value("noexec_file", OptionKind::Str, false, None),
    OptionSpec::value("pam_askpass_service", OptionKind::Str, false, Some("sudo")),
    OptionSpec::value("pam_login_service", OptionKind::Str, false, Some("sudo-i")),
    OptionSpec::value("pam_service", OptionKind::Str, false, Some("sudo")),
    OptionSpec::value("passprompt", OptionKind::Str, false, Some("[sudo] password for %p: ")),
    OptionSpec::value("privs", OptionKind::Str, false, None),
    OptionSpec::value("restricted_env_file", OptionKind::Str, true, None),
    OptionSpec::value("role", OptionKind::Str, false, None),
    OptionSpec::value("runas_default", OptionKind::Str, false, Some("root")),
    OptionSpec::value("runchroot", OptionKind::Str, true, None),
    OptionSpec::value("runcwd", OptionKind::Str, true, None),
    OptionSpec::value("secure_path", OptionKind::Str, true, None),
    OptionSpec::value("sudoers_locale", OptionKind::Str, false, Some("C")),
    OptionSpec::value("syslog", OptionKind::Str, true, Some("authpriv")),
    OptionSpec::value("syslog_badpri", OptionKind::Str, true, Some("alert")),
    OptionSpec::value("syslog_goodpri", OptionKind::Str, true, Some("notice")),
    OptionSpec::value("timestampdir", OptionKind::Str, false, Some("/run/sudo/ts")),
    OptionSpec::value("timestampowner", OptionKind::Str, false, Some("root")),
    OptionSpec::value("type", OptionKind::Str, false, None),
    // Rlimits take a number, a soft,hard pair or "infinity".
    OptionSpec::value("rlimit_as", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_core", OptionKind::Str, true, Some("0,0")),
    OptionSpec::value("rlimit_cpu", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_data", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_fsize", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_locks", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_memlock", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_nofile", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_nproc", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_rss", OptionKind::Str, true, None),
    OptionSpec::value("rlimit_stack", OptionKind::Str, true, None),
    // Lists.
    OptionSpec::value("env_check", OptionKind::List, true, None),
    OptionSpec::value("env_delete", OptionKind::List, true, None),
    OptionSpec::value("env_keep", OptionKind::List, true, None),
    OptionSpec::value("log_servers", OptionKind::List, true, None),
    OptionSpec::value("passprompt_regex", OptionKind::List, true, None),
];

#[derive(Debug, Clone, PartialEq)]
struct OptionEntry {
    kind: OptionKind,
    negatable: bool,
    value: DefaultValue,
}

/// The option table with current values, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDefaults {
    options: BTreeMap<String, OptionEntry>,
}

impl PolicyDefaults {
    /// Load the built-in table.
    ///
    /// # Errors
    ///
    /// See [`PolicyDefaults::from_specs`].
    pub fn builtin() -> Result<Self, DefaultsError> {
        Self::from_specs(BUILTIN_OPTIONS)
    }

    /// Build a table from option specs. All-or-nothing: any bad row
    /// rejects the whole table.
    ///
    /// # Errors
    ///
    /// Returns `DefaultsError::Duplicate` or `DefaultsError::InvalidBuiltin`.
    pub fn from_specs(specs: &[OptionSpec]) -> Result<Self, DefaultsError> {
        let mut options = BTreeMap::new();
        for spec in specs {
            let value = initial_value(spec)?;
            let entry = OptionEntry {
                kind: spec.kind,
                negatable: spec.negatable,
                value,
            };
            if options.insert(spec.name.to_owned(), entry).is_some() {
                return Err(DefaultsError::Duplicate(spec.name.to_owned()));
            }
        }
        Ok(Self { options })
    }

    /// Number of known options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Current value of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DefaultValue> {
        self.options.get(name).map(|e| &e.value)
    }

    /// Kind of an option.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<OptionKind> {
        self.options.get(name).map(|e| e.kind)
    }

    /// Validate one `Defaults` setting and produce its typed value.
    ///
    /// # Errors
    ///
    /// Returns a `DefaultsError` describing why the setting is invalid.
    pub fn interpret(
        &self,
        name: &str,
        negated: bool,
        op: SettingOp,
        value: Option<&str>,
    ) -> Result<SettingValue, DefaultsError> {
        let entry = self
            .options
            .get(name)
            .ok_or_else(|| DefaultsError::UnknownOption(name.to_owned()))?;

        if op != SettingOp::Assign && entry.kind != OptionKind::List {
            return Err(DefaultsError::NotAList(name.to_owned()));
        }

        if entry.kind == OptionKind::Flag {
            if value.is_some() {
                return Err(DefaultsError::UnexpectedValue(name.to_owned()));
            }
            return Ok(SettingValue::Bool(!negated));
        }

        if negated {
            if !entry.negatable {
                return Err(DefaultsError::NotNegatable(name.to_owned()));
            }
            if value.is_some() {
                return Err(DefaultsError::UnexpectedValue(name.to_owned()));
            }
            return Ok(SettingValue::Bool(false));
        }

        let Some(text) = value else {
            // Options that can be negated can also be enabled by name alone.
            if entry.negatable {
                return Ok(SettingValue::Bool(true));
            }
            return Err(DefaultsError::MissingValue(name.to_owned()));
        };

        let invalid = || DefaultsError::InvalidValue {
            name: name.to_owned(),
            value: text.to_owned(),
        };
        let parsed = parse_value(entry.kind, text).ok_or_else(invalid)?;
        Ok(match parsed {
            DefaultValue::Flag(b) => SettingValue::Bool(b),
            DefaultValue::Integer(n) => SettingValue::Integer(n),
            DefaultValue::Float(f) => SettingValue::Float(f),
            DefaultValue::Mode(m) => SettingValue::Text(format!("{m:04o}")),
            DefaultValue::Str(s) => SettingValue::Text(s.unwrap_or_default()),
            DefaultValue::Tuple(t) => SettingValue::Text(t),
            DefaultValue::List(items) => SettingValue::List {
                op: match op {
                    SettingOp::Assign => ListOp::ListAssign,
                    SettingOp::Add => ListOp::ListAdd,
                    SettingOp::Remove => ListOp::ListRemove,
                },
                items,
            },
        })
    }
}

fn initial_value(spec: &OptionSpec) -> Result<DefaultValue, DefaultsError> {
    match (spec.kind, spec.default) {
        (OptionKind::Flag, None) => Ok(DefaultValue::Flag(false)),
        (OptionKind::Flag, Some("on")) => Ok(DefaultValue::Flag(true)),
        (OptionKind::Str, None) => Ok(DefaultValue::Str(None)),
        (OptionKind::List, None) => Ok(DefaultValue::List(Vec::new())),
        (kind, Some(text)) => parse_value(kind, text).ok_or_else(|| DefaultsError::InvalidBuiltin {
            name: spec.name.to_owned(),
            value: text.to_owned(),
        }),
        (_, None) => Err(DefaultsError::InvalidBuiltin {
            name: spec.name.to_owned(),
            value: String::new(),
        }),
    }
}

/// Parse `text` as a value of `kind`. `None` if it does not fit.
fn parse_value(kind: OptionKind, text: &str) -> Option<DefaultValue> {
    match kind {
        OptionKind::Flag => None,
        OptionKind::Integer => text.trim().parse().ok().map(DefaultValue::Integer),
        OptionKind::Float => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(DefaultValue::Float),
        OptionKind::Mode => u32::from_str_radix(text.trim(), 8)
            .ok()
            .filter(|&m| m <= 0o777)
            .map(DefaultValue::Mode),
        OptionKind::Str => Some(DefaultValue::Str(Some(text.to_owned()))),
        OptionKind::List => Some(DefaultValue::List(
            text.split_whitespace().map(str::to_owned).collect(),
        )),
        OptionKind::Tuple(words) => words
            .iter()
            .find(|w| w.eq_ignore_ascii_case(text.trim()))
            .map(|w| DefaultValue::Tuple((*w).to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> PolicyDefaults {
        PolicyDefaults::builtin().unwrap()
    }

    #[test]
    fn test_builtin_table_loads() {
        let d = defaults();
        assert_eq!(d.len(), BUILTIN_OPTIONS.len());
        assert_eq!(d.get("env_reset"), Some(&DefaultValue::Flag(true)));
        assert_eq!(d.get("passwd_tries"), Some(&DefaultValue::Integer(3)));
        assert_eq!(d.get("umask"), Some(&DefaultValue::Mode(0o022)));
        assert_eq!(d.get("secure_path"), Some(&DefaultValue::Str(None)));
        assert_eq!(d.kind("env_keep"), Some(OptionKind::List));
    }

    #[test]
    fn test_duplicate_rejects_whole_table() {
        let specs = [
            OptionSpec::flag("insults", false),
            OptionSpec::flag("insults", true),
        ];
        assert_eq!(
            PolicyDefaults::from_specs(&specs),
            Err(DefaultsError::Duplicate("insults".to_owned()))
        );
    }

    #[test]
    fn test_bad_builtin_value_rejected() {
        let specs = [OptionSpec::value(
            "passwd_tries",
            OptionKind::Integer,
            false,
            Some("three"),
        )];
        assert!(matches!(
            PolicyDefaults::from_specs(&specs),
            Err(DefaultsError::InvalidBuiltin { .. })
        ));
    }

    #[test]
    fn test_interpret_flags() {
        let d = defaults();
        assert_eq!(
            d.interpret("insults", false, SettingOp::Assign, None),
            Ok(SettingValue::Bool(true))
        );
        assert_eq!(
            d.interpret("env_reset", true, SettingOp::Assign, None),
            Ok(SettingValue::Bool(false))
        );
        assert_eq!(
            d.interpret("insults", false, SettingOp::Assign, Some("yes")),
            Err(DefaultsError::UnexpectedValue("insults".to_owned()))
        );
    }

    #[test]
    fn test_interpret_lists() {
        let d = defaults();
        assert_eq!(
            d.interpret("env_keep", false, SettingOp::Add, Some("HOME  EDITOR")),
            Ok(SettingValue::List {
                op: ListOp::ListAdd,
                items: vec!["HOME".to_owned(), "EDITOR".to_owned()],
            })
        );
        assert_eq!(
            d.interpret("editor", false, SettingOp::Add, Some("/bin/ed")),
            Err(DefaultsError::NotAList("editor".to_owned()))
        );
    }

    #[test]
    fn test_interpret_scalars() {
        let d = defaults();
        assert_eq!(
            d.interpret("passwd_tries", false, SettingOp::Assign, Some("5")),
            Ok(SettingValue::Integer(5))
        );
        assert_eq!(
            d.interpret("timestamp_timeout", false, SettingOp::Assign, Some("2.5")),
            Ok(SettingValue::Float(2.5))
        );
        assert_eq!(
            d.interpret("umask", false, SettingOp::Assign, Some("77")),
            Ok(SettingValue::Text("0077".to_owned()))
        );
        assert_eq!(
            d.interpret("lecture", false, SettingOp::Assign, Some("ALWAYS")),
            Ok(SettingValue::Text("always".to_owned()))
        );
        assert!(matches!(
            d.interpret("passwd_tries", false, SettingOp::Assign, Some("many")),
            Err(DefaultsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_interpret_negation_and_missing_values() {
        let d = defaults();
        assert_eq!(
            d.interpret("secure_path", true, SettingOp::Assign, None),
            Ok(SettingValue::Bool(false))
        );
        assert_eq!(
            d.interpret("editor", true, SettingOp::Assign, None),
            Err(DefaultsError::NotNegatable("editor".to_owned()))
        );
        assert_eq!(
            d.interpret("editor", false, SettingOp::Assign, None),
            Err(DefaultsError::MissingValue("editor".to_owned()))
        );
        assert_eq!(
            d.interpret("lecture", false, SettingOp::Assign, None),
            Ok(SettingValue::Bool(true))
        );
    }

    #[test]
    fn test_distro_options_are_known() {
        let d = defaults();
        for (name, value) in [
            ("match_group_by_gid", None),
            ("always_query_group_plugin", None),
            ("root_sudo", None),
            ("log_allowed", None),
            ("exempt_group", Some("wheel")),
            ("timestamp_type", Some("global")),
            ("rlimit_core", Some("infinity")),
        ] {
            assert!(
                d.interpret(name, false, SettingOp::Assign, value).is_ok(),
                "{name} rejected"
            );
        }
        assert_eq!(
            d.interpret("timestamp_type", false, SettingOp::Assign, Some("daily")),
            Err(DefaultsError::InvalidValue {
                name: "timestamp_type".to_owned(),
                value: "daily".to_owned(),
            })
        );
    }

    #[test]
    fn test_unknown_option() {
        assert_eq!(
            defaults().interpret("no_such_thing", false, SettingOp::Assign, None),
            Err(DefaultsError::UnknownOption("no_such_thing".to_owned()))
        );
    }
}
