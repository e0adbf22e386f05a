/// Local hostname resolution.
use super::probe::SystemProbe;

/// Hostname used when the OS cannot report one.
pub const FALLBACK_HOST: &str = "localhost";

/// Host names the policy is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Hostname as reported by the OS.
    pub full_host: String,
    /// `full_host` up to the first `.`.
    pub short_host: String,
    /// Host the command would run on. Always `full_host` here.
    pub run_host: String,
    /// Short form of `run_host`.
    pub run_short_host: String,
}

impl HostInfo {
    /// Build from a full hostname, deriving the short form.
    #[must_use]
    pub fn from_hostname(full: &str) -> Self {
        let short = full.split_once('.').map_or(full, |(prefix, _)| prefix);
        Self {
            full_host: full.to_owned(),
            short_host: short.to_owned(),
            run_host: full.to_owned(),
            run_short_host: short.to_owned(),
        }
    }

    /// Every field set to [`FALLBACK_HOST`].
    #[must_use]
    pub fn fallback() -> Self {
        Self::from_hostname(FALLBACK_HOST)
    }
}

/// Resolve the local host names. Never fails.
#[must_use]
pub fn resolve_host(probe: &dyn SystemProbe) -> HostInfo {
    match probe.hostname() {
        Some(name) if !name.is_empty() => HostInfo::from_hostname(&name),
        _ => {
            log::debug!("hostname lookup failed, using {FALLBACK_HOST}");
            HostInfo::fallback()
        }
    }
}
