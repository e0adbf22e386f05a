/// Resolution of the user the policy is evaluated for.
use super::errors::ContextError;
use super::probe::SystemProbe;

/// Environment variable naming the user who invoked sudo.
pub const ACTING_USER_VAR: &str = "SUDO_USER";

/// A passwd-style record for the effective user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name.
    pub name: String,
    /// Numeric user id.
    pub uid: u32,
    /// Primary group id.
    pub gid: u32,
    /// Home directory.
    pub home: String,
    /// Login shell.
    pub shell: String,
    /// Display name (gecos field).
    pub gecos: String,
}

/// Where the resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// The `SUDO_USER` override, honored because the process runs as root.
    ActingUser,
    /// The real uid of the process.
    RealUid,
}

/// Whether the process currently holds elevated (root) effective privilege.
#[must_use]
pub fn is_elevated(probe: &dyn SystemProbe) -> bool {
    probe.effective_uid() == 0
}

/// The acting-user override, if it may be trusted.
///
/// Only consulted when elevated. An empty value counts as absent.
fn acting_user(probe: &dyn SystemProbe) -> Option<String> {
    if !is_elevated(probe) {
        return None;
    }
    probe
        .env_var(ACTING_USER_VAR)
        .filter(|name| !name.is_empty())
}

/// Resolve the identity to evaluate the policy as.
///
/// Prefers the acting user when elevated, then falls back to the real uid.
///
/// # Errors
///
/// Returns `ContextError::UnknownUser` if neither lookup yields a record.
pub fn resolve_identity(
    probe: &dyn SystemProbe,
) -> Result<(Identity, IdentitySource), ContextError> {
    if let Some(name) = acting_user(probe) {
        match probe.passwd_by_name(&name) {
            Some(identity) => return Ok((identity, IdentitySource::ActingUser)),
            None => log::debug!("{ACTING_USER_VAR}={name} has no passwd entry, using real uid"),
        }
    }

    let uid = probe.real_uid();
    probe
        .passwd_by_uid(uid)
        .map(|identity| (identity, IdentitySource::RealUid))
        .ok_or(ContextError::UnknownUser { uid })
}
