/// Execution context synthesis: who, where, and with which defaults the
/// policy is evaluated.
pub mod defaults;
pub mod errors;
pub mod host;
pub mod identity;
pub mod probe;

#[cfg(test)]
pub(crate) mod testing;

pub use defaults::{DefaultsError, PolicyDefaults};
pub use errors::ContextError;
pub use host::{HostInfo, resolve_host};
pub use identity::{Identity, IdentitySource, resolve_identity};
pub use probe::{OsProbe, SystemProbe};

/// Everything the exporter needs to know about the evaluation session.
///
/// Built once by [`synthesize`] and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub identity: Identity,
    pub identity_source: IdentitySource,
    pub host: HostInfo,
    pub defaults: PolicyDefaults,
}

/// Resolve identity, host names and defaults, in that order.
///
/// # Errors
///
/// Returns `ContextError` if no identity resolves or the defaults table
/// cannot be loaded. Hostname lookup failures are absorbed.
pub fn synthesize(probe: &dyn SystemProbe) -> Result<ExecutionContext, ContextError> {
    let (identity, identity_source) = resolve_identity(probe)?;
    let host = resolve_host(probe);
    let defaults = PolicyDefaults::builtin()?;

    log::debug!(
        "evaluating as {} (uid {}, {:?}) on {}",
        identity.name,
        identity.uid,
        identity_source,
        host.full_host
    );

    Ok(ExecutionContext {
        identity,
        identity_source,
        host,
        defaults,
    })
}
