/// Capabilities a policy evaluator expects from its host program.
///
/// A full sudo front end answers these from the live system. A converter
/// only reads the policy, so [`CliHost`] takes every default: no
/// environment tables to load, nobody exempt, no group plugin, no network
/// interfaces. Exporters receive the host at composition time and never
/// care which one they got.
use std::fs::File;
use std::io::{self, Read};
use std::net::IpAddr;

use crate::cli::args::PolicySource;
use crate::context::Identity;

/// A local network interface, used by host-list matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    pub addr: IpAddr,
    pub netmask: IpAddr,
}

/// Host-side hooks called while reading a policy.
pub trait PolicyHost {
    /// Prepare environment-variable tables. `false` aborts the run.
    fn init_env_tables(&self) -> bool {
        true
    }

    /// Whether `user` is exempt from authentication.
    fn user_is_exempt(&self, _user: &Identity) -> bool {
        false
    }

    /// Ask an external group plugin whether `user` belongs to `group`.
    fn group_plugin_query(&self, _user: &str, _group: &str, _identity: &Identity) -> bool {
        false
    }

    /// Local network interfaces.
    fn interfaces(&self) -> &[NetInterface] {
        &[]
    }

    /// Open a policy source for reading.
    ///
    /// # Errors
    ///
    /// Propagates the I/O error from opening the file.
    fn open_policy(&self, source: &PolicySource) -> io::Result<Box<dyn Read>> {
        match source {
            PolicySource::Stdin => Ok(Box::new(io::stdin())),
            PolicySource::File(path) => Ok(Box::new(File::open(path)?)),
        }
    }
}

/// Host for the command-line converter. Every hook is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliHost;

impl PolicyHost for CliHost {}
