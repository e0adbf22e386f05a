/// In-memory [`SystemProbe`] for unit tests.
use std::collections::HashMap;

use super::identity::Identity;
use super::probe::SystemProbe;

#[derive(Debug, Default)]
pub struct FakeProbe {
    euid: u32,
    uid: u32,
    env: HashMap<String, String>,
    users: Vec<Identity>,
    hostname: Option<String>,
}

impl FakeProbe {
    pub fn new(euid: u32, uid: u32) -> Self {
        Self {
            euid,
            uid,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, name: &str, uid: u32) -> Self {
        self.users.push(Identity {
            name: name.to_owned(),
            uid,
            gid: uid,
            home: format!("/home/{name}"),
            shell: "/bin/sh".to_owned(),
            gecos: name.to_owned(),
        });
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_hostname(mut self, name: &str) -> Self {
        self.hostname = Some(name.to_owned());
        self
    }
}

impl SystemProbe for FakeProbe {
    fn effective_uid(&self) -> u32 {
        self.euid
    }

    fn real_uid(&self) -> u32 {
        self.uid
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn passwd_by_name(&self, name: &str) -> Option<Identity> {
        self.users.iter().find(|u| u.name == name).cloned()
    }

    fn passwd_by_uid(&self, uid: u32) -> Option<Identity> {
        self.users.iter().find(|u| u.uid == uid).cloned()
    }

    fn hostname(&self) -> Option<String> {
        self.hostname.clone()
    }
}
