/// Serializable types for the converted policy document.
///
/// These are what gets written out. Key names follow the established
/// sudoers JSON layout (`User_Specs`, `Cmnd_Specs`, `runasusers`, ...), so
/// existing consumers can read the output unchanged.
use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::context::defaults::SettingValue;

/// What a list member refers to. Serialized as the member's JSON key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Username,
    Userid,
    Usergroup,
    Usergid,
    Netgroup,
    Useralias,
    Hostname,
    Networkaddr,
    Hostalias,
    Command,
    Cmndalias,
    Runasalias,
}

impl MemberKind {
    /// JSON key for this kind.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Userid => "userid",
            Self::Usergroup => "usergroup",
            Self::Usergid => "usergid",
            Self::Netgroup => "netgroup",
            Self::Useralias => "useralias",
            Self::Hostname => "hostname",
            Self::Networkaddr => "networkaddr",
            Self::Hostalias => "hostalias",
            Self::Command => "command",
            Self::Cmndalias => "cmndalias",
            Self::Runasalias => "runasalias",
        }
    }
}

/// One entry of a user, host, runas or command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub kind: MemberKind,
    pub value: String,
    pub negated: bool,
}

impl Member {
    #[must_use]
    pub fn new(kind: MemberKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            negated: false,
        }
    }
}

impl Serialize for Member {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if self.negated {
            map.serialize_entry("negated", &true)?;
        }
        map.serialize_entry(self.kind.key(), &self.value)?;
        map.end()
    }
}

/// A validated `Defaults` setting.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsOption {
    pub name: String,
    pub value: SettingValue,
}

impl Serialize for DefaultsOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.value {
            SettingValue::Bool(b) => map.serialize_entry(&self.name, b)?,
            SettingValue::Integer(n) => map.serialize_entry(&self.name, n)?,
            SettingValue::Float(f) => map.serialize_entry(&self.name, f)?,
            SettingValue::Text(s) => map.serialize_entry(&self.name, s)?,
            SettingValue::List { op, items } => {
                map.serialize_entry("operation", op)?;
                map.serialize_entry(&self.name, items)?;
            }
        }
        map.end()
    }
}

/// One `Defaults` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultsEntry {
    /// Hosts, users, runas users or commands the line is bound to.
    #[serde(rename = "Binding", skip_serializing_if = "Vec::is_empty")]
    pub binding: Vec<Member>,
    #[serde(rename = "Options")]
    pub options: Vec<DefaultsOption>,
}

/// A command tag such as `NOPASSWD`, as a boolean option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOption {
    pub name: &'static str,
    pub value: bool,
}

impl Serialize for TagOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.name, &self.value)?;
        map.end()
    }
}

/// Commands sharing one runas list and tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmndSpec {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runasusers: Vec<Member>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runasgroups: Vec<Member>,
    #[serde(rename = "Options", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<TagOption>,
    #[serde(rename = "Commands")]
    pub commands: Vec<Member>,
}

/// One host block of a user specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSpec {
    #[serde(rename = "User_List")]
    pub users: Vec<Member>,
    #[serde(rename = "Host_List")]
    pub hosts: Vec<Member>,
    #[serde(rename = "Cmnd_Specs")]
    pub cmnd_specs: Vec<CmndSpec>,
}

/// The converted policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Defaults", skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<DefaultsEntry>,
    #[serde(rename = "User_Aliases", skip_serializing_if = "BTreeMap::is_empty")]
    pub user_aliases: BTreeMap<String, Vec<Member>>,
    #[serde(rename = "Runas_Aliases", skip_serializing_if = "BTreeMap::is_empty")]
    pub runas_aliases: BTreeMap<String, Vec<Member>>,
    #[serde(rename = "Host_Aliases", skip_serializing_if = "BTreeMap::is_empty")]
    pub host_aliases: BTreeMap<String, Vec<Member>>,
    #[serde(rename = "Command_Aliases", skip_serializing_if = "BTreeMap::is_empty")]
    pub command_aliases: BTreeMap<String, Vec<Member>>,
    #[serde(rename = "User_Specs", skip_serializing_if = "Vec::is_empty")]
    pub user_specs: Vec<UserSpec>,
}
