/// Sudoers grammar: turns one logical line into an [`Entry`].
use std::net::IpAddr;

use crate::context::defaults::SettingOp;
use crate::types::{CmndSpec, Member, MemberKind, TagOption, UserSpec};

use super::errors::ParseError;
use super::lexer::{Cursor, NAME_STOPS};

/// Which alias table a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    User,
    Runas,
    Host,
    Command,
}

/// One `NAME = members` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDef {
    pub kind: AliasKind,
    pub name: String,
    pub members: Vec<Member>,
}

/// A `Defaults` setting before type checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSetting {
    pub name: String,
    pub negated: bool,
    pub op: SettingOp,
    pub value: Option<String>,
}

/// A parsed logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Defaults {
        binding: Vec<Member>,
        settings: Vec<RawSetting>,
    },
    Aliases(Vec<AliasDef>),
    UserSpecs(Vec<UserSpec>),
    Include {
        path: String,
        directory: bool,
    },
}

/// Kind of list being parsed, which decides how a bare word is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    User,
    Host,
    RunasUser,
    RunasGroup,
    Command,
}

const ALIAS_KEYWORDS: &[(&str, AliasKind)] = &[
    ("User_Alias", AliasKind::User),
    ("Runas_Alias", AliasKind::Runas),
    ("Host_Alias", AliasKind::Host),
    ("Cmnd_Alias", AliasKind::Command),
    ("Cmd_Alias", AliasKind::Command),
];

const TAGS: &[(&str, &str, bool)] = &[
    ("NOPASSWD", "authenticate", false),
    ("PASSWD", "authenticate", true),
    ("NOEXEC", "noexec", true),
    ("EXEC", "noexec", false),
    ("SETENV", "setenv", true),
    ("NOSETENV", "setenv", false),
    ("LOG_INPUT", "log_input", true),
    ("NOLOG_INPUT", "log_input", false),
    ("LOG_OUTPUT", "log_output", true),
    ("NOLOG_OUTPUT", "log_output", false),
    ("MAIL", "send_mail", true),
    ("NOMAIL", "send_mail", false),
    ("FOLLOW", "sudoedit_follow", true),
    ("NOFOLLOW", "sudoedit_follow", false),
];

/// `[A-Z][A-Z0-9_]*`, excluding the reserved word `ALL`.
#[must_use]
pub fn is_alias_name(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && word != "ALL"
}

/// Parse one logical line.
///
/// # Errors
///
/// Returns `ParseError` (without a file name) on a syntax error.
pub fn parse_line(text: &str, line: usize) -> Result<Entry, ParseError> {
    LineParser {
        cur: Cursor::new(text),
        line,
    }
    .entry()
}

struct LineParser<'a> {
    cur: Cursor<'a>,
    line: usize,
}

impl LineParser<'_> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        let near = self.cur.rest().trim();
        let mut message = message.into();
        if !near.is_empty() {
            message = format!("{message} near \"{near}\"");
        }
        ParseError::new(self.line, message)
    }

    fn entry(mut self) -> Result<Entry, ParseError> {
        self.cur.skip_ws();

        for (directive, directory) in [
            ("#includedir", true),
            ("@includedir", true),
            ("#include", false),
            ("@include", false),
        ] {
            let start = self.cur.pos();
            if self.cur.eat_str(directive) && self.cur.peek().is_some_and(char::is_whitespace) {
                return self.include(directory);
            }
            self.cur.reset(start);
        }

        if let Some(after) = self.cur.rest().strip_prefix("Defaults") {
            if after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || "@:!>".contains(c)) {
                self.cur.eat_str("Defaults");
                return self.defaults();
            }
        }

        for (keyword, kind) in ALIAS_KEYWORDS {
            let start = self.cur.pos();
            if self.cur.eat_str(keyword) && self.cur.peek().is_some_and(char::is_whitespace) {
                return self.aliases(*kind);
            }
            self.cur.reset(start);
        }

        self.user_specs()
    }

    fn include(&mut self, directory: bool) -> Result<Entry, ParseError> {
        self.cur.skip_ws();
        let path = self.cur.word(&[]);
        if path.is_empty() {
            return Err(self.error("missing include path"));
        }
        if !self.cur.at_end() {
            return Err(self.error("unexpected text after include path"));
        }
        Ok(Entry::Include { path, directory })
    }

    fn defaults(&mut self) -> Result<Entry, ParseError> {
        let binding_kind = match self.cur.peek() {
            Some('@') => Some(ListKind::Host),
            Some(':') => Some(ListKind::User),
            Some('>') => Some(ListKind::RunasUser),
            Some('!') => Some(ListKind::Command),
            _ => None,
        };

        let mut binding = Vec::new();
        if let Some(kind) = binding_kind {
            self.cur.bump();
            loop {
                binding.push(self.binding_member(kind)?);
                if self.cur.peek() == Some(',') {
                    self.cur.bump();
                } else {
                    break;
                }
            }
        }

        let mut settings = Vec::new();
        loop {
            settings.push(self.setting()?);
            if self.cur.eat(',') {
                continue;
            }
            if self.cur.at_end() {
                break;
            }
            return Err(self.error("syntax error in Defaults"));
        }
        Ok(Entry::Defaults { binding, settings })
    }

    /// Binding members are packed against the sigil: no spaces allowed.
    fn binding_member(&mut self, kind: ListKind) -> Result<Member, ParseError> {
        let mut negated = false;
        while self.cur.peek() == Some('!') {
            self.cur.bump();
            negated = !negated;
        }
        let word = self.cur.word(&[',']);
        if word.is_empty() {
            return Err(self.error("missing Defaults binding"));
        }
        let mut member = classify(kind, &word);
        member.negated = negated;
        Ok(member)
    }

    fn setting(&mut self) -> Result<RawSetting, ParseError> {
        self.cur.skip_ws();
        let mut negated = false;
        while self.cur.eat('!') {
            negated = !negated;
        }
        self.cur.skip_ws();

        let start = self.cur.pos();
        while self
            .cur
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.cur.bump();
        }
        let name = self.cur.since(start);
        if name.is_empty() {
            return Err(self.error("expected Defaults option name"));
        }
        let name = name.to_owned();

        self.cur.skip_ws();
        let op = if self.cur.eat_str("+=") {
            SettingOp::Add
        } else if self.cur.eat_str("-=") {
            SettingOp::Remove
        } else if self.cur.eat_str("=") {
            SettingOp::Assign
        } else {
            return Ok(RawSetting {
                name,
                negated,
                op: SettingOp::Assign,
                value: None,
            });
        };

        self.cur.skip_ws();
        let value = self.cur.word(&[',']);
        Ok(RawSetting {
            name,
            negated,
            op,
            value: Some(value),
        })
    }

    fn aliases(&mut self, kind: AliasKind) -> Result<Entry, ParseError> {
        let list_kind = match kind {
            AliasKind::User => ListKind::User,
            AliasKind::Runas => ListKind::RunasUser,
            AliasKind::Host => ListKind::Host,
            AliasKind::Command => ListKind::Command,
        };

        let mut defs = Vec::new();
        loop {
            self.cur.skip_ws();
            let name = self.cur.word(NAME_STOPS);
            if !is_alias_name(&name) {
                return Err(self.error(format!("invalid alias name \"{name}\"")));
            }
            if !self.cur.eat('=') {
                return Err(self.error("expected '=' after alias name"));
            }
            let members = self.member_list(list_kind)?;
            defs.push(AliasDef {
                kind,
                name,
                members,
            });
            if self.cur.eat(':') {
                continue;
            }
            if self.cur.at_end() {
                return Ok(Entry::Aliases(defs));
            }
            return Err(self.error("syntax error in alias definition"));
        }
    }

    fn member_list(&mut self, kind: ListKind) -> Result<Vec<Member>, ParseError> {
        let mut members = vec![self.member(kind)?];
        while self.cur.eat(',') {
            members.push(self.member(kind)?);
        }
        Ok(members)
    }

    fn member(&mut self, kind: ListKind) -> Result<Member, ParseError> {
        let mut negated = false;
        while self.cur.eat('!') {
            negated = !negated;
        }
        self.cur.skip_ws();

        let mut member = if kind == ListKind::Command {
            self.command()?
        } else {
            let word = self.cur.word(NAME_STOPS);
            if word.is_empty() {
                return Err(self.error("expected a name"));
            }
            classify(kind, &word)
        };
        member.negated = negated;
        Ok(member)
    }

    fn command(&mut self) -> Result<Member, ParseError> {
        let start = self.cur.pos();
        let word = self.cur.word(NAME_STOPS);
        let next = {
            let mut probe = self.cur.clone();
            probe.skip_ws();
            probe.peek()
        };
        let ends_here = matches!(next, None | Some(',' | ':'));
        if ends_here && (word == "ALL" || is_alias_name(&word)) {
            return Ok(classify(ListKind::Command, &word));
        }

        self.cur.reset(start);
        let text = self.cur.command();
        if !(text.starts_with('/') || text == "sudoedit" || text.starts_with("sudoedit ")) {
            return Err(self.error("expected a fully-qualified command"));
        }
        Ok(Member::new(MemberKind::Command, text))
    }

    fn user_specs(&mut self) -> Result<Entry, ParseError> {
        let users = self.member_list(ListKind::User)?;
        let mut specs = Vec::new();

        loop {
            let hosts = self.member_list(ListKind::Host)?;
            if !self.cur.eat('=') {
                return Err(self.error("syntax error"));
            }
            let cmnd_specs = self.cmnd_specs()?;
            specs.push(UserSpec {
                users: users.clone(),
                hosts,
                cmnd_specs,
            });
            if self.cur.eat(':') {
                continue;
            }
            if self.cur.at_end() {
                return Ok(Entry::UserSpecs(specs));
            }
            return Err(self.error("syntax error"));
        }
    }

    /// Commands of one host block. Runas lists and tags carry over from one
    /// command to the next until overridden.
    fn cmnd_specs(&mut self) -> Result<Vec<CmndSpec>, ParseError> {
        let mut specs: Vec<CmndSpec> = Vec::new();
        let mut runasusers: Vec<Member> = Vec::new();
        let mut runasgroups: Vec<Member> = Vec::new();
        let mut tags: Vec<TagOption> = Vec::new();

        loop {
            let mut changed = specs.is_empty();

            if self.cur.eat('(') {
                let (users, groups) = self.runas()?;
                runasusers = users;
                runasgroups = groups;
                changed = true;
            }

            while let Some(tag) = self.tag() {
                match tags.iter_mut().find(|t| t.name == tag.name) {
                    Some(existing) if existing.value == tag.value => {}
                    Some(existing) => {
                        existing.value = tag.value;
                        changed = true;
                    }
                    None => {
                        tags.push(tag);
                        changed = true;
                    }
                }
            }

            let command = self.member(ListKind::Command)?;
            match specs.last_mut() {
                Some(last) if !changed => last.commands.push(command),
                _ => specs.push(CmndSpec {
                    runasusers: runasusers.clone(),
                    runasgroups: runasgroups.clone(),
                    options: tags.clone(),
                    commands: vec![command],
                }),
            }

            if !self.cur.eat(',') {
                return Ok(specs);
            }
        }
    }

    /// `(users[:groups])`, opening parenthesis already consumed.
    fn runas(&mut self) -> Result<(Vec<Member>, Vec<Member>), ParseError> {
        let mut users = Vec::new();
        let mut groups = Vec::new();

        self.cur.skip_ws();
        if !matches!(self.cur.peek(), Some(':' | ')')) {
            users = self.member_list(ListKind::RunasUser)?;
        }
        if self.cur.eat(':') {
            self.cur.skip_ws();
            if self.cur.peek() != Some(')') {
                groups = self.member_list(ListKind::RunasGroup)?;
            }
        }
        if !self.cur.eat(')') {
            return Err(self.error("expected ')' after runas list"));
        }
        Ok((users, groups))
    }

    /// Consume a `TAG:` prefix if one is next.
    fn tag(&mut self) -> Option<TagOption> {
        let start = self.cur.pos();
        self.cur.skip_ws();
        let word = self.cur.word(NAME_STOPS);
        if self.cur.peek() == Some(':') {
            if let Some((_, name, value)) = TAGS.iter().find(|(t, _, _)| *t == word) {
                self.cur.bump();
                return Some(TagOption {
                    name: *name,
                    value: *value,
                });
            }
        }
        self.cur.reset(start);
        None
    }
}

/// Classify a bare word according to the list it appears in.
fn classify(kind: ListKind, word: &str) -> Member {
    let member_kind = match kind {
        ListKind::Command => {
            if is_alias_name(word) {
                MemberKind::Cmndalias
            } else {
                MemberKind::Command
            }
        }
        ListKind::Host => {
            if let Some(netgroup) = word.strip_prefix('+') {
                return Member::new(MemberKind::Netgroup, netgroup);
            }
            if is_alias_name(word) {
                MemberKind::Hostalias
            } else if is_network_addr(word) {
                MemberKind::Networkaddr
            } else {
                MemberKind::Hostname
            }
        }
        ListKind::User | ListKind::RunasUser | ListKind::RunasGroup => {
            if let Some(gid) = word.strip_prefix("%#") {
                return Member::new(MemberKind::Usergid, gid);
            }
            if let Some(group) = word.strip_prefix('%') {
                return Member::new(MemberKind::Usergroup, group);
            }
            if let Some(netgroup) = word.strip_prefix('+') {
                return Member::new(MemberKind::Netgroup, netgroup);
            }
            if let Some(id) = word.strip_prefix('#') {
                let id_kind = if kind == ListKind::RunasGroup {
                    MemberKind::Usergid
                } else {
                    MemberKind::Userid
                };
                return Member::new(id_kind, id);
            }
            if is_alias_name(word) {
                if kind == ListKind::User {
                    MemberKind::Useralias
                } else {
                    MemberKind::Runasalias
                }
            } else if kind == ListKind::RunasGroup {
                MemberKind::Usergroup
            } else {
                MemberKind::Username
            }
        }
    };
    Member::new(member_kind, word)
}

/// An IP address, optionally followed by `/prefix` or `/netmask`.
fn is_network_addr(word: &str) -> bool {
    let (addr, mask) = match word.split_once('/') {
        Some((addr, mask)) => (addr, Some(mask)),
        None => (word, None),
    };
    addr.parse::<IpAddr>().is_ok()
        && mask.is_none_or(|m| m.parse::<u8>().is_ok() || m.parse::<IpAddr>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Entry {
        parse_line(text, 1).unwrap()
    }

    fn m(kind: MemberKind, value: &str) -> Member {
        Member::new(kind, value)
    }

    fn specs(text: &str) -> Vec<UserSpec> {
        match parse(text) {
            Entry::UserSpecs(specs) => specs,
            other => panic!("expected user specs, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_user_spec() {
        let specs = specs("alice ALL=(ALL) ALL");
        assert_eq!(specs.len(), 1);
        let spec = &specs[0];
        assert_eq!(spec.users, vec![m(MemberKind::Username, "alice")]);
        assert_eq!(spec.hosts, vec![m(MemberKind::Hostname, "ALL")]);
        assert_eq!(spec.cmnd_specs.len(), 1);
        assert_eq!(spec.cmnd_specs[0].runasusers, vec![m(MemberKind::Username, "ALL")]);
        assert_eq!(spec.cmnd_specs[0].commands, vec![m(MemberKind::Command, "ALL")]);
    }

    #[test]
    fn test_tags_and_runas_carry_over() {
        let specs = specs(
            "%wheel web1, WEBHOSTS = (root:adm) NOPASSWD: /bin/ls -l, /bin/cat, PASSWD: /bin/rm",
        );
        let spec = &specs[0];
        assert_eq!(spec.users, vec![m(MemberKind::Usergroup, "wheel")]);
        assert_eq!(
            spec.hosts,
            vec![m(MemberKind::Hostname, "web1"), m(MemberKind::Hostalias, "WEBHOSTS")]
        );
        assert_eq!(spec.cmnd_specs.len(), 2);

        let first = &spec.cmnd_specs[0];
        assert_eq!(first.runasgroups, vec![m(MemberKind::Usergroup, "adm")]);
        assert_eq!(
            first.options,
            vec![TagOption {
                name: "authenticate",
                value: false
            }]
        );
        assert_eq!(
            first.commands,
            vec![m(MemberKind::Command, "/bin/ls -l"), m(MemberKind::Command, "/bin/cat")]
        );

        let second = &spec.cmnd_specs[1];
        assert_eq!(second.runasusers, vec![m(MemberKind::Username, "root")]);
        assert!(second.options[0].value);
    }

    #[test]
    fn test_repeated_tag_does_not_split_commands() {
        let specs = specs("alice ALL = NOPASSWD: /bin/a, NOPASSWD: /bin/b, (root) NOPASSWD: /bin/c");
        let cmnd_specs = &specs[0].cmnd_specs;
        assert_eq!(cmnd_specs.len(), 2);
        assert_eq!(
            cmnd_specs[0].commands,
            vec![m(MemberKind::Command, "/bin/a"), m(MemberKind::Command, "/bin/b")]
        );
        assert_eq!(cmnd_specs[1].runasusers, vec![m(MemberKind::Username, "root")]);
        assert_eq!(cmnd_specs[1].options.len(), 1);
    }

    #[test]
    fn test_multiple_host_blocks() {
        let specs = specs("bob db1 = /usr/bin/psql : 10.0.0.0/8 = !/bin/sh, CMNDS");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].users, vec![m(MemberKind::Username, "bob")]);
        assert_eq!(specs[1].hosts, vec![m(MemberKind::Networkaddr, "10.0.0.0/8")]);
        let cmds = &specs[1].cmnd_specs[0].commands;
        assert!(cmds[0].negated);
        assert_eq!(cmds[0].value, "/bin/sh");
        assert_eq!(cmds[1], m(MemberKind::Cmndalias, "CMNDS"));
    }

    #[test]
    fn test_user_kinds() {
        let specs = specs("#1000, %#20, +admins, OPS, !mallory ALL = ALL");
        let users = &specs[0].users;
        assert_eq!(users[0], m(MemberKind::Userid, "1000"));
        assert_eq!(users[1], m(MemberKind::Usergid, "20"));
        assert_eq!(users[2], m(MemberKind::Netgroup, "admins"));
        assert_eq!(users[3], m(MemberKind::Useralias, "OPS"));
        assert!(users[4].negated);
    }

    #[test]
    fn test_aliases() {
        let entry = parse("Host_Alias WEB = web1, web2 : DB = 192.168.0.5");
        let Entry::Aliases(defs) = entry else {
            panic!("expected aliases");
        };
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "WEB");
        assert_eq!(defs[0].members.len(), 2);
        assert_eq!(defs[1].members, vec![m(MemberKind::Networkaddr, "192.168.0.5")]);
    }

    #[test]
    fn test_bad_alias_name() {
        assert!(parse_line("User_Alias admins = alice", 7).is_err());
        assert!(parse_line("Cmnd_Alias ALL = /bin/ls", 7).is_err());
    }

    #[test]
    fn test_defaults() {
        let entry = parse(r#"Defaults:%wheel,bob !lecture, env_keep += "LANG LC_ALL", passwd_tries=5"#);
        let Entry::Defaults { binding, settings } = entry else {
            panic!("expected defaults");
        };
        assert_eq!(
            binding,
            vec![m(MemberKind::Usergroup, "wheel"), m(MemberKind::Username, "bob")]
        );
        assert_eq!(settings.len(), 3);
        assert!(settings[0].negated);
        assert_eq!(settings[0].value, None);
        assert_eq!(settings[1].op, SettingOp::Add);
        assert_eq!(settings[1].value.as_deref(), Some("LANG LC_ALL"));
        assert_eq!(settings[2].value.as_deref(), Some("5"));
    }

    #[test]
    fn test_defaults_command_binding() {
        let Entry::Defaults { binding, .. } = parse("Defaults!/usr/bin/less noexec") else {
            panic!("expected defaults");
        };
        assert_eq!(binding, vec![m(MemberKind::Command, "/usr/bin/less")]);
    }

    #[test]
    fn test_includes() {
        assert_eq!(
            parse("#includedir /etc/sudoers.d"),
            Entry::Include {
                path: "/etc/sudoers.d".to_owned(),
                directory: true
            }
        );
        assert_eq!(
            parse(r#"@include "/etc/sudoers.%h""#),
            Entry::Include {
                path: "/etc/sudoers.%h".to_owned(),
                directory: false
            }
        );
    }

    #[test]
    fn test_relative_command_rejected() {
        let err = parse_line("alice ALL = ls", 3).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("fully-qualified"));
    }

    #[test]
    fn test_missing_equals() {
        assert!(parse_line("alice ALL /bin/ls", 1).is_err());
    }
}
