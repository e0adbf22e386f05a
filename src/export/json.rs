/// JSON exporter: policy source in, one JSON document out.
use std::collections::BTreeMap;
use std::collections::btree_map::Entry as MapEntry;
use std::fs;
use std::io::{self, Write};

use crate::cli::args::{OutputTarget, PolicySource};
use crate::context::defaults::{ListOp, SettingOp, SettingValue};
use crate::context::{DefaultsError, ExecutionContext, PolicyDefaults};
use crate::policy_host::{CliHost, PolicyHost};
use crate::types::{DefaultsEntry, DefaultsOption, Member, PolicyDocument};

use super::Exporter;
use super::errors::ExportError;
use super::loader::{SourcedEntry, load};
use super::parser::{AliasKind, Entry, RawSetting};

/// Converts sudoers to pretty-printed JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter<H: PolicyHost = CliHost> {
    host: H,
}

impl<H: PolicyHost> JsonExporter<H> {
    #[must_use]
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Read and validate `input` into a document without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` on any read, syntax or validation failure.
    pub fn convert(
        &self,
        ctx: &ExecutionContext,
        input: &PolicySource,
    ) -> Result<PolicyDocument, ExportError> {
        let entries = load(&self.host, &ctx.host.short_host, input)?;
        assemble(entries, &ctx.defaults)
    }
}

impl<H: PolicyHost> Exporter for JsonExporter<H> {
    fn export(
        &self,
        ctx: &ExecutionContext,
        input: &PolicySource,
        output: &OutputTarget,
    ) -> Result<(), ExportError> {
        if !self.host.init_env_tables() {
            return Err(ExportError::HostInit);
        }

        let document = self.convert(ctx, input)?;
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');

        write_output(output, json.as_bytes())?;
        log::info!("wrote {input} as JSON to {output}");
        Ok(())
    }
}

/// Fold entries into a document, type-checking `Defaults` and rejecting
/// duplicate aliases.
fn assemble(
    entries: Vec<SourcedEntry>,
    defaults: &PolicyDefaults,
) -> Result<PolicyDocument, ExportError> {
    let mut doc = PolicyDocument::default();

    for SourcedEntry { file, line, entry } in entries {
        match entry {
            Entry::Defaults { binding, settings } => {
                let mut options = Vec::with_capacity(settings.len());
                for setting in settings {
                    let value = match defaults.interpret(
                        &setting.name,
                        setting.negated,
                        setting.op,
                        setting.value.as_deref(),
                    ) {
                        Ok(value) => value,
                        Err(DefaultsError::UnknownOption(name)) => {
                            log::warn!("{file}:{line}: unknown defaults entry \"{name}\"");
                            untyped(&setting)
                        }
                        Err(source) => {
                            return Err(ExportError::Defaults {
                                file: file.clone(),
                                line,
                                source,
                            });
                        }
                    };
                    options.push(DefaultsOption {
                        name: setting.name,
                        value,
                    });
                }
                doc.defaults.push(DefaultsEntry { binding, options });
            }
            Entry::Aliases(defs) => {
                for def in defs {
                    let (table, label) = match def.kind {
                        AliasKind::User => (&mut doc.user_aliases, "User_Alias"),
                        AliasKind::Runas => (&mut doc.runas_aliases, "Runas_Alias"),
                        AliasKind::Host => (&mut doc.host_aliases, "Host_Alias"),
                        AliasKind::Command => (&mut doc.command_aliases, "Cmnd_Alias"),
                    };
                    insert_alias(table, def.name, def.members).map_err(|name| {
                        ExportError::DuplicateAlias {
                            file: file.clone(),
                            line,
                            table: label,
                            name,
                        }
                    })?;
                }
            }
            Entry::UserSpecs(specs) => doc.user_specs.extend(specs),
            // Already expanded by the loader.
            Entry::Include { .. } => {}
        }
    }

    Ok(doc)
}

/// Best-effort value for an option the table does not know: bare names
/// are booleans, anything else is kept as text.
fn untyped(setting: &RawSetting) -> SettingValue {
    match (&setting.value, setting.op) {
        (None, _) => SettingValue::Bool(!setting.negated),
        (Some(text), SettingOp::Assign) => SettingValue::Text(text.clone()),
        (Some(text), op) => SettingValue::List {
            op: if op == SettingOp::Add {
                ListOp::ListAdd
            } else {
                ListOp::ListRemove
            },
            items: text.split_whitespace().map(str::to_owned).collect(),
        },
    }
}

/// Insert a new alias; on a duplicate, hand the name back.
fn insert_alias(
    table: &mut BTreeMap<String, Vec<Member>>,
    name: String,
    members: Vec<Member>,
) -> Result<(), String> {
    match table.entry(name) {
        MapEntry::Occupied(existing) => Err(existing.key().clone()),
        MapEntry::Vacant(slot) => {
            slot.insert(members);
            Ok(())
        }
    }
}

fn write_output(output: &OutputTarget, bytes: &[u8]) -> Result<(), ExportError> {
    let result = match output {
        OutputTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).and_then(|()| stdout.flush())
        }
        OutputTarget::File(path) => fs::write(path, bytes),
    };
    result.map_err(|source| ExportError::Write {
        target: output.to_string(),
        source,
    })
}
