/// Reads a policy and everything it includes into a flat list of entries.
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::cli::args::PolicySource;
use crate::policy_host::PolicyHost;

use super::errors::ExportError;
use super::lexer::logical_lines;
use super::parser::{Entry, parse_line};

/// Deepest include nesting accepted.
pub const MAX_INCLUDE_DEPTH: usize = 128;

/// A parsed entry and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedEntry {
    pub file: String,
    pub line: usize,
    pub entry: Entry,
}

/// Load `source` and its includes, in file order.
///
/// `short_host` replaces `%h` in include paths.
///
/// # Errors
///
/// Returns `ExportError` on I/O failure, a syntax error, a missing include
/// file, or include nesting beyond [`MAX_INCLUDE_DEPTH`].
pub fn load(
    host: &dyn PolicyHost,
    short_host: &str,
    source: &PolicySource,
) -> Result<Vec<SourcedEntry>, ExportError> {
    let mut loader = Loader {
        host,
        short_host,
        entries: Vec::new(),
    };
    loader.load_source(source, 0)?;
    Ok(loader.entries)
}

struct Loader<'a> {
    host: &'a dyn PolicyHost,
    short_host: &'a str,
    entries: Vec<SourcedEntry>,
}

impl Loader<'_> {
    fn load_source(&mut self, source: &PolicySource, depth: usize) -> Result<(), ExportError> {
        let name = source.to_string();
        let mut reader = self
            .host
            .open_policy(source)
            .map_err(|source| ExportError::Open {
                path: name.clone(),
                source,
            })?;
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| ExportError::Read {
                path: name.clone(),
                source,
            })?;
        drop(reader);

        log::debug!("reading {name}");

        let base_dir = match source {
            PolicySource::File(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
            PolicySource::Stdin => PathBuf::new(),
        };

        for line in logical_lines(&text) {
            let entry = parse_line(&line.text, line.line).map_err(|e| e.in_file(&name))?;
            match entry {
                Entry::Include { path, directory } => {
                    if depth + 1 >= MAX_INCLUDE_DEPTH {
                        return Err(ExportError::IncludeDepth {
                            file: name,
                            line: line.line,
                        });
                    }
                    let target = base_dir.join(expand_escapes(&path, self.short_host));
                    if directory {
                        self.load_dir(&target, depth + 1)?;
                    } else {
                        self.load_source(&PolicySource::File(target), depth + 1)?;
                    }
                }
                entry => self.entries.push(SourcedEntry {
                    file: name.clone(),
                    line: line.line,
                    entry,
                }),
            }
        }
        Ok(())
    }

    /// Read every eligible file in `dir` in lexical order. A missing
    /// directory is not an error.
    fn load_dir(&mut self, dir: &Path, depth: usize) -> Result<(), ExportError> {
        let listing = match fs::read_dir(dir) {
            Ok(listing) => listing,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("include directory {} does not exist, skipping", dir.display());
                return Ok(());
            }
            Err(source) => {
                return Err(ExportError::Open {
                    path: dir.display().to_string(),
                    source,
                });
            }
        };

        let mut files: Vec<PathBuf> = listing
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                !name.contains('.') && !name.ends_with('~')
            })
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for file in files {
            self.load_source(&PolicySource::File(file), depth)?;
        }
        Ok(())
    }
}

/// Expand `%h` to the short hostname and `%%` to `%`.
#[must_use]
pub fn expand_escapes(path: &str, short_host: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.peek() {
                Some('h') => {
                    chars.next();
                    out.push_str(short_host);
                    continue;
                }
                Some('%') => {
                    chars.next();
                    out.push('%');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy_host::CliHost;

    fn file(path: &Path) -> PolicySource {
        PolicySource::File(path.to_path_buf())
    }

    #[test]
    fn test_expand_escapes() {
        assert_eq!(expand_escapes("/etc/sudoers.%h", "web1"), "/etc/sudoers.web1");
        assert_eq!(expand_escapes("100%%", "x"), "100%");
        assert_eq!(expand_escapes("%u", "x"), "%u");
    }

    #[test]
    fn test_include_relative_and_host_expansion() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("sudoers"),
            "root ALL = ALL\n@include sudoers.%h\n",
        )
        .unwrap();
        fs::write(dir.path().join("sudoers.web1"), "alice ALL = ALL\n").unwrap();

        let entries = load(&CliHost, "web1", &file(&dir.path().join("sudoers"))).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].file.ends_with("sudoers.web1"));
        assert_eq!(entries[1].line, 1);
    }

    #[test]
    fn test_includedir_skips_dotted_and_backup_files() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().join("sudoers.d");
        fs::create_dir(&d).unwrap();
        fs::write(d.join("20-ops"), "bob ALL = ALL\n").unwrap();
        fs::write(d.join("10-dev"), "carol ALL = ALL\n").unwrap();
        fs::write(d.join("README.txt"), "not a policy\n").unwrap();
        fs::write(d.join("30-old~"), "not a policy\n").unwrap();
        fs::write(dir.path().join("sudoers"), "#includedir sudoers.d\n").unwrap();

        let entries = load(&CliHost, "h", &file(&dir.path().join("sudoers"))).unwrap();
        let files: Vec<&str> = entries
            .iter()
            .map(|e| e.file.rsplit('/').next().unwrap())
            .collect();
        assert_eq!(files, vec!["10-dev", "20-ops"]);
    }

    #[test]
    fn test_missing_includedir_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sudoers"), "#includedir nope.d\nroot ALL = ALL\n").unwrap();
        let entries = load(&CliHost, "h", &file(&dir.path().join("sudoers"))).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_include_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sudoers"), "#include missing\n").unwrap();
        let err = load(&CliHost, "h", &file(&dir.path().join("sudoers"))).unwrap_err();
        assert!(matches!(err, ExportError::Open { .. }));
    }

    #[test]
    fn test_self_include_hits_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loop"), "@include loop\n").unwrap();
        let err = load(&CliHost, "h", &file(&dir.path().join("loop"))).unwrap_err();
        assert!(matches!(err, ExportError::IncludeDepth { .. }));
    }

    #[test]
    fn test_syntax_error_names_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sudoers");
        fs::write(&path, "root ALL = ALL\n\nalice ALL ls\n").unwrap();
        let err = load(&CliHost, "h", &file(&path)).unwrap_err();
        let ExportError::Parse(parse) = err else {
            panic!("expected parse error, got {err:?}");
        };
        assert_eq!(parse.line, 3);
        assert_eq!(parse.file, path.display().to_string());
    }
}
