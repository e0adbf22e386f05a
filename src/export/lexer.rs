/// Logical-line splitting and a character cursor for the sudoers grammar.

/// A line after comment removal and continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line.
    pub line: usize,
    pub text: String,
}

/// Split policy source into logical lines.
///
/// A trailing backslash joins the next physical line. `#` starts a comment
/// unless it is followed by a digit (a uid or gid) or begins an
/// `#include`/`#includedir` directive. Blank results are dropped.
#[must_use]
pub fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (idx, raw) in source.lines().enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let text = strip_comment(raw);
        let (body, continued) = match text.strip_suffix('\\') {
            Some(body) if !body.ends_with('\\') => (body, true),
            _ => (text, false),
        };

        let current = pending.get_or_insert_with(|| LogicalLine {
            line: idx + 1,
            text: String::new(),
        });
        if !current.text.is_empty() {
            current.text.push(' ');
        }
        current.text.push_str(body.trim());

        if !continued {
            if let Some(done) = pending.take() {
                if !done.text.is_empty() {
                    lines.push(done);
                }
            }
        }
    }

    // A continuation on the last line just ends the line.
    if let Some(done) = pending.take() {
        if !done.text.is_empty() {
            lines.push(done);
        }
    }
    lines
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => {
                let after = &line[i + 1..];
                let is_id = after.starts_with(|c: char| c.is_ascii_digit());
                let is_directive = line[..i].trim().is_empty()
                    && (starts_with_word(after, "includedir") || starts_with_word(after, "include"));
                if !is_id && !is_directive {
                    return line[..i].trim_end();
                }
            }
            _ => {}
        }
    }
    line.trim_end()
}

/// `text` starts with `word` followed by whitespace.
fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Characters that end a name or word token.
pub const NAME_STOPS: &[char] = &[',', ':', '=', '(', ')', '!'];

/// Byte cursor over one logical line.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Current byte offset, for backtracking with [`Cursor::reset`].
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Text consumed since byte offset `start`.
    #[must_use]
    pub fn since(&self, start: usize) -> &'a str {
        &self.text[start..self.pos]
    }

    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace, then consume `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `s` if the rest of the line starts with it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Only whitespace remains.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.rest().trim().is_empty()
    }

    /// Read a word up to whitespace or one of `stops`.
    ///
    /// A backslash takes the next character literally; a double-quoted
    /// section is taken verbatim without its quotes.
    pub fn word(&mut self, stops: &[char]) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                '"' => {
                    self.bump();
                    self.quoted_into(&mut out);
                }
                c if c.is_whitespace() || stops.contains(&c) => break,
                c => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        out
    }

    /// Read a command with its arguments, up to an unescaped `,` or `:`.
    pub fn command(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                ',' | ':' => break,
                c => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out
    }

    /// Read the body of a double-quoted string whose opening quote has
    /// already been consumed.
    fn quoted_into(&mut self, out: &mut String) {
        while let Some(c) = self.bump() {
            match c {
                '"' => return,
                '\\' => {
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                c => out.push(c),
            }
        }
    }
}
