//! Source text access and sanitising.
//!
//! Sanitising replaces comment text (and optionally template-literal
//! bodies) with spaces. Every character maps to exactly one character and
//! newlines are kept, so line and column positions computed on the
//! sanitised text are valid for the original file.
//!
//! A `/` opens a regular-expression literal when the code before it
//! cannot end an operand: an operator or punctuation other than `)`, `]`,
//! `}` and `<`, a keyword such as `return`, or the start of the text. Regex bodies are kept
//! as code; only their `/`, `*` and quote characters lose their comment
//! and string meaning. The rule is lexical, so a regex directly after `}`
//! is read as division.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::display_path;

/// Reads source files. The I/O seam of the analyzer.
pub trait SourceReader: Send + Sync {
    /// Reads a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns any I/O error, including invalid UTF-8.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Reads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory sources for tests and embedding.
///
/// Files are registered by project-relative path; lookups strip the
/// configured root first, so the reader works with any project directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    root: PathBuf,
    files: BTreeMap<String, String>,
}

impl MemoryReader {
    /// Creates an empty reader rooted at the relative empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project directory lookups are relative to.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Adds a file at a project-relative, `/`-separated path.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// All registered paths, in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn lookup(&self, path: &Path) -> Option<&String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        self.files.get(&display_path(rel))
    }
}

impl SourceReader for MemoryReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.lookup(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not loaded", path.display()),
            )
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(char),
    Template,
    Regex { in_class: bool },
}

/// Keywords after which a `/` starts a regex literal.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a `/` following the already-sanitised `before` starts a regex
/// literal rather than a division.
fn starts_regex(before: &str) -> bool {
    let code = before.trim_end();
    match code.chars().next_back() {
        None => true,
        // `<` keeps JSX closing tags such as `</div>` out of regex mode
        Some(')' | ']' | '}' | '<' | '\'' | '"' | '`') => false,
        Some(c) if is_word_char(c) => {
            let word = code.rsplit(|c: char| !is_word_char(c)).next().unwrap_or_default();
            REGEX_PREFIX_KEYWORDS.contains(&word)
        }
        Some(_) => true,
    }
}

/// Blanks comments, and template-literal bodies when `blank_templates`
/// is set. Quote and backtick delimiters are kept.
#[must_use]
pub fn sanitize(text: &str, blank_templates: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    // Brace depth of each open `${ ... }` inside a template literal.
    let mut template_exprs: Vec<usize> = Vec::new();
    let mut chars = text.chars().peekable();

    let blank = |c: char| if c == '\n' { '\n' } else { ' ' };

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '/' if starts_regex(&out) => {
                    out.push(c);
                    state = State::Regex { in_class: false };
                }
                '\'' | '"' => {
                    out.push(c);
                    state = State::Str(c);
                }
                '`' => {
                    out.push(c);
                    state = State::Template;
                }
                '{' => {
                    if let Some(depth) = template_exprs.last_mut() {
                        *depth += 1;
                    }
                    out.push(c);
                }
                '}' => match template_exprs.last_mut() {
                    Some(0) => {
                        template_exprs.pop();
                        out.push(if blank_templates { ' ' } else { c });
                        state = State::Template;
                    }
                    Some(depth) => {
                        *depth -= 1;
                        out.push(c);
                    }
                    None => out.push(c),
                },
                _ => out.push(c),
            },
            State::LineComment => {
                out.push(blank(c));
                if c == '\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    out.push(blank(c));
                }
            }
            State::Str(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                        if next == '\r' && chars.peek() == Some(&'\n') {
                            chars.next();
                            out.push('\n');
                        }
                    }
                } else if c == quote || c == '\n' {
                    state = State::Code;
                }
            }
            State::Regex { in_class } => {
                out.push(c);
                match c {
                    '\\' => match chars.next() {
                        Some('\n') => {
                            out.push('\n');
                            state = State::Code;
                        }
                        Some(next) => out.push(next),
                        None => {}
                    },
                    '[' => state = State::Regex { in_class: true },
                    ']' => state = State::Regex { in_class: false },
                    '/' if !in_class => state = State::Code,
                    '\n' => state = State::Code,
                    _ => {}
                }
            }
            State::Template => match c {
                '`' => {
                    out.push(c);
                    state = State::Code;
                }
                '\\' => {
                    out.push(if blank_templates { ' ' } else { c });
                    if let Some(next) = chars.next() {
                        out.push(if blank_templates { blank(next) } else { next });
                    }
                }
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push_str(if blank_templates { "  " } else { "${" });
                    template_exprs.push(0);
                    state = State::Code;
                }
                _ => out.push(if blank_templates { blank(c) } else { c }),
            },
        }
    }
    out
}

/// Maps byte offsets to 1-based `(line, column)` positions.
///
/// Columns count characters, not bytes.
#[derive(Debug)]
pub struct LineIndex<'t> {
    text: &'t str,
    starts: Vec<usize>,
}

impl<'t> LineIndex<'t> {
    /// Indexes the line starts of `text`.
    #[must_use]
    pub fn new(text: &'t str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    /// Position of a byte offset.
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset);
        let start = self.starts[line - 1];
        let column = self
            .text
            .get(start..offset)
            .map_or(0, |s| s.chars().count());
        (line, column + 1)
    }
}
