//! Static import extraction.
//!
//! The text is sanitised (comments and template bodies blanked), split
//! into a small token stream, and scanned for `import`/`export`
//! statements whose keyword is the first token on its line. This is a
//! lexer-level scan, not a parser: it only needs to see the statement
//! shape up to the `from '<spec>'` clause.

use serde::Serialize;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::source::{sanitize, LineIndex};

/// How a specifier was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `import ... from 'x'`
    Import,
    /// `import 'x'`
    SideEffect,
    /// `export ... from 'x'`
    ReExport,
}

/// A specifier referenced by a static import or re-export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSpecifier {
    /// The specifier string, without quotes.
    pub specifier: String,
    /// 1-based line of the specifier literal.
    pub line: usize,
    /// 1-based column of the specifier literal's opening quote.
    pub column: usize,
    /// Statement kind.
    pub kind: ImportKind,
}

#[derive(Debug, PartialEq, Eq)]
enum TokenKind<'a> {
    Ident(&'a str),
    Str(String),
    Punct(char),
    Other,
}

#[derive(Debug)]
struct Token<'a> {
    kind: TokenKind<'a>,
    offset: usize,
    line_start: bool,
}

/// Extracts static import specifiers in source order.
#[must_use]
pub fn extract_imports(text: &str) -> Vec<ImportSpecifier> {
    let clean = sanitize(text, true);
    let tokens = tokenize(&clean);
    let index = LineIndex::new(&clean);

    let mut found = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let hit = if token.line_start {
            match token.kind {
                TokenKind::Ident("import") => parse_import(&tokens, i),
                TokenKind::Ident("export") => parse_export(&tokens, i),
                _ => None,
            }
        } else {
            None
        };

        match hit {
            Some((at, kind)) => {
                let spec = &tokens[at];
                if let TokenKind::Str(value) = &spec.kind {
                    let (line, column) = index.position(spec.offset);
                    found.push(ImportSpecifier {
                        specifier: value.clone(),
                        line,
                        column,
                        kind,
                    });
                }
                i = at + 1;
            }
            None => i += 1,
        }
    }
    found
}

fn parse_import(tokens: &[Token<'_>], at: usize) -> Option<(usize, ImportKind)> {
    match tokens.get(at + 1)?.kind {
        TokenKind::Str(_) => Some((at + 1, ImportKind::SideEffect)),
        // `import(...)` and `import.meta`
        TokenKind::Punct('(' | '.') => None,
        _ => find_from(tokens, at + 1).map(|j| (j, ImportKind::Import)),
    }
}

fn parse_export(tokens: &[Token<'_>], at: usize) -> Option<(usize, ImportKind)> {
    let start = match tokens.get(at + 1)?.kind {
        TokenKind::Punct('*' | '{') => at + 1,
        TokenKind::Ident("type") => match tokens.get(at + 2)?.kind {
            TokenKind::Punct('*' | '{') => at + 2,
            _ => return None,
        },
        _ => return None,
    };
    find_from(tokens, start).map(|j| (j, ImportKind::ReExport))
}

/// Index of the string after the statement's `from`, if the statement
/// starting at `start` has one.
fn find_from(tokens: &[Token<'_>], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, token) in tokens.iter().enumerate().skip(start) {
        if j > start
            && token.line_start
            && matches!(token.kind, TokenKind::Ident("import" | "export"))
        {
            return None;
        }
        match token.kind {
            TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct('}') => depth = depth.saturating_sub(1),
            TokenKind::Punct(';' | '=' | '(') | TokenKind::Str(_) => return None,
            TokenKind::Ident("from") if depth == 0 => {
                if let Some(TokenKind::Str(_)) = tokens.get(j + 1).map(|t| &t.kind) {
                    return Some(j + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn consume_while(
    chars: &mut Peekable<CharIndices<'_>>,
    len: usize,
    pred: impl Fn(char) -> bool,
) -> usize {
    while let Some(&(i, c)) = chars.peek() {
        if !pred(c) {
            return i;
        }
        chars.next();
    }
    len
}

/// Reads a quoted string after its opening quote. Strings end at a
/// newline unless it is escaped; an unterminated string yields `None` and
/// leaves the newline.
fn read_string(chars: &mut Peekable<CharIndices<'_>>, quote: char) -> Option<String> {
    let mut value = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c == '\n' {
            return None;
        }
        chars.next();
        if c == quote {
            return Some(value);
        }
        if c == '\\' {
            match chars.peek() {
                None => return None,
                // line continuation
                Some(&(_, '\n')) => {
                    chars.next();
                }
                Some(&(_, '\r')) => {
                    chars.next();
                    if let Some(&(_, '\n')) = chars.peek() {
                        chars.next();
                    }
                }
                Some(&(_, escaped)) => {
                    chars.next();
                    value.push(escaped);
                }
            }
        } else {
            value.push(c);
        }
    }
    None
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut line_start = true;

    while let Some(&(offset, c)) = chars.peek() {
        if c == '\n' {
            line_start = true;
            chars.next();
            continue;
        }
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = if is_ident_start(c) {
            let end = consume_while(&mut chars, text.len(), is_ident_continue);
            TokenKind::Ident(&text[offset..end])
        } else if c == '\'' || c == '"' {
            chars.next();
            read_string(&mut chars, c).map_or(TokenKind::Other, TokenKind::Str)
        } else if c.is_ascii_digit() {
            consume_while(&mut chars, text.len(), |c| c.is_alphanumeric() || c == '.');
            TokenKind::Other
        } else {
            chars.next();
            TokenKind::Punct(c)
        };

        tokens.push(Token {
            kind,
            offset,
            line_start,
        });
        line_start = false;
    }
    tokens
}
