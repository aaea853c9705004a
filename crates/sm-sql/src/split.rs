//! Statement splitting and classification.
//!
//! Splitting works on the raw text: statements come back as slices of the
//! input, byte-for-byte, so what executes is exactly what the author wrote.

use crate::error::{SqlError, SqlResult};

/// Leading keywords of statements that produce a result set
const QUERY_KEYWORDS: &[&str] = &[
    "SELECT",
    "WITH",
    "VALUES",
    "FROM",
    "SHOW",
    "DESCRIBE",
    "SUMMARIZE",
    "EXPLAIN",
    "PRAGMA",
    "TABLE",
];

/// Leading keywords of data-changing statements that may carry `RETURNING`
const DML_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE"];

/// Leading keywords of statements that open, close, or mark a transaction
const TRANSACTION_KEYWORDS: &[&str] = &[
    "BEGIN", "START", "COMMIT", "END", "ROLLBACK", "ABORT", "SAVEPOINT", "RELEASE",
];

/// Broad statement category, decided by the leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows that must be drained
    Query,
    /// DML with a top-level `RETURNING` clause; each returned row is a
    /// changed row
    Returning,
    /// Transaction control such as `BEGIN` or `COMMIT`
    Transaction,
    /// DDL, DML, or anything else executed for its effect
    Command,
}

impl StatementKind {
    /// Classify a single statement
    pub fn of(stmt: &str) -> Self {
        let Some(kw) = leading_keyword(stmt) else {
            return StatementKind::Command;
        };
        let kw = kw.as_str();
        if QUERY_KEYWORDS.contains(&kw) {
            StatementKind::Query
        } else if TRANSACTION_KEYWORDS.contains(&kw) {
            StatementKind::Transaction
        } else if DML_KEYWORDS.contains(&kw) && has_top_level_word(stmt, "RETURNING") {
            StatementKind::Returning
        } else {
            StatementKind::Command
        }
    }
}

/// Split `sql` on top-level semicolons.
///
/// Semicolons inside single-quoted strings, double-quoted identifiers,
/// dollar-quoted bodies, and comments are not separators. Fragments that
/// hold only whitespace or comments are dropped; the rest are trimmed.
pub fn split_statements(sql: &str) -> SqlResult<Vec<&str>> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        i = match bytes[i] {
            b'\'' => skip_quoted(bytes, i, b'\'', "string literal")?,
            b'"' => skip_quoted(bytes, i, b'"', "quoted identifier")?,
            b'-' if bytes.get(i + 1) == Some(&b'-') => skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => skip_block_comment(sql, i)?,
            b'$' => skip_dollar_quoted(sql, i)?,
            b';' => {
                push_fragment(&mut statements, &sql[start..i]);
                start = i + 1;
                i + 1
            }
            _ => i + 1,
        };
    }
    push_fragment(&mut statements, &sql[start..]);

    Ok(statements)
}

/// Upper-cased first keyword of a statement, skipping whitespace, comments
/// and opening parentheses.
pub fn leading_keyword(stmt: &str) -> Option<String> {
    let body =
        strip_leading_trivia(stmt).trim_start_matches(|c: char| c == '(' || c.is_whitespace());
    let end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    if end == 0 {
        return None;
    }
    Some(body[..end].to_ascii_uppercase())
}

/// Whether `word` appears as a whole word outside quotes, comments, and
/// parentheses.
fn has_top_level_word(stmt: &str, word: &str) -> bool {
    let bytes = stmt.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let next = match bytes[i] {
            b'\'' => skip_quoted(bytes, i, b'\'', "string literal"),
            b'"' => skip_quoted(bytes, i, b'"', "quoted identifier"),
            b'-' if bytes.get(i + 1) == Some(&b'-') => Ok(skip_line_comment(bytes, i)),
            b'/' if bytes.get(i + 1) == Some(&b'*') => skip_block_comment(stmt, i),
            b'$' => skip_dollar_quoted(stmt, i),
            b'(' => {
                depth += 1;
                Ok(i + 1)
            }
            b')' => {
                depth = depth.saturating_sub(1);
                Ok(i + 1)
            }
            b if is_word_byte(b) => {
                let end = bytes[i..]
                    .iter()
                    .position(|&b| !is_word_byte(b))
                    .map_or(bytes.len(), |pos| i + pos);
                if depth == 0 && bytes[i..end].eq_ignore_ascii_case(word.as_bytes()) {
                    return true;
                }
                Ok(end)
            }
            _ => Ok(i + 1),
        };
        match next {
            Ok(n) => i = n,
            Err(_) => return false,
        }
    }
    false
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn push_fragment<'a>(out: &mut Vec<&'a str>, fragment: &'a str) {
    if !strip_leading_trivia(fragment).is_empty() {
        out.push(fragment.trim());
    }
}

/// Drop leading whitespace and comments
fn strip_leading_trivia(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            s = rest.find('\n').map_or("", |pos| &rest[pos + 1..]);
        } else if let Some(rest) = s.strip_prefix("/*") {
            s = rest.find("*/").map_or("", |pos| &rest[pos + 2..]);
        } else {
            return s;
        }
    }
}

/// Returns the index just past the closing quote. A doubled quote is an
/// escaped quote, not a terminator.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8, what: &'static str) -> SqlResult<usize> {
    let mut j = open + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return Ok(j + 1);
        }
        j += 1;
    }
    Err(SqlError::Unterminated { what, offset: open })
}

fn skip_line_comment(bytes: &[u8], open: usize) -> usize {
    bytes[open..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |pos| open + pos + 1)
}

fn skip_block_comment(sql: &str, open: usize) -> SqlResult<usize> {
    sql[open + 2..]
        .find("*/")
        .map(|pos| open + 2 + pos + 2)
        .ok_or(SqlError::Unterminated {
            what: "block comment",
            offset: open,
        })
}

/// `$tag$ ... $tag$` bodies. A `$` that does not open a tag (for example a
/// positional parameter such as `$1`) is skipped on its own.
fn skip_dollar_quoted(sql: &str, open: usize) -> SqlResult<usize> {
    let bytes = sql.as_bytes();
    let mut j = open + 1;
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
        j += 1;
    }
    let tag_starts_with_digit = j > open + 1 && bytes[open + 1].is_ascii_digit();
    if j >= bytes.len() || bytes[j] != b'$' || tag_starts_with_digit {
        return Ok(open + 1);
    }

    let tag = &sql[open..=j];
    sql[j + 1..]
        .find(tag)
        .map(|pos| j + 1 + pos + tag.len())
        .ok_or(SqlError::Unterminated {
            what: "dollar-quoted string",
            offset: open,
        })
}

#[cfg(test)]
#[path = "split_test.rs"]
mod tests;
