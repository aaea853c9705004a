//! sqlparser-based syntax checking

use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;

/// SQL parser that wraps sqlparser-rs with the DuckDB dialect
pub struct SqlParser {
    dialect: DuckDbDialect,
}

impl SqlParser {
    /// Create a new parser with DuckDB dialect
    pub fn duckdb() -> Self {
        Self {
            dialect: DuckDbDialect {},
        }
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        Parser::parse_sql(&self.dialect, sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = parse_location_from_error(&message);
            SqlError::ParseError {
                message,
                line,
                column,
            }
        })
    }

    /// Number of statements in `sql`, or the first syntax error
    pub fn check(&self, sql: &str) -> SqlResult<usize> {
        self.parse(sql).map(|stmts| stmts.len())
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::duckdb()
    }
}

/// Quote an identifier with double quotes, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Pull "Line: N, Column: M" out of a sqlparser error message.
///
/// `ParserError` carries no structured location, only text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let rest = &msg[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    };

    match (number_after("Line: "), number_after("Column: ")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
