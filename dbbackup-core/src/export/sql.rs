//! SQL text generation for relational dumps.
//!
//! Identifier quoting and literal escaping live here and nowhere else. Call
//! sites never assemble quotes by hand; they go through `SqlDialect`.
//!
//! # Literal rules
//! - MySQL: backslash escapes for `\0 \b \t \n \r \x1a " ' \`, binary as `X'..'`
//! - PostgreSQL: single quotes doubled; a value containing a backslash gets
//!   its backslashes doubled and an `E` prefix

use crate::models::{DatabaseKind, SqlValue};

/// Terminator written after the structure statement.
pub const STRUCTURE_TERMINATOR: &str = ";\n\n";

/// Quoting and escaping rules of one SQL engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Postgres,
}

impl SqlDialect {
    /// Dialect for a relational kind, `None` for document kinds.
    pub fn for_kind(kind: DatabaseKind) -> Option<Self> {
        match kind {
            DatabaseKind::MySql => Some(SqlDialect::MySql),
            DatabaseKind::Postgres => Some(SqlDialect::Postgres),
            DatabaseKind::MongoDb => None,
        }
    }

    /// Quotes an identifier, doubling any embedded quote character.
    ///
    /// # Example
    /// ```rust
    /// use dbbackup_core::export::sql::SqlDialect;
    ///
    /// assert_eq!(SqlDialect::MySql.quote_identifier("order"), "`order`");
    /// assert_eq!(SqlDialect::Postgres.quote_identifier("a\"b"), "\"a\"\"b\"");
    /// ```
    pub fn quote_identifier(self, identifier: &str) -> String {
        let quote = match self {
            SqlDialect::MySql => '`',
            SqlDialect::Postgres => '"',
        };

        let mut quoted = String::with_capacity(identifier.len() + 2);
        quoted.push(quote);
        for c in identifier.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }

    /// Encodes a string as a literal.
    pub fn escape_literal(self, value: &str) -> String {
        match self {
            SqlDialect::MySql => escape_mysql_string(value),
            SqlDialect::Postgres => escape_postgres_string(value),
        }
    }

    /// Renders one fetched value.
    pub fn render_value(self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Numeric(n) if is_plain_number(n) => n.clone(),
            // NaN, Infinity and friends have no bare spelling
            SqlValue::Numeric(n) => self.escape_literal(n),
            SqlValue::Text(s) => self.escape_literal(s),
            SqlValue::Binary(bytes) => match self {
                SqlDialect::MySql => format!("X'{}'", hex::encode_upper(bytes)),
                SqlDialect::Postgres => {
                    self.escape_literal(&format!("\\x{}", hex::encode(bytes)))
                }
            },
        }
    }

    /// Renders one `INSERT` line including the trailing newline.
    ///
    /// # Arguments
    /// * `table` - Unquoted table name
    /// * `columns` - Unquoted column names in row order
    /// * `row` - Values, same length and order as `columns`
    pub fn insert_statement(self, table: &str, columns: &[String], row: &[SqlValue]) -> String {
        let keys = columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let values = row
            .iter()
            .map(|v| self.render_value(v))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({});\n",
            self.quote_identifier(table),
            keys,
            values
        )
    }
}

fn escape_mysql_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for c in value.chars() {
        match c {
            '\0' => escaped.push_str("\\0"),
            '\u{8}' => escaped.push_str("\\b"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{1a}' => escaped.push_str("\\Z"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped.push('\'');
    escaped
}

fn escape_postgres_string(value: &str) -> String {
    let mut has_backslash = false;
    let mut escaped = String::with_capacity(value.len() + 3);
    escaped.push('\'');
    for c in value.chars() {
        match c {
            '\'' => escaped.push_str("''"),
            '\\' => {
                escaped.push_str("\\\\");
                has_backslash = true;
            }
            _ => escaped.push(c),
        }
    }
    escaped.push('\'');

    if has_backslash {
        escaped.insert(0, 'E');
    }
    escaped
}

/// True for strings a SQL parser reads as a numeric literal.
fn is_plain_number(value: &str) -> bool {
    value.bytes().any(|b| b.is_ascii_digit())
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
