//! Data models shared by the adapters and the exporter.
//!
//! Relational engines describe a table with a `TableDescriptor` and hand
//! rows back as `SqlValue`s; MongoDB hands back documents already converted
//! to JSON. Nothing here is persisted: an export unit lives only as long as
//! it takes to write its file.

/// Supported database kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    MySql,
    Postgres,
    MongoDb,
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseKind::MySql => write!(f, "MySQL"),
            DatabaseKind::Postgres => write!(f, "PostgreSQL"),
            DatabaseKind::MongoDb => write!(f, "MongoDB"),
        }
    }
}

impl std::str::FromStr for DatabaseKind {
    type Err = crate::error::BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseKind::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            "mongodb" | "mongo" => Ok(DatabaseKind::MongoDb),
            other => Err(crate::error::BackupError::configuration(format!(
                "Database type \"{}\" is not supported",
                other
            ))),
        }
    }
}

impl DatabaseKind {
    /// Default server port for this kind.
    pub fn default_port(self) -> u16 {
        match self {
            DatabaseKind::MySql => 3306,
            DatabaseKind::Postgres => 5432,
            DatabaseKind::MongoDb => 27017,
        }
    }

    /// Extension of the per-unit output file.
    pub fn file_extension(self) -> &'static str {
        match self {
            DatabaseKind::MySql | DatabaseKind::Postgres => "sql",
            DatabaseKind::MongoDb => "json",
        }
    }

    /// True for engines that export tables with a structure step.
    pub fn is_relational(self) -> bool {
        matches!(self, DatabaseKind::MySql | DatabaseKind::Postgres)
    }
}

/// How a column's values are fetched from the server and rendered back
/// into an `INSERT` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// Rendered bare (integers, decimals, floats)
    Numeric,
    /// Rendered as an escaped string literal
    Text,
    /// Fetched as hex, rendered as a binary literal
    Binary,
}

/// One column of a relational table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name as reported by the server
    pub name: String,
    /// Declared type as it appears in the structure statement
    pub declared_type: String,
    /// Value handling for the data step
    pub encoding: ValueEncoding,
}

/// Name and ordered columns of a relational table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// Result of the structure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStructure {
    /// `CREATE TABLE` statement without the trailing `;`
    pub create_statement: String,
    /// Column metadata driving the data step
    pub descriptor: TableDescriptor,
}

/// A single fetched value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    /// Textual form of a number as printed by the server
    Numeric(String),
    Text(String),
    Binary(Vec<u8>),
}

/// Rows of one relational table, in server result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Everything the data step fetched for one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitRecords {
    /// Relational rows
    Rows(TableData),
    /// MongoDB documents as relaxed Extended JSON
    Documents(Vec<serde_json::Value>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_kind_from_cli_names() {
        assert_eq!("mysql".parse::<DatabaseKind>().unwrap(), DatabaseKind::MySql);
        assert_eq!("pgsql".parse::<DatabaseKind>().unwrap(), DatabaseKind::Postgres);
        assert_eq!(
            "PostgreSQL".parse::<DatabaseKind>().unwrap(),
            DatabaseKind::Postgres
        );
        assert_eq!(
            "mongodb".parse::<DatabaseKind>().unwrap(),
            DatabaseKind::MongoDb
        );

        let err = "oracle".parse::<DatabaseKind>().unwrap_err();
        assert!(err.to_string().contains("\"oracle\" is not supported"));
    }

    #[test]
    fn test_database_kind_properties() {
        assert_eq!(DatabaseKind::MySql.default_port(), 3306);
        assert_eq!(DatabaseKind::Postgres.default_port(), 5432);
        assert_eq!(DatabaseKind::MongoDb.default_port(), 27017);

        assert_eq!(DatabaseKind::MySql.file_extension(), "sql");
        assert_eq!(DatabaseKind::Postgres.file_extension(), "sql");
        assert_eq!(DatabaseKind::MongoDb.file_extension(), "json");

        assert!(DatabaseKind::MySql.is_relational());
        assert!(!DatabaseKind::MongoDb.is_relational());
    }
}
