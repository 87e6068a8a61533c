//! MySQL column type handling for the data step.
//!
//! Every column is fetched as text so one decoding path covers all types.
//! The declared type decides the conversion used in the `SELECT` list and
//! how the value is rendered back into the dump.

use crate::export::sql::SqlDialect;
use crate::models::{ColumnDescriptor, ValueEncoding};

/// Strips length, precision and modifiers: `int(11) unsigned` -> `int`.
fn base_type(column_type: &str) -> String {
    column_type
        .split(['(', ' '])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Maps a MySQL `COLUMN_TYPE` to its value encoding.
pub fn value_encoding(column_type: &str) -> ValueEncoding {
    match base_type(column_type).as_str() {
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "decimal"
        | "numeric" | "dec" | "fixed" | "float" | "double" | "real" | "bit" | "year" => {
            ValueEncoding::Numeric
        }
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "geometry"
        | "point" | "linestring" | "polygon" | "multipoint" | "multilinestring"
        | "multipolygon" | "geometrycollection" | "geomcollection" => ValueEncoding::Binary,
        _ => ValueEncoding::Text,
    }
}

/// Expression selecting one column as text.
///
/// BIT columns are forced through arithmetic so they come back as digits
/// instead of raw bytes.
pub fn select_expression(column: &ColumnDescriptor) -> String {
    let quoted = SqlDialect::MySql.quote_identifier(&column.name);

    match column.encoding {
        ValueEncoding::Binary => format!("HEX({})", quoted),
        ValueEncoding::Numeric if base_type(&column.declared_type) == "bit" => {
            format!("CAST({} + 0 AS CHAR)", quoted)
        }
        ValueEncoding::Numeric | ValueEncoding::Text => format!("CAST({} AS CHAR)", quoted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, declared_type: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            encoding: value_encoding(declared_type),
        }
    }

    #[test]
    fn test_value_encoding_numeric() {
        for ty in [
            "int(11)",
            "int unsigned",
            "bigint(20) unsigned",
            "decimal(10,2)",
            "double",
            "bit(1)",
            "year",
            "TINYINT(1)",
        ] {
            assert_eq!(value_encoding(ty), ValueEncoding::Numeric, "{}", ty);
        }
    }

    #[test]
    fn test_value_encoding_binary() {
        for ty in ["varbinary(16)", "blob", "longblob", "binary(16)", "point"] {
            assert_eq!(value_encoding(ty), ValueEncoding::Binary, "{}", ty);
        }
    }

    #[test]
    fn test_value_encoding_text() {
        for ty in [
            "varchar(255)",
            "text",
            "datetime",
            "timestamp",
            "json",
            "enum('a','b')",
            "set('x','y')",
        ] {
            assert_eq!(value_encoding(ty), ValueEncoding::Text, "{}", ty);
        }
    }

    #[test]
    fn test_select_expression() {
        assert_eq!(
            select_expression(&column("id", "int(11)")),
            "CAST(`id` AS CHAR)"
        );
        assert_eq!(
            select_expression(&column("flags", "bit(8)")),
            "CAST(`flags` + 0 AS CHAR)"
        );
        assert_eq!(select_expression(&column("avatar", "blob")), "HEX(`avatar`)");
        assert_eq!(
            select_expression(&column("na`me", "varchar(10)")),
            "CAST(`na``me` AS CHAR)"
        );
    }
}
