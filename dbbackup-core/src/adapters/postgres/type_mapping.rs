//! PostgreSQL column type handling.
//!
//! Covers both directions: rendering `information_schema.columns` rows into
//! the type text used by the synthesized `CREATE TABLE`, and choosing how
//! each column is selected and rendered in the data step.

use crate::export::sql::SqlDialect;
use crate::models::{ColumnDescriptor, ValueEncoding};

/// Raw type metadata of one column from `information_schema.columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypeInfo {
    pub data_type: String,
    pub udt_name: String,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    /// Fractional seconds digits of time, timestamp and interval columns
    pub datetime_precision: Option<i32>,
    /// Field restriction of interval columns, e.g. `DAY TO SECOND`
    pub interval_type: Option<String>,
}

/// Renders the declared type of a column.
///
/// # Example
/// ```rust
/// use dbbackup_core::adapters::postgres::type_mapping::{declared_type, ColumnTypeInfo};
///
/// let info = ColumnTypeInfo {
///     data_type: "character varying".to_string(),
///     udt_name: "varchar".to_string(),
///     character_maximum_length: Some(64),
///     ..Default::default()
/// };
/// assert_eq!(declared_type(&info), "character varying(64)");
/// ```
pub fn declared_type(info: &ColumnTypeInfo) -> String {
    match info.data_type.as_str() {
        "character varying" | "character" | "bit" | "bit varying" => {
            match info.character_maximum_length {
                Some(length) => format!("{}({})", info.data_type, length),
                None => info.data_type.clone(),
            }
        }
        "numeric" => match (info.numeric_precision, info.numeric_scale) {
            (Some(precision), Some(scale)) => format!("numeric({},{})", precision, scale),
            (Some(precision), None) => format!("numeric({})", precision),
            _ => "numeric".to_string(),
        },
        "timestamp without time zone"
        | "timestamp with time zone"
        | "time without time zone"
        | "time with time zone" => {
            match (info.data_type.split_once(' '), info.datetime_precision) {
                (Some((base, zone)), Some(precision)) => {
                    format!("{}({}) {}", base, precision, zone)
                }
                _ => info.data_type.clone(),
            }
        }
        "interval" => interval_type(info),
        "ARRAY" => format!("{}[]", info.udt_name.trim_start_matches('_')),
        "USER-DEFINED" => info.udt_name.clone(),
        _ => info.data_type.clone(),
    }
}

/// `interval`, its field restriction, and the fractional precision, which
/// only applies when the fields end in `SECOND`.
fn interval_type(info: &ColumnTypeInfo) -> String {
    let fields = info
        .interval_type
        .as_deref()
        .map(str::trim)
        .filter(|fields| !fields.is_empty());

    match (fields, info.datetime_precision) {
        (Some(fields), Some(precision)) if fields.ends_with("SECOND") => {
            format!("interval {}({})", fields, precision)
        }
        (Some(fields), _) => format!("interval {}", fields),
        (None, Some(precision)) => format!("interval({})", precision),
        (None, None) => "interval".to_string(),
    }
}

/// Maps an `information_schema` data type to its value encoding.
pub fn value_encoding(data_type: &str) -> ValueEncoding {
    match data_type {
        "smallint" | "integer" | "bigint" | "numeric" | "real" | "double precision" => {
            ValueEncoding::Numeric
        }
        "bytea" => ValueEncoding::Binary,
        _ => ValueEncoding::Text,
    }
}

/// Expression selecting one column as text.
pub fn select_expression(column: &ColumnDescriptor) -> String {
    let quoted = SqlDialect::Postgres.quote_identifier(&column.name);

    match column.encoding {
        ValueEncoding::Binary => format!("encode({}, 'hex')", quoted),
        ValueEncoding::Numeric | ValueEncoding::Text => format!("{}::text", quoted),
    }
}
