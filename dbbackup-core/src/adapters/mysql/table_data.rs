//! MySQL row fetching.

use super::MySqlAdapter;
use super::schema_collection::text_at;
use super::type_mapping::select_expression;
use crate::Result;
use crate::error::BackupError;
use crate::export::sql::SqlDialect;
use crate::models::{SqlValue, TableData, TableDescriptor, ValueEncoding};

/// Builds the data query selecting every column as text.
pub(super) fn build_select(descriptor: &TableDescriptor) -> String {
    let expressions = descriptor
        .columns
        .iter()
        .map(select_expression)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {} FROM {}",
        expressions,
        SqlDialect::MySql.quote_identifier(&descriptor.name)
    )
}

/// Turns one fetched text cell into a value.
///
/// Binary columns arrive hex-encoded from `HEX()` and are decoded back to
/// raw bytes here.
pub(super) fn decode_cell(
    table: &str,
    encoding: ValueEncoding,
    raw: Option<String>,
) -> Result<SqlValue> {
    let Some(text) = raw else {
        return Ok(SqlValue::Null);
    };

    match encoding {
        ValueEncoding::Numeric => Ok(SqlValue::Numeric(text)),
        ValueEncoding::Text => Ok(SqlValue::Text(text)),
        ValueEncoding::Binary => hex::decode(&text)
            .map(SqlValue::Binary)
            .map_err(|e| BackupError::export_failed(table, "Error decoding binary column", e)),
    }
}

/// Fetches all rows of a table in server order.
pub(crate) async fn fetch_table(
    adapter: &MySqlAdapter,
    descriptor: &TableDescriptor,
) -> Result<TableData> {
    let table = descriptor.name.as_str();
    let columns: Vec<String> = descriptor.columns.iter().map(|c| c.name.clone()).collect();

    if columns.is_empty() {
        return Ok(TableData {
            columns,
            rows: Vec::new(),
        });
    }

    let query = build_select(descriptor);
    tracing::debug!("Fetching rows from '{}'", table);

    let rows = sqlx::query(&query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| BackupError::export_failed(table, "Error fetching data", e))?;

    let mut values = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record = Vec::with_capacity(descriptor.columns.len());
        for (index, column) in descriptor.columns.iter().enumerate() {
            let raw = text_at(row, index)
                .map_err(|e| BackupError::export_failed(table, "Error reading data", e))?;
            record.push(decode_cell(table, column.encoding, raw)?);
        }
        values.push(record);
    }

    tracing::debug!("Fetched {} rows from '{}'", values.len(), table);
    Ok(TableData {
        columns,
        rows: values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnDescriptor;

    fn descriptor() -> TableDescriptor {
        TableDescriptor {
            name: "users".to_string(),
            columns: vec![
                ColumnDescriptor {
                    name: "id".to_string(),
                    declared_type: "int(11)".to_string(),
                    encoding: ValueEncoding::Numeric,
                },
                ColumnDescriptor {
                    name: "photo".to_string(),
                    declared_type: "blob".to_string(),
                    encoding: ValueEncoding::Binary,
                },
            ],
        }
    }

    #[test]
    fn test_build_select() {
        assert_eq!(
            build_select(&descriptor()),
            "SELECT CAST(`id` AS CHAR), HEX(`photo`) FROM `users`"
        );
    }

    #[test]
    fn test_decode_cell() {
        assert_eq!(
            decode_cell("t", ValueEncoding::Numeric, None).unwrap(),
            SqlValue::Null
        );
        assert_eq!(
            decode_cell("t", ValueEncoding::Numeric, Some("12.50".to_string())).unwrap(),
            SqlValue::Numeric("12.50".to_string())
        );
        assert_eq!(
            decode_cell("t", ValueEncoding::Text, Some("Ann".to_string())).unwrap(),
            SqlValue::Text("Ann".to_string())
        );
        assert_eq!(
            decode_cell("t", ValueEncoding::Binary, Some("DEAD00".to_string())).unwrap(),
            SqlValue::Binary(vec![0xde, 0xad, 0x00])
        );
    }

    #[test]
    fn test_decode_cell_rejects_bad_hex() {
        let result = decode_cell("t", ValueEncoding::Binary, Some("XYZ".to_string()));
        assert!(matches!(result, Err(BackupError::Export { .. })));
    }
}
