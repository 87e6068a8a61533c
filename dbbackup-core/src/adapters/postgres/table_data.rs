//! PostgreSQL row fetching.

use super::PostgresAdapter;
use super::type_mapping::select_expression;
use crate::Result;
use crate::error::BackupError;
use crate::export::sql::SqlDialect;
use crate::models::{SqlValue, TableData, TableDescriptor, ValueEncoding};
use sqlx::Row;

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
        SqlDialect::Postgres.quote_identifier(&descriptor.name)
    )
}

/// Fetches all rows of a table in server order.
pub(crate) async fn fetch_table(
    adapter: &PostgresAdapter,
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
            let raw: Option<String> = row
                .try_get(index)
                .map_err(|e| BackupError::export_failed(table, "Error reading data", e))?;

            let value = match (raw, column.encoding) {
                (None, _) => SqlValue::Null,
                (Some(text), ValueEncoding::Numeric) => SqlValue::Numeric(text),
                (Some(text), ValueEncoding::Text) => SqlValue::Text(text),
                (Some(text), ValueEncoding::Binary) => {
                    SqlValue::Binary(hex::decode(&text).map_err(|e| {
                        BackupError::export_failed(table, "Error decoding binary column", e)
                    })?)
                }
            };
            record.push(value);
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

    #[test]
    fn test_build_select() {
        let descriptor = TableDescriptor {
            name: "files".to_string(),
            columns: vec![
                ColumnDescriptor {
                    name: "id".to_string(),
                    declared_type: "integer".to_string(),
                    encoding: ValueEncoding::Numeric,
                },
                ColumnDescriptor {
                    name: "payload".to_string(),
                    declared_type: "bytea".to_string(),
                    encoding: ValueEncoding::Binary,
                },
                ColumnDescriptor {
                    name: "created".to_string(),
                    declared_type: "timestamp without time zone".to_string(),
                    encoding: ValueEncoding::Text,
                },
            ],
        };

        assert_eq!(
            build_select(&descriptor),
            "SELECT \"id\"::text, encode(\"payload\", 'hex'), \"created\"::text FROM \"files\""
        );
    }
}
