//! MySQL table enumeration and structure collection.
//!
//! Tables come from `SHOW FULL TABLES` so views are filtered out; the
//! structure statement is the server's own `SHOW CREATE TABLE` output.

use super::MySqlAdapter;
use super::type_mapping::value_encoding;
use crate::Result;
use crate::error::BackupError;
use crate::export::sql::SqlDialect;
use crate::models::{ColumnDescriptor, TableDescriptor, TableStructure};
use sqlx::Row;
use sqlx::mysql::MySqlRow;

/// Reads a textual column by index.
///
/// Some server versions report `SHOW` output as binary strings, which the
/// driver refuses to decode as `String`; those are decoded lossily.
pub(super) fn text_at(row: &MySqlRow, index: usize) -> std::result::Result<Option<String>, sqlx::Error> {
    match row.try_get::<Option<String>, _>(index) {
        Ok(value) => Ok(value),
        Err(_) => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|bytes| bytes.map(|b| String::from_utf8_lossy(&b).into_owned())),
    }
}

/// Lists base tables of the selected database in server order.
pub(crate) async fn list_tables(adapter: &MySqlAdapter) -> Result<Vec<String>> {
    tracing::debug!("Enumerating tables in database: {}", adapter.config.database);

    let rows = sqlx::query("SHOW FULL TABLES")
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| BackupError::enumeration_failed("SHOW FULL TABLES failed", e))?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = text_at(row, 0)
            .map_err(|e| BackupError::enumeration_failed("Failed to read table name", e))?
            .unwrap_or_default();
        let table_type = text_at(row, 1)
            .map_err(|e| BackupError::enumeration_failed("Failed to read table type", e))?
            .unwrap_or_default();

        if is_base_table(&table_type) {
            tables.push(name);
        } else {
            tracing::debug!("Skipping {} '{}'", table_type, name);
        }
    }

    tracing::info!("Found {} tables", tables.len());
    Ok(tables)
}

fn is_base_table(table_type: &str) -> bool {
    table_type.eq_ignore_ascii_case("BASE TABLE")
}

/// Fetches the `CREATE TABLE` statement and column metadata for one table.
pub(crate) async fn collect_structure(adapter: &MySqlAdapter, table: &str) -> Result<TableStructure> {
    let query = format!(
        "SHOW CREATE TABLE {}",
        SqlDialect::MySql.quote_identifier(table)
    );

    let row = sqlx::query(&query)
        .fetch_one(&adapter.pool)
        .await
        .map_err(|e| BackupError::export_failed(table, "Error fetching structure", e))?;

    let create_statement = text_at(&row, 1)
        .map_err(|e| BackupError::export_failed(table, "Error reading structure", e))?
        .unwrap_or_default();

    let columns = collect_columns(adapter, table).await?;

    Ok(TableStructure {
        create_statement,
        descriptor: TableDescriptor {
            name: table.to_string(),
            columns,
        },
    })
}

/// Columns of one table in ordinal order.
async fn collect_columns(adapter: &MySqlAdapter, table: &str) -> Result<Vec<ColumnDescriptor>> {
    let columns_query = r#"
        SELECT
            CAST(COLUMN_NAME AS CHAR) as COLUMN_NAME,
            CAST(COLUMN_TYPE AS CHAR) as COLUMN_TYPE
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
        ORDER BY ORDINAL_POSITION
    "#;

    let rows = sqlx::query(columns_query)
        .bind(table)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| BackupError::export_failed(table, "Error fetching columns", e))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row
            .try_get("COLUMN_NAME")
            .map_err(|e| BackupError::export_failed(table, "Failed to read column name", e))?;
        let declared_type: String = row.try_get("COLUMN_TYPE").unwrap_or_default();

        columns.push(ColumnDescriptor {
            encoding: value_encoding(&declared_type),
            name,
            declared_type,
        });
    }

    tracing::debug!("Table '{}' has {} columns", table, columns.len());
    Ok(columns)
}
