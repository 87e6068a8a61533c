//! PostgreSQL table enumeration and structure synthesis.
//!
//! PostgreSQL has no `SHOW CREATE TABLE`; the structure statement is built
//! from `information_schema.columns` and carries column names and types
//! only. Constraints, defaults and indexes are not reproduced.

use super::PostgresAdapter;
use super::type_mapping::{ColumnTypeInfo, declared_type, value_encoding};
use crate::Result;
use crate::error::BackupError;
use crate::export::sql::SqlDialect;
use crate::models::{ColumnDescriptor, TableDescriptor, TableStructure};
use sqlx::Row;

/// Lists base tables of the `public` schema.
pub(crate) async fn list_tables(adapter: &PostgresAdapter) -> Result<Vec<String>> {
    tracing::debug!("Enumerating tables in schema public");

    let tables_query = r#"
        SELECT table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
    "#;

    let rows = sqlx::query(tables_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| BackupError::enumeration_failed("Failed to enumerate tables", e))?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row
            .try_get("table_name")
            .map_err(|e| BackupError::enumeration_failed("Failed to read table name", e))?;
        tables.push(name);
    }

    tracing::info!("Found {} tables", tables.len());
    Ok(tables)
}

/// Builds the structure statement and column metadata for one table.
pub(crate) async fn collect_structure(
    adapter: &PostgresAdapter,
    table: &str,
) -> Result<TableStructure> {
    let columns_query = r#"
        SELECT
            column_name::text AS column_name,
            data_type::text AS data_type,
            udt_name::text AS udt_name,
            character_maximum_length::int AS character_maximum_length,
            numeric_precision::int AS numeric_precision,
            numeric_scale::int AS numeric_scale,
            datetime_precision::int AS datetime_precision,
            interval_type::text AS interval_type
        FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = $1
        ORDER BY ordinal_position
    "#;

    let rows = sqlx::query(columns_query)
        .bind(table)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| BackupError::export_failed(table, "Error fetching structure", e))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row
            .try_get("column_name")
            .map_err(|e| BackupError::export_failed(table, "Failed to read column name", e))?;
        let info = ColumnTypeInfo {
            data_type: row.try_get("data_type").unwrap_or_default(),
            udt_name: row.try_get("udt_name").unwrap_or_default(),
            character_maximum_length: row.try_get("character_maximum_length").ok().flatten(),
            numeric_precision: row.try_get("numeric_precision").ok().flatten(),
            numeric_scale: row.try_get("numeric_scale").ok().flatten(),
            datetime_precision: row.try_get("datetime_precision").ok().flatten(),
            interval_type: row.try_get("interval_type").ok().flatten(),
        };

        columns.push(ColumnDescriptor {
            name,
            declared_type: declared_type(&info),
            encoding: value_encoding(&info.data_type),
        });
    }

    let descriptor = TableDescriptor {
        name: table.to_string(),
        columns,
    };

    Ok(TableStructure {
        create_statement: create_table_statement(&descriptor),
        descriptor,
    })
}

/// `CREATE TABLE "t" ("a" integer, "b" text)` without a terminator.
pub fn create_table_statement(descriptor: &TableDescriptor) -> String {
    let dialect = SqlDialect::Postgres;
    let columns = descriptor
        .columns
        .iter()
        .map(|c| format!("{} {}", dialect.quote_identifier(&c.name), c.declared_type))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TABLE {} ({})",
        dialect.quote_identifier(&descriptor.name),
        columns
    )
}
