//! PostgreSQL database adapter with connection pooling.
//!
//! # Module Structure
//! - `connection`: Connection pool management
//! - `type_mapping`: Declared type rendering and value encoding
//! - `schema_collection`: Table enumeration and `CREATE TABLE` synthesis
//! - `table_data`: Row fetching
//!
//! Only the `public` schema is exported.

mod connection;
pub mod schema_collection;
mod table_data;
pub mod type_mapping;


use super::{ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::error::BackupError;
use crate::models::{DatabaseKind, TableStructure, UnitRecords};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL database adapter with connection pooling
pub struct PostgresAdapter {
    pub pool: PgPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
    fn database_kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BackupError::connection_failed(self.config.to_string(), e))?;

        if connectivity_result != 1 {
            return Err(BackupError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn list_units(&self) -> Result<Vec<String>> {
        schema_collection::list_tables(self).await
    }

    async fn table_structure(&self, name: &str) -> Result<Option<TableStructure>> {
        schema_collection::collect_structure(self, name)
            .await
            .map(Some)
    }

    async fn fetch_records(
        &self,
        name: &str,
        structure: Option<&TableStructure>,
    ) -> Result<UnitRecords> {
        let collected;
        let structure = match structure {
            Some(structure) => structure,
            None => {
                collected = schema_collection::collect_structure(self, name).await?;
                &collected
            }
        };

        table_data::fetch_table(self, &structure.descriptor)
            .await
            .map(UnitRecords::Rows)
    }

    async fn close(&self) {
        self.close_pool().await;
    }
}
