//! MySQL database adapter.
//!
//! # Module Structure
//! - `connection`: Connection pool management
//! - `type_mapping`: Column type to value encoding
//! - `schema_collection`: Table enumeration and `SHOW CREATE TABLE`
//! - `table_data`: Row fetching
//!
//! # Security Guarantees
//! - All operations are read-only (SELECT/SHOW only)
//! - Sessions are switched to `READ ONLY` on connect
//! - The password never appears in `Debug` output

pub mod connection;
pub mod schema_collection;
pub mod table_data;
pub mod type_mapping;

use super::{ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::error::BackupError;
use crate::models::{DatabaseKind, TableStructure, UnitRecords};
use async_trait::async_trait;
use sqlx::MySqlPool;

/// MySQL database adapter with connection pooling
pub struct MySqlAdapter {
    /// Connection pool for database operations
    pub pool: MySqlPool,
    /// Connection configuration
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
    fn database_kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
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
