//! MongoDB database adapter.
//!
//! # Module Structure
//! - `connection`: MongoDB client management and connection validation
//! - `enumeration`: Collection enumeration
//! - `documents`: Document fetching and Extended JSON conversion
//!
//! MongoDB has no structure step: each collection is exported as a JSON
//! array of its documents.
//!
//! # Security Guarantees
//! - All operations are read-only
//! - Credentials are never part of the connection string or `Debug` output

mod connection;
pub mod documents;
pub mod enumeration;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, DatabaseAdapter};
use crate::Result;
use crate::models::{DatabaseKind, TableStructure, UnitRecords};
use async_trait::async_trait;
use mongodb::Client;

pub use documents::{fetch_documents, to_relaxed_json};
pub use enumeration::{is_system_collection, list_collections};

/// MongoDB database adapter.
///
/// # Example
/// ```rust,ignore
/// use dbbackup_core::adapters::{ConnectionConfig, mongodb::MongoAdapter};
///
/// let adapter = MongoAdapter::new(&config).await?;
/// let collections = adapter.list_units().await?;
/// ```
pub struct MongoAdapter {
    /// MongoDB client
    pub client: Client,
    /// Connection configuration
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for MongoAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdapter for MongoAdapter {
    fn database_kind(&self) -> DatabaseKind {
        DatabaseKind::MongoDb
    }

    async fn test_connection(&self) -> Result<()> {
        self.ping().await
    }

    async fn list_units(&self) -> Result<Vec<String>> {
        list_collections(&self.client, &self.config.database).await
    }

    async fn table_structure(&self, _name: &str) -> Result<Option<TableStructure>> {
        Ok(None)
    }

    async fn fetch_records(
        &self,
        name: &str,
        _structure: Option<&TableStructure>,
    ) -> Result<UnitRecords> {
        fetch_documents(&self.client, &self.config.database, name)
            .await
            .map(UnitRecords::Documents)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
