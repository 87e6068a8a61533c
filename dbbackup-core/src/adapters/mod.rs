//! Database adapter trait and factory.
//!
//! Every supported engine implements `DatabaseAdapter`, so the exporter and
//! the binary only ever hold a `Box<dyn DatabaseAdapter>` and never need to
//! know which driver sits behind it.
//!
//! # Module Structure
//! - `config`: `ConnectionConfig`
//! - Database-specific modules (mysql, postgres, mongodb), feature-gated

use crate::models::{DatabaseKind, TableStructure, UnitRecords};
use crate::Result;
use async_trait::async_trait;

pub mod config;

pub use config::ConnectionConfig;

/// Uniform connection capability over one database.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn DatabaseAdapter>`. One handle is shared by reference across all
/// in-flight unit exports; implementations only dispatch independent
/// read queries and hold no per-unit state.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Returns the database kind this adapter handles.
    fn database_kind(&self) -> DatabaseKind;

    /// Performs one round trip to verify the server accepts us.
    ///
    /// # Errors
    /// Returns `BackupError::Connection` if the server is unreachable or
    /// rejects the login
    async fn test_connection(&self) -> Result<()>;

    /// Lists the tables or collections to export, in driver order.
    ///
    /// # Errors
    /// Returns `BackupError::Enumeration` if the listing query fails
    async fn list_units(&self) -> Result<Vec<String>>;

    /// Structure step for one unit.
    ///
    /// Relational engines return the `CREATE TABLE` statement and column
    /// metadata; document engines return `None`.
    ///
    /// # Errors
    /// Returns `BackupError::Export` if the metadata cannot be fetched
    async fn table_structure(&self, name: &str) -> Result<Option<TableStructure>>;

    /// Data step for one unit.
    ///
    /// # Arguments
    /// * `name` - Table or collection name
    /// * `structure` - Output of `table_structure` for relational engines
    ///
    /// # Errors
    /// Returns `BackupError::Export` if the rows cannot be fetched
    async fn fetch_records(
        &self,
        name: &str,
        structure: Option<&TableStructure>,
    ) -> Result<UnitRecords>;

    /// Closes the underlying pool or client.
    async fn close(&self);
}

/// Opens a connection for the configured database kind.
///
/// Exactly one attempt is made: the handle is built and verified with
/// `test_connection`. There is no retry.
///
/// # Errors
/// Returns error if:
/// - The configuration is invalid
/// - The driver for the kind was not compiled in
/// - The server cannot be reached or rejects the login
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    config.validate()?;

    let adapter = create_adapter(config).await?;

    tracing::debug!("Verifying connection to {}", config);
    adapter.test_connection().await?;
    tracing::info!("Connected to database");

    Ok(adapter)
}

/// Builds the adapter without touching the network.
async fn create_adapter(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    match config.kind {
        #[cfg(feature = "mysql")]
        DatabaseKind::MySql => Ok(Box::new(mysql::MySqlAdapter::new(config)?)),
        #[cfg(not(feature = "mysql"))]
        DatabaseKind::MySql => Err(crate::error::BackupError::configuration(
            "MySQL support not compiled in. Use --features mysql",
        )),
        #[cfg(feature = "postgresql")]
        DatabaseKind::Postgres => Ok(Box::new(postgres::PostgresAdapter::new(config)?)),
        #[cfg(not(feature = "postgresql"))]
        DatabaseKind::Postgres => Err(crate::error::BackupError::configuration(
            "PostgreSQL support not compiled in. Use --features postgresql",
        )),
        #[cfg(feature = "mongodb")]
        DatabaseKind::MongoDb => Ok(Box::new(mongodb::MongoAdapter::new(config).await?)),
        #[cfg(not(feature = "mongodb"))]
        DatabaseKind::MongoDb => Err(crate::error::BackupError::configuration(
            "MongoDB support not compiled in. Use --features mongodb",
        )),
    }
}

// Database-specific adapter modules
#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "mongodb")]
pub mod mongodb;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackupError;

    #[tokio::test]
    async fn test_connect_rejects_invalid_config() {
        let config = ConnectionConfig::new(DatabaseKind::MySql, String::new());
        let result = connect(&config).await;

        assert!(matches!(result, Err(BackupError::Configuration { .. })));
    }

    #[cfg(feature = "mysql")]
    #[tokio::test]
    async fn test_connect_fails_gracefully_without_server() {
        let config = ConnectionConfig::new(DatabaseKind::MySql, "127.0.0.1".to_string())
            .with_port(1)
            .with_database("shop".to_string())
            .with_connect_timeout(std::time::Duration::from_secs(2));

        let result = connect(&config).await;

        match result {
            Err(error) => assert!(matches!(error, BackupError::Connection { .. })),
            Ok(_) => panic!("connection to port 1 should fail"),
        }
    }
}
