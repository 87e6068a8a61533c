//! MongoDB collection enumeration.
//!
//! Only plain collections are exported. Views and time series collections
//! are excluded by the `listCollections` filter, and `system.*` collections
//! are skipped.

use crate::Result;
use crate::error::BackupError;
use mongodb::Client;
use mongodb::bson::doc;

/// Returns true for server-internal collections.
pub fn is_system_collection(name: &str) -> bool {
    name.starts_with("system.")
}

/// Lists the collections of one database in driver order.
///
/// # Errors
/// Returns `BackupError::Enumeration` if the listing fails
pub async fn list_collections(client: &Client, database_name: &str) -> Result<Vec<String>> {
    tracing::debug!("Listing collections in database: {}", database_name);

    let db = client.database(database_name);

    let mut cursor = db
        .list_collections()
        .filter(doc! { "type": "collection" })
        .await
        .map_err(|e| {
            BackupError::enumeration_failed(
                format!("Failed to list collections in database '{}'", database_name),
                e,
            )
        })?;

    let mut collections = Vec::new();
    while cursor.advance().await.map_err(|e| {
        BackupError::enumeration_failed(
            format!("Failed to iterate collections of '{}'", database_name),
            e,
        )
    })? {
        let specification = cursor.deserialize_current().map_err(|e| {
            BackupError::enumeration_failed(
                format!("Failed to read collection info of '{}'", database_name),
                e,
            )
        })?;

        if is_system_collection(&specification.name) {
            tracing::trace!("Skipping system collection: {}", specification.name);
            continue;
        }

        collections.push(specification.name);
    }

    tracing::info!("Found {} collections", collections.len());
    Ok(collections)
}
