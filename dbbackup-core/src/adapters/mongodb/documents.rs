//! MongoDB document fetching.

use crate::Result;
use crate::error::BackupError;
use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};

/// Converts a document to relaxed Extended JSON.
///
/// Plain numbers, strings and booleans map to their JSON counterparts;
/// BSON-only types keep their `$`-prefixed wrappers (`$oid`, `$date`, ...).
pub fn to_relaxed_json(document: Document) -> serde_json::Value {
    Bson::Document(document).into_relaxed_extjson()
}

/// Fetches every document of a collection in natural order.
pub async fn fetch_documents(
    client: &Client,
    database_name: &str,
    collection_name: &str,
) -> Result<Vec<serde_json::Value>> {
    let collection = client
        .database(database_name)
        .collection::<Document>(collection_name);

    let mut cursor = collection
        .find(doc! {})
        .await
        .map_err(|e| BackupError::export_failed(collection_name, "Error fetching data", e))?;

    let mut documents = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| BackupError::export_failed(collection_name, "Error iterating cursor", e))?
    {
        let document = cursor.deserialize_current().map_err(|e| {
            BackupError::export_failed(collection_name, "Error deserializing document", e)
        })?;
        documents.push(to_relaxed_json(document));
    }

    tracing::debug!(
        "Fetched {} documents from '{}'",
        documents.len(),
        collection_name
    );
    Ok(documents)
}
