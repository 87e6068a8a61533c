//! Unit tests for MongoDB adapter.

use super::*;
use crate::security::Credentials;

fn config() -> ConnectionConfig {
    ConnectionConfig::new(DatabaseKind::MongoDb, "localhost".to_string())
        .with_database("shop".to_string())
        .with_credentials(Credentials::new(
            "admin".to_string(),
            "mongo-secret".to_string(),
        ))
}

#[tokio::test]
async fn test_mongo_adapter_database_kind() {
    let adapter = MongoAdapter::new(&config()).await.unwrap();
    assert_eq!(adapter.database_kind(), DatabaseKind::MongoDb);
}

#[tokio::test]
async fn test_mongo_adapter_has_no_structure_step() {
    let adapter = MongoAdapter::new(&config()).await.unwrap();
    let structure = adapter.table_structure("users").await.unwrap();
    assert!(structure.is_none());
}

#[tokio::test]
async fn test_mongo_adapter_debug_hides_password() {
    let adapter = MongoAdapter::new(&config()).await.unwrap();
    let debug = format!("{:?}", adapter);

    assert!(debug.contains("MongoAdapter"));
    assert!(!debug.contains("mongo-secret"));
}

#[tokio::test]
async fn test_mongo_ping_fails_without_server() {
    let config = config()
        .with_port(1)
        .with_connect_timeout(std::time::Duration::from_secs(1));
    let adapter = MongoAdapter::new(&config).await.unwrap();

    let result = adapter.test_connection().await;
    assert!(matches!(
        result,
        Err(crate::error::BackupError::Connection { .. })
    ));
}
