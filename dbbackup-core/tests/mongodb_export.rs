//! MongoDB export tests against a real server.
//!
//! Ignored by default; run with `cargo test -- --ignored` when Docker is
//! available.

#![cfg(feature = "mongodb")]
#![allow(clippy::unwrap_used)]

use dbbackup_core::{
    ConnectionConfig, DatabaseKind, Exporter, MemoryErrorLog, OutputWriter, UnitOutcome, connect,
};
use mongodb::Client;
use mongodb::bson::{Document, doc, oid::ObjectId};
use tempfile::TempDir;
use testcontainers_modules::{mongo::Mongo, testcontainers::runners::AsyncRunner};

#[tokio::test]
#[ignore = "requires Docker, run with --ignored"]
async fn test_mongodb_shop_backup() {
    let container = Mongo::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();

    let client = Client::with_uri_str(format!("mongodb://localhost:{}/", port))
        .await
        .unwrap();
    let db = client.database("shop");
    let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    db.collection::<Document>("carts")
        .insert_many([
            doc! { "_id": oid, "owner": "Ann", "items": 2 },
            doc! { "_id": 2, "owner": "Bob", "items": [] },
            doc! { "_id": 3, "owner": "Eve", "total": 9.5 },
        ])
        .await
        .unwrap();
    db.create_collection("empty").await.unwrap();
    db.create_collection("cart_view")
        .view_on("carts".to_string())
        .pipeline(vec![doc! { "$match": { "items": 2 } }])
        .await
        .unwrap();

    let temp = TempDir::new().unwrap();
    let config = ConnectionConfig::new(DatabaseKind::MongoDb, "localhost".to_string())
        .with_port(port)
        .with_database("shop".to_string())
        .with_destination(temp.path().to_path_buf());

    let adapter = connect(&config).await.unwrap();
    let mut units = adapter.list_units().await.unwrap();
    units.sort();
    assert_eq!(units, vec!["carts".to_string(), "empty".to_string()]);

    let writer = OutputWriter::new(temp.path());
    let journal = MemoryErrorLog::new();
    let summary = Exporter::new(adapter.as_ref(), &writer, &journal)
        .run()
        .await
        .unwrap();
    adapter.close().await;

    assert_eq!(summary.exported_count(), 2);
    assert!(journal.entries().is_empty());
    assert!(!temp.path().join("cart_view.json").exists());

    let carts_report = summary.units.iter().find(|u| u.name == "carts").unwrap();
    assert!(matches!(
        carts_report.outcome,
        UnitOutcome::Exported { records: 3, .. }
    ));

    let carts: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp.path().join("carts.json")).unwrap())
            .unwrap();
    let carts = carts.as_array().unwrap();
    assert_eq!(carts.len(), 3);
    assert_eq!(carts[0]["_id"]["$oid"], "507f1f77bcf86cd799439011");
    assert_eq!(carts[0]["items"], 2);
    assert_eq!(carts[2]["total"], 9.5);

    let empty = std::fs::read_to_string(temp.path().join("empty.json")).unwrap();
    assert_eq!(empty, "[]");
}

#[tokio::test]
#[ignore = "requires Docker, run with --ignored"]
async fn test_mongodb_empty_database_writes_nothing() {
    let container = Mongo::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();

    let temp = TempDir::new().unwrap();
    let config = ConnectionConfig::new(DatabaseKind::MongoDb, "localhost".to_string())
        .with_port(port)
        .with_database("nothing_here".to_string())
        .with_destination(temp.path().to_path_buf());

    let adapter = connect(&config).await.unwrap();
    let writer = OutputWriter::new(temp.path());
    let journal = MemoryErrorLog::new();
    let summary = Exporter::new(adapter.as_ref(), &writer, &journal)
        .run()
        .await
        .unwrap();
    adapter.close().await;

    assert!(summary.units.is_empty());
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}
