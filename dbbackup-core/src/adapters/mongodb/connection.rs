//! MongoDB connection management.
//!
//! This module handles MongoDB client creation and connection validation.
//!
//! # Security Features
//! - Credentials are passed through client options, never embedded in the
//!   connection string
//! - Connection validation without side effects
//! - Timeout configuration for connection and server selection

use super::MongoAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::error::BackupError;
use mongodb::Client;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Credential};
use url::Url;

impl MongoAdapter {
    /// Creates a new MongoDB adapter.
    ///
    /// The client connects lazily; `test_connection` performs the first
    /// round trip.
    ///
    /// # Errors
    /// Returns a configuration error if the host cannot form a valid
    /// connection string, or a connection error if the client cannot be
    /// created
    pub async fn new(config: &ConnectionConfig) -> Result<Self> {
        let client_options = create_client_options(config).await?;

        let client = Client::with_options(client_options).map_err(|e| {
            BackupError::connection_failed(
                format!("Failed to create MongoDB client for {}", config),
                e,
            )
        })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Runs `ping` against the configured database.
    pub(super) async fn ping(&self) -> Result<()> {
        self.client
            .database(&self.config.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| BackupError::connection_failed(self.config.to_string(), e))?;

        Ok(())
    }
}

/// Builds the `mongodb://host:port/` string without credentials.
pub(super) fn connection_uri(config: &ConnectionConfig) -> Result<String> {
    let mut url = Url::parse("mongodb://localhost/").map_err(|e| {
        BackupError::configuration(format!("Invalid MongoDB connection string: {}", e))
    })?;

    let host = if config.host.contains(':') && !config.host.starts_with('[') {
        format!("[{}]", config.host)
    } else {
        config.host.clone()
    };

    url.set_host(Some(&host)).map_err(|e| {
        BackupError::configuration(format!("Invalid MongoDB host '{}': {}", config.host, e))
    })?;
    url.set_port(Some(config.effective_port())).map_err(|_| {
        BackupError::configuration(format!("Invalid MongoDB port for host '{}'", config.host))
    })?;

    Ok(url.to_string())
}

/// Creates MongoDB client options from the run configuration.
async fn create_client_options(config: &ConnectionConfig) -> Result<ClientOptions> {
    let uri = connection_uri(config)?;

    let mut options = ClientOptions::parse(&uri).await.map_err(|e| {
        BackupError::configuration(format!(
            "Failed to parse MongoDB connection options: {}",
            e
        ))
    })?;

    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.connect_timeout);
    options.app_name = Some(format!("dbbackup-{}", env!("CARGO_PKG_VERSION")));

    if config.credentials.has_password() {
        options.credential = Some(
            Credential::builder()
                .username(config.credentials.username().to_string())
                .password(config.credentials.password().to_string())
                .build(),
        );
    }

    Ok(options)
}
