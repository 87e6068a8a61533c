//! Database connection configuration.
//!
//! This module provides the `ConnectionConfig` struct describing one backup
//! run: which server to reach, how to log in, and where to write the files.

use crate::models::DatabaseKind;
use crate::security::Credentials;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a backup run.
///
/// # Security
/// `Display` and `Debug` never include the password.
///
/// # Example
/// ```rust
/// use dbbackup_core::adapters::ConnectionConfig;
/// use dbbackup_core::models::DatabaseKind;
///
/// let config = ConnectionConfig::new(DatabaseKind::MySql, "localhost".to_string())
///     .with_database("shop".to_string())
///     .with_destination("/var/backups/shop".into());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.effective_port(), 3306);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database kind selected on the command line
    pub kind: DatabaseKind,
    /// Database host address
    pub host: String,
    /// Optional port; the engine default is used otherwise
    pub port: Option<u16>,
    /// Database name (may be empty for engines that allow it)
    pub database: String,
    /// Login
    pub credentials: Credentials,
    /// Export directory
    pub destination: PathBuf,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Maximum number of pooled connections (relational engines)
    pub max_connections: u32,
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}:{}/{}",
            self.kind,
            self.host,
            self.effective_port(),
            self.database
        )
        // Intentionally omit credentials
    }
}

impl ConnectionConfig {
    /// Creates a new configuration with the prompt defaults.
    pub fn new(kind: DatabaseKind, host: String) -> Self {
        Self {
            kind,
            host,
            port: None,
            database: String::new(),
            credentials: Credentials::default(),
            destination: PathBuf::from("."),
            connect_timeout: Duration::from_secs(30),
            max_connections: 4,
        }
    }

    /// Port to connect to, falling back to the engine default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.kind.default_port())
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns a configuration error if any value is unusable
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::BackupError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == Some(0) {
            return Err(crate::error::BackupError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.kind == DatabaseKind::MongoDb && self.database.is_empty() {
            return Err(crate::error::BackupError::configuration(
                "a database name is required for MongoDB",
            ));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(crate::error::BackupError::configuration(
                "destination cannot be empty",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::BackupError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.max_connections == 0 {
            return Err(crate::error::BackupError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > 32 {
            return Err(crate::error::BackupError::configuration(
                "max_connections should not exceed 32",
            ));
        }

        Ok(())
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = database;
        self
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Builder method to set the export directory.
    pub fn with_destination(mut self, destination: PathBuf) -> Self {
        self.destination = destination;
        self
    }

    /// Builder method to set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}
