//! Error types for backup runs.
//!
//! Errors fall into two severities. Configuration, connection and
//! enumeration failures end the run; everything that goes wrong while a
//! single table or collection is being exported is recorded and the run
//! moves on to the next unit. Passwords never reach any error message.

use thiserror::Error;

/// Main error type for dbbackup operations.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Database connection failed
    #[error("Error connecting to database: {context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Tables or collections could not be listed
    #[error("Error fetching tables: {context}: {source}")]
    Enumeration {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Structure or data fetch failed for one unit
    #[error("{context} for {unit}: {source}")]
    Export {
        unit: String,
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Table or collection name cannot be used as a file name
    #[error("Refusing to export '{name}': name is not usable as a file name")]
    InvalidUnitName { name: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed
    #[error("Serialization failed: {context}: {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with BackupError
pub type Result<T> = std::result::Result<T, BackupError>;

impl BackupError {
    /// Creates a connection error
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an enumeration error
    pub fn enumeration_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Enumeration {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a per-unit export error
    ///
    /// # Arguments
    /// * `unit` - Table or collection name
    /// * `context` - What was being done, e.g. "Error fetching data"
    /// * `error` - The underlying driver error
    pub fn export_failed<E>(unit: impl Into<String>, context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Export {
            unit: unit.into(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns true for errors that end the whole run.
    ///
    /// Per-unit failures (export, file name, I/O, serialization) are not
    /// fatal: the exporter logs them and continues with the next unit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Connection { .. } | Self::Enumeration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        assert!(BackupError::configuration("missing --type").is_fatal());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(BackupError::connection_failed("localhost:3306", io).is_fatal());

        let io = std::io::Error::other("boom");
        assert!(BackupError::enumeration_failed("SHOW FULL TABLES", io).is_fatal());

        let io = std::io::Error::other("boom");
        assert!(!BackupError::export_failed("users", "Error fetching data", io).is_fatal());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!BackupError::io("Failed to write users.sql", io).is_fatal());

        assert!(
            !BackupError::InvalidUnitName {
                name: "../etc".to_string()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_export_error_message_names_unit() {
        let io = std::io::Error::other("table is locked");
        let error = BackupError::export_failed("orders", "Error fetching data", io);

        assert_eq!(
            error.to_string(),
            "Error fetching data for orders: table is locked"
        );
    }
}
