//! PostgreSQL connection pool management.

use super::PostgresAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

impl PostgresAdapter {
    /// Creates a new PostgreSQL adapter with a lazily connected pool.
    ///
    /// # Errors
    /// Returns a configuration error if the pool options are rejected
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    use sqlx::Executor;

                    conn.execute("SET SESSION CHARACTERISTICS AS TRANSACTION READ ONLY")
                        .await?;
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    /// Closes the connection pool gracefully
    pub async fn close_pool(&self) {
        self.pool.close().await;
    }
}

/// Builds driver options from the run configuration.
///
/// Without a database name the server picks the login's default database.
pub(super) fn connect_options(config: &ConnectionConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.effective_port())
        .username(config.credentials.username())
        .password(config.credentials.password())
        .application_name("dbbackup");

    if config.database.is_empty() {
        options
    } else {
        options.database(&config.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatabaseKind;
    use crate::security::Credentials;

    #[test]
    fn test_connect_options_from_config() {
        let config = ConnectionConfig::new(DatabaseKind::Postgres, "pg.internal".to_string())
            .with_database("shop".to_string())
            .with_credentials(Credentials::new("backup".to_string(), "pw".to_string()));

        let options = connect_options(&config);

        assert_eq!(options.get_host(), "pg.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "backup");
        assert_eq!(options.get_database(), Some("shop"));
        assert_eq!(options.get_application_name(), Some("dbbackup"));
    }

    #[tokio::test]
    async fn test_adapter_creation_is_lazy() {
        let config = ConnectionConfig::new(DatabaseKind::Postgres, "localhost".to_string())
            .with_port(9999);

        assert!(PostgresAdapter::new(&config).is_ok());
    }
}
