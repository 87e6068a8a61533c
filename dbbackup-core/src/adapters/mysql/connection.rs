//! MySQL connection pool management.
//!
//! The pool is created lazily; nothing touches the network until
//! `test_connection` runs its round trip.

use super::MySqlAdapter;
use crate::Result;
use crate::adapters::ConnectionConfig;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

impl MySqlAdapter {
    /// Creates a new MySQL adapter with a lazily connected pool.
    ///
    /// # Errors
    /// Returns a configuration error if the pool options are rejected
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    use sqlx::Executor;

                    // A dump never writes
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
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
/// The database is only selected when one was given, so a bare login can
/// still be verified.
pub(super) fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.effective_port())
        .username(config.credentials.username())
        .password(config.credentials.password())
        .charset("utf8mb4");

    if config.database.is_empty() {
        options
    } else {
        options.database(&config.database)
    }
}
