//! High-level database client over a deadpool-managed connection pool.

use std::fmt;
use std::sync::Arc;

use deadpool::managed::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

use crate::{PgConfig, PgConnection, PgError, PgResult, TRACING_TARGET_CONNECTION};

/// Managed pool of asynchronous PostgreSQL connections.
pub type ConnectionPool = Pool<AsyncDieselConnectionManager<PgConnection>>;

/// A single connection checked out from the pool.
///
/// Dereferences to [`PgConnection`], so repository traits implemented on the
/// raw connection are usable directly on pooled ones.
pub type PooledConnection = deadpool::managed::Object<AsyncDieselConnectionManager<PgConnection>>;

/// Connection pool status information.
#[derive(Debug, Clone)]
pub struct PgPoolStatus {
    /// Maximum number of connections in the pool
    pub max_size: usize,
    /// Current number of connections in the pool
    pub size: usize,
    /// Number of available connections
    pub available: usize,
    /// Number of requests waiting for connections
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Returns the utilization of the pool (0.0 to 1.0).
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            (self.size - self.available) as f64 / self.max_size as f64
        }
    }

    /// Returns whether the pool is under pressure (high utilization or waiting requests).
    #[inline]
    pub fn is_under_pressure(&self) -> bool {
        self.waiting > 0 || self.utilization() > 0.8
    }
}

/// High-level database client that manages connections and migrations.
///
/// This struct provides the main interface for database operations,
/// encapsulating connection pool management and configuration. Cloning is
/// cheap: all clones share the same pool.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Creates a new database client with the provided configuration.
    ///
    /// This establishes a connection pool; individual connections are opened
    /// lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the pool cannot
    /// be constructed.
    pub fn new(config: PgConfig) -> PgResult<Self> {
        config.validate()?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            database_url = %config.database_url_masked(),
            max_connections = config.postgres_max_connections,
            "Initializing database client"
        );

        let manager = AsyncDieselConnectionManager::new(&config.postgres_url);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .runtime(deadpool::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %e,
                    "Failed to create connection pool"
                );
                PgError::Unexpected(format!("Failed to build connection pool: {}", e).into())
            })?;

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Checks out a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is exhausted, closed, or a new
    /// connection cannot be established within the configured timeout.
    pub async fn get_connection(&self) -> PgResult<PooledConnection> {
        self.inner.pool.get().await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %e,
                "Failed to get connection from pool"
            );
            PgError::from(e)
        })
    }

    /// Returns the configuration used to create this client.
    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }

    /// Returns a snapshot of the connection pool status.
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.inner.pool.status();
        PgPoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available.max(0) as usize,
            waiting: status.waiting,
        }
    }

}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
