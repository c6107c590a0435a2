//! Database client, configuration, and migration management.

mod migrate;
mod pg_client;
mod pg_config;

pub use migrate::MigrationReport;
pub use pg_client::{ConnectionPool, PgClient, PgPoolStatus, PooledConnection};
pub use pg_config::PgConfig;
