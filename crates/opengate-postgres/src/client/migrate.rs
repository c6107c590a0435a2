//! Embedded migration runner.
//!
//! Migrations are compiled into the binary with `embed_migrations!` and
//! applied at startup. The diesel migration harness is synchronous, so the
//! pooled async connection is wrapped and driven on a blocking task.

use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{PgClient, PooledConnection};
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Outcome of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Wall-clock time the run took.
    pub duration: Duration,
    /// Versions of the migrations applied by this run, oldest first.
    pub applied: Vec<String>,
}

impl MigrationReport {
    /// Returns whether the schema was already up to date.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }

    /// Returns the number of migrations applied by this run.
    #[inline]
    pub fn count(&self) -> usize {
        self.applied.len()
    }
}

impl PgClient {
    /// Runs all pending migrations on the database.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Migration`] when a migration fails to apply or the
    /// blocking task is cancelled.
    pub async fn run_pending_migrations(&self) -> PgResult<MigrationReport> {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            "Starting database migration process",
        );

        let start_time = Instant::now();
        let conn = self.get_connection().await?;
        let mut conn: AsyncConnectionWrapper<PooledConnection> = conn.into();

        let applied = spawn_blocking(move || {
            conn.run_pending_migrations(MIGRATIONS).map(|versions| {
                versions
                    .into_iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
            })
        })
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Migration task panicked or was cancelled"
            );
            PgError::Migration(Box::new(err))
        })?
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Database migration process failed"
            );
            PgError::Migration(err)
        })?;

        let duration = start_time.elapsed();
        if applied.is_empty() {
            tracing::info!(
                target: TRACING_TARGET_MIGRATION,
                duration = ?duration,
                "Database schema is already up to date"
            );
        } else {
            tracing::info!(
                target: TRACING_TARGET_MIGRATION,
                duration = ?duration,
                migrations_count = applied.len(),
                "Database migration process completed successfully"
            );
        }

        Ok(MigrationReport { duration, applied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_noop() {
        let report = MigrationReport {
            duration: Duration::from_millis(3),
            applied: vec![],
        };
        assert!(report.is_noop());
        assert_eq!(report.count(), 0);
    }

    #[test]
    fn applied_versions_are_counted() {
        let report = MigrationReport {
            duration: Duration::from_secs(1),
            applied: vec!["00000000000000".into(), "2025-06-10-000001".into()],
        };
        assert!(!report.is_noop());
        assert_eq!(report.count(), 2);
    }
}
