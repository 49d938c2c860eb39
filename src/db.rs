use crate::config;
#[cfg(test)]
use crate::test;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::LazyLock;
use tracing::info;

pub type Connection = PooledConnection<ConnectionManager<PgConnection>>;
pub type ConnectionPool = Pool<ConnectionManager<PgConnection>>;
pub type ConnectionResult = Result<Connection, PoolError>;

/// Returns a connection to the database from a connection pool.
pub fn get_connection() -> ConnectionResult {
    #[cfg(not(test))]
    {
        CONNECTION_POOL.get()
    }
    #[cfg(test)]
    {
        test::get_connection()
    }
}

#[cfg(test)]
pub fn get_prod_connection() -> ConnectionResult {
    CONNECTION_POOL.get()
}

/// Runs embedded migrations on the database. Doesn't perform any error handling,
/// as this is meant to be run once on application start.
pub fn run_migrations(conn: &mut PgConnection) {
    let pending_migrations = conn.pending_migrations(MIGRATIONS).unwrap();
    if pending_migrations.is_empty() {
        return;
    }

    info!("Running {} pending migration(s)...", pending_migrations.len());
    conn.run_pending_migrations(MIGRATIONS).unwrap();
}

pub fn build_pool() -> ConnectionPool {
    let num_threads = tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_workers())
        .unwrap_or(1);
    let manager = ConnectionManager::<PgConnection>::new(config::database_url());
    Pool::builder()
        .max_size(num_threads as u32)
        .max_lifetime(None)
        .idle_timeout(None)
        .test_on_check_out(true)
        .build(manager)
        .expect("Could not build connection pool")
}

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

static CONNECTION_POOL: LazyLock<ConnectionPool> = LazyLock::new(build_pool);
