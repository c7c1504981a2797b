use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

pub async fn connection_pool(config: &Config) -> Result<SqlitePool, sqlx::Error> {
	// WAL keeps readers off the writer's lock; writers queue on the busy timeout.
	let options = SqliteConnectOptions::from_str(&config.database_url)?
		.create_if_missing(true)
		.foreign_keys(true)
		.journal_mode(SqliteJournalMode::Wal)
		.busy_timeout(Duration::from_millis(config.database_busy_timeout_ms));

	SqlitePoolOptions::new()
		.max_connections(config.database_max_connections)
		.connect_with(options)
		.await
}

/// Single-connection pool over a private in-memory database.
///
/// The connection is never recycled, otherwise the database would vanish with it.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await
}
