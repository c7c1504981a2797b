use std::{mem, sync::Arc};

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Sqlite;

use tokio::sync::Mutex;

use crate::services::response::ServiceError;

/// Per-request database session.
///
/// All work happens inside one transaction on one pooled connection.
/// Dropping the executor without calling [`DatabaseExecutor::commit`] rolls
/// the transaction back before the connection returns to the pool, so every
/// exit path releases it.
pub struct DatabaseExecutor {
	pool: SqlitePool,
	connection: Option<PoolConnection<Sqlite>>,
}

impl DatabaseExecutor {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool, connection: None }
	}
	pub fn transaction(&mut self) -> Result<&mut SqliteConnection, ServiceError> {
		self.connection.as_deref_mut().ok_or(ServiceError::TransactionNotBegun)
	}
	pub fn in_transaction(&self) -> bool {
		self.connection.is_some()
	}

	/// Read session. The write lock is only taken if a statement needs it.
	pub(crate) async fn begin(&mut self) -> Result<(), ServiceError> {
		self.begin_with("BEGIN").await
	}

	/// Write session. Takes SQLite's write lock up front, waiting out the busy
	/// timeout, so two sessions that read before writing cannot deadlock.
	pub(crate) async fn begin_immediate(&mut self) -> Result<(), ServiceError> {
		self.begin_with("BEGIN IMMEDIATE").await
	}

	async fn begin_with(&mut self, statement: &'static str) -> Result<(), ServiceError> {
		if self.connection.is_some() {
			tracing::warn!("Transaction begun already");
			return Err(ServiceError::TransactionAlreadyBegun);
		}
		let mut connection = self.pool.acquire().await?;
		sqlx::query(statement).execute(&mut *connection).await?;
		self.connection = Some(connection);
		Ok(())
	}

	pub(crate) async fn commit(&mut self) -> Result<(), ServiceError> {
		let mut connection = mem::take(&mut self.connection).ok_or(ServiceError::TransactionNotBegun)?;
		if let Err(err) = sqlx::query("COMMIT").execute(&mut *connection).await {
			tracing::error!("Error occurred during commit operation : {:?}", err);
			// A failed COMMIT can leave the transaction open.
			self.connection = Some(connection);
			return Err(ServiceError::Database(err));
		}
		Ok(())
	}
	pub(crate) async fn rollback(&mut self) -> Result<(), ServiceError> {
		let mut connection = mem::take(&mut self.connection).ok_or(ServiceError::TransactionNotBegun)?;
		sqlx::query("ROLLBACK").execute(&mut *connection).await?;
		Ok(())
	}
}

impl Drop for DatabaseExecutor {
	fn drop(&mut self) {
		let Some(mut connection) = self.connection.take() else {
			return;
		};
		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn(async move {
					if let Err(err) = sqlx::query("ROLLBACK").execute(&mut *connection).await {
						tracing::warn!("Rollback of abandoned session failed, closing connection: {:?}", err);
						drop(connection.detach());
					}
				});
			}
			// Closing the connection makes SQLite discard the transaction.
			Err(_) => drop(connection.detach()),
		}
	}
}

impl From<DatabaseExecutor> for Arc<Mutex<DatabaseExecutor>> {
	fn from(value: DatabaseExecutor) -> Self {
		Arc::new(Mutex::new(value))
	}
}

/// Creates the `users` and `posts` tables when they are absent.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), ServiceError> {
	sqlx::migrate!("./migrations").run(pool).await?;
	Ok(())
}
