pub(crate) mod post_repository;
pub(crate) mod user_repository;

use std::{marker::PhantomData, sync::Arc};

use tokio::sync::Mutex;

use crate::database::DatabaseExecutor;

pub trait TRepository<E> {
	fn new(executor: Arc<Mutex<E>>) -> Self;
}

/// Query surface for one entity kind, bound to the request's executor.
pub struct Repository<A> {
	pub executor: Arc<Mutex<DatabaseExecutor>>,
	pub _phantom: PhantomData<A>,
}

impl<A> TRepository<DatabaseExecutor> for Repository<A> {
	fn new(executor: Arc<Mutex<DatabaseExecutor>>) -> Self {
		Self {
			executor,
			_phantom: Default::default(),
		}
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use std::sync::Arc;

	use sqlx::SqlitePool;
	use tokio::sync::Mutex;

	use crate::{
		database::{create_schema, DatabaseExecutor},
		dependencies::memory_pool,
	};

	pub async fn pool() -> SqlitePool {
		let pool = memory_pool().await.unwrap();
		create_schema(&pool).await.unwrap();
		pool
	}

	pub async fn executor(pool: &SqlitePool) -> Arc<Mutex<DatabaseExecutor>> {
		let mut executor = DatabaseExecutor::new(pool.clone());
		executor.begin().await.unwrap();
		executor.into()
	}
}
