//! Application state shared across handlers

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{domain::auth::TokenKeys, services::cache::PostsCache};

/// Explicitly constructed persistence handle plus the auth and cache services
/// that go with it. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
	inner: Arc<AppStateInner>,
}

struct AppStateInner {
	pool: SqlitePool,
	tokens: TokenKeys,
	posts_cache: PostsCache,
}

impl AppState {
	pub fn new(
		pool: SqlitePool,
		tokens: TokenKeys,
		posts_cache: PostsCache,
	) -> Self {
		Self {
			inner: Arc::new(AppStateInner { pool, tokens, posts_cache }),
		}
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.inner.pool
	}

	pub fn tokens(&self) -> &TokenKeys {
		&self.inner.tokens
	}

	pub fn posts_cache(&self) -> &PostsCache {
		&self.inner.posts_cache
	}
}
