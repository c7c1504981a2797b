use std::time::Duration;

use sqlx::SqlitePool;

use crate::{
	config::Config,
	database::create_schema,
	dependencies::connection_pool,
	domain::auth::TokenKeys,
	services::{cache::PostsCache, response::ServiceError},
	state::AppState,
};

pub struct Bootstrap;
impl Bootstrap {
	/// Connects to the configured database, creates the schema when absent and
	/// wires the application state.
	pub async fn app_state(config: &Config) -> Result<AppState, ServiceError> {
		tracing::info!("Connections are being pooled...");
		let pool = connection_pool(config).await?;
		Self::with_pool(pool, config).await
	}

	pub async fn with_pool(
		pool: SqlitePool,
		config: &Config,
	) -> Result<AppState, ServiceError> {
		create_schema(&pool).await?;

		let tokens = TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl_secs);
		let posts_cache = PostsCache::new(Duration::from_secs(config.posts_cache_ttl_secs), config.posts_cache_capacity);
		if !posts_cache.is_enabled() {
			tracing::info!("Post listing cache is disabled");
		}

		Ok(AppState::new(pool, tokens, posts_cache))
	}
}

/// Releases the pool's connections; call once the server has stopped.
pub async fn shutdown(state: AppState) {
	state.pool().close().await;
	tracing::info!("Database connections closed");
}
