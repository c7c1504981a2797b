use std::{fmt, ops::RangeInclusive, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} has an invalid value `{value}`")]
	Invalid { name: &'static str, value: String },
}

/// Upper bound for `TOKEN_TTL_SECS`: ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct Config {
	/// Which errors we want to log
	pub log_level: String,

	/// Port server is listening to
	pub server_ip_port: String,
	pub database_url: String,
	pub database_max_connections: u32,
	/// How long a session waits for SQLite's write lock
	pub database_busy_timeout_ms: u64,
	pub allow_origins: String,

	/// HMAC secret used to sign access tokens
	pub jwt_secret: String,
	pub token_ttl_secs: i64,

	pub posts_cache_ttl_secs: u64,
	pub posts_cache_capacity: usize,
}

impl Config {
	pub fn new() -> Result<Config, ConfigError> {
		dotenv::dotenv().ok();
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds a config from an arbitrary variable source; `new` uses the process environment.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
		let log_level = lookup("LOG_LEVEL").unwrap_or("info".to_string());
		let server_ip_port = lookup("SERVER_IP_PORT").unwrap_or("0.0.0.0:8000".into());
		let database_url = lookup("DATABASE_URL").unwrap_or("sqlite://blog.db?mode=rwc".into());
		let allow_origins = lookup("ALLOW_ORIGINS").unwrap_or("http://localhost:3000".to_string());
		let jwt_secret = lookup("JWT_SECRET")
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::Missing("JWT_SECRET"))?;

		Ok(Config {
			log_level,
			server_ip_port,
			database_url,
			database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
			database_busy_timeout_ms: parse_or(&lookup, "DATABASE_BUSY_TIMEOUT_MS", 5000)?,
			allow_origins,
			jwt_secret,
			token_ttl_secs: in_range(parse_or(&lookup, "TOKEN_TTL_SECS", 3600)?, "TOKEN_TTL_SECS", 1..=MAX_TOKEN_TTL_SECS)?,
			posts_cache_ttl_secs: parse_or(&lookup, "POSTS_CACHE_TTL_SECS", 30)?,
			posts_cache_capacity: parse_or(&lookup, "POSTS_CACHE_CAPACITY", 128)?,
		})
	}

	pub fn origins(&self) -> impl Iterator<Item = &str> {
		self.allow_origins.split(',').map(str::trim).filter(|origin| !origin.is_empty())
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("log_level", &self.log_level)
			.field("server_ip_port", &self.server_ip_port)
			.field("database_url", &self.database_url)
			.field("token_ttl_secs", &self.token_ttl_secs)
			.field("posts_cache_ttl_secs", &self.posts_cache_ttl_secs)
			.finish_non_exhaustive()
	}
}

fn in_range(
	value: i64,
	name: &'static str,
	range: RangeInclusive<i64>,
) -> Result<i64, ConfigError> {
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(ConfigError::Invalid {
			name,
			value: value.to_string(),
		})
	}
}

fn parse_or<T: FromStr>(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: T,
) -> Result<T, ConfigError> {
	match lookup(name) {
		None => Ok(default),
		Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
	}
}
