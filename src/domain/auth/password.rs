use argon2::Config as ArgonConfig;
use rand::Rng;

use crate::services::response::ServiceError;

// Unit tests hash many passwords in debug builds.
const MEM_COST_KIB: u32 = if cfg!(test) { 1024 } else { 19 * 1024 };

/// Hashes `password` with a fresh random salt, returning the encoded Argon2 string.
///
/// Hashing is CPU bound, so it runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, ServiceError> {
	tokio::task::spawn_blocking(move || {
		let salt: [u8; 16] = rand::thread_rng().gen();
		let config = ArgonConfig {
			mem_cost: MEM_COST_KIB,
			..ArgonConfig::default()
		};
		argon2::hash_encoded(password.as_bytes(), &salt, &config)
	})
	.await?
	.map_err(ServiceError::from)
}

/// Checks `password` against an encoded hash in constant time.
pub async fn verify_password(
	encoded: String,
	password: String,
) -> Result<bool, ServiceError> {
	tokio::task::spawn_blocking(move || argon2::verify_encoded(&encoded, password.as_bytes()))
		.await?
		.map_err(ServiceError::from)
}
