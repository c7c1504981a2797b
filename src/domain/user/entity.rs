use serde::Serialize;
use sqlx::FromRow;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, FromRow)]
pub struct User {
	pub id: i64,
	pub email: String,
	/// Argon2 encoded hash, never the plaintext.
	#[serde(skip_serializing)]
	pub password: String,
}
