use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize, FromRow)]
pub struct Post {
	pub id: i64,
	pub text: String,
	pub author_id: i64,
}
