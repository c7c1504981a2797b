use crate::{domain::post::entity::Post, services::response::ServiceError};

use super::Repository;

impl Repository<Post> {
	pub async fn add(
		&mut self,
		text: &str,
		author_id: i64,
	) -> Result<Post, ServiceError> {
		let mut executor = self.executor.lock().await;
		let result = sqlx::query("INSERT INTO posts (text, author_id) VALUES (?, ?)")
			.bind(text)
			.bind(author_id)
			.execute(executor.transaction()?)
			.await?;

		Ok(Post {
			id: result.last_insert_rowid(),
			text: text.to_string(),
			author_id,
		})
	}

	pub async fn list(&self) -> Result<Vec<Post>, ServiceError> {
		let mut executor = self.executor.lock().await;
		let posts = sqlx::query_as::<_, Post>("SELECT id, text, author_id FROM posts ORDER BY id")
			.fetch_all(executor.transaction()?)
			.await?;
		Ok(posts)
	}

	pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, ServiceError> {
		let mut executor = self.executor.lock().await;
		let posts = sqlx::query_as::<_, Post>("SELECT id, text, author_id FROM posts WHERE author_id = ? ORDER BY id")
			.bind(author_id)
			.fetch_all(executor.transaction()?)
			.await?;
		Ok(posts)
	}

	/// Deletes the post only when `author_id` owns it. Returns whether a row went away.
	pub async fn delete_owned(
		&mut self,
		id: i64,
		author_id: i64,
	) -> Result<bool, ServiceError> {
		let mut executor = self.executor.lock().await;
		let result = sqlx::query("DELETE FROM posts WHERE id = ? AND author_id = ?")
			.bind(id)
			.bind(author_id)
			.execute(executor.transaction()?)
			.await?;
		Ok(result.rows_affected() == 1)
	}
}
