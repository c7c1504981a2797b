use crate::{domain::user::entity::User, services::response::ServiceError};

use super::Repository;

impl Repository<User> {
	pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
		let mut executor = self.executor.lock().await;
		let user = sqlx::query_as::<_, User>("SELECT id, email, password FROM users WHERE email = ?")
			.bind(email)
			.fetch_optional(executor.transaction()?)
			.await?;
		Ok(user)
	}

	pub async fn get(&self, id: i64) -> Result<Option<User>, ServiceError> {
		let mut executor = self.executor.lock().await;
		let user = sqlx::query_as::<_, User>("SELECT id, email, password FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(executor.transaction()?)
			.await?;
		Ok(user)
	}

	/// Inserts a user. A taken email surfaces as `Conflict`, even when two signups race.
	pub async fn add(
		&mut self,
		email: &str,
		password_hash: &str,
	) -> Result<User, ServiceError> {
		let mut executor = self.executor.lock().await;
		let result = sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
			.bind(email)
			.bind(password_hash)
			.execute(executor.transaction()?)
			.await
			.map_err(|err| match err.as_database_error() {
				Some(db_err) if db_err.is_unique_violation() => ServiceError::Conflict("Email already registered".into()),
				_ => ServiceError::Database(err),
			})?;

		Ok(User {
			id: result.last_insert_rowid(),
			email: email.to_string(),
			password: password_hash.to_string(),
		})
	}

	/// Removes a user together with their posts. No endpoint deletes users; this
	/// only backs the cascade check in the tests below.
	#[cfg(test)]
	pub async fn delete(&mut self, id: i64) -> Result<bool, ServiceError> {
		let mut executor = self.executor.lock().await;
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id)
			.execute(executor.transaction()?)
			.await?;
		Ok(result.rows_affected() == 1)
	}
}
