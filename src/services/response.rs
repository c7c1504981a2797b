use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MessageResponse {
	pub message: String,
}

impl From<&str> for MessageResponse {
	fn from(value: &str) -> Self {
		Self { message: value.to_string() }
	}
}

#[derive(Debug, Error)]
pub enum ServiceError {
	#[error("{0}")]
	Conflict(String),
	#[error("{0}")]
	Unauthorized(String),
	#[error("{0}")]
	NotFound(String),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migration(#[from] sqlx::migrate::MigrateError),
	#[error("transaction has not begun")]
	TransactionNotBegun,
	#[error("transaction has begun already")]
	TransactionAlreadyBegun,
	#[error("password hashing error: {0}")]
	PasswordHash(#[from] argon2::Error),
	#[error("token lifetime is out of range")]
	TokenLifetimeOutOfRange,
	#[error("token error: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
	#[error("background task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
	pub fn invalid_credentials() -> Self {
		Self::Unauthorized("Invalid credentials".into())
	}
	pub fn invalid_token() -> Self {
		Self::Unauthorized("Invalid token".into())
	}
	pub fn post_not_found() -> Self {
		Self::NotFound("Post not found".into())
	}

	pub fn status(&self) -> StatusCode {
		match self {
			// Duplicate signups answer 400, which existing clients rely on.
			ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
			ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let status = self.status();
		let detail = if status.is_server_error() {
			tracing::error!("Request failed: {}", self);
			"Internal Server Error".to_string()
		} else {
			self.to_string()
		};

		let mut response = (status, Json(json!({ "detail": detail }))).into_response();
		if status == StatusCode::UNAUTHORIZED {
			response
				.headers_mut()
				.insert(axum::http::header::WWW_AUTHENTICATE, axum::http::HeaderValue::from_static("Bearer"));
		}
		response
	}
}
