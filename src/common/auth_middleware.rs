use async_trait::async_trait;
use axum::{
	extract::{FromRequestParts, Query, State},
	headers::{authorization::Bearer, Authorization},
	http::{request::Parts, Request},
	middleware::Next,
	response::Response,
	TypedHeader,
};
use serde::Deserialize;

use crate::{services::response::ServiceError, state::AppState};

/// Bearer credential presented with the request, if any.
///
/// Read from `Authorization: Bearer ...`, falling back to a `token` query
/// parameter for clients that cannot set headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

#[derive(Deserialize)]
struct TokenQuery {
	token: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
	S: Send + Sync,
{
	type Rejection = ServiceError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		if let Ok(TypedHeader(Authorization(bearer))) = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
			return Ok(Self(Some(bearer.token().to_string())));
		}
		let token = Query::<TokenQuery>::from_request_parts(parts, state)
			.await
			.ok()
			.and_then(|Query(query)| query.token)
			.filter(|token| !token.is_empty());
		Ok(Self(token))
	}
}

/// Rejects requests without a valid token and stores the caller as a
/// [`CurrentUser`](crate::domain::auth::CurrentUser) request extension.
pub async fn require_user<B>(
	State(state): State<AppState>,
	BearerToken(token): BearerToken,
	mut request: Request<B>,
	next: Next<B>,
) -> Result<Response, ServiceError> {
	let token = token.ok_or_else(|| ServiceError::Unauthorized("Not authenticated".into()))?;
	let current_user = state.tokens().validate(&token)?;

	request.extensions_mut().insert(current_user);
	Ok(next.run(request).await)
}
