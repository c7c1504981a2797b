use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{domain::user::entity::User, services::response::ServiceError};

pub const TOKEN_TYPE: &str = "bearer";

/// JWT payload. `sub` carries the user id, decoupled from the email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
	pub sub: String,
	pub email: String,
	pub iat: i64,
	pub exp: i64,
	pub jti: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
	pub access_token: String,
	pub token_type: String,
}

/// The authenticated caller, as established from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
	pub id: i64,
	pub email: String,
}

impl TryFrom<Claims> for CurrentUser {
	type Error = ServiceError;
	fn try_from(value: Claims) -> Result<Self, Self::Error> {
		let id = value.sub.parse().map_err(|_| ServiceError::invalid_token())?;
		Ok(Self { id, email: value.email })
	}
}

#[derive(Clone)]
pub struct TokenKeys(Arc<TokenKeysInner>);

struct TokenKeysInner {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	/// `None` when the configured lifetime is not representable.
	ttl: Option<Duration>,
}

impl TokenKeys {
	pub fn new(
		secret: &[u8],
		ttl_secs: i64,
	) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.leeway = 0;
		validation.set_required_spec_claims(&["exp", "sub"]);

		Self(Arc::new(TokenKeysInner {
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
			validation,
			ttl: Duration::try_seconds(ttl_secs),
		}))
	}

	pub fn issue(&self, user: &User) -> Result<AccessToken, ServiceError> {
		let now = Utc::now();
		let exp = self
			.0
			.ttl
			.and_then(|ttl| now.checked_add_signed(ttl))
			.ok_or(ServiceError::TokenLifetimeOutOfRange)?;
		let claims = Claims {
			sub: user.id.to_string(),
			email: user.email.clone(),
			iat: now.timestamp(),
			exp: exp.timestamp(),
			jti: Uuid::new_v4(),
		};
		let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.0.encoding)?;

		Ok(AccessToken {
			access_token,
			token_type: TOKEN_TYPE.to_string(),
		})
	}

	/// Verifies signature and expiry. Any failure is reported as an invalid token.
	pub fn validate(&self, token: &str) -> Result<CurrentUser, ServiceError> {
		let data = decode::<Claims>(token, &self.0.decoding, &self.0.validation).map_err(|err| {
			tracing::debug!("Rejected access token: {}", err);
			ServiceError::invalid_token()
		})?;
		data.claims.try_into()
	}
}
