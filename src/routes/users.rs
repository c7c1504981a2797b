use axum::{extract::State, Json};

use crate::{
	domain::{
		auth::AccessToken,
		user::commands::{Login, Signup},
	},
	services::{handlers::UserHandler, response::ServiceError},
	state::AppState,
};

pub async fn signup(
	State(state): State<AppState>,
	Json(cmd): Json<Signup>,
) -> Result<Json<AccessToken>, ServiceError> {
	Ok(Json(UserHandler::signup(cmd, &state).await?))
}

pub async fn login(
	State(state): State<AppState>,
	Json(cmd): Json<Login>,
) -> Result<Json<AccessToken>, ServiceError> {
	Ok(Json(UserHandler::login(cmd, &state).await?))
}
