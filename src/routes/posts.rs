use axum::{
	extract::{Query, State},
	Extension, Json,
};

use crate::{
	common::auth_middleware::BearerToken,
	domain::{
		auth::CurrentUser,
		post::{
			commands::{CreatePost, DeletePost, GetPosts},
			PostListing,
		},
	},
	services::{
		handlers::PostHandler,
		response::{MessageResponse, ServiceError},
	},
	state::AppState,
};

pub async fn add_post(
	State(state): State<AppState>,
	Extension(current_user): Extension<CurrentUser>,
	Json(cmd): Json<CreatePost>,
) -> Result<Json<String>, ServiceError> {
	Ok(Json(PostHandler::add_post(cmd, &current_user, &state).await?))
}

pub async fn get_posts(
	State(state): State<AppState>,
	BearerToken(token): BearerToken,
) -> Result<Json<PostListing>, ServiceError> {
	Ok(Json(PostHandler::get_posts(GetPosts { token }, &state).await?))
}

pub async fn delete_post(
	State(state): State<AppState>,
	Extension(current_user): Extension<CurrentUser>,
	Query(cmd): Query<DeletePost>,
) -> Result<Json<MessageResponse>, ServiceError> {
	Ok(Json(PostHandler::delete_post(cmd, &current_user, &state).await?))
}
