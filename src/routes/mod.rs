mod health;
mod posts;
mod users;

use axum::{
	middleware,
	routing::{delete, get, post},
	Router,
};

use crate::{common::auth_middleware::require_user, state::AppState};

pub fn create_routes(state: AppState) -> Router {
	let authenticated = Router::new()
		.route("/addPost", post(posts::add_post))
		.route("/deletePost", delete(posts::delete_post))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_user));

	Router::new()
		.route("/health", get(health::health))
		.route("/signup", post(users::signup))
		.route("/login", post(users::login))
		.route("/getPosts", get(posts::get_posts))
		.merge(authenticated)
		.with_state(state)
}
