use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
	pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletePost {
	pub post_id: i64,
}

/// Listing request; the token narrows the listing to its owner's posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetPosts {
	pub token: Option<String>,
}
