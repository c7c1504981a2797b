use std::collections::BTreeMap;

use self::entity::Post;

pub mod commands;
pub mod entity;

/// Listing shape returned by `/getPosts`: post id (as a string) to post text.
pub type PostListing = BTreeMap<String, String>;

pub fn to_listing(posts: impl IntoIterator<Item = Post>) -> PostListing {
	posts.into_iter().map(|post| (post.id.to_string(), post.text)).collect()
}
