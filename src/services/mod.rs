pub mod cache;
pub mod handlers;
pub mod response;
