//! Credentials: password hashing and signed access tokens.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{AccessToken, Claims, CurrentUser, TokenKeys, TOKEN_TYPE};
