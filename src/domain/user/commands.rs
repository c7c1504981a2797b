use std::fmt;

use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct Signup {
	pub email: String,
	pub password: String,
}

#[derive(Clone, Deserialize)]
pub struct Login {
	pub email: String,
	pub password: String,
}

impl fmt::Debug for Signup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signup").field("email", &self.email).finish_non_exhaustive()
	}
}

impl fmt::Debug for Login {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Login").field("email", &self.email).finish_non_exhaustive()
	}
}
