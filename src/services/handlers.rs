use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
	adapters::repositories::{Repository, TRepository},
	database::DatabaseExecutor,
	domain::{
		auth::{hash_password, verify_password, AccessToken, CurrentUser},
		post::{
			commands::{CreatePost, DeletePost, GetPosts},
			entity::Post,
			to_listing, PostListing,
		},
		user::{
			commands::{Login, Signup},
			entity::User,
		},
	},
	state::AppState,
};

use super::{
	cache::ListingKey,
	response::{MessageResponse, ServiceError},
};

/// Opens the request's database session. It is released when the last
/// handle drops, rolling back anything not committed.
async fn open_session(state: &AppState) -> Result<Arc<Mutex<DatabaseExecutor>>, ServiceError> {
	let mut executor = DatabaseExecutor::new(state.pool().clone());
	executor.begin().await?;
	Ok(executor.into())
}

/// Like [`open_session`], holding the write lock from the start.
async fn open_write_session(state: &AppState) -> Result<Arc<Mutex<DatabaseExecutor>>, ServiceError> {
	let mut executor = DatabaseExecutor::new(state.pool().clone());
	executor.begin_immediate().await?;
	Ok(executor.into())
}

/// Resolves the caller of a validated token to a stored user.
async fn authenticated_user(
	users: &Repository<User>,
	current_user: &CurrentUser,
) -> Result<User, ServiceError> {
	users.get(current_user.id).await?.ok_or_else(|| {
		tracing::warn!("Token refers to unknown user {}", current_user.id);
		ServiceError::invalid_token()
	})
}

pub struct UserHandler;
impl UserHandler {
	pub async fn signup(
		cmd: Signup,
		state: &AppState,
	) -> Result<AccessToken, ServiceError> {
		let password_hash = hash_password(cmd.password).await?;

		let executor = open_write_session(state).await?;
		let mut users = Repository::<User>::new(executor.clone());
		if users.get_by_email(&cmd.email).await?.is_some() {
			tracing::debug!("Signup rejected for taken email");
			return Err(ServiceError::Conflict("Email already registered".into()));
		}
		let user = users.add(&cmd.email, &password_hash).await?;
		executor.lock().await.commit().await?;

		tracing::info!("Registered user {}", user.id);
		state.tokens().issue(&user)
	}

	pub async fn login(
		cmd: Login,
		state: &AppState,
	) -> Result<AccessToken, ServiceError> {
		let user = {
			let executor = open_session(state).await?;
			Repository::<User>::new(executor).get_by_email(&cmd.email).await?
		};

		// Unknown email and wrong password are indistinguishable to the caller.
		let Some(user) = user else {
			tracing::warn!("Login attempt for unregistered email");
			return Err(ServiceError::invalid_credentials());
		};
		if !verify_password(user.password.clone(), cmd.password).await? {
			tracing::warn!("Login attempt with wrong password for user {}", user.id);
			return Err(ServiceError::invalid_credentials());
		}

		state.tokens().issue(&user)
	}
}

pub struct PostHandler;
impl PostHandler {
	/// Stores a post for the caller and returns its id as a string.
	pub async fn add_post(
		cmd: CreatePost,
		current_user: &CurrentUser,
		state: &AppState,
	) -> Result<String, ServiceError> {
		let executor = open_write_session(state).await?;
		let author = authenticated_user(&Repository::<User>::new(executor.clone()), current_user).await?;

		let post = Repository::<Post>::new(executor.clone()).add(&cmd.text, author.id).await?;
		executor.lock().await.commit().await?;
		state.posts_cache().invalidate().await;

		tracing::debug!("User {} added post {}", author.id, post.id);
		Ok(post.id.to_string())
	}

	/// Lists every post, or only the token owner's posts when a token is given.
	pub async fn get_posts(
		cmd: GetPosts,
		state: &AppState,
	) -> Result<PostListing, ServiceError> {
		let token = cmd.token.filter(|token| !token.is_empty());
		let owner = match token {
			Some(token) => Some(state.tokens().validate(&token)?),
			None => None,
		};

		let executor = open_session(state).await?;
		let key = match &owner {
			Some(current_user) => {
				let author = authenticated_user(&Repository::<User>::new(executor.clone()), current_user).await?;
				ListingKey::Author(author.id)
			}
			None => ListingKey::All,
		};

		let cache = state.posts_cache();
		let generation = cache.generation();
		if let Some(listing) = cache.get(key).await {
			return Ok(listing);
		}

		let posts = Repository::<Post>::new(executor);
		let listing = to_listing(match key {
			ListingKey::All => posts.list().await?,
			ListingKey::Author(author_id) => posts.list_by_author(author_id).await?,
		});
		drop(posts);

		cache.insert(key, listing.clone(), generation).await;
		Ok(listing)
	}

	/// Deletes one of the caller's posts. Missing and foreign posts both read as not found.
	pub async fn delete_post(
		cmd: DeletePost,
		current_user: &CurrentUser,
		state: &AppState,
	) -> Result<MessageResponse, ServiceError> {
		let executor = open_write_session(state).await?;
		let author = authenticated_user(&Repository::<User>::new(executor.clone()), current_user).await?;

		if !Repository::<Post>::new(executor.clone()).delete_owned(cmd.post_id, author.id).await? {
			return Err(ServiceError::post_not_found());
		}
		executor.lock().await.commit().await?;
		state.posts_cache().invalidate().await;

		tracing::debug!("User {} deleted post {}", author.id, cmd.post_id);
		Ok("Post deleted successfully".into())
	}
}

#[cfg(test)]
pub(crate) mod test {
	use std::time::Duration;

	use super::{PostHandler, UserHandler};
	use crate::{
		adapters::repositories::test_support,
		bootstrap::Bootstrap,
		config::Config,
		domain::{
			auth::{CurrentUser, TokenKeys, TOKEN_TYPE},
			post::commands::{CreatePost, DeletePost, GetPosts},
			user::commands::{Login, Signup},
		},
		services::{cache::PostsCache, response::ServiceError},
		state::AppState,
	};

	pub(crate) async fn state_with_cache(cache: PostsCache) -> AppState {
		AppState::new(test_support::pool().await, TokenKeys::new(b"test-secret", 3600), cache)
	}

	fn signup(email: &str) -> Signup {
		Signup {
			email: email.to_string(),
			password: "pw".to_string(),
		}
	}

	async fn registered(
		email: &str,
		state: &AppState,
	) -> (String, CurrentUser) {
		let token = UserHandler::signup(signup(email), state).await.unwrap().access_token;
		let current_user = state.tokens().validate(&token).unwrap();
		(token, current_user)
	}

	fn create(text: &str) -> CreatePost {
		CreatePost { text: text.to_string() }
	}

	#[tokio::test]
	async fn test_signup_twice_is_conflict() {
		let state = state_with_cache(PostsCache::disabled()).await;

		let token = UserHandler::signup(signup("ann@example.com"), &state).await.unwrap();
		assert_eq!(token.token_type, TOKEN_TYPE);

		let err = UserHandler::signup(signup("ann@example.com"), &state).await.unwrap_err();
		assert!(matches!(err, ServiceError::Conflict(_)));

		// Original password still works.
		let login = Login {
			email: "ann@example.com".to_string(),
			password: "pw".to_string(),
		};
		assert!(UserHandler::login(login, &state).await.is_ok());
	}

	#[tokio::test]
	async fn test_login_checks_password_and_existence() {
		let state = state_with_cache(PostsCache::disabled()).await;
		let (_, ann) = registered("ann@example.com", &state).await;

		let token = UserHandler::login(
			Login {
				email: "ann@example.com".to_string(),
				password: "pw".to_string(),
			},
			&state,
		)
		.await
		.unwrap();
		assert_eq!(state.tokens().validate(&token.access_token).unwrap(), ann);

		let wrong_password = UserHandler::login(
			Login {
				email: "ann@example.com".to_string(),
				password: "nope".to_string(),
			},
			&state,
		)
		.await;
		assert!(matches!(wrong_password, Err(ServiceError::Unauthorized(_))));

		let unknown = UserHandler::login(
			Login {
				email: "ghost@example.com".to_string(),
				password: "pw".to_string(),
			},
			&state,
		)
		.await;
		assert!(matches!(unknown, Err(ServiceError::Unauthorized(_))));
	}

	#[tokio::test]
	async fn test_posts_are_listed_globally_and_per_author() {
		let state = state_with_cache(PostsCache::disabled()).await;
		let (ann_token, ann) = registered("ann@example.com", &state).await;
		let (_, bob) = registered("bob@example.com", &state).await;

		let ann_post = PostHandler::add_post(create("from ann"), &ann, &state).await.unwrap();
		let bob_post = PostHandler::add_post(create("from bob"), &bob, &state).await.unwrap();

		let all = PostHandler::get_posts(GetPosts::default(), &state).await.unwrap();
		assert_eq!(all.len(), 2);
		assert_eq!(all[&ann_post], "from ann");
		assert_eq!(all[&bob_post], "from bob");

		let mine = PostHandler::get_posts(GetPosts { token: Some(ann_token) }, &state).await.unwrap();
		assert_eq!(mine.keys().collect::<Vec<_>>(), vec![&ann_post]);

		let empty_token = PostHandler::get_posts(GetPosts { token: Some(String::new()) }, &state).await.unwrap();
		assert_eq!(empty_token, all);

		let bad = PostHandler::get_posts(GetPosts { token: Some("ann@example.com".into()) }, &state).await;
		assert!(matches!(bad, Err(ServiceError::Unauthorized(_))));
	}

	#[tokio::test]
	async fn test_delete_requires_ownership() {
		let state = state_with_cache(PostsCache::disabled()).await;
		let (_, ann) = registered("ann@example.com", &state).await;
		let (_, bob) = registered("bob@example.com", &state).await;

		let post_id: i64 = PostHandler::add_post(create("mine"), &ann, &state).await.unwrap().parse().unwrap();

		let foreign = PostHandler::delete_post(DeletePost { post_id }, &bob, &state).await;
		assert!(matches!(foreign, Err(ServiceError::NotFound(_))));

		let deleted = PostHandler::delete_post(DeletePost { post_id }, &ann, &state).await.unwrap();
		assert_eq!(deleted.message, "Post deleted successfully");

		let again = PostHandler::delete_post(DeletePost { post_id }, &ann, &state).await;
		assert!(matches!(again, Err(ServiceError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_token_for_unknown_user_is_rejected() {
		let state = state_with_cache(PostsCache::disabled()).await;
		let ghost = CurrentUser {
			id: 999,
			email: "ghost@example.com".to_string(),
		};

		let err = PostHandler::add_post(create("boo"), &ghost, &state).await.unwrap_err();
		assert!(matches!(err, ServiceError::Unauthorized(_)));
	}

	#[tokio::test]
	async fn test_cached_listing_sees_writes() {
		let state = state_with_cache(PostsCache::new(Duration::from_secs(60), 8)).await;
		let (_, ann) = registered("ann@example.com", &state).await;

		assert!(PostHandler::get_posts(GetPosts::default(), &state).await.unwrap().is_empty());
		let post_id = PostHandler::add_post(create("fresh"), &ann, &state).await.unwrap();

		let listing = PostHandler::get_posts(GetPosts::default(), &state).await.unwrap();
		assert_eq!(listing.get(&post_id).map(String::as_str), Some("fresh"));

		// Served from cache the second time round.
		PostHandler::get_posts(GetPosts::default(), &state).await.unwrap();
		assert!(state.posts_cache().stats().await.hits >= 1);

		PostHandler::delete_post(DeletePost { post_id: post_id.parse().unwrap() }, &ann, &state)
			.await
			.unwrap();
		assert!(PostHandler::get_posts(GetPosts::default(), &state).await.unwrap().is_empty());
	}

	/// State over a real database file, pooled the way the server pools it.
	async fn file_backed_state(dir: &tempfile::TempDir) -> AppState {
		let database_url = format!("sqlite://{}", dir.path().join("blog.db").display());
		let config = Config::from_lookup(move |name: &str| match name {
			"JWT_SECRET" => Some("concurrency-secret".to_string()),
			"DATABASE_URL" => Some(database_url.clone()),
			"DATABASE_MAX_CONNECTIONS" => Some("8".to_string()),
			"DATABASE_BUSY_TIMEOUT_MS" => Some("10000".to_string()),
			_ => None,
		})
		.unwrap();
		Bootstrap::app_state(&config).await.unwrap()
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_writes_on_file_database() {
		let dir = tempfile::tempdir().unwrap();
		let state = file_backed_state(&dir).await;

		let mut authors = Vec::new();
		for n in 0..4 {
			authors.push(registered(&format!("writer{n}@example.com"), &state).await.1);
		}

		let mut writes = Vec::new();
		for n in 0..100 {
			let (state, author) = (state.clone(), authors[n % authors.len()].clone());
			writes.push(tokio::spawn(async move {
				PostHandler::add_post(create(&format!("post {n}")), &author, &state).await
			}));
		}
		let mut reads = Vec::new();
		for _ in 0..20 {
			let state = state.clone();
			reads.push(tokio::spawn(async move { PostHandler::get_posts(GetPosts::default(), &state).await }));
		}

		let mut post_ids = Vec::new();
		for write in writes {
			post_ids.push(write.await.unwrap().unwrap());
		}
		for read in reads {
			read.await.unwrap().unwrap();
		}
		let listing = PostHandler::get_posts(GetPosts::default(), &state).await.unwrap();
		assert_eq!(listing.len(), 100);

		// Racing signups for one email: a single winner, everyone else told it is taken.
		let mut signups = Vec::new();
		for _ in 0..8 {
			let state = state.clone();
			signups.push(tokio::spawn(async move { UserHandler::signup(signup("race@example.com"), &state).await }));
		}
		let mut registered_count = 0;
		for attempt in signups {
			match attempt.await.unwrap() {
				Ok(_) => registered_count += 1,
				Err(ServiceError::Conflict(_)) => {}
				Err(err) => panic!("unexpected signup failure: {err}"),
			}
		}
		assert_eq!(registered_count, 1);

		let mut deletes = Vec::new();
		for (n, post_id) in post_ids.into_iter().enumerate() {
			let (state, author) = (state.clone(), authors[n % authors.len()].clone());
			let post_id = post_id.parse().unwrap();
			deletes.push(tokio::spawn(async move {
				PostHandler::delete_post(DeletePost { post_id }, &author, &state).await
			}));
		}
		for delete in deletes {
			delete.await.unwrap().unwrap();
		}
		assert!(PostHandler::get_posts(GetPosts::default(), &state).await.unwrap().is_empty());

		state.pool().close().await;
	}
}
