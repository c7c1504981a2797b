//! Bounded, time-limited cache for post listings.
//!
//! Entries are keyed by the shape of the listing (everything, or one
//! author's posts), never by a connection or a raw token. Any write to the
//! posts table clears the cache and bumps a generation counter; a listing
//! computed under an older generation is discarded instead of stored.

use std::{
	collections::HashMap,
	sync::atomic::{AtomicU64, Ordering},
	time::{Duration, Instant},
};

use tokio::sync::RwLock;

use crate::domain::post::PostListing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKey {
	All,
	Author(i64),
}

#[derive(Debug, Clone)]
struct CacheEntry {
	listing: PostListing,
	created_at: Instant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub entry_count: usize,
}

pub struct PostsCache {
	entries: RwLock<HashMap<ListingKey, CacheEntry>>,
	ttl: Duration,
	capacity: usize,
	generation: AtomicU64,
	hits: AtomicU64,
	misses: AtomicU64,
}

impl PostsCache {
	pub fn new(
		ttl: Duration,
		capacity: usize,
	) -> Self {
		Self {
			entries: Default::default(),
			ttl,
			capacity,
			generation: AtomicU64::new(0),
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
		}
	}

	pub fn disabled() -> Self {
		Self::new(Duration::ZERO, 0)
	}

	pub fn is_enabled(&self) -> bool {
		!self.ttl.is_zero() && self.capacity > 0
	}

	/// Snapshot to pass back into [`PostsCache::insert`] once the listing is computed.
	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	pub async fn get(&self, key: ListingKey) -> Option<PostListing> {
		if !self.is_enabled() {
			return None;
		}
		let found = self
			.entries
			.read()
			.await
			.get(&key)
			.filter(|entry| entry.created_at.elapsed() < self.ttl)
			.map(|entry| entry.listing.clone());

		match found {
			Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
			None => self.misses.fetch_add(1, Ordering::Relaxed),
		};
		found
	}

	pub async fn insert(
		&self,
		key: ListingKey,
		listing: PostListing,
		generation: u64,
	) {
		if !self.is_enabled() {
			return;
		}
		let mut entries = self.entries.write().await;
		// Checked under the lock: `invalidate` bumps the generation while holding it.
		if generation != self.generation() {
			tracing::debug!("Discarding stale listing for {:?}", key);
			return;
		}

		if !entries.contains_key(&key) && entries.len() >= self.capacity {
			entries.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
			if entries.len() >= self.capacity {
				let oldest = entries.iter().min_by_key(|(_, entry)| entry.created_at).map(|(key, _)| *key);
				if let Some(oldest) = oldest {
					entries.remove(&oldest);
				}
			}
		}
		entries.insert(
			key,
			CacheEntry {
				listing,
				created_at: Instant::now(),
			},
		);
	}

	pub async fn invalidate(&self) {
		let mut entries = self.entries.write().await;
		self.generation.fetch_add(1, Ordering::AcqRel);
		entries.clear();
	}

	pub async fn stats(&self) -> CacheStats {
		CacheStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			entry_count: self.entries.read().await.len(),
		}
	}
}
