//! Small concurrent time-to-live cache shared by the price, risk and quote stores

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry<V> {
	value: V,
	inserted_at: Instant,
	ttl: Duration,
}

impl<V> Entry<V> {
	fn is_expired(&self, now: Instant) -> bool {
		now.duration_since(self.inserted_at) >= self.ttl
	}
}

/// Read-mostly map whose entries vanish after their TTL
///
/// Inserts overwrite, so concurrent refreshes of the same key are idempotent:
/// the last writer wins and readers never see a torn value.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V>
where
	K: Eq + Hash,
{
	entries: Arc<DashMap<K, Entry<V>>>,
	default_ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	pub fn new(default_ttl: Duration) -> Self {
		Self {
			entries: Arc::new(DashMap::new()),
			default_ttl,
		}
	}

	/// Fresh value for `key`; expired entries are evicted on read
	pub fn get(&self, key: &K) -> Option<V> {
		self.get_with_age(key).map(|(value, _)| value)
	}

	/// Fresh value together with how long ago it was stored
	pub fn get_with_age(&self, key: &K) -> Option<(V, Duration)> {
		let now = Instant::now();
		if let Some(entry) = self.entries.get(key) {
			if !entry.is_expired(now) {
				return Some((entry.value.clone(), now.duration_since(entry.inserted_at)));
			}
		}
		self.entries.remove_if(key, |_, entry| entry.is_expired(now));
		None
	}

	pub fn insert(&self, key: K, value: V) {
		self.insert_with_ttl(key, value, self.default_ttl);
	}

	pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
		self.entries.insert(
			key,
			Entry {
				value,
				inserted_at: Instant::now(),
				ttl,
			},
		);
	}

	pub fn remove(&self, key: &K) -> Option<V> {
		self.entries.remove(key).map(|(_, entry)| entry.value)
	}

	/// Drop every expired entry, returning how many were removed
	pub fn purge_expired(&self) -> usize {
		let now = Instant::now();
		let before = self.entries.len();
		self.entries.retain(|_, entry| !entry.is_expired(now));
		before.saturating_sub(self.entries.len())
	}

	/// Snapshot of all fresh values
	pub fn values(&self) -> Vec<V> {
		let now = Instant::now();
		self.entries
			.iter()
			.filter(|entry| !entry.is_expired(now))
			.map(|entry| entry.value.clone())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn default_ttl(&self) -> Duration {
		self.default_ttl
	}
}

impl<K, V> TtlCache<K, V>
where
	K: Eq + Hash + Clone + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	/// Purge expired entries every `period` until the handle is aborted
	pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
		let cache = self.clone();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				let removed = cache.purge_expired();
				if removed > 0 {
					debug!("Purged {} expired cache entries", removed);
				}
			}
		})
	}
}
