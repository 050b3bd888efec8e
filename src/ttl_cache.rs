/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	collections::HashMap,
	hash::{Hash, BuildHasher},
	time::Duration,
};

use dlv_list::{VecList, Index};
use log::trace;
use rustc_hash::FxBuildHasher;

use crate::{
	cache::CacheSize,
	cache_map::CacheMap,
	error::CacheError,
	sizer::Sizer,
	store::Store,
	timer::{Timer, MonotonicTimer},
};

/// A cache whose entries expire a fixed `ttl` after they were last set.
///
/// Expired entries are dropped lazily, whenever the cache is next touched.
/// When room is needed for a new entry, expired entries go first and then
/// the least recently used live entry.
pub struct TtlCache<K, V, T = MonotonicTimer, S = FxBuildHasher> {
	store: Store<K, V, S>,

	links: HashMap<K, Link<K>, S>,

	// soonest expiry at the front; a fixed ttl keeps this sorted by insertion
	expiries: VecList<ExpiryNode<K>>,
	recency: VecList<K>,

	ttl: Duration,
	timer: T,
}

struct Link<K> {
	expiry: Index<ExpiryNode<K>>,
	recency: Index<K>,
	expires: Duration,
}

struct ExpiryNode<K> {
	key: K,
	expires: Duration,
}

impl<K, V> TtlCache<K, V>
where
	K: Eq + Hash + Clone,
{
	/// Creates an empty cache holding at most `max_size` entries, each
	/// living for `ttl` on the monotonic clock.
	///
	/// # Examples
	///
	/// ```
	/// use std::time::Duration;
	/// use xcache::{CacheMap, TtlCache};
	///
	/// let mut cache = TtlCache::new(100, Duration::from_secs(60)).unwrap();
	///
	/// cache.set("token", 42).unwrap();
	/// assert!(cache.contains_key(&"token"));
	/// ```
	pub fn new(max_size: CacheSize, ttl: Duration) -> Result<Self, CacheError> {
		TtlCache::with_timer(max_size, ttl, MonotonicTimer::default())
	}
}

impl<K, V, T> TtlCache<K, V, T>
where
	K: Eq + Hash + Clone,
	T: Timer,
{
	pub fn with_timer(max_size: CacheSize, ttl: Duration, timer: T) -> Result<Self, CacheError> {
		Ok(TtlCache::with_store(Store::new(max_size, None)?, ttl, timer))
	}

	pub fn with_sizer(
		max_size: CacheSize,
		ttl: Duration,
		timer: T,
		sizer: impl Fn(&V) -> CacheSize + Send + Sync + 'static,
	) -> Result<Self, CacheError> {
		let sizer: Sizer<V> = Box::new(sizer);
		Ok(TtlCache::with_store(Store::new(max_size, Some(sizer))?, ttl, timer))
	}
}

impl<K, V, T, S> TtlCache<K, V, T, S>
where
	K: Eq + Hash + Clone,
	T: Timer,
	S: BuildHasher + Default,
{
	pub(crate) fn with_store(store: Store<K, V, S>, ttl: Duration, timer: T) -> Self {
		TtlCache {
			store,

			links: HashMap::default(),

			expiries: VecList::new(),
			recency: VecList::new(),

			ttl,
			timer,
		}
	}

	/// Creates a cache with no size limit; entries only leave by expiring or
	/// being removed.
	pub fn unbounded(ttl: Duration, timer: T) -> Self {
		TtlCache::with_store(Store::unbounded(), ttl, timer)
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn timer(&self) -> &T {
		&self.timer
	}

	/// Removes every expired entry and returns them.
	pub fn expire(&mut self) -> Vec<(K, V)> {
		let now = self.timer.now();
		self.expire_at(now)
	}

	/// Removes every entry expired at `now` and returns them.
	pub fn expire_at(&mut self, now: Duration) -> Vec<(K, V)> {
		let mut expired = Vec::new();

		while let Some(node) = self.expiries.front() {
			if now < node.expires {
				break;
			}

			let Some(node) = self.expiries.pop_front() else {
				break;
			};

			if let Some(link) = self.links.remove(&node.key) {
				self.recency.remove(link.recency);
			}

			if let Some(entry) = self.store.remove_entry(&node.key) {
				expired.push(entry);
			}
		}

		if !expired.is_empty() {
			trace!("TtlCache expired {} entries", expired.len());
		}

		expired
	}

	fn get_at(&mut self, key: &K, now: Duration) -> Result<&V, CacheError> {
		self.expire_at(now);

		let Some(link) = self.links.get_mut(key) else {
			return Err(CacheError::KeyNotFound);
		};

		if let Some(key) = self.recency.remove(link.recency) {
			link.recency = self.recency.push_front(key);
		}

		self.store
			.get(key)
			.ok_or(CacheError::KeyNotFound)
	}

	fn set_at(&mut self, key: K, value: V, now: Duration) -> Result<(), CacheError> {
		self.expire_at(now);

		let size = self.store.measure(&value)?;

		while self.store.needs_room(&key, size) {
			self.evict_one()?;

			trace!(
				"TtlCache evicted an entry, {} of {} used",
				self.store.used_size(),
				self.store.max_size(),
			);
		}

		self.unlink(&key);

		let expires = now.saturating_add(self.ttl);

		let link = Link {
			expiry: self.expiries.push_back(ExpiryNode {
				key: key.clone(),
				expires,
			}),

			recency: self.recency.push_front(key.clone()),
			expires,
		};

		self.links.insert(key.clone(), link);
		self.store.insert(key, value, size);

		Ok(())
	}

	/// Iterates over the expired entries which have not been dropped yet.
	fn expired_at(&self, now: Duration) -> impl Iterator<Item = &K> {
		self.expiries
			.iter()
			.take_while(move |node| now >= node.expires)
			.map(|node| &node.key)
	}

	fn live_link(&self, key: &K, now: Duration) -> Option<&Link<K>> {
		self.links
			.get(key)
			.filter(|link| now < link.expires)
	}

	fn unlink(&mut self, key: &K) {
		if let Some(link) = self.links.remove(key) {
			self.expiries.remove(link.expiry);
			self.recency.remove(link.recency);
		}
	}

	fn evict_one(&mut self) -> Result<(K, V), CacheError> {
		let key = self.recency
			.back()
			.cloned()
			.ok_or(CacheError::Empty("TtlCache"))?;

		self.unlink(&key);

		self.store
			.remove_entry(&key)
			.ok_or(CacheError::Internal)
	}
}

impl<K, V, T, S> CacheMap for TtlCache<K, V, T, S>
where
	K: Eq + Hash + Clone,
	T: Timer,
	S: BuildHasher + Default,
{
	type Key = K;
	type Value = V;

	fn max_size(&self) -> CacheSize {
		self.store.max_size()
	}

	fn used_size(&self) -> CacheSize {
		let now = self.timer.now();

		let expired_size = self.expired_at(now)
			.filter_map(|key| self.store.size_of(key))
			.sum::<CacheSize>();

		self.store.used_size() - expired_size
	}

	fn len(&self) -> usize {
		let now = self.timer.now();
		self.store.len() - self.expired_at(now).count()
	}

	fn contains_key(&self, key: &K) -> bool {
		let now = self.timer.now();
		self.live_link(key, now).is_some()
	}

	fn get(&mut self, key: &K) -> Result<&V, CacheError> {
		let now = self.timer.now();
		self.get_at(key, now)
	}

	fn peek(&self, key: &K) -> Option<&V> {
		let now = self.timer.now();

		self.live_link(key, now)
			.and_then(|_| self.store.get(key))
	}

	fn set(&mut self, key: K, value: V) -> Result<(), CacheError> {
		let now = self.timer.now();
		self.set_at(key, value, now)
	}

	fn remove(&mut self, key: &K) -> Result<V, CacheError> {
		let now = self.timer.now();
		self.expire_at(now);

		let value = self.store
			.remove(key)
			.ok_or(CacheError::KeyNotFound)?;

		self.unlink(key);

		Ok(value)
	}

	fn pop_item(&mut self) -> Result<(K, V), CacheError> {
		let now = self.timer.now();
		self.expire_at(now);

		self.evict_one()
	}

	fn clear(&mut self) {
		self.store.clear();
		self.links.clear();
		self.expiries.clear();
		self.recency.clear();
	}

	fn size_of(&self, key: &K) -> Option<CacheSize> {
		let now = self.timer.now();

		self.live_link(key, now)
			.and_then(|_| self.store.size_of(key))
	}

	fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
		let now = self.timer.now();

		self.expiries
			.iter()
			.filter(move |node| now < node.expires)
			.filter_map(|node| {
				self.store
					.get(&node.key)
					.map(|value| (&node.key, value))
			})
	}

	fn sizes(&self) -> impl Iterator<Item = (&K, CacheSize)> {
		let now = self.timer.now();

		self.expiries
			.iter()
			.filter(move |node| now < node.expires)
			.filter_map(|node| {
				self.store
					.size_of(&node.key)
					.map(|size| (&node.key, size))
			})
	}

	fn get_or_insert_with(
		&mut self,
		key: K,
		missing: impl FnOnce(&K) -> V,
	) -> Result<V, CacheError>
	where
		V: Clone,
	{
		let now = self.timer.now();

		if self.live_link(&key, now).is_some() {
			return self.get_at(&key, now).cloned();
		}

		let value = missing(&key);
		self.set_at(key, value.clone(), now)?;

		Ok(value)
	}
}
