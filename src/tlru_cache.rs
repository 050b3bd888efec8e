/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

mod expiry;

use std::{
	mem,
	collections::{BinaryHeap, HashMap},
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
	tlru_cache::expiry::Expiry,
};

/// Computes the absolute expiry time of an entry from its key, its value and
/// the time it is being set.
pub type Ttu<K, V> = Box<dyn Fn(&K, &V, Duration) -> Duration + Send + Sync>;

/// A cache whose entries each expire at a time computed by a time-to-use
/// function when they are set.
///
/// Entries are indexed by expiry in a binary heap. Overwritten and removed
/// entries stay in the heap until they reach the top or the heap is
/// compacted, and are recognised as stale by their sequence number.
pub struct TlruCache<K, V, T = MonotonicTimer, S = FxBuildHasher> {
	store: Store<K, V, S>,

	items: HashMap<K, Item<K>, S>,
	expiries: BinaryHeap<Expiry<K>>,
	recency: VecList<K>,

	ttu: Ttu<K, V>,
	timer: T,

	sequence: u64,
}

struct Item<K> {
	expires: Duration,
	sequence: u64,
	recency: Index<K>,
}

impl<K, V> TlruCache<K, V>
where
	K: Eq + Hash + Clone,
{
	/// Creates an empty cache holding at most `max_size` entries.
	///
	/// # Examples
	///
	/// ```
	/// use std::time::Duration;
	/// use xcache::{CacheMap, TlruCache};
	///
	/// // entries live for as many seconds as their value
	/// let mut cache = TlruCache::new(10, |_, secs: &u64, now: Duration| {
	///     now + Duration::from_secs(*secs)
	/// }).unwrap();
	///
	/// cache.set("short", 1).unwrap();
	/// cache.set("long", 60).unwrap();
	///
	/// assert_eq!(cache.len(), 2);
	/// ```
	pub fn new(
		max_size: CacheSize,
		ttu: impl Fn(&K, &V, Duration) -> Duration + Send + Sync + 'static,
	) -> Result<Self, CacheError> {
		TlruCache::with_timer(max_size, ttu, MonotonicTimer::default())
	}
}

impl<K, V, T> TlruCache<K, V, T>
where
	K: Eq + Hash + Clone,
	T: Timer,
{
	pub fn with_timer(
		max_size: CacheSize,
		ttu: impl Fn(&K, &V, Duration) -> Duration + Send + Sync + 'static,
		timer: T,
	) -> Result<Self, CacheError> {
		let store = Store::new(max_size, None)?;
		Ok(TlruCache::with_store(store, Box::new(ttu), timer))
	}

	pub fn with_sizer(
		max_size: CacheSize,
		ttu: impl Fn(&K, &V, Duration) -> Duration + Send + Sync + 'static,
		timer: T,
		sizer: impl Fn(&V) -> CacheSize + Send + Sync + 'static,
	) -> Result<Self, CacheError> {
		let sizer: Sizer<V> = Box::new(sizer);
		let store = Store::new(max_size, Some(sizer))?;

		Ok(TlruCache::with_store(store, Box::new(ttu), timer))
	}
}

impl<K, V, T, S> TlruCache<K, V, T, S>
where
	K: Eq + Hash + Clone,
	T: Timer,
	S: BuildHasher + Default,
{
	fn with_store(store: Store<K, V, S>, ttu: Ttu<K, V>, timer: T) -> Self {
		TlruCache {
			store,

			items: HashMap::default(),
			expiries: BinaryHeap::new(),
			recency: VecList::new(),

			ttu,
			timer,

			sequence: 0,
		}
	}

	pub fn ttu(&self) -> &Ttu<K, V> {
		&self.ttu
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
		if self.expiries.len() > self.items.len() * 2 {
			let expiries = mem::take(&mut self.expiries)
				.into_vec()
				.into_iter()
				.filter(|expiry| self.is_current(expiry))
				.collect::<Vec<Expiry<K>>>();

			self.expiries = BinaryHeap::from(expiries);
		}

		let mut expired = Vec::new();

		while let Some(expiry) = self.expiries.peek() {
			let is_current = self.is_current(expiry);

			if is_current && now < expiry.expires {
				break;
			}

			let Some(expiry) = self.expiries.pop() else {
				break;
			};

			if !is_current {
				continue;
			}

			self.unlink(&expiry.key);

			if let Some(entry) = self.store.remove_entry(&expiry.key) {
				expired.push(entry);
			}
		}

		if !expired.is_empty() {
			trace!("TlruCache expired {} entries", expired.len());
		}

		expired
	}

	fn get_at(&mut self, key: &K, now: Duration) -> Result<&V, CacheError> {
		self.expire_at(now);

		let Some(item) = self.items.get_mut(key) else {
			return Err(CacheError::KeyNotFound);
		};

		if let Some(key) = self.recency.remove(item.recency) {
			item.recency = self.recency.push_front(key);
		}

		self.store
			.get(key)
			.ok_or(CacheError::KeyNotFound)
	}

	fn set_at(&mut self, key: K, value: V, now: Duration) -> Result<(), CacheError> {
		let expires = (self.ttu)(&key, &value, now);

		// already expired, so never stored
		if now >= expires {
			return Ok(());
		}

		self.expire_at(now);

		let size = self.store.measure(&value)?;

		while self.store.needs_room(&key, size) {
			self.evict_one()?;

			trace!(
				"TlruCache evicted an entry, {} of {} used",
				self.store.used_size(),
				self.store.max_size(),
			);
		}

		self.unlink(&key);
		self.sequence += 1;

		let item = Item {
			expires,
			sequence: self.sequence,
			recency: self.recency.push_front(key.clone()),
		};

		self.items.insert(key.clone(), item);

		self.expiries.push(Expiry {
			key: key.clone(),
			expires,
			sequence: self.sequence,
		});

		self.store.insert(key, value, size);

		Ok(())
	}

	fn is_current(&self, expiry: &Expiry<K>) -> bool {
		self.items
			.get(&expiry.key)
			.is_some_and(|item| item.sequence == expiry.sequence)
	}

	fn is_live(&self, key: &K, now: Duration) -> bool {
		self.items
			.get(key)
			.is_some_and(|item| now < item.expires)
	}

	/// Forgets the key's item. Its heap entry is left behind as stale.
	fn unlink(&mut self, key: &K) {
		if let Some(item) = self.items.remove(key) {
			self.recency.remove(item.recency);
		}
	}

	fn evict_one(&mut self) -> Result<(K, V), CacheError> {
		let key = self.recency
			.back()
			.cloned()
			.ok_or(CacheError::Empty("TlruCache"))?;

		self.unlink(&key);

		self.store
			.remove_entry(&key)
			.ok_or(CacheError::Internal)
	}
}

impl<K, V, T, S> CacheMap for TlruCache<K, V, T, S>
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

		self.items
			.iter()
			.filter(|(_, item)| now < item.expires)
			.filter_map(|(key, _)| self.store.size_of(key))
			.sum()
	}

	fn len(&self) -> usize {
		let now = self.timer.now();

		self.items
			.values()
			.filter(|item| now < item.expires)
			.count()
	}

	fn contains_key(&self, key: &K) -> bool {
		let now = self.timer.now();
		self.is_live(key, now)
	}

	fn get(&mut self, key: &K) -> Result<&V, CacheError> {
		let now = self.timer.now();
		self.get_at(key, now)
	}

	fn peek(&self, key: &K) -> Option<&V> {
		let now = self.timer.now();

		if !self.is_live(key, now) {
			return None;
		}

		self.store.get(key)
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
		self.items.clear();
		self.expiries.clear();
		self.recency.clear();
	}

	fn size_of(&self, key: &K) -> Option<CacheSize> {
		let now = self.timer.now();

		if !self.is_live(key, now) {
			return None;
		}

		self.store.size_of(key)
	}

	fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
		let now = self.timer.now();

		self.store
			.iter()
			.filter(move |(key, _)| self.is_live(key, now))
	}

	fn sizes(&self) -> impl Iterator<Item = (&K, CacheSize)> {
		let now = self.timer.now();

		self.items
			.iter()
			.filter(move |(_, item)| now < item.expires)
			.filter_map(|(key, _)| {
				self.store
					.size_of(key)
					.map(|size| (key, size))
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

		if self.is_live(&key, now) {
			return self.get_at(&key, now).cloned();
		}

		let value = missing(&key);
		self.set_at(key, value.clone(), now)?;

		Ok(value)
	}
}

#[cfg(test)]
mod tests {
	use std::{cell::Cell, time::Duration};

	use crate::{
		CacheError,
		CacheMap,
		ManualTimer,
		TlruCache,
	};

	// each value is the number of seconds its entry lives for
	fn tlru_cache(max_size: u64) -> (TlruCache<&'static str, u64, ManualTimer>, ManualTimer) {
		let timer = ManualTimer::default();

		let cache = TlruCache::with_timer(
			max_size,
			|_, secs: &u64, now: Duration| now + Duration::from_secs(*secs),
			timer.clone(),
		).unwrap();

		(cache, timer)
	}

	#[test]
	fn entries_expire_at_their_own_time() {
		let (mut cache, timer) = tlru_cache(10);

		cache.set("a", 1).unwrap();
		cache.set("b", 3).unwrap();

		timer.set(Duration::from_millis(900));
		assert!(cache.contains_key(&"a"));

		timer.set(Duration::from_secs(2));
		assert!(!cache.contains_key(&"a"));
		assert!(cache.contains_key(&"b"));
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.used_size(), 1);

		assert_eq!(cache.expire(), vec![("a", 1)]);
		assert_eq!(cache.get(&"a"), Err(CacheError::KeyNotFound));
	}

	#[test]
	fn pre_expired_entries_are_skipped() {
		let (mut cache, _) = tlru_cache(10);

		assert_eq!(cache.set("a", 0), Ok(()));
		assert!(!cache.contains_key(&"a"));
		assert!(cache.is_empty());

		cache.set("b", 5).unwrap();
		cache.set("b", 0).unwrap();
		assert_eq!(cache.peek(&"b"), Some(&5));
	}

	#[test]
	fn capacity_eviction_removes_the_least_recently_used() {
		let (mut cache, _) = tlru_cache(2);

		cache.set("a", 10).unwrap();
		cache.set("b", 10).unwrap();
		assert_eq!(cache.get(&"a"), Ok(&10));
		cache.set("c", 10).unwrap();

		assert!(cache.contains_key(&"a"));
		assert!(!cache.contains_key(&"b"));
		assert!(cache.contains_key(&"c"));
	}

	#[test]
	fn stale_heap_entries_are_compacted() {
		let (mut cache, _) = tlru_cache(4);

		for secs in 1..=100 {
			cache.set("a", secs).unwrap();
			assert!(cache.expiries.len() <= cache.items.len() * 2 + 1);
		}

		assert_eq!(cache.peek(&"a"), Some(&100));
	}

	#[test]
	fn overwrites_replace_the_expiry() {
		let (mut cache, timer) = tlru_cache(4);

		cache.set("a", 1).unwrap();
		cache.set("a", 5).unwrap();

		timer.set(Duration::from_secs(2));
		assert_eq!(cache.get(&"a"), Ok(&5));

		cache.set("a", 1).unwrap();
		timer.set(Duration::from_secs(4));
		assert!(!cache.contains_key(&"a"));
		assert!(cache.expire().len() == 1);
	}

	#[test]
	fn removal_and_popping() {
		let (mut cache, timer) = tlru_cache(4);

		cache.set("a", 1).unwrap();
		cache.set("b", 10).unwrap();
		assert_eq!(cache.remove(&"b"), Ok(10));

		timer.set(Duration::from_secs(1));
		assert_eq!(cache.remove(&"a"), Err(CacheError::KeyNotFound));
		assert_eq!(cache.pop_item(), Err(CacheError::Empty("TlruCache")));
	}

	#[test]
	fn one_call_reads_the_timer_once() {
		let ticks = Cell::new(0);

		let timer = move || {
			let now = ticks.get();
			ticks.set(now + 1);

			Duration::from_secs(now)
		};

		let mut cache = TlruCache::with_timer(
			10,
			|_, secs: &u64, now: Duration| now + Duration::from_secs(*secs),
			timer,
		).unwrap();

		cache.set("a", 2).unwrap();
		assert_eq!(cache.set_default("a", 5), Ok(2));
		assert_eq!(cache.set_default("a", 3), Ok(3));
		assert_eq!(cache.sizes().collect::<Vec<_>>(), vec![(&"a", 1)]);
	}

	#[test]
	fn missing_values_which_expire_on_arrival_are_returned_unstored() {
		let (mut cache, _) = tlru_cache(10);

		assert_eq!(cache.get_or_insert_with("a", |_| 0), Ok(0));
		assert!(!cache.contains_key(&"a"));

		assert_eq!(cache.get_or_insert_with("a", |_| 5), Ok(5));
		assert_eq!(cache.get_or_insert_with("a", |_| 9), Ok(5));
	}

	#[test]
	fn expire_at_sweeps_at_the_given_time() {
		let (mut cache, _) = tlru_cache(10);

		cache.set("a", 1).unwrap();
		cache.set("b", 3).unwrap();

		assert_eq!(cache.expire_at(Duration::from_secs(2)), vec![("a", 1)]);
		assert!(!cache.contains_key(&"a"));
		assert!(cache.contains_key(&"b"));
	}

	#[test]
	fn clear_drops_everything() {
		let (mut cache, timer) = tlru_cache(10);

		cache.set("a", 1).unwrap();
		cache.set("b", 3).unwrap();
		cache.clear();

		assert!(cache.is_empty());
		assert_eq!(cache.used_size(), 0);

		timer.set(Duration::from_secs(5));
		assert!(cache.expire().is_empty());

		cache.set("a", 1).unwrap();
		assert_eq!(cache.get(&"a"), Ok(&1));
	}
}
