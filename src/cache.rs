/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::hash::{Hash, BuildHasher};
use log::trace;
use rustc_hash::FxBuildHasher;

use crate::{
	cache_map::CacheMap,
	error::CacheError,
	policy::Policy,
	sizer::Sizer,
	store::Store,
	policy_stack::{
		PolicyStack,
		PolicyStackType,
		FifoStack,
		LfuStack,
		LruStack,
		MruStack,
		RrStack,
	},
};

pub type CacheSize = u64;

/// A size-bounded cache which evicts entries in the order chosen by its
/// policy stack `P`.
pub struct Cache<K, V, P, S = FxBuildHasher> {
	store: Store<K, V, S>,
	policy_stack: P,
}

pub type FifoCache<K, V, S = FxBuildHasher> = Cache<K, V, FifoStack<K, S>, S>;
pub type LfuCache<K, V, S = FxBuildHasher> = Cache<K, V, LfuStack<K, S>, S>;
pub type LruCache<K, V, S = FxBuildHasher> = Cache<K, V, LruStack<K, S>, S>;
pub type MruCache<K, V, S = FxBuildHasher> = Cache<K, V, MruStack<K, S>, S>;
pub type RrCache<K, V, S = FxBuildHasher> = Cache<K, V, RrStack<K, S>, S>;

/// A cache whose eviction policy is selected at runtime.
pub type PolicyCache<K, V, S = FxBuildHasher> = Cache<K, V, PolicyStackType<K, S>, S>;

impl<K, V, P> Cache<K, V, P>
where
	K: Eq + Hash + Clone,
	P: PolicyStack<K> + Default,
{
	/// Creates an empty cache holding at most `max_size` entries.
	/// If the maximum size is zero, a [`CacheError`] will be returned.
	///
	/// # Examples
	///
	/// ```
	/// use xcache::{CacheMap, LruCache};
	///
	/// let mut cache = LruCache::new(2).unwrap();
	///
	/// cache.set("a", 1).unwrap();
	/// assert_eq!(cache.get(&"a"), Ok(&1));
	///
	/// // Supplying a maximum size of zero will return a CacheError.
	/// assert!(LruCache::<u32, u32>::new(0).is_err());
	/// ```
	pub fn new(max_size: CacheSize) -> Result<Self, CacheError> {
		Cache::with_stack(max_size, P::default(), None)
	}

	/// Creates an empty cache whose entries are charged the size returned by
	/// `sizer` rather than one unit each.
	pub fn with_sizer(
		max_size: CacheSize,
		sizer: impl Fn(&V) -> CacheSize + Send + Sync + 'static,
	) -> Result<Self, CacheError> {
		Cache::with_stack(max_size, P::default(), Some(Box::new(sizer)))
	}
}

impl<K, V> PolicyCache<K, V>
where
	K: Eq + Hash + Clone,
{
	pub fn with_policy(max_size: CacheSize, policy: Policy) -> Result<Self, CacheError> {
		Cache::with_stack(max_size, policy.into(), None)
	}
}

impl<K, V, S> PolicyCache<K, V, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Default,
{
	/// Creates a cache with no size limit which never evicts.
	pub fn unbounded() -> Self {
		Cache {
			store: Store::unbounded(),
			policy_stack: PolicyStackType::unbounded(),
		}
	}
}

impl<K, V> RrCache<K, V>
where
	K: Eq + Hash + Clone,
{
	/// Creates a random replacement cache which evicts the key at the index
	/// returned by `choice` instead of a uniformly random one.
	pub fn with_choice(
		max_size: CacheSize,
		choice: impl FnMut(usize) -> usize + Send + 'static,
	) -> Result<Self, CacheError> {
		Cache::with_stack(max_size, RrStack::with_choice(choice), None)
	}
}

impl<K, V, P, S> Cache<K, V, P, S>
where
	K: Eq + Hash + Clone,
	P: PolicyStack<K>,
	S: BuildHasher + Default,
{
	pub fn with_stack(
		max_size: CacheSize,
		policy_stack: P,
		sizer: Option<Sizer<V>>,
	) -> Result<Self, CacheError> {
		let cache = Cache {
			store: Store::new(max_size, sizer)?,
			policy_stack,
		};

		Ok(cache)
	}

	fn evict_one(&mut self) -> Result<(K, V), CacheError> {
		let key = self.policy_stack
			.pop()
			.ok_or(CacheError::Empty(self.policy_stack.name()))?;

		self.store
			.remove_entry(&key)
			.ok_or(CacheError::Internal)
	}
}

impl<K, V, P, S> CacheMap for Cache<K, V, P, S>
where
	K: Eq + Hash + Clone,
	P: PolicyStack<K>,
	S: BuildHasher + Default,
{
	type Key = K;
	type Value = V;

	fn max_size(&self) -> CacheSize {
		self.store.max_size()
	}

	fn used_size(&self) -> CacheSize {
		self.store.used_size()
	}

	fn len(&self) -> usize {
		self.store.len()
	}

	fn contains_key(&self, key: &K) -> bool {
		self.store.contains_key(key)
	}

	fn get(&mut self, key: &K) -> Result<&V, CacheError> {
		if !self.store.contains_key(key) {
			return Err(CacheError::KeyNotFound);
		}

		self.policy_stack.update(key);

		self.store
			.get(key)
			.ok_or(CacheError::KeyNotFound)
	}

	fn peek(&self, key: &K) -> Option<&V> {
		self.store.get(key)
	}

	fn set(&mut self, key: K, value: V) -> Result<(), CacheError> {
		let size = self.store.measure(&value)?;

		while self.store.needs_room(&key, size) {
			self.evict_one()?;

			trace!(
				"{} evicted an entry, {} of {} used",
				self.policy_stack.name(),
				self.store.used_size(),
				self.store.max_size(),
			);
		}

		self.policy_stack.insert(&key);
		self.store.insert(key, value, size);

		Ok(())
	}

	fn remove(&mut self, key: &K) -> Result<V, CacheError> {
		let value = self.store
			.remove(key)
			.ok_or(CacheError::KeyNotFound)?;

		self.policy_stack.remove(key);

		Ok(value)
	}

	fn pop_item(&mut self) -> Result<(K, V), CacheError> {
		self.evict_one()
	}

	fn clear(&mut self) {
		self.store.clear();
		self.policy_stack.clear();
	}

	fn size_of(&self, key: &K) -> Option<CacheSize> {
		self.store.size_of(key)
	}

	fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
		self.store.iter()
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		CacheError,
		CacheMap,
		Policy,
		FifoCache,
		LfuCache,
		LruCache,
		MruCache,
		RrCache,
		PolicyCache,
	};

	fn assert_size_invariant<C: CacheMap<Key = u32, Value = String>>(cache: &C) {
		let total = cache
			.iter()
			.filter_map(|(key, _)| cache.size_of(key))
			.sum::<u64>();

		assert_eq!(total, cache.used_size());
		assert!(cache.used_size() <= cache.max_size());
	}

	#[test]
	fn capacity_invariant_holds_for_every_policy() {
		for policy in [Policy::Lfu, Policy::Fifo, Policy::Lru, Policy::Mru, Policy::Rr] {
			let mut cache = PolicyCache::<u32, String>::with_policy(5, policy).unwrap();

			for access in 0..50u32 {
				cache.set(access % 7, access.to_string()).unwrap();
				let _ = cache.get(&(access % 3));

				if access % 11 == 0 {
					let _ = cache.remove(&(access % 5));
				}

				assert_size_invariant(&cache);
			}
		}
	}

	#[test]
	fn sized_capacity_invariant_holds() {
		let mut cache = LruCache::<u32, String>::with_sizer(10, |value: &String| value.len() as u64).unwrap();

		for access in 0..40u32 {
			let value = "x".repeat((access % 6) as usize);
			cache.set(access % 9, value).unwrap();

			assert_size_invariant(&cache);
		}
	}

	#[test]
	fn oversized_values_are_rejected() {
		let mut cache = LruCache::<u32, String>::with_sizer(3, |value: &String| value.len() as u64).unwrap();

		assert_eq!(cache.set(0, "abcd".to_owned()), Err(CacheError::ValueTooLarge));
		assert!(cache.is_empty());

		cache.set(1, "abc".to_owned()).unwrap();
		assert_eq!(cache.set(1, "abcd".to_owned()), Err(CacheError::ValueTooLarge));
		assert_eq!(cache.peek(&1).map(String::as_str), Some("abc"));
	}

	#[test]
	fn several_small_entries_are_evicted_for_one_large_entry() {
		let mut cache = FifoCache::<u32, String>::with_sizer(6, |value: &String| value.len() as u64).unwrap();

		cache.set(0, "a".to_owned()).unwrap();
		cache.set(1, "bb".to_owned()).unwrap();
		cache.set(2, "ccc".to_owned()).unwrap();
		cache.set(3, "ddddd".to_owned()).unwrap();

		assert!(!cache.contains_key(&0));
		assert!(!cache.contains_key(&1));
		assert!(!cache.contains_key(&2));
		assert_eq!(cache.used_size(), 5);
	}

	#[test]
	fn overwrites_only_need_room_for_the_difference() {
		let mut cache = LruCache::<u32, String>::with_sizer(6, |value: &String| value.len() as u64).unwrap();

		cache.set(0, "aaa".to_owned()).unwrap();
		cache.set(1, "bb".to_owned()).unwrap();
		cache.set(0, "aaaa".to_owned()).unwrap();

		assert!(cache.contains_key(&1));
		assert_eq!(cache.used_size(), 6);
		assert_eq!(cache.size_of(&0), Some(4));
	}

	#[test]
	fn fifo_ignores_reads_and_overwrites() {
		let mut cache = FifoCache::new(2).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		assert_eq!(cache.get(&"a"), Ok(&1));
		cache.set("a", 3).unwrap();
		cache.set("c", 4).unwrap();

		assert!(!cache.contains_key(&"a"));
		assert!(cache.contains_key(&"b"));
		assert!(cache.contains_key(&"c"));
	}

	#[test]
	fn lru_evicts_the_least_recently_used() {
		let mut cache = LruCache::new(2).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		assert_eq!(cache.get(&"a"), Ok(&1));
		cache.set("c", 3).unwrap();

		assert!(!cache.contains_key(&"b"));
		assert!(cache.contains_key(&"a"));
		assert!(cache.contains_key(&"c"));
	}

	#[test]
	fn peek_does_not_refresh() {
		let mut cache = LruCache::new(2).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		assert_eq!(cache.peek(&"a"), Some(&1));
		cache.set("c", 3).unwrap();

		assert!(!cache.contains_key(&"a"));
	}

	#[test]
	fn mru_evicts_the_most_recently_used() {
		let mut cache = MruCache::new(2).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		assert_eq!(cache.get(&"a"), Ok(&1));
		cache.set("c", 3).unwrap();

		assert!(!cache.contains_key(&"a"));
		assert!(cache.contains_key(&"b"));
		assert!(cache.contains_key(&"c"));
	}

	#[test]
	fn lfu_evicts_the_least_frequently_used() {
		let mut cache = LfuCache::new(2).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		assert_eq!(cache.get(&"a"), Ok(&1));
		assert_eq!(cache.get(&"a"), Ok(&1));
		assert_eq!(cache.get(&"b"), Ok(&2));
		cache.set("c", 3).unwrap();

		assert!(!cache.contains_key(&"b"));
		assert!(cache.contains_key(&"a"));
	}

	#[test]
	fn lfu_counts_an_overwrite_as_a_use() {
		let mut cache = LfuCache::new(2).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		cache.set("a", 3).unwrap();
		cache.set("c", 4).unwrap();

		assert!(!cache.contains_key(&"b"));
		assert_eq!(cache.peek(&"a"), Some(&3));
		assert!(cache.contains_key(&"c"));
	}

	#[test]
	fn rr_evicts_the_chosen_key() {
		let mut cache = RrCache::with_choice(2, |_| 0).unwrap();

		cache.set("a", 1).unwrap();
		cache.set("b", 2).unwrap();
		cache.set("c", 3).unwrap();

		assert!(!cache.contains_key(&"a"));
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn pop_item_on_empty_names_the_cache() {
		let mut fifo = FifoCache::<u32, u32>::new(1).unwrap();
		let mut lfu = LfuCache::<u32, u32>::new(1).unwrap();
		let mut lru = LruCache::<u32, u32>::new(1).unwrap();
		let mut mru = MruCache::<u32, u32>::new(1).unwrap();
		let mut rr = RrCache::<u32, u32>::new(1).unwrap();

		assert_eq!(fifo.pop_item(), Err(CacheError::Empty("FifoCache")));
		assert_eq!(lfu.pop_item(), Err(CacheError::Empty("LfuCache")));
		assert_eq!(lru.pop_item(), Err(CacheError::Empty("LruCache")));
		assert_eq!(mru.pop_item(), Err(CacheError::Empty("MruCache")));
		assert_eq!(rr.pop_item().unwrap_err().to_string(), "RrCache is empty");
	}

	#[test]
	fn pop_item_follows_the_policy() {
		let mut cache = FifoCache::new(3).unwrap();

		cache.set(0, "a").unwrap();
		cache.set(1, "b").unwrap();

		assert_eq!(cache.pop_item(), Ok((0, "a")));
		assert_eq!(cache.used_size(), 1);
	}

	#[test]
	fn mapping_helpers_behave_like_a_map() {
		let mut cache = LruCache::new(4).unwrap();

		assert_eq!(cache.get(&"a"), Err(CacheError::KeyNotFound));
		assert_eq!(cache.get_or(&"a", 0), 0);

		assert_eq!(cache.set_default("a", 1), Ok(1));
		assert_eq!(cache.set_default("a", 2), Ok(1));

		assert_eq!(cache.pop_or(&"b", 7), 7);
		assert_eq!(cache.remove(&"b"), Err(CacheError::KeyNotFound));
		assert_eq!(cache.remove(&"a"), Ok(1));

		cache.set("c", 3).unwrap();
		cache.clear();

		assert!(cache.is_empty());
		assert_eq!(cache.used_size(), 0);
		assert_eq!(cache.pop_item(), Err(CacheError::Empty("LruCache")));
	}

	#[test]
	fn missing_values_are_computed_and_stored() {
		let mut cache = LruCache::<usize, String>::with_sizer(4, |value: &String| value.len() as u64).unwrap();

		assert_eq!(cache.get_or_insert_with(3, |key| "x".repeat(*key)), Ok("xxx".to_owned()));
		assert_eq!(cache.peek(&3).map(String::as_str), Some("xxx"));

		assert_eq!(cache.get_or_insert_with(3, |_| String::new()), Ok("xxx".to_owned()));

		assert_eq!(cache.get_or_insert_with(5, |key| "x".repeat(*key)), Err(CacheError::ValueTooLarge));
		assert!(!cache.contains_key(&5));
		assert_eq!(cache.used_size(), 3);
	}

	#[test]
	fn unbounded_cache_never_evicts() {
		let mut cache = PolicyCache::<u32, u32>::unbounded();

		for access in 0..1000 {
			cache.set(access, access).unwrap();
		}

		assert_eq!(cache.len(), 1000);
		assert!(cache.pop_item().is_err());
	}
}
