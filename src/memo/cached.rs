/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use log::{debug, warn};

use crate::{
	cache::CacheSize,
	cache_map::CacheMap,
	error::CacheError,
	memo::CacheLock,
	stats::{MemoStats, CacheInfo},
};

/// A function whose results are remembered in a cache.
///
/// Every call computes a key from its arguments with `key`. On a hit the
/// stored result is returned; on a miss `func` runs and its result is
/// stored unless the cache already gained a value for the key in the
/// meantime, in which case that value wins. A result too large for the
/// cache is returned without being stored.
///
/// Without a cache every call runs `func`.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use xcache::{CacheKey, Cached, LruCache, hash_key};
///
/// let square = Cached::new(
/// 	Some(RefCell::new(LruCache::<CacheKey, u64>::new(16).unwrap())),
/// 	hash_key::<(u64,)>,
/// 	|(n,): (u64,)| n * n,
/// );
///
/// assert_eq!(square.call((4,)), 16);
/// assert_eq!(square.call((4,)), 16);
/// assert_eq!(square.cache_info().get_hits(), 1);
/// ```
pub struct Cached<L, KF, F> {
	cache: Option<L>,
	key: KF,
	func: F,

	stats: MemoStats,
}

impl<L, KF, F> Cached<L, KF, F> {
	pub fn new(cache: Option<L>, key: KF, func: F) -> Self {
		Cached {
			cache,
			key,
			func,

			stats: MemoStats::default(),
		}
	}

	pub fn cache(&self) -> Option<&L> {
		self.cache.as_ref()
	}

	pub fn cache_key(&self) -> &KF {
		&self.key
	}
}

impl<L, KF, F> Cached<L, KF, F>
where
	L: CacheLock,
	L::Cache: CacheMap,
{
	pub fn call<A>(&self, args: A) -> <L::Cache as CacheMap>::Value
	where
		KF: Fn(&A) -> <L::Cache as CacheMap>::Key,
		F: Fn(A) -> <L::Cache as CacheMap>::Value,
		<L::Cache as CacheMap>::Value: Clone,
	{
		let Some(cache) = &self.cache else {
			self.stats.miss();
			return (self.func)(args);
		};

		let key = (self.key)(&args);

		if let Some(value) = lookup(cache, &key) {
			self.stats.hit();
			return value;
		}

		self.stats.miss();

		let value = (self.func)(args);
		store(cache, key, value)
	}

	/// Empties the cache and resets the hit and miss counters.
	pub fn cache_clear(&self) {
		if let Some(cache) = &self.cache {
			cache.with_cache(|cache| cache.clear());
		}

		self.stats.reset();
	}

	pub fn cache_info(&self) -> CacheInfo {
		let (max_size, used_size) = match &self.cache {
			Some(cache) => cache.with_cache(|cache| (cache.max_size(), cache.used_size())),
			None => (0, 0),
		};

		let max_size = (max_size != CacheSize::MAX).then_some(max_size);
		self.stats.to_info(max_size, used_size)
	}
}

pub(super) fn lookup<L>(
	cache: &L,
	key: &<L::Cache as CacheMap>::Key,
) -> Option<<L::Cache as CacheMap>::Value>
where
	L: CacheLock,
	L::Cache: CacheMap,
	<L::Cache as CacheMap>::Value: Clone,
{
	cache.with_cache(|cache| cache.get(key).ok().cloned())
}

pub(super) fn store<L>(
	cache: &L,
	key: <L::Cache as CacheMap>::Key,
	value: <L::Cache as CacheMap>::Value,
) -> <L::Cache as CacheMap>::Value
where
	L: CacheLock,
	L::Cache: CacheMap,
	<L::Cache as CacheMap>::Value: Clone,
{
	match cache.with_cache(|cache| cache.set_default(key, value.clone())) {
		Ok(stored) => stored,

		Err(CacheError::ValueTooLarge) => {
			debug!("result is too large to cache");
			value
		},

		Err(err) => {
			warn!("could not cache result: {err}");
			value
		},
	}
}
