/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::{
	cache_map::CacheMap,
	memo::{
		CacheLock,
		cached::{lookup, store},
	},
};

/// A method whose results are remembered in a cache owned by each receiver.
///
/// The cache is looked up on the receiver through `cache`, so instances
/// never share results unless they share a cache. The key is computed from
/// the arguments only. A receiver without a cache runs `func` on every
/// call.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use xcache::{CacheKey, CachedMethod, LruCache, method_key};
///
/// struct Scaler {
/// 	factor: u64,
/// 	cache: Option<RefCell<LruCache<CacheKey, u64>>>,
/// }
///
/// let scale = CachedMethod::new(
/// 	|scaler: &Scaler| scaler.cache.as_ref(),
/// 	method_key::<(u64,)>,
/// 	|scaler: &Scaler, (n,): (u64,)| scaler.factor * n,
/// );
///
/// let scaler = Scaler {
/// 	factor: 3,
/// 	cache: Some(RefCell::new(LruCache::new(8).unwrap())),
/// };
///
/// assert_eq!(scale.call(&scaler, (2,)), 6);
/// ```
pub struct CachedMethod<T, L, KF, F> {
	cache: fn(&T) -> Option<&L>,
	key: KF,
	func: F,
}

impl<T, L, KF, F> CachedMethod<T, L, KF, F> {
	pub fn new(cache: fn(&T) -> Option<&L>, key: KF, func: F) -> Self {
		CachedMethod {
			cache,
			key,
			func,
		}
	}

	/// Returns the receiver's cache.
	pub fn cache<'a>(&self, this: &'a T) -> Option<&'a L> {
		(self.cache)(this)
	}

	pub fn cache_key(&self) -> &KF {
		&self.key
	}
}

impl<T, L, KF, F> CachedMethod<T, L, KF, F>
where
	L: CacheLock,
	L::Cache: CacheMap,
{
	pub fn call<A>(&self, this: &T, args: A) -> <L::Cache as CacheMap>::Value
	where
		KF: Fn(&A) -> <L::Cache as CacheMap>::Key,
		F: Fn(&T, A) -> <L::Cache as CacheMap>::Value,
		<L::Cache as CacheMap>::Value: Clone,
	{
		let Some(cache) = (self.cache)(this) else {
			return (self.func)(this, args);
		};

		let key = (self.key)(&args);

		if let Some(value) = lookup(cache, &key) {
			return value;
		}

		let value = (self.func)(this, args);
		store(cache, key, value)
	}

	/// Empties the receiver's cache.
	pub fn cache_clear(&self, this: &T) {
		if let Some(cache) = (self.cache)(this) {
			cache.with_cache(|cache| cache.clear());
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};

	use crate::{
		CacheKey,
		CacheMap,
		CachedMethod,
		LruCache,
		method_key,
	};

	struct Counter {
		offset: u32,
		calls: Cell<u32>,
		cache: Option<RefCell<LruCache<CacheKey, u32>>>,
	}

	impl Counter {
		fn new(offset: u32, cached: bool) -> Self {
			Counter {
				offset,
				calls: Cell::new(0),
				cache: cached.then(|| RefCell::new(LruCache::new(4).unwrap())),
			}
		}
	}

	type AddMethod = CachedMethod<Counter, RefCell<LruCache<CacheKey, u32>>, fn(&(u32,)) -> CacheKey, fn(&Counter, (u32,)) -> u32>;

	fn add_method() -> AddMethod {
		CachedMethod::new(
			|counter| counter.cache.as_ref(),
			method_key::<(u32,)>,
			|counter, (n,)| {
				counter.calls.set(counter.calls.get() + 1);
				counter.offset + n
			},
		)
	}

	#[test]
	fn instances_keep_separate_caches() {
		let add = add_method();

		let lhs = Counter::new(10, true);
		let rhs = Counter::new(20, true);

		assert_eq!(add.call(&lhs, (1,)), 11);
		assert_eq!(add.call(&lhs, (1,)), 11);
		assert_eq!(add.call(&rhs, (1,)), 21);

		assert_eq!(lhs.calls.get(), 1);
		assert_eq!(rhs.calls.get(), 1);
	}

	#[test]
	fn uncached_instances_pass_through() {
		let add = add_method();
		let counter = Counter::new(1, false);

		add.call(&counter, (1,));
		add.call(&counter, (1,));

		assert_eq!(counter.calls.get(), 2);
		assert!(add.cache(&counter).is_none());
	}

	#[test]
	fn clear_only_touches_the_receiver() {
		let add = add_method();

		let lhs = Counter::new(0, true);
		let rhs = Counter::new(0, true);

		add.call(&lhs, (1,));
		add.call(&rhs, (1,));
		add.cache_clear(&lhs);

		assert_eq!(add.cache(&lhs).unwrap().borrow().len(), 0);
		assert_eq!(add.cache(&rhs).unwrap().borrow().len(), 1);
	}
}
