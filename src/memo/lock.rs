/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	cell::RefCell,
	rc::Rc,
	sync::Arc,
};

use parking_lot::Mutex;

/// The container a memoized function keeps its cache in.
///
/// A `RefCell` gives single-threaded access without locking, while a
/// `Mutex` serializes every read and write of the cache. The lock is only
/// held while the cache is touched, never while the wrapped function runs.
pub trait CacheLock {
	type Cache;

	fn with_cache<T>(&self, f: impl FnOnce(&mut Self::Cache) -> T) -> T;
}

impl<C> CacheLock for RefCell<C> {
	type Cache = C;

	fn with_cache<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
		f(&mut self.borrow_mut())
	}
}

impl<C> CacheLock for Mutex<C> {
	type Cache = C;

	fn with_cache<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
		f(&mut self.lock())
	}
}

impl<L: CacheLock + ?Sized> CacheLock for &L {
	type Cache = L::Cache;

	fn with_cache<T>(&self, f: impl FnOnce(&mut L::Cache) -> T) -> T {
		(**self).with_cache(f)
	}
}

impl<L: CacheLock + ?Sized> CacheLock for Rc<L> {
	type Cache = L::Cache;

	fn with_cache<T>(&self, f: impl FnOnce(&mut L::Cache) -> T) -> T {
		(**self).with_cache(f)
	}
}

impl<L: CacheLock + ?Sized> CacheLock for Arc<L> {
	type Cache = L::Cache;

	fn with_cache<T>(&self, f: impl FnOnce(&mut L::Cache) -> T) -> T {
		(**self).with_cache(f)
	}
}
