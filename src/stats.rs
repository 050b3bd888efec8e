/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::sync::atomic::{Ordering, AtomicU64};
use crate::cache::CacheSize;

/// Hit and miss counters of a memoized function, safe to update through a
/// shared reference.
#[derive(Debug, Default)]
pub struct MemoStats {
	hits: AtomicU64,
	misses: AtomicU64,
}

/// A snapshot of a memoized function's cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
	hits: u64,
	misses: u64,

	max_size: Option<CacheSize>,
	used_size: CacheSize,
}

impl CacheInfo {
	#[must_use]
	pub fn new(hits: u64, misses: u64, max_size: Option<CacheSize>, used_size: CacheSize) -> Self {
		CacheInfo {
			hits,
			misses,

			max_size,
			used_size,
		}
	}

	/// Returns the number of calls answered from the cache.
	#[must_use]
	pub fn get_hits(&self) -> u64 {
		self.hits
	}

	/// Returns the number of calls which ran the wrapped function.
	#[must_use]
	pub fn get_misses(&self) -> u64 {
		self.misses
	}

	/// Returns the cache's maximum size, or `None` if it is unbounded.
	#[must_use]
	pub fn get_max_size(&self) -> Option<CacheSize> {
		self.max_size
	}

	#[must_use]
	pub fn get_used_size(&self) -> CacheSize {
		self.used_size
	}

	/// Returns the cache's current miss ratio.
	#[must_use]
	pub fn get_miss_ratio(&self) -> f64 {
		let total = self.hits + self.misses;

		if total == 0 {
			return 1.0;
		}

		self.misses as f64 / total as f64
	}
}

impl MemoStats {
	pub fn hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub fn miss(&self) {
		self.misses.fetch_add(1, Ordering::Relaxed);
	}

	pub fn reset(&self) {
		self.hits.store(0, Ordering::Relaxed);
		self.misses.store(0, Ordering::Relaxed);
	}

	#[must_use]
	pub fn to_info(&self, max_size: Option<CacheSize>, used_size: CacheSize) -> CacheInfo {
		CacheInfo::new(
			self.hits.load(Ordering::Relaxed),
			self.misses.load(Ordering::Relaxed),
			max_size,
			used_size,
		)
	}
}
