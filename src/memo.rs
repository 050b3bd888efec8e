/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

mod lock;
mod cached;
mod cached_method;
mod factory;

pub use crate::memo::{
	lock::CacheLock,
	cached::Cached,
	cached_method::CachedMethod,
	factory::{
		DEFAULT_MAX_SIZE,
		DEFAULT_TTL,
		MemoConfig,
		TtlMemoConfig,
		MemoCache,
		TtlMemoCache,
		KeyFn,
		Memoized,
		memoize,
		lru_cache,
		lfu_cache,
		fifo_cache,
		mru_cache,
		rr_cache,
		ttl_memoize,
		ttl_cache,
	},
};
