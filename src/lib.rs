/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

mod error;
mod object;
mod store;
mod sizer;
mod cache_map;
mod cache;
mod policy;
mod policy_stack;
mod timer;
mod ttl_cache;
mod tlru_cache;
mod key;
mod stats;
mod memo;

pub use crate::error::CacheError;
pub use crate::cache_map::CacheMap;
pub use crate::sizer::{Sizer, type_size};
pub use crate::policy::Policy;

pub use crate::cache::{
	CacheSize,
	Cache,
	FifoCache,
	LfuCache,
	LruCache,
	MruCache,
	RrCache,
	PolicyCache,
};

pub use crate::policy_stack::{
	PolicyStack,
	PolicyStackType,
	FifoStack,
	LfuStack,
	LruStack,
	MruStack,
	RrStack,
	NullStack,
	Choice,
};

pub use crate::timer::{Timer, MonotonicTimer, ManualTimer};
pub use crate::ttl_cache::TtlCache;
pub use crate::tlru_cache::{TlruCache, Ttu};

pub use crate::key::{
	HashedKey,
	KeyPart,
	KeyType,
	KeyArgs,
	ToKeyPart,
	ToKeyArgs,
	CacheKey,
	CacheKeyHasher,
	hash_key,
	typed_key,
	method_key,
};

pub use crate::stats::{MemoStats, CacheInfo};

pub use crate::memo::{
	CacheLock,
	Cached,
	CachedMethod,
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
};
