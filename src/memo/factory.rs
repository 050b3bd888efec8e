/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::time::Duration;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::{
	cache::{Cache, CacheSize, PolicyCache},
	key::{CacheKey, CacheKeyHasher, ToKeyArgs, hash_key, typed_key},
	memo::Cached,
	policy::Policy,
	policy_stack::PolicyStackType,
	store::Store,
	timer::Timer,
	ttl_cache::TtlCache,
};

pub const DEFAULT_MAX_SIZE: CacheSize = 128;
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

pub type MemoCache<R> = Mutex<PolicyCache<CacheKey, R, CacheKeyHasher>>;
pub type TtlMemoCache<R, T> = Mutex<TtlCache<CacheKey, R, T, CacheKeyHasher>>;

pub type KeyFn<A> = fn(&A) -> CacheKey;
pub type Memoized<A, R, F> = Cached<MemoCache<R>, KeyFn<A>, F>;

/// How [`memoize`] caches a function.
///
/// # Examples
///
/// ```
/// use xcache::{MemoConfig, Policy};
///
/// let config: MemoConfig = serde_json::from_str(r#"{ "policy": "lfu", "max_size": null }"#).unwrap();
///
/// assert_eq!(config.policy, Policy::Lfu);
/// assert_eq!(config.max_size, None);
/// assert!(!config.typed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoConfig {
	pub policy: Policy,

	/// The maximum number of results, or `None` for no limit. Zero disables
	/// caching.
	pub max_size: Option<CacheSize>,

	/// Whether arguments of different types are cached separately.
	pub typed: bool,
}

impl Default for MemoConfig {
	fn default() -> Self {
		MemoConfig {
			policy: Policy::default(),
			max_size: Some(DEFAULT_MAX_SIZE),
			typed: false,
		}
	}
}

/// Wraps `func` in a locked cache built from `config`.
pub fn memoize<A, R, F>(config: MemoConfig, func: F) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	let cache = match config.max_size {
		None => Some(PolicyCache::<CacheKey, R, CacheKeyHasher>::unbounded()),
		Some(max_size) => Cache::with_stack(max_size, PolicyStackType::from(config.policy), None).ok(),
	};

	Cached::new(cache.map(Mutex::new), key_fn(config.typed), func)
}

pub fn lru_cache<A, R, F>(max_size: Option<CacheSize>, typed: bool, func: F) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	with_policy(Policy::Lru, max_size, typed, func)
}

pub fn lfu_cache<A, R, F>(max_size: Option<CacheSize>, typed: bool, func: F) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	with_policy(Policy::Lfu, max_size, typed, func)
}

pub fn fifo_cache<A, R, F>(max_size: Option<CacheSize>, typed: bool, func: F) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	with_policy(Policy::Fifo, max_size, typed, func)
}

pub fn mru_cache<A, R, F>(max_size: Option<CacheSize>, typed: bool, func: F) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	with_policy(Policy::Mru, max_size, typed, func)
}

pub fn rr_cache<A, R, F>(max_size: Option<CacheSize>, typed: bool, func: F) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	with_policy(Policy::Rr, max_size, typed, func)
}

/// How [`ttl_memoize`] caches a function. Results live for ten minutes
/// unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TtlMemoConfig {
	pub max_size: Option<CacheSize>,
	pub ttl: Duration,
	pub typed: bool,
}

impl Default for TtlMemoConfig {
	fn default() -> Self {
		TtlMemoConfig {
			max_size: Some(DEFAULT_MAX_SIZE),
			ttl: DEFAULT_TTL,
			typed: false,
		}
	}
}

/// Wraps `func` in a locked cache whose results expire `config.ttl` after
/// they were computed, as measured by `timer`.
pub fn ttl_memoize<A, R, T, F>(
	config: TtlMemoConfig,
	timer: T,
	func: F,
) -> Cached<TtlMemoCache<R, T>, KeyFn<A>, F>
where
	A: ToKeyArgs,
	T: Timer,
	F: Fn(A) -> R,
{
	let TtlMemoConfig { max_size, ttl, typed } = config;

	let cache = match max_size {
		None => Some(TtlCache::<CacheKey, R, T, CacheKeyHasher>::unbounded(ttl, timer)),

		Some(max_size) => Store::new(max_size, None)
			.ok()
			.map(|store| TtlCache::with_store(store, ttl, timer)),
	};

	Cached::new(cache.map(Mutex::new), key_fn(typed), func)
}

pub fn ttl_cache<A, R, T, F>(
	max_size: Option<CacheSize>,
	ttl: Duration,
	timer: T,
	typed: bool,
	func: F,
) -> Cached<TtlMemoCache<R, T>, KeyFn<A>, F>
where
	A: ToKeyArgs,
	T: Timer,
	F: Fn(A) -> R,
{
	let config = TtlMemoConfig {
		max_size,
		ttl,
		typed,
	};

	ttl_memoize(config, timer, func)
}

fn with_policy<A, R, F>(
	policy: Policy,
	max_size: Option<CacheSize>,
	typed: bool,
	func: F,
) -> Memoized<A, R, F>
where
	A: ToKeyArgs,
	F: Fn(A) -> R,
{
	let config = MemoConfig {
		policy,
		max_size,
		typed,
	};

	memoize(config, func)
}

fn key_fn<A: ToKeyArgs>(typed: bool) -> KeyFn<A> {
	if typed {
		typed_key::<A>
	} else {
		hash_key::<A>
	}
}
