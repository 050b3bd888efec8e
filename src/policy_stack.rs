/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

mod lfu_stack;
mod fifo_stack;
mod lru_stack;
mod mru_stack;
mod rr_stack;
mod null_stack;

use std::hash::{Hash, BuildHasher};
use crate::policy::Policy;

/// Tracks the keys of a cache and decides which one to evict next.
pub trait PolicyStack<K> {
	/// Returns the name of the cache type this stack backs.
	fn name(&self) -> &'static str;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Records a write of the key, which may or may not already be tracked.
	fn insert(&mut self, key: &K);

	/// Records a successful read of the key.
	fn update(&mut self, _key: &K) {}

	fn remove(&mut self, key: &K);
	fn clear(&mut self);

	/// Removes and returns the next key to evict.
	fn pop(&mut self) -> Option<K>;
}

pub enum PolicyStackType<K, S> {
	Lfu(Box<LfuStack<K, S>>),
	Fifo(Box<FifoStack<K, S>>),
	Lru(Box<LruStack<K, S>>),
	Mru(Box<MruStack<K, S>>),
	Rr(Box<RrStack<K, S>>),
	Null(Box<NullStack>),
}

impl<K, S> PolicyStack<K> for PolicyStackType<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Default,
{
	fn name(&self) -> &'static str {
		match self {
			PolicyStackType::Lfu(stack) => stack.name(),
			PolicyStackType::Fifo(stack) => stack.name(),
			PolicyStackType::Lru(stack) => stack.name(),
			PolicyStackType::Mru(stack) => stack.name(),
			PolicyStackType::Rr(stack) => stack.name(),
			PolicyStackType::Null(stack) => PolicyStack::<K>::name(stack.as_ref()),
		}
	}

	fn len(&self) -> usize {
		match self {
			PolicyStackType::Lfu(stack) => stack.len(),
			PolicyStackType::Fifo(stack) => stack.len(),
			PolicyStackType::Lru(stack) => stack.len(),
			PolicyStackType::Mru(stack) => stack.len(),
			PolicyStackType::Rr(stack) => stack.len(),
			PolicyStackType::Null(stack) => PolicyStack::<K>::len(stack.as_ref()),
		}
	}

	fn insert(&mut self, key: &K) {
		match self {
			PolicyStackType::Lfu(stack) => stack.insert(key),
			PolicyStackType::Fifo(stack) => stack.insert(key),
			PolicyStackType::Lru(stack) => stack.insert(key),
			PolicyStackType::Mru(stack) => stack.insert(key),
			PolicyStackType::Rr(stack) => stack.insert(key),
			PolicyStackType::Null(stack) => stack.insert(key),
		}
	}

	fn update(&mut self, key: &K) {
		match self {
			PolicyStackType::Lfu(stack) => stack.update(key),
			PolicyStackType::Fifo(stack) => stack.update(key),
			PolicyStackType::Lru(stack) => stack.update(key),
			PolicyStackType::Mru(stack) => stack.update(key),
			PolicyStackType::Rr(stack) => stack.update(key),
			PolicyStackType::Null(stack) => stack.update(key),
		}
	}

	fn remove(&mut self, key: &K) {
		match self {
			PolicyStackType::Lfu(stack) => stack.remove(key),
			PolicyStackType::Fifo(stack) => stack.remove(key),
			PolicyStackType::Lru(stack) => stack.remove(key),
			PolicyStackType::Mru(stack) => stack.remove(key),
			PolicyStackType::Rr(stack) => stack.remove(key),
			PolicyStackType::Null(stack) => stack.remove(key),
		}
	}

	fn clear(&mut self) {
		match self {
			PolicyStackType::Lfu(stack) => stack.clear(),
			PolicyStackType::Fifo(stack) => stack.clear(),
			PolicyStackType::Lru(stack) => stack.clear(),
			PolicyStackType::Mru(stack) => stack.clear(),
			PolicyStackType::Rr(stack) => stack.clear(),
			PolicyStackType::Null(stack) => PolicyStack::<K>::clear(stack.as_mut()),
		}
	}

	fn pop(&mut self) -> Option<K> {
		match self {
			PolicyStackType::Lfu(stack) => stack.pop(),
			PolicyStackType::Fifo(stack) => stack.pop(),
			PolicyStackType::Lru(stack) => stack.pop(),
			PolicyStackType::Mru(stack) => stack.pop(),
			PolicyStackType::Rr(stack) => stack.pop(),
			PolicyStackType::Null(stack) => stack.pop(),
		}
	}
}

impl<K, S> PolicyStackType<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Default,
{
	/// Returns a stack that never selects a victim, used by unbounded caches.
	#[must_use]
	pub fn unbounded() -> Self {
		PolicyStackType::Null(Box::default())
	}
}

impl<K, S> From<Policy> for PolicyStackType<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Default,
{
	fn from(policy: Policy) -> Self {
		match policy {
			Policy::Lfu => PolicyStackType::Lfu(Box::default()),
			Policy::Fifo => PolicyStackType::Fifo(Box::default()),
			Policy::Lru => PolicyStackType::Lru(Box::default()),
			Policy::Mru => PolicyStackType::Mru(Box::default()),
			Policy::Rr => PolicyStackType::Rr(Box::default()),
		}
	}
}

pub use crate::policy_stack::{
	lfu_stack::LfuStack,
	fifo_stack::FifoStack,
	lru_stack::LruStack,
	mru_stack::MruStack,
	rr_stack::{RrStack, Choice},
	null_stack::NullStack,
};
