/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	collections::HashMap,
	hash::{Hash, BuildHasher},
};

use rand::Rng;
use crate::policy_stack::PolicyStack;

/// Picks an index in `0..len` for a non-empty stack of `len` keys.
pub type Choice = Box<dyn FnMut(usize) -> usize + Send>;

pub struct RrStack<K, S> {
	positions: HashMap<K, usize, S>,
	keys: Vec<K>,

	choice: Choice,
}

impl<K, S> PolicyStack<K> for RrStack<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher,
{
	fn name(&self) -> &'static str {
		"RrCache"
	}

	fn len(&self) -> usize {
		self.keys.len()
	}

	fn insert(&mut self, key: &K) {
		if self.positions.contains_key(key) {
			return;
		}

		self.positions.insert(key.clone(), self.keys.len());
		self.keys.push(key.clone());
	}

	fn remove(&mut self, key: &K) {
		if let Some(position) = self.positions.remove(key) {
			self.swap_remove(position);
		}
	}

	fn clear(&mut self) {
		self.positions.clear();
		self.keys.clear();
	}

	fn pop(&mut self) -> Option<K> {
		if self.keys.is_empty() {
			return None;
		}

		let position = (self.choice)(self.keys.len()) % self.keys.len();
		let key = self.swap_remove(position);

		self.positions.remove(&key);

		Some(key)
	}
}

impl<K, S> RrStack<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Default,
{
	/// Creates a stack which evicts the key at the index returned by `choice`.
	pub fn with_choice(choice: impl FnMut(usize) -> usize + Send + 'static) -> Self {
		RrStack {
			positions: HashMap::default(),
			keys: Vec::new(),

			choice: Box::new(choice),
		}
	}
}

impl<K, S> RrStack<K, S>
where
	K: Eq + Hash,
	S: BuildHasher,
{
	fn swap_remove(&mut self, position: usize) -> K {
		let key = self.keys.swap_remove(position);

		if let Some(moved) = self.keys.get(position) {
			if let Some(moved_position) = self.positions.get_mut(moved) {
				*moved_position = position;
			}
		}

		key
	}
}

impl<K, S> Default for RrStack<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher + Default,
{
	fn default() -> Self {
		RrStack::with_choice(|len| rand::rng().random_range(0..len))
	}
}

#[cfg(test)]
mod tests {
	use rustc_hash::FxBuildHasher;
	use crate::policy_stack::{PolicyStack, RrStack};

	#[test]
	fn eviction_follows_choice() {
		let mut stack = RrStack::<u32, FxBuildHasher>::with_choice(|len| len - 1);

		for access in [0, 1, 2, 3, 1] {
			stack.insert(&access);
		}

		assert_eq!(stack.len(), 4);

		for eviction in [3, 2, 1, 0] {
			assert_eq!(stack.pop(), Some(eviction));
		}

		assert_eq!(stack.pop(), None);
	}

	#[test]
	fn removal_keeps_positions_consistent() {
		let mut stack = RrStack::<u32, FxBuildHasher>::with_choice(|_| 0);

		for access in [0, 1, 2, 3] {
			stack.insert(&access);
		}

		stack.remove(&0);

		// 3 was moved into the removed slot
		assert_eq!(stack.pop(), Some(3));
		stack.remove(&2);
		assert_eq!(stack.pop(), Some(1));
		assert!(stack.is_empty());
	}

	#[test]
	fn random_eviction_drains_every_key() {
		let mut stack = RrStack::<u32, FxBuildHasher>::default();

		for access in 0..32 {
			stack.insert(&access);
		}

		let mut evicted = Vec::new();

		while let Some(key) = stack.pop() {
			evicted.push(key);
		}

		evicted.sort_unstable();
		assert_eq!(evicted, (0..32).collect::<Vec<u32>>());
	}
}
