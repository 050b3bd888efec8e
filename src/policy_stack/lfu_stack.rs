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

use dlv_list::{VecList, Index};
use crate::policy_stack::PolicyStack;

/// Keys grouped into buckets of equal use count. Buckets are kept in
/// ascending count order so the eviction candidate is always at the front.
/// Within a bucket, the key which reached that count first is evicted first.
pub struct LfuStack<K, S> {
	index_map: HashMap<K, Position<K>, S>,
	count_stacks: VecList<CountStack<K>>,
}

struct Position<K> {
	count_stack: Index<CountStack<K>>,
	entry: Index<K>,
}

struct CountStack<K> {
	count: u64,
	stack: VecList<K>,
}

impl<K, S> PolicyStack<K> for LfuStack<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher,
{
	fn name(&self) -> &'static str {
		"LfuCache"
	}

	fn len(&self) -> usize {
		self.index_map.len()
	}

	fn insert(&mut self, key: &K) {
		if self.index_map.contains_key(key) {
			return self.update(key);
		}

		if self.count_stacks.front().is_none_or(|count_stack| count_stack.count != 1) {
			self.count_stacks.push_front(CountStack::new(1));
		}

		let Some(count_stack_index) = self.count_stacks.front_index() else {
			return;
		};

		let Some(count_stack) = self.count_stacks.get_mut(count_stack_index) else {
			return;
		};

		let entry = count_stack.stack.push_back(key.clone());

		self.index_map.insert(key.clone(), Position {
			count_stack: count_stack_index,
			entry,
		});
	}

	fn update(&mut self, key: &K) {
		let Some(position) = self.index_map.get_mut(key) else {
			return;
		};

		let prev_count_stack_index = position.count_stack;

		let Some(prev_count_stack) = self.count_stacks.get_mut(prev_count_stack_index) else {
			return;
		};

		let prev_count = prev_count_stack.count;

		let Some(key) = prev_count_stack.stack.remove(position.entry) else {
			return;
		};

		let prev_is_empty = prev_count_stack.stack.is_empty();

		let next_count_stack_index = self.count_stacks
			.get_next_index(prev_count_stack_index)
			.filter(|index| self.count_stacks
				.get(*index)
				.is_some_and(|count_stack| count_stack.count == prev_count + 1)
			);

		let count_stack_index = match next_count_stack_index {
			Some(index) => index,

			None => self.count_stacks.insert_after(
				prev_count_stack_index,
				CountStack::new(prev_count + 1),
			),
		};

		if let Some(count_stack) = self.count_stacks.get_mut(count_stack_index) {
			position.entry = count_stack.stack.push_back(key);
			position.count_stack = count_stack_index;
		}

		if prev_is_empty {
			self.count_stacks.remove(prev_count_stack_index);
		}
	}

	fn remove(&mut self, key: &K) {
		let Some(position) = self.index_map.remove(key) else {
			return;
		};

		let Some(count_stack) = self.count_stacks.get_mut(position.count_stack) else {
			return;
		};

		count_stack.stack.remove(position.entry);

		if count_stack.stack.is_empty() {
			self.count_stacks.remove(position.count_stack);
		}
	}

	fn clear(&mut self) {
		self.index_map.clear();
		self.count_stacks.clear();
	}

	fn pop(&mut self) -> Option<K> {
		let count_stack_index = self.count_stacks.front_index()?;
		let count_stack = self.count_stacks.get_mut(count_stack_index)?;

		let key = count_stack.stack.pop_front()?;
		self.index_map.remove(&key);

		if count_stack.stack.is_empty() {
			self.count_stacks.remove(count_stack_index);
		}

		Some(key)
	}
}

impl<K, S: Default> Default for LfuStack<K, S> {
	fn default() -> Self {
		LfuStack {
			index_map: HashMap::default(),
			count_stacks: VecList::new(),
		}
	}
}

impl<K> CountStack<K> {
	fn new(count: u64) -> Self {
		CountStack {
			count,
			stack: VecList::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use rustc_hash::FxBuildHasher;
	use crate::policy_stack::{PolicyStack, LfuStack};

	#[test]
	fn eviction_order_is_correct() {
		let mut stack = LfuStack::<u32, FxBuildHasher>::default();

		for access in [0, 1, 1, 1, 0, 2, 3, 0, 2, 0] {
			stack.insert(&access);
		}

		for eviction in [3, 2, 1, 0] {
			assert_eq!(stack.pop(), Some(eviction));
		}

		assert_eq!(stack.pop(), None);
	}

	#[test]
	fn ties_evict_the_earliest_at_the_minimum_count() {
		let mut stack = LfuStack::<&str, FxBuildHasher>::default();

		stack.insert(&"a");
		stack.insert(&"b");
		stack.insert(&"c");
		stack.update(&"a");

		assert_eq!(stack.pop(), Some("b"));
		assert_eq!(stack.pop(), Some("c"));
		assert_eq!(stack.pop(), Some("a"));
	}

	#[test]
	fn removed_keys_are_never_evicted() {
		let mut stack = LfuStack::<u32, FxBuildHasher>::default();

		stack.insert(&0);
		stack.insert(&1);
		stack.update(&1);
		stack.remove(&0);

		assert_eq!(stack.len(), 1);
		assert_eq!(stack.pop(), Some(1));
		assert!(stack.is_empty());
	}
}
