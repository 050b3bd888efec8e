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

pub struct FifoStack<K, S> {
	map: HashMap<K, Index<K>, S>,
	stack: VecList<K>,
}

impl<K, S> PolicyStack<K> for FifoStack<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher,
{
	fn name(&self) -> &'static str {
		"FifoCache"
	}

	fn len(&self) -> usize {
		self.map.len()
	}

	fn insert(&mut self, key: &K) {
		// overwriting a key keeps its original position
		if self.map.contains_key(key) {
			return;
		}

		let index = self.stack.push_front(key.clone());
		self.map.insert(key.clone(), index);
	}

	fn remove(&mut self, key: &K) {
		if let Some(index) = self.map.remove(key) {
			self.stack.remove(index);
		}
	}

	fn clear(&mut self) {
		self.map.clear();
		self.stack.clear();
	}

	fn pop(&mut self) -> Option<K> {
		let key = self.stack.pop_back()?;
		self.map.remove(&key);

		Some(key)
	}
}

impl<K, S: Default> Default for FifoStack<K, S> {
	fn default() -> Self {
		FifoStack {
			map: HashMap::default(),
			stack: VecList::new(),
		}
	}
}
