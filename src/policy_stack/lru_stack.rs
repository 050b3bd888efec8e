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

pub struct LruStack<K, S> {
	map: HashMap<K, Index<K>, S>,
	stack: VecList<K>,
}

impl<K, S> PolicyStack<K> for LruStack<K, S>
where
	K: Eq + Hash + Clone,
	S: BuildHasher,
{
	fn name(&self) -> &'static str {
		"LruCache"
	}

	fn len(&self) -> usize {
		self.map.len()
	}

	fn insert(&mut self, key: &K) {
		if self.map.contains_key(key) {
			return self.update(key);
		}

		let index = self.stack.push_front(key.clone());
		self.map.insert(key.clone(), index);
	}

	fn update(&mut self, key: &K) {
		if let Some(index) = self.map.get_mut(key) {
			if let Some(key) = self.stack.remove(*index) {
				*index = self.stack.push_front(key);
			}
		}
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

impl<K, S: Default> Default for LruStack<K, S> {
	fn default() -> Self {
		LruStack {
			map: HashMap::default(),
			stack: VecList::new(),
		}
	}
}
