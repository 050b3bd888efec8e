/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::policy_stack::PolicyStack;

/// A stack for caches which never need to evict.
#[derive(Default)]
pub struct NullStack;

impl<K> PolicyStack<K> for NullStack {
	fn name(&self) -> &'static str {
		"UnboundedCache"
	}

	fn len(&self) -> usize {
		0
	}

	fn insert(&mut self, _: &K) {}
	fn remove(&mut self, _: &K) {}
	fn clear(&mut self) {}

	fn pop(&mut self) -> Option<K> {
		None
	}
}
