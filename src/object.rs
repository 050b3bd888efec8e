/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::cache::CacheSize;

/// A stored value together with the size it was measured at on insert.
pub struct Object<V> {
	data: V,
	size: CacheSize,
}

impl<V> Object<V> {
	pub fn new(data: V, size: CacheSize) -> Self {
		Object {
			data,
			size,
		}
	}

	pub fn data(&self) -> &V {
		&self.data
	}

	pub fn into_data(self) -> V {
		self.data
	}

	pub fn size(&self) -> CacheSize {
		self.size
	}
}
