/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	cmp::{Ord, Ordering, PartialEq},
	time::Duration,
};

/// A heap entry. Ordering is reversed so that a `BinaryHeap` yields the
/// soonest expiry first; the sequence number breaks ties by insertion order
/// and identifies which write of a key the entry belongs to.
pub struct Expiry<K> {
	pub key: K,
	pub expires: Duration,
	pub sequence: u64,
}

impl<K> Ord for Expiry<K> {
	fn cmp(&self, other: &Self) -> Ordering {
		other.expires
			.cmp(&self.expires)
			.then_with(|| other.sequence.cmp(&self.sequence))
	}
}

impl<K> PartialOrd for Expiry<K> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<K> PartialEq for Expiry<K> {
	fn eq(&self, other: &Self) -> bool {
		self.expires == other.expires && self.sequence == other.sequence
	}
}

impl<K> Eq for Expiry<K> {}

#[cfg(test)]
mod tests {
	use std::{collections::BinaryHeap, time::Duration};
	use crate::tlru_cache::expiry::Expiry;

	#[test]
	fn heap_yields_the_soonest_expiry() {
		let mut heap = BinaryHeap::new();

		for (sequence, (key, secs)) in [("a", 5), ("b", 1), ("c", 3), ("d", 1)].into_iter().enumerate() {
			heap.push(Expiry {
				key,
				expires: Duration::from_secs(secs),
				sequence: sequence as u64,
			});
		}

		let order = std::iter::from_fn(|| heap.pop().map(|expiry| expiry.key)).collect::<Vec<_>>();
		assert_eq!(order, vec!["b", "d", "c", "a"]);
	}
}
