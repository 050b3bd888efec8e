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

use crate::{
	cache::CacheSize,
	error::CacheError,
	object::Object,
	sizer::Sizer,
};

/// Size-bounded key-value storage. Holds the objects and keeps `used_size`
/// equal to the sum of their sizes; choosing what to evict is left to the
/// owning cache.
pub struct Store<K, V, S> {
	objects: HashMap<K, Object<V>, S>,

	max_size: CacheSize,
	used_size: CacheSize,

	sizer: Option<Sizer<V>>,
}

impl<K, V, S> Store<K, V, S>
where
	K: Eq + Hash,
	S: BuildHasher + Default,
{
	pub fn new(max_size: CacheSize, sizer: Option<Sizer<V>>) -> Result<Self, CacheError> {
		if max_size == 0 {
			return Err(CacheError::ZeroCacheSize);
		}

		let store = Store {
			objects: HashMap::default(),

			max_size,
			used_size: 0,

			sizer,
		};

		Ok(store)
	}

	pub fn unbounded() -> Self {
		Store {
			objects: HashMap::default(),

			max_size: CacheSize::MAX,
			used_size: 0,

			sizer: None,
		}
	}

	pub fn max_size(&self) -> CacheSize {
		self.max_size
	}

	pub fn used_size(&self) -> CacheSize {
		self.used_size
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	/// Returns the size of the supplied value, or an error if it could never
	/// fit in the cache regardless of what is evicted.
	pub fn measure(&self, value: &V) -> Result<CacheSize, CacheError> {
		let size = match &self.sizer {
			Some(sizer) => sizer(value),
			None => 1,
		};

		if size > self.max_size {
			return Err(CacheError::ValueTooLarge);
		}

		Ok(size)
	}

	/// Returns `true` if storing an object of `size` under `key` would push the
	/// used size past the maximum. Overwrites only count the size difference.
	pub fn needs_room(&self, key: &K, size: CacheSize) -> bool {
		let current = self.size_of(key).unwrap_or(0);
		(self.used_size - current).saturating_add(size) > self.max_size
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.objects.contains_key(key)
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		self.objects
			.get(key)
			.map(Object::data)
	}

	pub fn size_of(&self, key: &K) -> Option<CacheSize> {
		self.objects
			.get(key)
			.map(Object::size)
	}

	/// Stores the value, returning the previous value under the key if any.
	/// The caller must have made room with [`Store::needs_room`] first.
	pub fn insert(&mut self, key: K, value: V, size: CacheSize) -> Option<V> {
		let old_object = self.objects.insert(key, Object::new(value, size));
		self.used_size += size;

		old_object.map(|object| {
			self.used_size -= object.size();
			object.into_data()
		})
	}

	pub fn remove(&mut self, key: &K) -> Option<V> {
		let object = self.objects.remove(key)?;
		self.used_size -= object.size();

		Some(object.into_data())
	}

	pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
		let (key, object) = self.objects.remove_entry(key)?;
		self.used_size -= object.size();

		Some((key, object.into_data()))
	}

	pub fn clear(&mut self) {
		self.objects.clear();
		self.used_size = 0;
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
		self.objects
			.iter()
			.map(|(key, object)| (key, object.data()))
	}
}

#[cfg(test)]
mod tests {
	use rustc_hash::FxBuildHasher;
	use crate::{CacheError, Sizer, store::Store};

	fn sized_store(max_size: u64) -> Store<&'static str, String, FxBuildHasher> {
		let sizer: Sizer<String> = Box::new(|value: &String| value.len() as u64);
		Store::new(max_size, Some(sizer)).unwrap()
	}

	#[test]
	fn zero_max_size_is_rejected() {
		let store = Store::<u32, u32, FxBuildHasher>::new(0, None);
		assert!(matches!(store, Err(CacheError::ZeroCacheSize)));
	}

	#[test]
	fn oversized_values_are_rejected_when_empty() {
		let store = sized_store(4);

		assert_eq!(store.measure(&"abcde".to_owned()), Err(CacheError::ValueTooLarge));
		assert_eq!(store.measure(&"abcd".to_owned()), Ok(4));
	}

	#[test]
	fn used_size_tracks_overwrites() {
		let mut store = sized_store(10);

		store.insert("a", "abc".to_owned(), 3);
		store.insert("b", "ab".to_owned(), 2);
		assert_eq!(store.used_size(), 5);

		let old = store.insert("a", "a".to_owned(), 1);
		assert_eq!(old.as_deref(), Some("abc"));
		assert_eq!(store.used_size(), 3);

		assert_eq!(store.remove(&"b").as_deref(), Some("ab"));
		assert_eq!(store.used_size(), 1);

		let total: u64 = store.iter().filter_map(|(key, _)| store.size_of(key)).sum();
		assert_eq!(total, store.used_size());
	}

	#[test]
	fn room_is_measured_by_size_difference() {
		let mut store = sized_store(10);

		store.insert("a", "aaaaaa".to_owned(), 6);
		store.insert("b", "bbb".to_owned(), 3);

		assert!(!store.needs_room(&"a", 7));
		assert!(store.needs_room(&"a", 8));
		assert!(store.needs_room(&"c", 2));
		assert!(!store.needs_room(&"c", 1));
	}
}
