/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::{
	cache::CacheSize,
	error::CacheError,
};

/// The mapping interface shared by every cache in the crate.
///
/// Reads through [`CacheMap::get`] count as a use of the key for the
/// cache's eviction policy, whereas [`CacheMap::peek`] and
/// [`CacheMap::contains_key`] leave the policy untouched.
pub trait CacheMap {
	type Key;
	type Value;

	fn max_size(&self) -> CacheSize;

	/// Returns the sum of the sizes of all live entries.
	fn used_size(&self) -> CacheSize;

	/// Returns the number of live entries.
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn contains_key(&self, key: &Self::Key) -> bool;

	/// Gets the value associated with the supplied key.
	/// If the key was not found in the cache, returns a [`CacheError`].
	fn get(&mut self, key: &Self::Key) -> Result<&Self::Value, CacheError>;

	fn peek(&self, key: &Self::Key) -> Option<&Self::Value>;

	/// Sets the supplied key and value in the cache, evicting entries as
	/// needed to make room. Returns a [`CacheError`] if the value on its own
	/// is larger than the cache's maximum size.
	fn set(&mut self, key: Self::Key, value: Self::Value) -> Result<(), CacheError>;

	/// Removes the key and returns its value.
	/// If the key was not found in the cache, returns a [`CacheError`].
	fn remove(&mut self, key: &Self::Key) -> Result<Self::Value, CacheError>;

	/// Removes and returns the entry the eviction policy would evict next.
	fn pop_item(&mut self) -> Result<(Self::Key, Self::Value), CacheError>;

	fn clear(&mut self);

	fn size_of(&self, key: &Self::Key) -> Option<CacheSize>;

	fn iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

	/// Returns the size recorded for every live entry.
	fn sizes(&self) -> impl Iterator<Item = (&Self::Key, CacheSize)> {
		self.iter()
			.filter_map(|(key, _)| self.size_of(key).map(|size| (key, size)))
	}

	fn get_or(&mut self, key: &Self::Key, default: Self::Value) -> Self::Value
	where
		Self::Value: Clone,
	{
		self.get(key)
			.cloned()
			.unwrap_or(default)
	}

	fn pop_or(&mut self, key: &Self::Key, default: Self::Value) -> Self::Value {
		self.remove(key)
			.unwrap_or(default)
	}

	/// Returns the value stored under the key. If the key is absent, the value
	/// is computed by `missing`, stored and returned. A computed value which is
	/// too large for the cache returns a [`CacheError`] and is not stored.
	///
	/// # Examples
	///
	/// ```
	/// use xcache::{CacheMap, LruCache};
	///
	/// let mut cache = LruCache::new(4).unwrap();
	///
	/// assert_eq!(cache.get_or_insert_with("ab", |key| key.len()), Ok(2));
	/// assert_eq!(cache.get_or_insert_with("ab", |_| 0), Ok(2));
	/// ```
	fn get_or_insert_with(
		&mut self,
		key: Self::Key,
		missing: impl FnOnce(&Self::Key) -> Self::Value,
	) -> Result<Self::Value, CacheError>
	where
		Self::Value: Clone,
	{
		if self.contains_key(&key) {
			return self.get(&key).cloned();
		}

		let value = missing(&key);
		self.set(key, value.clone())?;

		Ok(value)
	}

	/// Returns the value stored under the key, storing `default` first if the
	/// key is absent.
	fn set_default(&mut self, key: Self::Key, default: Self::Value) -> Result<Self::Value, CacheError>
	where
		Self::Value: Clone,
	{
		self.get_or_insert_with(key, |_| default)
	}
}
