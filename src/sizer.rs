/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use typesize::TypeSize;
use crate::cache::CacheSize;

/// Measures a value's cost against the cache's maximum size.
pub type Sizer<V> = Box<dyn Fn(&V) -> CacheSize + Send + Sync>;

/// A sizing function which charges each value its in-memory byte size,
/// including heap allocations it owns.
///
/// # Examples
///
/// ```
/// use xcache::{CacheMap, LruCache, type_size};
///
/// let mut cache = LruCache::<u32, String>::with_sizer(1024, type_size).unwrap();
///
/// cache.set(0, "value".to_owned()).unwrap();
/// assert!(cache.used_size() > 0);
/// ```
pub fn type_size<V: TypeSize>(value: &V) -> CacheSize {
	value.get_size() as CacheSize
}
