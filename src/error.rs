/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum CacheError {
	#[error("internal error")]
	Internal,

	#[error("the key was not found in the cache")]
	KeyNotFound,

	#[error("value too large")]
	ValueTooLarge,

	#[error("{0} is empty")]
	Empty(&'static str),

	#[error("the cache size cannot be zero")]
	ZeroCacheSize,

	#[error("invalid policy")]
	InvalidPolicy,
}

#[cfg(test)]
mod tests {
	use crate::CacheError;

	#[test]
	fn empty_error_names_the_cache() {
		assert_eq!(CacheError::Empty("LruCache").to_string(), "LruCache is empty");
		assert_eq!(CacheError::ValueTooLarge.to_string(), "value too large");
	}
}
