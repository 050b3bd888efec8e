/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	fmt::{self, Display},
	str::FromStr,
};

use serde::{
	Deserialize,
	de::{self, Deserializer, Visitor},
};

use crate::error::CacheError;

/// A count or size bounded eviction policy.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Policy {
	Lfu,
	Fifo,
	#[default]
	Lru,
	Mru,
	Rr,
}

impl Display for Policy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Policy::Lfu => write!(f, "lfu"),
			Policy::Fifo => write!(f, "fifo"),
			Policy::Lru => write!(f, "lru"),
			Policy::Mru => write!(f, "mru"),
			Policy::Rr => write!(f, "rr"),
		}
	}
}

impl FromStr for Policy {
	type Err = CacheError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let policy = match s {
			"lfu" => Policy::Lfu,
			"fifo" => Policy::Fifo,
			"lru" => Policy::Lru,
			"mru" => Policy::Mru,
			"rr" => Policy::Rr,

			_ => return Err(CacheError::InvalidPolicy),
		};

		Ok(policy)
	}
}

impl<'a> Deserialize<'a> for Policy {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'a>,
	{
		deserializer.deserialize_str(PolicyVisitor)
	}
}

struct PolicyVisitor;

impl Visitor<'_> for PolicyVisitor {
	type Value = Policy;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("an eviction policy name")
	}

	fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Policy::from_str(value)
			.map_err(|err| E::custom(err.to_string()))
	}
}
