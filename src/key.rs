/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the GNU AGPLv3 license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	collections::BTreeMap,
	hash::{Hash, Hasher},
};

use nohash_hasher::{IsEnabled, BuildNoHashHasher};
use rustc_hash::FxHasher;

/// A value paired with its hash, which is computed once on construction.
/// Hashing a `HashedKey` only writes the stored hash.
#[derive(Clone, Debug)]
pub struct HashedKey<T> {
	value: T,
	hash: u64,
}

impl<T: Hash> HashedKey<T> {
	pub fn new(value: T) -> Self {
		let mut hasher = FxHasher::default();
		value.hash(&mut hasher);

		HashedKey {
			hash: hasher.finish(),
			value,
		}
	}
}

impl<T> HashedKey<T> {
	pub fn value(&self) -> &T {
		&self.value
	}

	pub fn hash_value(&self) -> u64 {
		self.hash
	}
}

impl<T> Hash for HashedKey<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.hash);
	}
}

impl<T: PartialEq> PartialEq for HashedKey<T> {
	fn eq(&self, other: &Self) -> bool {
		self.hash == other.hash && self.value == other.value
	}
}

impl<T: Eq> Eq for HashedKey<T> {}

impl<T> IsEnabled for HashedKey<T> {}

/// A single call argument.
///
/// Numbers compare by value across variants, so `Int(1)`, `Float(1.0)` and
/// `Bool(true)` are equal and hash alike. Use [`typed_key`] to tell them
/// apart.
#[derive(Clone, Debug)]
pub enum KeyPart {
	Unit,
	Bool(bool),
	Int(i128),
	Float(f64),
	Str(Box<str>),
	Bytes(Box<[u8]>),
	Seq(Box<[KeyPart]>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
	Unit,
	Bool,
	Int,
	Float,
	Str,
	Bytes,
	Seq,
}

#[derive(PartialEq, Eq, Hash)]
enum Numeric {
	Int(i128),
	Float(u64),
}

impl KeyPart {
	pub fn key_type(&self) -> KeyType {
		match self {
			KeyPart::Unit => KeyType::Unit,
			KeyPart::Bool(_) => KeyType::Bool,
			KeyPart::Int(_) => KeyType::Int,
			KeyPart::Float(_) => KeyType::Float,
			KeyPart::Str(_) => KeyType::Str,
			KeyPart::Bytes(_) => KeyType::Bytes,
			KeyPart::Seq(_) => KeyType::Seq,
		}
	}

	fn numeric(&self) -> Option<Numeric> {
		match *self {
			KeyPart::Bool(value) => Some(Numeric::Int(i128::from(value))),
			KeyPart::Int(value) => Some(Numeric::Int(value)),
			KeyPart::Float(value) => Some(float_numeric(value)),
			_ => None,
		}
	}
}

fn float_numeric(value: f64) -> Numeric {
	// integral floats are the same number as the integer
	if value.is_finite() && value.fract() == 0.0 && value >= i128::MIN as f64 && value < i128::MAX as f64 {
		return Numeric::Int(value as i128);
	}

	if value.is_nan() {
		return Numeric::Float(f64::NAN.to_bits());
	}

	Numeric::Float(value.to_bits())
}

impl PartialEq for KeyPart {
	fn eq(&self, other: &Self) -> bool {
		if let (Some(lhs), Some(rhs)) = (self.numeric(), other.numeric()) {
			return lhs == rhs;
		}

		match (self, other) {
			(KeyPart::Unit, KeyPart::Unit) => true,
			(KeyPart::Str(lhs), KeyPart::Str(rhs)) => lhs == rhs,
			(KeyPart::Bytes(lhs), KeyPart::Bytes(rhs)) => lhs == rhs,
			(KeyPart::Seq(lhs), KeyPart::Seq(rhs)) => lhs == rhs,
			_ => false,
		}
	}
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
	fn hash<H: Hasher>(&self, state: &mut H) {
		if let Some(numeric) = self.numeric() {
			0u8.hash(state);
			return numeric.hash(state);
		}

		match self {
			KeyPart::Str(value) => {
				1u8.hash(state);
				value.hash(state);
			},

			KeyPart::Bytes(value) => {
				2u8.hash(state);
				value.hash(state);
			},

			KeyPart::Seq(value) => {
				3u8.hash(state);
				value.hash(state);
			},

			_ => 4u8.hash(state),
		}
	}
}

/// Converts an argument into a [`KeyPart`].
pub trait ToKeyPart {
	fn to_key_part(&self) -> KeyPart;
}

macro_rules! int_key_part {
	($($int:ty),+) => {
		$(
			impl ToKeyPart for $int {
				fn to_key_part(&self) -> KeyPart {
					KeyPart::Int(*self as i128)
				}
			}
		)+
	};
}

int_key_part!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl ToKeyPart for bool {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Bool(*self)
	}
}

impl ToKeyPart for f32 {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Float(f64::from(*self))
	}
}

impl ToKeyPart for f64 {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Float(*self)
	}
}

impl ToKeyPart for char {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Str(self.to_string().into())
	}
}

impl ToKeyPart for str {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Str(self.into())
	}
}

impl ToKeyPart for String {
	fn to_key_part(&self) -> KeyPart {
		self.as_str().to_key_part()
	}
}

impl ToKeyPart for () {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Unit
	}
}

impl ToKeyPart for KeyPart {
	fn to_key_part(&self) -> KeyPart {
		self.clone()
	}
}

impl<T: ToKeyPart> ToKeyPart for Option<T> {
	fn to_key_part(&self) -> KeyPart {
		match self {
			Some(value) => value.to_key_part(),
			None => KeyPart::Unit,
		}
	}
}

impl<T: ToKeyPart> ToKeyPart for [T] {
	fn to_key_part(&self) -> KeyPart {
		KeyPart::Seq(self.iter().map(ToKeyPart::to_key_part).collect())
	}
}

impl<T: ToKeyPart> ToKeyPart for Vec<T> {
	fn to_key_part(&self) -> KeyPart {
		self.as_slice().to_key_part()
	}
}

impl<T: ToKeyPart + ?Sized> ToKeyPart for &T {
	fn to_key_part(&self) -> KeyPart {
		(**self).to_key_part()
	}
}

/// Positional and named call arguments.
///
/// # Examples
///
/// ```
/// use xcache::{KeyArgs, hash_key};
///
/// let lhs = KeyArgs::new().arg(1).kwarg("b", 2).kwarg("c", "x");
/// let rhs = KeyArgs::new().arg(1).kwarg("c", "x").kwarg("b", 2);
///
/// assert_eq!(hash_key(&lhs), hash_key(&rhs));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyArgs {
	args: Vec<KeyPart>,
	kwargs: BTreeMap<Box<str>, KeyPart>,
}

impl KeyArgs {
	#[must_use]
	pub fn new() -> Self {
		KeyArgs::default()
	}

	#[must_use]
	pub fn arg(mut self, value: impl ToKeyPart) -> Self {
		self.args.push(value.to_key_part());
		self
	}

	/// Adds a named argument, replacing any earlier one with the same name.
	#[must_use]
	pub fn kwarg(mut self, name: &str, value: impl ToKeyPart) -> Self {
		self.kwargs.insert(name.into(), value.to_key_part());
		self
	}

	fn segments(&self) -> Vec<Segment> {
		let mut segments = self.args
			.iter()
			.cloned()
			.map(Segment::Part)
			.collect::<Vec<Segment>>();

		if !self.kwargs.is_empty() {
			segments.push(Segment::Mark);

			for (name, value) in &self.kwargs {
				segments.push(Segment::Part(KeyPart::Str(name.clone())));
				segments.push(Segment::Part(value.clone()));
			}
		}

		segments
	}

	fn types(&self) -> impl Iterator<Item = Segment> {
		self.args
			.iter()
			.chain(self.kwargs.values())
			.map(|value| Segment::Type(value.key_type()))
	}
}

/// Arguments which can be turned into a cache key.
pub trait ToKeyArgs {
	fn to_key_args(&self) -> KeyArgs;
}

impl ToKeyArgs for KeyArgs {
	fn to_key_args(&self) -> KeyArgs {
		self.clone()
	}
}

impl ToKeyArgs for () {
	fn to_key_args(&self) -> KeyArgs {
		KeyArgs::new()
	}
}

macro_rules! tuple_key_args {
	($($name:ident),+) => {
		impl<$($name: ToKeyPart),+> ToKeyArgs for ($($name,)+) {
			#[allow(non_snake_case)]
			fn to_key_args(&self) -> KeyArgs {
				let ($($name,)+) = self;
				KeyArgs::new()$(.arg($name))+
			}
		}
	};
}

tuple_key_args!(A);
tuple_key_args!(A, B);
tuple_key_args!(A, B, C);
tuple_key_args!(A, B, C, D);
tuple_key_args!(A, B, C, D, E);
tuple_key_args!(A, B, C, D, E, F);
tuple_key_args!(A, B, C, D, E, F, G);
tuple_key_args!(A, B, C, D, E, F, G, H);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Segment {
	Part(KeyPart),
	Mark,
	Type(KeyType),
}

/// The key of a memoized call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(HashedKey<Box<[Segment]>>);

impl CacheKey {
	fn from_segments(segments: Vec<Segment>) -> Self {
		CacheKey(HashedKey::new(segments.into_boxed_slice()))
	}
}

impl IsEnabled for CacheKey {}

/// Hasher for maps keyed by [`CacheKey`], which carry their own hash.
pub type CacheKeyHasher = BuildNoHashHasher<CacheKey>;

/// Returns a key for a call with the supplied arguments. Arguments which are
/// equal by value give equal keys, whatever their types.
pub fn hash_key<A: ToKeyArgs + ?Sized>(args: &A) -> CacheKey {
	CacheKey::from_segments(args.to_key_args().segments())
}

/// Returns a key which also records the type of every argument, so that
/// e.g. `1` and `1.0` give different keys.
pub fn typed_key<A: ToKeyArgs + ?Sized>(args: &A) -> CacheKey {
	let args = args.to_key_args();

	let mut segments = args.segments();
	segments.extend(args.types());

	CacheKey::from_segments(segments)
}

/// Returns a key for a method call. The receiver never takes part in the
/// key, only the remaining arguments.
pub fn method_key<A: ToKeyArgs + ?Sized>(args: &A) -> CacheKey {
	hash_key(args)
}
