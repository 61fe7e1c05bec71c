// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// Module: config (typed algorithm configuration)
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Typed configuration model shared by the algorithm registry and the JSON
//! override builder. Every configurable field has a [`FieldKind`] drawn from
//! a closed set, and every value written into a config travels as a
//! [`FieldValue`] of the same kind.

pub mod builder;
pub mod coerce;

use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;

pub use builder::{
	BuildError, ConfigCatalog, ConfigEntry, ConfigError, Provenance,
};
pub use coerce::{coerce, CoercionError};

/// Semantic type of a configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
	Bool,
	String,
	BigInt,
	I8,
	U8,
	I16,
	U16,
	I32,
	U32,
	I64,
	U64,
	F32,
	F64,
	Decimal,
	Array(Box<FieldKind>),
}

impl FieldKind {
	pub fn is_numeric(&self) -> bool {
		!matches!(
			self,
			FieldKind::Bool
				| FieldKind::String
				| FieldKind::BigInt
				| FieldKind::Array(_)
		)
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldKind::Bool => f.write_str("bool"),
			FieldKind::String => f.write_str("string"),
			FieldKind::BigInt => f.write_str("bigint"),
			FieldKind::I8 => f.write_str("i8"),
			FieldKind::U8 => f.write_str("u8"),
			FieldKind::I16 => f.write_str("i16"),
			FieldKind::U16 => f.write_str("u16"),
			FieldKind::I32 => f.write_str("i32"),
			FieldKind::U32 => f.write_str("u32"),
			FieldKind::I64 => f.write_str("i64"),
			FieldKind::U64 => f.write_str("u64"),
			FieldKind::F32 => f.write_str("f32"),
			FieldKind::F64 => f.write_str("f64"),
			FieldKind::Decimal => f.write_str("decimal"),
			FieldKind::Array(element) => write!(f, "{}[]", element),
		}
	}
}

/// A value of one of the supported field kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	Bool(bool),
	String(String),
	BigInt(BigInt),
	I8(i8),
	U8(u8),
	I16(i16),
	U16(u16),
	I32(i32),
	U32(u32),
	I64(i64),
	U64(u64),
	F32(f32),
	F64(f64),
	Decimal(Decimal),
	Array(Vec<FieldValue>),
}

impl fmt::Display for FieldValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldValue::Bool(v) => write!(f, "{}", v),
			FieldValue::String(v) => write!(f, "\"{}\"", v),
			FieldValue::BigInt(v) => write!(f, "{}", v),
			FieldValue::I8(v) => write!(f, "{}", v),
			FieldValue::U8(v) => write!(f, "{}", v),
			FieldValue::I16(v) => write!(f, "{}", v),
			FieldValue::U16(v) => write!(f, "{}", v),
			FieldValue::I32(v) => write!(f, "{}", v),
			FieldValue::U32(v) => write!(f, "{}", v),
			FieldValue::I64(v) => write!(f, "{}", v),
			FieldValue::U64(v) => write!(f, "{}", v),
			FieldValue::F32(v) => write!(f, "{}", v),
			FieldValue::F64(v) => write!(f, "{}", v),
			FieldValue::Decimal(v) => write!(f, "{}", v),
			FieldValue::Array(items) => {
				f.write_str("[")?;
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}", item)?;
				}
				f.write_str("]")
			}
		}
	}
}

/// Maps a Rust field type onto its [`FieldKind`] and converts between the
/// native value and its [`FieldValue`] form.
pub trait FieldType: Sized {
	fn kind() -> FieldKind;
	fn from_value(value: FieldValue) -> Option<Self>;
	fn into_value(self) -> FieldValue;
}

macro_rules! scalar_field_type {
	($ty:ty, $variant:ident) => {
		impl FieldType for $ty {
			fn kind() -> FieldKind {
				FieldKind::$variant
			}

			fn from_value(value: FieldValue) -> Option<Self> {
				match value {
					FieldValue::$variant(v) => Some(v),
					_ => None,
				}
			}

			fn into_value(self) -> FieldValue {
				FieldValue::$variant(self)
			}
		}
	};
}

scalar_field_type!(bool, Bool);
scalar_field_type!(String, String);
scalar_field_type!(BigInt, BigInt);
scalar_field_type!(i8, I8);
scalar_field_type!(u8, U8);
scalar_field_type!(i16, I16);
scalar_field_type!(u16, U16);
scalar_field_type!(i32, I32);
scalar_field_type!(u32, U32);
scalar_field_type!(i64, I64);
scalar_field_type!(u64, U64);
scalar_field_type!(f32, F32);
scalar_field_type!(f64, F64);
scalar_field_type!(Decimal, Decimal);

impl<T: FieldType> FieldType for Vec<T> {
	fn kind() -> FieldKind {
		FieldKind::Array(Box::new(T::kind()))
	}

	fn from_value(value: FieldValue) -> Option<Self> {
		match value {
			FieldValue::Array(items) => {
				items.into_iter().map(T::from_value).collect()
			}
			_ => None,
		}
	}

	fn into_value(self) -> FieldValue {
		FieldValue::Array(
			self.into_iter().map(T::into_value).collect(),
		)
	}
}

/// One entry of a config's field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
	pub name: &'static str,
	pub kind: FieldKind,
	pub writable: bool,
}

impl FieldSpec {
	pub fn writable(name: &'static str, kind: FieldKind) -> Self {
		Self {
			name,
			kind,
			writable: true,
		}
	}

	pub fn readonly(name: &'static str, kind: FieldKind) -> Self {
		Self {
			name,
			kind,
			writable: false,
		}
	}
}

/// Configuration object of a single hash algorithm.
///
/// Field names are matched case-insensitively. `set_field` only accepts
/// writable fields and values of the declared kind.
pub trait HashConfig: fmt::Debug {
	fn fields(&self) -> Vec<FieldSpec>;
	fn get_field(&self, name: &str) -> Option<FieldValue>;
	fn set_field(
		&mut self,
		name: &str,
		value: FieldValue,
	) -> Result<(), CoercionError>;
	fn clone_config(&self) -> Box<dyn HashConfig>;
	fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn HashConfig> {
	fn clone(&self) -> Self {
		self.clone_config()
	}
}

pub fn writable_field(
	config: &dyn HashConfig,
	name: &str,
) -> Option<FieldSpec> {
	config
		.fields()
		.into_iter()
		.find(|spec| spec.writable && spec.name.eq_ignore_ascii_case(name))
}

/// Implements [`HashConfig`] for a `Clone + Debug` struct from a list of
/// writable fields and an optional list of computed read-only fields.
macro_rules! impl_hash_config {
	(
		$config:ty {
			$($field:ident: $ty:ty => $label:literal),* $(,)?
		}
		$(readonly {
			$($rlabel:literal: $rty:ty => $rget:expr),* $(,)?
		})?
	) => {
		impl $crate::hsc::config::HashConfig for $config {
			fn fields(&self) -> Vec<$crate::hsc::config::FieldSpec> {
				#[allow(unused_imports)]
				use $crate::hsc::config::FieldType;
				vec![
					$($crate::hsc::config::FieldSpec::writable(
						$label,
						<$ty as FieldType>::kind(),
					),)*
					$($($crate::hsc::config::FieldSpec::readonly(
						$rlabel,
						<$rty as FieldType>::kind(),
					),)*)?
				]
			}

			fn get_field(
				&self,
				name: &str,
			) -> Option<$crate::hsc::config::FieldValue> {
				#[allow(unused_imports)]
				use $crate::hsc::config::FieldType;
				$(if name.eq_ignore_ascii_case($label) {
					return Some(self.$field.clone().into_value());
				})*
				$($(if name.eq_ignore_ascii_case($rlabel) {
					let get: fn(&Self) -> $rty = $rget;
					return Some(get(self).into_value());
				})*)?
				None
			}

			fn set_field(
				&mut self,
				name: &str,
				value: $crate::hsc::config::FieldValue,
			) -> Result<(), $crate::hsc::config::CoercionError> {
				#[allow(unused_imports)]
				use $crate::hsc::config::FieldType;
				$(if name.eq_ignore_ascii_case($label) {
					self.$field = <$ty as FieldType>::from_value(value)
						.ok_or_else(|| {
							$crate::hsc::config::CoercionError::Mismatch {
								expected: <$ty as FieldType>::kind(),
								found: "field value",
							}
						})?;
					return Ok(());
				})*
				let _ = value;
				Err($crate::hsc::config::CoercionError::UnknownField {
					name: name.to_string(),
				})
			}

			fn clone_config(
				&self,
			) -> Box<dyn $crate::hsc::config::HashConfig> {
				Box::new(self.clone())
			}

			fn as_any(&self) -> &dyn std::any::Any {
				self
			}
		}
	};
}

pub(crate) use impl_hash_config;
