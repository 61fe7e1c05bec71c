// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: coerce.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Conversion of JSON values into typed configuration values.
//!
//! The pairing of JSON type and [`FieldKind`] is closed:
//!
//! | JSON    | accepted kinds                                   |
//! |---------|--------------------------------------------------|
//! | boolean | `bool`                                           |
//! | string  | `string`, `bigint` (decimal text)                |
//! | number  | fixed-width integers, `f32`, `f64`, `decimal`    |
//! | array   | one-dimensional arrays of any of the above kinds |
//!
//! Numbers are checked against the exact literal from the document: a
//! value that overflows the target, or whose fractional part would be
//! dropped, is rejected instead of being truncated.

use super::{FieldKind, FieldValue};
use num_bigint::BigInt;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
	Mismatch {
		expected: FieldKind,
		found: &'static str,
	},
	OutOfRange {
		expected: FieldKind,
		literal: String,
	},
	Fractional {
		expected: FieldKind,
		literal: String,
	},
	InvalidLiteral {
		expected: FieldKind,
		literal: String,
	},
	NestedArray {
		expected: FieldKind,
	},
	Element {
		index: usize,
		source: Box<CoercionError>,
	},
	UnknownField {
		name: String,
	},
}

impl fmt::Display for CoercionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CoercionError::Mismatch { expected, found } => {
				write!(f, "expected {}, found {}", expected, found)
			}
			CoercionError::OutOfRange { expected, literal } => write!(
				f,
				"{} is out of range for {}",
				literal, expected
			),
			CoercionError::Fractional { expected, literal } => write!(
				f,
				"{} would lose its fractional part as {}",
				literal, expected
			),
			CoercionError::InvalidLiteral { expected, literal } => {
				write!(f, "`{}` is not a valid {}", literal, expected)
			}
			CoercionError::NestedArray { expected } => write!(
				f,
				"{} is not supported, only one-dimensional arrays are",
				expected
			),
			CoercionError::Element { index, source } => {
				write!(f, "array element {}: {}", index, source)
			}
			CoercionError::UnknownField { name } => {
				write!(f, "no writable field named `{}`", name)
			}
		}
	}
}

impl std::error::Error for CoercionError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			CoercionError::Element { source, .. } => Some(source.as_ref()),
			_ => None,
		}
	}
}

/// Coerces `value` into a [`FieldValue`] of `kind`, or fails without
/// producing any value.
pub fn coerce(
	value: &Value,
	kind: &FieldKind,
) -> Result<FieldValue, CoercionError> {
	match (value, kind) {
		(Value::Bool(flag), FieldKind::Bool) => Ok(FieldValue::Bool(*flag)),
		(Value::String(text), FieldKind::String) => {
			Ok(FieldValue::String(text.clone()))
		}
		(Value::String(text), FieldKind::BigInt) => {
			parse_big_int(text).map(FieldValue::BigInt)
		}
		(Value::Number(number), kind) if kind.is_numeric() => {
			coerce_number(&number.to_string(), kind)
		}
		(Value::Array(items), FieldKind::Array(element)) => {
			coerce_array(items, element)
		}
		(other, kind) => Err(CoercionError::Mismatch {
			expected: kind.clone(),
			found: json_kind(other),
		}),
	}
}

fn coerce_array(
	items: &[Value],
	element: &FieldKind,
) -> Result<FieldValue, CoercionError> {
	if let FieldKind::Array(_) = element {
		return Err(CoercionError::NestedArray {
			expected: FieldKind::Array(Box::new(element.clone())),
		});
	}
	items
		.iter()
		.enumerate()
		.map(|(index, item)| {
			coerce(item, element).map_err(|source| {
				CoercionError::Element {
					index,
					source: Box::new(source),
				}
			})
		})
		.collect::<Result<Vec<_>, _>>()
		.map(FieldValue::Array)
}

fn coerce_number(
	literal: &str,
	kind: &FieldKind,
) -> Result<FieldValue, CoercionError> {
	match kind {
		FieldKind::I8 => narrow(literal, kind).map(FieldValue::I8),
		FieldKind::U8 => narrow(literal, kind).map(FieldValue::U8),
		FieldKind::I16 => narrow(literal, kind).map(FieldValue::I16),
		FieldKind::U16 => narrow(literal, kind).map(FieldValue::U16),
		FieldKind::I32 => narrow(literal, kind).map(FieldValue::I32),
		FieldKind::U32 => narrow(literal, kind).map(FieldValue::U32),
		FieldKind::I64 => narrow(literal, kind).map(FieldValue::I64),
		FieldKind::U64 => narrow(literal, kind).map(FieldValue::U64),
		FieldKind::F32 => {
			let value: f32 = literal
				.parse()
				.map_err(|_| invalid_literal(kind, literal))?;
			if value.is_finite() && (value != 0.0 || names_zero(literal)) {
				Ok(FieldValue::F32(value))
			} else {
				Err(out_of_range(kind, literal))
			}
		}
		FieldKind::F64 => {
			let value: f64 = literal
				.parse()
				.map_err(|_| invalid_literal(kind, literal))?;
			if value.is_finite() && (value != 0.0 || names_zero(literal)) {
				Ok(FieldValue::F64(value))
			} else {
				Err(out_of_range(kind, literal))
			}
		}
		FieldKind::Decimal => parse_decimal(literal)
			.map(FieldValue::Decimal)
			.map_err(|_| out_of_range(kind, literal)),
		other => Err(CoercionError::Mismatch {
			expected: other.clone(),
			found: "number",
		}),
	}
}

// True when the mantissa of a JSON number literal has no non-zero digit.
fn names_zero(literal: &str) -> bool {
	literal
		.split(|c: char| c == 'e' || c == 'E')
		.next()
		.unwrap_or(literal)
		.bytes()
		.all(|b| !(b'1'..=b'9').contains(&b))
}

fn narrow<T: TryFrom<i128>>(
	literal: &str,
	kind: &FieldKind,
) -> Result<T, CoercionError> {
	let value = integral_literal(literal, kind)?;
	T::try_from(value).map_err(|_| out_of_range(kind, literal))
}

// Plain integer literals parse directly; literals with a fraction or an
// exponent only pass when their value is integral.
fn integral_literal(
	literal: &str,
	kind: &FieldKind,
) -> Result<i128, CoercionError> {
	if let Ok(value) = literal.parse::<i128>() {
		return Ok(value);
	}
	let decimal =
		parse_decimal(literal).map_err(|_| out_of_range(kind, literal))?;
	if !decimal.fract().is_zero() {
		return Err(CoercionError::Fractional {
			expected: kind.clone(),
			literal: literal.to_string(),
		});
	}
	decimal.to_i128().ok_or_else(|| out_of_range(kind, literal))
}

fn parse_decimal(literal: &str) -> Result<Decimal, rust_decimal::Error> {
	if literal.contains(|c: char| c == 'e' || c == 'E') {
		Decimal::from_scientific(literal)
	} else {
		Decimal::from_str_exact(literal)
	}
}

fn parse_big_int(text: &str) -> Result<BigInt, CoercionError> {
	let trimmed = text.trim();
	let digits = trimmed
		.strip_prefix(|c: char| c == '+' || c == '-')
		.unwrap_or(trimmed);
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return Err(invalid_literal(&FieldKind::BigInt, text));
	}
	trimmed
		.parse::<BigInt>()
		.map_err(|_| invalid_literal(&FieldKind::BigInt, text))
}

fn out_of_range(kind: &FieldKind, literal: &str) -> CoercionError {
	CoercionError::OutOfRange {
		expected: kind.clone(),
		literal: literal.to_string(),
	}
}

fn invalid_literal(kind: &FieldKind, literal: &str) -> CoercionError {
	CoercionError::InvalidLiteral {
		expected: kind.clone(),
		literal: literal.to_string(),
	}
}

pub fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn number(text: &str) -> Value {
		serde_json::from_str(text).expect("valid json number")
	}

	#[test]
	fn integer_limits_round_trip_exactly() {
		assert_eq!(
			coerce(&number("255"), &FieldKind::U8),
			Ok(FieldValue::U8(255))
		);
		assert_eq!(
			coerce(&number("-128"), &FieldKind::I8),
			Ok(FieldValue::I8(-128))
		);
		assert_eq!(
			coerce(&number("18446744073709551615"), &FieldKind::U64),
			Ok(FieldValue::U64(u64::MAX))
		);
		assert_eq!(
			coerce(&number("-9223372036854775808"), &FieldKind::I64),
			Ok(FieldValue::I64(i64::MIN))
		);
	}

	#[test]
	fn overflow_yields_no_value() {
		assert!(matches!(
			coerce(&number("256"), &FieldKind::U8),
			Err(CoercionError::OutOfRange { .. })
		));
		assert!(matches!(
			coerce(&number("-1"), &FieldKind::U32),
			Err(CoercionError::OutOfRange { .. })
		));
		assert!(matches!(
			coerce(&number("18446744073709551616"), &FieldKind::U64),
			Err(CoercionError::OutOfRange { .. })
		));
		assert!(matches!(
			coerce(&number("1e300"), &FieldKind::F32),
			Err(CoercionError::OutOfRange { .. })
		));
	}

	#[test]
	fn fractional_literals_never_truncate_into_integers() {
		assert!(matches!(
			coerce(&number("1.5"), &FieldKind::I32),
			Err(CoercionError::Fractional { .. })
		));
		assert_eq!(
			coerce(&number("4.0"), &FieldKind::I32),
			Ok(FieldValue::I32(4))
		);
		assert_eq!(
			coerce(&number("1e3"), &FieldKind::U16),
			Ok(FieldValue::U16(1000))
		);
	}

	#[test]
	fn floats_and_decimals_keep_the_literal_value() {
		assert_eq!(
			coerce(&number("0.5"), &FieldKind::F32),
			Ok(FieldValue::F32(0.5))
		);
		assert_eq!(
			coerce(&number("-2.25"), &FieldKind::F64),
			Ok(FieldValue::F64(-2.25))
		);
		assert_eq!(
			coerce(&number("12.3400"), &FieldKind::Decimal),
			Ok(FieldValue::Decimal(
				Decimal::from_str_exact("12.3400").unwrap()
			))
		);
	}

	#[test]
	fn floats_that_underflow_to_zero_are_rejected() {
		assert!(matches!(
			coerce(&number("1e-50"), &FieldKind::F32),
			Err(CoercionError::OutOfRange { .. })
		));
		assert!(matches!(
			coerce(&number("-2.5e-400"), &FieldKind::F64),
			Err(CoercionError::OutOfRange { .. })
		));
		assert_eq!(
			coerce(&number("0.000e10"), &FieldKind::F32),
			Ok(FieldValue::F32(0.0))
		);
		assert_eq!(
			coerce(&number("-0"), &FieldKind::F64),
			Ok(FieldValue::F64(0.0))
		);
		assert_eq!(
			coerce(&number("1e-40"), &FieldKind::F64),
			Ok(FieldValue::F64(1e-40))
		);
	}

	#[test]
	fn strings_feed_string_and_bigint_fields_only() {
		assert_eq!(
			coerce(&json!("hello"), &FieldKind::String),
			Ok(FieldValue::String("hello".into()))
		);
		let big = "340282366920938463463374607431768211457";
		assert_eq!(
			coerce(&json!(big), &FieldKind::BigInt),
			Ok(FieldValue::BigInt(big.parse().unwrap()))
		);
		assert!(matches!(
			coerce(&json!("0x10"), &FieldKind::BigInt),
			Err(CoercionError::InvalidLiteral { .. })
		));
		assert!(matches!(
			coerce(&json!("12"), &FieldKind::I32),
			Err(CoercionError::Mismatch { found: "string", .. })
		));
	}

	#[test]
	fn booleans_only_fit_bool_fields() {
		assert_eq!(
			coerce(&json!(true), &FieldKind::Bool),
			Ok(FieldValue::Bool(true))
		);
		assert!(coerce(&json!(true), &FieldKind::I32).is_err());
		assert!(coerce(&json!(1), &FieldKind::Bool).is_err());
		assert!(coerce(&json!(null), &FieldKind::String).is_err());
	}

	#[test]
	fn arrays_are_all_or_nothing() {
		let kind = FieldKind::Array(Box::new(FieldKind::U8));
		assert_eq!(
			coerce(&json!([1, 2, 3]), &kind),
			Ok(FieldValue::Array(vec![
				FieldValue::U8(1),
				FieldValue::U8(2),
				FieldValue::U8(3)
			]))
		);
		let err = coerce(&json!([1, 2, 300, 4]), &kind).unwrap_err();
		assert!(matches!(
			err,
			CoercionError::Element { index: 2, .. }
		));
	}

	#[test]
	fn short_arrays_are_materialized() {
		let kind = FieldKind::Array(Box::new(FieldKind::String));
		assert_eq!(
			coerce(&json!(["only"]), &kind),
			Ok(FieldValue::Array(vec![FieldValue::String("only".into())]))
		);
		assert_eq!(coerce(&json!([]), &kind), Ok(FieldValue::Array(vec![])));
	}

	#[test]
	fn nested_arrays_are_rejected() {
		let kind = FieldKind::Array(Box::new(FieldKind::Array(Box::new(
			FieldKind::U8,
		))));
		assert!(matches!(
			coerce(&json!([[1]]), &kind),
			Err(CoercionError::NestedArray { .. })
		));
	}
}
