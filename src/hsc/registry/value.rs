// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: value.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Digest value returned by every algorithm and its script surface.
//!
//! Bits are addressed least-significant first within each byte, so bit `i`
//! lives in `hash[i / 8] >> (i % 8)`. Integer views read the bytes as
//! little-endian.

use super::{ComputeError, ComputeErrorKind};
use crate::hsc::script::{
	OperationSignature, ParamKind, ScriptError, ScriptSurface,
};
use num_bigint::BigUint;
use rhai::{Array, Dynamic, INT};
use std::fmt;

/// Widest value `Coerce` will build.
pub const MAX_COERCE_BITS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashValue {
	hash: Vec<u8>,
	bit_length: usize,
}

impl HashValue {
	pub fn new(hash: Vec<u8>, bit_length: usize) -> Self {
		Self { hash, bit_length }
	}

	pub fn from_bytes(hash: Vec<u8>) -> Self {
		let bit_length = hash.len() * 8;
		Self { hash, bit_length }
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.hash
	}

	pub fn bit_length(&self) -> usize {
		self.bit_length
	}

	pub fn to_hex(&self, uppercase: bool) -> String {
		if uppercase {
			hex::encode_upper(&self.hash)
		} else {
			hex::encode(&self.hash)
		}
	}

	pub fn to_base64(&self, url_safe: bool) -> String {
		if url_safe {
			base64::encode_config(&self.hash, base64::URL_SAFE)
		} else {
			base64::encode(&self.hash)
		}
	}

	pub fn to_binary_string(&self) -> String {
		self.hash.iter().map(|b| format!("{:08b}", b)).collect()
	}

	pub fn bits(&self) -> Vec<bool> {
		(0..self.bit_length).map(|i| self.bit(i)).collect()
	}

	pub fn to_i32(&self) -> i32 {
		let mut buf = [0u8; 4];
		let n = self.hash.len().min(buf.len());
		buf[..n].copy_from_slice(&self.hash[..n]);
		i32::from_le_bytes(buf)
	}

	pub fn to_i64(&self) -> i64 {
		let mut buf = [0u8; 8];
		let n = self.hash.len().min(buf.len());
		buf[..n].copy_from_slice(&self.hash[..n]);
		i64::from_le_bytes(buf)
	}

	/// Unsigned little-endian reading of the whole digest, in decimal.
	pub fn to_big_integer(&self) -> String {
		BigUint::from_bytes_le(&self.hash).to_string()
	}

	/// Truncates to, or zero-extends to, `bit_length` bits.
	pub fn coerce(&self, bit_length: usize) -> Result<HashValue, ComputeError> {
		if bit_length == 0 {
			return Err(out_of_range("Coerce requires a positive bit length"));
		}
		if bit_length > MAX_COERCE_BITS {
			return Err(out_of_range(format!(
				"cannot coerce to {} bits, the limit is {}",
				bit_length, MAX_COERCE_BITS
			)));
		}
		let bits = (0..bit_length)
			.map(|i| i < self.bit_length && self.bit(i))
			.collect::<Vec<_>>();
		Ok(Self::from_bits(&bits))
	}

	/// `bit_length` bits starting at bit `offset`.
	pub fn slice(
		&self,
		bit_length: usize,
		offset: usize,
	) -> Result<HashValue, ComputeError> {
		let end = offset.checked_add(bit_length).unwrap_or(usize::MAX);
		if bit_length == 0 || end > self.bit_length {
			return Err(out_of_range(format!(
				"cannot slice {} bit(s) at offset {} from a {}-bit value",
				bit_length, offset, self.bit_length
			)));
		}
		let bits = (offset..end).map(|i| self.bit(i)).collect::<Vec<_>>();
		Ok(Self::from_bits(&bits))
	}

	fn bit(&self, index: usize) -> bool {
		(self.hash[index / 8] >> (index % 8)) & 1 == 1
	}

	fn from_bits(bits: &[bool]) -> Self {
		let mut hash = vec![0u8; (bits.len() + 7) / 8];
		for (i, bit) in bits.iter().enumerate() {
			if *bit {
				hash[i / 8] |= 1 << (i % 8);
			}
		}
		Self::new(hash, bits.len())
	}
}

fn out_of_range(message: impl Into<std::borrow::Cow<'static, str>>) -> ComputeError {
	ComputeError::new(ComputeErrorKind::OutOfRange, message)
}

impl fmt::Display for HashValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex(false))
	}
}

const OPERATIONS: &[OperationSignature] = &[
	OperationSignature::new("AsByteArray", &[]),
	OperationSignature::new("AsHexString", &[]),
	OperationSignature::new("AsHexString", &[ParamKind::Bool]),
	OperationSignature::new("AsBase64String", &[]),
	OperationSignature::new("AsBase64String", &[ParamKind::Bool]),
	OperationSignature::new("AsBinaryString", &[]),
	OperationSignature::new("AsBitArray", &[]),
	OperationSignature::new("AsInt32", &[]),
	OperationSignature::new("AsInt64", &[]),
	OperationSignature::new("AsBigInteger", &[]),
	OperationSignature::new("Coerce", &[ParamKind::Int]),
	OperationSignature::new("Slice", &[ParamKind::Int]),
	OperationSignature::new("Slice", &[ParamKind::Int, ParamKind::Int]),
];

fn int_arg(args: &[Dynamic], idx: usize) -> Result<usize, ScriptError> {
	let raw = args
		.get(idx)
		.and_then(|arg| arg.as_int().ok())
		.ok_or_else(|| ScriptError::runtime("expected an integer argument"))?;
	usize::try_from(raw).map_err(|_| {
		ScriptError::runtime(format!("argument must not be negative: {}", raw))
	})
}

fn bool_arg(args: &[Dynamic], idx: usize) -> Result<bool, ScriptError> {
	args.get(idx)
		.and_then(|arg| arg.as_bool().ok())
		.ok_or_else(|| ScriptError::runtime("expected a boolean argument"))
}

impl ScriptSurface for HashValue {
	fn fields(&self) -> Vec<(&'static str, Dynamic)> {
		vec![
			("Hash", Dynamic::from(self.hash.clone())),
			("BitLength", Dynamic::from(self.bit_length as INT)),
		]
	}

	fn operations(&self) -> &'static [OperationSignature] {
		OPERATIONS
	}

	fn invoke(
		&self,
		operation: &OperationSignature,
		args: &[Dynamic],
	) -> Result<Dynamic, ScriptError> {
		let value = match (operation.name, operation.arity()) {
			("AsByteArray", 0) => Dynamic::from(self.hash.clone()),
			("AsHexString", 0) => self.to_hex(false).into(),
			("AsHexString", 1) => self.to_hex(bool_arg(args, 0)?).into(),
			("AsBase64String", 0) => self.to_base64(false).into(),
			("AsBase64String", 1) => {
				self.to_base64(bool_arg(args, 0)?).into()
			}
			("AsBinaryString", 0) => self.to_binary_string().into(),
			("AsBitArray", 0) => Dynamic::from(
				self.bits().into_iter().map(Dynamic::from).collect::<Array>(),
			),
			("AsInt32", 0) => Dynamic::from(self.to_i32() as INT),
			("AsInt64", 0) => Dynamic::from(self.to_i64() as INT),
			("AsBigInteger", 0) => self.to_big_integer().into(),
			("Coerce", 1) => self
				.coerce(int_arg(args, 0)?)
				.map(Dynamic::from)
				.map_err(|e| ScriptError::runtime(e.to_string()))?,
			("Slice", 1) => self
				.slice(int_arg(args, 0)?, 0)
				.map(Dynamic::from)
				.map_err(|e| ScriptError::runtime(e.to_string()))?,
			("Slice", 2) => self
				.slice(int_arg(args, 0)?, int_arg(args, 1)?)
				.map(Dynamic::from)
				.map_err(|e| ScriptError::runtime(e.to_string()))?,
			_ => {
				return Err(ScriptError::runtime(format!(
					"HashValue has no operation {}",
					operation
				)))
			}
		};
		Ok(value)
	}
}
