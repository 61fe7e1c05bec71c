// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: crc.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Fully parametric CRC over widths of 1 to 64 bits.
//!
//! Parameters follow the Rocksoft model used by the CRC catalogue: the
//! initial value is applied to the unreflected register, `ReflectIn`
//! mirrors each input byte and `ReflectOut` mirrors the register before
//! the final XOR. The checksum is emitted little-endian in `ceil(Bits / 8)`
//! bytes.

use super::{
	config_as, AlgorithmDescriptor, ComputeError, ConfigProfile,
	HashAlgorithm, HashValue,
};
use crate::hsc::config::{impl_hash_config, HashConfig};
use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrcConfig {
	pub bits: i32,
	pub polynomial: BigInt,
	pub initial_value: BigInt,
	pub reflect_in: bool,
	pub reflect_out: bool,
	pub xor_out: BigInt,
}

impl_hash_config!(CrcConfig {
	bits: i32 => "Bits",
	polynomial: BigInt => "Polynomial",
	initial_value: BigInt => "InitialValue",
	reflect_in: bool => "ReflectIn",
	reflect_out: bool => "ReflectOut",
	xor_out: BigInt => "XOrOut",
});

impl CrcConfig {
	pub fn new(
		bits: i32,
		polynomial: u64,
		initial_value: u64,
		reflect_in: bool,
		reflect_out: bool,
		xor_out: u64,
	) -> Self {
		Self {
			bits,
			polynomial: BigInt::from(polynomial),
			initial_value: BigInt::from(initial_value),
			reflect_in,
			reflect_out,
			xor_out: BigInt::from(xor_out),
		}
	}
}

/// Parameters narrowed to machine words and validated against the width.
#[derive(Debug, Clone, Copy)]
struct CrcParams {
	width: u32,
	poly: u64,
	init: u64,
	reflect_in: bool,
	reflect_out: bool,
	xor_out: u64,
}

impl CrcParams {
	fn from_config(config: &CrcConfig) -> Result<Self, ComputeError> {
		if !(1..=64).contains(&config.bits) {
			return Err(ComputeError::unsupported(format!(
				"CRC width must be between 1 and 64 bits (got {})",
				config.bits
			)));
		}
		let width = config.bits as u32;
		let mask = width_mask(width);
		let narrow = |field: &str, value: &BigInt| -> Result<u64, ComputeError> {
			u64::try_from(value)
				.ok()
				.filter(|v| *v <= mask)
				.ok_or_else(|| {
					ComputeError::unsupported(format!(
						"CRC {} {} does not fit in {} bits",
						field, value, width
					))
				})
		};
		Ok(Self {
			width,
			poly: narrow("Polynomial", &config.polynomial)?,
			init: narrow("InitialValue", &config.initial_value)?,
			reflect_in: config.reflect_in,
			reflect_out: config.reflect_out,
			xor_out: narrow("XOrOut", &config.xor_out)?,
		})
	}

	fn checksum(&self, data: &[u8]) -> u64 {
		let mask = width_mask(self.width);
		let top = 1u64 << (self.width - 1);
		let mut crc = self.init;
		for &byte in data {
			let byte = if self.reflect_in {
				byte.reverse_bits()
			} else {
				byte
			};
			for shift in (0..8).rev() {
				let bit = (byte >> shift) & 1 == 1;
				let carry = crc & top != 0;
				crc = (crc << 1) & mask;
				if bit != carry {
					crc ^= self.poly;
				}
			}
		}
		if self.reflect_out {
			crc = crc.reverse_bits() >> (64 - self.width);
		}
		(crc ^ self.xor_out) & mask
	}
}

fn width_mask(width: u32) -> u64 {
	if width >= 64 {
		u64::MAX
	} else {
		(1u64 << width) - 1
	}
}

fn compute_crc(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<CrcConfig>(config, "CRC")?;
	let params = CrcParams::from_config(config)?;
	let checksum = params.checksum(data);
	let len = ((params.width + 7) / 8) as usize;
	let bytes = checksum.to_le_bytes()[..len].to_vec();
	Ok(HashValue::new(bytes, params.width as usize))
}

fn crc8() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(8, 0x07, 0x00, false, false, 0x00))
}

fn crc16() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(16, 0x8005, 0x0000, true, true, 0x0000))
}

fn crc16_ccitt_false() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(16, 0x1021, 0xffff, false, false, 0x0000))
}

fn crc32() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(
		32,
		0x04c1_1db7,
		0xffff_ffff,
		true,
		true,
		0xffff_ffff,
	))
}

fn crc32c() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(
		32,
		0x1edc_6f41,
		0xffff_ffff,
		true,
		true,
		0xffff_ffff,
	))
}

fn crc64() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(
		64,
		0x42f0_e1eb_a9ea_3693,
		0,
		false,
		false,
		0,
	))
}

fn crc64_xz() -> Box<dyn HashConfig> {
	Box::new(CrcConfig::new(
		64,
		0x42f0_e1eb_a9ea_3693,
		u64::MAX,
		true,
		true,
		u64::MAX,
	))
}

const CRC_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("CRC8", "CRC-8/SMBUS", crc8),
	ConfigProfile::new("CRC16", "CRC-16/ARC", crc16),
	ConfigProfile::new(
		"CRC16CCITTFALSE",
		"CRC-16/CCITT-FALSE (IBM-3740)",
		crc16_ccitt_false,
	),
	ConfigProfile::new("CRC32", "CRC-32/ISO-HDLC (zlib, PNG)", crc32),
	ConfigProfile::new("CRC32C", "CRC-32C (Castagnoli, iSCSI)", crc32c),
	ConfigProfile::new("CRC64", "CRC-64/ECMA-182", crc64),
	ConfigProfile::new("CRC64XZ", "CRC-64/XZ", crc64_xz),
];

pub fn catalog() -> &'static [HashAlgorithm] {
	const ALGORITHMS: &[HashAlgorithm] = &[HashAlgorithm::new(
		AlgorithmDescriptor::noncryptographic("CRC"),
		crc32,
		CRC_PROFILES,
		compute_crc,
	)];
	ALGORITHMS
}
