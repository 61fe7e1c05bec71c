// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: fnv.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use super::{
	config_as, require_size, AlgorithmDescriptor, ComputeError,
	ConfigProfile, HashAlgorithm, HashValue,
};
use crate::hsc::config::{impl_hash_config, HashConfig};

const FNV32_OFFSET: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;
const FNV64_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnvConfig {
	pub hash_size_in_bits: i32,
}

impl_hash_config!(FnvConfig {
	hash_size_in_bits: i32 => "HashSizeInBits",
});

fn fnv32_config() -> Box<dyn HashConfig> {
	Box::new(FnvConfig {
		hash_size_in_bits: 32,
	})
}

fn fnv64_config() -> Box<dyn HashConfig> {
	Box::new(FnvConfig {
		hash_size_in_bits: 64,
	})
}

const FNV_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("FNV1a32", "32-bit FNV-1a", fnv32_config),
	ConfigProfile::new("FNV1a64", "64-bit FNV-1a", fnv64_config),
];

fn fnv1a_32(data: &[u8]) -> u32 {
	data.iter().fold(FNV32_OFFSET, |hash, byte| {
		(hash ^ u32::from(*byte)).wrapping_mul(FNV32_PRIME)
	})
}

fn fnv1a_64(data: &[u8]) -> u64 {
	data.iter().fold(FNV64_OFFSET, |hash, byte| {
		(hash ^ u64::from(*byte)).wrapping_mul(FNV64_PRIME)
	})
}

fn compute_fnv(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<FnvConfig>(config, "FNV1a")?;
	let bytes = match require_size("FNV1a", config.hash_size_in_bits, &[32, 64])? {
		32 => fnv1a_32(data).to_le_bytes().to_vec(),
		_ => fnv1a_64(data).to_le_bytes().to_vec(),
	};
	Ok(HashValue::from_bytes(bytes))
}

pub fn catalog() -> &'static [HashAlgorithm] {
	const ALGORITHMS: &[HashAlgorithm] = &[HashAlgorithm::new(
		AlgorithmDescriptor::noncryptographic("FNV1a"),
		fnv32_config,
		FNV_PROFILES,
		compute_fnv,
	)];
	ALGORITHMS
}
