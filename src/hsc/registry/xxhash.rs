// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: xxhash.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use super::{
	config_as, require_size, AlgorithmDescriptor, ComputeError,
	ConfigProfile, HashAlgorithm, HashValue,
};
use crate::hsc::config::{impl_hash_config, HashConfig};
use xxhash_rust::{xxh32::xxh32, xxh64::xxh64};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XxHashConfig {
	pub hash_size_in_bits: i32,
	pub seed: u64,
}

impl_hash_config!(XxHashConfig {
	hash_size_in_bits: i32 => "HashSizeInBits",
	seed: u64 => "Seed",
});

fn xxh32_config() -> Box<dyn HashConfig> {
	Box::new(XxHashConfig {
		hash_size_in_bits: 32,
		seed: 0,
	})
}

fn xxh64_config() -> Box<dyn HashConfig> {
	Box::new(XxHashConfig {
		hash_size_in_bits: 64,
		seed: 0,
	})
}

const XXHASH_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("XXH32", "32-bit xxHash, seed 0", xxh32_config),
	ConfigProfile::new("XXH64", "64-bit xxHash, seed 0", xxh64_config),
];

fn compute_xxhash(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<XxHashConfig>(config, "xxHash")?;
	let bytes = match require_size("xxHash", config.hash_size_in_bits, &[32, 64])? {
		32 => {
			let seed = u32::try_from(config.seed).map_err(|_| {
				ComputeError::unsupported(format!(
					"32-bit xxHash requires a seed below 2^32 (got {})",
					config.seed
				))
			})?;
			xxh32(data, seed).to_le_bytes().to_vec()
		}
		_ => xxh64(data, config.seed).to_le_bytes().to_vec(),
	};
	Ok(HashValue::from_bytes(bytes))
}

pub fn catalog() -> &'static [HashAlgorithm] {
	const ALGORITHMS: &[HashAlgorithm] = &[HashAlgorithm::new(
		AlgorithmDescriptor::noncryptographic("xxHash"),
		xxh32_config,
		XXHASH_PROFILES,
		compute_xxhash,
	)];
	ALGORITHMS
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reference_values() {
		let value = compute_xxhash(xxh32_config().as_ref(), b"abc").unwrap();
		assert_eq!(value.as_bytes(), 0x32d1_53ff_u32.to_le_bytes());
		let value = compute_xxhash(xxh64_config().as_ref(), b"abc").unwrap();
		assert_eq!(value.as_bytes(), 0x44bc_2cf5_ad77_0999_u64.to_le_bytes());
	}

	#[test]
	fn wide_seed_needs_64_bits() {
		let config = XxHashConfig {
			hash_size_in_bits: 32,
			seed: u64::from(u32::MAX) + 1,
		};
		assert!(compute_xxhash(&config, b"abc").is_err());
	}
}
