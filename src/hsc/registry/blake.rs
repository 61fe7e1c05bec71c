// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: blake.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use super::{
	config_as, AlgorithmDescriptor, ComputeError, ConfigProfile,
	HashAlgorithm, HashValue,
};
use crate::hsc::config::{impl_hash_config, HashConfig};
use blake2::digest::{Update, VariableOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blake2bConfig {
	pub hash_size_in_bits: i32,
}

impl_hash_config!(Blake2bConfig {
	hash_size_in_bits: i32 => "HashSizeInBits",
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blake3Config {
	pub hash_size_in_bits: i32,
	pub key: Vec<u8>,
}

impl_hash_config!(Blake3Config {
	hash_size_in_bits: i32 => "HashSizeInBits",
	key: Vec<u8> => "Key",
});

fn blake2b_config() -> Box<dyn HashConfig> {
	blake2b_512()
}

fn blake2b_256() -> Box<dyn HashConfig> {
	Box::new(Blake2bConfig {
		hash_size_in_bits: 256,
	})
}

fn blake2b_512() -> Box<dyn HashConfig> {
	Box::new(Blake2bConfig {
		hash_size_in_bits: 512,
	})
}

fn blake3_config() -> Box<dyn HashConfig> {
	Box::new(Blake3Config {
		hash_size_in_bits: 256,
		key: Vec::new(),
	})
}

const BLAKE2B_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("Blake2b256", "BLAKE2b with a 256-bit digest", blake2b_256),
	ConfigProfile::new("Blake2b512", "BLAKE2b with a 512-bit digest", blake2b_512),
];

/// Output length in bytes for a bit size that must be a positive multiple
/// of eight no larger than `max_bits`.
fn output_bytes(
	algorithm: &str,
	bits: i32,
	max_bits: i32,
) -> Result<usize, ComputeError> {
	if bits <= 0 || bits % 8 != 0 || bits > max_bits {
		return Err(ComputeError::unsupported(format!(
			"{} requires HashSizeInBits to be a multiple of 8 between 8 and {} (got {})",
			algorithm, max_bits, bits
		)));
	}
	Ok((bits / 8) as usize)
}

fn compute_blake2b(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<Blake2bConfig>(config, "Blake2b")?;
	let len = output_bytes("Blake2b", config.hash_size_in_bits, 512)?;
	let mut hasher = blake2::Blake2bVar::new(len)
		.map_err(|err| ComputeError::backend("Blake2b", err))?;
	hasher.update(data);
	let mut out = vec![0u8; len];
	hasher
		.finalize_variable(&mut out)
		.map_err(|err| ComputeError::backend("Blake2b", err))?;
	Ok(HashValue::from_bytes(out))
}

fn compute_blake3(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<Blake3Config>(config, "Blake3")?;
	let len = output_bytes("Blake3", config.hash_size_in_bits, i32::MAX)?;
	let mut hasher = match config.key.len() {
		0 => blake3::Hasher::new(),
		blake3::KEY_LEN => {
			let mut fixed = [0u8; blake3::KEY_LEN];
			fixed.copy_from_slice(&config.key);
			blake3::Hasher::new_keyed(&fixed)
		}
		other => {
			return Err(ComputeError::unsupported(format!(
				"Blake3 keyed mode requires a {}-byte key (got {})",
				blake3::KEY_LEN,
				other
			)))
		}
	};
	hasher.update(data);
	let mut out = vec![0u8; len];
	hasher.finalize_xof().fill(&mut out);
	Ok(HashValue::from_bytes(out))
}

pub fn catalog() -> &'static [HashAlgorithm] {
	const ALGORITHMS: &[HashAlgorithm] = &[
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("Blake2b"),
			blake2b_config,
			BLAKE2B_PROFILES,
			compute_blake2b,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("Blake3"),
			blake3_config,
			&[],
			compute_blake3,
		),
	];
	ALGORITHMS
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	#[test]
	fn blake3_default_matches_reference() {
		let config = blake3_config();
		let value = compute_blake3(config.as_ref(), b"abc").unwrap();
		assert_eq!(
			value.as_bytes(),
			hex!("6437b3ac38465133ffb63b75273a8db548c558465d79db03fd359c6cd5bd9d85")
		);
	}

	#[test]
	fn blake3_rejects_short_keys() {
		let config = Blake3Config {
			hash_size_in_bits: 256,
			key: vec![1, 2, 3],
		};
		assert!(compute_blake3(&config, b"abc").is_err());
	}

	#[test]
	fn blake2b_sizes() {
		let config = Blake2bConfig {
			hash_size_in_bits: 160,
		};
		let value = compute_blake2b(&config, b"abc").unwrap();
		assert_eq!(value.as_bytes().len(), 20);
		let bad = Blake2bConfig {
			hash_size_in_bits: 12,
		};
		assert!(compute_blake2b(&bad, b"abc").is_err());
	}
}
