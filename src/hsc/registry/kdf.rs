// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: kdf.rs
// Author: hashscript maintainers

//! Argon2id as a configurable hash: password bytes in, raw tag out.

use super::{
	config_as, AlgorithmDescriptor, ComputeError, ConfigProfile,
	HashAlgorithm, HashValue,
};
use crate::hsc::config::{impl_hash_config, HashConfig};

const DEFAULT_SALT: &[u8] = b"hashscript-salt!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argon2idConfig {
	pub iterations: u32,
	pub memory_size: u32,
	pub degree_of_parallelism: u32,
	pub hash_size_in_bits: i32,
	pub salt: Vec<u8>,
	pub secret: Vec<u8>,
}

impl_hash_config!(Argon2idConfig {
	iterations: u32 => "Iterations",
	memory_size: u32 => "MemorySize",
	degree_of_parallelism: u32 => "DegreeOfParallelism",
	hash_size_in_bits: i32 => "HashSizeInBits",
	salt: Vec<u8> => "Salt",
	secret: Vec<u8> => "Secret",
});

impl Default for Argon2idConfig {
	fn default() -> Self {
		Self {
			iterations: 3,
			memory_size: 4096,
			degree_of_parallelism: 1,
			hash_size_in_bits: 256,
			salt: DEFAULT_SALT.to_vec(),
			secret: Vec::new(),
		}
	}
}

fn argon2id_config() -> Box<dyn HashConfig> {
	Box::new(Argon2idConfig::default())
}

fn owasp() -> Box<dyn HashConfig> {
	Box::new(Argon2idConfig {
		iterations: 2,
		memory_size: 19_456,
		degree_of_parallelism: 1,
		..Argon2idConfig::default()
	})
}

fn rfc9106_low_memory() -> Box<dyn HashConfig> {
	Box::new(Argon2idConfig {
		iterations: 3,
		memory_size: 65_536,
		degree_of_parallelism: 4,
		..Argon2idConfig::default()
	})
}

const ARGON2ID_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new(
		"OWASP",
		"OWASP Password Storage Cheat Sheet: m=19 MiB, t=2, p=1",
		owasp,
	),
	ConfigProfile::new(
		"RFC9106LowMemory",
		"RFC 9106 second recommended option: m=64 MiB, t=3, p=4",
		rfc9106_low_memory,
	),
];

fn compute_argon2id(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<Argon2idConfig>(config, "Argon2id")?;
	if config.hash_size_in_bits <= 0 || config.hash_size_in_bits % 8 != 0 {
		return Err(ComputeError::unsupported(format!(
			"Argon2id requires HashSizeInBits to be a positive multiple of 8 (got {})",
			config.hash_size_in_bits
		)));
	}
	let len = (config.hash_size_in_bits / 8) as usize;
	let params = argon2::Params::new(
		config.memory_size,
		config.iterations,
		config.degree_of_parallelism,
		Some(len),
	)
	.map_err(|err| ComputeError::unsupported(format!("Argon2id: {}", err)))?;
	let argon2 = argon2::Argon2::new_with_secret(
		&config.secret,
		argon2::Algorithm::Argon2id,
		argon2::Version::V0x13,
		params,
	)
	.map_err(|err| ComputeError::unsupported(format!("Argon2id: {}", err)))?;
	let mut out = vec![0u8; len];
	argon2
		.hash_password_into(data, &config.salt, &mut out)
		.map_err(|err| ComputeError::backend("Argon2id", err))?;
	Ok(HashValue::from_bytes(out))
}

pub fn catalog() -> &'static [HashAlgorithm] {
	const ALGORITHMS: &[HashAlgorithm] = &[HashAlgorithm::new(
		AlgorithmDescriptor::cryptographic("Argon2id"),
		argon2id_config,
		ARGON2ID_PROFILES,
		compute_argon2id,
	)];
	ALGORITHMS
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cheap() -> Argon2idConfig {
		Argon2idConfig {
			iterations: 1,
			memory_size: 64,
			..Argon2idConfig::default()
		}
	}

	#[test]
	fn output_length_follows_hash_size() {
		let mut config = cheap();
		config.hash_size_in_bits = 128;
		let value = compute_argon2id(&config, b"password").unwrap();
		assert_eq!(value.as_bytes().len(), 16);
	}

	#[test]
	fn secret_changes_the_tag() {
		let plain = compute_argon2id(&cheap(), b"password").unwrap();
		let mut keyed = cheap();
		keyed.secret = b"pepper".to_vec();
		let keyed = compute_argon2id(&keyed, b"password").unwrap();
		assert_ne!(plain, keyed);
	}

	#[test]
	fn short_salt_is_rejected() {
		let mut config = cheap();
		config.salt = vec![1, 2, 3];
		assert!(compute_argon2id(&config, b"password").is_err());
	}
}
