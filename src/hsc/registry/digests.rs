// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: digests.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Fixed and size-selectable message digests from the RustCrypto family.

use super::{
	config_as, require_size, AlgorithmDescriptor, ComputeError,
	ConfigProfile, HashAlgorithm, HashValue,
};
use crate::hsc::config::{impl_hash_config, HashConfig};
use digest::Digest;

/// Configuration of a digest whose output size cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDigestConfig {
	hash_size: i32,
}

impl_hash_config!(FixedDigestConfig {} readonly {
	"HashSizeInBits": i32 => |c| c.hash_size,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedDigestConfig {
	pub hash_size_in_bits: i32,
}

impl_hash_config!(SizedDigestConfig {
	hash_size_in_bits: i32 => "HashSizeInBits",
});

fn sized(bits: i32) -> Box<dyn HashConfig> {
	Box::new(SizedDigestConfig {
		hash_size_in_bits: bits,
	})
}

macro_rules! fixed_digest {
	($config_fn:ident, $compute_fn:ident, $name:literal, $bits:literal, $hasher:ty) => {
		fn $config_fn() -> Box<dyn HashConfig> {
			Box::new(FixedDigestConfig { hash_size: $bits })
		}

		fn $compute_fn(
			config: &dyn HashConfig,
			data: &[u8],
		) -> Result<HashValue, ComputeError> {
			config_as::<FixedDigestConfig>(config, $name)?;
			Ok(HashValue::from_bytes(<$hasher>::digest(data).to_vec()))
		}
	};
}

fixed_digest!(md4_config, compute_md4, "MD4", 128, md4::Md4);
fixed_digest!(md5_config, compute_md5, "MD5", 128, md5::Md5);
fixed_digest!(sha1_config, compute_sha1, "SHA1", 160, sha1::Sha1);
fixed_digest!(whirlpool_config, compute_whirlpool, "Whirlpool", 512, whirlpool::Whirlpool);
fixed_digest!(tiger_config, compute_tiger, "Tiger", 192, tiger::Tiger);
fixed_digest!(sm3_config, compute_sm3, "SM3", 256, sm3::Sm3);

macro_rules! size_profiles {
	($($fn_name:ident => $bits:literal),* $(,)?) => {
		$(fn $fn_name() -> Box<dyn HashConfig> {
			sized($bits)
		})*
	};
}

size_profiles!(
	bits_160 => 160,
	bits_224 => 224,
	bits_256 => 256,
	bits_320 => 320,
	bits_384 => 384,
	bits_512 => 512,
);

const SHA2_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("SHA224", "SHA-224 (FIPS 180-4)", bits_224),
	ConfigProfile::new("SHA256", "SHA-256 (FIPS 180-4)", bits_256),
	ConfigProfile::new("SHA384", "SHA-384 (FIPS 180-4)", bits_384),
	ConfigProfile::new("SHA512", "SHA-512 (FIPS 180-4)", bits_512),
];

const SHA3_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("SHA3-224", "SHA3-224 (FIPS 202)", bits_224),
	ConfigProfile::new("SHA3-256", "SHA3-256 (FIPS 202)", bits_256),
	ConfigProfile::new("SHA3-384", "SHA3-384 (FIPS 202)", bits_384),
	ConfigProfile::new("SHA3-512", "SHA3-512 (FIPS 202)", bits_512),
];

const RIPEMD_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("RIPEMD160", "RIPEMD-160", bits_160),
	ConfigProfile::new("RIPEMD320", "RIPEMD-320", bits_320),
];

const STREEBOG_PROFILES: &[ConfigProfile] = &[
	ConfigProfile::new("Streebog256", "GOST R 34.11-2012, 256-bit", bits_256),
	ConfigProfile::new("Streebog512", "GOST R 34.11-2012, 512-bit", bits_512),
];

fn compute_sha2(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<SizedDigestConfig>(config, "SHA2")?;
	let digest = match require_size(
		"SHA2",
		config.hash_size_in_bits,
		&[224, 256, 384, 512],
	)? {
		224 => sha2::Sha224::digest(data).to_vec(),
		256 => sha2::Sha256::digest(data).to_vec(),
		384 => sha2::Sha384::digest(data).to_vec(),
		_ => sha2::Sha512::digest(data).to_vec(),
	};
	Ok(HashValue::from_bytes(digest))
}

fn compute_sha3(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<SizedDigestConfig>(config, "SHA3")?;
	let digest = match require_size(
		"SHA3",
		config.hash_size_in_bits,
		&[224, 256, 384, 512],
	)? {
		224 => sha3::Sha3_224::digest(data).to_vec(),
		256 => sha3::Sha3_256::digest(data).to_vec(),
		384 => sha3::Sha3_384::digest(data).to_vec(),
		_ => sha3::Sha3_512::digest(data).to_vec(),
	};
	Ok(HashValue::from_bytes(digest))
}

fn compute_ripemd(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<SizedDigestConfig>(config, "RIPEMD")?;
	let digest =
		match require_size("RIPEMD", config.hash_size_in_bits, &[160, 320])? {
			160 => ripemd::Ripemd160::digest(data).to_vec(),
			_ => ripemd::Ripemd320::digest(data).to_vec(),
		};
	Ok(HashValue::from_bytes(digest))
}

fn compute_streebog(
	config: &dyn HashConfig,
	data: &[u8],
) -> Result<HashValue, ComputeError> {
	let config = config_as::<SizedDigestConfig>(config, "Streebog")?;
	let digest = match require_size(
		"Streebog",
		config.hash_size_in_bits,
		&[256, 512],
	)? {
		256 => streebog::Streebog256::digest(data).to_vec(),
		_ => streebog::Streebog512::digest(data).to_vec(),
	};
	Ok(HashValue::from_bytes(digest))
}

pub fn catalog() -> &'static [HashAlgorithm] {
	const ALGORITHMS: &[HashAlgorithm] = &[
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("MD4"),
			md4_config,
			&[],
			compute_md4,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("MD5"),
			md5_config,
			&[],
			compute_md5,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("SHA1"),
			sha1_config,
			&[],
			compute_sha1,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("SHA2"),
			bits_256,
			SHA2_PROFILES,
			compute_sha2,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("SHA3"),
			bits_256,
			SHA3_PROFILES,
			compute_sha3,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("RIPEMD"),
			bits_160,
			RIPEMD_PROFILES,
			compute_ripemd,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("Whirlpool"),
			whirlpool_config,
			&[],
			compute_whirlpool,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("Tiger"),
			tiger_config,
			&[],
			compute_tiger,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("SM3"),
			sm3_config,
			&[],
			compute_sm3,
		),
		HashAlgorithm::new(
			AlgorithmDescriptor::cryptographic("Streebog"),
			bits_512,
			STREEBOG_PROFILES,
			compute_streebog,
		),
	];
	ALGORITHMS
}

#[cfg(test)]
mod tests {
	use crate::hsc::config::FieldValue;
	use crate::hsc::registry::{find_algorithm, ComputeErrorKind};
	use hex_literal::hex;

	fn digest_of(name: &str, profile: Option<&str>, data: &[u8]) -> Vec<u8> {
		let algorithm = find_algorithm(name).unwrap();
		let config = match profile {
			Some(p) => (algorithm.find_profile(p).unwrap().create)(),
			None => algorithm.default_config(),
		};
		algorithm
			.compute(config.as_ref(), data)
			.unwrap()
			.as_bytes()
			.to_vec()
	}

	#[test]
	fn known_vectors() {
		assert_eq!(
			digest_of("MD5", None, b"abc"),
			hex!("900150983cd24fb0d6963f7d28e17f72")
		);
		assert_eq!(
			digest_of("SHA1", None, b"abc"),
			hex!("a9993e364706816aba3e25717850c26c9cd0d89d")
		);
		assert_eq!(
			digest_of("SHA2", None, b"abc"),
			hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
		);
		assert_eq!(
			digest_of("SHA3", Some("sha3-224"), b"abc"),
			hex!("e642824c3f8cf24ad09234ee7d3c766fc9a3a5168d0c94ad73b46fdf")
		);
	}

	#[test]
	fn size_field_selects_the_variant() {
		let sha2 = find_algorithm("SHA2").unwrap();
		let mut config = sha2.default_config();
		config
			.set_field("hashsizeinbits", FieldValue::I32(384))
			.unwrap();
		let value = sha2.compute(config.as_ref(), b"abc").unwrap();
		assert_eq!(value.bit_length(), 384);

		config
			.set_field("HashSizeInBits", FieldValue::I32(100))
			.unwrap();
		let err = sha2.compute(config.as_ref(), b"abc").unwrap_err();
		assert_eq!(err.kind(), ComputeErrorKind::UnsupportedParameter);
	}

	#[test]
	fn fixed_digests_expose_a_readonly_size() {
		let config = find_algorithm("Tiger").unwrap().default_config();
		assert_eq!(
			config.get_field("HashSizeInBits"),
			Some(FieldValue::I32(192))
		);
		assert!(config.fields().iter().all(|f| !f.writable));
	}
}
