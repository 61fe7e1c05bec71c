// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: mod.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025

//! Registry definitions for hash algorithms: descriptors, default config
//! factories, named config profiles and compute dispatch.

pub mod blake;
pub mod crc;
pub mod digests;
pub mod fnv;
pub mod kdf;
pub mod value;
pub mod xxhash;

use crate::hsc::config::HashConfig;
use std::borrow::Cow;
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

pub use value::HashValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum AlgorithmCategory {
	Cryptographic,
	Noncryptographic,
}

impl fmt::Display for AlgorithmCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			AlgorithmCategory::Cryptographic => "Cryptographic",
			AlgorithmCategory::Noncryptographic => "Non-Cryptographic",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
	pub name: &'static str,
	pub category: AlgorithmCategory,
}

impl AlgorithmDescriptor {
	pub const fn cryptographic(name: &'static str) -> Self {
		Self {
			name,
			category: AlgorithmCategory::Cryptographic,
		}
	}

	pub const fn noncryptographic(name: &'static str) -> Self {
		Self {
			name,
			category: AlgorithmCategory::Noncryptographic,
		}
	}
}

pub type ConfigFactory = fn() -> Box<dyn HashConfig>;

pub type ComputeFn =
	fn(&dyn HashConfig, &[u8]) -> Result<HashValue, ComputeError>;

/// A named, pre-built configuration template.
#[derive(Debug, Clone, Copy)]
pub struct ConfigProfile {
	pub name: &'static str,
	pub description: Option<&'static str>,
	pub create: ConfigFactory,
}

impl ConfigProfile {
	pub const fn new(
		name: &'static str,
		description: &'static str,
		create: ConfigFactory,
	) -> Self {
		Self {
			name,
			description: Some(description),
			create,
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct HashAlgorithm {
	pub descriptor: AlgorithmDescriptor,
	pub default_config: ConfigFactory,
	pub profiles: &'static [ConfigProfile],
	pub compute: ComputeFn,
}

impl HashAlgorithm {
	pub const fn new(
		descriptor: AlgorithmDescriptor,
		default_config: ConfigFactory,
		profiles: &'static [ConfigProfile],
		compute: ComputeFn,
	) -> Self {
		Self {
			descriptor,
			default_config,
			profiles,
			compute,
		}
	}

	pub fn name(&self) -> &'static str {
		self.descriptor.name
	}

	pub fn category(&self) -> AlgorithmCategory {
		self.descriptor.category
	}

	pub fn profiles(&self) -> &'static [ConfigProfile] {
		self.profiles
	}

	pub fn default_config(&self) -> Box<dyn HashConfig> {
		(self.default_config)()
	}

	pub fn find_profile(
		&self,
		name: &str,
	) -> Option<&'static ConfigProfile> {
		self.profiles
			.iter()
			.find(|profile| profile.name.eq_ignore_ascii_case(name))
	}

	pub fn compute(
		&self,
		config: &dyn HashConfig,
		data: &[u8],
	) -> Result<HashValue, ComputeError> {
		(self.compute)(config, data)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeErrorKind {
	UnsupportedParameter,
	ConfigMismatch,
	OutOfRange,
	Backend,
}

#[derive(Debug)]
pub struct ComputeError {
	kind: ComputeErrorKind,
	message: Cow<'static, str>,
}

impl ComputeError {
	pub fn new(
		kind: ComputeErrorKind,
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
		Self::new(ComputeErrorKind::UnsupportedParameter, message)
	}

	pub fn backend(
		algorithm: &str,
		err: impl fmt::Display,
	) -> Self {
		Self::new(
			ComputeErrorKind::Backend,
			format!("{} backend error: {}", algorithm, err),
		)
	}

	pub fn kind(&self) -> ComputeErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		self.message.as_ref()
	}
}

impl fmt::Display for ComputeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.message)
	}
}

impl std::error::Error for ComputeError {}

/// Downcasts `config` to the concrete type an algorithm was built for.
pub(crate) fn config_as<'a, T: 'static>(
	config: &'a dyn HashConfig,
	algorithm: &str,
) -> Result<&'a T, ComputeError> {
	config.as_any().downcast_ref::<T>().ok_or_else(|| {
		ComputeError::new(
			ComputeErrorKind::ConfigMismatch,
			format!("config {:?} does not belong to {}", config, algorithm),
		)
	})
}

/// Validates a `HashSizeInBits` value against the sizes an algorithm offers.
pub(crate) fn require_size(
	algorithm: &str,
	bits: i32,
	supported: &[i32],
) -> Result<i32, ComputeError> {
	if supported.contains(&bits) {
		return Ok(bits);
	}
	let listed = supported
		.iter()
		.map(|s| s.to_string())
		.collect::<Vec<_>>()
		.join(", ");
	Err(ComputeError::unsupported(format!(
		"{} does not support a hash size of {} bits (supported: {})",
		algorithm, bits, listed
	)))
}

/// Every registered algorithm, grouped by category in declaration order.
pub fn algorithms() -> impl Iterator<Item = &'static HashAlgorithm> {
	AlgorithmCategory::iter().flat_map(algorithms_in)
}

pub fn algorithms_in(
	category: AlgorithmCategory,
) -> impl Iterator<Item = &'static HashAlgorithm> {
	digests::catalog()
		.iter()
		.chain(blake::catalog().iter())
		.chain(kdf::catalog().iter())
		.chain(crc::catalog().iter())
		.chain(xxhash::catalog().iter())
		.chain(fnv::catalog().iter())
		.filter(move |alg| alg.category() == category)
}

pub fn descriptors() -> Vec<AlgorithmDescriptor> {
	algorithms().map(|alg| alg.descriptor).collect()
}

pub fn find_algorithm(name: &str) -> Option<&'static HashAlgorithm> {
	algorithms().find(|alg| alg.name().eq_ignore_ascii_case(name))
}
