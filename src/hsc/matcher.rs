// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: matcher.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Selection of the configuration an algorithm instance runs with.
//!
//! Priority, first hit wins:
//! 1. a `--config-profiles` entry for `Name:Variable` or `Name` whose
//!    profile exists for the algorithm,
//! 2. a config file entry for exactly this instance,
//! 3. a config file entry for the algorithm without an instance name,
//! 4. the algorithm's default configuration.

use crate::hsc::config::{ConfigCatalog, HashConfig};
use crate::hsc::logger;
use crate::hsc::resolver::FunctionVariable;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
	Empty,
	MalformedPair(String),
	DuplicateKey(String),
}

impl fmt::Display for QueryError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			QueryError::Empty => {
				f.write_str("config profile query must not be empty")
			}
			QueryError::MalformedPair(pair) => write!(
				f,
				"'{}' is not a Name=Profile or Name:Variable=Profile pair",
				pair
			),
			QueryError::DuplicateKey(key) => {
				write!(f, "'{}' is given more than one profile", key)
			}
		}
	}
}

impl std::error::Error for QueryError {}

/// Parsed `Name=Profile` / `Name:Variable=Profile` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileQuery {
	entries: Vec<(String, String)>,
}

impl ProfileQuery {
	pub fn parse(text: &str) -> Result<Self, QueryError> {
		let mut entries: Vec<(String, String)> = Vec::new();
		for pair in text.split_whitespace() {
			let mut parts = pair.split('=');
			let (Some(key), Some(profile), None) =
				(parts.next(), parts.next(), parts.next())
			else {
				return Err(QueryError::MalformedPair(pair.to_string()));
			};
			if key.is_empty() || profile.is_empty() {
				return Err(QueryError::MalformedPair(pair.to_string()));
			}
			if entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)) {
				return Err(QueryError::DuplicateKey(key.to_string()));
			}
			entries.push((key.to_string(), profile.to_string()));
		}
		if entries.is_empty() {
			return Err(QueryError::Empty);
		}
		Ok(Self { entries })
	}

	pub fn entries(&self) -> &[(String, String)] {
		&self.entries
	}

	fn lookup(&self, key: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, profile)| profile.as_str())
	}

	/// Profiles named for `variable`: the qualified key's first, then the
	/// bare key's.
	pub fn profiles_for(&self, variable: &FunctionVariable) -> Vec<&str> {
		let mut found = Vec::with_capacity(2);
		if variable.is_qualified() {
			found.extend(self.lookup(&variable.qualified_name()));
		}
		found.extend(self.lookup(variable.algorithm().name()));
		found
	}
}

impl FromStr for ProfileQuery {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
	Profile(&'static str),
	Instance,
	AlgorithmWide,
	Default,
}

impl fmt::Display for ConfigSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigSource::Profile(name) => write!(f, "profile {}", name),
			ConfigSource::Instance => f.write_str("instance config"),
			ConfigSource::AlgorithmWide => {
				f.write_str("algorithm-wide config")
			}
			ConfigSource::Default => f.write_str("default config"),
		}
	}
}

#[derive(Debug)]
pub struct ResolvedConfig {
	pub config: Box<dyn HashConfig>,
	pub source: ConfigSource,
}

pub fn resolve_config(
	variable: &FunctionVariable,
	profiles: Option<&ProfileQuery>,
	catalog: Option<&ConfigCatalog>,
) -> ResolvedConfig {
	let algorithm = variable.algorithm();
	let instance = catalog.and_then(|c| c.get(variable));
	let wide = catalog.and_then(|c| c.algorithm_wide(variable));

	let requested =
		profiles.map(|p| p.profiles_for(variable)).unwrap_or_default();
	for name in requested {
		let Some(profile) = algorithm.find_profile(name) else {
			logger::warning(&format!(
				"{}: no config profile named '{}', ignoring it",
				variable, name
			));
			continue;
		};
		if instance.is_some() || wide.is_some() {
			logger::warning(&format!(
				"{}: profile '{}' takes precedence over the config file entry",
				variable, profile.name
			));
		}
		return ResolvedConfig {
			config: (profile.create)(),
			source: ConfigSource::Profile(profile.name),
		};
	}

	if let Some(entry) = instance {
		return ResolvedConfig {
			config: entry.config().clone_config(),
			source: ConfigSource::Instance,
		};
	}
	if let Some(entry) = wide {
		return ResolvedConfig {
			config: entry.config().clone_config(),
			source: ConfigSource::AlgorithmWide,
		};
	}
	ResolvedConfig {
		config: algorithm.default_config(),
		source: ConfigSource::Default,
	}
}
