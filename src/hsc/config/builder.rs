// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: builder.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Builds [`ConfigEntry`] values from a JSON override document.
//!
//! ```json
//! {
//!   "CRC":      { "profile": "CRC16" },
//!   "CRC:wide": { "config": { "Bits": 64, "Polynomial": "4823603603198064275" } }
//! }
//! ```
//!
//! Keys use the algorithm query syntax; the first algorithm a key resolves
//! to receives the entry. A body must hold exactly one of `profile` or
//! `config`. Problems with a single key are collected as [`BuildError`]s
//! and the key is skipped; only an unreadable document is a
//! [`ConfigError`].

use super::{coerce, writable_field, CoercionError, FieldValue, HashConfig};
use crate::hsc::resolver::{resolve_first, FunctionVariable};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const PROFILE_PROPERTY: &str = "profile";
const CONFIG_PROPERTY: &str = "config";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
	Profile(&'static str),
	Override,
}

#[derive(Debug, Clone)]
pub struct ConfigEntry {
	variable: FunctionVariable,
	config: Box<dyn HashConfig>,
	provenance: Provenance,
}

impl ConfigEntry {
	pub fn new(
		variable: FunctionVariable,
		config: Box<dyn HashConfig>,
		provenance: Provenance,
	) -> Self {
		Self {
			variable,
			config,
			provenance,
		}
	}

	pub fn variable(&self) -> &FunctionVariable {
		&self.variable
	}

	pub fn config(&self) -> &dyn HashConfig {
		self.config.as_ref()
	}

	pub fn provenance(&self) -> Provenance {
		self.provenance
	}
}

/// The document as a whole cannot be used.
#[derive(Debug)]
pub enum ConfigError {
	Io { path: PathBuf, source: io::Error },
	Json(serde_json::Error),
	NotAnObject,
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Io { path, .. } => {
				write!(f, "cannot read '{}'", path.display())
			}
			ConfigError::Json(_) => f.write_str("invalid JSON"),
			ConfigError::NotAnObject => {
				f.write_str("the document root must be a JSON object")
			}
		}
	}
}

impl std::error::Error for ConfigError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ConfigError::Io { source, .. } => Some(source),
			ConfigError::Json(source) => Some(source),
			ConfigError::NotAnObject => None,
		}
	}
}

/// A recoverable problem with one key of the document.
#[derive(Debug)]
pub enum BuildError {
	UnresolvedKey(String),
	BodyNotAnObject(String),
	/// The body holds zero or several properties.
	BodyShape { key: String, properties: usize },
	UnknownProperty { key: String, property: String },
	ProfileNotAString(String),
	UnknownProfile { key: String, profile: String },
	ConfigNotAnObject(String),
	/// A property names no writable field; only that property is ignored.
	UnknownField { key: String, field: String },
	Coercion {
		key: String,
		field: String,
		source: CoercionError,
	},
	EmptyConfig(String),
	Duplicate(String),
}

impl BuildError {
	/// `false` for warnings that leave the entry itself intact.
	pub fn skips_entry(&self) -> bool {
		!matches!(self, BuildError::UnknownField { .. })
	}
}

impl fmt::Display for BuildError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BuildError::UnresolvedKey(key) => write!(
				f,
				"'{}' does not name a supported algorithm, skipping it",
				key
			),
			BuildError::BodyNotAnObject(key) => {
				write!(f, "'{}': value must be a JSON object, skipping it", key)
			}
			BuildError::BodyShape { key, properties } => write!(
				f,
				"'{}': expected exactly one of '{}' or '{}', found {} properties, skipping it",
				key, PROFILE_PROPERTY, CONFIG_PROPERTY, properties
			),
			BuildError::UnknownProperty { key, property } => write!(
				f,
				"'{}': unknown property '{}', expected '{}' or '{}', skipping it",
				key, property, PROFILE_PROPERTY, CONFIG_PROPERTY
			),
			BuildError::ProfileNotAString(key) => {
				write!(f, "'{}': profile must be a string, skipping it", key)
			}
			BuildError::UnknownProfile { key, profile } => write!(
				f,
				"'{}': no config profile named '{}', skipping it",
				key, profile
			),
			BuildError::ConfigNotAnObject(key) => {
				write!(f, "'{}': config must be a JSON object, skipping it", key)
			}
			BuildError::UnknownField { key, field } => write!(
				f,
				"'{}': '{}' is not a writable config field, ignoring it",
				key, field
			),
			BuildError::Coercion { key, field, .. } => write!(
				f,
				"'{}': cannot apply field '{}', skipping the whole config",
				key, field
			),
			BuildError::EmptyConfig(key) => write!(
				f,
				"'{}': config sets no fields, nothing registered",
				key
			),
			BuildError::Duplicate(key) => write!(
				f,
				"'{}': a config for this algorithm instance already exists, keeping the first",
				key
			),
		}
	}
}

impl std::error::Error for BuildError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			BuildError::Coercion { source, .. } => Some(source),
			_ => None,
		}
	}
}

/// Entries built from a config document, at most one per instance.
#[derive(Debug, Default)]
pub struct ConfigCatalog {
	entries: Vec<ConfigEntry>,
	warnings: Vec<BuildError>,
}

impl ConfigCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let text =
			fs::read_to_string(path).map_err(|source| ConfigError::Io {
				path: path.to_path_buf(),
				source,
			})?;
		Self::from_json_str(&text)
	}

	pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
		let value: Value =
			serde_json::from_str(text).map_err(ConfigError::Json)?;
		Self::from_value(&value)
	}

	pub fn from_value(document: &Value) -> Result<Self, ConfigError> {
		let root = document.as_object().ok_or(ConfigError::NotAnObject)?;
		let mut catalog = Self::new();
		for (key, body) in root {
			match build_entry(key, body, &mut catalog.warnings) {
				Ok(entry) => {
					if let Err(err) = catalog.insert(entry) {
						catalog.warnings.push(err);
					}
				}
				Err(err) => catalog.warnings.push(err),
			}
		}
		Ok(catalog)
	}

	/// Registers `entry` unless its instance already has one.
	pub fn insert(&mut self, entry: ConfigEntry) -> Result<(), BuildError> {
		if self.get(entry.variable()).is_some() {
			return Err(BuildError::Duplicate(entry.variable().to_string()));
		}
		self.entries.push(entry);
		Ok(())
	}

	/// Entry registered for exactly `variable`.
	pub fn get(&self, variable: &FunctionVariable) -> Option<&ConfigEntry> {
		self.entries.iter().find(|entry| entry.variable() == variable)
	}

	/// Entry registered for `variable`'s algorithm without an instance name.
	pub fn algorithm_wide(
		&self,
		variable: &FunctionVariable,
	) -> Option<&ConfigEntry> {
		self.get(&variable.unqualified())
	}

	pub fn entries(&self) -> &[ConfigEntry] {
		&self.entries
	}

	pub fn warnings(&self) -> &[BuildError] {
		&self.warnings
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn build_entry(
	key: &str,
	body: &Value,
	warnings: &mut Vec<BuildError>,
) -> Result<ConfigEntry, BuildError> {
	let variable = resolve_first(key)
		.ok_or_else(|| BuildError::UnresolvedKey(key.to_string()))?;
	let body = body
		.as_object()
		.ok_or_else(|| BuildError::BodyNotAnObject(key.to_string()))?;
	let mut properties = body.iter();
	let (property, value) = match (properties.next(), properties.next()) {
		(Some(only), None) => only,
		_ => {
			return Err(BuildError::BodyShape {
				key: key.to_string(),
				properties: body.len(),
			})
		}
	};

	if property.eq_ignore_ascii_case(PROFILE_PROPERTY) {
		let name = value
			.as_str()
			.ok_or_else(|| BuildError::ProfileNotAString(key.to_string()))?;
		let profile =
			variable.algorithm().find_profile(name).ok_or_else(|| {
				BuildError::UnknownProfile {
					key: key.to_string(),
					profile: name.to_string(),
				}
			})?;
		return Ok(ConfigEntry::new(
			variable,
			(profile.create)(),
			Provenance::Profile(profile.name),
		));
	}

	if property.eq_ignore_ascii_case(CONFIG_PROPERTY) {
		let overrides = value
			.as_object()
			.ok_or_else(|| BuildError::ConfigNotAnObject(key.to_string()))?;
		if overrides.is_empty() {
			return Err(BuildError::EmptyConfig(key.to_string()));
		}
		let mut config = variable.algorithm().default_config();
		apply_overrides(key, config.as_mut(), overrides, warnings)?;
		return Ok(ConfigEntry::new(variable, config, Provenance::Override));
	}

	Err(BuildError::UnknownProperty {
		key: key.to_string(),
		property: property.to_string(),
	})
}

/// Coerces every override before touching `config`. Properties naming no
/// writable field are reported and leave the default in place.
fn apply_overrides(
	key: &str,
	config: &mut dyn HashConfig,
	overrides: &Map<String, Value>,
	warnings: &mut Vec<BuildError>,
) -> Result<(), BuildError> {
	let mut staged: Vec<(&'static str, FieldValue)> = Vec::new();
	for (name, value) in overrides {
		let Some(spec) = writable_field(config, name) else {
			warnings.push(BuildError::UnknownField {
				key: key.to_string(),
				field: name.clone(),
			});
			continue;
		};
		let coerced =
			coerce(value, &spec.kind).map_err(|source| BuildError::Coercion {
				key: key.to_string(),
				field: spec.name.to_string(),
				source,
			})?;
		staged.push((spec.name, coerced));
	}

	for (name, value) in staged {
		config.set_field(name, value).map_err(|source| {
			BuildError::Coercion {
				key: key.to_string(),
				field: name.to_string(),
				source,
			}
		})?;
	}
	Ok(())
}
