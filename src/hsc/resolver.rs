// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: resolver.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Algorithm query resolution.
//!
//! A query is either `*` or whitespace-separated `Name` / `Name:Variable`
//! tokens. A malformed token empties the whole result; an unknown name is
//! skipped.

use crate::hsc::registry::{self, HashAlgorithm};
use std::fmt;
use std::hash::{Hash, Hasher};

pub const WILDCARD: &str = "*";
pub const SEPARATOR: char = ':';

/// An algorithm together with an optional instance name.
///
/// Equality and hashing ignore ASCII case; an unqualified variable never
/// equals a qualified one.
#[derive(Debug, Clone)]
pub struct FunctionVariable {
	algorithm: &'static HashAlgorithm,
	variable: Option<String>,
}

impl FunctionVariable {
	pub fn new(
		algorithm: &'static HashAlgorithm,
		variable: Option<&str>,
	) -> Self {
		Self {
			algorithm,
			variable: variable.map(str::to_string),
		}
	}

	pub fn algorithm(&self) -> &'static HashAlgorithm {
		self.algorithm
	}

	pub fn variable(&self) -> Option<&str> {
		self.variable.as_deref()
	}

	pub fn is_qualified(&self) -> bool {
		self.variable.is_some()
	}

	/// The same algorithm without an instance name.
	pub fn unqualified(&self) -> FunctionVariable {
		FunctionVariable::new(self.algorithm, None)
	}

	/// `Name:Variable`, or the bare name when unqualified.
	pub fn qualified_name(&self) -> String {
		match &self.variable {
			Some(variable) => {
				format!("{}{}{}", self.algorithm.name(), SEPARATOR, variable)
			}
			None => self.algorithm.name().to_string(),
		}
	}
}

impl PartialEq for FunctionVariable {
	fn eq(&self, other: &Self) -> bool {
		self.algorithm.name().eq_ignore_ascii_case(other.algorithm.name())
			&& match (self.variable(), other.variable()) {
				(None, None) => true,
				(Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
				_ => false,
			}
	}
}

impl Eq for FunctionVariable {}

impl Hash for FunctionVariable {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.algorithm.name().to_ascii_lowercase().hash(state);
		self.variable().map(str::to_ascii_lowercase).hash(state);
	}
}

impl fmt::Display for FunctionVariable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.qualified_name())
	}
}

/// Splits a token into name and optional variable. `None` marks the token
/// malformed: more than one separator or an empty segment.
fn split_token(token: &str) -> Option<(&str, Option<&str>)> {
	let mut parts = token.split(SEPARATOR);
	let name = parts.next()?;
	let variable = parts.next();
	if parts.next().is_some() || name.is_empty() {
		return None;
	}
	match variable {
		Some("") => None,
		other => Some((name, other)),
	}
}

pub fn resolve(query: &str) -> Vec<FunctionVariable> {
	let query = query.trim();
	if query == WILDCARD {
		return registry::algorithms()
			.map(|algorithm| FunctionVariable::new(algorithm, None))
			.collect();
	}

	let mut resolved = Vec::new();
	for token in query.split_whitespace() {
		let Some((name, variable)) = split_token(token) else {
			return Vec::new();
		};
		if let Some(algorithm) = registry::find_algorithm(name) {
			resolved.push(FunctionVariable::new(algorithm, variable));
		}
	}
	resolved
}

/// First descriptor `query` resolves to.
pub fn resolve_first(query: &str) -> Option<FunctionVariable> {
	resolve(query).into_iter().next()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	fn names(query: &str) -> Vec<String> {
		resolve(query).iter().map(|v| v.qualified_name()).collect()
	}

	#[test]
	fn keeps_token_order_and_canonical_names() {
		assert_eq!(
			names("sha1 crc:fast MD5"),
			vec!["SHA1", "CRC:fast", "MD5"]
		);
	}

	#[test]
	fn unknown_names_are_skipped() {
		assert_eq!(names("nope MD5 other:x"), vec!["MD5"]);
		assert!(resolve("nope").is_empty());
	}

	#[test]
	fn malformed_token_empties_the_query() {
		assert!(resolve("MD5 CRC::x").is_empty());
		assert!(resolve("MD5 CRC:a:b").is_empty());
		assert!(resolve("MD5 :x").is_empty());
		assert!(resolve("MD5 CRC:").is_empty());
	}

	#[test]
	fn wildcard_is_every_algorithm_unqualified() {
		let all = resolve(" * ");
		assert_eq!(all.len(), registry::algorithms().count());
		assert!(all.iter().all(|v| !v.is_qualified()));
	}

	#[test]
	fn equality_ignores_case_but_not_qualification() {
		let a = resolve_first("crc:Fast").unwrap();
		let b = resolve_first("CRC:fast").unwrap();
		let c = resolve_first("CRC").unwrap();
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(a.unqualified(), c);
		assert_eq!(a.to_string(), "CRC:Fast");
		let set: HashSet<_> = [a.clone(), b, c].into_iter().collect();
		assert_eq!(set.len(), 2);
	}
}
