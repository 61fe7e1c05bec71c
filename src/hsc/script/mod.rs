// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: mod.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Embedded script runtime used by every pipeline stage.
//!
//! The pipeline talks to the runtime through [`ScriptRuntime`] only: it
//! evaluates text, injects named variables and binds native operations.
//! [`engine::ScriptEnvironment`] is the rhai-backed implementation.

pub mod binding;
pub mod engine;
pub mod helpers;

use rhai::Dynamic;
use std::fmt;

pub use binding::{
	bind_surface, BoundSurface, NativeOperation, OperationSignature,
	ParamKind, ScriptSurface,
};
pub use engine::ScriptEnvironment;

pub trait ScriptRuntime {
	/// Evaluates `script`; a unit result yields zero values.
	fn evaluate(&mut self, script: &str) -> Result<Vec<Dynamic>, ScriptError>;

	/// Installs `value` under `name`, releasing any previous binding first.
	fn set_variable(&mut self, name: &str, value: Dynamic);

	/// Installs `operation` under `name`, releasing any previous binding first.
	fn bind_operation(&mut self, name: &str, operation: NativeOperation);

	/// Drops whatever is bound under `name`. Returns `false` if nothing was.
	fn release(&mut self, name: &str) -> bool;

	/// Drops every variable and native operation bound so far.
	fn reset_bindings(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
	/// Any evaluation error other than an explicit failure.
	Runtime(String),
	/// Raised by the `Fail` helper; carries the formatted message.
	Failure(String),
	NoValue,
	UnexpectedType {
		expected: &'static str,
		found: String,
	},
}

impl ScriptError {
	pub fn runtime(message: impl Into<String>) -> Self {
		ScriptError::Runtime(message.into())
	}

	pub fn is_failure(&self) -> bool {
		matches!(self, ScriptError::Failure(_))
	}
}

impl fmt::Display for ScriptError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ScriptError::Runtime(message) => f.write_str(message),
			ScriptError::Failure(message) => f.write_str(message),
			ScriptError::NoValue => {
				f.write_str("script did not produce a value")
			}
			ScriptError::UnexpectedType { expected, found } => write!(
				f,
				"script produced a value of type '{}', expected '{}'",
				found, expected
			),
		}
	}
}

impl std::error::Error for ScriptError {}

/// Turns a command-line script into evaluable text: every `'` not preceded
/// by a backslash becomes `"`, and `\'` becomes a literal `'`.
pub fn stringize(script: &str) -> String {
	let mut out = String::with_capacity(script.len());
	let mut chars = script.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'\\' if chars.peek() == Some(&'\'') => {
				chars.next();
				out.push('\'');
			}
			'\'' => out.push('"'),
			other => out.push(other),
		}
	}
	out
}
