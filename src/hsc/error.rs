// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: error.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use crate::hsc::config::ConfigError;
use crate::hsc::pipeline::Stage;
use crate::hsc::registry::ComputeError;
use crate::hsc::script::ScriptError;
use std::error::Error;
use std::fmt;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_SCRIPT_FAILURE: i32 = 2;

/// Errors that end a run.
#[derive(Debug)]
pub enum PipelineError {
	/// Malformed command line, query or script argument.
	Argument(String),
	/// Unknown algorithm or profile reference.
	Lookup(String),
	/// Config document that cannot be used at all.
	Config(ConfigError),
	Script {
		stage: Stage,
		source: ScriptError,
	},
	/// Raised by a script through `Fail`; the message is shown verbatim.
	Failure(String),
	Compute {
		algorithm: String,
		source: ComputeError,
	},
}

impl PipelineError {
	pub fn argument(message: impl Into<String>) -> Self {
		PipelineError::Argument(message.into())
	}

	pub fn lookup(message: impl Into<String>) -> Self {
		PipelineError::Lookup(message.into())
	}

	/// Wraps a script error raised in `stage`, keeping explicit failures
	/// distinct from runtime errors.
	pub fn script(stage: Stage, source: ScriptError) -> Self {
		match source {
			ScriptError::Failure(message) => PipelineError::Failure(message),
			source => PipelineError::Script { stage, source },
		}
	}

	pub fn exit_code(&self) -> i32 {
		match self {
			PipelineError::Failure(_) => EXIT_SCRIPT_FAILURE,
			_ => EXIT_FAILURE,
		}
	}
}

impl fmt::Display for PipelineError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PipelineError::Argument(message) => f.write_str(message),
			PipelineError::Lookup(message) => f.write_str(message),
			PipelineError::Config(err) => write!(f, "config file: {}", err),
			PipelineError::Script { stage, .. } => {
				write!(f, "{} script failed", stage)
			}
			PipelineError::Failure(message) => f.write_str(message),
			PipelineError::Compute { algorithm, .. } => {
				write!(f, "computing {} failed", algorithm)
			}
		}
	}
}

impl Error for PipelineError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			PipelineError::Config(err) => Some(err),
			PipelineError::Script { source, .. } => Some(source),
			PipelineError::Compute { source, .. } => Some(source),
			_ => None,
		}
	}
}

impl From<ConfigError> for PipelineError {
	fn from(err: ConfigError) -> Self {
		PipelineError::Config(err)
	}
}

/// `err` followed by each of its causes, joined with `: `.
pub fn describe(err: &dyn Error) -> String {
	let mut text = err.to_string();
	let mut source = err.source();
	while let Some(cause) = source {
		text.push_str(": ");
		text.push_str(&cause.to_string());
		source = cause.source();
	}
	text
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_failures_exit_with_two() {
		let err = PipelineError::script(
			Stage::Output,
			ScriptError::Failure("bad input".into()),
		);
		assert!(matches!(err, PipelineError::Failure(_)));
		assert_eq!(err.exit_code(), EXIT_SCRIPT_FAILURE);
		assert_eq!(describe(&err), "bad input");
	}

	#[test]
	fn other_errors_exit_with_one_and_keep_context() {
		let err = PipelineError::script(
			Stage::InputFinalizer,
			ScriptError::runtime("Variable not found: Foo"),
		);
		assert_eq!(err.exit_code(), EXIT_FAILURE);
		assert_eq!(
			describe(&err),
			"input finalizer script failed: Variable not found: Foo"
		);
		assert_eq!(PipelineError::argument("x").exit_code(), EXIT_FAILURE);
	}
}
