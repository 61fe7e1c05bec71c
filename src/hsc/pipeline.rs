// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: pipeline.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Five-stage run over every resolved algorithm instance.
//!
//! Instances run one after the other on a single shared script runtime.
//! The first failing stage aborts the whole batch.

use crate::hsc::config::ConfigCatalog;
use crate::hsc::error::PipelineError;
use crate::hsc::matcher::{resolve_config, ProfileQuery};
use crate::hsc::resolver::FunctionVariable;
use crate::hsc::script::{bind_surface, ScriptError, ScriptRuntime};
use rhai::{Blob, Dynamic};
use std::fmt;
use std::rc::Rc;

pub const INPUT_VARIABLE: &str = "Input";
pub const RESULT_VARIABLE: &str = "Result";
pub const ALGORITHM_VARIABLE: &str = "Algorithm";
pub const INSTANCE_VARIABLE: &str = "Variable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Input,
	InputFinalizer,
	Compute,
	OutputFinalizer,
	Output,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Stage::Input => "input",
			Stage::InputFinalizer => "input finalizer",
			Stage::Compute => "compute",
			Stage::OutputFinalizer => "output finalizer",
			Stage::Output => "output",
		})
	}
}

/// Progress of the instance currently being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
	Idle,
	InputEvaluated,
	InputFinalized,
	Computed,
	OutputFinalized,
	OutputEmitted,
	Aborted,
}

/// Script text for each scripted stage, already stringized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scripts {
	pub input: String,
	pub input_finalizer: String,
	pub output_finalizer: String,
	pub output: String,
}

pub struct Pipeline<'a, R: ScriptRuntime + ?Sized> {
	runtime: &'a mut R,
	scripts: &'a Scripts,
	profiles: Option<&'a ProfileQuery>,
	catalog: Option<&'a ConfigCatalog>,
	state: PipelineState,
}

impl<'a, R: ScriptRuntime + ?Sized> Pipeline<'a, R> {
	pub fn new(runtime: &'a mut R, scripts: &'a Scripts) -> Self {
		Self {
			runtime,
			scripts,
			profiles: None,
			catalog: None,
			state: PipelineState::Idle,
		}
	}

	pub fn with_profiles(
		mut self,
		profiles: Option<&'a ProfileQuery>,
	) -> Self {
		self.profiles = profiles;
		self
	}

	pub fn with_catalog(
		mut self,
		catalog: Option<&'a ConfigCatalog>,
	) -> Self {
		self.catalog = catalog;
		self
	}

	pub fn state(&self) -> PipelineState {
		self.state
	}

	/// Runs every stage for each of `variables` in order, stopping at the
	/// first error.
	pub fn run(
		&mut self,
		variables: &[FunctionVariable],
	) -> Result<(), PipelineError> {
		for variable in variables {
			if let Err(err) = self.run_one(variable) {
				self.state = PipelineState::Aborted;
				return Err(err);
			}
			self.state = PipelineState::Idle;
		}
		Ok(())
	}

	fn run_one(
		&mut self,
		variable: &FunctionVariable,
	) -> Result<(), PipelineError> {
		let scripts = self.scripts;
		self.runtime.reset_bindings();

		let input = self.evaluate_single(Stage::Input, &scripts.input)?;
		self.state = PipelineState::InputEvaluated;

		self.runtime.set_variable(INPUT_VARIABLE, input);
		let finalized = self.evaluate_single(
			Stage::InputFinalizer,
			&scripts.input_finalizer,
		)?;
		let data = expect_blob(finalized)
			.map_err(|err| PipelineError::script(Stage::InputFinalizer, err))?;
		self.runtime.release(INPUT_VARIABLE);
		self.state = PipelineState::InputFinalized;

		let resolved = resolve_config(variable, self.profiles, self.catalog);
		let value = variable
			.algorithm()
			.compute(resolved.config.as_ref(), &data)
			.map_err(|source| PipelineError::Compute {
				algorithm: variable.qualified_name(),
				source,
			})?;
		self.state = PipelineState::Computed;

		let bound = bind_surface(&mut *self.runtime, Rc::new(value));
		let result = self.evaluate_single(
			Stage::OutputFinalizer,
			&scripts.output_finalizer,
		);
		bound.release(&mut *self.runtime);
		let result = result?;
		self.state = PipelineState::OutputFinalized;

		self.runtime.set_variable(RESULT_VARIABLE, result);
		self.runtime.set_variable(
			ALGORITHM_VARIABLE,
			Dynamic::from(variable.qualified_name()),
		);
		self.runtime.set_variable(
			INSTANCE_VARIABLE,
			variable
				.variable()
				.map(|name| Dynamic::from(name.to_string()))
				.unwrap_or(Dynamic::UNIT),
		);
		self.runtime
			.evaluate(&scripts.output)
			.map_err(|err| PipelineError::script(Stage::Output, err))?;
		self.state = PipelineState::OutputEmitted;
		Ok(())
	}

	fn evaluate_single(
		&mut self,
		stage: Stage,
		script: &str,
	) -> Result<Dynamic, PipelineError> {
		let mut values = self
			.runtime
			.evaluate(script)
			.map_err(|err| PipelineError::script(stage, err))?;
		match values.len() {
			1 => Ok(values.remove(0)),
			0 => Err(PipelineError::script(stage, ScriptError::NoValue)),
			n => Err(PipelineError::script(
				stage,
				ScriptError::runtime(format!(
					"script produced {} values, expected one",
					n
				)),
			)),
		}
	}
}

fn expect_blob(value: Dynamic) -> Result<Blob, ScriptError> {
	if value.is::<Blob>() {
		return Ok(value.cast::<Blob>());
	}
	Err(ScriptError::UnexpectedType {
		expected: "Blob",
		found: value.type_name().to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hsc::error::EXIT_SCRIPT_FAILURE;
	use crate::hsc::resolver::resolve;
	use crate::hsc::script::{stringize, ScriptEnvironment};

	fn scripts_for(input: &str, output: &str) -> Scripts {
		Scripts {
			input: stringize(input),
			input_finalizer: stringize("StringToArray(Input)"),
			output_finalizer: stringize("Join(', ', AsByteArray())"),
			output: stringize(output),
		}
	}

	fn run(
		scripts: &Scripts,
		query: &str,
	) -> (Result<(), PipelineError>, PipelineState) {
		let mut env = ScriptEnvironment::new();
		let mut pipeline = Pipeline::new(&mut env, scripts);
		let result = pipeline.run(&resolve(query));
		let state = pipeline.state();
		(result, state)
	}

	#[test]
	fn crc32_of_abc_reaches_the_output_stage() {
		let dir = tempfile::tempdir().unwrap();
		let out = dir.path().join("out.txt");
		let out = out.to_string_lossy().replace('\\', "/");
		let scripts = scripts_for(
			"'abc'",
			&format!("AppendAllText('{}', Algorithm + '=' + Result)", out),
		);
		let (result, state) = run(&scripts, "CRC:CRC32");
		assert!(result.is_ok(), "{:?}", result);
		assert_eq!(state, PipelineState::Idle);
		let text = std::fs::read_to_string(&out).unwrap();
		assert_eq!(text, "CRC:CRC32=194, 65, 36, 53");
	}

	#[test]
	fn output_bindings_describe_the_instance() {
		let scripts = scripts_for(
			"'x'",
			"if Variable != 'b' || Algorithm != 'MD5:b' { Fail('bad') }",
		);
		assert!(run(&scripts, "MD5:b").0.is_ok());
		let scripts =
			scripts_for("'x'", "if type_of(Variable) != '()' { Fail('bad') }");
		assert!(run(&scripts, "MD5").0.is_ok());
	}

	#[test]
	fn input_without_value_aborts() {
		let scripts = scripts_for("let x = 1;", "Print('{0}', Result)");
		let (result, state) = run(&scripts, "MD5");
		assert_eq!(state, PipelineState::Aborted);
		assert!(matches!(
			result,
			Err(PipelineError::Script {
				stage: Stage::Input,
				source: ScriptError::NoValue
			})
		));
	}

	#[test]
	fn finalizer_must_produce_bytes() {
		let mut scripts = scripts_for("'abc'", "Print('{0}', Result)");
		scripts.input_finalizer = "42".into();
		let (result, _) = run(&scripts, "MD5");
		assert!(matches!(
			result,
			Err(PipelineError::Script {
				stage: Stage::InputFinalizer,
				source: ScriptError::UnexpectedType { .. }
			})
		));
	}

	#[test]
	fn explicit_failure_stops_the_batch() {
		let dir = tempfile::tempdir().unwrap();
		let out = dir.path().join("count.txt");
		let out = out.to_string_lossy().replace('\\', "/");
		let scripts = scripts_for(
			"'abc'",
			&format!(
				"AppendAllText('{}', 'x'); Fail('stop at {{0}}', Algorithm)",
				out
			),
		);
		let (result, state) = run(&scripts, "MD5 SHA1");
		let err = result.unwrap_err();
		assert_eq!(err.exit_code(), EXIT_SCRIPT_FAILURE);
		assert_eq!(err.to_string(), "stop at MD5");
		assert_eq!(state, PipelineState::Aborted);
		assert_eq!(std::fs::read_to_string(&out).unwrap(), "x");
	}

	#[test]
	fn compute_errors_name_the_instance() {
		let mut env = ScriptEnvironment::new();
		let scripts = scripts_for("'abc'", "Print('{0}', Result)");
		let catalog = ConfigCatalog::from_json_str(
			r#"{"Blake3:k": {"config": {"Key": [1, 2, 3]}}}"#,
		)
		.unwrap();
		let mut pipeline =
			Pipeline::new(&mut env, &scripts).with_catalog(Some(&catalog));
		let err = pipeline.run(&resolve("Blake3:k")).unwrap_err();
		assert!(matches!(
			err,
			PipelineError::Compute { ref algorithm, .. } if algorithm == "Blake3:k"
		));
	}

	#[test]
	fn digest_members_do_not_leak_into_the_output_stage() {
		let scripts = scripts_for("'abc'", "AsHexString()");
		let (result, _) = run(&scripts, "MD5");
		assert!(matches!(
			result,
			Err(PipelineError::Script {
				stage: Stage::Output,
				..
			})
		));
	}
}
