// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: engine.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! rhai-backed [`ScriptRuntime`].
//!
//! Native operations are reached through one dispatcher per
//! `(name, arity)` registered with the engine the first time that shape is
//! bound. The dispatcher looks the name up in the binding table at call
//! time, so releasing a name only has to drop its table entry.

use super::helpers;
use super::{NativeOperation, ScriptError, ScriptRuntime};
use crate::hsc::logger;
use rhai::{Dynamic, Engine, EvalAltResult, Position, Scope};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

/// Highest arity a native operation may be bound with.
pub const MAX_ARITY: usize = 4;

/// Error value thrown by the `Fail` helper.
#[derive(Debug, Clone)]
pub(crate) struct ScriptFailure(pub String);

type OperationTable = Rc<RefCell<HashMap<String, NativeOperation>>>;
type EvalResult = Result<Dynamic, Box<EvalAltResult>>;

pub(crate) fn runtime_error(message: impl Into<String>) -> Box<EvalAltResult> {
	Box::new(EvalAltResult::ErrorRuntime(
		Dynamic::from(message.into()),
		Position::NONE,
	))
}

pub(crate) fn failure(message: String) -> Box<EvalAltResult> {
	Box::new(EvalAltResult::ErrorRuntime(
		Dynamic::from(ScriptFailure(message)),
		Position::NONE,
	))
}

fn into_eval_error(err: ScriptError) -> Box<EvalAltResult> {
	match err {
		ScriptError::Failure(message) => failure(message),
		other => runtime_error(other.to_string()),
	}
}

fn find_failure(err: &EvalAltResult) -> Option<String> {
	match err {
		EvalAltResult::ErrorRuntime(value, _) => value
			.clone()
			.try_cast::<ScriptFailure>()
			.map(|failure| failure.0),
		EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => {
			find_failure(inner)
		}
		EvalAltResult::ErrorInModule(_, inner, _) => find_failure(inner),
		_ => None,
	}
}

fn classify(err: Box<EvalAltResult>) -> ScriptError {
	match find_failure(&err) {
		Some(message) => ScriptError::Failure(message),
		None => ScriptError::Runtime(err.to_string()),
	}
}

fn dispatch(table: &OperationTable, name: &str, args: &[Dynamic]) -> EvalResult {
	let operation = table.borrow().get(name).cloned();
	match operation {
		Some(operation) => operation.call(args).map_err(into_eval_error),
		None => Err(runtime_error(format!("'{}' is not bound", name))),
	}
}

pub struct ScriptEnvironment {
	engine: Engine,
	variables: BTreeMap<String, Dynamic>,
	operations: OperationTable,
	dispatchers: HashSet<(String, usize)>,
}

impl ScriptEnvironment {
	pub fn new() -> Self {
		let mut engine = Engine::new();
		helpers::register(&mut engine);
		engine.on_print(logger::script);
		engine.on_debug(|text, _, _| logger::log(text));
		Self {
			engine,
			variables: BTreeMap::new(),
			operations: Rc::new(RefCell::new(HashMap::new())),
			dispatchers: HashSet::new(),
		}
	}

	fn ensure_dispatcher(&mut self, name: &str, arity: usize) {
		if !self.dispatchers.insert((name.to_string(), arity)) {
			return;
		}
		let table = Rc::clone(&self.operations);
		let key = name.to_string();
		match arity {
			0 => {
				self.engine.register_fn(name, move || -> EvalResult {
					dispatch(&table, &key, &[])
				});
			}
			1 => {
				self.engine.register_fn(name, move |a: Dynamic| -> EvalResult {
					dispatch(&table, &key, &[a])
				});
			}
			2 => {
				self.engine.register_fn(
					name,
					move |a: Dynamic, b: Dynamic| -> EvalResult {
						dispatch(&table, &key, &[a, b])
					},
				);
			}
			3 => {
				self.engine.register_fn(
					name,
					move |a: Dynamic, b: Dynamic, c: Dynamic| -> EvalResult {
						dispatch(&table, &key, &[a, b, c])
					},
				);
			}
			_ => {
				self.engine.register_fn(
					name,
					move |a: Dynamic,
					      b: Dynamic,
					      c: Dynamic,
					      d: Dynamic|
					      -> EvalResult {
						dispatch(&table, &key, &[a, b, c, d])
					},
				);
			}
		}
	}

	pub fn is_bound(&self, name: &str) -> bool {
		self.variables.contains_key(name)
			|| self.operations.borrow().contains_key(name)
	}
}

impl Default for ScriptEnvironment {
	fn default() -> Self {
		Self::new()
	}
}

impl ScriptRuntime for ScriptEnvironment {
	fn evaluate(&mut self, script: &str) -> Result<Vec<Dynamic>, ScriptError> {
		let mut scope = Scope::new();
		for (name, value) in &self.variables {
			scope.push_dynamic(name.as_str(), value.clone());
		}
		let value = self
			.engine
			.eval_with_scope::<Dynamic>(&mut scope, script)
			.map_err(classify)?;
		if value.is_unit() {
			Ok(Vec::new())
		} else {
			Ok(vec![value])
		}
	}

	fn set_variable(&mut self, name: &str, value: Dynamic) {
		self.release(name);
		self.variables.insert(name.to_string(), value);
	}

	fn bind_operation(&mut self, name: &str, operation: NativeOperation) {
		self.release(name);
		let arity = operation.signature().arity();
		if arity > MAX_ARITY {
			logger::warning(&format!(
				"cannot bind {}: more than {} parameters",
				operation.signature(),
				MAX_ARITY
			));
			return;
		}
		self.ensure_dispatcher(name, arity);
		self.operations
			.borrow_mut()
			.insert(name.to_string(), operation);
	}

	fn release(&mut self, name: &str) -> bool {
		let variable = self.variables.remove(name).is_some();
		let operation = self.operations.borrow_mut().remove(name).is_some();
		variable || operation
	}

	fn reset_bindings(&mut self) {
		self.variables.clear();
		self.operations.borrow_mut().clear();
	}
}
