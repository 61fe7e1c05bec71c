// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: binding.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Binding of a value's declared surface into the script environment.
//!
//! A type exposed to scripts implements [`ScriptSurface`]: a snapshot of its
//! readable fields and a static table of operation signatures. Operations
//! sharing a name are bound once under the bare name (the primary member)
//! and once per remaining member under `Name_Type_Type`.

use super::{ScriptError, ScriptRuntime};
use rhai::{Blob, Dynamic, ImmutableString, FLOAT, INT};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
	Bool,
	Int,
	Float,
	String,
	Blob,
	Any,
}

impl ParamKind {
	pub fn type_name(self) -> &'static str {
		match self {
			ParamKind::Bool => "Bool",
			ParamKind::Int => "Int",
			ParamKind::Float => "Float",
			ParamKind::String => "String",
			ParamKind::Blob => "Blob",
			ParamKind::Any => "Any",
		}
	}

	pub fn accepts(self, value: &Dynamic) -> bool {
		match self {
			ParamKind::Bool => value.is::<bool>(),
			ParamKind::Int => value.is::<INT>(),
			ParamKind::Float => value.is::<FLOAT>(),
			ParamKind::String => value.is::<ImmutableString>(),
			ParamKind::Blob => value.is::<Blob>(),
			ParamKind::Any => true,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationSignature {
	pub name: &'static str,
	pub params: &'static [ParamKind],
}

impl OperationSignature {
	pub const fn new(
		name: &'static str,
		params: &'static [ParamKind],
	) -> Self {
		Self { name, params }
	}

	pub fn arity(&self) -> usize {
		self.params.len()
	}

	/// `Name(Type, Type)`, the text overload ties are ordered by.
	pub fn signature_text(&self) -> String {
		let params = self
			.params
			.iter()
			.map(|p| p.type_name())
			.collect::<Vec<_>>()
			.join(", ");
		format!("{}({})", self.name, params)
	}

	/// `Name_Type_Type`, the name a non-primary overload is bound under.
	pub fn alias(&self) -> String {
		let mut alias = self.name.to_string();
		for param in self.params {
			alias.push('_');
			alias.push_str(param.type_name());
		}
		alias
	}
}

impl fmt::Display for OperationSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.signature_text())
	}
}

/// The explicit script-facing interface of a value.
pub trait ScriptSurface {
	/// Readable fields, captured at the time of the call.
	fn fields(&self) -> Vec<(&'static str, Dynamic)>;

	fn operations(&self) -> &'static [OperationSignature];

	/// Runs `operation`. Arguments have already been checked against the
	/// signature's parameter kinds.
	fn invoke(
		&self,
		operation: &OperationSignature,
		args: &[Dynamic],
	) -> Result<Dynamic, ScriptError>;
}

/// One operation of a surface, owned by the binding that installed it.
#[derive(Clone)]
pub struct NativeOperation {
	surface: Rc<dyn ScriptSurface>,
	signature: OperationSignature,
}

impl NativeOperation {
	pub fn new(
		surface: Rc<dyn ScriptSurface>,
		signature: OperationSignature,
	) -> Self {
		Self { surface, signature }
	}

	pub fn signature(&self) -> &OperationSignature {
		&self.signature
	}

	pub fn call(&self, args: &[Dynamic]) -> Result<Dynamic, ScriptError> {
		check_arguments(&self.signature, args)?;
		self.surface.invoke(&self.signature, args)
	}
}

/// Checks `args` against the arity and parameter kinds of `signature`.
pub fn check_arguments(
	signature: &OperationSignature,
	args: &[Dynamic],
) -> Result<(), ScriptError> {
	if args.len() != signature.arity() {
		return Err(ScriptError::runtime(format!(
			"{} expects {} argument(s), got {}",
			signature,
			signature.arity(),
			args.len()
		)));
	}
	for (idx, (kind, arg)) in signature.params.iter().zip(args).enumerate() {
		if !kind.accepts(arg) {
			return Err(ScriptError::runtime(format!(
				"{}: argument {} must be {}, got '{}'",
				signature,
				idx + 1,
				kind.type_name(),
				arg.type_name()
			)));
		}
	}
	Ok(())
}

impl fmt::Debug for NativeOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeOperation")
			.field("signature", &self.signature)
			.finish()
	}
}

/// Assigns a binding name to every operation in `operations`.
///
/// Names keep the order of their first appearance. Within an overload set
/// the zero-argument member is primary; failing that, the member with the
/// fewest parameters, ties ordered by [`OperationSignature::signature_text`].
pub fn plan_operations(
	operations: &[OperationSignature],
) -> Vec<(String, OperationSignature)> {
	let mut groups: Vec<(&'static str, Vec<OperationSignature>)> = Vec::new();
	for op in operations {
		match groups.iter_mut().find(|(name, _)| *name == op.name) {
			Some((_, members)) => members.push(*op),
			None => groups.push((op.name, vec![*op])),
		}
	}

	let mut plan = Vec::with_capacity(operations.len());
	for (name, members) in groups {
		if let [only] = members.as_slice() {
			plan.push((name.to_string(), *only));
			continue;
		}
		let primary = members
			.iter()
			.copied()
			.min_by(|a, b| {
				a.arity()
					.cmp(&b.arity())
					.then_with(|| a.signature_text().cmp(&b.signature_text()))
			})
			.unwrap_or(members[0]);
		plan.push((name.to_string(), primary));
		for member in members.iter().filter(|m| **m != primary) {
			plan.push((member.alias(), *member));
		}
	}
	plan
}

/// Names installed by [`bind_surface`]; release them before the next value
/// is bound.
#[derive(Debug, Default)]
pub struct BoundSurface {
	names: Vec<String>,
}

impl BoundSurface {
	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn release<R: ScriptRuntime + ?Sized>(self, runtime: &mut R) {
		for name in &self.names {
			runtime.release(name);
		}
	}
}

pub fn bind_surface<R: ScriptRuntime + ?Sized>(
	runtime: &mut R,
	surface: Rc<dyn ScriptSurface>,
) -> BoundSurface {
	let mut names = Vec::new();
	for (name, value) in surface.fields() {
		runtime.set_variable(name, value);
		names.push(name.to_string());
	}
	for (name, signature) in plan_operations(surface.operations()) {
		runtime.bind_operation(
			&name,
			NativeOperation::new(Rc::clone(&surface), signature),
		);
		names.push(name);
	}
	BoundSurface { names }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hsc::registry::HashValue;
	use std::collections::HashMap;

	#[derive(Default)]
	struct RecordingRuntime {
		variables: HashMap<String, Dynamic>,
		operations: HashMap<String, NativeOperation>,
		released: Vec<String>,
	}

	impl ScriptRuntime for RecordingRuntime {
		fn evaluate(
			&mut self,
			_script: &str,
		) -> Result<Vec<Dynamic>, ScriptError> {
			Ok(Vec::new())
		}

		fn set_variable(&mut self, name: &str, value: Dynamic) {
			self.release(name);
			self.variables.insert(name.to_string(), value);
		}

		fn bind_operation(&mut self, name: &str, operation: NativeOperation) {
			self.release(name);
			self.operations.insert(name.to_string(), operation);
		}

		fn release(&mut self, name: &str) -> bool {
			let had = self.variables.remove(name).is_some()
				| self.operations.remove(name).is_some();
			if had {
				self.released.push(name.to_string());
			}
			had
		}

		fn reset_bindings(&mut self) {
			self.variables.clear();
			self.operations.clear();
		}
	}

	const PICK: &[OperationSignature] = &[
		OperationSignature::new("Pick", &[ParamKind::String]),
		OperationSignature::new("Pick", &[ParamKind::Int]),
		OperationSignature::new("Solo", &[ParamKind::Any, ParamKind::Any]),
	];

	#[test]
	fn zero_argument_member_is_primary() {
		let value = HashValue::new(vec![0xde, 0xad], 16);
		let plan = plan_operations(value.operations());
		let names: Vec<_> = plan.iter().map(|(n, _)| n.as_str()).collect();
		assert!(names.contains(&"AsHexString"));
		assert!(names.contains(&"AsHexString_Bool"));
		let primary = plan
			.iter()
			.find(|(n, _)| n == "AsHexString")
			.map(|(_, sig)| sig.arity());
		assert_eq!(primary, Some(0));
	}

	#[test]
	fn fewest_parameters_then_signature_text_wins() {
		let value = HashValue::new(vec![0xde, 0xad], 16);
		let plan = plan_operations(value.operations());
		let slice = plan.iter().find(|(n, _)| n == "Slice").unwrap();
		assert_eq!(slice.1.arity(), 1);
		assert!(plan.iter().any(|(n, _)| n == "Slice_Int_Int"));

		let plan = plan_operations(PICK);
		assert_eq!(plan[0].0, "Pick");
		assert_eq!(plan[0].1.params, &[ParamKind::Int]);
		assert_eq!(plan[1].0, "Pick_String");
		assert_eq!(plan[2].0, "Solo");
	}

	#[test]
	fn binding_snapshots_fields_and_rebinding_releases() {
		let mut runtime = RecordingRuntime::default();
		let first: Rc<dyn ScriptSurface> =
			Rc::new(HashValue::new(vec![1, 2, 3, 4], 32));
		let bound = bind_surface(&mut runtime, Rc::clone(&first));
		assert_eq!(
			runtime.variables["BitLength"].as_int().unwrap(),
			32
		);
		assert!(runtime.operations.contains_key("AsByteArray"));
		assert_eq!(Rc::strong_count(&first), 1 + bound.names().len() - 2);

		let second: Rc<dyn ScriptSurface> =
			Rc::new(HashValue::new(vec![9], 8));
		let rebound = bind_surface(&mut runtime, second);
		assert!(runtime.released.iter().any(|n| n == "AsByteArray"));
		assert_eq!(Rc::strong_count(&first), 1);
		assert_eq!(runtime.variables["BitLength"].as_int().unwrap(), 8);

		rebound.release(&mut runtime);
		assert!(runtime.variables.is_empty());
		assert!(runtime.operations.is_empty());
		bound.release(&mut runtime);
	}

	#[test]
	fn native_operation_checks_arguments() {
		let surface: Rc<dyn ScriptSurface> =
			Rc::new(HashValue::new(vec![0xab], 8));
		let op = NativeOperation::new(
			surface,
			OperationSignature::new("AsHexString", &[ParamKind::Bool]),
		);
		assert!(op.call(&[]).is_err());
		assert!(op.call(&[Dynamic::from(3_i64)]).is_err());
		let upper = op.call(&[Dynamic::from(true)]).unwrap();
		assert_eq!(upper.into_string().unwrap(), "AB");
	}
}
