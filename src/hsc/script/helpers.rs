// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: helpers.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Helper functions available to every script stage, plus the script-side
//! registration of [`HashValue`].

use super::binding::check_arguments;
use super::engine::runtime_error;
use super::ScriptSurface;
use crate::hsc::registry::HashValue;
use rhai::plugin::*;
use rhai::{Blob, Dynamic, Engine, EvalAltResult, INT};

pub fn register(engine: &mut Engine) {
	engine.register_global_module(exported_module!(script_helpers).into());
	register_hash_value(engine);
}

/// Renders a value the way `Print` and `Join` show it.
pub fn display_value(value: &Dynamic) -> String {
	if let Some(hash) = value.read_lock::<HashValue>() {
		return hash.to_string();
	}
	value.to_string()
}

/// Replaces `{N}` with the N-th argument; `{{` and `}}` are literal braces.
pub fn format_message(format: &str, args: &[Dynamic]) -> Result<String, String> {
	let mut out = String::with_capacity(format.len());
	let mut chars = format.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'{' if chars.peek() == Some(&'{') => {
				chars.next();
				out.push('{');
			}
			'}' if chars.peek() == Some(&'}') => {
				chars.next();
				out.push('}');
			}
			'{' => {
				let mut index = String::new();
				loop {
					match chars.next() {
						Some('}') => break,
						Some(d) if d.is_ascii_digit() => index.push(d),
						_ => {
							return Err(format!(
								"malformed placeholder in format string '{}'",
								format
							))
						}
					}
				}
				let arg = index
					.parse::<usize>()
					.ok()
					.and_then(|i| args.get(i))
					.ok_or_else(|| {
						format!(
							"placeholder {{{}}} has no matching argument ({} given)",
							index,
							args.len()
						)
					})?;
				out.push_str(&display_value(arg));
			}
			'}' => {
				return Err(format!(
					"unbalanced '}}' in format string '{}'",
					format
				))
			}
			other => out.push(other),
		}
	}
	Ok(out)
}

/// Formats `message` with `args` for `Print`, `PrintDirect` and `Fail`.
fn render(
	message: &Dynamic,
	args: &[Dynamic],
) -> Result<String, Box<EvalAltResult>> {
	format_message(&display_value(message), args).map_err(runtime_error)
}

fn encode(input: &str, encoding: &str) -> Result<Blob, String> {
	let bytes = match encoding.to_ascii_lowercase().replace('-', "").as_str() {
		"utf8" => input.as_bytes().to_vec(),
		"utf16" | "utf16le" | "unicode" => {
			input.encode_utf16().flat_map(u16::to_le_bytes).collect()
		}
		"utf16be" | "bigendianunicode" => {
			input.encode_utf16().flat_map(u16::to_be_bytes).collect()
		}
		"ascii" | "usascii" => input
			.chars()
			.map(|c| if c.is_ascii() { c as u8 } else { b'?' })
			.collect(),
		"latin1" | "iso88591" => input
			.chars()
			.map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
			.collect(),
		other => return Err(format!("unsupported encoding '{}'", other)),
	};
	Ok(bytes)
}

fn join(separator: &str, items: impl Iterator<Item = String>) -> String {
	items.collect::<Vec<_>>().join(separator)
}

fn io_failure(action: &str, path: &str, err: std::io::Error) -> Box<EvalAltResult> {
	runtime_error(format!("cannot {} '{}': {}", action, path, err))
}

#[export_module]
mod script_helpers {
	use super::{encode, format_message, io_failure, join};
	use crate::hsc::logger;
	use crate::hsc::script::engine::{failure, runtime_error};
	use rhai::plugin::*;
	use rhai::{Array, Blob, Dynamic, EvalAltResult};
	use std::fs;
	use std::io::Write;
	use std::path::Path;

	#[rhai_fn(name = "Print", return_raw)]
	pub fn print0(message: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		logger::script(&render(&message, &[])?);
		Ok(true)
	}

	#[rhai_fn(name = "Print", return_raw)]
	pub fn print1(message: Dynamic, a: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		logger::script(&render(&message, &[a])?);
		Ok(true)
	}

	#[rhai_fn(name = "Print", return_raw)]
	pub fn print2(message: Dynamic, a: Dynamic, b: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		logger::script(&render(&message, &[a, b])?);
		Ok(true)
	}

	#[rhai_fn(name = "Print", return_raw)]
	pub fn print3(
		message: Dynamic,
		a: Dynamic,
		b: Dynamic,
		c: Dynamic,
	) -> Result<bool, Box<EvalAltResult>> {
		logger::script(&render(&message, &[a, b, c])?);
		Ok(true)
	}

	#[rhai_fn(name = "PrintDirect", return_raw)]
	pub fn print_direct0(message: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		logger::script_direct(&render(&message, &[])?);
		Ok(true)
	}

	#[rhai_fn(name = "PrintDirect", return_raw)]
	pub fn print_direct1(message: Dynamic, a: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		logger::script_direct(&render(&message, &[a])?);
		Ok(true)
	}

	#[rhai_fn(name = "PrintDirect", return_raw)]
	pub fn print_direct2(
		message: Dynamic,
		a: Dynamic,
		b: Dynamic,
	) -> Result<bool, Box<EvalAltResult>> {
		logger::script_direct(&render(&message, &[a, b])?);
		Ok(true)
	}

	#[rhai_fn(name = "PrintDirect", return_raw)]
	pub fn print_direct3(
		message: Dynamic,
		a: Dynamic,
		b: Dynamic,
		c: Dynamic,
	) -> Result<bool, Box<EvalAltResult>> {
		logger::script_direct(&render(&message, &[a, b, c])?);
		Ok(true)
	}

	#[rhai_fn(name = "Fail", return_raw)]
	pub fn fail0(message: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		Err(failure(render(&message, &[])?))
	}

	#[rhai_fn(name = "Fail", return_raw)]
	pub fn fail1(message: Dynamic, a: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		Err(failure(render(&message, &[a])?))
	}

	#[rhai_fn(name = "Fail", return_raw)]
	pub fn fail2(message: Dynamic, a: Dynamic, b: Dynamic) -> Result<bool, Box<EvalAltResult>> {
		Err(failure(render(&message, &[a, b])?))
	}

	#[rhai_fn(name = "Fail", return_raw)]
	pub fn fail3(
		message: Dynamic,
		a: Dynamic,
		b: Dynamic,
		c: Dynamic,
	) -> Result<bool, Box<EvalAltResult>> {
		Err(failure(render(&message, &[a, b, c])?))
	}

	#[rhai_fn(name = "StringToArray")]
	pub fn string_to_array(input: &str) -> Blob {
		input.as_bytes().to_vec()
	}

	#[rhai_fn(name = "StringToArrayWithEncoding", return_raw)]
	pub fn string_to_array_with_encoding(
		input: &str,
		encoding: &str,
	) -> Result<Blob, Box<EvalAltResult>> {
		encode(input, encoding).map_err(runtime_error)
	}

	#[rhai_fn(name = "ArrayToString", return_raw)]
	pub fn array_to_string(bytes: Blob) -> Result<String, Box<EvalAltResult>> {
		String::from_utf8(bytes).map_err(|err| {
			runtime_error(format!("bytes are not valid UTF-8: {}", err))
		})
	}

	#[rhai_fn(name = "HexToArray", return_raw)]
	pub fn hex_to_array(text: &str) -> Result<Blob, Box<EvalAltResult>> {
		hex::decode(text.trim())
			.map_err(|err| runtime_error(format!("invalid hex string: {}", err)))
	}

	#[rhai_fn(name = "ArrayToHex")]
	pub fn array_to_hex(bytes: Blob) -> String {
		hex::encode(bytes)
	}

	#[rhai_fn(name = "ToByteArray", return_raw)]
	pub fn to_byte_array(items: Array) -> Result<Blob, Box<EvalAltResult>> {
		items
			.iter()
			.enumerate()
			.map(|(idx, item)| {
				item.as_int()
					.ok()
					.and_then(|v| u8::try_from(v).ok())
					.ok_or_else(|| {
						runtime_error(format!(
							"element {} ({}) is not a byte value",
							idx, item
						))
					})
			})
			.collect()
	}

	#[rhai_fn(name = "Join")]
	pub fn join_bytes(separator: &str, bytes: Blob) -> String {
		join(separator, bytes.iter().map(|b| b.to_string()))
	}

	#[rhai_fn(name = "Join")]
	pub fn join_array(separator: &str, items: Array) -> String {
		join(separator, items.iter().map(super::display_value))
	}

	#[rhai_fn(name = "ReadAllText", return_raw)]
	pub fn read_all_text(path: &str) -> Result<String, Box<EvalAltResult>> {
		fs::read_to_string(path).map_err(|err| io_failure("read", path, err))
	}

	#[rhai_fn(name = "ReadAllBytes", return_raw)]
	pub fn read_all_bytes(path: &str) -> Result<Blob, Box<EvalAltResult>> {
		fs::read(path).map_err(|err| io_failure("read", path, err))
	}

	#[rhai_fn(name = "WriteAllText", return_raw)]
	pub fn write_all_text(path: &str, text: &str) -> Result<bool, Box<EvalAltResult>> {
		fs::write(path, text)
			.map(|_| true)
			.map_err(|err| io_failure("write", path, err))
	}

	#[rhai_fn(name = "WriteAllBytes", return_raw)]
	pub fn write_all_bytes(path: &str, bytes: Blob) -> Result<bool, Box<EvalAltResult>> {
		fs::write(path, bytes)
			.map(|_| true)
			.map_err(|err| io_failure("write", path, err))
	}

	#[rhai_fn(name = "AppendAllText", return_raw)]
	pub fn append_all_text(path: &str, text: &str) -> Result<bool, Box<EvalAltResult>> {
		fs::OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)
			.and_then(|mut file| file.write_all(text.as_bytes()))
			.map(|_| true)
			.map_err(|err| io_failure("append to", path, err))
	}

	#[rhai_fn(name = "FileExists")]
	pub fn file_exists(path: &str) -> bool {
		Path::new(path).is_file()
	}

	#[rhai_fn(name = "DirectoryExists")]
	pub fn directory_exists(path: &str) -> bool {
		Path::new(path).is_dir()
	}
}

type MethodResult = Result<Dynamic, Box<EvalAltResult>>;

fn call_method(value: &HashValue, index: usize, args: &[Dynamic]) -> MethodResult {
	let signature = &value.operations()[index];
	check_arguments(signature, args).map_err(|e| runtime_error(e.to_string()))?;
	value
		.invoke(signature, args)
		.map_err(|e| runtime_error(e.to_string()))
}

/// Registers `HashValue` with method-call syntax for every operation of
/// its surface, plus `Hash`/`BitLength` getters.
fn register_hash_value(engine: &mut Engine) {
	engine
		.register_type_with_name::<HashValue>("HashValue")
		.register_get("Hash", |v: &mut HashValue| -> Blob {
			v.as_bytes().to_vec()
		})
		.register_get("BitLength", |v: &mut HashValue| -> INT {
			v.bit_length() as INT
		})
		.register_fn("to_string", |v: &mut HashValue| v.to_string())
		.register_fn("to_debug", |v: &mut HashValue| {
			format!("HashValue({} bits, {})", v.bit_length(), v)
		});

	let sample = HashValue::from_bytes(Vec::new());
	for (index, signature) in sample.operations().iter().enumerate() {
		match signature.arity() {
			0 => {
				engine.register_fn(
					signature.name,
					move |v: &mut HashValue| -> MethodResult {
						call_method(v, index, &[])
					},
				);
			}
			1 => {
				engine.register_fn(
					signature.name,
					move |v: &mut HashValue, a: Dynamic| -> MethodResult {
						call_method(v, index, &[a])
					},
				);
			}
			_ => {
				engine.register_fn(
					signature.name,
					move |v: &mut HashValue,
					      a: Dynamic,
					      b: Dynamic|
					      -> MethodResult {
						call_method(v, index, &[a, b])
					},
				);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hsc::script::{ScriptEnvironment, ScriptError, ScriptRuntime};

	fn eval(script: &str) -> Result<Vec<Dynamic>, ScriptError> {
		ScriptEnvironment::new().evaluate(script)
	}

	fn eval_string(script: &str) -> String {
		eval(script).unwrap().remove(0).into_string().unwrap()
	}

	#[test]
	fn format_placeholders() {
		let args = [Dynamic::from("CRC"), Dynamic::from(7 as INT)];
		assert_eq!(format_message("{0}: {1}", &args).unwrap(), "CRC: 7");
		assert_eq!(format_message("{{0}} {1}", &args).unwrap(), "{0} 7");
		assert!(format_message("{2}", &args).is_err());
		assert!(format_message("{x}", &args).is_err());
		assert!(format_message("open {", &args).is_err());
		assert!(format_message("close }", &args).is_err());
	}

	#[test]
	fn byte_helpers() {
		assert_eq!(eval_string("Join(\", \", StringToArray(\"abc\"))"), "97, 98, 99");
		assert_eq!(eval_string("ArrayToHex(HexToArray(\"00FFa0\"))"), "00ffa0");
		assert_eq!(
			eval_string("ArrayToString(ToByteArray([104, 105]))"),
			"hi"
		);
		assert!(eval("ToByteArray([1, 256])").is_err());
		assert!(eval("HexToArray(\"abc\")").is_err());
		assert_eq!(eval_string("Join(\"-\", [1, \"x\", true])"), "1-x-true");
	}

	#[test]
	fn encodings() {
		assert_eq!(encode("é", "utf8").unwrap(), vec![0xc3, 0xa9]);
		assert_eq!(encode("é", "UTF-16LE").unwrap(), vec![0xe9, 0x00]);
		assert_eq!(encode("é", "utf16be").unwrap(), vec![0x00, 0xe9]);
		assert_eq!(encode("é", "ascii").unwrap(), vec![b'?']);
		assert_eq!(encode("é", "latin1").unwrap(), vec![0xe9]);
		assert!(encode("x", "ebcdic").is_err());
	}

	#[test]
	fn hash_value_methods() {
		let mut env = ScriptEnvironment::new();
		env.set_variable(
			"Value",
			Dynamic::from(HashValue::from_bytes(vec![0x0f, 0xf0])),
		);
		let text = env
			.evaluate("Value.Coerce(4).AsHexString(true) + Value.AsHexString()")
			.unwrap()
			.remove(0)
			.into_string()
			.unwrap();
		assert_eq!(text, "0F0ff0");
		let bits = env.evaluate("Value.BitLength").unwrap().remove(0);
		assert_eq!(bits.as_int().unwrap(), 16);
		assert!(env.evaluate("Value.Slice(\"x\")").is_err());
	}

	#[test]
	fn file_helpers_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.txt");
		let path = path.to_string_lossy().replace('\\', "/");
		let script = format!(
			"WriteAllText(\"{p}\", \"a\"); AppendAllText(\"{p}\", \"b\"); \
			 FileExists(\"{p}\") && ReadAllText(\"{p}\") == \"ab\"",
			p = path
		);
		let ok = eval(&script).unwrap().remove(0);
		assert!(ok.as_bool().unwrap());
		assert!(eval("ReadAllBytes(\"/nonexistent/file\")").is_err());
	}
}
