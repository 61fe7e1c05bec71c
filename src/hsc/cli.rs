// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: cli.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use crate::hsc::error::PipelineError;
use clap::{crate_name, Arg, ArgAction, ArgMatches, Command};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_INPUT_FINALIZER: &str = "StringToArray(Input)";
pub const DEFAULT_OUTPUT_FINALIZER: &str = "Join(', ', AsByteArray())";
pub const DEFAULT_OUTPUT: &str = "Print('{0}: {1}', Algorithm, Result)";

const HELP_TEMPLATE: &str = "{before-help}{name} {version}
Written by {author-with-newline}{about-with-newline}
Every algorithm runs four scripts in turn:
  input -> input finalizer (bytes) -> hash -> output finalizer -> output
Single quotes in scripts are turned into double quotes; write \\' for a literal one.
{usage-heading} {usage}

{all-args}{after-help}
";

pub fn build_cli() -> Command {
	Command::new(crate_name!())
		.color(clap::ColorChoice::Never)
		.help_template(HELP_TEMPLATE)
		.bin_name("hsc")
		.version(clap::crate_version!())
		.author(clap::crate_authors!())
		.about("Scriptable hashing: script the input, the digest formatting and the output")
		.args_override_self(true)
		.arg(
			Arg::new("command-line")
				.short('c')
				.long("command-line")
				.value_name("FILE")
				.help("Read further arguments from FILE; explicit arguments override them"),
		)
		.arg(
			Arg::new("list")
				.short('l')
				.long("list")
				.action(ArgAction::SetTrue)
				.help("List the supported algorithms"),
		)
		.arg(
			Arg::new("list-profiles")
				.short('L')
				.long("list-profiles")
				.value_name("NAME")
				.help("List the config profiles of an algorithm"),
		)
		.arg(
			Arg::new("input")
				.short('i')
				.long("input")
				.value_name("SCRIPT")
				.help("Script producing the value to hash"),
		)
		.arg(
			Arg::new("input-finalizer")
				.short('I')
				.long("input-finalizer")
				.value_name("SCRIPT")
				.default_value(DEFAULT_INPUT_FINALIZER)
				.help("Script turning `Input` into a byte array"),
		)
		.arg(
			Arg::new("algorithms")
				.short('a')
				.long("algorithms")
				.value_name("QUERY")
				.help("`*` or space-separated Name / Name:Variable tokens"),
		)
		.arg(
			Arg::new("output-finalizer")
				.short('O')
				.long("output-finalizer")
				.value_name("SCRIPT")
				.default_value(DEFAULT_OUTPUT_FINALIZER)
				.help("Script evaluated against the digest's members"),
		)
		.arg(
			Arg::new("output")
				.short('o')
				.long("output")
				.value_name("SCRIPT")
				.default_value(DEFAULT_OUTPUT)
				.help("Script receiving `Result`, `Algorithm` and `Variable`"),
		)
		.arg(
			Arg::new("config-profiles")
				.short('p')
				.long("config-profiles")
				.value_name("QUERY")
				.help("Space-separated Name=Profile / Name:Variable=Profile pairs"),
		)
		.arg(
			Arg::new("config-file")
				.short('f')
				.long("config-file")
				.value_name("FILE")
				.help("JSON document with per-algorithm profiles and overrides"),
		)
}

/// What the parsed command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
	List,
	ListProfiles(String),
	Run(RunOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
	pub input: String,
	pub input_finalizer: String,
	pub algorithms: String,
	pub output_finalizer: String,
	pub output: String,
	pub config_profiles: Option<String>,
	pub config_file: Option<PathBuf>,
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
	matches.get_one::<String>(name).cloned()
}

fn required(matches: &ArgMatches, name: &str) -> Result<String, PipelineError> {
	match optional(matches, name) {
		Some(value) if !value.trim().is_empty() => Ok(value),
		Some(_) => Err(PipelineError::argument(format!(
			"--{} must not be blank",
			name
		))),
		None => Err(PipelineError::argument(format!(
			"--{} is required",
			name
		))),
	}
}

impl Invocation {
	pub fn from_matches(matches: &ArgMatches) -> Result<Self, PipelineError> {
		if matches.get_flag("list") {
			return Ok(Invocation::List);
		}
		if let Some(name) = optional(matches, "list-profiles") {
			return Ok(Invocation::ListProfiles(name));
		}
		Ok(Invocation::Run(RunOptions {
			input: required(matches, "input")?,
			input_finalizer: required(matches, "input-finalizer")?,
			algorithms: required(matches, "algorithms")?,
			output_finalizer: required(matches, "output-finalizer")?,
			output: required(matches, "output")?,
			config_profiles: optional(matches, "config-profiles"),
			config_file: optional(matches, "config-file").map(PathBuf::from),
		}))
	}
}

/// Splits command-line file text into arguments. Line breaks count as
/// spaces and `"` toggles quoting; the quote characters are dropped.
pub fn tokenize(text: &str) -> Result<Vec<String>, PipelineError> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut quoted = false;
	let mut pending = false;
	for c in text.chars() {
		match c {
			'"' => {
				quoted = !quoted;
				pending = true;
			}
			c if c.is_whitespace() && !quoted => {
				if pending {
					tokens.push(std::mem::take(&mut current));
					pending = false;
				}
			}
			'\r' | '\n' => {
				current.push(' ');
			}
			c => {
				current.push(c);
				pending = true;
			}
		}
	}
	if quoted {
		return Err(PipelineError::argument(
			"command-line file has an unterminated quote",
		));
	}
	if pending {
		tokens.push(current);
	}
	Ok(tokens)
}

fn command_line_path(arg: &str) -> Option<Option<&str>> {
	match arg {
		"-c" | "--command-line" => Some(None),
		_ => arg.strip_prefix("--command-line=").map(Some),
	}
}

fn expand(
	args: Vec<String>,
	chain: &mut Vec<PathBuf>,
) -> Result<Vec<String>, PipelineError> {
	let mut from_files = Vec::new();
	let mut explicit = Vec::new();
	let mut iter = args.into_iter();
	while let Some(arg) = iter.next() {
		let path = match command_line_path(&arg) {
			None => {
				explicit.push(arg);
				continue;
			}
			Some(Some(path)) => path.to_string(),
			Some(None) => iter.next().ok_or_else(|| {
				PipelineError::argument(format!("{} requires a FILE", arg))
			})?,
		};
		let canonical = fs::canonicalize(&path).map_err(|err| {
			PipelineError::argument(format!(
				"cannot open command-line file '{}': {}",
				path, err
			))
		})?;
		if chain.contains(&canonical) {
			return Err(PipelineError::argument(format!(
				"command-line file '{}' includes itself",
				path
			)));
		}
		let text = fs::read_to_string(&canonical).map_err(|err| {
			PipelineError::argument(format!(
				"cannot read command-line file '{}': {}",
				path, err
			))
		})?;
		chain.push(canonical);
		let tokens = expand(tokenize(&text)?, chain)?;
		chain.pop();
		from_files.extend(tokens);
	}
	from_files.extend(explicit);
	Ok(from_files)
}

/// Replaces every `--command-line FILE` pair with the file's arguments.
/// File arguments come first so explicit ones override them.
pub fn expand_command_lines(
	args: Vec<String>,
) -> Result<Vec<String>, PipelineError> {
	let mut args = args.into_iter();
	let mut expanded: Vec<String> = args.next().into_iter().collect();
	expanded.extend(expand(args.collect(), &mut Vec::new())?);
	Ok(expanded)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn args(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn matches(list: &[&str]) -> ArgMatches {
		build_cli().try_get_matches_from(args(list)).unwrap()
	}

	#[test]
	fn tokenizer_honours_quotes_and_newlines() {
		let tokens =
			tokenize("-i \"'a b'\"\n-a   CRC:x\r\n-o \"Print(\n'{0}', Result)\"")
				.unwrap();
		assert_eq!(
			tokens,
			args(&["-i", "'a b'", "-a", "CRC:x", "-o", "Print( '{0}', Result)"])
		);
		assert_eq!(tokenize("\"\"").unwrap(), args(&[""]));
		assert!(tokenize("-i \"open").is_err());
	}

	#[test]
	fn defaults_fill_the_optional_scripts() {
		let invocation =
			Invocation::from_matches(&matches(&["hsc", "-i", "'x'", "-a", "MD5"]))
				.unwrap();
		let Invocation::Run(options) = invocation else {
			panic!("expected a run");
		};
		assert_eq!(options.input_finalizer, DEFAULT_INPUT_FINALIZER);
		assert_eq!(options.output_finalizer, DEFAULT_OUTPUT_FINALIZER);
		assert_eq!(options.output, DEFAULT_OUTPUT);
		assert_eq!(options.config_file, None);
	}

	#[test]
	fn missing_or_blank_scripts_are_argument_errors() {
		assert!(matches!(
			Invocation::from_matches(&matches(&["hsc", "-a", "MD5"])),
			Err(PipelineError::Argument(_))
		));
		assert!(matches!(
			Invocation::from_matches(&matches(&["hsc", "-i", " ", "-a", "MD5"])),
			Err(PipelineError::Argument(_))
		));
		assert_eq!(
			Invocation::from_matches(&matches(&["hsc", "-L", "CRC"])).unwrap(),
			Invocation::ListProfiles("CRC".into())
		);
	}

	#[test]
	fn file_arguments_precede_and_yield_to_explicit_ones() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "-a MD5 -i \"'from file'\"").unwrap();
		let path = file.path().to_string_lossy().to_string();
		let expanded = expand_command_lines(args(&[
			"hsc", "-i", "'cli'", "-c", &path,
		]))
		.unwrap();
		assert_eq!(
			expanded,
			args(&["hsc", "-a", "MD5", "-i", "'from file'", "-i", "'cli'"])
		);
		let m = build_cli().try_get_matches_from(expanded).unwrap();
		assert_eq!(m.get_one::<String>("input").unwrap(), "'cli'");
	}

	#[test]
	fn self_referencing_files_are_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let first = dir.path().join("first.txt");
		let second = dir.path().join("second.txt");
		fs::write(&first, format!("-c \"{}\"", second.display())).unwrap();
		fs::write(&second, format!("--command-line=\"{}\"", first.display()))
			.unwrap();
		let err = expand_command_lines(args(&[
			"hsc",
			"-c",
			&first.to_string_lossy(),
		]))
		.unwrap_err();
		assert!(err.to_string().contains("includes itself"), "{}", err);
		assert!(expand_command_lines(args(&["hsc", "-c"])).is_err());
		assert!(
			expand_command_lines(args(&["hsc", "-c", "/no/such/file"])).is_err()
		);
	}
}
