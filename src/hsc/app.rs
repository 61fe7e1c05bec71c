// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: app.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use crate::hsc::cli::{self, Invocation, RunOptions};
use crate::hsc::config::ConfigCatalog;
use crate::hsc::error::{
	describe, PipelineError, EXIT_FAILURE, EXIT_SUCCESS,
};
use crate::hsc::logger;
use crate::hsc::matcher::ProfileQuery;
use crate::hsc::pipeline::{Pipeline, Scripts};
use crate::hsc::registry::{self, AlgorithmCategory};
use crate::hsc::resolver::{resolve, resolve_first};
use crate::hsc::script::{stringize, ScriptEnvironment};
use clap::error::ErrorKind;
use clap::ArgMatches;
use strum::IntoEnumIterator;

/// Entry point of the `hsc` binary; returns the process exit code.
pub fn run() -> i32 {
	run_from(
		std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()),
	)
}

pub fn run_from<I, T>(args: I) -> i32
where
	I: IntoIterator<Item = T>,
	T: Into<String>,
{
	let args: Vec<String> = args.into_iter().map(Into::into).collect();
	if args.len() <= 1 {
		let _ = cli::build_cli().print_help();
		return EXIT_SUCCESS;
	}

	let args = match cli::expand_command_lines(args) {
		Ok(args) => args,
		Err(err) => return report(&err),
	};
	let matches = match cli::build_cli().try_get_matches_from(args) {
		Ok(matches) => matches,
		Err(err) => {
			let _ = err.print();
			return match err.kind() {
				ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
					EXIT_SUCCESS
				}
				_ => EXIT_FAILURE,
			};
		}
	};

	match execute(&matches) {
		Ok(()) => EXIT_SUCCESS,
		Err(err) => report(&err),
	}
}

fn report(err: &PipelineError) -> i32 {
	logger::error(&describe(err));
	if let PipelineError::Lookup(_) = err {
		list_algorithms();
	}
	err.exit_code()
}

pub fn execute(matches: &ArgMatches) -> Result<(), PipelineError> {
	match Invocation::from_matches(matches)? {
		Invocation::List => {
			list_algorithms();
			Ok(())
		}
		Invocation::ListProfiles(name) => list_profiles(&name),
		Invocation::Run(options) => run_pipeline(&options),
	}
}

fn list_algorithms() {
	for category in AlgorithmCategory::iter() {
		logger::inform(&format!("{} algorithms:", category));
		for algorithm in registry::algorithms_in(category) {
			logger::log(algorithm.name());
		}
	}
}

fn list_profiles(name: &str) -> Result<(), PipelineError> {
	let variable = resolve_first(name).ok_or_else(|| {
		PipelineError::lookup(format!(
			"invalid or unsupported algorithm '{}'",
			name
		))
	})?;
	let algorithm = variable.algorithm();
	if algorithm.profiles().is_empty() {
		logger::warning(&format!(
			"{} has no config profiles",
			algorithm.name()
		));
		return Ok(());
	}
	logger::inform(&format!("Config profiles of {}:", algorithm.name()));
	for profile in algorithm.profiles() {
		match profile.description {
			Some(description) => {
				logger::log(&format!("{}: {}", profile.name, description))
			}
			None => logger::log(profile.name),
		}
	}
	Ok(())
}

fn load_catalog(
	options: &RunOptions,
) -> Result<Option<ConfigCatalog>, PipelineError> {
	let Some(path) = options.config_file.as_deref() else {
		return Ok(None);
	};
	let catalog = ConfigCatalog::from_path(path)?;
	for warning in catalog.warnings() {
		logger::warning(&describe(warning));
	}
	Ok(Some(catalog))
}

fn run_pipeline(options: &RunOptions) -> Result<(), PipelineError> {
	let profiles = options
		.config_profiles
		.as_deref()
		.map(ProfileQuery::parse)
		.transpose()
		.map_err(|err| {
			PipelineError::argument(format!("--config-profiles: {}", err))
		})?;
	let catalog = load_catalog(options)?;
	if profiles.is_some() && catalog.is_some() {
		logger::warning(
			"both --config-profiles and --config-file are given; profiles take precedence",
		);
	}

	let variables = resolve(&options.algorithms);
	if variables.is_empty() {
		return Err(PipelineError::lookup(format!(
			"invalid or unsupported algorithm '{}'",
			options.algorithms
		)));
	}

	let scripts = Scripts {
		input: stringize(&options.input),
		input_finalizer: stringize(&options.input_finalizer),
		output_finalizer: stringize(&options.output_finalizer),
		output: stringize(&options.output),
	};
	let mut runtime = ScriptEnvironment::new();
	Pipeline::new(&mut runtime, &scripts)
		.with_profiles(profiles.as_ref())
		.with_catalog(catalog.as_ref())
		.run(&variables)
}
