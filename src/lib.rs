// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: lib.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

pub mod hsc {
	pub mod app;
	pub mod cli;
	pub mod config;
	pub mod error;
	pub mod logger;
	pub mod matcher;
	pub mod pipeline;
	pub mod registry;
	pub mod resolver;
	pub mod script;
}
