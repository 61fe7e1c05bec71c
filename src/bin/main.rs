// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: main.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

use hashscript::hsc::app;

fn main() {
	std::process::exit(app::run());
}
