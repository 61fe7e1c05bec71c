// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript
// File: logger.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Timestamped console lines: `[MM/dd/yy-HH:mm:ss] [LEVEL]: message`.
//!
//! Warnings and errors go to stderr, everything else to stdout. Color is
//! dropped automatically when `NO_COLOR` is set.

use chrono::Utc;
use colored::{Color, Colorize};
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
	Log,
	Informative,
	Warn,
	Error,
	Script,
}

impl Level {
	fn color(self) -> Color {
		match self {
			Level::Log => Color::White,
			Level::Informative => Color::Green,
			Level::Warn => Color::Yellow,
			Level::Error => Color::Red,
			Level::Script => Color::BrightWhite,
		}
	}

	fn to_stderr(self) -> bool {
		matches!(self, Level::Warn | Level::Error)
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Level::Log => "LOG",
			Level::Informative => "INFORMATIVE",
			Level::Warn => "WARN",
			Level::Error => "ERROR",
			Level::Script => "SCRIPT",
		})
	}
}

pub fn format_line(level: Level, message: &str) -> String {
	format!(
		"[{}] [{}]: {}",
		Utc::now().format("%m/%d/%y-%H:%M:%S"),
		level,
		message
	)
}

fn emit(level: Level, message: &str) {
	let line = format_line(level, message).color(level.color());
	// A closed pipe must not abort the run.
	if level.to_stderr() {
		let _ = writeln!(io::stderr().lock(), "{}", line);
	} else {
		let _ = writeln!(io::stdout().lock(), "{}", line);
	}
}

pub fn log(message: &str) {
	emit(Level::Log, message);
}

pub fn inform(message: &str) {
	emit(Level::Informative, message);
}

pub fn warning(message: &str) {
	emit(Level::Warn, message);
}

pub fn error(message: &str) {
	emit(Level::Error, message);
}

pub fn script(message: &str) {
	emit(Level::Script, message);
}

/// Writes `message` without decoration, adding a newline if it lacks one.
pub fn script_direct(message: &str) {
	let line = message.color(Level::Script.color());
	let mut out = io::stdout().lock();
	let _ = if message.ends_with('\n') {
		write!(out, "{}", line)
	} else {
		writeln!(out, "{}", line)
	};
	let _ = out.flush();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn line_layout() {
		let line = format_line(Level::Warn, "careful");
		assert!(line.starts_with('['));
		assert!(line.ends_with("] [WARN]: careful"));
		let stamp = &line[1..line.find(']').unwrap()];
		assert_eq!(stamp.len(), "01/02/25-13:04:05".len());
		assert_eq!(&stamp[2..3], "/");
		assert_eq!(&stamp[8..9], "-");
	}

	#[test]
	fn levels_route_by_severity() {
		assert!(Level::Error.to_stderr());
		assert!(Level::Warn.to_stderr());
		assert!(!Level::Script.to_stderr());
		assert_eq!(Level::Informative.to_string(), "INFORMATIVE");
	}
}
