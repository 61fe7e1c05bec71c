// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashscript

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn hsc() -> assert_cmd::Command {
	let mut cmd = cargo_bin_cmd!("hsc");
	cmd.env("NO_COLOR", "1");
	cmd
}

fn config_file(json: &str) -> (TempDir, PathBuf) {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = dir.path().join("config.json");
	fs::write(&path, json).expect("write config");
	(dir, path)
}

/// Runs `query` on "abc" printing `Algorithm: BitLength`.
fn bit_lengths(query: &str) -> assert_cmd::Command {
	let mut cmd = hsc();
	cmd.args(["-i", "'abc'", "-a", query, "-O", "BitLength"]);
	cmd
}

#[test]
fn unknown_algorithm_in_config_is_skipped_with_a_warning() {
	let (_dir, path) = config_file(
		r#"{
			"NoSuchHash": {"profile": "Fast"},
			"CRC": {"profile": "CRC8"}
		}"#,
	);
	bit_lengths("CRC")
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stderr(predicate::str::contains("'NoSuchHash' does not name"))
		.stdout(predicate::str::contains("CRC: 8"));
}

#[test]
fn profile_query_beats_config_file() {
	let (_dir, path) = config_file(r#"{"CRC": {"profile": "CRC8"}}"#);
	bit_lengths("CRC")
		.args(["-p", "CRC=CRC16"])
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stderr(predicate::str::contains("profiles take precedence"))
		.stdout(predicate::str::contains("CRC: 16"));
}

#[test]
fn named_instances_fall_back_to_the_algorithm_wide_entry() {
	let (_dir, path) = config_file(
		r#"{
			"CRC": {"profile": "CRC8"},
			"CRC:wide": {"profile": "CRC64"}
		}"#,
	);
	bit_lengths("CRC:narrow CRC:wide MD5")
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stdout(predicate::str::contains("CRC:narrow: 8"))
		.stdout(predicate::str::contains("CRC:wide: 64"))
		.stdout(predicate::str::contains("MD5: 128"));
}

#[test]
fn qualified_profile_entries_outrank_bare_ones() {
	bit_lengths("CRC:a CRC:b")
		.args(["-p", "CRC=CRC16 CRC:b=CRC64"])
		.assert()
		.success()
		.stdout(predicate::str::contains("CRC:a: 16"))
		.stdout(predicate::str::contains("CRC:b: 64"));
}

#[test]
fn first_entry_for_an_instance_wins() {
	let (_dir, path) = config_file(
		r#"{
			"CRC": {"profile": "CRC8"},
			"crc": {"profile": "CRC16"}
		}"#,
	);
	bit_lengths("CRC")
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stderr(predicate::str::contains("keeping the first"))
		.stdout(predicate::str::contains("CRC: 8"));
}

#[test]
fn field_overrides_are_applied() {
	let (_dir, path) = config_file(
		r#"{
			"Argon2id": {"config": {
				"iterations": 1,
				"MemorySize": 64,
				"HashSizeInBits": 128
			}},
			"Blake2b": {"config": {"HashSizeInBits": 160}}
		}"#,
	);
	bit_lengths("Argon2id Blake2b")
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stdout(predicate::str::contains("Argon2id: 128"))
		.stdout(predicate::str::contains("Blake2b: 160"));
}

#[test]
fn coercion_failures_skip_only_that_entry() {
	let (_dir, path) = config_file(
		r#"{
			"xxHash": {"config": {"HashSizeInBits": 64, "Seed": -1}},
			"SHA3": {"config": {"HashSizeInBits": 512.5}},
			"SHA2": {"config": {"HashSizeInBits": 512}}
		}"#,
	);
	bit_lengths("xxHash SHA3 SHA2")
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stderr(predicate::str::contains("'xxHash': cannot apply field 'Seed'"))
		.stderr(predicate::str::contains("'SHA3': cannot apply field"))
		.stdout(predicate::str::contains("xxHash: 32"))
		.stdout(predicate::str::contains("SHA3: 256"))
		.stdout(predicate::str::contains("SHA2: 512"));
}

#[test]
fn unknown_fields_are_ignored_but_the_rest_applies() {
	let (_dir, path) = config_file(
		r#"{"SHA2": {"config": {"Colour": "blue", "HashSizeInBits": 384}}}"#,
	);
	bit_lengths("SHA2")
		.arg("-f")
		.arg(&path)
		.assert()
		.success()
		.stderr(predicate::str::contains("'Colour' is not a writable config field"))
		.stdout(predicate::str::contains("SHA2: 384"));
}

#[test]
fn unusable_config_documents_exit_with_one() {
	let (_dir, path) = config_file("{ not json");
	bit_lengths("MD5").arg("-f").arg(&path).assert().code(1);
	let (_dir, path) = config_file("[1, 2, 3]");
	bit_lengths("MD5").arg("-f").arg(&path).assert().code(1);
	bit_lengths("MD5")
		.args(["-f", "/no/such/config.json"])
		.assert()
		.code(1)
		.stderr(predicate::str::contains("config file"));
}
