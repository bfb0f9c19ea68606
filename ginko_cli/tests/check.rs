mod common;

use ginko_core::AnyEmptyResult;
use rstest::rstest;
use serde_json::Value;

fn write_notes(root: &std::path::Path) -> AnyEmptyResult {
	std::fs::write(root.join("good.md"), "::note\nfine\n::\n")?;
	std::fs::write(root.join("bad.md"), "::snippet\nNo id here\n::\n")?;
	std::fs::write(root.join("broken.md"), "::tabs\n--tab A\n")?;
	Ok(())
}

#[test]
fn check_passes_when_every_note_converts() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_notes(tmp.path())?;

	common::ginko_cmd()
		.arg("check")
		.arg(tmp.path().join("good.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed: 1 note(s)"));

	Ok(())
}

#[rstest]
#[case::rule_error("bad.md", "rule `snippet` requires")]
#[case::parse_error("broken.md", "is never closed")]
#[case::missing_file("missing.md", "failed to read")]
fn check_fails_on_bad_notes(#[case] file: &str, #[case] message: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_notes(tmp.path())?;

	common::ginko_cmd()
		.arg("check")
		.arg(tmp.path().join("good.md"))
		.arg(tmp.path().join(file))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains(message))
		.stdout(predicates::str::contains("Check failed: 1 of 2"));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_notes(tmp.path())?;

	let output = common::ginko_cmd()
		.arg("check")
		.arg(tmp.path().join("good.md"))
		.arg(tmp.path().join("broken.md"))
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();

	let value: Value = serde_json::from_slice(&output)?;
	assert_eq!(value["ok"], false);
	assert_eq!(value["files"][0]["ok"], true);
	assert_eq!(value["files"][1]["ok"], false);
	assert!(
		value["files"][1]["error"]
			.as_str()
			.is_some_and(|error| error.contains("--tab"))
	);

	Ok(())
}

#[test]
fn check_requires_inputs() {
	common::ginko_cmd().arg("check").assert().failure();
}

#[test]
fn init_creates_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::ginko_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"));

	let content = std::fs::read_to_string(tmp.path().join("ginko.toml"))?;
	let config = ginko_core::GinkoConfig::from_toml(&content)?;
	assert_eq!(config, ginko_core::GinkoConfig::default());

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(tmp.path().join(".config/ginko.toml"), "[faq]\nid_length = 4\n")?;

	common::ginko_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert!(!tmp.path().join("ginko.toml").exists());

	Ok(())
}

#[test]
fn no_subcommand_fails() {
	common::ginko_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
