use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

static STATEDEC_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn fixture_arg(name: &str) -> String {
	statedec_testkit::fixture_path(name).to_string_lossy().into_owned()
}

pub(crate) fn run_statedec(args: &[&str]) -> Output {
	Command::new(statedec_bin()).args(args).output().expect("statedec command executes")
}

pub(crate) fn run_statedec_ok(args: &[&str]) -> String {
	let output = run_statedec(args);
	assert!(
		output.status.success(),
		"statedec command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout should be utf-8")
}

pub(crate) fn run_statedec_json(args: &[&str]) -> serde_json::Value {
	let stdout = run_statedec_ok(args);
	serde_json::from_str(&stdout).expect("stdout should be valid json")
}

fn statedec_bin() -> &'static PathBuf {
	STATEDEC_BIN.get_or_init(resolve_statedec_bin)
}

fn resolve_statedec_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_statedec") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let mut bin = statedec_testkit::target_dir().join("debug");
	bin.push(if cfg!(windows) { "statedec.exe" } else { "statedec" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "statedec"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build statedec binary at {}", bin.display());

	bin
}
