use crate::cmd::test_support::{fixture_arg, run_statedec, run_statedec_json, run_statedec_ok};

#[test]
fn schema_json_lists_fields_in_wire_order() {
	let schema = fixture_arg("state.schema.json");
	let json = run_statedec_json(&["schema", &schema, "--json"]);

	let types = json["types"].as_array().expect("types array");
	assert_eq!(types.len(), 2);
	assert_eq!(types[0]["name"], "State");

	let fields = types[0]["fields"].as_array().expect("fields array");
	assert_eq!(fields.len(), 5);
	assert_eq!(fields[2]["name"], "player");
	assert_eq!(fields[2]["type"], "ref");
	assert_eq!(fields[2]["child"], "Player");
	assert!(fields[0]["child"].is_null());
}

#[test]
fn schema_text_filters_one_type() {
	let schema = fixture_arg("state.schema.json");
	let stdout = run_statedec_ok(&["schema", &schema, "--type", "Player"]);

	assert!(stdout.contains("Player (3 fields)"));
	assert!(stdout.contains("  1 x: number"));
	assert!(!stdout.contains("State ("));
}

#[test]
fn schema_with_unknown_tag_is_rejected() {
	let schema = fixture_arg("bad_tag.schema.json");
	let output = run_statedec(&["schema", &schema]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("unknown field tag \"int8\""));
}
