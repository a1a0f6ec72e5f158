use crate::schema::{DecodeError, DynamicInstance, FieldTag, Primitive, Registry, SchemaInstance, Slot, TypeTable, decode};

fn install() -> Registry {
	let mut entity = TypeTable {
		name: "Entity".to_owned(),
		order: vec!["label".to_owned(), "hp".to_owned(), "alive".to_owned(), "parts".to_owned()],
		..TypeTable::default()
	};
	entity.tags.insert(0, FieldTag::String);
	entity.tags.insert(1, FieldTag::Number);
	entity.tags.insert(2, FieldTag::Boolean);
	entity.tags.insert(3, FieldTag::Array);
	entity.child_types.insert(3, "Entity".to_owned());

	Registry::install(vec![entity]).expect("registry installs")
}

#[test]
fn new_instance_has_empty_slots() {
	let registry = install();
	let entity = DynamicInstance::new(registry.get("Entity").expect("Entity"));

	assert_eq!(entity.slots().len(), 4);
	assert_eq!(entity.get_string("label").expect("label"), "");
	assert_eq!(entity.get_number("hp").expect("hp"), 0.0);
	assert!(!entity.get_bool("alive").expect("alive"));
	assert!(entity.array("parts").expect("parts").is_empty());
	let tags: Vec<FieldTag> = entity.entries().map(|(_, slot)| slot.tag()).collect();
	assert_eq!(tags, [FieldTag::String, FieldTag::Number, FieldTag::Boolean, FieldTag::Array]);
}

#[test]
fn setters_check_field_kind() {
	let registry = install();
	let mut entity = DynamicInstance::new(registry.get("Entity").expect("Entity"));

	entity.set_string("label", "core").expect("label");
	entity.set_number("hp", 12.5).expect("hp");
	entity.set_bool("alive", true).expect("alive");
	assert_eq!(entity.get_string("label").expect("label"), "core");
	assert_eq!(entity.get_number("hp").expect("hp"), 12.5);
	assert!(entity.get_bool("alive").expect("alive"));

	let err = entity.set_bool("label", true).expect_err("bool into string");
	assert!(matches!(err, DecodeError::FieldTypeMismatch { expected: FieldTag::String, .. }));
	let err = entity.set_by_name("parts", Primitive::from("x")).expect_err("scalar into array");
	assert!(matches!(err, DecodeError::FieldTypeMismatch { expected: FieldTag::Array, .. }));
	assert_eq!(entity.get_string("label").expect("label"), "core");
}

#[test]
fn getters_report_wrong_kind_and_unknown_name() {
	let registry = install();
	let entity = DynamicInstance::new(registry.get("Entity").expect("Entity"));

	let err = entity.get_number("label").expect_err("label is a string");
	assert!(matches!(
		err,
		DecodeError::FieldTypeMismatch {
			expected: FieldTag::Number,
			got: "string",
			..
		}
	));
	let err = entity.map("parts").expect_err("parts is an array");
	assert!(matches!(err, DecodeError::FieldTypeMismatch { got: "array", .. }));
	let err = entity.get("missing").expect_err("no such field");
	assert!(matches!(err, DecodeError::UnknownField { .. }));
}

#[test]
fn self_referencing_array_decodes_into_nested_instances() {
	let registry = install();
	let mut entity = DynamicInstance::new(registry.get("Entity").expect("Entity"));

	// parts: one item whose own parts hold one item labelled "leaf".
	let bytes = [3, 0x01, 0x01, 0x00, 3, 0x01, 0x01, 0x00, 0, 0xa4, b'l', b'e', b'a', b'f', 0xc1, 0xc1];
	decode(&mut entity, &bytes).expect("decode succeeds");

	let parts = entity.array("parts").expect("parts");
	let inner = parts[0].array("parts").expect("inner parts");
	assert_eq!(inner[0].get_string("label").expect("label"), "leaf");
	assert!(matches!(inner[0].get("parts").expect("parts"), Slot::Array(items) if items.is_empty()));
}

#[test]
fn clear_field_resets_slot() {
	let registry = install();
	let mut entity = DynamicInstance::new(registry.get("Entity").expect("Entity"));
	decode(&mut entity, &[0, 0xa1, b'a', 3, 0x01, 0x01, 0x00, 0xc1]).expect("decode succeeds");

	entity.clear_field(0).expect("clear label");
	entity.clear_field(3).expect("clear parts");
	assert_eq!(entity.get_string("label").expect("label"), "");
	assert!(entity.array("parts").expect("parts").is_empty());
	assert!(matches!(entity.clear_field(9), Err(DecodeError::UnknownField { .. })));
}

#[test]
fn debug_output_uses_field_names() {
	let registry = install();
	let mut entity = DynamicInstance::new(registry.get("Entity").expect("Entity"));
	entity.set_string("label", "core").expect("label");

	let rendered = format!("{entity:?}");
	assert!(rendered.starts_with("Entity {"));
	assert!(rendered.contains("label: String(\"core\")"));
}
