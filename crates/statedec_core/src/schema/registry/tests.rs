use crate::schema::{ChildType, DecodeError, FieldTag, MAX_FIELDS, Registry, TypeDescriptor, TypeTable};

fn table(name: &str, fields: &[(&str, FieldTag, Option<&str>)]) -> TypeTable {
	let mut out = TypeTable {
		name: name.to_owned(),
		..TypeTable::default()
	};
	for (index, (field, tag, child)) in fields.iter().enumerate() {
		out.order.push((*field).to_owned());
		out.tags.insert(index as u8, *tag);
		if let Some(child) = child {
			out.child_types.insert(index as u8, (*child).to_owned());
		}
	}
	out
}

fn assert_schema_error(result: crate::schema::Result<TypeDescriptor>, needle: &str) {
	match result {
		Err(DecodeError::SchemaDefinition { reason, .. }) => assert!(reason.contains(needle), "reason {reason:?} lacks {needle:?}"),
		other => panic!("expected schema definition error, got {other:?}"),
	}
}

#[test]
fn builder_assigns_dense_indices_in_order() {
	let descriptor = TypeDescriptor::builder("Player")
		.field("name", FieldTag::String)
		.field("x", FieldTag::Number)
		.field("y", FieldTag::Number)
		.build()
		.expect("valid schema");

	assert_eq!(descriptor.name(), "Player");
	assert_eq!(descriptor.fields().len(), 3);
	for (position, field) in descriptor.fields().iter().enumerate() {
		assert_eq!(usize::from(field.index), position);
		assert!(field.child.is_none());
	}
	assert_eq!(descriptor.index_of("y"), Some(2));
	assert_eq!(descriptor.field(1).map(|field| field.tag), Some(FieldTag::Number));
	assert!(descriptor.field(3).is_none());
}

#[test]
fn order_and_tag_counts_must_match() {
	let result = TypeDescriptor::from_tables("State", ["a", "b"], [(0, FieldTag::String)], Vec::<(u8, ChildType)>::new());
	assert_schema_error(result, "2 names but 1 tags");
}

#[test]
fn tag_indices_must_be_dense() {
	let result = TypeDescriptor::from_tables(
		"State",
		["a", "b"],
		[(0, FieldTag::String), (2, FieldTag::Number)],
		Vec::<(u8, ChildType)>::new(),
	);
	assert_schema_error(result, "not dense");
}

#[test]
fn child_types_only_on_container_tags() {
	let result = TypeDescriptor::from_tables("State", ["a"], [(0, FieldTag::Number)], [(0, ChildType::named("Player"))]);
	assert_schema_error(result, "cannot have a child type");

	let result = TypeDescriptor::from_tables("State", ["a"], [(0, FieldTag::Map)], Vec::<(u8, ChildType)>::new());
	assert_schema_error(result, "has no child type");

	let result = TypeDescriptor::from_tables("State", ["a"], [(0, FieldTag::String)], [(4, ChildType::named("Player"))]);
	assert_schema_error(result, "unknown field index 4");
}

#[test]
fn duplicate_field_names_are_rejected() {
	let result = TypeDescriptor::builder("State").field("a", FieldTag::String).field("a", FieldTag::Number).build();
	assert_schema_error(result, "duplicate field name a");
}

#[test]
fn field_count_is_capped_below_reserved_markers() {
	let mut builder = TypeDescriptor::builder("Wide");
	for index in 0..=MAX_FIELDS {
		builder = builder.field(&format!("f{index}"), FieldTag::Number);
	}
	assert_schema_error(builder.build(), "exceed the limit");
}

#[test]
fn install_links_forward_and_self_references() {
	let registry = Registry::install(vec![
		table(
			"State",
			&[
				("fieldString", FieldTag::String, None),
				("player", FieldTag::Ref, Some("Player")),
			],
		),
		table("Player", &[("name", FieldTag::String, None), ("next", FieldTag::Ref, Some("Player"))]),
	])
	.expect("registry installs");

	assert_eq!(registry.len(), 2);
	let state = registry.get("State").expect("State installed");
	let player = registry.get("Player").expect("Player installed");
	let child = state.field(1).and_then(|field| field.child_descriptor()).expect("child linked");
	assert!(std::ptr::eq(child, player));
	let next = player.field(1).and_then(|field| field.child_descriptor()).expect("self link");
	assert!(std::ptr::eq(next, player));
}

#[test]
fn install_rejects_undeclared_child_and_duplicates() {
	let err = Registry::install(vec![table("State", &[("player", FieldTag::Ref, Some("Ghost"))])]).expect_err("unknown child");
	assert!(matches!(err, DecodeError::SchemaDefinition { ref reason, .. } if reason.contains("undeclared type Ghost")));

	let err = Registry::install(vec![table("A", &[]), table("A", &[])]).expect_err("duplicate type");
	assert!(matches!(err, DecodeError::SchemaDefinition { ref reason, .. } if reason.contains("declared twice")));
}

#[test]
fn tag_names_parse_back() {
	for tag in [FieldTag::String, FieldTag::Number, FieldTag::Boolean, FieldTag::Ref, FieldTag::Array, FieldTag::Map] {
		assert_eq!(FieldTag::parse(tag.as_str()), Some(tag));
	}
	assert_eq!(FieldTag::parse("float"), None);
}
