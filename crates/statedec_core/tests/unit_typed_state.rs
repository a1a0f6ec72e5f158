#![allow(missing_docs)]

use statedec::schema::{DecodeError, decode};
use statedec_testkit::{BufferBuilder, Player, State, encode_player, encode_state};

#[test]
fn hello_world_buffer_updates_typed_fields() {
	let bytes = BufferBuilder::new().field(0).string("Hello world").field(1).uint(200).build();
	assert_eq!(bytes, [0, 0xab, b'H', b'e', b'l', b'l', b'o', b' ', b'w', b'o', b'r', b'l', b'd', 1, 0xcc, 0xc8]);

	let mut state = State::default();
	decode(&mut state, &bytes).expect("decode succeeds");

	assert_eq!(state.field_string, "Hello world");
	assert_eq!(state.number, 200.0);
}

#[test]
fn full_snapshot_reproduces_state() {
	let mut expected = State {
		field_string: "lobby".to_owned(),
		number: 2.5,
		player: Some(Box::new(Player {
			name: "host".to_owned(),
			x: -4,
			y: 300,
		})),
		..State::default()
	};
	for (idx, name) in ["a", "b", "c"].into_iter().enumerate() {
		expected.array_of_players.push(Player {
			name: name.to_owned(),
			x: idx as i32,
			y: -(idx as i32),
		});
	}
	expected.map_of_players.insert(
		"one".to_owned(),
		Player {
			name: "first".to_owned(),
			x: 70_000,
			y: -70_000,
		},
	);
	expected.map_of_players.insert("two".to_owned(), Player::default());

	let bytes = encode_state(&expected);
	let mut state = State::default();
	let consumed = decode(&mut state, &bytes).expect("decode succeeds");

	assert_eq!(consumed, bytes.len());
	assert_eq!(state, expected);
}

#[test]
fn patches_apply_on_top_of_snapshot() {
	let mut state = State::default();
	let snapshot = State {
		player: Some(Box::new(Player {
			name: "host".to_owned(),
			x: 1,
			y: 1,
		})),
		..State::default()
	};
	decode(&mut state, &encode_state(&snapshot)).expect("snapshot decodes");

	let patch = BufferBuilder::new().field(2).field(1).int(9).end().field(1).float32(0.5).build();
	decode(&mut state, &patch).expect("patch decodes");

	let player = state.player.as_deref().expect("player kept");
	assert_eq!(player.name, "host");
	assert_eq!(player.x, 9);
	assert_eq!(player.y, 1);
	assert_eq!(state.number, 0.5);
}

#[test]
fn array_move_keeps_item_state() {
	let mut state = State::default();
	let players = [
		Player {
			name: "a".to_owned(),
			x: 1,
			y: 0,
		},
		Player {
			name: "b".to_owned(),
			x: 2,
			y: 0,
		},
		Player {
			name: "c".to_owned(),
			x: 3,
			y: 0,
		},
	];
	let mut snapshot = BufferBuilder::new().field(3).uint(3).uint(3);
	for (position, player) in players.iter().enumerate() {
		snapshot = encode_player(snapshot.uint(position as u64), player);
	}
	decode(&mut state, &snapshot.build()).expect("snapshot decodes");

	// Remove "a": "b" and "c" shift down one position each.
	let shift = BufferBuilder::new()
		.field(3)
		.uint(2)
		.uint(2)
		.uint(0)
		.index_change()
		.uint(1)
		.end()
		.uint(1)
		.index_change()
		.uint(2)
		.end()
		.build();
	decode(&mut state, &shift).expect("shift decodes");

	assert_eq!(state.array_of_players, players[1..]);
}

#[test]
fn map_delete_and_insert_in_one_patch() {
	let mut state = State::default();
	let snapshot = BufferBuilder::new().field(4).uint(1).string("gone");
	let snapshot = encode_player(snapshot, &Player::default()).build();
	decode(&mut state, &snapshot).expect("snapshot decodes");

	let patch = BufferBuilder::new().field(4).uint(2).nil().uint(0).string("new");
	let patch = encode_player(
		patch,
		&Player {
			name: "n".to_owned(),
			x: 5,
			y: 6,
		},
	)
	.build();
	decode(&mut state, &patch).expect("patch decodes");

	assert_eq!(state.map_of_players.len(), 1);
	assert_eq!(state.map_of_players["new"].name, "n");
}

#[test]
fn nil_clears_typed_ref() {
	let mut state = State {
		player: Some(Box::default()),
		..State::default()
	};
	decode(&mut state, &BufferBuilder::new().nil().field(2).build()).expect("clear decodes");
	assert!(state.player.is_none());
}

#[test]
fn integer_too_wide_for_slot_is_a_mismatch() {
	let mut state = State::default();
	let bytes = BufferBuilder::new().field(2).field(1).uint(u64::from(u32::MAX)).end().build();

	let err = decode(&mut state, &bytes).expect_err("u32::MAX does not fit i32");
	assert!(matches!(err, DecodeError::FieldTypeMismatch { got: "number", .. }));
	assert_eq!(state.player.as_deref().map(|player| player.x), Some(0));
}

#[test]
fn boolean_into_number_field_is_rejected() {
	let mut state = State::default();
	let err = decode(&mut state, &BufferBuilder::new().field(1).bool(true).build()).expect_err("bool for number field");
	assert!(matches!(err, DecodeError::FieldTypeMismatch { got: "boolean", .. }));
	assert_eq!(state.number, 0.0);
}
