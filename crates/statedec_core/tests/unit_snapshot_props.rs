#![allow(missing_docs)]

use indexmap::IndexMap;
use proptest::prelude::*;
use statedec::schema::decode;
use statedec_testkit::{Player, State, encode_state};

fn player() -> impl Strategy<Value = Player> {
	("[a-z]{0,40}", any::<i32>(), any::<i32>()).prop_map(|(name, x, y)| Player { name, x, y })
}

fn state() -> impl Strategy<Value = State> {
	(
		".{0,64}",
		any::<f32>().prop_filter("nan never compares equal", |v| !v.is_nan()),
		proptest::option::of(player()),
		proptest::collection::vec(player(), 0..8),
		proptest::collection::vec(("[a-z]{1,8}", player()), 0..8),
	)
		.prop_map(|(field_string, number, player, array_of_players, entries)| State {
			field_string,
			number,
			player: player.map(Box::new),
			array_of_players,
			map_of_players: entries.into_iter().collect::<IndexMap<_, _>>(),
		})
}

proptest! {
	#[test]
	fn snapshot_decodes_to_encoded_state(expected in state()) {
		let bytes = encode_state(&expected);
		let mut decoded = State::default();
		let consumed = decode(&mut decoded, &bytes).expect("snapshot decodes");
		prop_assert_eq!(consumed, bytes.len());
		prop_assert_eq!(decoded, expected);
	}

	#[test]
	fn truncated_snapshot_never_panics(expected in state(), cut in 0usize..512) {
		let bytes = encode_state(&expected);
		let cut = cut.min(bytes.len());
		let mut decoded = State::default();
		let _ = decode(&mut decoded, &bytes[..cut]);
	}
}
