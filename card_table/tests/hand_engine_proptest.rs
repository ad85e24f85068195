/// Property-based tests for the hand engine using proptest
///
/// Random action sequences from random players are thrown at a table and
/// the chip accounting and versioning rules are checked after every step.
use card_table::table::{Identity, PlayerAction, Table, TableConfig, TableStatus};
use proptest::prelude::*;

fn players(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| Identity::new(format!("usr_{i}"), format!("Player {i}")))
        .collect()
}

fn action_strategy() -> impl Strategy<Value = PlayerAction> {
    (0u8..7, 0u64..2500).prop_map(|(kind, amount)| match kind {
        0 => PlayerAction::Fold,
        1 => PlayerAction::Check,
        2 => PlayerAction::Call,
        3 => PlayerAction::Bet(Some(amount).filter(|a| *a > 0)),
        4 => PlayerAction::Raise(Some(amount).filter(|a| *a > 0)),
        5 => PlayerAction::Bet(None),
        _ => PlayerAction::Unknown("SHOVE".to_string()),
    })
}

fn seated_table(users: &[Identity]) -> Table {
    let mut table = Table::new("prop", &TableConfig::default());
    for (i, user) in users.iter().enumerate() {
        table.take_seat(user, i as i64).unwrap();
    }
    table
}

fn seat_total(table: &Table) -> u64 {
    table.seats.iter().map(|s| s.chips).sum()
}

proptest! {
    #[test]
    fn test_chips_conserved_within_and_across_hands(
        player_count in 2usize..=4,
        steps in prop::collection::vec((0usize..4, action_strategy()), 1..80),
    ) {
        let users = players(player_count);
        let mut table = seated_table(&users);
        let total = seat_total(&table);
        table.start_hand(&users[0]).unwrap();

        for (who, action) in steps {
            let user = &users[who % player_count];
            let _ = table.apply_action(user, &action);

            match &table.hand {
                Some(hand) => {
                    let in_play: u64 = hand.player_state.iter().map(|p| p.stack).sum();
                    prop_assert_eq!(in_play + hand.pot, total);
                }
                None => {
                    prop_assert_eq!(table.status, TableStatus::Lobby);
                    prop_assert_eq!(seat_total(&table), total);
                    table.start_hand(&users[0]).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_version_moves_only_on_success(
        steps in prop::collection::vec((0usize..3, action_strategy()), 1..60),
    ) {
        let users = players(3);
        let mut table = seated_table(&users);
        table.start_hand(&users[0]).unwrap();

        for (who, action) in steps {
            if table.hand.is_none() {
                break;
            }
            let before = table.version;
            let snapshot = table.snapshot();

            match table.apply_action(&users[who], &action) {
                Ok(_) => prop_assert_eq!(table.version, before + 1),
                Err(_) => {
                    prop_assert_eq!(table.version, before);
                    prop_assert_eq!(table.snapshot(), snapshot);
                }
            }
        }
    }

    #[test]
    fn test_acting_seat_can_act(
        steps in prop::collection::vec((0usize..4, action_strategy()), 1..60),
    ) {
        let users = players(4);
        let mut table = seated_table(&users);
        table.start_hand(&users[0]).unwrap();

        for (who, action) in steps {
            let Some(hand) = &table.hand else {
                break;
            };
            if let Some(acting) = hand.acting_seat_index {
                let player = hand.player(acting).unwrap();
                prop_assert!(player.can_act());
            }
            prop_assert!(hand.current_bet <= hand.min_raise_to || hand.current_bet == 0);

            let _ = table.apply_action(&users[who], &action);
        }
    }

    #[test]
    fn test_user_holds_at_most_one_seat(
        steps in prop::collection::vec((0usize..4, any::<bool>(), -2i64..8), 1..60),
    ) {
        let users = players(4);
        let mut table = Table::new("prop", &TableConfig::default());

        for (who, sit, seat_index) in steps {
            let user = &users[who];
            let before = table.version;
            let result = if sit {
                table.take_seat(user, seat_index)
            } else {
                table.leave_seat(user)
            };
            prop_assert_eq!(table.version, before + u64::from(result.is_ok()));

            for user in &users {
                let held = table.seats.iter().filter(|s| s.is_held_by(&user.user_id)).count();
                prop_assert!(held <= 1);
            }
            prop_assert_eq!(table.seats.len(), table.max_seats);
        }
    }
}
