//! Property tests for the message log and list menu navigation.

use gridkeep_engine::prelude::*;
use proptest::prelude::*;

fn expand(log: &MessageLog) -> Vec<String> {
    log.iter()
        .flat_map(|m| std::iter::repeat(m.raw_text.clone()).take(m.count as usize))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Expanding every entry by its count gives back exactly what was
    /// appended, and no two neighbouring entries share a text.
    #[test]
    fn message_log_is_run_length_encoding(
        texts in prop::collection::vec(prop::sample::select(vec!["hit", "miss", "gold"]), 0..60)
    ) {
        let mut log = MessageLog::new();
        for text in &texts {
            log.append(text);
        }

        let appended: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        prop_assert_eq!(expand(&log), appended);
        for pair in log.messages().windows(2) {
            prop_assert_ne!(&pair[0].raw_text, &pair[1].raw_text);
        }
        for message in &log {
            prop_assert!(message.count >= 1);
        }
    }

    /// Up and down keys walk the selection around the menu modulo its
    /// length.
    #[test]
    fn menu_selection_wraps(steps in prop::collection::vec(prop::bool::ANY, 0..40)) {
        let mut ctx = Context::new(Config::default(), None);
        let mut menu = main_menu(&ctx);
        let len = menu.items().len() as i64;

        let mut expected: i64 = 0;
        for down in steps {
            let (sym, dy) = if down { (KeySym::Down, 1) } else { (KeySym::Up, -1) };
            let result = menu.on_event(&mut ctx, &Event::KeyDown(sym));
            prop_assert_eq!(result, std::ops::ControlFlow::Continue(Transition::None));
            expected = (expected + dy).rem_euclid(len);
            prop_assert_eq!(menu.selected(), Some(expected as usize));
        }
    }

    /// Moving the player keeps exactly one position tag in step with the
    /// position component.
    #[test]
    fn player_position_tag_tracks_moves(
        seed in any::<u64>(),
        moves in prop::collection::vec((-1i32..=1, -1i32..=1), 0..30)
    ) {
        let mut world = new_world(seed);
        let hero = player(&world);
        for step in moves {
            gridkeep_engine::states::move_player(&mut world, step);
            let pos = *world.get::<Position>(hero).unwrap();
            let at_tags: Vec<_> = world
                .tags_of(hero)
                .filter(|tag| matches!(tag, GameTag::At(_)))
                .cloned()
                .collect();
            prop_assert_eq!(at_tags, vec![GameTag::At(pos)]);
            prop_assert!(items_at(&world, pos).is_empty());
        }
    }
}
