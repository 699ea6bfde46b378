//! End-to-end sessions driven through the interpreter with scripted input.
//!
//! Each test runs [`App::run`] against a frame recorder and a fixed event
//! script, then inspects the resulting world, config and stack.

use std::io;

use gridkeep_engine::prelude::*;

// -- Fixtures ---------------------------------------------------------------

#[derive(Default)]
struct Frames(Vec<Console>);

impl DisplaySurface for Frames {
    fn present(&mut self, console: &Console) -> io::Result<()> {
        self.0.push(console.clone());
        Ok(())
    }
}

fn config(columns: usize, rows: usize) -> Config {
    let mut config = Config::default();
    config.console.columns = columns;
    config.console.rows = rows;
    config
}

fn key(sym: KeySym) -> Event {
    Event::KeyDown(sym)
}

fn repeat(sym: KeySym, n: usize) -> impl Iterator<Item = Event> {
    std::iter::repeat(key(sym)).take(n)
}

fn total_gold(world: &GameWorld) -> i64 {
    world
        .query(&Query::new().with(ComponentKind::Gold))
        .into_iter()
        .filter_map(|e| world.get::<Gold>(e).map(|g| g.0))
        .sum()
}

// -- Gameplay ---------------------------------------------------------------

#[test]
fn sweeping_the_map_collects_every_pile() {
    let mut app = App::new(config(40, 30), None);
    app.context_mut().next_seed = Some(21);

    // New game, walk to the origin, then snake across the whole spread.
    let mut script: Vec<Event> = vec![key(KeySym::Return)];
    script.extend(repeat(KeySym::Left, 5));
    script.extend(repeat(KeySym::Up, 5));
    for row in 0..=20 {
        let dir = if row % 2 == 0 { KeySym::Right } else { KeySym::Left };
        script.extend(repeat(dir, 20));
        if row < 20 {
            script.push(key(KeySym::Down));
        }
    }
    let moves = script.len() - 1;

    let mut frames = Frames::default();
    app.run(&mut frames, &mut ScriptedEvents::new(script)).unwrap();
    assert_eq!(frames.0.len(), moves + 2);

    let world = app.context().world.as_ref().unwrap();
    let expected = total_gold(&new_world(21));
    let hero = player(world);

    assert_eq!(world.get::<Gold>(hero), Some(&Gold(expected)));
    assert!(world
        .query(&Query::new().tagged(GameTag::IsItem))
        .is_empty());
    assert_eq!(world.get::<Position>(hero), Some(&Position::new(20, 20)));

    let log = get_log(world);
    assert!(!log.is_empty());
    let last = log.last().unwrap().text();
    assert!(last.ends_with(&format!("total: {expected}g")), "{last}");
    assert_eq!(
        world.get::<Text>(EntityId::WORLD).map(|t| t.0.as_str()),
        Some(log.last().unwrap().raw_text.as_str())
    );
}

#[test]
fn status_line_shows_last_pickup() {
    let mut app = App::new(config(40, 30), None);
    app.context_mut().next_seed = Some(4);
    app.dispatch(&key(KeySym::Return));

    // Place gold right next to the player.
    let world = app.context_mut().world.as_mut().unwrap();
    let pile = world.spawn();
    world.set(pile, Position::new(6, 5));
    world.set(pile, Gold(3));
    world.add_tag(pile, GameTag::IsItem);

    app.dispatch(&key(KeySym::Right));
    let frame = app.render();
    let status = frame.rows().last().unwrap();
    assert!(status.starts_with("Picked up 3g, total: "), "{status}");
}

#[test]
fn saved_session_resumes_where_it_left_off() {
    let mut app = App::new(config(40, 30), None);
    app.context_mut().next_seed = Some(8);
    let script = [
        key(KeySym::Return),
        key(KeySym::Right),
        key(KeySym::Down),
        key(KeySym::Char('l')),
    ];
    app.run(&mut Frames::default(), &mut ScriptedEvents::new(script))
        .unwrap();

    let (world, config) = app.into_parts();
    let mut world = world.unwrap();
    let bytes = save_world(&mut world).unwrap();
    let restored = load_world(&bytes).unwrap();

    let resumed = App::new(config, Some(restored));
    let GameState::Menu(menu) = resumed.stack().top().unwrap() else {
        panic!("expected the main menu");
    };
    assert_eq!(menu.items()[0].action(), MenuAction::Continue);

    let restored = resumed.context().world.as_ref().unwrap();
    assert_eq!(restored.capture_snapshot(), world.capture_snapshot());
    assert_eq!(
        restored.get::<Position>(player(restored)),
        Some(&Position::new(7, 6))
    );
}

// -- Menus and overlays -----------------------------------------------------

#[test]
fn options_edit_updates_config_but_not_screen() {
    let mut app = App::new(config(30, 20), None);
    // Main menu without a world: New game, Options, Quit.
    let script = [
        key(KeySym::Down),
        key(KeySym::Return),
        key(KeySym::Return),
        key(KeySym::Backspace),
        key(KeySym::Backspace),
        Event::TextInput("120".to_owned()),
        key(KeySym::Return),
        key(KeySym::Escape),
        key(KeySym::Escape),
    ];
    let mut frames = Frames::default();
    app.run(&mut frames, &mut ScriptedEvents::new(script)).unwrap();

    assert!(app.stack().is_empty());
    assert_eq!(app.context().config.console.columns, 120);
    assert_eq!(app.context().screen, (30, 20));
    assert!(frames.0.iter().all(|f| f.width() == 30 && f.height() == 20));
}

#[test]
fn oversized_edit_is_clamped_and_next_start_renders() {
    let mut app = App::new(config(30, 20), None);
    for event in [
        key(KeySym::Down),
        key(KeySym::Return),
        key(KeySym::Return),
        Event::TextInput("18446744073709551615".to_owned()),
        key(KeySym::Home),
        key(KeySym::Delete),
        key(KeySym::Delete),
        key(KeySym::Return),
    ] {
        assert!(app.dispatch(&event).is_continue());
    }
    let (_, config) = app.into_parts();
    assert_eq!(config.console.columns, gridkeep_engine::config::MAX_CONSOLE_SIZE);

    let restarted = App::new(config, None);
    let frame = restarted.render();
    assert_eq!(frame.width(), gridkeep_engine::config::MAX_CONSOLE_SIZE);
    assert_eq!(frame.height(), 20);
}

#[test]
fn non_numeric_edit_is_ignored() {
    let mut app = App::new(config(30, 20), None);
    for event in [
        key(KeySym::Down),
        key(KeySym::Return),
        key(KeySym::Down),
        key(KeySym::Return),
        Event::TextInput("abc".to_owned()),
        key(KeySym::Return),
    ] {
        assert!(app.dispatch(&event).is_continue());
    }
    assert_eq!(app.context().config.console.rows, 20);
    assert!(matches!(
        app.stack().states(),
        [GameState::Menu(_), GameState::Menu(_)]
    ));
}

#[test]
fn log_viewer_overlays_game_and_closes() {
    let mut app = App::new(config(40, 30), None);
    app.context_mut().next_seed = Some(2);
    app.dispatch(&key(KeySym::Return));
    report(app.context_mut().world.as_mut().unwrap(), "You feel watched.");

    app.dispatch(&key(KeySym::Char('v')));
    assert!(matches!(
        app.stack().states(),
        [GameState::InGame(_), GameState::LogViewer(_)]
    ));
    let frame = app.render();
    let text: Vec<String> = frame.rows().collect();
    assert!(text.iter().any(|row| row.contains("Message log")));
    assert!(text.iter().any(|row| row.contains("You feel watched.")));

    app.dispatch(&Event::MouseButtonUp(MouseButton::Right));
    assert_eq!(app.stack().len(), 1);
}

#[test]
fn quit_from_escape_menu_keeps_world() {
    let mut app = App::new(config(30, 20), None);
    app.context_mut().next_seed = Some(5);
    let script = [
        key(KeySym::Return),
        key(KeySym::Escape),
        // Continue, New game, Message log, Options, Quit.
        key(KeySym::Up),
        key(KeySym::Return),
        key(KeySym::Right),
    ];
    let mut frames = Frames::default();
    app.run(&mut frames, &mut ScriptedEvents::new(script)).unwrap();

    assert_eq!(frames.0.len(), 4);
    assert_eq!(app.stack().len(), 2);
    assert!(app.context().world.is_some());
}
