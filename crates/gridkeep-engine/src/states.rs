//! Concrete game states: the map view, the log viewer and the text field
//! window. Menus live in [`crate::menus`].

use gridkeep_ecs::prelude::{EntityId, Query};

use crate::app::Context;
use crate::components::{ComponentKind, Gold, Graphic, Position, Rgb, Text};
use crate::config::Setting;
use crate::console::Console;
use crate::event::{Event, KeySym, MouseButton};
use crate::menus::main_menu;
use crate::message::{get_log, report};
use crate::rendering::LogRenderer;
use crate::state::{pop, push, reset, stay, StateResult};
use crate::world_tools::{items_at, player, GameWorld};

// ---------------------------------------------------------------------------
// InGame
// ---------------------------------------------------------------------------

/// The map view. Direction keys move the player; gold on the destination
/// cell is picked up automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InGame;

impl InGame {
    pub fn on_event(&mut self, ctx: &mut Context, event: &Event) -> StateResult {
        if ctx.world.is_none() {
            tracing::warn!("in-game state active without a world, returning to main menu");
            return reset(main_menu(ctx));
        }
        let Event::KeyDown(sym) = event else {
            return stay();
        };
        match sym {
            KeySym::Escape => push(main_menu(ctx)),
            KeySym::Char('v') => push(LogViewer::new(ctx)),
            sym => {
                if let (Some(step), Some(world)) = (sym.direction(), ctx.world.as_mut()) {
                    move_player(world, step);
                }
                stay()
            }
        }
    }

    /// Draw every positioned entity in creation order, then the status line.
    pub fn on_draw(&self, ctx: &Context, console: &mut Console) {
        let Some(world) = ctx.world.as_ref() else {
            return;
        };
        let drawable = Query::new()
            .with(ComponentKind::Position)
            .with(ComponentKind::Graphic);
        for entity in world.query(&drawable) {
            let (Some(pos), Some(graphic)) =
                (world.get::<Position>(entity), world.get::<Graphic>(entity))
            else {
                continue;
            };
            if console.in_bounds(pos.x, pos.y) {
                console.put(pos.x, pos.y, graphic.ch, graphic.fg, None);
            }
        }

        if let Some(Text(status)) = world.get::<Text>(EntityId::WORLD) {
            let last_row = i32::try_from(console.height()).unwrap_or(i32::MAX) - 1;
            console.print(0, last_row, status, Rgb::WHITE, None);
        }
    }
}

/// Step the player by `(dx, dy)` and pick up any gold on the new cell.
pub fn move_player(world: &mut GameWorld, step: (i32, i32)) {
    let player = player(world);
    let Some(pos) = world.update::<Position, _>(player, |pos| {
        *pos = *pos + step;
        *pos
    }) else {
        return;
    };
    tracing::trace!(x = pos.x, y = pos.y, "player moved");

    for pile in items_at(world, pos) {
        let Some(&Gold(amount)) = world.get::<Gold>(pile) else {
            continue;
        };
        let total = world
            .update::<Gold, _>(player, |gold| {
                gold.0 += amount;
                gold.0
            })
            .unwrap_or_else(|| {
                world.set(player, Gold(amount));
                amount
            });
        let text = format!("Picked up {amount}g, total: {total}g");
        report(world, &text);
        world.set(EntityId::WORLD, Text(text));
        world.clear_entity(pile);
    }
}

// ---------------------------------------------------------------------------
// LogViewer
// ---------------------------------------------------------------------------

/// Margin between the screen edge and the log window frame.
const LOG_MARGIN: usize = 2;

/// Framed, scrollable view of the message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogViewer {
    renderer: LogRenderer,
}

impl LogViewer {
    /// A viewer sized to the screen and scrolled to the newest message.
    pub fn new(ctx: &Context) -> Self {
        let (columns, rows) = ctx.screen;
        let inner_width = columns.saturating_sub(2 * LOG_MARGIN + 2).max(1);
        let inner_height = rows.saturating_sub(2 * LOG_MARGIN + 2).max(1);
        let log = ctx.world.as_ref().map(get_log).unwrap_or_default();
        Self {
            renderer: LogRenderer::new(log, inner_width, inner_height),
        }
    }

    pub fn renderer(&self) -> &LogRenderer {
        &self.renderer
    }

    pub fn on_event(&mut self, ctx: &mut Context, event: &Event) -> StateResult {
        let log = ctx.world.as_ref().map(get_log).unwrap_or_default();
        let page = i64::try_from(self.renderer.height()).unwrap_or(1);
        match event {
            Event::KeyDown(KeySym::Escape) | Event::MouseButtonUp(MouseButton::Right) => {
                return pop()
            }
            Event::KeyDown(KeySym::Up) => self.renderer.scroll(log, -1),
            Event::KeyDown(KeySym::Down) => self.renderer.scroll(log, 1),
            Event::KeyDown(KeySym::PageUp) => self.renderer.scroll(log, -page),
            Event::KeyDown(KeySym::PageDown) => self.renderer.scroll(log, page),
            Event::KeyDown(KeySym::Home) => self.renderer.scroll_to_top(),
            Event::KeyDown(KeySym::End) => self.renderer.scroll_to_end(log),
            Event::MouseWheel { dy } => self.renderer.scroll(log, -i64::from(*dy)),
            _ => {}
        }
        stay()
    }

    pub fn on_draw(&self, ctx: &Context, console: &mut Console) {
        let log = ctx.world.as_ref().map(get_log).unwrap_or_default();
        let margin = LOG_MARGIN as i32;
        let width = i32::try_from(self.renderer.width() + 2).unwrap_or(i32::MAX);
        let height = i32::try_from(self.renderer.height() + 2).unwrap_or(i32::MAX);
        console.draw_frame(margin, margin, width, height, "Message log", Rgb::WHITE, Rgb::BLACK);
        self.renderer.render(log).blit(console, margin + 1, margin + 1);
    }
}

// ---------------------------------------------------------------------------
// TextFieldWindow
// ---------------------------------------------------------------------------

/// A one-line edit box bound to a config setting.
///
/// Return commits the text and closes the window; Escape closes it without
/// applying anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFieldWindow {
    setting: Setting,
    text: Vec<char>,
    cursor: usize,
}

impl TextFieldWindow {
    /// An edit box prefilled with the setting's current value, cursor at the
    /// end.
    pub fn for_setting(setting: Setting, ctx: &Context) -> Self {
        let text: Vec<char> = setting.get(&ctx.config).to_string().chars().collect();
        Self {
            setting,
            cursor: text.len(),
            text,
        }
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn on_event(&mut self, ctx: &mut Context, event: &Event) -> StateResult {
        match event {
            Event::TextInput(input) => {
                for ch in input.chars().filter(|ch| !ch.is_control()) {
                    self.text.insert(self.cursor, ch);
                    self.cursor += 1;
                }
            }
            Event::KeyDown(KeySym::Escape) => return pop(),
            Event::KeyDown(sym) if sym.is_confirm() => {
                let text = self.text();
                if !self.setting.set_from_text(&mut ctx.config, &text) {
                    tracing::debug!(setting = self.setting.label(), text = %text, "ignored non-numeric input");
                }
                return pop();
            }
            Event::KeyDown(KeySym::Backspace) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.text.remove(self.cursor);
                }
            }
            Event::KeyDown(KeySym::Delete) => {
                if self.cursor < self.text.len() {
                    self.text.remove(self.cursor);
                }
            }
            Event::KeyDown(KeySym::Left) => self.cursor = self.cursor.saturating_sub(1),
            Event::KeyDown(KeySym::Right) => self.cursor = (self.cursor + 1).min(self.text.len()),
            Event::KeyDown(KeySym::Home) => self.cursor = 0,
            Event::KeyDown(KeySym::End) => self.cursor = self.text.len(),
            _ => {}
        }
        stay()
    }

    pub fn on_draw(&self, _ctx: &Context, console: &mut Console) {
        let title = self.setting.label();
        let width = (self.text.len() + 3).max(title.len() + 4).max(20);
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let console_width = i32::try_from(console.width()).unwrap_or(i32::MAX);
        let console_height = i32::try_from(console.height()).unwrap_or(i32::MAX);
        let x = ((console_width - width) / 2).max(0);
        let y = ((console_height - 3) / 2).max(0);

        console.draw_frame(x, y, width, 3, title, Rgb::WHITE, Rgb::BLACK);
        console.print(x + 1, y + 1, &self.text(), Rgb::WHITE, None);
        let cursor = i32::try_from(self.cursor).unwrap_or(i32::MAX);
        let under = self.text.get(self.cursor).copied().unwrap_or(' ');
        console.put(x + 1 + cursor, y + 1, under, Rgb::BLACK, Some(Rgb::WHITE));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::message::Message;
    use crate::state::{GameState, Transition};
    use crate::world_tools::{new_registry, new_world, PLAYER_START};
    use std::ops::ControlFlow;

    fn key(sym: KeySym) -> Event {
        Event::KeyDown(sym)
    }

    fn ctx_with(world: GameWorld) -> Context {
        Context::new(Config::default(), Some(world))
    }

    /// A world with the player at (5, 5) and one pile of 7 gold at (6, 5).
    fn pickup_world() -> (GameWorld, EntityId) {
        let mut world = new_registry();
        let p = world.spawn();
        world.set(p, PLAYER_START);
        world.set(p, Gold(0));
        world.add_tag(p, crate::tags::GameTag::IsPlayer);
        let pile = world.spawn();
        world.set(pile, Position::new(6, 5));
        world.set(pile, Gold(7));
        world.set(pile, Graphic { ch: '$', fg: Rgb::YELLOW });
        world.add_tag(pile, crate::tags::GameTag::IsItem);
        (world, pile)
    }

    // -- in game ------------------------------------------------------------

    #[test]
    fn direction_moves_player() {
        let mut ctx = ctx_with(new_world(3));
        let mut state = InGame;
        assert_eq!(state.on_event(&mut ctx, &key(KeySym::Char('l'))), stay());
        let world = ctx.world.as_ref().unwrap();
        let p = player(world);
        assert_eq!(world.get::<Position>(p), Some(&Position::new(6, 5)));
    }

    #[test]
    fn stepping_on_gold_picks_it_up() {
        let (world, pile) = pickup_world();
        let mut ctx = ctx_with(world);
        InGame.on_event(&mut ctx, &key(KeySym::Right));

        let world = ctx.world.as_ref().unwrap();
        let p = player(world);
        assert_eq!(world.get::<Gold>(p), Some(&Gold(7)));
        assert!(!world.is_alive(pile));
        assert_eq!(get_log(world), &[Message::new("Picked up 7g, total: 7g")]);
        assert_eq!(
            world.get::<Text>(EntityId::WORLD),
            Some(&Text("Picked up 7g, total: 7g".into()))
        );
    }

    #[test]
    fn escape_pushes_main_menu_and_v_pushes_log() {
        let mut ctx = ctx_with(new_world(3));
        let mut state = InGame;
        assert!(matches!(
            state.on_event(&mut ctx, &key(KeySym::Escape)),
            ControlFlow::Continue(Transition::Push(GameState::Menu(_)))
        ));
        assert!(matches!(
            state.on_event(&mut ctx, &key(KeySym::Char('v'))),
            ControlFlow::Continue(Transition::Push(GameState::LogViewer(_)))
        ));
    }

    #[test]
    fn only_entities_with_graphic_are_drawn() {
        let (world, _) = pickup_world();
        let ctx = ctx_with(world);
        let mut console = Console::new(20, 12);
        InGame.on_draw(&ctx, &mut console);
        // The fixture player has a position but no graphic.
        assert_eq!(console.get(5, 5).unwrap().ch, ' ');
        let pile = console.get(6, 5).unwrap();
        assert_eq!((pile.ch, pile.fg), ('$', Rgb::YELLOW));
    }

    #[test]
    fn offscreen_entities_are_skipped() {
        let mut world = new_registry();
        let e = world.spawn();
        world.set(e, Position::new(-1, 40));
        world.set(e, Graphic::default());
        let ctx = ctx_with(world);
        let mut console = Console::new(10, 10);
        InGame.on_draw(&ctx, &mut console);
        assert_eq!(console, Console::new(10, 10));
    }

    #[test]
    fn status_text_on_last_row() {
        let mut world = new_registry();
        world.set(EntityId::WORLD, Text("hello".into()));
        let ctx = ctx_with(world);
        let mut console = Console::new(10, 4);
        InGame.on_draw(&ctx, &mut console);
        assert_eq!(console.rows().last().unwrap(), "hello");
    }

    // -- log viewer ---------------------------------------------------------

    fn chatty_world(n: usize) -> GameWorld {
        let mut world = new_registry();
        for i in 0..n {
            report(&mut world, &format!("message {i}"));
        }
        world
    }

    #[test]
    fn log_viewer_scrolls_and_clamps() {
        let mut ctx = ctx_with(chatty_world(100));
        ctx.screen = (30, 16);
        let mut viewer = LogViewer::new(&ctx);
        let height = viewer.renderer().height();
        assert_eq!(height, 10);
        let max = 100 - height;
        assert_eq!(viewer.renderer().y_position(), max);

        viewer.on_event(&mut ctx, &key(KeySym::Down));
        assert_eq!(viewer.renderer().y_position(), max);
        viewer.on_event(&mut ctx, &key(KeySym::Up));
        assert_eq!(viewer.renderer().y_position(), max - 1);
        viewer.on_event(&mut ctx, &key(KeySym::PageUp));
        assert_eq!(viewer.renderer().y_position(), max - 1 - height);
        viewer.on_event(&mut ctx, &Event::MouseWheel { dy: 2 });
        assert_eq!(viewer.renderer().y_position(), max - 3 - height);
        viewer.on_event(&mut ctx, &key(KeySym::Home));
        assert_eq!(viewer.renderer().y_position(), 0);
        viewer.on_event(&mut ctx, &key(KeySym::End));
        assert_eq!(viewer.renderer().y_position(), max);
        assert_eq!(viewer.on_event(&mut ctx, &key(KeySym::Escape)), pop());
    }

    #[test]
    fn log_viewer_draws_newest_messages_in_frame() {
        let mut ctx = ctx_with(chatty_world(30));
        ctx.screen = (30, 16);
        let viewer = LogViewer::new(&ctx);
        let mut console = Console::new(30, 16);
        viewer.on_draw(&ctx, &mut console);
        let rows: Vec<String> = console.rows().collect();
        assert!(rows[2].starts_with("  +"));
        assert_eq!(rows[12].trim(), "|message 29              |");
    }

    // -- text field ---------------------------------------------------------

    fn field(ctx: &Context) -> TextFieldWindow {
        TextFieldWindow::for_setting(Setting::Columns, ctx)
    }

    #[test]
    fn text_field_starts_with_current_value() {
        let ctx = Context::new(Config::default(), None);
        let field = field(&ctx);
        assert_eq!(field.text(), "80");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn text_field_edits_at_cursor() {
        let mut ctx = Context::new(Config::default(), None);
        let mut field = field(&ctx);
        field.on_event(&mut ctx, &key(KeySym::Home));
        field.on_event(&mut ctx, &Event::TextInput("1".into()));
        assert_eq!(field.text(), "180");
        field.on_event(&mut ctx, &key(KeySym::Delete));
        assert_eq!(field.text(), "10");
        field.on_event(&mut ctx, &key(KeySym::End));
        field.on_event(&mut ctx, &key(KeySym::Backspace));
        field.on_event(&mut ctx, &Event::TextInput("20".into()));
        assert_eq!(field.text(), "120");
        field.on_event(&mut ctx, &key(KeySym::Left));
        field.on_event(&mut ctx, &key(KeySym::Left));
        field.on_event(&mut ctx, &key(KeySym::Left));
        field.on_event(&mut ctx, &key(KeySym::Left));
        assert_eq!(field.cursor(), 0);
        field.on_event(&mut ctx, &key(KeySym::Backspace));
        assert_eq!(field.text(), "120");
    }

    #[test]
    fn commit_applies_and_pops() {
        let mut ctx = Context::new(Config::default(), None);
        let mut field = field(&ctx);
        field.on_event(&mut ctx, &key(KeySym::Backspace));
        field.on_event(&mut ctx, &key(KeySym::Backspace));
        field.on_event(&mut ctx, &Event::TextInput("120".into()));
        assert_eq!(field.on_event(&mut ctx, &key(KeySym::Return)), pop());
        assert_eq!(ctx.config.console.columns, 120);
    }

    #[test]
    fn commit_clamps_small_values() {
        let mut ctx = Context::new(Config::default(), None);
        let mut field = field(&ctx);
        field.on_event(&mut ctx, &key(KeySym::Backspace));
        field.on_event(&mut ctx, &key(KeySym::Backspace));
        field.on_event(&mut ctx, &Event::TextInput("3".into()));
        field.on_event(&mut ctx, &key(KeySym::KpEnter));
        assert_eq!(ctx.config.console.columns, crate::config::MIN_CONSOLE_SIZE);
    }

    #[test]
    fn non_numeric_commit_is_ignored() {
        let mut ctx = Context::new(Config::default(), None);
        let mut field = field(&ctx);
        field.on_event(&mut ctx, &Event::TextInput("x".into()));
        assert_eq!(field.on_event(&mut ctx, &key(KeySym::Return)), pop());
        assert_eq!(ctx.config.console.columns, 80);
    }

    #[test]
    fn escape_discards_edit() {
        let mut ctx = Context::new(Config::default(), None);
        let mut field = field(&ctx);
        field.on_event(&mut ctx, &Event::TextInput("0".into()));
        assert_eq!(field.on_event(&mut ctx, &key(KeySym::Escape)), pop());
        assert_eq!(ctx.config.console.columns, 80);
    }
}
