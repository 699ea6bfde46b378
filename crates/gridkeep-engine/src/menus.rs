//! List menus and the menus built from them.
//!
//! A [`ListMenu`] holds a vertical list of [`MenuItem`]s and an optional
//! selection. Vertical direction keys move the selection with wraparound,
//! the pointer selects the item under it, and every other event is forwarded
//! to the selected item, which activates only on a confirm key or a primary
//! click. Escape and secondary clicks close the menu.

use crate::app::Context;
use crate::components::Rgb;
use crate::config::Setting;
use crate::console::Console;
use crate::event::{Event, KeySym, MouseButton};
use crate::state::{pop, push, quit, reset, stay, StateResult};
use crate::states::{InGame, LogViewer, TextFieldWindow};

// ---------------------------------------------------------------------------
// MenuItem
// ---------------------------------------------------------------------------

/// What a menu item does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Return to the current world.
    Continue,
    /// Generate a fresh world and play it.
    NewGame,
    /// Open the message log.
    MessageLog,
    /// Open the options menu.
    Options,
    /// Edit one config value.
    Edit(Setting),
    /// Leave the program.
    Quit,
}

/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    label: String,
    action: MenuAction,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn action(&self) -> MenuAction {
        self.action
    }

    /// The text shown for this item. Setting items show the current value.
    pub fn label(&self, ctx: &Context) -> String {
        match self.action {
            MenuAction::Edit(setting) => format!("{}: {}", self.label, setting.get(&ctx.config)),
            _ => self.label.clone(),
        }
    }

    /// Handle an event forwarded by the menu while this item is selected.
    pub fn on_event(&self, ctx: &mut Context, event: &Event) -> StateResult {
        let activates = match event {
            Event::KeyDown(sym) => sym.is_confirm(),
            Event::MouseButtonUp(MouseButton::Left) => true,
            _ => false,
        };
        if activates {
            self.activate(ctx)
        } else {
            stay()
        }
    }

    fn activate(&self, ctx: &mut Context) -> StateResult {
        tracing::debug!(item = %self.label, action = ?self.action, "menu item activated");
        match self.action {
            MenuAction::Continue => {
                if ctx.world.is_some() {
                    reset(InGame)
                } else {
                    stay()
                }
            }
            MenuAction::NewGame => {
                ctx.new_game();
                reset(InGame)
            }
            MenuAction::MessageLog => push(LogViewer::new(ctx)),
            MenuAction::Options => push(options_menu()),
            MenuAction::Edit(setting) => push(TextFieldWindow::for_setting(setting, ctx)),
            MenuAction::Quit => quit(),
        }
    }
}

// ---------------------------------------------------------------------------
// ListMenu
// ---------------------------------------------------------------------------

/// A vertical list of items drawn at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMenu {
    items: Vec<MenuItem>,
    selected: Option<usize>,
    x: i32,
    y: i32,
}

impl ListMenu {
    /// A menu with the first item selected (if any).
    pub fn new(items: Vec<MenuItem>, x: i32, y: i32) -> Self {
        let selected = (!items.is_empty()).then_some(0);
        Self {
            items,
            selected,
            x,
            y,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select item `index`, or clear the selection if out of range.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.items.len());
    }

    pub fn on_event(&mut self, ctx: &mut Context, event: &Event) -> StateResult {
        match event {
            Event::KeyDown(KeySym::Escape) | Event::MouseButtonUp(MouseButton::Right) => pop(),
            Event::KeyDown(sym) => match sym.direction() {
                Some((0, dy)) if dy != 0 => {
                    self.step(dy);
                    stay()
                }
                _ => self.activate_selected(ctx, event),
            },
            Event::MouseMotion { y, .. } => {
                let row = y.checked_sub(self.y).and_then(|row| usize::try_from(row).ok());
                self.select(row);
                stay()
            }
            _ => self.activate_selected(ctx, event),
        }
    }

    /// Move the selection by `dy` with wraparound. With nothing selected,
    /// moving down selects the first item and moving up the last.
    fn step(&mut self, dy: i32) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(current) => {
                let len = len as i64;
                (current as i64 + i64::from(dy)).rem_euclid(len) as usize
            }
            None if dy > 0 => 0,
            None => len - 1,
        });
    }

    fn activate_selected(&self, ctx: &mut Context, event: &Event) -> StateResult {
        match self.selected.and_then(|i| self.items.get(i)) {
            Some(item) => item.on_event(ctx, event),
            None => stay(),
        }
    }

    pub fn on_draw(&self, ctx: &Context, console: &mut Console) {
        for (i, item) in self.items.iter().enumerate() {
            let bg = if self.selected == Some(i) {
                Rgb::GRAY
            } else {
                Rgb::BLACK
            };
            let Ok(offset) = i32::try_from(i) else {
                break;
            };
            console.print(self.x, self.y + offset, &item.label(ctx), Rgb::WHITE, Some(bg));
        }
    }
}

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------

/// The main/escape menu. World-dependent items only appear when a world is
/// loaded.
pub fn main_menu(ctx: &Context) -> ListMenu {
    let has_world = ctx.world.is_some();
    let mut items = Vec::new();
    if has_world {
        items.push(MenuItem::new("Continue", MenuAction::Continue));
    }
    items.push(MenuItem::new("New game", MenuAction::NewGame));
    if has_world {
        items.push(MenuItem::new("Message log", MenuAction::MessageLog));
    }
    items.push(MenuItem::new("Options", MenuAction::Options));
    items.push(MenuItem::new("Quit", MenuAction::Quit));
    ListMenu::new(items, 5, 5)
}

/// Console size options.
pub fn options_menu() -> ListMenu {
    let items = [Setting::Columns, Setting::Rows]
        .into_iter()
        .map(|setting| MenuItem::new(setting.label(), MenuAction::Edit(setting)))
        .collect();
    ListMenu::new(items, 7, 7)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
