//! Game states, transitions and the state stack.
//!
//! The active state is the top of a [`StateStack`]. Each dispatched event
//! yields a [`StateResult`]: either a [`Transition`] for the interpreter to
//! apply, or the [`Quit`] sentinel, which ends the main loop without touching
//! the stack.
//!
//! # Drawing
//!
//! [`StateStack::render`] draws the stack back to front. Every state is drawn
//! on top of the one beneath it, and just before the top state draws itself
//! the accumulated frame is dimmed by [`DIM_DIVISOR`]. Menus opened over the
//! game therefore appear over a grayed-out copy of it.

use std::ops::ControlFlow;

use crate::app::Context;
use crate::console::Console;
use crate::event::Event;
use crate::menus::ListMenu;
use crate::states::{InGame, LogViewer, TextFieldWindow};

/// Channel divisor applied to everything beneath the top state.
pub const DIM_DIVISOR: u8 = 4;

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// A change to the state stack requested by the active state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Leave the stack as it is.
    None,
    /// Push a state; it becomes active.
    Push(GameState),
    /// Remove the active state.
    Pop,
    /// Clear the whole stack, then push a state.
    Reset(GameState),
}

/// Request to leave the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quit;

/// Result of handling one event.
pub type StateResult = ControlFlow<Quit, Transition>;

pub fn stay() -> StateResult {
    ControlFlow::Continue(Transition::None)
}

pub fn push(state: impl Into<GameState>) -> StateResult {
    ControlFlow::Continue(Transition::Push(state.into()))
}

pub fn pop() -> StateResult {
    ControlFlow::Continue(Transition::Pop)
}

pub fn reset(state: impl Into<GameState>) -> StateResult {
    ControlFlow::Continue(Transition::Reset(state.into()))
}

pub fn quit() -> StateResult {
    ControlFlow::Break(Quit)
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Every kind of state the interpreter can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum GameState {
    InGame(InGame),
    Menu(ListMenu),
    LogViewer(LogViewer),
    TextField(TextFieldWindow),
}

impl GameState {
    /// Handle one event.
    pub fn on_event(&mut self, ctx: &mut Context, event: &Event) -> StateResult {
        match self {
            GameState::InGame(state) => state.on_event(ctx, event),
            GameState::Menu(state) => state.on_event(ctx, event),
            GameState::LogViewer(state) => state.on_event(ctx, event),
            GameState::TextField(state) => state.on_event(ctx, event),
        }
    }

    /// Draw this state's own content.
    pub fn on_draw(&self, ctx: &Context, console: &mut Console) {
        match self {
            GameState::InGame(state) => state.on_draw(ctx, console),
            GameState::Menu(state) => state.on_draw(ctx, console),
            GameState::LogViewer(state) => state.on_draw(ctx, console),
            GameState::TextField(state) => state.on_draw(ctx, console),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            GameState::InGame(_) => "in_game",
            GameState::Menu(_) => "menu",
            GameState::LogViewer(_) => "log_viewer",
            GameState::TextField(_) => "text_field",
        }
    }
}

impl From<InGame> for GameState {
    fn from(state: InGame) -> Self {
        GameState::InGame(state)
    }
}

impl From<ListMenu> for GameState {
    fn from(state: ListMenu) -> Self {
        GameState::Menu(state)
    }
}

impl From<LogViewer> for GameState {
    fn from(state: LogViewer) -> Self {
        GameState::LogViewer(state)
    }
}

impl From<TextFieldWindow> for GameState {
    fn from(state: TextFieldWindow) -> Self {
        GameState::TextField(state)
    }
}

// ---------------------------------------------------------------------------
// StateStack
// ---------------------------------------------------------------------------

/// Ordered live states; the last one is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateStack {
    states: Vec<GameState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack holding just `state`.
    pub fn with(state: impl Into<GameState>) -> Self {
        Self {
            states: vec![state.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// States bottom to top.
    pub fn states(&self) -> &[GameState] {
        &self.states
    }

    pub fn top(&self) -> Option<&GameState> {
        self.states.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut GameState> {
        self.states.last_mut()
    }

    pub fn push(&mut self, state: GameState) {
        self.states.push(state);
    }

    /// Remove and return the active state.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    #[track_caller]
    pub fn pop(&mut self) -> GameState {
        match self.states.pop() {
            Some(state) => state,
            None => panic!("state stack invariant violated: pop on empty stack"),
        }
    }

    /// Apply a transition.
    ///
    /// # Panics
    ///
    /// Panics on [`Transition::Pop`] when the stack is empty.
    #[track_caller]
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Push(state) => {
                tracing::debug!(state = state.name(), depth = self.len() + 1, "push state");
                self.push(state);
            }
            Transition::Pop => {
                let state = self.pop();
                tracing::debug!(state = state.name(), depth = self.len(), "pop state");
            }
            Transition::Reset(state) => {
                tracing::debug!(state = state.name(), dropped = self.len(), "reset state stack");
                while !self.is_empty() {
                    self.pop();
                }
                self.push(state);
            }
        }
    }

    /// Draw every state into `console`, bottom to top, dimming the frame
    /// beneath the top state.
    pub fn render(&self, ctx: &Context, console: &mut Console) {
        if let Some(top) = self.states.len().checked_sub(1) {
            self.draw_from(top, top, ctx, console);
        }
    }

    fn draw_from(&self, index: usize, top: usize, ctx: &Context, console: &mut Console) {
        if index > 0 {
            self.draw_from(index - 1, top, ctx, console);
            if index == top {
                console.dim(DIM_DIVISOR);
            }
        }
        self.states[index].on_draw(ctx, console);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
