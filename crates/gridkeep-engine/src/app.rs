//! Application context and the state stack interpreter.
//!
//! [`App`] owns everything the main loop mutates: the [`Context`] (world,
//! config, screen size) and the [`StateStack`]. Each iteration of
//! [`App::run`]:
//!
//! 1. stops if the stack is empty;
//! 2. renders the stack into a fresh console and presents it;
//! 3. blocks for the next event;
//! 4. stops on [`Event::Quit`], otherwise dispatches the event to the top
//!    state and applies the returned transition, or stops if the state
//!    returned [`Quit`].
//!
//! Saving is not part of the loop. The caller decides what to persist once
//! [`App::run`] returns (or unwinds).

use std::io;
use std::ops::ControlFlow;

use crate::config::Config;
use crate::console::{Console, DisplaySurface};
use crate::event::{Event, EventSource};
use crate::menus::main_menu;
use crate::state::{Quit, StateStack};
use crate::world_tools::{fresh_seed, new_world, GameWorld};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Mutable state shared by every game state.
#[derive(Debug)]
pub struct Context {
    /// The loaded world, if any.
    pub world: Option<GameWorld>,
    /// Current config. Edits are persisted on exit.
    pub config: Config,
    /// Console size in use for this session, `(columns, rows)`.
    pub screen: (usize, usize),
    /// Seed for the next generated world. Drawn fresh when `None`.
    pub next_seed: Option<u64>,
}

impl Context {
    pub fn new(config: Config, world: Option<GameWorld>) -> Self {
        let screen = config.console.size();
        Self {
            world,
            config,
            screen,
            next_seed: None,
        }
    }

    /// Replace the current world with a freshly generated one.
    pub fn new_game(&mut self) {
        let seed = self.next_seed.take().unwrap_or_else(fresh_seed);
        self.world = Some(new_world(seed));
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The interpreter: context plus state stack.
#[derive(Debug)]
pub struct App {
    ctx: Context,
    stack: StateStack,
}

impl App {
    /// Start at the main menu.
    pub fn new(config: Config, world: Option<GameWorld>) -> Self {
        let ctx = Context::new(config, world);
        let stack = StateStack::with(main_menu(&ctx));
        Self { ctx, stack }
    }

    /// Start with an explicit stack.
    pub fn with_stack(ctx: Context, stack: StateStack) -> Self {
        Self { ctx, stack }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn stack(&self) -> &StateStack {
        &self.stack
    }

    /// Give up the app, returning the world and config for persisting.
    pub fn into_parts(self) -> (Option<GameWorld>, Config) {
        (self.ctx.world, self.ctx.config)
    }

    /// Draw the current stack into a new console of the session size.
    pub fn render(&self) -> Console {
        let (columns, rows) = self.ctx.screen;
        let mut console = Console::new(columns, rows);
        self.stack.render(&self.ctx, &mut console);
        console
    }

    /// Feed one event to the active state and apply its transition.
    ///
    /// Returns `Break` when the loop should stop: on [`Event::Quit`] or when
    /// the state asks to quit.
    pub fn dispatch(&mut self, event: &Event) -> ControlFlow<Quit> {
        if *event == Event::Quit {
            tracing::info!("quit requested by event source");
            return ControlFlow::Break(Quit);
        }
        let Some(state) = self.stack.top_mut() else {
            return ControlFlow::Continue(());
        };
        match state.on_event(&mut self.ctx, event) {
            ControlFlow::Continue(transition) => {
                self.stack.apply(transition);
                ControlFlow::Continue(())
            }
            ControlFlow::Break(quit) => {
                tracing::info!("quit requested by state");
                ControlFlow::Break(quit)
            }
        }
    }

    /// Run until the stack empties or a quit is requested.
    ///
    /// # Errors
    ///
    /// Returns any error from presenting a frame.
    pub fn run(
        &mut self,
        display: &mut impl DisplaySurface,
        events: &mut impl EventSource,
    ) -> io::Result<()> {
        while !self.stack.is_empty() {
            display.present(&self.render())?;
            let event = events.wait_event();
            tracing::trace!(?event, "event");
            if self.dispatch(&event).is_break() {
                break;
            }
        }
        tracing::debug!(depth = self.stack.len(), "main loop finished");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
