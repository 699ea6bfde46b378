//! Gridkeep Engine -- roguelike runtime built on the Gridkeep ECS.
//!
//! This crate supplies the game-specific layer on top of [`gridkeep_ecs`]:
//! the concrete component and tag types, world generation, the run-length
//! message log, a state-stack interpreter (main loop, list menus, log viewer,
//! text field), a text console with dimming, JSON config, and a versioned,
//! compressed save format.
//!
//! # Quick Start
//!
//! ```
//! use gridkeep_engine::prelude::*;
//!
//! let mut world = new_world(42);
//! let hero = player(&world);
//! assert_eq!(world.get::<Position>(hero), Some(&PLAYER_START));
//!
//! report(&mut world, "Hello");
//! report(&mut world, "Hello");
//! assert_eq!(get_log(&world)[0].text(), "Hello (x2)");
//!
//! let bytes = save_world(&mut world).unwrap();
//! let loaded = load_world(&bytes).unwrap();
//! assert_eq!(loaded.capture_snapshot(), world.capture_snapshot());
//! ```

#![deny(unsafe_code)]

pub mod app;
pub mod components;
pub mod config;
pub mod console;
pub mod event;
pub mod menus;
pub mod message;
pub mod rendering;
pub mod saving;
pub mod state;
pub mod states;
pub mod tags;
pub mod world_tools;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use gridkeep_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use gridkeep_ecs::prelude::{EcsError, EntityId, Query, Variant, World};

    pub use crate::app::{App, Context};
    pub use crate::components::{
        register_hooks, Component, ComponentKind, GameRng, Gold, Graphic, Position, Rgb,
        SaveVersion, Text,
    };
    pub use crate::config::{Config, ConfigError, ConsoleConfig, Setting};
    pub use crate::console::{Console, DisplaySurface, TextDisplay};
    pub use crate::event::{Event, EventSource, KeySym, LineEvents, MouseButton, ScriptedEvents};
    pub use crate::menus::{main_menu, options_menu, ListMenu, MenuAction, MenuItem};
    pub use crate::message::{get_log, report, Message, MessageLog};
    pub use crate::rendering::LogRenderer;
    pub use crate::saving::{load_from_file, load_world, save_to_file, save_world, SaveError};
    pub use crate::state::{GameState, StateResult, StateStack, Transition};
    pub use crate::states::{InGame, LogViewer, TextFieldWindow};
    pub use crate::tags::GameTag;
    pub use crate::world_tools::{
        items_at, new_registry, new_world, player, GameWorld, PLAYER_START,
    };
}
