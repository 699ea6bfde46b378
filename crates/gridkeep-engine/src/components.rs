//! Game component vocabulary and the position mirroring hook.
//!
//! Every value an entity can hold is one variant of [`Component`]. Payload
//! types are small newtypes or structs so the typed accessors read naturally:
//! `world.get::<Gold>(player)`.
//!
//! The world entity ([`EntityId::WORLD`](gridkeep_ecs::entity::EntityId::WORLD))
//! holds the process-global values: [`GameRng`], [`MessageLog`],
//! [`SaveVersion`] and the transient status [`Text`].

use std::ops::Add;

use gridkeep_ecs::hook::TagWriter;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::message::MessageLog;
use crate::tags::GameTag;
use crate::world_tools::GameWorld;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// A cell on the map grid. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add<(i32, i32)> for Position {
    type Output = Position;

    fn add(self, (dx, dy): (i32, i32)) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GRAY: Rgb = Rgb(64, 64, 64);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);

    /// Divide every channel by `divisor`, rounding down.
    pub fn dimmed(self, divisor: u8) -> Rgb {
        let divisor = divisor.max(1);
        Rgb(self.0 / divisor, self.1 / divisor, self.2 / divisor)
    }
}

/// How an entity is drawn: one glyph in one foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Graphic {
    pub ch: char,
    pub fg: Rgb,
}

impl Default for Graphic {
    fn default() -> Self {
        Self {
            ch: '!',
            fg: Rgb::WHITE,
        }
    }
}

/// Amount of gold carried (player) or lying in a pile (item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gold(pub i64);

/// The world's random number generator. Stored in the world so draws stay
/// reproducible across save and load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRng(pub Pcg64);

/// Save format version stamped on the world entity at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveVersion(pub u32);

/// Transient status text shown on the bottom row of the game screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Text(pub String);

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

gridkeep_ecs::component_enum! {
    /// Everything an entity can hold, one slot per variant.
    pub enum Component / ComponentKind {
        Position(Position),
        Graphic(Graphic),
        Gold(Gold),
        Rng(GameRng),
        MessageLog(MessageLog),
        SaveVersion(SaveVersion),
        Text(Text),
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Keep an entity's `At` tag equal to its current position.
///
/// Removes the tag for the old position (if any) and adds the tag for the
/// new one (if any). Writing the same position again is a no-op.
pub fn mirror_position(
    tags: &mut TagWriter<'_, GameTag>,
    old: Option<&Component>,
    new: Option<&Component>,
) {
    let old = match old {
        Some(Component::Position(pos)) => Some(*pos),
        _ => None,
    };
    let new = match new {
        Some(Component::Position(pos)) => Some(*pos),
        _ => None,
    };
    if old == new {
        return;
    }
    if let Some(pos) = old {
        tags.remove(&GameTag::At(pos));
    }
    if let Some(pos) = new {
        tags.add(GameTag::At(pos));
    }
}

/// Register every change hook the game relies on.
pub fn register_hooks(world: &mut GameWorld) {
    world.on_component_changed(ComponentKind::Position, mirror_position);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
