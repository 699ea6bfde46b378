//! Gridkeep ECS -- entity/component/tag store with indexed queries.
//!
//! This crate provides the data model for the Gridkeep runtime. A [`World`]
//! owns entity identities, one value per component kind per entity, a tag
//! set per entity, and reverse indices (kind -> entities, tag -> entities)
//! that keep queries proportional to the smallest matching set.
//!
//! Component writes can fire registered change hooks that edit the written
//! entity's tags inside the same borrow. This is how a position component is
//! mirrored as a tag, turning "what is at cell (x, y)" into an index lookup.
//!
//! # Quick Start
//!
//! ```
//! use gridkeep_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
//! pub struct Position { x: i32, y: i32 }
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! pub struct Gold(i64);
//!
//! gridkeep_ecs::component_enum! {
//!     pub enum Component / Kind {
//!         Position(Position),
//!         Gold(Gold),
//!     }
//! }
//!
//! #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
//! pub enum Marker { IsItem, At(Position) }
//!
//! fn mirror(tags: &mut TagWriter<'_, Marker>, old: Option<&Component>, new: Option<&Component>) {
//!     if let Some(Component::Position(p)) = old { tags.remove(&Marker::At(*p)); }
//!     if let Some(Component::Position(p)) = new { tags.add(Marker::At(*p)); }
//! }
//!
//! let mut world: World<Component, Marker> = World::new();
//! world.on_component_changed(Kind::Position, mirror);
//!
//! let pile = world.spawn();
//! world.set(pile, Position { x: 3, y: 4 });
//! world.set(pile, Gold(7));
//! world.add_tag(pile, Marker::IsItem);
//!
//! let here = Query::new().with(Kind::Gold).tagged(Marker::At(Position { x: 3, y: 4 }));
//! assert_eq!(world.query(&here), vec![pile]);
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod hook;
pub mod query;
pub mod snapshot;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// A query expected to match exactly one entity matched some other number.
    #[error("expected exactly one entity for {query}, found {found}")]
    NotUnique { query: String, found: usize },

    /// A snapshot failed validation and was not applied.
    #[error("invalid world snapshot: {details}")]
    InvalidSnapshot { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, Tag, Variant};
    pub use crate::entity::EntityId;
    pub use crate::hook::{ChangeHook, TagWriter};
    pub use crate::query::Query;
    pub use crate::snapshot::{EntitySnapshot, WorldSnapshot};
    pub use crate::world::World;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
