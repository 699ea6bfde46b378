//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a 64-bit handle handed out in strictly increasing order.
//! Identities are never recycled within a world's lifetime, so a handle that
//! outlives its entity can never alias a newer one. Index `0` is reserved for
//! the world entity, which carries process-global state.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// An opaque, stable entity identifier.
///
/// Ordering follows creation order, which gives callers a deterministic
/// tie-break when they need one (render passes, snapshots).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// The distinguished world entity. Allocated by every [`World`](crate::world::World)
    /// at construction and never retired.
    pub const WORLD: EntityId = EntityId(0);

    /// The creation sequence number of this entity.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Whether this is the world entity.
    #[inline]
    pub fn is_world(self) -> bool {
        self == Self::WORLD
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_world() {
            write!(f, "EntityId(world)")
        } else {
            write!(f, "EntityId({})", self.0)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Allocates [`EntityId`]s and tracks which of them are still live.
///
/// Retired indices stay retired: there is no free list.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    /// Whether the slot at each index is currently alive.
    alive: Vec<bool>,
}

impl EntityAllocator {
    /// Create an allocator whose first allocation is the world entity.
    pub fn new() -> Self {
        Self { alive: Vec::new() }
    }

    /// Allocate a fresh [`EntityId`].
    pub fn allocate(&mut self) -> EntityId {
        let index = self.alive.len() as u64;
        self.alive.push(true);
        EntityId(index)
    }

    /// Retire an entity. Its identity will never be handed out again.
    ///
    /// Returns `false` if the entity was already retired or never allocated.
    pub fn retire(&mut self, id: EntityId) -> bool {
        match self.alive.get_mut(id.0 as usize) {
            Some(slot) if *slot => {
                *slot = false;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `id` was allocated and has not been retired.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Total number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    /// Alive entities in creation order.
    pub fn alive_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| EntityId(idx as u64))
    }

    /// The index the next allocation will receive.
    pub fn next_index(&self) -> u64 {
        self.alive.len() as u64
    }

    /// Rebuild an allocator from a snapshot: `next_index` slots, of which
    /// exactly `alive` are live. Indices in `alive` must be `< next_index`.
    pub fn restore(next_index: u64, alive: impl IntoIterator<Item = EntityId>) -> Self {
        let mut slots = vec![false; next_index as usize];
        for id in alive {
            slots[id.0 as usize] = true;
        }
        Self { alive: slots }
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
