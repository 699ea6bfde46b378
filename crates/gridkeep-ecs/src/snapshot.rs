//! World snapshot and restore support.
//!
//! Provides [`WorldSnapshot`] -- a plain, serializable value holding every
//! live entity with its components and tags plus the allocator position, so a
//! world can be encoded by any serde format and later restored with the same
//! entity IDs.
//!
//! Change hooks are neither captured nor replayed. Derived tags (such as
//! mirrored positions) are stored verbatim alongside the components that
//! produced them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::component::{Component, Tag};
use crate::entity::{EntityAllocator, EntityId};
use crate::hook::link_tag;
use crate::world::World;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// One entity's data: components ordered by kind, tags in tag order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot<C, T> {
    /// The entity's ID.
    pub entity_id: EntityId,
    /// Components, one per kind.
    pub components: Vec<C>,
    /// Tags, including derived ones.
    pub tags: Vec<T>,
}

/// A complete snapshot of a world's entity data.
///
/// Two worlds with equal snapshots hold the same entities, component values
/// and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot<C, T> {
    /// Index the allocator hands out next. Preserved so identities retired
    /// before the snapshot are not reissued after restore.
    pub next_index: u64,
    /// Live entities in creation order. Always starts with the world entity.
    pub entities: Vec<EntitySnapshot<C, T>>,
}

// ---------------------------------------------------------------------------
// World snapshot/restore impl
// ---------------------------------------------------------------------------

impl<C: Component, T: Tag> World<C, T> {
    /// Capture every live entity's components and tags.
    pub fn capture_snapshot(&self) -> WorldSnapshot<C, T> {
        let entities = self
            .entities()
            .map(|entity_id| EntitySnapshot {
                entity_id,
                components: self.components_of(entity_id).cloned().collect(),
                tags: self.tags_of(entity_id).cloned().collect(),
            })
            .collect();
        WorldSnapshot {
            next_index: self.allocator.next_index(),
            entities,
        }
    }

    /// Replace this world's entity data with the snapshot's. Registered hooks
    /// are kept but not fired.
    ///
    /// The snapshot is validated before anything is cleared, so on error the
    /// world is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidSnapshot`] if the world entity is missing,
    /// entity IDs are out of range or not strictly increasing, or an entity
    /// lists the same component kind twice.
    pub fn restore_from_snapshot(&mut self, snapshot: &WorldSnapshot<C, T>) -> Result<(), EcsError> {
        validate(snapshot)?;

        let allocator = EntityAllocator::restore(
            snapshot.next_index,
            snapshot.entities.iter().map(|e| e.entity_id),
        );
        self.reset_storage(allocator);

        for entity_snapshot in &snapshot.entities {
            let entity = entity_snapshot.entity_id;

            let mut slots = BTreeMap::new();
            for component in &entity_snapshot.components {
                let kind = component.kind();
                slots.insert(kind, component.clone());
                self.component_index.entry(kind).or_default().insert(entity);
            }
            if !slots.is_empty() {
                self.components.insert(entity, slots);
            }

            let mut tags = BTreeSet::new();
            for tag in &entity_snapshot.tags {
                link_tag(&mut tags, &mut self.tag_index, entity, tag.clone());
            }
            if !tags.is_empty() {
                self.tags.insert(entity, tags);
            }
        }

        tracing::debug!(
            entities = snapshot.entities.len(),
            next_index = snapshot.next_index,
            "restored world from snapshot"
        );
        Ok(())
    }
}

fn invalid(details: String) -> EcsError {
    EcsError::InvalidSnapshot { details }
}

fn validate<C: Component, T: Tag>(snapshot: &WorldSnapshot<C, T>) -> Result<(), EcsError> {
    match snapshot.entities.first() {
        Some(first) if first.entity_id == EntityId::WORLD => {}
        _ => return Err(invalid("world entity missing".to_owned())),
    }

    let mut previous: Option<EntityId> = None;
    for entity_snapshot in &snapshot.entities {
        let id = entity_snapshot.entity_id;
        if id.index() >= snapshot.next_index {
            return Err(invalid(format!(
                "entity {id:?} out of range (next index {})",
                snapshot.next_index
            )));
        }
        if previous.is_some_and(|prev| prev >= id) {
            return Err(invalid(format!("entity {id:?} out of order or duplicated")));
        }
        previous = Some(id);

        let mut kinds = BTreeSet::new();
        for component in &entity_snapshot.components {
            if !kinds.insert(component.kind()) {
                return Err(invalid(format!(
                    "entity {id:?} holds component kind {:?} twice",
                    component.kind()
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
