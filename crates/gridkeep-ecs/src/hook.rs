//! Component change hooks.
//!
//! A hook is registered per component kind with
//! [`World::on_component_changed`](crate::world::World::on_component_changed)
//! and runs synchronously inside every write to that kind, receiving the old
//! and new values (either may be absent). Hooks see a [`TagWriter`] scoped to
//! the written entity, which is how derived tag indices are kept in step with
//! primary component data: the write and the hook's tag edits complete inside
//! the same `&mut World` borrow, so no caller can observe one without the
//! other.
//!
//! Hooks are plain function pointers and are not part of a snapshot. Register
//! them on a fresh world before restoring into it.

use std::collections::{BTreeSet, HashMap};

use crate::component::{Component, Tag};
use crate::entity::EntityId;

/// Signature of a component change hook: `(tags, old, new)`.
pub type ChangeHook<C, T> = fn(&mut TagWriter<'_, T>, Option<&C>, Option<&C>);

// ---------------------------------------------------------------------------
// TagWriter
// ---------------------------------------------------------------------------

/// Tag access for one entity, handed to change hooks.
///
/// Edits go through the world's tag reverse index so queries stay correct.
pub struct TagWriter<'a, T: Tag> {
    entity: EntityId,
    tags: &'a mut BTreeSet<T>,
    index: &'a mut HashMap<T, BTreeSet<EntityId>>,
}

impl<'a, T: Tag> TagWriter<'a, T> {
    pub(crate) fn new(
        entity: EntityId,
        tags: &'a mut BTreeSet<T>,
        index: &'a mut HashMap<T, BTreeSet<EntityId>>,
    ) -> Self {
        Self {
            entity,
            tags,
            index,
        }
    }

    /// The entity whose component changed.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn add(&mut self, tag: T) -> bool {
        link_tag(self.tags, self.index, self.entity, tag)
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn remove(&mut self, tag: &T) -> bool {
        unlink_tag(self.tags, self.index, self.entity, tag)
    }

    /// Whether the entity currently carries `tag`.
    pub fn contains(&self, tag: &T) -> bool {
        self.tags.contains(tag)
    }
}

/// Insert `tag` into an entity's tag set and the reverse index.
pub(crate) fn link_tag<T: Tag>(
    tags: &mut BTreeSet<T>,
    index: &mut HashMap<T, BTreeSet<EntityId>>,
    entity: EntityId,
    tag: T,
) -> bool {
    if !tags.insert(tag.clone()) {
        return false;
    }
    index.entry(tag).or_default().insert(entity);
    true
}

/// Remove `tag` from an entity's tag set and the reverse index. Empty index
/// buckets are dropped so position tags don't accumulate forever.
pub(crate) fn unlink_tag<T: Tag>(
    tags: &mut BTreeSet<T>,
    index: &mut HashMap<T, BTreeSet<EntityId>>,
    entity: EntityId,
    tag: &T,
) -> bool {
    if !tags.remove(tag) {
        return false;
    }
    if let Some(bucket) = index.get_mut(tag) {
        bucket.remove(&entity);
        if bucket.is_empty() {
            index.remove(tag);
        }
    }
    true
}

// ---------------------------------------------------------------------------
// HookRegistry
// ---------------------------------------------------------------------------

/// Hooks keyed by component kind, run in registration order.
pub(crate) struct HookRegistry<C: Component, T: Tag> {
    hooks: HashMap<C::Kind, Vec<ChangeHook<C, T>>>,
}

impl<C: Component, T: Tag> HookRegistry<C, T> {
    pub(crate) fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    pub(crate) fn register(&mut self, kind: C::Kind, hook: ChangeHook<C, T>) {
        self.hooks.entry(kind).or_default().push(hook);
    }

    pub(crate) fn has_hooks(&self, kind: C::Kind) -> bool {
        self.hooks.get(&kind).is_some_and(|h| !h.is_empty())
    }

    /// Run every hook registered for `kind`.
    pub(crate) fn fire(
        &self,
        kind: C::Kind,
        writer: &mut TagWriter<'_, T>,
        old: Option<&C>,
        new: Option<&C>,
    ) {
        let Some(hooks) = self.hooks.get(&kind) else {
            return;
        };
        for hook in hooks {
            hook(writer, old, new);
        }
    }
}
