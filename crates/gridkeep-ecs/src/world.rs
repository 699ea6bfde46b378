//! The [`World`] is the top-level container for the ECS. It owns the entity
//! allocator, per-entity component slots and tag sets, the reverse indices
//! used by queries, and the registered change hooks.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::component::{Component, Tag, Variant};
use crate::entity::{EntityAllocator, EntityId};
use crate::hook::{link_tag, unlink_tag, ChangeHook, HookRegistry, TagWriter};

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// In-memory entity/component/tag store.
///
/// Every mutation keeps the kind -> entities and tag -> entities reverse
/// indices current, so [`query`](World::query) cost is bounded by the
/// smallest matching index rather than the entity count.
///
/// Writes to an entity that has been cleared (or was never allocated) are
/// programming errors and panic. Reads of such entities simply return
/// nothing.
pub struct World<C: Component, T: Tag> {
    pub(crate) allocator: EntityAllocator,
    pub(crate) components: HashMap<EntityId, BTreeMap<C::Kind, C>>,
    pub(crate) tags: HashMap<EntityId, BTreeSet<T>>,
    pub(crate) component_index: HashMap<C::Kind, BTreeSet<EntityId>>,
    pub(crate) tag_index: HashMap<T, BTreeSet<EntityId>>,
    hooks: HookRegistry<C, T>,
}

impl<C: Component, T: Tag> World<C, T> {
    /// Create an empty world holding only the world entity.
    pub fn new() -> Self {
        let mut allocator = EntityAllocator::new();
        let world_entity = allocator.allocate();
        debug_assert_eq!(world_entity, EntityId::WORLD);
        Self {
            allocator,
            components: HashMap::new(),
            tags: HashMap::new(),
            component_index: HashMap::new(),
            tag_index: HashMap::new(),
            hooks: HookRegistry::new(),
        }
    }

    /// Register a hook fired on every write to components of `kind`.
    ///
    /// Hooks for the same kind run in registration order.
    pub fn on_component_changed(&mut self, kind: C::Kind, hook: ChangeHook<C, T>) {
        self.hooks.register(kind, hook);
    }

    // -- entities -----------------------------------------------------------

    /// Allocate a fresh entity with no components and no tags.
    pub fn spawn(&mut self) -> EntityId {
        let entity = self.allocator.allocate();
        tracing::trace!(%entity, "spawned entity");
        entity
    }

    /// Whether `entity` is allocated and not cleared.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities, the world entity included.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.allocator.alive_ids()
    }

    /// Remove every component (firing hooks with `new = None`) and every tag
    /// from `entity`, then retire its identity.
    ///
    /// The world entity is emptied but stays alive.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    #[track_caller]
    pub fn clear_entity(&mut self, entity: EntityId) {
        self.expect_alive(entity, "clear_entity");

        let kinds: Vec<C::Kind> = self
            .components
            .get(&entity)
            .map(|slots| slots.keys().copied().collect())
            .unwrap_or_default();
        for kind in kinds {
            self.remove_component(entity, kind);
        }
        self.components.remove(&entity);

        if let Some(mut tags) = self.tags.remove(&entity) {
            let remaining: Vec<T> = tags.iter().cloned().collect();
            for tag in &remaining {
                unlink_tag(&mut tags, &mut self.tag_index, entity, tag);
            }
        }

        if !entity.is_world() {
            self.allocator.retire(entity);
        }
        tracing::trace!(%entity, "cleared entity");
    }

    // -- components ---------------------------------------------------------

    /// The value of `kind` held by `entity`, if any.
    pub fn get_component(&self, entity: EntityId, kind: C::Kind) -> Option<&C> {
        self.components.get(&entity)?.get(&kind)
    }

    /// Whether `entity` holds a value of `kind`.
    pub fn has_component(&self, entity: EntityId, kind: C::Kind) -> bool {
        self.get_component(entity, kind).is_some()
    }

    /// All components of `entity`, ordered by kind.
    pub fn components_of(&self, entity: EntityId) -> impl Iterator<Item = &C> + '_ {
        self.components
            .get(&entity)
            .into_iter()
            .flat_map(|slots| slots.values())
    }

    /// Set a component, replacing any prior value of the same kind, and fire
    /// the hooks registered for that kind. Returns the replaced value.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    #[track_caller]
    pub fn set_component(&mut self, entity: EntityId, value: C) -> Option<C> {
        self.expect_alive(entity, "set_component");
        let kind = value.kind();

        let old = self.components.entry(entity).or_default().insert(kind, value);
        self.component_index.entry(kind).or_default().insert(entity);

        if self.hooks.has_hooks(kind) {
            let new = self.components.get(&entity).and_then(|slots| slots.get(&kind));
            let tags = self.tags.entry(entity).or_default();
            let mut writer = TagWriter::new(entity, tags, &mut self.tag_index);
            self.hooks.fire(kind, &mut writer, old.as_ref(), new);
        }
        old
    }

    /// Remove the component of `kind` from `entity`, firing hooks with
    /// `new = None`. Returns the removed value; removing an absent kind is a
    /// no-op and fires nothing.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    #[track_caller]
    pub fn remove_component(&mut self, entity: EntityId, kind: C::Kind) -> Option<C> {
        self.expect_alive(entity, "remove_component");

        let old = self.components.get_mut(&entity)?.remove(&kind)?;
        if let Some(bucket) = self.component_index.get_mut(&kind) {
            bucket.remove(&entity);
            if bucket.is_empty() {
                self.component_index.remove(&kind);
            }
        }

        if self.hooks.has_hooks(kind) {
            let tags = self.tags.entry(entity).or_default();
            let mut writer = TagWriter::new(entity, tags, &mut self.tag_index);
            self.hooks.fire(kind, &mut writer, Some(&old), None);
        }
        Some(old)
    }

    // -- typed access -------------------------------------------------------

    /// Typed read of one component variant.
    pub fn get<V: Variant<C>>(&self, entity: EntityId) -> Option<&V> {
        self.get_component(entity, V::KIND).and_then(V::from_ref)
    }

    /// Whether `entity` holds the component variant `V`.
    pub fn has<V: Variant<C>>(&self, entity: EntityId) -> bool {
        self.has_component(entity, V::KIND)
    }

    /// Typed [`set_component`](World::set_component).
    #[track_caller]
    pub fn set<V: Variant<C>>(&mut self, entity: EntityId, value: V) -> Option<V> {
        self.set_component(entity, value.into_component())
            .and_then(V::from_component)
    }

    /// Typed [`remove_component`](World::remove_component).
    #[track_caller]
    pub fn remove<V: Variant<C>>(&mut self, entity: EntityId) -> Option<V> {
        self.remove_component(entity, V::KIND)
            .and_then(V::from_component)
    }

    /// Modify a component in place and return `f`'s result, or `None` if the
    /// entity does not hold `V`.
    ///
    /// When hooks are registered for `V`, the edit is applied to a copy and
    /// written back through [`set_component`](World::set_component) so the
    /// hooks observe the change.
    #[track_caller]
    pub fn update<V: Variant<C>, R>(
        &mut self,
        entity: EntityId,
        f: impl FnOnce(&mut V) -> R,
    ) -> Option<R> {
        self.expect_alive(entity, "update");
        if self.hooks.has_hooks(V::KIND) {
            let mut value = self.get_component(entity, V::KIND)?.clone();
            let result = f(V::from_mut(&mut value)?);
            self.set_component(entity, value);
            Some(result)
        } else {
            let slot = self.components.get_mut(&entity)?.get_mut(&V::KIND)?;
            Some(f(V::from_mut(slot)?))
        }
    }

    // -- tags ---------------------------------------------------------------

    /// Attach `tag` to `entity`. Returns `false` if it was already present.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    #[track_caller]
    pub fn add_tag(&mut self, entity: EntityId, tag: T) -> bool {
        self.expect_alive(entity, "add_tag");
        let tags = self.tags.entry(entity).or_default();
        link_tag(tags, &mut self.tag_index, entity, tag)
    }

    /// Detach `tag` from `entity`. Returns `false` if it was not present.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    #[track_caller]
    pub fn remove_tag(&mut self, entity: EntityId, tag: &T) -> bool {
        self.expect_alive(entity, "remove_tag");
        match self.tags.get_mut(&entity) {
            Some(tags) => unlink_tag(tags, &mut self.tag_index, entity, tag),
            None => false,
        }
    }

    /// Whether `entity` carries `tag`.
    pub fn has_tag(&self, entity: EntityId, tag: &T) -> bool {
        self.tags.get(&entity).is_some_and(|tags| tags.contains(tag))
    }

    /// All tags of `entity`, in tag order.
    pub fn tags_of(&self, entity: EntityId) -> impl Iterator<Item = &T> + '_ {
        self.tags.get(&entity).into_iter().flat_map(|tags| tags.iter())
    }

    // -- internals ----------------------------------------------------------

    #[track_caller]
    fn expect_alive(&self, entity: EntityId, op: &str) {
        assert!(
            self.allocator.is_alive(entity),
            "{op}: entity {entity:?} is not alive (cleared or never allocated)"
        );
    }

    /// Drop all entity data and indices, keeping registered hooks.
    pub(crate) fn reset_storage(&mut self, allocator: EntityAllocator) {
        self.allocator = allocator;
        self.components.clear();
        self.tags.clear();
        self.component_index.clear();
        self.tag_index.clear();
    }
}

impl<C: Component, T: Tag> Default for World<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component, T: Tag> fmt::Debug for World<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entity_count())
            .field("next_index", &self.allocator.next_index())
            .field("component_kinds", &self.component_index.len())
            .field("tags", &self.tag_index.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
