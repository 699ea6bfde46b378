//! Query engine: find entities holding every listed component kind and
//! carrying every listed tag.
//!
//! Each constraint resolves to a reverse-index bucket maintained by
//! [`World`]. Evaluation walks the smallest bucket and probes the others, so
//! a pickup check such as "gold, tagged IsItem, tagged at (3, 4)" touches the
//! handful of entities at that cell instead of every entity in the world.
//!
//! Results come back in creation order. That order is a property of this
//! engine, not of the query semantics; callers that draw or otherwise depend
//! on order should still say so explicitly.

use std::collections::BTreeSet;
use std::fmt;

use crate::component::{Component, Tag, Variant};
use crate::entity::EntityId;
use crate::world::World;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A conjunction of required component kinds and required tags.
///
/// ```
/// # use gridkeep_ecs::query::Query;
/// # #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// # pub struct Gold(pub i64);
/// # gridkeep_ecs::component_enum! { pub enum Component / Kind { Gold(Gold) } }
/// let query: Query<Component, String> = Query::new()
///     .with(Kind::Gold)
///     .tagged("IsItem".to_owned());
/// assert_eq!(query.component_kinds(), &[Kind::Gold]);
/// ```
pub struct Query<C: Component, T: Tag> {
    components: Vec<C::Kind>,
    tags: Vec<T>,
}

impl<C: Component, T: Tag> Query<C, T> {
    /// A query with no constraints; matches every live entity.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Require a component kind.
    pub fn with(mut self, kind: C::Kind) -> Self {
        if !self.components.contains(&kind) {
            self.components.push(kind);
        }
        self
    }

    /// Require the kind of component variant `V`.
    pub fn with_variant<V: Variant<C>>(self) -> Self {
        self.with(V::KIND)
    }

    /// Require a tag.
    pub fn tagged(mut self, tag: T) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Required component kinds.
    pub fn component_kinds(&self) -> &[C::Kind] {
        &self.components
    }

    /// Required tags.
    pub fn required_tags(&self) -> &[T] {
        &self.tags
    }
}

impl<C: Component, T: Tag> Default for Query<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component, T: Tag> Clone for Query<C, T> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl<C: Component, T: Tag> fmt::Debug for Query<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("components", &self.components)
            .field("tags", &self.tags)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// World query methods
// ---------------------------------------------------------------------------

impl<C: Component, T: Tag> World<C, T> {
    /// Entities matching every constraint of `query`, in creation order.
    pub fn query(&self, query: &Query<C, T>) -> Vec<EntityId> {
        self.query_all(&query.components, &query.tags)
    }

    /// Entities holding every kind in `kinds` and carrying every tag in
    /// `tags`, in creation order. With no constraints, every live entity
    /// matches (the world entity included).
    pub fn query_all(&self, kinds: &[C::Kind], tags: &[T]) -> Vec<EntityId> {
        if kinds.is_empty() && tags.is_empty() {
            return self.entities().collect();
        }

        let mut buckets: Vec<&BTreeSet<EntityId>> = Vec::with_capacity(kinds.len() + tags.len());
        for kind in kinds {
            match self.component_index.get(kind) {
                Some(bucket) => buckets.push(bucket),
                None => return Vec::new(),
            }
        }
        for tag in tags {
            match self.tag_index.get(tag) {
                Some(bucket) => buckets.push(bucket),
                None => return Vec::new(),
            }
        }

        buckets.sort_by_key(|bucket| bucket.len());
        let Some((smallest, rest)) = buckets.split_first() else {
            return Vec::new();
        };
        smallest
            .iter()
            .copied()
            .filter(|entity| rest.iter().all(|bucket| bucket.contains(entity)))
            .collect()
    }

    /// The single entity matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotUnique`] when zero or several entities match.
    pub fn query_single(&self, query: &Query<C, T>) -> Result<EntityId, EcsError> {
        match self.query(query).as_slice() {
            [entity] => Ok(*entity),
            matches => Err(EcsError::NotUnique {
                query: format!("{query:?}"),
                found: matches.len(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
