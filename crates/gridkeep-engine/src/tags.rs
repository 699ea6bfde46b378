//! Game tag vocabulary.

use serde::{Deserialize, Serialize};

use crate::components::Position;

/// Markers attachable to entities.
///
/// `At` is never added by hand: it is derived from the entity's
/// [`Position`] by [`mirror_position`](crate::components::mirror_position),
/// which makes "what is at this cell" an index lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameTag {
    /// The entity controlled by the player. Exactly one exists per world.
    IsPlayer,
    /// Any entity that takes turns.
    IsActor,
    /// Any entity that can be picked up.
    IsItem,
    /// Mirror of the entity's current position.
    At(Position),
}
