//! World construction and player lookup.

use gridkeep_ecs::prelude::{EntityId, Query, World};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::components::{
    register_hooks, Component, ComponentKind, GameRng, Gold, Graphic, Position, Rgb,
};
use crate::message::MessageLog;
use crate::tags::GameTag;

/// The concrete world type used by the game.
pub type GameWorld = World<Component, GameTag>;

/// Where the player starts.
pub const PLAYER_START: Position = Position::new(5, 5);

/// Number of gold piles scattered by [`new_world`].
pub const GOLD_PILES: usize = 10;

/// Piles land on `[0, GOLD_SPREAD]` in both axes.
pub const GOLD_SPREAD: i32 = 20;

/// An empty world with every game hook registered. Use this as the target
/// when restoring a saved world.
pub fn new_registry() -> GameWorld {
    let mut world = GameWorld::new();
    register_hooks(&mut world);
    world
}

/// Generate a fresh world from `seed`.
///
/// The world entity receives the seeded RNG and an empty message log. A
/// player is placed at [`PLAYER_START`] and [`GOLD_PILES`] gold piles are
/// scattered around it.
pub fn new_world(seed: u64) -> GameWorld {
    let mut world = new_registry();
    let mut rng = Pcg64::seed_from_u64(seed);

    let player = world.spawn();
    world.set(player, PLAYER_START);
    world.set(
        player,
        Graphic {
            ch: '@',
            fg: Rgb::WHITE,
        },
    );
    world.set(player, Gold(0));
    world.add_tag(player, GameTag::IsPlayer);
    world.add_tag(player, GameTag::IsActor);

    for _ in 0..GOLD_PILES {
        let pile = world.spawn();
        let pos = Position::new(
            rng.gen_range(0..=GOLD_SPREAD),
            rng.gen_range(0..=GOLD_SPREAD),
        );
        world.set(pile, pos);
        world.set(
            pile,
            Graphic {
                ch: '$',
                fg: Rgb::YELLOW,
            },
        );
        world.set(pile, Gold(rng.gen_range(1..=10)));
        world.add_tag(pile, GameTag::IsItem);
    }

    world.set(EntityId::WORLD, GameRng(rng));
    world.set(EntityId::WORLD, MessageLog::new());

    tracing::info!(seed, entities = world.entity_count(), "generated new world");
    world
}

/// A world seed drawn from the thread-local entropy source.
pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen()
}

/// The player entity.
///
/// # Panics
///
/// Panics unless exactly one entity is tagged [`GameTag::IsPlayer`].
#[track_caller]
pub fn player(world: &GameWorld) -> EntityId {
    let query = Query::new().tagged(GameTag::IsPlayer);
    match world.query_single(&query) {
        Ok(player) => player,
        Err(err) => panic!("player invariant violated: {err}"),
    }
}

/// Every gold pile lying on `pos`, in creation order.
pub fn items_at(world: &GameWorld, pos: Position) -> Vec<EntityId> {
    world.query(
        &Query::new()
            .with(ComponentKind::Gold)
            .tagged(GameTag::At(pos))
            .tagged(GameTag::IsItem),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
