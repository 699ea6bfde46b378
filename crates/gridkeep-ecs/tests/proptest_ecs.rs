//! Property tests for ECS operations.
//!
//! These tests use `proptest` to generate random sequences of store
//! operations and check, after every step, that the reverse indices agree
//! with a brute-force scan and that position mirroring holds.

use gridkeep_ecs::prelude::*;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
struct Pos {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gold(i64);

gridkeep_ecs::component_enum! {
    enum Comp / Kind {
        Pos(Pos),
        Gold(Gold),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
enum Label {
    IsItem,
    At(Pos),
}

fn mirror(tags: &mut TagWriter<'_, Label>, old: Option<&Comp>, new: Option<&Comp>) {
    if old == new {
        return;
    }
    if let Some(Comp::Pos(p)) = old {
        tags.remove(&Label::At(*p));
    }
    if let Some(Comp::Pos(p)) = new {
        tags.add(Label::At(*p));
    }
}

fn new_world() -> World<Comp, Label> {
    let mut world = World::new();
    world.on_component_changed(Kind::Pos, mirror);
    world
}

/// Operations we can perform on the world.
#[derive(Debug, Clone)]
enum EcsOp {
    Spawn,
    Clear(usize),
    SetPos(usize, i32, i32),
    RemovePos(usize),
    SetGold(usize, i64),
    RemoveGold(usize),
    TagItem(usize),
    UntagItem(usize),
}

// Small coordinates so entities collide on cells often.
fn ecs_op_strategy() -> impl Strategy<Value = EcsOp> {
    prop_oneof![
        Just(EcsOp::Spawn),
        (0..100usize).prop_map(EcsOp::Clear),
        (0..100usize, 0..4i32, 0..4i32).prop_map(|(i, x, y)| EcsOp::SetPos(i, x, y)),
        (0..100usize).prop_map(EcsOp::RemovePos),
        (0..100usize, 1..10i64).prop_map(|(i, g)| EcsOp::SetGold(i, g)),
        (0..100usize).prop_map(EcsOp::RemoveGold),
        (0..100usize).prop_map(EcsOp::TagItem),
        (0..100usize).prop_map(EcsOp::UntagItem),
    ]
}

fn pick(alive: &[EntityId], i: usize) -> Option<EntityId> {
    alive.get(i % alive.len().max(1)).copied()
}

/// Brute-force reference for the pickup query.
fn scan(world: &World<Comp, Label>, alive: &[EntityId], cell: Pos) -> Vec<EntityId> {
    alive
        .iter()
        .copied()
        .filter(|&e| {
            world.get::<Pos>(e) == Some(&cell)
                && world.has::<Gold>(e)
                && world.has_tag(e, &Label::IsItem)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_preserve_index_and_mirror(ops in prop::collection::vec(ecs_op_strategy(), 1..60)) {
        let mut world = new_world();
        let mut alive: Vec<EntityId> = Vec::new();
        let mut cleared: Vec<EntityId> = Vec::new();

        for op in ops {
            match op {
                EcsOp::Spawn => alive.push(world.spawn()),
                EcsOp::Clear(i) => {
                    if let Some(e) = pick(&alive, i) {
                        world.clear_entity(e);
                        alive.retain(|&a| a != e);
                        cleared.push(e);
                    }
                }
                EcsOp::SetPos(i, x, y) => {
                    if let Some(e) = pick(&alive, i) {
                        world.set(e, Pos { x, y });
                    }
                }
                EcsOp::RemovePos(i) => {
                    if let Some(e) = pick(&alive, i) {
                        world.remove::<Pos>(e);
                    }
                }
                EcsOp::SetGold(i, g) => {
                    if let Some(e) = pick(&alive, i) {
                        world.set(e, Gold(g));
                    }
                }
                EcsOp::RemoveGold(i) => {
                    if let Some(e) = pick(&alive, i) {
                        world.remove::<Gold>(e);
                    }
                }
                EcsOp::TagItem(i) => {
                    if let Some(e) = pick(&alive, i) {
                        world.add_tag(e, Label::IsItem);
                    }
                }
                EcsOp::UntagItem(i) => {
                    if let Some(e) = pick(&alive, i) {
                        world.remove_tag(e, &Label::IsItem);
                    }
                }
            }

            // Invariant: every entity carries exactly the position tag of its
            // current position, and nothing else position-shaped.
            for &e in &alive {
                let at: Vec<Label> = world
                    .tags_of(e)
                    .filter(|t| matches!(t, Label::At(_)))
                    .cloned()
                    .collect();
                match world.get::<Pos>(e) {
                    Some(p) => {
                        prop_assert_eq!(at, vec![Label::At(*p)]);
                    }
                    None => {
                        prop_assert!(at.is_empty());
                    }
                }
            }

            // Invariant: indexed query agrees with a linear scan on every cell.
            for x in 0..4 {
                for y in 0..4 {
                    let cell = Pos { x, y };
                    let indexed = world.query(
                        &Query::new()
                            .with(Kind::Gold)
                            .tagged(Label::At(cell))
                            .tagged(Label::IsItem),
                    );
                    prop_assert_eq!(indexed, scan(&world, &alive, cell));
                }
            }

            // Invariant: cleared entities hold nothing and stay dead.
            for &e in &cleared {
                prop_assert!(!world.is_alive(e));
                prop_assert_eq!(world.components_of(e).count(), 0);
                prop_assert_eq!(world.tags_of(e).count(), 0);
            }

            prop_assert_eq!(world.entity_count(), alive.len() + 1);
        }
    }

    /// Moving an entity from p to q leaves only q tagged.
    #[test]
    fn move_leaves_only_new_position_tagged(
        px in -50..50i32, py in -50..50i32,
        qx in -50..50i32, qy in -50..50i32,
    ) {
        let (p, q) = (Pos { x: px, y: py }, Pos { x: qx, y: qy });
        prop_assume!(p != q);

        let mut world = new_world();
        let e = world.spawn();
        world.set(e, p);
        world.set(e, q);

        prop_assert!(!world.has_tag(e, &Label::At(p)));
        prop_assert!(world.has_tag(e, &Label::At(q)));
    }
}
