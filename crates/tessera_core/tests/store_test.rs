//! Integration tests for the entity store through the public API.

use tessera_core::{Component, ComponentType, EcsError, Entity, EntityId, Store, World, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pos(i32);
impl Component for Pos {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vel(i32);
impl Component for Vel {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frozen;
impl Component for Frozen {}

fn ids(store: &Store, types: &[ComponentType]) -> Vec<EntityId> {
    store.iter(types).map(Entity::id).collect()
}

#[test]
fn test_ids_never_repeat() {
    let mut store = Store::new(2);
    let mut issued = Vec::new();
    for round in 0..5 {
        let a = store.add_entity((Pos(round),));
        let b = store.add_entity((Pos(round), Vel(round)));
        store.remove(a).unwrap();
        issued.push(a);
        issued.push(b);
    }
    store.clear();
    issued.push(store.add_entity(()));

    let mut sorted = issued.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, issued);
}

#[test]
fn test_reuse_before_growth() {
    let mut store = Store::new(3);
    let a = store.add_entity((Pos(1),));
    let b = store.add_entity((Pos(2),));
    let c = store.add_entity((Pos(3),));
    store.remove(a).unwrap();
    store.remove(c).unwrap();

    let d = store.add_entity((Pos(4),));
    let e = store.add_entity((Pos(5),));
    assert_eq!(store.capacity(), 3);
    assert_eq!(ids(&store, &[]), vec![d, b, e]);

    // Full again: the next add grows, doubling once.
    store.add_entity((Pos(6),));
    assert_eq!(store.capacity(), 6);
}

#[test]
fn test_size_tracks_live_entities() {
    let mut store = Store::new(4);
    let ids: Vec<_> = (0..10).map(|i| store.add_entity((Pos(i),))).collect();
    assert_eq!(store.size(), 10);

    for id in ids.iter().step_by(2) {
        store.remove(*id).unwrap();
    }
    assert_eq!(store.size(), 5);
    assert_eq!(store.iter(&[]).count(), 5);

    for id in ids.iter().step_by(2) {
        assert!(matches!(store.remove(*id), Err(EcsError::EntityNotFound(e)) if e == *id));
    }
    assert_eq!(store.size(), 5);
}

#[test]
fn test_filters() {
    let mut store = Store::new(8);
    let moving = store.add_entity((Pos(0), Vel(1)));
    let still = store.add_entity((Pos(0),));
    let frozen = store.add_entity((Pos(0), Vel(1), Frozen));

    let pos = ComponentType::of::<Pos>();
    let vel = ComponentType::of::<Vel>();
    let ice = ComponentType::of::<Frozen>();

    assert_eq!(ids(&store, &[pos, vel]), vec![moving, frozen]);
    assert_eq!(ids(&store, &[pos]), vec![moving, still, frozen]);

    let thawed: Vec<_> = store
        .iter(&[pos, vel])
        .filter(|e| e.not_contains(&[ice]))
        .map(Entity::id)
        .collect();
    assert_eq!(thawed, vec![moving]);
}

#[test]
fn test_components_change_filter_membership() {
    let mut store = Store::new(4);
    let id = store.add_entity((Pos(0),));
    let vel = [ComponentType::of::<Vel>()];
    assert!(ids(&store, &vel).is_empty());

    store.get_mut(id).unwrap().add(Vel(2));
    assert_eq!(ids(&store, &vel), vec![id]);

    assert_eq!(store.remove_component::<Vel>(id).unwrap(), Some(Vel(2)));
    assert!(ids(&store, &vel).is_empty());
    assert_eq!(ids(&store, &[]), vec![id]);
}

#[test]
fn test_removing_while_walking_with_cursor() {
    let mut world = World::new();
    for i in 0..6 {
        world.add_entity((Pos(i),));
    }

    let mut cursor = world.cursor(&[ComponentType::of::<Pos>()]);
    while let Some(id) = cursor.next_id(world.store()) {
        let odd = world.get(id).unwrap().get::<Pos>().is_some_and(|p| p.0 % 2 == 1);
        if odd {
            world.remove(id).unwrap();
        }
    }

    let left: Vec<_> = world
        .iter(&[])
        .filter_map(|e| e.get::<Pos>().map(|p| p.0))
        .collect();
    assert_eq!(left, vec![0, 2, 4]);
    assert_eq!(world.size(), 3);
}

#[test]
fn test_sort_then_reuse() {
    let mut store = Store::new(4);
    let a = store.add_entity((Pos(3),));
    let b = store.add_entity((Pos(1),));
    let c = store.add_entity((Pos(2),));
    store.remove(b).unwrap();

    store.sort_by(|x, y| x.get::<Pos>().map(|p| p.0).cmp(&y.get::<Pos>().map(|p| p.0)));
    assert_eq!(ids(&store, &[]), vec![c, a]);

    let d = store.add_entity((Pos(0),));
    let e = store.add_entity((Pos(9),));
    assert_eq!(ids(&store, &[]), vec![c, a, d, e]);
    assert_eq!(store.capacity(), 4);
    assert_eq!(store.get(a).unwrap().get::<Pos>(), Some(&Pos(3)));
}

#[test]
fn test_world_from_toml_config() {
    let config = WorldConfig::from_toml_str("entity_capacity = 2\nsignal_capacity = 4").unwrap();
    let mut world = World::with_config(&config).unwrap();
    assert_eq!(world.store().capacity(), 2);

    for i in 0..3 {
        world.add_entity((Pos(i),));
    }
    assert_eq!(world.store().capacity(), 4);
}
