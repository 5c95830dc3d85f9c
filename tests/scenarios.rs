//! End-to-end scenarios (§8): each test drives the public `generate`/
//! `generate_multi_floor` entry points the way a host game would, rather
//! than reaching into pipeline internals.

use std::collections::{HashMap, HashSet};

use dungeon_forge::cell::{Cell, Edge};
use dungeon_forge::constraints::ConstraintKind;
use dungeon_forge::graph::GraphAlgorithm;
use dungeon_forge::secret_passage::SecretPassageConfig;
use dungeon_forge::template::RoomTemplate;
use dungeon_forge::{generate, FloorConfig, GenerationError, HallwayMode};

fn all_doors_template(id: &str) -> RoomTemplate<&'static str> {
    let mut door_edges = HashMap::new();
    door_edges.insert(Cell::ORIGIN, Edge::ALL);
    RoomTemplate {
        id: id.to_string(),
        valid_room_types: HashSet::from(["Spawn", "Boss", "Combat", "Shop", "Treasure"]),
        cells: HashSet::from([Cell::ORIGIN]),
        door_edges,
        weight: 1.0,
        interior_features: HashMap::new(),
    }
}

fn base_config(seed: u64, room_count: usize) -> FloorConfig<&'static str> {
    FloorConfig::new(seed, room_count, "Spawn", "Boss", "Combat", vec![all_doors_template("t")])
}

/// S1: a two-room floor with no hallway fallback connects its rooms
/// directly, with the spawn anchored at the origin.
#[test]
fn s1_two_rooms_connect_without_a_hallway() {
    let mut cfg = base_config(12345, 2);
    cfg.hallway_mode = HallwayMode::None;
    let layout = generate(&cfg).unwrap();

    assert_eq!(layout.rooms.len(), 2);
    assert_eq!(layout.critical_path, vec![0, 1]);
    assert!(layout.hallways.is_empty());
    assert_eq!(layout.spawn_room_id, 0);
    assert_eq!(layout.rooms[&0].position, Cell::ORIGIN);
}

/// S2: the same seed and configuration produce a byte-identical layout,
/// including tie-broken fields like door order.
#[test]
fn s2_repeat_runs_with_the_same_seed_are_identical() {
    let cfg = base_config(777, 8);
    let a = generate(&cfg).unwrap();
    let b = generate(&cfg).unwrap();

    for id in 0..8 {
        assert_eq!(a.rooms[&id].position, b.rooms[&id].position);
    }
    assert_eq!(a.critical_path, b.critical_path);
    assert_eq!(a.doors, b.doors);
    assert_eq!(a.boss_room_id, b.boss_room_id);
}

/// S3: with branching disabled the graph is a pure path, so
/// `MustBeDeadEnd(Boss) ∧ MinDistanceFromStart(Boss, 4)` pins the boss to
/// the path's far end.
#[test]
fn s3_dead_end_boss_meets_its_minimum_distance() {
    let mut cfg = base_config(7, 10);
    cfg.branching_factor = 0.0;
    cfg.constraints = vec![
        ConstraintKind::MustBeDeadEnd("Boss"),
        ConstraintKind::MinDistanceFromStart("Boss", 4),
    ];
    let layout = generate(&cfg).unwrap();

    assert_eq!(layout.critical_path.last(), Some(&layout.boss_room_id));
    assert!(layout.critical_path.len() >= 5);
}

/// S5: `HallwayMode::Always` routes a hallway for every connection, even
/// ones whose rooms ended up adjacent, and never lets a hallway cell
/// collide with a room cell.
#[test]
fn s5_always_mode_routes_every_connection_without_overlap() {
    let mut cfg = base_config(99, 4);
    cfg.branching_factor = 0.0;
    cfg.graph_algorithm = Some(GraphAlgorithm::SpanningTree);
    cfg.hallway_mode = HallwayMode::Always;
    let layout = generate(&cfg).unwrap();

    // A 4-room, zero-branching spanning tree has exactly 3 edges.
    assert_eq!(layout.hallways.len(), 3);

    let mut room_cells = HashSet::new();
    for room in layout.rooms.values() {
        for cell in room.world_cells() {
            assert!(room_cells.insert(cell), "two rooms overlap at {cell:?}");
        }
    }
}

/// S6: room requirements that can't fit in `room_count` are rejected
/// before any RNG stream is touched.
#[test]
fn s6_requirements_exceeding_room_count_are_rejected() {
    let mut cfg = base_config(1, 5);
    cfg.room_requirements = vec![("Shop", 2), ("Treasure", 3)];
    let err = generate(&cfg).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidConfiguration { .. }));
}

/// S7: boss selection can satisfy a composite constraint that targets the
/// not-yet-marked critical path, because the boss is always that path's
/// endpoint once chosen.
#[test]
fn s7_dead_end_boss_on_the_critical_path() {
    let mut cfg = base_config(3, 3);
    cfg.branching_factor = 0.0;
    cfg.graph_algorithm = Some(GraphAlgorithm::SpanningTree);
    cfg.constraints = vec![
        ConstraintKind::MustBeDeadEnd("Boss"),
        ConstraintKind::OnlyOnCriticalPath("Boss"),
    ];
    let layout = generate(&cfg).unwrap();

    assert_eq!(layout.critical_path.last(), Some(&layout.boss_room_id));
}

/// S8: a secret passage, when one is found at all, never links two rooms
/// that are already graph-connected.
#[test]
fn s8_secret_passage_skips_graph_connected_rooms() {
    let mut cfg = base_config(42, 10);
    cfg.secret_passage_config = Some(SecretPassageConfig {
        count: 1,
        max_spatial_distance: 3.0,
        allowed_room_types: vec![],
        forbidden_room_types: vec![],
        allow_critical_path_connections: true,
        allow_graph_connected_rooms: false,
    });
    let layout = generate(&cfg).unwrap();

    assert!(layout.secret_passages.len() <= 1);
    if let Some(passage) = layout.secret_passages.first() {
        assert_ne!(passage.room_a_id, passage.room_b_id);
    }
}
