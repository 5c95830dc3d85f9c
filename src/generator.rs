//! Pipeline orchestration (§2 data flow, §4.9): wires the five RNG streams
//! and every stage together into `generate`/`generate_multi_floor`.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, info, instrument};

use crate::assignment::{assign_room_types, AssignmentInput};
use crate::clusters::{detect_clusters, Cluster};
use crate::config::{FloorConfig, HallwayMode};
use crate::constraints::ConstraintKind;
use crate::difficulty::compute_difficulty;
use crate::error::GenerationError;
use crate::graph::{generate_graph, GraphAlgorithm};
use crate::hallway::route_hallways;
use crate::layout::{FloorConnection, FloorLayout, MultiFloorLayout, TransitionRoom, TransitionType};
use crate::rng;
use crate::secret_passage::generate_secret_passages;
use crate::spatial::{solve, SpatialInput};
use crate::template::RoomTemplate;

/// Run the full single-floor pipeline against an already-validated config
/// (§2): seed expansion, graph generation, type assignment, difficulty,
/// spatial solve, hallway routing, secret passages, clustering.
#[instrument(skip(config), fields(seed = config.seed, room_count = config.room_count))]
pub fn generate<T: Clone + Eq + Hash + std::fmt::Debug>(
    config: &FloorConfig<T>,
) -> Result<FloorLayout<T>, GenerationError> {
    config.validate()?;
    info!("starting floor generation");

    let mut streams = rng::expand(config.seed);

    let algorithm = config.graph_algorithm.clone().unwrap_or(GraphAlgorithm::SpanningTree);
    let mut graph = generate_graph(&algorithm, config.room_count, config.branching_factor, &mut streams.graph)?;
    debug!(node_count = graph.nodes.len(), "graph generated");

    let assignment_input = AssignmentInput {
        spawn_room_type: config.spawn_room_type.clone(),
        boss_room_type: config.boss_room_type.clone(),
        default_room_type: config.default_room_type.clone(),
        room_requirements: &config.room_requirements,
        constraints: &config.constraints,
        floor_index: None,
        zones: &config.zones,
    };
    let (assignment, zone_assignments) =
        assign_room_types(&mut graph, &assignment_input, &mut streams.type_assignment)?;
    debug!(boss = graph.boss_node_id, "room types assigned");

    let difficulty_config = config.difficulty_config.clone().unwrap_or_default();
    let difficulty = compute_difficulty(&graph, &difficulty_config);

    let zone_templates = zone_template_pools(&config.zones);
    let spatial_input = SpatialInput {
        templates: &config.templates,
        zone_templates: Some(&zone_templates),
        zone_assignments: Some(&zone_assignments),
        hallway_mode: config.hallway_mode,
        max_placement_radius: config.max_placement_radius,
    };
    let mut spatial_output = solve(
        &mut graph,
        &assignment,
        &difficulty,
        &spatial_input,
        &mut streams.template,
        &mut streams.spatial,
    )?;
    debug!(placed = spatial_output.placed.len(), "rooms placed");

    let (hallways, hallway_doors) = route_hallways(&graph, &spatial_output.placed, &mut spatial_output.occupied)?;
    spatial_output.doors.extend(hallway_doors);

    let secret_passage_config = config.secret_passage_config.clone().unwrap_or_default();
    let secret_passages = generate_secret_passages(
        &graph,
        &spatial_output.placed,
        &secret_passage_config,
        &mut spatial_output.occupied,
        &mut streams.hallway,
    );

    let clusters = config
        .cluster_config
        .as_ref()
        .map(|cfg| detect_clusters(&spatial_output.placed, cfg))
        .unwrap_or_default();
    validate_cluster_constraints(&config.constraints, &clusters)?;

    let boss_room_id = graph
        .boss_node_id
        .expect("boss is assigned before generate returns");

    info!(
        rooms = spatial_output.placed.len(),
        hallways = hallways.len(),
        secret_passages = secret_passages.len(),
        "floor generation complete"
    );

    Ok(FloorLayout {
        seed: config.seed,
        rooms: spatial_output.placed,
        doors: spatial_output.doors,
        hallways,
        secret_passages,
        critical_path: graph.critical_path.clone(),
        spawn_room_id: graph.start_node_id,
        boss_room_id,
        zone_assignments,
        transition_rooms: Vec::new(),
        clusters,
        difficulty,
    })
}

/// Post-placement check for `Must/Min/MaxClusterSize` (§9: these return `true`
/// unconditionally during assignment, since clusters don't exist yet — the
/// real check happens here, once `detect_clusters` has run).
fn validate_cluster_constraints<T: Eq + std::fmt::Debug>(
    constraints: &[ConstraintKind<T>],
    clusters: &[Cluster<T>],
) -> Result<(), GenerationError> {
    for constraint in constraints {
        check_cluster_constraint(constraint, clusters)?;
    }
    Ok(())
}

fn check_cluster_constraint<T: Eq + std::fmt::Debug>(
    constraint: &ConstraintKind<T>,
    clusters: &[Cluster<T>],
) -> Result<(), GenerationError> {
    match constraint {
        ConstraintKind::MustClusterSize(t, n) => check_cluster_sizes(t, *n, clusters, |size, n| size == n),
        ConstraintKind::MinClusterSize(t, n) => check_cluster_sizes(t, *n, clusters, |size, n| size >= n),
        ConstraintKind::MaxClusterSize(t, n) => check_cluster_sizes(t, *n, clusters, |size, n| size <= n),
        ConstraintKind::Composite(_, children) => {
            for child in children {
                check_cluster_constraint(child, clusters)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_cluster_sizes<T: Eq + std::fmt::Debug>(
    target: &T,
    required: usize,
    clusters: &[Cluster<T>],
    satisfies: impl Fn(usize, usize) -> bool,
) -> Result<(), GenerationError> {
    for cluster in clusters.iter().filter(|c| &c.room_type == target) {
        let size = cluster.member_room_ids.len();
        if !satisfies(size, required) {
            return Err(GenerationError::constraint(format!("{target:?}"), required, size));
        }
    }
    Ok(())
}

fn zone_template_pools<T: Clone>(zones: &[crate::zones::Zone<T>]) -> HashMap<String, Vec<RoomTemplate<T>>> {
    zones
        .iter()
        .filter_map(|zone| zone.templates.as_ref().map(|templates| (zone.id.clone(), templates.clone())))
        .collect()
}

/// Run each floor config's pipeline independently, in input order, then
/// validate the typed inter-floor connections (§4.9). Each floor is
/// generated with its own index injected into the assignment step's
/// [`crate::constraints::EvalContext`], so floor-aware constraints (e.g. a
/// difficulty cap that only applies below floor 3) see the right value —
/// there's no structural change to the constraint list itself.
#[instrument(skip(floor_configs, connections), fields(floor_count = floor_configs.len()))]
pub fn generate_multi_floor<T: Clone + Eq + Hash + std::fmt::Debug>(
    floor_configs: &[FloorConfig<T>],
    connections: Vec<FloorConnection>,
) -> Result<MultiFloorLayout<T>, GenerationError> {
    let mut floors = Vec::with_capacity(floor_configs.len());
    for (floor_index, config) in floor_configs.iter().enumerate() {
        floors.push(generate_with_floor_index(config, floor_index)?);
    }

    for connection in &connections {
        connection.validate(&floors)?;
    }

    let mut layout = MultiFloorLayout { floors, connections };
    mark_transition_rooms(&mut layout);
    Ok(layout)
}

fn generate_with_floor_index<T: Clone + Eq + Hash + std::fmt::Debug>(
    config: &FloorConfig<T>,
    floor_index: usize,
) -> Result<FloorLayout<T>, GenerationError> {
    config.validate()?;

    let mut streams = rng::expand(config.seed);
    let algorithm = config.graph_algorithm.clone().unwrap_or(GraphAlgorithm::SpanningTree);
    let mut graph = generate_graph(&algorithm, config.room_count, config.branching_factor, &mut streams.graph)?;

    let assignment_input = AssignmentInput {
        spawn_room_type: config.spawn_room_type.clone(),
        boss_room_type: config.boss_room_type.clone(),
        default_room_type: config.default_room_type.clone(),
        room_requirements: &config.room_requirements,
        constraints: &config.constraints,
        floor_index: Some(floor_index),
        zones: &config.zones,
    };
    let (assignment, zone_assignments) =
        assign_room_types(&mut graph, &assignment_input, &mut streams.type_assignment)?;

    let difficulty_config = config.difficulty_config.clone().unwrap_or_default();
    let difficulty = compute_difficulty(&graph, &difficulty_config);

    let zone_templates = zone_template_pools(&config.zones);
    let spatial_input = SpatialInput {
        templates: &config.templates,
        zone_templates: Some(&zone_templates),
        zone_assignments: Some(&zone_assignments),
        hallway_mode: config.hallway_mode,
        max_placement_radius: config.max_placement_radius,
    };
    let mut spatial_output = solve(
        &mut graph,
        &assignment,
        &difficulty,
        &spatial_input,
        &mut streams.template,
        &mut streams.spatial,
    )?;

    let (hallways, hallway_doors) = route_hallways(&graph, &spatial_output.placed, &mut spatial_output.occupied)?;
    spatial_output.doors.extend(hallway_doors);

    let secret_passage_config = config.secret_passage_config.clone().unwrap_or_default();
    let secret_passages = generate_secret_passages(
        &graph,
        &spatial_output.placed,
        &secret_passage_config,
        &mut spatial_output.occupied,
        &mut streams.hallway,
    );

    let clusters: Vec<Cluster<T>> = config
        .cluster_config
        .as_ref()
        .map(|cfg| detect_clusters(&spatial_output.placed, cfg))
        .unwrap_or_default();
    validate_cluster_constraints(&config.constraints, &clusters)?;

    let boss_room_id = graph
        .boss_node_id
        .expect("boss is assigned before generate returns");

    Ok(FloorLayout {
        seed: config.seed,
        rooms: spatial_output.placed,
        doors: spatial_output.doors,
        hallways,
        secret_passages,
        critical_path: graph.critical_path.clone(),
        spawn_room_id: graph.start_node_id,
        boss_room_id,
        zone_assignments,
        transition_rooms: Vec::new(),
        clusters,
        difficulty,
    })
}

/// Populate each floor's `transition_rooms` from the now-validated
/// connection list; called after [`generate_multi_floor`] assembles the
/// final `MultiFloorLayout`.
pub fn mark_transition_rooms<T>(layout: &mut MultiFloorLayout<T>) {
    for connection in layout.connections.clone() {
        if let Some(floor) = layout.floors.get_mut(connection.from_floor) {
            push_transition(floor, connection.from_room, connection.connection_type);
        }
        if let Some(floor) = layout.floors.get_mut(connection.to_floor) {
            push_transition(floor, connection.to_room, connection.connection_type);
        }
    }
}

fn push_transition<T>(floor: &mut FloorLayout<T>, room_id: usize, transition_type: TransitionType) {
    if !floor.transition_rooms.iter().any(|t| t.room_id == room_id && t.transition_type == transition_type) {
        floor.transition_rooms.push(TransitionRoom { room_id, transition_type });
    }
}
