//! Incremental spatial solver (§4.5): packs templates on an integer grid,
//! preferring door-to-door adjacency and falling back to a nearby placement
//! that the hallway router later connects.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Edge};
use crate::config::HallwayMode;
use crate::constants::{DEFAULT_MAX_PLACEMENT_RADIUS, NEARBY_PLACEMENT_START_RADIUS};
use crate::error::GenerationError;
use crate::graph::FloorGraph;
use crate::template::RoomTemplate;
use crate::template_select::select_template;

/// A door carved into a room wall. Exactly one of the two `connects_to_*`
/// fields is set once hallway routing completes; during the spatial solve
/// only `connects_to_room_id` is ever populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub position: Cell,
    pub edge: Edge,
    pub connects_to_room_id: Option<usize>,
    pub connects_to_hallway_id: Option<usize>,
}

/// A room placed on the grid: its assigned template, anchor position, and
/// per-room difficulty value carried over from the difficulty stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + std::hash::Hash"
))]
pub struct PlacedRoom<T> {
    pub node_id: usize,
    pub room_type: T,
    pub template: RoomTemplate<T>,
    pub position: Cell,
    pub difficulty: f32,
}

impl<T: Eq + Hash + Clone> PlacedRoom<T> {
    pub fn world_cells(&self) -> HashSet<Cell> {
        self.template.world_cells(self.position)
    }
}

/// Pool of templates to draw from when placing rooms, plus hallway policy.
pub struct SpatialInput<'a, T> {
    pub templates: &'a [RoomTemplate<T>],
    pub zone_templates: Option<&'a HashMap<String, Vec<RoomTemplate<T>>>>,
    pub zone_assignments: Option<&'a HashMap<usize, String>>,
    pub hallway_mode: HallwayMode,
    pub max_placement_radius: i32,
}

impl<'a, T> SpatialInput<'a, T> {
    fn zone_pool(&self, node_id: usize) -> Option<&'a [RoomTemplate<T>]> {
        let zone_id = self.zone_assignments?.get(&node_id)?;
        self.zone_templates?.get(zone_id).map(|v| v.as_slice())
    }
}

pub struct SpatialOutput<T> {
    pub placed: HashMap<usize, PlacedRoom<T>>,
    pub doors: Vec<Door>,
    pub occupied: HashSet<Cell>,
}

/// Run the solver, mutating `graph`'s connections to flag which ones need a
/// hallway. BFS order from node 0, ascending node id among equal-depth
/// frontier entries, as required for determinism (§4.5).
pub fn solve<T: Clone + Eq + Hash + std::fmt::Debug>(
    graph: &mut FloorGraph,
    assignment: &HashMap<usize, T>,
    difficulty: &HashMap<usize, f32>,
    input: &SpatialInput<T>,
    template_rng: &mut Xoshiro256PlusPlus,
    spatial_rng: &mut Xoshiro256PlusPlus,
) -> Result<SpatialOutput<T>, GenerationError> {
    let mut placed: HashMap<usize, PlacedRoom<T>> = HashMap::new();
    let mut doors = Vec::new();
    let mut occupied: HashSet<Cell> = HashSet::new();

    place_node(
        graph,
        assignment,
        difficulty,
        input,
        0,
        Cell::ORIGIN,
        &mut placed,
        &mut occupied,
        template_rng,
    )?;

    let mut visited = vec![false; graph.nodes.len()];
    visited[0] = true;
    let mut queue = VecDeque::new();
    queue.push_back(0usize);
    let mut tree_edge: HashSet<(usize, usize)> = HashSet::new();

    while let Some(r) = queue.pop_front() {
        let neighbors = graph.node(r).neighbors.clone();
        for n in neighbors {
            if visited[n] {
                continue;
            }
            visited[n] = true;
            tree_edge.insert(ordered(r, n));

            let placed_new = try_adjacent_placement(&placed, input, r, n, &occupied, spatial_rng);
            match placed_new {
                Some((anchor, door_r, door_n)) => {
                    place_node(
                        graph,
                        assignment,
                        difficulty,
                        input,
                        n,
                        anchor,
                        &mut placed,
                        &mut occupied,
                        template_rng,
                    )?;
                    doors.push(Door {
                        position: door_r.0,
                        edge: door_r.1,
                        connects_to_room_id: Some(n),
                        connects_to_hallway_id: None,
                    });
                    doors.push(Door {
                        position: door_n.0,
                        edge: door_n.1,
                        connects_to_room_id: Some(r),
                        connects_to_hallway_id: None,
                    });
                }
                None => {
                    if input.hallway_mode == HallwayMode::None {
                        return Err(GenerationError::spatial_connection(
                            format!("no adjacent placement found for nodes {r} and {n}"),
                            r,
                            n,
                        ));
                    }
                    let anchor = nearby_placement(&placed, input, r, n, &occupied, spatial_rng).ok_or_else(|| {
                        GenerationError::spatial_connection(
                            format!("no nearby placement found for nodes {r} and {n} within radius"),
                            r,
                            n,
                        )
                    })?;
                    place_node(
                        graph,
                        assignment,
                        difficulty,
                        input,
                        n,
                        anchor,
                        &mut placed,
                        &mut occupied,
                        template_rng,
                    )?;
                    graph.connection_mut(r, n).requires_hallway = true;
                }
            }

            queue.push_back(n);
        }
    }

    // Non-tree edges (branching extras) connect two rooms already placed.
    // Try a direct adjacency check; otherwise they need a hallway too.
    let non_tree: Vec<(usize, usize)> = graph
        .connections
        .iter()
        .map(|c| (c.a, c.b))
        .filter(|e| !tree_edge.contains(e))
        .collect();

    for (a, b) in non_tree {
        if let Some((door_a, door_b)) = existing_adjacency(&placed, a, b) {
            doors.push(Door {
                position: door_a.0,
                edge: door_a.1,
                connects_to_room_id: Some(b),
                connects_to_hallway_id: None,
            });
            doors.push(Door {
                position: door_b.0,
                edge: door_b.1,
                connects_to_room_id: Some(a),
                connects_to_hallway_id: None,
            });
        } else if input.hallway_mode == HallwayMode::None {
            return Err(GenerationError::spatial_connection(
                format!("branching edge {a}-{b} requires a hallway but hallway_mode is None"),
                a,
                b,
            ));
        } else {
            graph.connection_mut(a, b).requires_hallway = true;
        }
    }

    if input.hallway_mode == HallwayMode::Always {
        for conn in &mut graph.connections {
            conn.requires_hallway = true;
        }
    }

    Ok(SpatialOutput { placed, doors, occupied })
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[allow(clippy::too_many_arguments)]
fn place_node<T: Clone + Eq + Hash + std::fmt::Debug>(
    graph: &FloorGraph,
    assignment: &HashMap<usize, T>,
    difficulty: &HashMap<usize, f32>,
    input: &SpatialInput<T>,
    node_id: usize,
    anchor: Cell,
    placed: &mut HashMap<usize, PlacedRoom<T>>,
    occupied: &mut HashSet<Cell>,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<(), GenerationError> {
    let _ = graph;
    let room_type = assignment
        .get(&node_id)
        .expect("every node has a room type before the spatial stage runs")
        .clone();
    let template = select_template(input.zone_pool(node_id), input.templates, &room_type, rng)?.clone();
    let world_cells = template.world_cells(anchor);
    occupied.extend(world_cells);
    let difficulty_value = difficulty.get(&node_id).copied().unwrap_or(0.0);
    placed.insert(
        node_id,
        PlacedRoom {
            node_id,
            room_type,
            template,
            position: anchor,
            difficulty: difficulty_value,
        },
    );
    Ok(())
}

/// All `(local_cell_r, dir_r, local_cell_n, dir_n)` pairs where `dir_n` is
/// the opposite of `dir_r` and both are permitted door edges.
fn door_pairs<T>(template_r: &RoomTemplate<T>, template_n: &RoomTemplate<T>) -> Vec<(Cell, Edge, Cell, Edge)> {
    let mut pairs = Vec::new();
    for (&cell_r, edges_r) in &template_r.door_edges {
        for dir_r in edges_r.iter() {
            for (&cell_n, edges_n) in &template_n.door_edges {
                for dir_n in edges_n.iter() {
                    if dir_n == dir_r.opposite() {
                        pairs.push((cell_r, dir_r, cell_n, dir_n));
                    }
                }
            }
        }
    }
    // `door_edges` is a HashMap; its iteration order isn't stable across
    // process runs, so sort before the caller shuffles with a seeded RNG.
    pairs.sort_by_key(|(cell_r, dir_r, cell_n, dir_n)| (*cell_r, dir_r.bits(), *cell_n, dir_n.bits()));
    pairs
}

/// `n`'s template hasn't been selected yet, so every candidate template in
/// its pool is probed in turn; the first that yields a valid anchor wins
/// ("accept the first anchor at which all template cells are unoccupied").
fn try_adjacent_placement<T: Clone + Eq + Hash + std::fmt::Debug>(
    placed: &HashMap<usize, PlacedRoom<T>>,
    input: &SpatialInput<T>,
    r: usize,
    n: usize,
    occupied: &HashSet<Cell>,
    rng: &mut Xoshiro256PlusPlus,
) -> Option<(Cell, (Cell, Edge), (Cell, Edge))> {
    let room_r = placed.get(&r)?;
    let candidates: Vec<&RoomTemplate<T>> = input.zone_pool(n).unwrap_or(input.templates).iter().collect();
    for template_n in candidates {
        let mut pairs = door_pairs(&room_r.template, template_n);
        pairs.shuffle(rng);
        for (cell_r, dir_r, cell_n, dir_n) in pairs {
            let world_door_r = cell_r + room_r.position;
            let outside_r = world_door_r.neighbor(dir_r);
            let anchor_n = outside_r - cell_n;
            let world_cells_n = template_n.world_cells(anchor_n);
            if world_cells_n.is_disjoint(occupied) {
                return Some((anchor_n, (world_door_r, dir_r), (outside_r, dir_n)));
            }
        }
    }
    None
}

fn nearby_placement<T: Clone + Eq + Hash + std::fmt::Debug>(
    placed: &HashMap<usize, PlacedRoom<T>>,
    input: &SpatialInput<T>,
    r: usize,
    n: usize,
    occupied: &HashSet<Cell>,
    rng: &mut Xoshiro256PlusPlus,
) -> Option<Cell> {
    let room_r = placed.get(&r)?;
    let pool: Vec<&RoomTemplate<T>> = input.zone_pool(n).unwrap_or(input.templates).iter().collect();
    // A template hasn't been committed yet for `n`; use the first template
    // in the pool as the shape probed at each candidate anchor — selection
    // proper happens in `place_node` once an anchor is confirmed workable.
    let template = *pool.first()?;

    for radius in NEARBY_PLACEMENT_START_RADIUS..input.max_placement_radius {
        let ring = concentric_square_ring(room_r.position, radius);
        let valid: Vec<Cell> = ring
            .into_iter()
            .filter(|&anchor| template.world_cells(anchor).is_disjoint(occupied))
            .collect();
        if !valid.is_empty() {
            let idx = rng.gen_range(0..valid.len());
            return Some(valid[idx]);
        }
    }
    None
}

/// Cells at exactly Chebyshev distance `radius` from `center`, in
/// lexicographic `(x, y)` order.
fn concentric_square_ring(center: Cell, radius: i32) -> Vec<Cell> {
    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx.abs().max(dy.abs()) == radius {
                cells.push(center.offset(dx, dy));
            }
        }
    }
    cells.sort();
    cells
}

fn existing_adjacency<T>(
    placed: &HashMap<usize, PlacedRoom<T>>,
    a: usize,
    b: usize,
) -> Option<((Cell, Edge), (Cell, Edge))> {
    let room_a = placed.get(&a)?;
    let room_b = placed.get(&b)?;
    let mut candidates = Vec::new();
    for (cell_a, edges_a) in &room_a.template.door_edges {
        for dir_a in edges_a.iter() {
            let world_a = *cell_a + room_a.position;
            let outside = world_a.neighbor(dir_a);
            for (cell_b, edges_b) in &room_b.template.door_edges {
                let world_b = *cell_b + room_b.position;
                if world_b == outside {
                    for dir_b in edges_b.iter() {
                        if dir_b == dir_a.opposite() {
                            candidates.push(((world_a, dir_a), (world_b, dir_b)));
                        }
                    }
                }
            }
        }
    }
    // `door_edges` is a HashMap; iterating it directly would make "first
    // match" depend on per-process hash seeding. Sort to a stable order first.
    candidates.sort_by_key(|((wa, da), (wb, db))| (*wa, da.bits(), *wb, db.bits()));
    candidates.into_iter().next()
}

impl<'a, T> Default for SpatialInput<'a, T> {
    fn default() -> Self {
        Self {
            templates: &[],
            zone_templates: None,
            zone_assignments: None,
            hallway_mode: HallwayMode::AsNeeded,
            max_placement_radius: DEFAULT_MAX_PLACEMENT_RADIUS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap as Map;

    fn door_template(id: &str, dirs: Edge) -> RoomTemplate<&'static str> {
        let mut door_edges = Map::new();
        door_edges.insert(Cell::ORIGIN, dirs);
        RoomTemplate {
            id: id.to_string(),
            valid_room_types: std::collections::HashSet::from(["Combat"]),
            cells: std::collections::HashSet::from([Cell::ORIGIN]),
            door_edges,
            weight: 1.0,
            interior_features: Map::new(),
        }
    }

    #[test]
    fn two_rooms_place_adjacently() {
        let mut graph = FloorGraph::from_edges(2, vec![(0, 1)]);
        let mut assignment = Map::new();
        assignment.insert(0, "Spawn");
        assignment.insert(1, "Boss");
        let difficulty = Map::new();
        let templates = vec![door_template("t", Edge::ALL)];
        let input = SpatialInput {
            templates: &templates,
            zone_templates: None,
            zone_assignments: None,
            hallway_mode: HallwayMode::AsNeeded,
            max_placement_radius: DEFAULT_MAX_PLACEMENT_RADIUS,
        };
        let mut template_rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut spatial_rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let out = solve(&mut graph, &assignment, &difficulty, &input, &mut template_rng, &mut spatial_rng).unwrap();
        assert_eq!(out.placed.len(), 2);
        assert!(!graph.connections[0].requires_hallway);
        assert_eq!(out.doors.len(), 2);
    }

    #[test]
    fn none_mode_errors_when_no_room_fits() {
        let mut graph = FloorGraph::from_edges(2, vec![(0, 1)]);
        let mut assignment = Map::new();
        assignment.insert(0, "Spawn");
        assignment.insert(1, "Boss");
        let difficulty = Map::new();
        // No door edges at all -> adjacency is impossible.
        let mut door_edges = Map::new();
        door_edges.insert(Cell::ORIGIN, Edge::NONE);
        let templates = vec![RoomTemplate {
            id: "t".to_string(),
            valid_room_types: std::collections::HashSet::from(["Spawn", "Boss"]),
            cells: std::collections::HashSet::from([Cell::ORIGIN]),
            door_edges,
            weight: 1.0,
            interior_features: Map::new(),
        }];
        let input = SpatialInput {
            templates: &templates,
            zone_templates: None,
            zone_assignments: None,
            hallway_mode: HallwayMode::None,
            max_placement_radius: DEFAULT_MAX_PLACEMENT_RADIUS,
        };
        let mut template_rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut spatial_rng = Xoshiro256PlusPlus::seed_from_u64(2);
        assert!(solve(&mut graph, &assignment, &difficulty, &input, &mut template_rng, &mut spatial_rng).is_err());
    }

    #[test]
    fn always_mode_flags_every_connection() {
        let mut graph = FloorGraph::from_edges(2, vec![(0, 1)]);
        let mut assignment = Map::new();
        assignment.insert(0, "Spawn");
        assignment.insert(1, "Boss");
        let difficulty = Map::new();
        let templates = vec![door_template("t", Edge::ALL)];
        let input = SpatialInput {
            templates: &templates,
            zone_templates: None,
            zone_assignments: None,
            hallway_mode: HallwayMode::Always,
            max_placement_radius: DEFAULT_MAX_PLACEMENT_RADIUS,
        };
        let mut template_rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut spatial_rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let _out = solve(&mut graph, &assignment, &difficulty, &input, &mut template_rng, &mut spatial_rng).unwrap();
        assert!(graph.connections.iter().all(|c| c.requires_hallway));
    }
}
