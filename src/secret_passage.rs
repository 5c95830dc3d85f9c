//! Secret passages: hidden connections between spatially nearby rooms that
//! are not represented in the graph (§4.7). Generated after hallways.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::graph::FloorGraph;
use crate::hallway::{astar, choose_door_pair, collapse_path, Hallway};
use crate::spatial::{Door, PlacedRoom};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretPassageConfig<T> {
    pub count: usize,
    pub max_spatial_distance: f32,
    pub allowed_room_types: Vec<T>,
    pub forbidden_room_types: Vec<T>,
    pub allow_critical_path_connections: bool,
    pub allow_graph_connected_rooms: bool,
}

impl<T> Default for SecretPassageConfig<T> {
    fn default() -> Self {
        Self {
            count: 0,
            max_spatial_distance: 10.0,
            allowed_room_types: Vec::new(),
            forbidden_room_types: Vec::new(),
            allow_critical_path_connections: true,
            allow_graph_connected_rooms: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretPassage {
    pub room_a_id: usize,
    pub room_b_id: usize,
    pub door_a: Door,
    pub door_b: Door,
    pub hallway: Option<Hallway>,
}

/// Generate up to `config.count` secret passages. Does not touch the graph,
/// `distance_from_start`, or the critical path.
pub fn generate_secret_passages<T: Clone + Eq + Hash>(
    graph: &FloorGraph,
    placed: &HashMap<usize, PlacedRoom<T>>,
    config: &SecretPassageConfig<T>,
    occupied: &mut HashSet<Cell>,
    rng: &mut Xoshiro256PlusPlus,
) -> Vec<SecretPassage> {
    if config.count == 0 {
        return Vec::new();
    }

    let graph_edges: HashSet<(usize, usize)> = graph.connections.iter().map(|c| (c.a, c.b)).collect();
    let mut used_rooms: HashSet<(usize, usize)> = HashSet::new();
    let mut passages = Vec::new();
    let mut next_hallway_id = 0usize;

    for _ in 0..config.count {
        let mut candidates = eligible_pairs(graph, placed, config, &graph_edges, &used_rooms);
        if candidates.is_empty() {
            break;
        }
        candidates.shuffle(rng);
        let (a, b) = candidates[0];
        used_rooms.insert((a, b));

        let room_a = &placed[&a];
        let room_b = &placed[&b];
        let Some((door_a, door_b)) = choose_door_pair(room_a, room_b) else {
            continue;
        };

        let start = door_a.0.neighbor(door_a.1);
        let goal = door_b.0.neighbor(door_b.1);
        let adjacent = start == goal;

        let (final_door_a, final_door_b, hallway) = if adjacent {
            (
                Door {
                    position: door_a.0,
                    edge: door_a.1,
                    connects_to_room_id: Some(b),
                    connects_to_hallway_id: None,
                },
                Door {
                    position: door_b.0,
                    edge: door_b.1,
                    connects_to_room_id: Some(a),
                    connects_to_hallway_id: None,
                },
                None,
            )
        } else {
            let Some(path) = astar(start, goal, occupied) else {
                continue;
            };
            let hallway_id = next_hallway_id;
            next_hallway_id += 1;
            let segments = collapse_path(&path);
            occupied.extend(path.iter().copied());

            let door_a_record = Door {
                position: door_a.0,
                edge: door_a.1,
                connects_to_room_id: None,
                connects_to_hallway_id: Some(hallway_id),
            };
            let door_b_record = Door {
                position: door_b.0,
                edge: door_b.1,
                connects_to_room_id: None,
                connects_to_hallway_id: Some(hallway_id),
            };
            let hallway = Hallway {
                id: hallway_id,
                segments,
                door_a: door_a_record.clone(),
                door_b: door_b_record.clone(),
            };
            (door_a_record, door_b_record, Some(hallway))
        };

        passages.push(SecretPassage {
            room_a_id: a,
            room_b_id: b,
            door_a: final_door_a,
            door_b: final_door_b,
            hallway,
        });
    }

    passages
}

fn eligible_pairs<T: Clone + Eq + Hash>(
    graph: &FloorGraph,
    placed: &HashMap<usize, PlacedRoom<T>>,
    config: &SecretPassageConfig<T>,
    graph_edges: &HashSet<(usize, usize)>,
    used_rooms: &HashSet<(usize, usize)>,
) -> Vec<(usize, usize)> {
    let mut ids: Vec<usize> = placed.keys().copied().collect();
    ids.sort_unstable();

    let mut pairs = Vec::new();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            if used_rooms.contains(&(a, b)) {
                continue;
            }
            let room_a = &placed[&a];
            let room_b = &placed[&b];

            if !type_allowed(&room_a.room_type, config) || !type_allowed(&room_b.room_type, config) {
                continue;
            }

            let centroid_a = centroid(room_a);
            let centroid_b = centroid(room_b);
            let dist = ((centroid_a.0 - centroid_b.0).powi(2) + (centroid_a.1 - centroid_b.1).powi(2)).sqrt();
            if dist > config.max_spatial_distance {
                continue;
            }

            if !config.allow_critical_path_connections
                && (graph.node(a).on_critical_path || graph.node(b).on_critical_path)
            {
                continue;
            }

            if !config.allow_graph_connected_rooms && graph_edges.contains(&(a, b)) {
                continue;
            }

            pairs.push((a, b));
        }
    }

    pairs.sort_unstable();
    pairs
}

fn type_allowed<T: Clone + Eq>(room_type: &T, config: &SecretPassageConfig<T>) -> bool {
    if config.forbidden_room_types.iter().any(|t| t == room_type) {
        return false;
    }
    if config.allowed_room_types.is_empty() {
        return true;
    }
    config.allowed_room_types.iter().any(|t| t == room_type)
}

fn centroid<T: Eq + Hash + Clone>(room: &PlacedRoom<T>) -> (f32, f32) {
    let cells = room.world_cells();
    let n = cells.len() as f32;
    let (sx, sy) = cells
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x as f32, sy + c.y as f32));
    (sx / n, sy / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RoomTemplate;
    use std::collections::HashMap as Map;

    fn room(id: usize, anchor: Cell) -> PlacedRoom<&'static str> {
        let mut door_edges = Map::new();
        door_edges.insert(Cell::ORIGIN, crate::cell::Edge::ALL);
        PlacedRoom {
            node_id: id,
            room_type: "Combat",
            template: RoomTemplate {
                id: format!("t{id}"),
                valid_room_types: std::collections::HashSet::from(["Combat"]),
                cells: std::collections::HashSet::from([Cell::ORIGIN]),
                door_edges,
                weight: 1.0,
                interior_features: Map::new(),
            },
            position: anchor,
            difficulty: 1.0,
        }
    }

    #[test]
    fn zero_count_produces_nothing() {
        let graph = FloorGraph::from_edges(2, vec![(0, 1)]);
        let mut placed = Map::new();
        placed.insert(0, room(0, Cell::new(0, 0)));
        placed.insert(1, room(1, Cell::new(5, 0)));
        let config = SecretPassageConfig::<&str>::default();
        let mut occupied = HashSet::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        use rand::SeedableRng;
        let passages = generate_secret_passages(&graph, &placed, &config, &mut occupied, &mut rng);
        assert!(passages.is_empty());
    }

    #[test]
    fn finds_a_passage_between_nearby_non_adjacent_non_graph_rooms() {
        use rand::SeedableRng;
        let graph = FloorGraph::from_edges(3, vec![(0, 1)]);
        let mut placed = Map::new();
        placed.insert(0, room(0, Cell::new(0, 0)));
        placed.insert(1, room(1, Cell::new(20, 20)));
        placed.insert(2, room(2, Cell::new(3, 0)));
        let config = SecretPassageConfig {
            count: 1,
            max_spatial_distance: 10.0,
            allowed_room_types: vec![],
            forbidden_room_types: vec![],
            allow_critical_path_connections: true,
            allow_graph_connected_rooms: false,
        };
        let mut occupied: HashSet<Cell> = [Cell::new(0, 0), Cell::new(3, 0)].into_iter().collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let passages = generate_secret_passages(&graph, &placed, &config, &mut occupied, &mut rng);
        assert_eq!(passages.len(), 1);
        assert!(
            (passages[0].room_a_id == 0 && passages[0].room_b_id == 2)
                || (passages[0].room_a_id == 2 && passages[0].room_b_id == 0)
        );
    }
}
