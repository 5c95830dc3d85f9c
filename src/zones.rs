//! Zone assignment (§4.8): thematic regions tested in input order before
//! type assignment, first match wins.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintKind;
use crate::graph::FloorGraph;
use crate::template::RoomTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoneBoundary {
    Distance { min: usize, max: usize },
    CriticalPath { start_pct: f32, end_pct: f32 },
}

/// A thematic region with optional per-zone overrides. `constraints` aren't
/// serde-derivable (they may carry `Custom` predicates), so `Zone` itself
/// isn't `Serialize`/`Deserialize` when it carries any.
pub struct Zone<T> {
    pub id: String,
    pub name: String,
    pub boundary: ZoneBoundary,
    pub templates: Option<Vec<RoomTemplate<T>>>,
    pub room_requirements: Vec<(T, usize)>,
    pub constraints: Vec<ConstraintKind<T>>,
}

/// Assign each node to the first zone whose boundary it falls within, in
/// input order. Nodes with no matching zone are absent from the result.
pub fn assign_zones<T>(graph: &FloorGraph, zones: &[Zone<T>]) -> HashMap<usize, String> {
    if zones.is_empty() {
        return HashMap::new();
    }

    let path_len = graph.critical_path.len();
    let path_position: HashMap<usize, usize> = graph
        .critical_path
        .iter()
        .enumerate()
        .map(|(idx, &id)| (id, idx))
        .collect();
    let parents = bfs_parents(graph);

    let mut assignment = HashMap::new();
    for node in &graph.nodes {
        let pct = critical_path_pct(node.id, &path_position, &parents, path_len);
        for zone in zones {
            let matches = match zone.boundary {
                ZoneBoundary::Distance { min, max } => {
                    node.distance_from_start >= min && node.distance_from_start <= max
                }
                ZoneBoundary::CriticalPath { start_pct, end_pct } => match pct {
                    Some(p) => p >= start_pct && p <= end_pct,
                    None => false,
                },
            };
            if matches {
                assignment.insert(node.id, zone.id.clone());
                break;
            }
        }
    }

    assignment
}

/// Fraction along the critical path `[0,1]` for `node_id`: its own index if
/// on the path, otherwise projected via the nearest on-path BFS ancestor
/// (§9, Open Question: resolved in favor of "nearest ancestor" projection).
fn critical_path_pct(
    node_id: usize,
    path_position: &HashMap<usize, usize>,
    parents: &[Option<usize>],
    path_len: usize,
) -> Option<f32> {
    if path_len == 0 {
        return None;
    }
    let denom = (path_len - 1).max(1) as f32;

    if let Some(&idx) = path_position.get(&node_id) {
        return Some(idx as f32 / denom);
    }

    let mut current = node_id;
    while let Some(parent) = parents[current] {
        if let Some(&idx) = path_position.get(&parent) {
            return Some(idx as f32 / denom);
        }
        current = parent;
    }
    None
}

/// BFS parent pointers from node 0, visiting neighbors in ascending id order.
fn bfs_parents(graph: &FloorGraph) -> Vec<Option<usize>> {
    let mut parents = vec![None; graph.nodes.len()];
    let mut visited = vec![false; graph.nodes.len()];
    let mut queue = VecDeque::new();
    visited[graph.start_node_id] = true;
    queue.push_back(graph.start_node_id);

    while let Some(current) = queue.pop_front() {
        for &next in &graph.node(current).neighbors {
            if !visited[next] {
                visited[next] = true;
                parents[next] = Some(current);
                queue.push_back(next);
            }
        }
    }

    parents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, boundary: ZoneBoundary) -> Zone<&'static str> {
        Zone {
            id: id.to_string(),
            name: id.to_string(),
            boundary,
            templates: None,
            room_requirements: Vec::new(),
            constraints: Vec::new(),
        }
    }

    #[test]
    fn distance_based_zone_matches_by_range() {
        let graph = FloorGraph::from_edges(5, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        let zones = vec![zone("near", ZoneBoundary::Distance { min: 0, max: 1 })];
        let assignment = assign_zones(&graph, &zones);
        assert_eq!(assignment.get(&0), Some(&"near".to_string()));
        assert_eq!(assignment.get(&1), Some(&"near".to_string()));
        assert_eq!(assignment.get(&2), None);
    }

    #[test]
    fn first_matching_zone_wins() {
        let graph = FloorGraph::from_edges(3, vec![(0, 1), (1, 2)]);
        let zones = vec![
            zone("wide", ZoneBoundary::Distance { min: 0, max: 2 }),
            zone("narrow", ZoneBoundary::Distance { min: 0, max: 0 }),
        ];
        let assignment = assign_zones(&graph, &zones);
        assert_eq!(assignment.get(&0), Some(&"wide".to_string()));
    }

    #[test]
    fn critical_path_zone_uses_fractional_position() {
        let mut graph = FloorGraph::from_edges(5, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        graph.set_critical_path(4, vec![0, 1, 2, 3, 4]);
        let zones = vec![zone(
            "late",
            ZoneBoundary::CriticalPath {
                start_pct: 0.5,
                end_pct: 1.0,
            },
        )];
        let assignment = assign_zones(&graph, &zones);
        assert_eq!(assignment.get(&2), Some(&"late".to_string()));
        assert_eq!(assignment.get(&1), None);
    }

    #[test]
    fn off_path_node_projects_via_nearest_ancestor() {
        let mut graph = FloorGraph::from_edges(5, vec![(0, 1), (1, 2), (2, 3), (1, 4)]);
        graph.set_critical_path(3, vec![0, 1, 2, 3]);
        let zones = vec![zone(
            "mid",
            ZoneBoundary::CriticalPath {
                start_pct: 0.3,
                end_pct: 0.4,
            },
        )];
        let assignment = assign_zones(&graph, &zones);
        // Node 4's nearest on-path ancestor is node 1 (index 1 of 3 -> 0.333).
        assert_eq!(assignment.get(&4), Some(&"mid".to_string()));
    }
}
