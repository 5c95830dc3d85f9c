//! Room topology: five interchangeable graph algorithms behind one contract,
//! plus the `FloorGraph` value type they all produce.

pub mod cellular_automata;
pub mod grid_based;
pub mod hub_and_spoke;
pub mod maze_based;
pub mod spanning_tree;

use std::collections::VecDeque;

use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// A node in the room graph. Built in two passes: edges first, then derived
/// fields (`distance_from_start`, `connection_count`, `neighbors`) computed
/// once into this immutable table. `on_critical_path` starts `false` and is
/// flipped for path members once the boss is known (§4.3); no other field
/// changes after graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNode {
    pub id: usize,
    pub distance_from_start: usize,
    pub on_critical_path: bool,
    pub connection_count: usize,
    /// Ascending-sorted adjacent node ids.
    pub neighbors: Vec<usize>,
}

/// An undirected graph edge. `a < b` always; `requires_hallway` is filled in
/// by the spatial solver, not by graph generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub requires_hallway: bool,
}

impl Connection {
    pub fn new(a: usize, b: usize) -> Self {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        Self {
            a,
            b,
            requires_hallway: false,
        }
    }

    pub fn other(&self, node: usize) -> Option<usize> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// The room topology: nodes plus undirected connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorGraph {
    pub nodes: Vec<RoomNode>,
    pub connections: Vec<Connection>,
    pub start_node_id: usize,
    pub boss_node_id: Option<usize>,
    pub critical_path: Vec<usize>,
}

impl FloorGraph {
    /// Build a connected graph from a deduplicated, undirected edge list.
    /// Computes `distance_from_start` via BFS from node 0 and
    /// `connection_count`/`neighbors` from the edge list. Iteration during
    /// BFS visits the frontier in ascending node id order, as required for
    /// determinism when multiple equal-length paths exist downstream.
    pub fn from_edges(room_count: usize, mut edges: Vec<(usize, usize)>) -> Self {
        edges.sort_unstable();
        edges.dedup();

        let connections: Vec<Connection> = edges
            .into_iter()
            .map(|(a, b)| Connection::new(a, b))
            .collect();

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); room_count];
        for conn in &connections {
            adjacency[conn.a].push(conn.b);
            adjacency[conn.b].push(conn.a);
        }
        for adj in &mut adjacency {
            adj.sort_unstable();
            adj.dedup();
        }

        let distances = bfs_distances(room_count, &adjacency, 0);

        let nodes = (0..room_count)
            .map(|id| RoomNode {
                id,
                distance_from_start: distances[id],
                on_critical_path: false,
                connection_count: adjacency[id].len(),
                neighbors: adjacency[id].clone(),
            })
            .collect();

        Self {
            nodes,
            connections,
            start_node_id: 0,
            boss_node_id: None,
            critical_path: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.nodes.iter().all(|n| n.id == 0 || n.distance_from_start < usize::MAX)
    }

    pub fn node(&self, id: usize) -> &RoomNode {
        &self.nodes[id]
    }

    /// Shortest path from `start` to `goal` over the graph, using BFS with
    /// a deterministic, ascending-id traversal order among equal-depth
    /// frontier nodes. Returns `None` if unreachable (never happens on a
    /// connected graph).
    pub fn shortest_path(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let mut predecessor: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                break;
            }
            for &next in &self.nodes[current].neighbors {
                if !visited[next] {
                    visited[next] = true;
                    predecessor[next] = Some(current);
                    queue.push_back(next);
                }
            }
        }

        if !visited[goal] {
            return None;
        }

        let mut path = vec![goal];
        let mut current = goal;
        while let Some(prev) = predecessor[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    /// Mutable access to the connection between `a` and `b`, regardless of
    /// which order they're passed in. Panics if no such connection exists.
    pub(crate) fn connection_mut(&mut self, a: usize, b: usize) -> &mut Connection {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.connections
            .iter_mut()
            .find(|c| c.a == lo && c.b == hi)
            .expect("connection must exist between adjacent graph nodes")
    }

    /// Mark the critical path (spawn..boss, inclusive) and record the boss.
    /// Called once, after boss assignment, before the graph is returned.
    pub(crate) fn set_critical_path(&mut self, boss_id: usize, path: Vec<usize>) {
        self.boss_node_id = Some(boss_id);
        for &id in &path {
            self.nodes[id].on_critical_path = true;
        }
        self.critical_path = path;
    }
}

fn bfs_distances(room_count: usize, adjacency: &[Vec<usize>], start: usize) -> Vec<usize> {
    let mut distances = vec![usize::MAX; room_count];
    distances[start] = 0;
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let d = distances[current];
        for &next in &adjacency[current] {
            if distances[next] == usize::MAX {
                distances[next] = d + 1;
                queue.push_back(next);
            }
        }
    }

    distances
}

/// Which 4- or 8-connectivity pattern `GridBased` uses to wire neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityPattern {
    FourConnected,
    EightConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBasedConfig {
    pub grid_w: usize,
    pub grid_h: usize,
    pub connectivity: ConnectivityPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellularAutomataConfig {
    pub iterations: u32,
    pub birth_threshold: u8,
    pub survival_threshold: u8,
    pub initial_fill_probability: f32,
    /// Candidate grid size to seed live cells into before CA iteration.
    pub grid_w: usize,
    pub grid_h: usize,
}

impl Default for CellularAutomataConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            birth_threshold: 5,
            survival_threshold: 4,
            initial_fill_probability: 0.45,
            grid_w: 16,
            grid_h: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeAlgorithm {
    Prim,
    Kruskal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeStyle {
    Perfect,
    Imperfect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeBasedConfig {
    pub algorithm: MazeAlgorithm,
    pub style: MazeStyle,
}

impl Default for MazeBasedConfig {
    fn default() -> Self {
        Self {
            algorithm: MazeAlgorithm::Prim,
            style: MazeStyle::Perfect,
        }
    }
}

/// Smallest `(w, h)` with `w * h >= n` and `w` as close to `h` as possible,
/// used by `MazeBased` and `CellularAutomata` truncation/extension to lay
/// `n` rooms out on a roughly square grid.
pub(crate) fn square_grid_for(n: usize) -> (usize, usize) {
    let w = (n as f64).sqrt().ceil() as usize;
    let w = w.max(1);
    let h = n.div_ceil(w);
    (w, h)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubAndSpokeConfig {
    pub hub_count: usize,
    pub max_spoke_length: usize,
}

impl Default for HubAndSpokeConfig {
    fn default() -> Self {
        Self {
            hub_count: 2,
            max_spoke_length: 4,
        }
    }
}

/// Which topology algorithm to run, with its algorithm-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GraphAlgorithm {
    SpanningTree,
    GridBased(GridBasedConfig),
    CellularAutomata(CellularAutomataConfig),
    MazeBased(MazeBasedConfig),
    HubAndSpoke(HubAndSpokeConfig),
}

impl Default for GraphAlgorithm {
    fn default() -> Self {
        GraphAlgorithm::SpanningTree
    }
}

/// Dispatch to the selected algorithm. `room_count >= 2` and
/// `0.0 <= branching_factor <= 1.0` are preconditions validated by the
/// caller before this is reached.
pub fn generate_graph(
    algorithm: &GraphAlgorithm,
    room_count: usize,
    branching_factor: f32,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<FloorGraph, GenerationError> {
    let graph = match algorithm {
        GraphAlgorithm::SpanningTree => {
            spanning_tree::generate(room_count, branching_factor, rng)
        }
        GraphAlgorithm::GridBased(cfg) => {
            grid_based::generate(room_count, branching_factor, cfg, rng)?
        }
        GraphAlgorithm::CellularAutomata(cfg) => {
            cellular_automata::generate(room_count, branching_factor, cfg, rng)
        }
        GraphAlgorithm::MazeBased(cfg) => maze_based::generate(room_count, branching_factor, cfg, rng),
        GraphAlgorithm::HubAndSpoke(cfg) => {
            hub_and_spoke::generate(room_count, branching_factor, cfg, rng)?
        }
    };

    debug_assert!(graph.is_connected(), "graph algorithm produced a disconnected graph");
    Ok(graph)
}
