//! `MazeBased` graph algorithm: carve a perfect maze over `room_count`
//! cells with Prim's or Kruskal's algorithm, optionally re-adding a
//! fraction of the uncarved walls for an "imperfect" maze with loops.

use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{square_grid_for, FloorGraph, MazeAlgorithm, MazeBasedConfig, MazeStyle};

pub fn generate(
    room_count: usize,
    branching_factor: f32,
    cfg: &MazeBasedConfig,
    rng: &mut Xoshiro256PlusPlus,
) -> FloorGraph {
    let (w, _h) = square_grid_for(room_count);
    let candidates = grid_adjacency_candidates(room_count, w);

    let (tree_edges, non_tree_edges) = match cfg.algorithm {
        MazeAlgorithm::Prim => carve_prim(room_count, &candidates, rng),
        MazeAlgorithm::Kruskal => carve_kruskal(room_count, &candidates, rng),
    };

    let mut edges = tree_edges;
    if cfg.style == MazeStyle::Imperfect && !non_tree_edges.is_empty() {
        let mut walls = non_tree_edges;
        let extra_count = ((walls.len() as f32) * branching_factor).round() as usize;
        walls.shuffle(rng);
        edges.extend(walls.into_iter().take(extra_count));
    }

    FloorGraph::from_edges(room_count, edges)
}

/// Undirected 4-connected adjacency pairs among cells `0..room_count` laid
/// out row-major on a grid of width `w`.
fn grid_adjacency_candidates(room_count: usize, w: usize) -> Vec<(usize, usize)> {
    let mut candidates = Vec::new();
    for i in 0..room_count {
        let x = i % w;
        let right = i + 1;
        if x + 1 < w && right < room_count {
            candidates.push((i, right));
        }
        let down = i + w;
        if down < room_count {
            candidates.push((i, down));
        }
    }
    candidates
}

fn carve_prim(
    room_count: usize,
    candidates: &[(usize, usize)],
    rng: &mut Xoshiro256PlusPlus,
) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); room_count];
    for &(a, b) in candidates {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    for adj in &mut adjacency {
        adj.sort_unstable();
    }

    let mut visited = vec![false; room_count];
    visited[0] = true;
    let mut frontier: Vec<(usize, usize)> = adjacency[0].iter().map(|&n| (0usize, n)).collect();
    let mut tree_edges = Vec::new();
    let mut used: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();

    while !frontier.is_empty() {
        frontier.shuffle(rng);
        let (from, to) = frontier.pop().unwrap();
        if visited[to] {
            continue;
        }
        visited[to] = true;
        tree_edges.push(ordered(from, to));
        used.insert(ordered(from, to));
        for &next in &adjacency[to] {
            if !visited[next] {
                frontier.push((to, next));
            }
        }
    }

    let non_tree_edges = candidates
        .iter()
        .copied()
        .map(|(a, b)| ordered(a, b))
        .filter(|e| !used.contains(e))
        .collect();

    (tree_edges, non_tree_edges)
}

fn carve_kruskal(
    room_count: usize,
    candidates: &[(usize, usize)],
    rng: &mut Xoshiro256PlusPlus,
) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let mut shuffled: Vec<(usize, usize)> = candidates.to_vec();
    shuffled.shuffle(rng);

    let mut uf = UnionFind::new(room_count);
    let mut tree_edges = Vec::new();
    let mut non_tree_edges = Vec::new();
    for (a, b) in shuffled {
        if uf.union(a, b) {
            tree_edges.push(ordered(a, b));
        } else {
            non_tree_edges.push(ordered(a, b));
        }
    }

    (tree_edges, non_tree_edges)
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn perfect_maze_has_n_minus_one_edges() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let cfg = MazeBasedConfig {
            algorithm: MazeAlgorithm::Prim,
            style: MazeStyle::Perfect,
        };
        let g = generate(16, 0.8, &cfg, &mut rng);
        assert_eq!(g.connections.len(), 15);
        assert!(g.is_connected());
    }

    #[test]
    fn imperfect_maze_adds_loops() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let cfg = MazeBasedConfig {
            algorithm: MazeAlgorithm::Kruskal,
            style: MazeStyle::Imperfect,
        };
        let g = generate(16, 0.8, &cfg, &mut rng);
        assert!(g.connections.len() > 15);
        assert!(g.is_connected());
    }

    #[test]
    fn deterministic_for_same_seed() {
        let cfg = MazeBasedConfig::default();
        let mut a = Xoshiro256PlusPlus::seed_from_u64(9);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(9);
        assert_eq!(generate(10, 0.3, &cfg, &mut a), generate(10, 0.3, &cfg, &mut b));
    }
}
