//! `GridBased` graph algorithm: rooms laid on a grid, neighbors wired by
//! adjacency, reduced to a spanning subset, then given extra edges.
//!
//! §4.2: room `i` occupies grid cell `(i mod grid_w, i / grid_w)`. Edges
//! connect 4- or 8-connected occupied neighbors. Excess edges are removed
//! down to a minimum connected (spanning) subset, then extras are added
//! back per `branching_factor`.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{ConnectivityPattern, FloorGraph, GridBasedConfig};
use crate::error::GenerationError;

pub fn generate(
    room_count: usize,
    branching_factor: f32,
    cfg: &GridBasedConfig,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<FloorGraph, GenerationError> {
    if cfg.grid_w * cfg.grid_h < room_count {
        return Err(GenerationError::invalid(format!(
            "GridBased requires grid_w * grid_h >= room_count, got {}x{} for {} rooms",
            cfg.grid_w, cfg.grid_h, room_count
        )));
    }
    if cfg.grid_w == 0 || cfg.grid_h == 0 {
        return Err(GenerationError::invalid("GridBased grid dimensions must be non-zero"));
    }

    let position_of = |i: usize| -> (usize, usize) { (i % cfg.grid_w, i / cfg.grid_w) };

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for i in 0..room_count {
        let (x, y) = position_of(i);
        for (dx, dy) in neighbor_offsets(cfg.connectivity) {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let j = ny * cfg.grid_w + nx;
            if nx < cfg.grid_w && ny < cfg.grid_h && j < room_count && j > i {
                candidates.push((i, j));
            }
        }
    }
    candidates.sort_unstable();
    candidates.dedup();
    candidates.shuffle(rng);

    let mut uf = UnionFind::new(room_count);
    let mut tree_edges = Vec::new();
    let mut non_tree_edges = Vec::new();
    for &(a, b) in &candidates {
        if uf.union(a, b) {
            tree_edges.push((a, b));
        } else {
            non_tree_edges.push((a, b));
        }
    }

    let max_extra = (room_count as f32 * branching_factor).floor() as usize;
    let extra_count = if max_extra > 0 {
        rng.gen_range(0..=max_extra).min(non_tree_edges.len())
    } else {
        0
    };
    non_tree_edges.shuffle(rng);
    tree_edges.extend(non_tree_edges.into_iter().take(extra_count));

    Ok(FloorGraph::from_edges(room_count, tree_edges))
}

fn neighbor_offsets(pattern: ConnectivityPattern) -> Vec<(isize, isize)> {
    match pattern {
        ConnectivityPattern::FourConnected => vec![(1, 0), (0, 1), (-1, 0), (0, -1)],
        ConnectivityPattern::EightConnected => vec![
            (1, 0),
            (0, 1),
            (-1, 0),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ],
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

    /// Returns `true` if the union merged two previously separate sets.
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
