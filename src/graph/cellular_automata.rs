//! `CellularAutomata` graph algorithm: grow an organic cave-like topology
//! from a random seed grid, then guarantee connectivity with a spanning
//! overlay and truncate/extend to hit the requested room count.
//!
//! §4.2: seed a grid of candidate positions with random live cells; apply
//! `iterations` rounds of birth/survival rules (Moore neighborhood);
//! surviving cells become nodes, orthogonally-adjacent survivors become
//! edges; a spanning-tree overlay enforces connectivity; the result is
//! truncated or extended to exactly `room_count` nodes.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{CellularAutomataConfig, FloorGraph};

pub fn generate(
    room_count: usize,
    branching_factor: f32,
    cfg: &CellularAutomataConfig,
    rng: &mut Xoshiro256PlusPlus,
) -> FloorGraph {
    let (w, h) = (cfg.grid_w.max(1), cfg.grid_h.max(1));
    let mut grid = vec![vec![false; w]; h];
    for row in grid.iter_mut() {
        for cell in row.iter_mut() {
            *cell = rng.gen::<f32>() < cfg.initial_fill_probability;
        }
    }

    for _ in 0..cfg.iterations {
        let mut next = grid.clone();
        for y in 0..h {
            for x in 0..w {
                let alive_neighbors = moore_neighbor_count(&grid, x, y, w, h);
                next[y][x] = if grid[y][x] {
                    alive_neighbors >= cfg.survival_threshold
                } else {
                    alive_neighbors >= cfg.birth_threshold
                };
            }
        }
        grid = next;
    }

    // Row-major order gives a fixed, deterministic enumeration of survivors.
    let mut positions: Vec<(usize, usize)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if grid[y][x] {
                positions.push((x, y));
            }
        }
    }

    if positions.len() > room_count {
        positions.truncate(room_count);
    } else {
        // Extend with any not-yet-used grid cell, in row-major order; if the
        // grid itself is smaller than room_count, append disconnected
        // placeholder coordinates past the grid's right edge — the spanning
        // overlay below still wires them into one graph.
        let mut used: std::collections::HashSet<(usize, usize)> = positions.iter().copied().collect();
        'extend: for y in 0..h {
            for x in 0..w {
                if positions.len() >= room_count {
                    break 'extend;
                }
                if used.insert((x, y)) {
                    positions.push((x, y));
                }
            }
        }
        let mut filler = w;
        while positions.len() < room_count {
            positions.push((filler, h));
            filler += 1;
        }
    }

    let index_of: std::collections::HashMap<(usize, usize), usize> = positions
        .iter()
        .enumerate()
        .map(|(idx, &pos)| (pos, idx))
        .collect();

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for (&(x, y), &i) in &index_of {
        for (dx, dy) in [(1i32, 0i32), (0, 1)] {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            if let Some(&j) = index_of.get(&(nx as usize, ny as usize)) {
                candidates.push(if i < j { (i, j) } else { (j, i) });
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

    // Spanning-tree overlay: connect any remaining components by joining
    // each component's representative to the previous one, in ascending
    // representative-id order.
    let mut representatives: Vec<usize> = (0..room_count)
        .map(|i| uf.find(i))
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();
    representatives.sort_unstable();
    for pair in representatives.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if uf.union(a, b) {
            tree_edges.push((a.min(b), a.max(b)));
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

    FloorGraph::from_edges(room_count, tree_edges)
}

fn moore_neighbor_count(grid: &[Vec<bool>], x: usize, y: usize, w: usize, h: usize) -> u8 {
    let mut count = 0u8;
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                continue;
            }
            if grid[ny as usize][nx as usize] {
                count += 1;
            }
        }
    }
    count
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
    fn always_connected_and_right_size() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let cfg = CellularAutomataConfig::default();
        let g = generate(12, 0.2, &cfg, &mut rng);
        assert_eq!(g.nodes.len(), 12);
        assert!(g.is_connected());
    }

    #[test]
    fn deterministic_for_same_seed() {
        let cfg = CellularAutomataConfig::default();
        let mut a = Xoshiro256PlusPlus::seed_from_u64(11);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(11);
        let ga = generate(20, 0.3, &cfg, &mut a);
        let gb = generate(20, 0.3, &cfg, &mut b);
        assert_eq!(ga, gb);
    }

    #[test]
    fn handles_room_count_larger_than_grid() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let cfg = CellularAutomataConfig {
            grid_w: 3,
            grid_h: 3,
            ..CellularAutomataConfig::default()
        };
        let g = generate(15, 0.1, &cfg, &mut rng);
        assert_eq!(g.nodes.len(), 15);
        assert!(g.is_connected());
    }
}
