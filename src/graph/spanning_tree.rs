//! Default graph algorithm: random spanning tree plus extra edges.
//!
//! §4.2: for each `i = 1..n`, pick a uniformly random already-connected
//! parent and add `(parent, i)`. Then draw `k in [0, floor(n*branching)]`
//! and attempt `k` extra edges between uniformly chosen distinct nodes.

use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::FloorGraph;

pub fn generate(room_count: usize, branching_factor: f32, rng: &mut Xoshiro256PlusPlus) -> FloorGraph {
    let mut edges: Vec<(usize, usize)> = Vec::with_capacity(room_count);

    for i in 1..room_count {
        let parent = rng.gen_range(0..i);
        edges.push((parent, i));
    }

    let max_extra = (room_count as f32 * branching_factor).floor() as usize;
    if max_extra > 0 {
        let extra_count = rng.gen_range(0..=max_extra);
        let mut existing: std::collections::HashSet<(usize, usize)> =
            edges.iter().map(|&(a, b)| ordered(a, b)).collect();

        let mut attempts_remaining = extra_count;
        // Bound total attempts so a saturated small graph can't spin forever.
        let mut guard = extra_count * 20 + 20;
        while attempts_remaining > 0 && guard > 0 {
            guard -= 1;
            let a = rng.gen_range(0..room_count);
            let b = rng.gen_range(0..room_count);
            if a == b {
                continue;
            }
            let key = ordered(a, b);
            if existing.insert(key) {
                edges.push(key);
                attempts_remaining -= 1;
            }
        }
    }

    FloorGraph::from_edges(room_count, edges)
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_branching_is_a_pure_tree() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let g = generate(10, 0.0, &mut rng);
        assert_eq!(g.connections.len(), 9);
        assert!(g.is_connected());
    }

    #[test]
    fn two_rooms_single_edge() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let g = generate(2, 0.3, &mut rng);
        assert_eq!(g.connections.len(), 1);
        assert_eq!(g.connections[0], super::super::Connection::new(0, 1));
    }

    #[test]
    fn deterministic_for_same_seed() {
        let mut rng_a = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut rng_b = Xoshiro256PlusPlus::seed_from_u64(42);
        let a = generate(20, 0.4, &mut rng_a);
        let b = generate(20, 0.4, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn always_connected() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(99);
        for n in [2, 3, 5, 10, 25] {
            let g = generate(n, 0.5, &mut rng);
            assert!(g.is_connected(), "n={n} produced disconnected graph");
        }
    }
}
