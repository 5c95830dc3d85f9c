//! Deterministic seed expansion into five independent RNG streams.
//!
//! Each [`crate::generator::generate`] call expands the master seed into
//! five streams by drawing five 32-bit integers from a seeding RNG, in a
//! fixed order: `graph, type, template, spatial, hallway`. Every pipeline
//! stage consumes exactly one stream and receives it as a parameter — no
//! stage can peek at another stage's RNG state, so reordering stages (or
//! fixing a bug in one) cannot perturb another's output.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// The five independent streams drawn from one master seed, in draw order.
pub struct SeedStreams {
    pub graph: Xoshiro256PlusPlus,
    pub type_assignment: Xoshiro256PlusPlus,
    pub template: Xoshiro256PlusPlus,
    pub spatial: Xoshiro256PlusPlus,
    pub hallway: Xoshiro256PlusPlus,
}

/// Expand `master_seed` into five streams. Pure function: same seed always
/// yields streams that produce the same sequences.
pub fn expand(master_seed: u64) -> SeedStreams {
    let mut seeder = Xoshiro256PlusPlus::seed_from_u64(master_seed);
    let graph_seed = seeder.next_u32();
    let type_seed = seeder.next_u32();
    let template_seed = seeder.next_u32();
    let spatial_seed = seeder.next_u32();
    let hallway_seed = seeder.next_u32();

    SeedStreams {
        graph: Xoshiro256PlusPlus::seed_from_u64(graph_seed as u64),
        type_assignment: Xoshiro256PlusPlus::seed_from_u64(type_seed as u64),
        template: Xoshiro256PlusPlus::seed_from_u64(template_seed as u64),
        spatial: Xoshiro256PlusPlus::seed_from_u64(spatial_seed as u64),
        hallway: Xoshiro256PlusPlus::seed_from_u64(hallway_seed as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_yields_same_draws() {
        let mut a = expand(12345);
        let mut b = expand(12345);
        assert_eq!(a.graph.gen::<u64>(), b.graph.gen::<u64>());
        assert_eq!(a.hallway.gen::<u64>(), b.hallway.gen::<u64>());
    }

    #[test]
    fn streams_are_independent() {
        let streams = expand(7);
        // Drawing from `graph` must not be observable from `type_assignment`.
        let mut graph = streams.graph;
        let mut type_assignment = streams.type_assignment;
        let g: u64 = graph.gen();
        let t: u64 = type_assignment.gen();
        assert_ne!(g, t, "independent streams collided (statistically near-impossible)");
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = expand(1);
        let mut b = expand(2);
        assert_ne!(a.graph.gen::<u64>(), b.graph.gen::<u64>());
    }
}
