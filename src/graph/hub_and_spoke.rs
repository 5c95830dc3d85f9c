//! `HubAndSpoke` graph algorithm: a pairwise-connected core of hubs with
//! spokes of bounded random length growing off each hub until the graph
//! reaches `room_count` nodes.

use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{FloorGraph, HubAndSpokeConfig};
use crate::error::GenerationError;

pub fn generate(
    room_count: usize,
    _branching_factor: f32,
    cfg: &HubAndSpokeConfig,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<FloorGraph, GenerationError> {
    if cfg.hub_count == 0 {
        return Err(GenerationError::invalid("HubAndSpoke requires hub_count >= 1"));
    }
    if cfg.hub_count > room_count {
        return Err(GenerationError::invalid(format!(
            "HubAndSpoke hub_count ({}) exceeds room_count ({})",
            cfg.hub_count, room_count
        )));
    }
    if cfg.max_spoke_length == 0 {
        return Err(GenerationError::invalid("HubAndSpoke requires max_spoke_length >= 1"));
    }

    let mut edges = Vec::new();
    for i in 0..cfg.hub_count {
        for j in (i + 1)..cfg.hub_count {
            edges.push((i, j));
        }
    }

    let mut next_id = cfg.hub_count;
    while next_id < room_count {
        let hub = rng.gen_range(0..cfg.hub_count);
        let remaining = room_count - next_id;
        let spoke_len = rng.gen_range(1..=cfg.max_spoke_length).min(remaining);
        let mut prev = hub;
        for _ in 0..spoke_len {
            let node = next_id;
            edges.push(ordered(prev, node));
            prev = node;
            next_id += 1;
        }
    }

    Ok(FloorGraph::from_edges(room_count, edges))
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
    fn hubs_are_pairwise_connected() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let cfg = HubAndSpokeConfig {
            hub_count: 3,
            max_spoke_length: 2,
        };
        let g = generate(10, 0.0, &cfg, &mut rng).unwrap();
        for i in 0..3 {
            for j in (i + 1)..3 {
                assert!(g.connections.contains(&super::super::Connection::new(i, j)));
            }
        }
        assert!(g.is_connected());
    }

    #[test]
    fn rejects_too_many_hubs() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let cfg = HubAndSpokeConfig {
            hub_count: 20,
            max_spoke_length: 2,
        };
        assert!(generate(5, 0.0, &cfg, &mut rng).is_err());
    }

    #[test]
    fn deterministic_for_same_seed() {
        let cfg = HubAndSpokeConfig::default();
        let mut a = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(3);
        assert_eq!(
            generate(15, 0.2, &cfg, &mut a).unwrap(),
            generate(15, 0.2, &cfg, &mut b).unwrap()
        );
    }
}
