//! Weighted, zone-aware template selection (§4.4).

use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::GenerationError;
use crate::template::RoomTemplate;

/// Candidate pool is zone templates supporting `room_type` if any exist,
/// otherwise the global template list filtered the same way.
pub fn select_template<'a, T: Eq + std::hash::Hash + Clone + std::fmt::Debug>(
    zone_templates: Option<&'a [RoomTemplate<T>]>,
    global_templates: &'a [RoomTemplate<T>],
    room_type: &T,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<&'a RoomTemplate<T>, GenerationError> {
    if let Some(zone_pool) = zone_templates {
        let filtered: Vec<&RoomTemplate<T>> = zone_pool.iter().filter(|t| t.supports_type(room_type)).collect();
        if !filtered.is_empty() {
            return select_weighted(&filtered, room_type, rng);
        }
    }

    let filtered: Vec<&RoomTemplate<T>> = global_templates.iter().filter(|t| t.supports_type(room_type)).collect();
    select_weighted(&filtered, room_type, rng)
}

/// Cumulative-distribution draw over an already-filtered, stably-ordered pool.
fn select_weighted<'a, T: std::fmt::Debug>(
    pool: &[&'a RoomTemplate<T>],
    room_type: &T,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<&'a RoomTemplate<T>, GenerationError> {
    if pool.is_empty() {
        return Err(GenerationError::invalid(format!(
            "no room template supports room type {room_type:?}"
        )));
    }

    let total_weight: f32 = pool.iter().map(|t| t.weight).sum();
    if total_weight <= 0.0 {
        return Err(GenerationError::invalid(format!(
            "all templates supporting room type {room_type:?} have zero total weight"
        )));
    }

    let draw = rng.gen_range(0.0..total_weight);
    let mut cumulative = 0.0;
    for template in pool {
        cumulative += template.weight;
        if cumulative > draw {
            return Ok(template);
        }
    }
    // Floating-point rounding can leave `draw` just short of `total_weight`
    // without tripping `cumulative > draw` on the last step.
    Ok(pool[pool.len() - 1])
}
