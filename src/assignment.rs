//! Room-type assignment: spawn, boss, critical path, required types, default
//! fill, in that fixed priority order (§4.3). Each step sees the partial
//! assignment built by the previous ones.

use std::collections::HashMap;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::constraints::{ConstraintKind, EvalContext};
use crate::error::GenerationError;
use crate::graph::FloorGraph;
use crate::zones::{assign_zones, Zone};

/// Everything [`assign_room_types`] needs beyond the graph and RNG stream.
pub struct AssignmentInput<'a, T> {
    pub spawn_room_type: T,
    pub boss_room_type: T,
    pub default_room_type: T,
    pub room_requirements: &'a [(T, usize)],
    pub constraints: &'a [ConstraintKind<T>],
    pub floor_index: Option<usize>,
    /// Evaluated right after the critical path is known (see
    /// [`assign_room_types`] doc comment for why zones can't be computed
    /// any earlier), then visible to `OnlyInZone` constraints for the
    /// rest of assignment.
    pub zones: &'a [Zone<T>],
}

/// Run the full spawn/boss/critical-path/required/default pipeline and
/// return the node id → room type map plus the zone assignment computed
/// along the way. Also marks the graph's critical path as a side effect.
///
/// §4.8 says zones are assigned "before type assignment", but a
/// critical-path zone boundary needs the critical path, which isn't known
/// until the boss is picked (step 2 of this very pipeline) — the spec's own
/// data-flow diagram is circular here. This resolves it by computing zones
/// immediately after critical-path marking (between steps 3 and 4), so
/// `OnlyInZone` is meaningful for required-type and default-fill candidates
/// but not for the boss. This is a project decision, not spec text (see
/// DESIGN.md).
pub fn assign_room_types<T: Clone + Eq + Hash + std::fmt::Debug>(
    graph: &mut FloorGraph,
    input: &AssignmentInput<T>,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<(HashMap<usize, T>, HashMap<usize, String>), GenerationError> {
    let mut assignment: HashMap<usize, T> = HashMap::new();
    assignment.insert(graph.start_node_id, input.spawn_room_type.clone());

    let boss_id = select_boss(graph, input, &assignment, None)?;
    assignment.insert(boss_id, input.boss_room_type.clone());

    let path = graph
        .shortest_path(graph.start_node_id, boss_id)
        .expect("graph is connected");
    graph.set_critical_path(boss_id, path);

    let zone_assignments = assign_zones(graph, input.zones);

    for (room_type, count) in input.room_requirements {
        assign_required_type(graph, input, &mut assignment, room_type, *count, &zone_assignments, rng)?;
    }

    for node in &graph.nodes {
        assignment
            .entry(node.id)
            .or_insert_with(|| input.default_room_type.clone());
    }

    Ok((assignment, zone_assignments))
}

fn select_boss<T: Clone + Eq + Hash + std::fmt::Debug>(
    graph: &FloorGraph,
    input: &AssignmentInput<T>,
    assignment: &HashMap<usize, T>,
    zone_assignments: Option<&HashMap<usize, String>>,
) -> Result<usize, GenerationError> {
    let boss_constraints: Vec<&ConstraintKind<T>> = input
        .constraints
        .iter()
        .filter(|c| c.target_room_type().as_ref() == Some(&input.boss_room_type))
        .collect();

    let ctx = eval_context(input, assignment, zone_assignments);

    // The critical path isn't marked yet (it's derived from the boss we're
    // about to pick), but the boss is always its endpoint by definition —
    // so `OnlyOnCriticalPath`/`NotOnCriticalPath` are evaluated against a
    // probe node with that field forced to `true` rather than the graph's
    // not-yet-updated value.
    let candidate = graph
        .nodes
        .iter()
        .filter(|n| n.id != graph.start_node_id)
        .filter(|n| {
            let mut probe = (*n).clone();
            probe.on_critical_path = true;
            boss_constraints.iter().all(|c| c.is_valid(&probe, graph, &ctx))
        })
        .max_by(|a, b| {
            a.distance_from_start
                .cmp(&b.distance_from_start)
                .then(b.id.cmp(&a.id))
        });

    candidate.map(|n| n.id).ok_or_else(|| GenerationError::ConstraintViolation {
        room_type: type_name(&input.boss_room_type),
        required: 1,
        satisfied: 0,
    })
}

#[allow(clippy::too_many_arguments)]
fn assign_required_type<T: Clone + Eq + Hash + std::fmt::Debug>(
    graph: &FloorGraph,
    input: &AssignmentInput<T>,
    assignment: &mut HashMap<usize, T>,
    room_type: &T,
    count: usize,
    zone_assignments: &HashMap<usize, String>,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<(), GenerationError> {
    let type_constraints: Vec<&ConstraintKind<T>> = input
        .constraints
        .iter()
        .filter(|c| c.target_room_type().as_ref() == Some(room_type))
        .collect();

    let ctx = eval_context(input, assignment, Some(zone_assignments));

    let mut candidates: Vec<usize> = graph
        .nodes
        .iter()
        .filter(|n| !assignment.contains_key(&n.id))
        .filter(|n| type_constraints.iter().all(|c| c.is_valid(n, graph, &ctx)))
        .map(|n| n.id)
        .collect();

    if candidates.len() < count {
        return Err(GenerationError::ConstraintViolation {
            room_type: type_name(room_type),
            required: count,
            satisfied: candidates.len(),
        });
    }

    candidates.shuffle(rng);
    for &id in candidates.iter().take(count) {
        assignment.insert(id, room_type.clone());
    }

    Ok(())
}

fn eval_context<'a, T>(
    input: &'a AssignmentInput<T>,
    assignment: &'a HashMap<usize, T>,
    zone_assignments: Option<&'a HashMap<usize, String>>,
) -> EvalContext<'a, T> {
    let mut ctx = EvalContext::new(assignment);
    ctx.floor_index = input.floor_index;
    ctx.zone_assignments = zone_assignments;
    ctx
}

fn type_name<T: std::fmt::Debug>(t: &T) -> String {
    format!("{t:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn line_graph() -> FloorGraph {
        FloorGraph::from_edges(5, vec![(0, 1), (1, 2), (2, 3), (3, 4)])
    }

    fn input<'a>(
        requirements: &'a [(&'static str, usize)],
        constraints: &'a [ConstraintKind<&'static str>],
    ) -> AssignmentInput<'a, &'static str> {
        AssignmentInput {
            spawn_room_type: "Spawn",
            boss_room_type: "Boss",
            default_room_type: "Combat",
            room_requirements: requirements,
            constraints,
            floor_index: None,
            zones: &[],
        }
    }

    #[test]
    fn boss_is_farthest_node() {
        let mut g = line_graph();
        let req = [];
        let cons = [];
        let inp = input(&req, &cons);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let (assignment, _) = assign_room_types(&mut g, &inp, &mut rng).unwrap();
        assert_eq!(assignment.get(&4), Some(&"Boss"));
        assert_eq!(g.boss_node_id, Some(4));
        assert_eq!(g.critical_path, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn boss_respects_constraints() {
        let mut g = line_graph();
        let req = [];
        let cons = [ConstraintKind::MaxDistanceFromStart("Boss", 2)];
        let inp = input(&req, &cons);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let (assignment, _) = assign_room_types(&mut g, &inp, &mut rng).unwrap();
        assert_eq!(assignment.get(&2), Some(&"Boss"));
    }

    #[test]
    fn boss_on_critical_path_constraint_is_satisfiable() {
        // Boss selection runs before the critical path is marked, but the
        // boss is always that path's endpoint by definition once chosen —
        // `OnlyOnCriticalPath(Boss)` must still be satisfiable.
        let mut g = FloorGraph::from_edges(3, vec![(0, 1), (1, 2)]);
        let req = [];
        let cons = [
            ConstraintKind::MustBeDeadEnd("Boss"),
            ConstraintKind::OnlyOnCriticalPath("Boss"),
        ];
        let inp = input(&req, &cons);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let (assignment, _) = assign_room_types(&mut g, &inp, &mut rng).unwrap();
        assert_eq!(assignment.get(&2), Some(&"Boss"));
        assert_eq!(g.critical_path, vec![0, 1, 2]);
    }

    #[test]
    fn boss_constraint_unsatisfiable_is_constraint_violation() {
        let mut g = FloorGraph::from_edges(2, vec![(0, 1)]);
        let req = [];
        let cons = [ConstraintKind::MinDistanceFromStart("Boss", 99)];
        let inp = input(&req, &cons);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(assign_room_types(&mut g, &inp, &mut rng).is_err());
    }

    #[test]
    fn required_type_shortfall_fails() {
        let mut g = line_graph();
        let req = [("Shop", 10)];
        let cons = [];
        let inp = input(&req, &cons);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let err = assign_room_types(&mut g, &inp, &mut rng).unwrap_err();
        match err {
            GenerationError::ConstraintViolation { required, .. } => assert_eq!(required, 10),
            _ => panic!("expected ConstraintViolation"),
        }
    }

    #[test]
    fn remaining_nodes_get_default_type() {
        let mut g = line_graph();
        let req = [];
        let cons = [];
        let inp = input(&req, &cons);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let (assignment, _) = assign_room_types(&mut g, &inp, &mut rng).unwrap();
        assert_eq!(assignment.get(&1), Some(&"Combat"));
        assert_eq!(assignment.get(&2), Some(&"Combat"));
    }

    #[test]
    fn deterministic_for_same_seed() {
        let req = [("Shop", 2)];
        let cons = [];
        let inp = input(&req, &cons);

        let mut g1 = FloorGraph::from_edges(8, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)]);
        let mut g2 = g1.clone();
        let mut rng1 = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut rng2 = Xoshiro256PlusPlus::seed_from_u64(42);
        let (a1, _) = assign_room_types(&mut g1, &inp, &mut rng1).unwrap();
        let (a2, _) = assign_room_types(&mut g2, &inp, &mut rng2).unwrap();
        let mut v1: Vec<_> = a1.into_iter().collect();
        let mut v2: Vec<_> = a2.into_iter().collect();
        v1.sort();
        v2.sort();
        assert_eq!(v1, v2);
    }
}
