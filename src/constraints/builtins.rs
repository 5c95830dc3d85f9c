//! The built-in constraint catalogue plus `Composite` and `Custom`.

use std::hash::Hash;
use std::sync::Arc;

use super::{CompositeOp, EvalContext};
use crate::graph::{FloorGraph, RoomNode};

/// A constraint targeting room type `T`. Every built-in kind is a pure
/// function of `(node, graph, context)`; `Custom` wraps a caller-supplied
/// pure predicate and `Composite` combines other constraints.
pub enum ConstraintKind<T> {
    MinDistanceFromStart(T, usize),
    MaxDistanceFromStart(T, usize),
    MustBeDeadEnd(T),
    MinConnectionCount(T, usize),
    MaxConnectionCount(T, usize),
    NotOnCriticalPath(T),
    OnlyOnCriticalPath(T),
    MaxPerFloor(T, usize),
    MustBeAdjacentTo(T, Vec<T>),
    MustNotBeAdjacentTo(T, Vec<T>),
    MinDistanceFromRoomType(T, Vec<T>, usize),
    MaxDistanceFromRoomType(T, Vec<T>, usize),
    MustComeBefore(T, Vec<T>),
    OnlyOnFloor(T, usize),
    NotOnFloor(T, usize),
    MinFloor(T, usize),
    MaxFloor(T, usize),
    OnlyInZone(T, String),
    MinDifficulty(T, f32),
    MaxDifficulty(T, f32),
    MustClusterSize(T, usize),
    MinClusterSize(T, usize),
    MaxClusterSize(T, usize),
    Composite(CompositeOp, Vec<ConstraintKind<T>>),
    #[allow(clippy::type_complexity)]
    Custom(
        T,
        Arc<dyn Fn(&RoomNode, &FloorGraph, &EvalContext<T>) -> bool + Send + Sync>,
    ),
}

impl<T: Clone + Eq + Hash> ConstraintKind<T> {
    /// The room type this constraint gates. `And` requires its children to
    /// agree; `Or` uses the first child's type (§9, Design Notes).
    pub fn target_room_type(&self) -> Option<T> {
        match self {
            ConstraintKind::MinDistanceFromStart(t, _)
            | ConstraintKind::MaxDistanceFromStart(t, _)
            | ConstraintKind::MustBeDeadEnd(t)
            | ConstraintKind::MinConnectionCount(t, _)
            | ConstraintKind::MaxConnectionCount(t, _)
            | ConstraintKind::NotOnCriticalPath(t)
            | ConstraintKind::OnlyOnCriticalPath(t)
            | ConstraintKind::MaxPerFloor(t, _)
            | ConstraintKind::MustBeAdjacentTo(t, _)
            | ConstraintKind::MustNotBeAdjacentTo(t, _)
            | ConstraintKind::MinDistanceFromRoomType(t, _, _)
            | ConstraintKind::MaxDistanceFromRoomType(t, _, _)
            | ConstraintKind::MustComeBefore(t, _)
            | ConstraintKind::OnlyOnFloor(t, _)
            | ConstraintKind::NotOnFloor(t, _)
            | ConstraintKind::MinFloor(t, _)
            | ConstraintKind::MaxFloor(t, _)
            | ConstraintKind::OnlyInZone(t, _)
            | ConstraintKind::MinDifficulty(t, _)
            | ConstraintKind::MaxDifficulty(t, _)
            | ConstraintKind::MustClusterSize(t, _)
            | ConstraintKind::MinClusterSize(t, _)
            | ConstraintKind::MaxClusterSize(t, _)
            | ConstraintKind::Custom(t, _) => Some(t.clone()),
            ConstraintKind::Composite(_, children) => children.first().and_then(|c| c.target_room_type()),
        }
    }

    /// `And` requires every child to share one target type. Used by config
    /// validation, not by evaluation itself.
    pub fn composite_targets_agree(&self) -> bool {
        match self {
            ConstraintKind::Composite(CompositeOp::And, children) => {
                let mut types = children.iter().filter_map(|c| c.target_room_type());
                match types.next() {
                    None => true,
                    Some(first) => types.all(|t| t == first),
                }
            }
            ConstraintKind::Composite(_, children) => children.iter().all(|c| c.composite_targets_agree()),
            _ => true,
        }
    }

    pub fn is_valid(&self, node: &RoomNode, graph: &FloorGraph, ctx: &EvalContext<T>) -> bool {
        match self {
            ConstraintKind::MinDistanceFromStart(_, d) => node.distance_from_start >= *d,
            ConstraintKind::MaxDistanceFromStart(_, d) => node.distance_from_start <= *d,
            ConstraintKind::MustBeDeadEnd(_) => node.connection_count == 1,
            ConstraintKind::MinConnectionCount(_, k) => node.connection_count >= *k,
            ConstraintKind::MaxConnectionCount(_, k) => node.connection_count <= *k,
            ConstraintKind::NotOnCriticalPath(_) => !node.on_critical_path,
            ConstraintKind::OnlyOnCriticalPath(_) => node.on_critical_path,
            ConstraintKind::MaxPerFloor(t, m) => {
                let assigned = ctx.partial_assignment.values().filter(|v| *v == t).count();
                assigned < *m
            }
            ConstraintKind::MustBeAdjacentTo(_, targets) => node
                .neighbors
                .iter()
                .any(|n| matches_any(ctx.partial_assignment.get(n), targets)),
            ConstraintKind::MustNotBeAdjacentTo(_, targets) => !node
                .neighbors
                .iter()
                .any(|n| matches_any(ctx.partial_assignment.get(n), targets)),
            ConstraintKind::MinDistanceFromRoomType(_, targets, d) => {
                match nearest_distance(node.id, targets, graph, ctx) {
                    Some(dist) => dist >= *d,
                    None => true,
                }
            }
            ConstraintKind::MaxDistanceFromRoomType(_, targets, d) => {
                match nearest_distance(node.id, targets, graph, ctx) {
                    Some(dist) => dist <= *d,
                    None => true,
                }
            }
            ConstraintKind::MustComeBefore(_, targets) => {
                let Some(candidate_index) = graph.critical_path.iter().position(|&id| id == node.id) else {
                    return true;
                };
                let later_indices: Vec<usize> = graph
                    .critical_path
                    .iter()
                    .enumerate()
                    .filter(|(_, &id)| matches_any(ctx.partial_assignment.get(&id), targets))
                    .map(|(idx, _)| idx)
                    .collect();
                if later_indices.is_empty() {
                    return true;
                }
                later_indices.iter().any(|&idx| candidate_index < idx)
            }
            ConstraintKind::OnlyOnFloor(_, floor) => ctx.floor_index == Some(*floor),
            ConstraintKind::NotOnFloor(_, floor) => ctx.floor_index != Some(*floor),
            ConstraintKind::MinFloor(_, floor) => ctx.floor_index.map(|f| f >= *floor).unwrap_or(true),
            ConstraintKind::MaxFloor(_, floor) => ctx.floor_index.map(|f| f <= *floor).unwrap_or(true),
            ConstraintKind::OnlyInZone(_, zone_id) => ctx
                .zone_assignments
                .and_then(|zones| zones.get(&node.id))
                .map(|z| z == zone_id)
                .unwrap_or(false),
            ConstraintKind::MinDifficulty(_, d) => ctx
                .difficulty
                .and_then(|table| table.get(&node.id))
                .map(|v| v >= d)
                .unwrap_or(true),
            ConstraintKind::MaxDifficulty(_, d) => ctx
                .difficulty
                .and_then(|table| table.get(&node.id))
                .map(|v| v <= d)
                .unwrap_or(true),
            ConstraintKind::MustClusterSize(..)
            | ConstraintKind::MinClusterSize(..)
            | ConstraintKind::MaxClusterSize(..) => true,
            ConstraintKind::Composite(CompositeOp::And, children) => {
                children.iter().all(|c| c.is_valid(node, graph, ctx))
            }
            ConstraintKind::Composite(CompositeOp::Or, children) => {
                children.iter().any(|c| c.is_valid(node, graph, ctx))
            }
            ConstraintKind::Composite(CompositeOp::Not, children) => {
                !children.iter().all(|c| c.is_valid(node, graph, ctx))
            }
            ConstraintKind::Custom(_, predicate) => predicate(node, graph, ctx),
        }
    }
}

fn matches_any<T: Eq>(assigned: Option<&T>, targets: &[T]) -> bool {
    match assigned {
        Some(t) => targets.iter().any(|target| target == t),
        None => false,
    }
}

fn nearest_distance<T: Eq>(
    from: usize,
    targets: &[T],
    graph: &FloorGraph,
    ctx: &EvalContext<T>,
) -> Option<usize> {
    ctx.partial_assignment
        .iter()
        .filter(|(_, t)| targets.iter().any(|target| target == *t))
        .filter_map(|(&id, _)| graph.shortest_path(from, id))
        .map(|path| path.len() - 1)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FloorGraph;
    use std::collections::HashMap;

    fn graph() -> FloorGraph {
        FloorGraph::from_edges(4, vec![(0, 1), (1, 2), (2, 3)])
    }

    #[test]
    fn min_distance_from_start() {
        let g = graph();
        let assignment: HashMap<usize, &str> = HashMap::new();
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::MinDistanceFromStart("Boss", 2);
        assert!(!c.is_valid(g.node(1), &g, &ctx));
        assert!(c.is_valid(g.node(2), &g, &ctx));
    }

    #[test]
    fn must_be_dead_end() {
        let g = graph();
        let assignment: HashMap<usize, &str> = HashMap::new();
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::MustBeDeadEnd("Boss");
        assert!(c.is_valid(g.node(3), &g, &ctx));
        assert!(!c.is_valid(g.node(1), &g, &ctx));
    }

    #[test]
    fn must_be_adjacent_to_checks_partial_assignment() {
        let g = graph();
        let mut assignment: HashMap<usize, &str> = HashMap::new();
        assignment.insert(0, "Shop");
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::MustBeAdjacentTo("Guard", vec!["Shop"]);
        assert!(c.is_valid(g.node(1), &g, &ctx));
        assert!(!c.is_valid(g.node(2), &g, &ctx));
    }

    #[test]
    fn composite_and_short_circuits() {
        let g = graph();
        let assignment: HashMap<usize, &str> = HashMap::new();
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::Composite(
            CompositeOp::And,
            vec![
                ConstraintKind::MinDistanceFromStart("Boss", 1),
                ConstraintKind::MustBeDeadEnd("Boss"),
            ],
        );
        assert!(c.is_valid(g.node(3), &g, &ctx));
        assert!(!c.is_valid(g.node(1), &g, &ctx));
    }

    #[test]
    fn composite_or_allows_mixed_targets() {
        let c: ConstraintKind<&str> = ConstraintKind::Composite(
            CompositeOp::Or,
            vec![
                ConstraintKind::MinDistanceFromStart("Boss", 1),
                ConstraintKind::MustBeDeadEnd("Shop"),
            ],
        );
        assert_eq!(c.target_room_type(), Some("Boss"));
    }

    #[test]
    fn empty_and_is_true_empty_or_is_false() {
        let g = graph();
        let assignment: HashMap<usize, &str> = HashMap::new();
        let ctx = EvalContext::new(&assignment);
        let and_c: ConstraintKind<&str> = ConstraintKind::Composite(CompositeOp::And, vec![]);
        let or_c: ConstraintKind<&str> = ConstraintKind::Composite(CompositeOp::Or, vec![]);
        assert!(and_c.is_valid(g.node(0), &g, &ctx));
        assert!(!or_c.is_valid(g.node(0), &g, &ctx));
    }

    #[test]
    fn must_come_before_permissive_when_target_type_unassigned() {
        let mut g = graph();
        g.set_critical_path(3, vec![0, 1, 2, 3]);
        let assignment: HashMap<usize, &str> = HashMap::new();
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::MustComeBefore("Key", vec!["Lock"]);
        assert!(c.is_valid(g.node(0), &g, &ctx));
    }

    #[test]
    fn must_come_before_permissive_when_not_on_path() {
        let g = FloorGraph::from_edges(5, vec![(0, 1), (1, 2), (1, 4), (2, 3)]);
        let mut g = g;
        g.set_critical_path(3, vec![0, 1, 2, 3]);
        let mut assignment: HashMap<usize, &str> = HashMap::new();
        assignment.insert(3, "Lock");
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::MustComeBefore("Key", vec!["Lock"]);
        // node 4 is not on the critical path.
        assert!(c.is_valid(g.node(4), &g, &ctx));
    }

    #[test]
    fn must_come_before_checks_index() {
        let mut g = graph();
        g.set_critical_path(3, vec![0, 1, 2, 3]);
        let mut assignment: HashMap<usize, &str> = HashMap::new();
        assignment.insert(3, "Lock");
        let ctx = EvalContext::new(&assignment);
        let c = ConstraintKind::MustComeBefore("Key", vec!["Lock"]);
        assert!(c.is_valid(g.node(1), &g, &ctx));
    }
}
