//! A* hallway routing between rooms whose graph edge was flagged
//! `requires_hallway` by the spatial solver (§4.6).

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Edge};
use crate::error::GenerationError;
use crate::graph::FloorGraph;
use crate::spatial::{Door, PlacedRoom};

/// One axis-aligned run of a hallway: `start.x == end.x` or `start.y == end.y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallwaySegment {
    pub start: Cell,
    pub end: Cell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hallway {
    pub id: usize,
    pub segments: Vec<HallwaySegment>,
    pub door_a: Door,
    pub door_b: Door,
}

/// Route a hallway for every graph connection flagged `requires_hallway`,
/// extending `occupied` as each one is carved so later hallways can't cross
/// it. Returns the hallways and the doors carved into each room's wall.
pub fn route_hallways<T: Eq + Hash + Clone>(
    graph: &FloorGraph,
    placed: &HashMap<usize, PlacedRoom<T>>,
    occupied: &mut HashSet<Cell>,
) -> Result<(Vec<Hallway>, Vec<Door>), GenerationError> {
    let mut hallways = Vec::new();
    let mut doors = Vec::new();
    let mut next_id = 0;

    for conn in &graph.connections {
        if !conn.requires_hallway {
            continue;
        }

        let room_a = &placed[&conn.a];
        let room_b = &placed[&conn.b];
        let (door_a, door_b) = choose_door_pair(room_a, room_b).ok_or_else(|| {
            GenerationError::spatial_connection(
                format!("no door edge available on room {} or {}", conn.a, conn.b),
                conn.a,
                conn.b,
            )
        })?;

        let start = door_a.0.neighbor(door_a.1);
        let goal = door_b.0.neighbor(door_b.1);

        let path = astar(start, goal, occupied).ok_or_else(|| {
            GenerationError::spatial_connection(
                format!("no hallway route found between rooms {} and {}", conn.a, conn.b),
                conn.a,
                conn.b,
            )
        })?;

        let segments = collapse_path(&path);
        occupied.extend(path.iter().copied());

        let hallway_id = next_id;
        next_id += 1;

        let door_a_record = Door {
            position: door_a.0,
            edge: door_a.1,
            connects_to_room_id: None,
            connects_to_hallway_id: Some(hallway_id),
        };
        let door_b_record = Door {
            position: door_b.0,
            edge: door_b.1,
            connects_to_room_id: None,
            connects_to_hallway_id: Some(hallway_id),
        };
        doors.push(door_a_record.clone());
        doors.push(door_b_record.clone());

        hallways.push(Hallway {
            id: hallway_id,
            segments,
            door_a: door_a_record,
            door_b: door_b_record,
        });
    }

    Ok((hallways, doors))
}

/// All `(world_cell, edge)` door candidates of a placed room, in a stable
/// (cell, edge-bits) order.
fn candidate_doors<T>(room: &PlacedRoom<T>) -> Vec<(Cell, Edge)> {
    let mut out = Vec::new();
    for (&local_cell, edges) in &room.template.door_edges {
        let world_cell = local_cell + room.position;
        for dir in edges.iter() {
            out.push((world_cell, dir));
        }
    }
    out.sort_by_key(|(cell, edge)| (*cell, edge.bits()));
    out
}

/// Pick the door pair minimizing Manhattan distance between candidate door
/// cells, tiebroken by lexicographic `(door_a, door_b)` order.
pub(crate) fn choose_door_pair<T>(
    room_a: &PlacedRoom<T>,
    room_b: &PlacedRoom<T>,
) -> Option<((Cell, Edge), (Cell, Edge))> {
    let doors_a = candidate_doors(room_a);
    let doors_b = candidate_doors(room_b);
    if doors_a.is_empty() || doors_b.is_empty() {
        return None;
    }

    let key = |door_a: (Cell, Edge), door_b: (Cell, Edge)| {
        (door_a.0, door_a.1.bits(), door_b.0, door_b.1.bits())
    };

    let mut best: Option<((Cell, Edge), (Cell, Edge), i64)> = None;
    for &da in &doors_a {
        for &db in &doors_b {
            let dist = da.0.manhattan_distance(&db.0);
            let better = match &best {
                None => true,
                Some((ba, bb, bdist)) => dist < *bdist || (dist == *bdist && key(da, db) < key(*ba, *bb)),
            };
            if better {
                best = Some((da, db, dist));
            }
        }
    }

    best.map(|(a, b, _)| (a, b))
}

#[derive(Eq, PartialEq)]
struct HeapEntry {
    f_score: i64,
    g_score: i64,
    cell: Cell,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap via BinaryHeap (a max-heap): reverse the natural order,
        // then break ties by lower g-score, then lexicographic cell order.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A* on the 4-connected grid, Manhattan heuristic. `occupied` cells are
/// blocked except `start` and `goal` themselves.
pub(crate) fn astar(start: Cell, goal: Cell, occupied: &HashSet<Cell>) -> Option<Vec<Cell>> {
    let mut open = BinaryHeap::new();
    let mut g_scores: HashMap<Cell, i64> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut closed: HashSet<Cell> = HashSet::new();

    g_scores.insert(start, 0);
    open.push(HeapEntry {
        f_score: start.manhattan_distance(&goal),
        g_score: 0,
        cell: start,
    });

    while let Some(HeapEntry { cell, g_score, .. }) = open.pop() {
        if closed.contains(&cell) {
            continue;
        }
        if cell == goal {
            return Some(reconstruct(&came_from, goal));
        }
        closed.insert(cell);

        for next in cell.cardinal_neighbors() {
            if next != goal && occupied.contains(&next) {
                continue;
            }
            if closed.contains(&next) {
                continue;
            }
            let tentative_g = g_score + 1;
            let better = match g_scores.get(&next) {
                Some(&existing) => tentative_g < existing,
                None => true,
            };
            if better {
                g_scores.insert(next, tentative_g);
                came_from.insert(next, cell);
                open.push(HeapEntry {
                    f_score: tentative_g + next.manhattan_distance(&goal),
                    g_score: tentative_g,
                    cell: next,
                });
            }
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Collapse a cell path into axis-aligned runs, splitting at each direction
/// change. Every segment spans at least one cell.
pub(crate) fn collapse_path(path: &[Cell]) -> Vec<HallwaySegment> {
    if path.len() == 1 {
        return vec![HallwaySegment {
            start: path[0],
            end: path[0],
        }];
    }

    let mut segments = Vec::new();
    let mut seg_start = path[0];
    let mut dir = (path[1].x - path[0].x, path[1].y - path[0].y);

    for i in 1..path.len() - 1 {
        let next_dir = (path[i + 1].x - path[i].x, path[i + 1].y - path[i].y);
        if next_dir != dir {
            segments.push(HallwaySegment {
                start: seg_start,
                end: path[i],
            });
            seg_start = path[i];
            dir = next_dir;
        }
    }
    segments.push(HallwaySegment {
        start: seg_start,
        end: *path.last().unwrap(),
    });
    segments
}
