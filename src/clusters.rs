//! Spatial cluster detection (§4.8): maximal-clique grouping of same-type
//! rooms whose centroids are mutually within `epsilon`.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CLUSTER_EPSILON, DEFAULT_MIN_CLUSTER_SIZE};
use crate::spatial::PlacedRoom;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig<T> {
    pub epsilon: f32,
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
    /// Room types to cluster; empty means every type.
    pub room_types: Vec<T>,
}

impl<T> Default for ClusterConfig<T> {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_CLUSTER_EPSILON,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            max_cluster_size: usize::MAX,
            room_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster<T> {
    pub cluster_id: usize,
    pub room_type: T,
    pub member_room_ids: Vec<usize>,
    pub centroid: (f32, f32),
    pub bounding_box: (f32, f32, f32, f32),
}

/// Detect clusters per room type, each a maximal clique in the
/// epsilon-threshold graph over rooms of that type. Iteration and clique
/// admission both proceed in ascending node id order for determinism.
pub fn detect_clusters<T: Clone + Eq + Hash>(
    placed: &HashMap<usize, PlacedRoom<T>>,
    config: &ClusterConfig<T>,
) -> Vec<Cluster<T>> {
    let mut by_type: HashMap<&T, Vec<usize>> = HashMap::new();
    for room in placed.values() {
        if !config.room_types.is_empty() && !config.room_types.contains(&room.room_type) {
            continue;
        }
        by_type.entry(&room.room_type).or_default().push(room.node_id);
    }

    let centroids: HashMap<usize, (f32, f32)> = placed.iter().map(|(&id, room)| (id, centroid(room))).collect();

    let mut clusters = Vec::new();
    let mut next_id = 0;

    let mut types: Vec<&T> = by_type.keys().copied().collect();
    types.sort_by_key(|t| by_type[t].iter().min().copied().unwrap_or(usize::MAX));

    for room_type in types {
        let mut ids = by_type[room_type].clone();
        ids.sort_unstable();

        let mut used: HashSet<usize> = HashSet::new();
        for &seed in &ids {
            if used.contains(&seed) {
                continue;
            }
            let mut members = vec![seed];
            for &candidate in &ids {
                if candidate == seed || used.contains(&candidate) || members.contains(&candidate) {
                    continue;
                }
                let fits_all = members
                    .iter()
                    .all(|&m| distance(centroids[&m], centroids[&candidate]) <= config.epsilon);
                if fits_all {
                    members.push(candidate);
                }
            }

            used.insert(seed);
            if members.len() < config.min_cluster_size || members.len() > config.max_cluster_size {
                continue;
            }
            for &m in &members {
                used.insert(m);
            }

            let member_centroid = mean_centroid(&members, &centroids);
            let bounding_box = bounding_box(&members, placed);
            clusters.push(Cluster {
                cluster_id: next_id,
                room_type: room_type.clone(),
                member_room_ids: members,
                centroid: member_centroid,
                bounding_box,
            });
            next_id += 1;
        }
    }

    clusters
}

fn centroid<T: Eq + Hash + Clone>(room: &PlacedRoom<T>) -> (f32, f32) {
    let cells = room.world_cells();
    let n = cells.len() as f32;
    let (sx, sy) = cells
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x as f32, sy + c.y as f32));
    (sx / n, sy / n)
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn mean_centroid(members: &[usize], centroids: &HashMap<usize, (f32, f32)>) -> (f32, f32) {
    let n = members.len() as f32;
    let (sx, sy) = members
        .iter()
        .fold((0.0, 0.0), |(sx, sy), id| {
            let c = centroids[id];
            (sx + c.0, sy + c.1)
        });
    (sx / n, sy / n)
}

fn bounding_box<T: Eq + Hash + Clone>(
    members: &[usize],
    placed: &HashMap<usize, PlacedRoom<T>>,
) -> (f32, f32, f32, f32) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for &id in members {
        for cell in placed[&id].world_cells() {
            min_x = min_x.min(cell.x as f32);
            min_y = min_y.min(cell.y as f32);
            max_x = max_x.max(cell.x as f32);
            max_y = max_y.max(cell.y as f32);
        }
    }
    (min_x, min_y, max_x, max_y)
}
