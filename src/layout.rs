//! The generator's final, immutable output (§3): a single floor's placed
//! rooms, hallways, doors and auxiliary metadata, plus the multi-floor
//! aggregate that links independent floors with typed connection records.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::clusters::Cluster;
use crate::error::GenerationError;
use crate::hallway::Hallway;
use crate::secret_passage::SecretPassage;
use crate::spatial::{Door, PlacedRoom};

/// How a [`TransitionRoom`] links to the corresponding room on the other
/// floor side of a [`FloorConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionType {
    StairsUp,
    StairsDown,
    Teleporter,
}

/// A room on this floor that one or more [`FloorConnection`]s terminate at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRoom {
    pub room_id: usize,
    pub transition_type: TransitionType,
}

/// A single floor's complete, immutable generation result. Nothing in here
/// is mutated after `generate` returns; rooms, connections and the critical
/// path are owned exclusively by this value (§3, Lifecycle/ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + std::hash::Hash"
))]
pub struct FloorLayout<T> {
    pub seed: u64,
    pub rooms: HashMap<usize, PlacedRoom<T>>,
    pub doors: Vec<Door>,
    pub hallways: Vec<Hallway>,
    pub secret_passages: Vec<SecretPassage>,
    pub critical_path: Vec<usize>,
    pub spawn_room_id: usize,
    pub boss_room_id: usize,
    pub zone_assignments: HashMap<usize, String>,
    pub transition_rooms: Vec<TransitionRoom>,
    pub clusters: Vec<Cluster<T>>,
    pub difficulty: HashMap<usize, f32>,
}

impl<T: Clone + Eq + Hash> FloorLayout<T> {
    /// The union of every placed room's world cells plus every hallway
    /// segment's inclusive cell run. Used by invariant checks (§8, #3/#4)
    /// and would be the natural input to an ASCII renderer.
    pub fn occupied_cell_count(&self) -> usize {
        let mut cells = std::collections::HashSet::new();
        for room in self.rooms.values() {
            cells.extend(room.world_cells());
        }
        for hallway in &self.hallways {
            for segment in &hallway.segments {
                cells.extend(segment_cells(segment));
            }
        }
        cells.len()
    }
}

fn segment_cells(segment: &crate::hallway::HallwaySegment) -> Vec<crate::cell::Cell> {
    let mut cells = Vec::new();
    let (dx, dy) = (
        (segment.end.x - segment.start.x).signum(),
        (segment.end.y - segment.start.y).signum(),
    );
    let mut current = segment.start;
    cells.push(current);
    while current != segment.end {
        current = current.offset(dx, dy);
        cells.push(current);
    }
    cells
}

/// A typed link between two independently-placed floors. Floors are
/// independent 2D planes (§1, Non-goals: cross-floor spatial placement);
/// this record is the only cross-floor binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorConnection {
    pub from_floor: usize,
    pub from_room: usize,
    pub to_floor: usize,
    pub to_room: usize,
    pub connection_type: TransitionType,
}

impl FloorConnection {
    /// Validate against an already-generated set of floors (§4.9 step 3):
    /// floor indices in range, room ids exist on their respective floors,
    /// endpoints on distinct floors.
    pub fn validate<T>(&self, floors: &[FloorLayout<T>]) -> Result<(), GenerationError> {
        if self.from_floor == self.to_floor {
            return Err(GenerationError::invalid(format!(
                "floor connection {}->{} connects a floor to itself",
                self.from_floor, self.to_floor
            )));
        }
        let from = floors.get(self.from_floor).ok_or_else(|| {
            GenerationError::invalid(format!("floor connection references non-existent floor {}", self.from_floor))
        })?;
        let to = floors.get(self.to_floor).ok_or_else(|| {
            GenerationError::invalid(format!("floor connection references non-existent floor {}", self.to_floor))
        })?;
        if !from.rooms.contains_key(&self.from_room) {
            return Err(GenerationError::invalid(format!(
                "floor connection references non-existent room {} on floor {}",
                self.from_room, self.from_floor
            )));
        }
        if !to.rooms.contains_key(&self.to_room) {
            return Err(GenerationError::invalid(format!(
                "floor connection references non-existent room {} on floor {}",
                self.to_room, self.to_floor
            )));
        }
        Ok(())
    }
}

/// An ordered stack of independently-generated floors plus the typed
/// connections linking them. No cross-floor geometry beyond these records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + std::hash::Hash"
))]
pub struct MultiFloorLayout<T> {
    pub floors: Vec<FloorLayout<T>>,
    pub connections: Vec<FloorConnection>,
}
