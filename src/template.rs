//! Immutable room shape templates.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Edge};
use crate::error::GenerationError;

/// Opaque interior obstacle tag. Interior *content* (enemies, items) is out
/// of scope; these are abstract markers a host game can key off of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteriorFeature {
    Pillar,
    Wall,
    Hazard,
    Decorative,
}

/// Immutable shape descriptor for a room. `T` is the caller-supplied,
/// finite-domain room-type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + std::hash::Hash"
))]
pub struct RoomTemplate<T> {
    pub id: String,
    pub valid_room_types: HashSet<T>,
    /// Cells in template-local coordinates; the anchor is the origin.
    pub cells: HashSet<Cell>,
    /// Exterior cell edges at which a door may be placed.
    pub door_edges: HashMap<Cell, Edge>,
    pub weight: f32,
    /// Interior obstacle markers; keys must lie in `cells` and must not
    /// coincide with a door-eligible exterior edge.
    pub interior_features: HashMap<Cell, InteriorFeature>,
}

impl<T: Eq + std::hash::Hash + Clone> RoomTemplate<T> {
    /// Every edge of every cell in `cells` that is not shared with another
    /// cell of the template — i.e. the template's outer boundary.
    pub fn exterior_edges(&self) -> HashMap<Cell, Edge> {
        let mut out = HashMap::new();
        for &cell in &self.cells {
            let mut exterior = Edge::NONE;
            for dir in Edge::DIRECTIONS {
                let neighbor = cell.neighbor(dir);
                if !self.cells.contains(&neighbor) {
                    exterior.insert(dir);
                }
            }
            if !exterior.is_empty() {
                out.insert(cell, exterior);
            }
        }
        out
    }

    /// Bounding box `(min_x, min_y, width, height)` over `cells`.
    pub fn bounding_box(&self) -> (i32, i32, i32, i32) {
        let min_x = self.cells.iter().map(|c| c.x).min().unwrap_or(0);
        let max_x = self.cells.iter().map(|c| c.x).max().unwrap_or(0);
        let min_y = self.cells.iter().map(|c| c.y).min().unwrap_or(0);
        let max_y = self.cells.iter().map(|c| c.y).max().unwrap_or(0);
        (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    pub fn width(&self) -> i32 {
        self.bounding_box().2
    }

    pub fn height(&self) -> i32 {
        self.bounding_box().3
    }

    /// World cells of this template anchored at `anchor`.
    pub fn world_cells(&self, anchor: Cell) -> HashSet<Cell> {
        self.cells.iter().map(|&c| c + anchor).collect()
    }

    /// Validate the invariants from the data model: non-empty id/cells,
    /// positive weight, non-empty valid types, every door key on an
    /// exterior edge, and no door/feature overlap.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.id.is_empty() {
            return Err(GenerationError::invalid("room template id must not be empty"));
        }
        if self.cells.is_empty() {
            return Err(GenerationError::invalid(format!(
                "room template '{}' has no cells",
                self.id
            )));
        }
        if self.valid_room_types.is_empty() {
            return Err(GenerationError::invalid(format!(
                "room template '{}' has no valid room types",
                self.id
            )));
        }
        if self.door_edges.is_empty() {
            return Err(GenerationError::invalid(format!(
                "room template '{}' has no door edges",
                self.id
            )));
        }
        if !(self.weight > 0.0) {
            return Err(GenerationError::invalid(format!(
                "room template '{}' has non-positive weight {}",
                self.id, self.weight
            )));
        }

        let exterior = self.exterior_edges();
        for (cell, edges) in &self.door_edges {
            let Some(cell_exterior) = exterior.get(cell) else {
                return Err(GenerationError::invalid(format!(
                    "room template '{}' has a door at {:?} which is not an exterior cell",
                    self.id, cell
                )));
            };
            for dir in edges.iter() {
                if !cell_exterior.contains(dir) {
                    return Err(GenerationError::invalid(format!(
                        "room template '{}' has a door edge at {:?} that is not on the template's exterior",
                        self.id, cell
                    )));
                }
            }
        }

        for (cell, _) in &self.interior_features {
            if !self.cells.contains(cell) {
                return Err(GenerationError::invalid(format!(
                    "room template '{}' has an interior feature at {:?} outside its cells",
                    self.id, cell
                )));
            }
            if let Some(door_edges) = self.door_edges.get(cell) {
                if !door_edges.is_empty() {
                    return Err(GenerationError::invalid(format!(
                        "room template '{}' has an interior feature at {:?} that coincides with a door edge",
                        self.id, cell
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn supports_type(&self, room_type: &T) -> bool {
        self.valid_room_types.contains(room_type)
    }
}
