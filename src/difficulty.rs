//! Per-room difficulty scaling, applied to `distance_from_start` after graph
//! generation and before template selection.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::graph::FloorGraph;

/// How per-room difficulty grows with distance from spawn.
#[derive(Clone, Serialize, Deserialize)]
pub enum DifficultyScaling {
    Linear { factor: f32 },
    Exponential { factor: f32 },
    #[serde(skip)]
    Custom(Arc<dyn Fn(usize) -> f32 + Send + Sync>),
}

impl std::fmt::Debug for DifficultyScaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DifficultyScaling::Linear { factor } => f.debug_struct("Linear").field("factor", factor).finish(),
            DifficultyScaling::Exponential { factor } => {
                f.debug_struct("Exponential").field("factor", factor).finish()
            }
            DifficultyScaling::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for DifficultyScaling {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DifficultyScaling::Linear { factor: a }, DifficultyScaling::Linear { factor: b }) => a == b,
            (DifficultyScaling::Exponential { factor: a }, DifficultyScaling::Exponential { factor: b }) => a == b,
            _ => false,
        }
    }
}

/// Configuration for the difficulty stage (§4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub base: f32,
    pub max_difficulty: f32,
    pub scaling: DifficultyScaling,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            base: crate::constants::DEFAULT_DIFFICULTY_BASE,
            max_difficulty: crate::constants::DEFAULT_MAX_DIFFICULTY,
            scaling: DifficultyScaling::Linear {
                factor: crate::constants::DEFAULT_DIFFICULTY_FACTOR,
            },
        }
    }
}

/// Compute `distance_from_start → difficulty` for every node, clamped to
/// `[0, max_difficulty]`.
pub fn compute_difficulty(graph: &FloorGraph, cfg: &DifficultyConfig) -> HashMap<usize, f32> {
    graph
        .nodes
        .iter()
        .map(|node| {
            let raw = match &cfg.scaling {
                DifficultyScaling::Linear { factor } => cfg.base + (node.distance_from_start as f32) * factor,
                DifficultyScaling::Exponential { factor } => {
                    cfg.base + factor.powi(node.distance_from_start as i32)
                }
                DifficultyScaling::Custom(f) => cfg.base + f(node.distance_from_start),
            };
            (node.id, raw.clamp(0.0, cfg.max_difficulty))
        })
        .collect()
}
