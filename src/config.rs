//! `FloorConfig<T>` and its nested configs (§6): the plain, serde-ready
//! input surface to [`crate::generator::generate`]. Mirrors the teacher's
//! `EngineConfig`/`TracingConfig` pattern — every config is `Default` with
//! sane defaults, `Debug + Clone + Serialize + Deserialize`.

use serde::{Deserialize, Serialize};

use crate::clusters::ClusterConfig;
use crate::constants::{DEFAULT_BRANCHING_FACTOR, DEFAULT_MAX_PLACEMENT_RADIUS, MIN_ROOM_COUNT};
use crate::constraints::ConstraintKind;
use crate::difficulty::DifficultyConfig;
use crate::error::GenerationError;
use crate::graph::GraphAlgorithm;
use crate::secret_passage::SecretPassageConfig;
use crate::template::RoomTemplate;
use crate::zones::Zone;

/// Fallback policy when the spatial solver can't place a room adjacent to
/// its already-placed neighbor (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HallwayMode {
    /// Adjacent placement only; a failed fit is a `SpatialPlacement` error.
    None,
    /// Fall back to nearby placement + an A*-routed hallway when needed.
    AsNeeded,
    /// Force every graph edge to route a hallway, even when its rooms end
    /// up adjacent (§9, Open Question: resolved as "always emit ≥1 cell").
    Always,
}

impl Default for HallwayMode {
    fn default() -> Self {
        HallwayMode::AsNeeded
    }
}

/// The full input to a single-floor generation call (§6).
///
/// Not `Serialize`/`Deserialize`/`Clone` as a whole: `constraints` and
/// `zones` may carry `Custom` predicates (plain closures), which aren't
/// data. JSON round-tripping stays an external concern built on the
/// sub-configs that *are* serde-ready (`HallwayMode`, `GraphAlgorithm`,
/// `DifficultyConfig`, `ClusterConfig`, `SecretPassageConfig`).
pub struct FloorConfig<T> {
    pub seed: u64,
    pub room_count: usize,
    pub spawn_room_type: T,
    pub boss_room_type: T,
    pub default_room_type: T,
    pub templates: Vec<RoomTemplate<T>>,
    pub room_requirements: Vec<(T, usize)>,
    pub constraints: Vec<ConstraintKind<T>>,
    pub branching_factor: f32,
    pub hallway_mode: HallwayMode,
    pub graph_algorithm: Option<GraphAlgorithm>,
    pub zones: Vec<Zone<T>>,
    pub secret_passage_config: Option<SecretPassageConfig<T>>,
    pub difficulty_config: Option<DifficultyConfig>,
    pub cluster_config: Option<ClusterConfig<T>>,
    pub max_placement_radius: i32,
}

impl<T: std::fmt::Debug> std::fmt::Debug for FloorConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloorConfig")
            .field("seed", &self.seed)
            .field("room_count", &self.room_count)
            .field("spawn_room_type", &self.spawn_room_type)
            .field("boss_room_type", &self.boss_room_type)
            .field("default_room_type", &self.default_room_type)
            .field("templates", &self.templates.len())
            .field("room_requirements", &self.room_requirements)
            .field("constraints", &self.constraints.len())
            .field("branching_factor", &self.branching_factor)
            .field("hallway_mode", &self.hallway_mode)
            .field("graph_algorithm", &self.graph_algorithm)
            .field("zones", &self.zones.len())
            .field("secret_passage_config", &self.secret_passage_config)
            .field("difficulty_config", &self.difficulty_config)
            .field("cluster_config", &self.cluster_config)
            .field("max_placement_radius", &self.max_placement_radius)
            .finish()
    }
}

impl<T> FloorConfig<T> {
    pub fn new(seed: u64, room_count: usize, spawn: T, boss: T, default: T, templates: Vec<RoomTemplate<T>>) -> Self {
        Self {
            seed,
            room_count,
            spawn_room_type: spawn,
            boss_room_type: boss,
            default_room_type: default,
            templates,
            room_requirements: Vec::new(),
            constraints: Vec::new(),
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            hallway_mode: HallwayMode::default(),
            graph_algorithm: None,
            zones: Vec::new(),
            secret_passage_config: None,
            difficulty_config: None,
            cluster_config: None,
            max_placement_radius: DEFAULT_MAX_PLACEMENT_RADIUS,
        }
    }
}

impl<T: Clone + Eq + std::hash::Hash + std::fmt::Debug> FloorConfig<T> {
    /// All pre-flight checks from §7 (`InvalidConfiguration`). Run before
    /// any generation work; a failure here never touches the RNG streams.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.room_count < MIN_ROOM_COUNT {
            return Err(GenerationError::invalid(format!(
                "room_count must be >= {MIN_ROOM_COUNT}, got {}",
                self.room_count
            )));
        }
        let required_total: usize = self.room_requirements.iter().map(|(_, count)| *count).sum();
        if self.room_count < 2 + required_total {
            return Err(GenerationError::invalid(format!(
                "room_count {} is too small for spawn + boss + {} required room(s)",
                self.room_count, required_total
            )));
        }
        if !(0.0..=1.0).contains(&self.branching_factor) {
            return Err(GenerationError::invalid(format!(
                "branching_factor must be in [0,1], got {}",
                self.branching_factor
            )));
        }
        if self.templates.is_empty() {
            return Err(GenerationError::invalid("templates must not be empty"));
        }
        for template in &self.templates {
            template.validate()?;
        }

        for (room_type, _) in &self.room_requirements {
            if !self.templates.iter().any(|t| t.supports_type(room_type)) {
                return Err(GenerationError::invalid(format!(
                    "no template supports required room type {room_type:?}"
                )));
            }
        }
        if !self.templates.iter().any(|t| t.supports_type(&self.spawn_room_type)) {
            return Err(GenerationError::invalid("no template supports the spawn room type"));
        }
        if !self.templates.iter().any(|t| t.supports_type(&self.boss_room_type)) {
            return Err(GenerationError::invalid("no template supports the boss room type"));
        }

        if let Some(GraphAlgorithm::GridBased(cfg)) = &self.graph_algorithm {
            if cfg.grid_w * cfg.grid_h < self.room_count {
                return Err(GenerationError::invalid(format!(
                    "grid_based config {}x{} cannot hold {} rooms",
                    cfg.grid_w, cfg.grid_h, self.room_count
                )));
            }
        }
        if let Some(GraphAlgorithm::HubAndSpoke(cfg)) = &self.graph_algorithm {
            if cfg.hub_count == 0 {
                return Err(GenerationError::invalid("hub_and_spoke config requires hub_count >= 1"));
            }
        }

        Ok(())
    }
}
