//! dungeon-forge — deterministic procedural dungeon floor generation.
//!
//! Given a [`config::FloorConfig`] (seed, room count, a pool of room-shape
//! templates, placement constraints, and a graph algorithm choice), produces
//! a [`layout::FloorLayout`]: a connected graph of rooms, a 2D placement of
//! those rooms on an integer grid, connecting hallways and doors, and
//! auxiliary metadata (critical path, zones, clusters, secret passages,
//! per-room difficulty).
//!
//! The central invariant: same seed + same configuration ⇒ byte-identical
//! output. Every stage draws from its own RNG stream (see [`rng`]) and
//! iterates in a documented, deterministic order.
//!
//! Entry points are [`generator::generate`] for a single floor and
//! [`generator::generate_multi_floor`] for an independent stack of floors
//! linked by typed [`layout::FloorConnection`] records.

pub mod assignment;
pub mod cell;
pub mod clusters;
pub mod config;
pub mod constants;
pub mod constraints;
pub mod difficulty;
pub mod error;
pub mod generator;
pub mod graph;
pub mod hallway;
pub mod layout;
pub mod logging;
pub mod rng;
pub mod secret_passage;
pub mod spatial;
pub mod template;
pub mod template_select;
pub mod zones;

pub use config::{FloorConfig, HallwayMode};
pub use error::GenerationError;
pub use generator::{generate, generate_multi_floor};
pub use layout::{FloorConnection, FloorLayout, MultiFloorLayout};
