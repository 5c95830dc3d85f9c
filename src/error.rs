//! Error types surfaced at the `generate` API boundary.
//!
//! No silent fallbacks: every failure aborts the current call with no
//! partial output, per the three kinds below.

use thiserror::Error;

/// Failure modes of [`crate::generator::generate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// Raised before any generation work: malformed config, bad templates,
    /// out-of-range parameters, or an inconsistent multi-floor connection.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Raised during type assignment when fewer nodes satisfy a type's
    /// constraints than the requirement demands.
    #[error(
        "constraint violation: room type {room_type:?} needed {required} node(s), only {satisfied} satisfied its constraints"
    )]
    ConstraintViolation {
        room_type: String,
        required: usize,
        satisfied: usize,
    },

    /// Raised when the spatial solver cannot fit a room with hallways
    /// disabled, or when A* finds no route for a required hallway.
    #[error("spatial placement failed: {detail}")]
    SpatialPlacement {
        detail: String,
        room_id: Option<usize>,
        connection: Option<(usize, usize)>,
    },
}

impl GenerationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn constraint(room_type: impl Into<String>, required: usize, satisfied: usize) -> Self {
        Self::ConstraintViolation {
            room_type: room_type.into(),
            required,
            satisfied,
        }
    }

    pub fn spatial_room(detail: impl Into<String>, room_id: usize) -> Self {
        Self::SpatialPlacement {
            detail: detail.into(),
            room_id: Some(room_id),
            connection: None,
        }
    }

    pub fn spatial_connection(detail: impl Into<String>, a: usize, b: usize) -> Self {
        Self::SpatialPlacement {
            detail: detail.into(),
            room_id: None,
            connection: Some((a, b)),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
