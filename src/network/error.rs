//! Error taxonomy for road network operations

use thiserror::Error;

use super::types::IntersectionId;

/// Failures reported by the store and the service layer.
///
/// None of these are retried internally; callers translate them into whatever
/// their surface needs (status codes, log lines, ...).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NetworkError {
    #[error("Intersection '{0}' not found")]
    IntersectionNotFound(IntersectionId),

    #[error("Road from '{from}' to '{to}' not found")]
    RoadNotFound {
        from: IntersectionId,
        to: IntersectionId,
    },

    #[error("Intersection with id '{0}' already exists")]
    AlreadyExists(IntersectionId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No path found between '{from}' and '{to}'")]
    Unreachable {
        from: IntersectionId,
        to: IntersectionId,
    },
}

impl NetworkError {
    pub fn invalid(message: impl Into<String>) -> Self {
        NetworkError::InvalidArgument(message.into())
    }
}
