//! Error types for phyz-gauge.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("invalid group table: {0}")]
    InvalidGroup(String),

    #[error("invalid lattice shape: {0}")]
    InvalidShape(String),

    #[error("invalid directions ({d1}, {d2}) on a {num_dims}-dimensional lattice: {reason}")]
    Dimension {
        d1: usize,
        d2: usize,
        num_dims: usize,
        reason: &'static str,
    },

    #[error("group element {element} out of range for a group of order {size}")]
    ElementOutOfRange { element: usize, size: usize },

    #[error("site coordinate {coord} out of range 0..{extent} on axis {axis}")]
    SiteOutOfBounds {
        axis: usize,
        coord: usize,
        extent: usize,
    },

    #[error("index {index} out of range 0..{len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GaugeError>;
