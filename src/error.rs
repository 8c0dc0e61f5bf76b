//! Error types for configuration, lookup tables, and batch evaluation.
//!
//! Physical constraint violations are never errors; they are reported as
//! feasibility flags on each step. The types here cover caller mistakes only.

use thiserror::Error;

/// Errors raised while building or scaling a lookup table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("grid axis cannot be empty")]
    EmptyAxis,

    #[error("grid axis needs at least {min} points, got {found}")]
    TooFewPoints { min: usize, found: usize },

    #[error("grid axis must be strictly increasing (violated at index {index})")]
    NotIncreasing { index: usize },

    #[error("values do not match grid shape: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("table contains a non-finite value at index {index}")]
    NonFinite { index: usize },
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_ah"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wraps a lookup-table error with the field it was raised for.
    pub fn from_map(field: impl Into<String>, err: MapError) -> Self {
        Self::new(field, err.to_string())
    }
}

/// Errors raised by the cycle runner and the batch evaluation helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("batch inputs have mismatched lengths: {socs} states, {controls} controls, {inputs} inputs")]
    BatchShape {
        socs: usize,
        controls: usize,
        inputs: usize,
    },

    #[error("cycle timestep {cycle_dt_s} s does not match vehicle timestep {vehicle_dt_s} s")]
    TimestepMismatch { cycle_dt_s: f64, vehicle_dt_s: f64 },
}
