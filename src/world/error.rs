//! Error types for data and persisted-state loading.

use thiserror::Error;

/// Errors that can occur when loading balance, enemy, or session data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// File parsed but a value is out of range.
    #[error("Invalid value in '{path}': {details}")]
    Invalid { path: String, details: String },
}

/// A broken invariant found by an explicit validation pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("evolution recipe references unknown weapon '{0}'")]
    UnknownWeapon(String),

    #[error("evolution recipe references unknown artifact '{0}'")]
    UnknownArtifact(String),

    #[error("artifact '{0}' is not an evolution artifact")]
    NotEvolutionArtifact(String),

    #[error("evolving '{0}' did not produce an evolved weapon")]
    MissingEvolvedMarker(String),

    #[error("spawn phases are not contiguous at {0}s")]
    PhaseGap(f32),

    #[error("tier probabilities for phase starting at {start}s sum to {sum}")]
    TierSum { start: f32, sum: f32 },
}
