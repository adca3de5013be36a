//! Error types for geodex operations.

use thiserror::Error;

use crate::types::StructureKind;

/// Errors produced by index construction, query execution, and the explorer
/// lifecycle.
///
/// User-triggerable conditions (`NoStructure`, `NoQuerySelected`,
/// `InvalidPolygon`) are recoverable and carry messages suitable for direct
/// display. `TimerState` indicates a programming error in the integration and
/// should never surface in a correct setup.
#[derive(Error, Debug)]
pub enum GeodexError {
    /// A query was attempted before any structure was built.
    #[error("no spatial structure is built; load a dataset first")]
    NoStructure,

    /// A query was executed without selecting a query type first.
    #[error("no query type selected; choose one before executing")]
    NoQuerySelected,

    /// A polygon query was given fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {vertices}")]
    InvalidPolygon { vertices: usize },

    /// The stopwatch was used out of order (double start, stop without
    /// start, or reading elapsed time before a matched stop).
    #[error("timer misuse: {0}")]
    TimerState(&'static str),

    /// A backend refused an insertion because of a hard structural limit.
    /// None of the built-in structures impose one.
    #[error("{kind} capacity exceeded (limit {limit})")]
    Capacity { kind: StructureKind, limit: usize },

    /// Malformed input: inverted bounding box, non-finite coordinate,
    /// zero k, and similar.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, GeodexError>;
