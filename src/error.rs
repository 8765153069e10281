use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Conditions raised while building tile geometry.
///
/// None of these are fatal to a tile build: roof builders recover from each
/// of them locally, and the variants exist so the recovery path can be logged
/// and tested.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Split line produced an odd number of crossings ({crossings})")]
    SplitInconsistency { crossings: usize },

    #[error("Skeleton oracle failed: {0}")]
    OracleFailure(String),

    #[error("Roof geometry failed validation: {0}")]
    ValidationFailure(String),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}
