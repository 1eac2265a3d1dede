//! Error types for TIN operations.

use thiserror::Error;

/// Result type alias using [`TinError`].
pub type Result<T> = std::result::Result<T, TinError>;

/// Errors that can occur while maintaining a TIN.
#[derive(Debug, Error)]
pub enum TinError {
    /// A vertex or query point carries NaN or infinite coordinates.
    #[error("row {index} has non-finite coordinates ({x}, {y})")]
    NonFiniteCoordinate { index: usize, x: f64, y: f64 },

    /// A triangle references a vertex id that does not exist.
    #[error("triangle {triangle} references missing vertex {vertex}")]
    DanglingVertex { triangle: usize, vertex: usize },

    /// A boundary segment references a vertex id that does not exist.
    #[error("segment references missing vertex {vertex}")]
    DanglingSegment { vertex: usize },

    /// A required optional table is absent from the mesh.
    #[error("mesh has no {0} table")]
    MissingTable(&'static str),

    /// The external triangulator failed or produced no triangles.
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}
