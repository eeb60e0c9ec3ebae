/// Error types for mesh loading and frame buffer generation
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a mesh file into a triangulation.
///
/// A parse either succeeds completely or leaves the target triangulation
/// untouched, so callers can always fall back to drawing nothing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read mesh file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: coordinate is not a finite number")]
    NonFiniteCoordinate { line: usize },

    #[error("line {line}: face names {count} points, at least 3 are required")]
    DegenerateFace { line: usize, count: usize },

    #[error("line {line}: face references point {id}, but only {declared} points are declared")]
    UnknownPoint { line: usize, id: i64, declared: usize },
}

/// A triangle references a point outside the point sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("triangle {triangle} references point {index}, but the mesh has {point_count} points")]
pub struct IndexError {
    pub triangle: usize,
    pub index: usize,
    pub point_count: usize,
}

/// Any error produced by the core.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
