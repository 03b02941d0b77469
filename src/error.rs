//! Error types for affine-motion.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants fall
//! into three groups: malformed input text, topology violations rejected by
//! the mesh container, and failures of the transform machinery.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while loading, editing or animating meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Malformed text input (bad magic token, bad number, truncated data).
    #[error("input format error at line {line}: {message}")]
    InputFormat {
        /// 1-based line number where the problem was detected.
        line: usize,
        /// Error message.
        message: String,
    },

    /// A face references a vertex index that does not exist.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face record index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has repeated nodes.
    #[error("face ({}, {}, {}) is degenerate (has duplicate nodes)", nodes[0], nodes[1], nodes[2])]
    DegenerateFace {
        /// Node indices of the rejected face.
        nodes: [usize; 3],
    },

    /// An edge would be claimed by more than two faces.
    #[error("edge ({v0}, {v1}) would have more than two incident faces")]
    NonManifoldEdge {
        /// First node of the edge.
        v0: usize,
        /// Second node of the edge.
        v1: usize,
    },

    /// A handle does not name a live element of the mesh.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh or transform from a file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a mesh to a file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid engine or mesh state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The transform has no real matrix logarithm.
    #[error("transform has no real logarithm: {reason}")]
    NoRealLogarithm {
        /// Why the logarithm does not exist.
        reason: String,
    },

    /// An iterative routine failed to converge.
    #[error("algorithm failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an input format error.
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        MeshError::InputFormat {
            line,
            message: message.into(),
        }
    }

    /// True for malformed or unreadable input.
    pub fn is_input_format(&self) -> bool {
        matches!(
            self,
            MeshError::InputFormat { .. }
                | MeshError::LoadError { .. }
                | MeshError::InvalidVertexIndex { .. }
                | MeshError::Io(_)
        )
    }

    /// True for insertions rejected because they would break mesh topology.
    pub fn is_invalid_topology(&self) -> bool {
        matches!(
            self,
            MeshError::DegenerateFace { .. } | MeshError::NonManifoldEdge { .. }
        )
    }
}
