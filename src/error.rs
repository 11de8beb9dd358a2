//! Error types for facette.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// An element id was issued by another mesh, or names a deleted element.
    #[error("invalid {kind} reference {index}")]
    InvalidReference {
        /// Element kind ("vertex", "triangle" or "half-edge").
        kind: &'static str,
        /// Raw index carried by the id.
        index: usize,
    },

    /// A face-vertex list references a vertex index out of range.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidFaceIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A triangle uses the same vertex more than once.
    #[error("triangle is degenerate (vertex {vertex} is repeated)")]
    DegenerateTriangle {
        /// The repeated vertex index.
        vertex: usize,
    },

    /// A directed edge is already used, so the new triangle would make the
    /// edge border more than two triangles or flip its orientation.
    #[error("edge ({from}, {to}) is already used by another triangle")]
    NonManifoldEdge {
        /// Origin vertex of the edge.
        from: usize,
        /// Target vertex of the edge.
        to: usize,
    },

    /// Ear clipping could not find a valid ear in the remaining polygon.
    #[error("cannot triangulate polygon: {remaining} vertices left without a convex ear")]
    PolygonTriangulation {
        /// Number of polygon vertices left when clipping stopped.
        remaining: usize,
    },

    /// Two successive border vertices are not joined by a half-edge.
    #[error("border is broken: no half-edge from vertex {from} to vertex {to}")]
    BrokenBorder {
        /// Origin vertex.
        from: usize,
        /// Expected target vertex.
        to: usize,
    },

    /// An edge collapse was refused because it would break the mesh.
    #[error("cannot collapse vertex {from} into vertex {to}: {reason}")]
    InvalidCollapse {
        /// Vertex being removed.
        from: usize,
        /// Vertex kept.
        to: usize,
        /// Why the collapse is refused.
        reason: &'static str,
    },

    /// A consistency check failed.
    #[error("inconsistent mesh: {0}")]
    Inconsistent(String),

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

    /// Returns true for errors raised while building topology, which leave
    /// the mesh untouched.
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            MeshError::InvalidReference { .. }
                | MeshError::DegenerateTriangle { .. }
                | MeshError::NonManifoldEdge { .. }
                | MeshError::PolygonTriangulation { .. }
                | MeshError::InvalidCollapse { .. }
        )
    }
}
