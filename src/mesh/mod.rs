//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for building and editing triangle meshes.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], which stores vertices, triangles and
//! half-edges in arenas addressed by typed ids. Every triangle owns three
//! half-edges; a half-edge knows its opposite in the adjacent triangle, which
//! makes neighbor queries O(1) per step.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe ids:
//! - [`VertexId`] - Identifies a vertex
//! - [`TriangleId`] - Identifies a triangle
//! - [`HalfEdgeId`] - Identifies a half-edge
//!
//! An id remembers which mesh issued it; passing it to another mesh fails with
//! [`MeshError::InvalidReference`](crate::error::MeshError::InvalidReference).
//!
//! # Construction
//!
//! ```
//! use facette::mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = Mesh::new("quad");
//! let a = mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex_at("b", Point3::new(0.0, 0.0, 1.0));
//! let c = mesh.add_vertex_at("c", Point3::new(1.0, 0.0, 1.0));
//! let d = mesh.add_vertex_at("d", Point3::new(1.0, 0.0, 0.0));
//! mesh.add_quad(a, b, c, d).unwrap();
//! mesh.compute_normals();
//!
//! assert_eq!(mesh.triangle_count(), 2);
//! assert!((mesh.vertex(a).normal().y - 1.0).abs() < 1e-12);
//! ```

mod builder;
mod edit;
mod halfedge;
mod index;
mod ops;
mod triangle;
mod vertex;

pub use builder::{build_from_quads, build_from_triangles, to_face_vertex};
pub use halfedge::{HalfEdge, Mesh, OutgoingHalfEdges};
pub use index::{HalfEdgeId, TriangleId, VertexId};
pub use triangle::{Triangle, TriangleGeometry};
pub use vertex::{Vertex, VertexAttributes};

pub(crate) use vertex::unit_or_zero;
