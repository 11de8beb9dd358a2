//! # Facette
//!
//! A half-edge triangle mesh library: construction, procedural surfaces,
//! editing, subdivision, simplification and mass properties.
//!
//! Meshes own their vertices, triangles and half-edges in arenas and hand
//! out typed ids. Ids carry the tag of the mesh that issued them, so an id
//! from another mesh is rejected instead of addressing the wrong element.
//!
//! ## Features
//!
//! - **Half-edge data structure**: opposite and sibling links for O(1)
//!   adjacency steps, with explicit boundaries
//! - **Procedural surfaces**: rectangular, hexagonal and revolution grids,
//!   boxes, platonic solids, spheres, tori, lathes
//! - **Processing**: affine transforms, vertex bevel, polygon extrusion,
//!   subdivision, consistency checks
//! - **Redux**: quadric error simplification by vertex collapse
//! - **Physics**: volume, center of mass and inertia tensor
//!
//! ## Quick Start
//!
//! ```
//! use facette::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = Mesh::new("quad");
//! let a = mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex_at("b", Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex_at("c", Point3::new(1.0, 1.0, 0.0));
//! let d = mesh.add_vertex_at("d", Point3::new(0.0, 1.0, 0.0));
//! mesh.add_quad(a, b, c, d).unwrap();
//! mesh.compute_normals();
//!
//! assert_eq!(mesh.triangle_count(), 2);
//! assert!((mesh.vertex(a).normal().z - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Generating and Editing
//!
//! ```
//! use facette::prelude::*;
//! use facette::algo::physics::MassProperties;
//! use facette::algo::shapes::{sphere_tess, Platonic};
//! use facette::algo::subdivide::subdivide_all;
//!
//! let mut sphere = sphere_tess(Platonic::Icosahedron, 1).unwrap();
//! let triangles = sphere.triangle_ids().to_vec();
//! subdivide_all(&mut sphere, &triangles, 1, 0.1).unwrap();
//! assert_eq!(sphere.triangle_count(), 80 * 3);
//!
//! let report = check_mesh(&mut sphere, &CheckOptions::default()).unwrap();
//! assert!(report.is_valid());
//!
//! let props = MassProperties::compute(&sphere, 1.0).unwrap();
//! assert!(props.volume > 3.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use facette::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::utils::{check_mesh, CheckOptions, MeshReport};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, HalfEdge, HalfEdgeId, Mesh, Triangle, TriangleId,
        Vertex, VertexAttributes, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
