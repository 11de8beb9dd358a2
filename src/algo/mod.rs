//! Mesh generation and processing algorithms.
//!
//! - **Topology**: rectangular, hexagonal and revolution surfaces
//! - **Shapes**: boxes, platonic solids, spheres, tori, surfaces of revolution
//! - **Processing**: transform, bevel, border split, extrusion
//! - **Subdivision**: centroid insertion, edge midpoints
//! - **Decimation**: quadric error vertex collapse ("redux")
//! - **Physics**: volume, mass, center of mass and inertia
//! - **Utilities**: border walks, bounding box, mesh validation

pub mod decimate;
pub mod physics;
pub mod processing;
pub mod progress;
pub mod shapes;
pub mod subdivide;
pub mod topology;
pub mod utils;

pub use progress::Progress;
