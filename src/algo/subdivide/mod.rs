//! Triangle subdivision.
//!
//! Subdivision works on a list of triangles rather than on the whole mesh, so
//! that a patch can be refined while the rest of the mesh stays as it is.
//! Every function returns the triangles that replace the input list.
//!
//! # Centroid Insertion
//!
//! The default scheme inserts a vertex at the barycenter of each triangle and
//! replaces the triangle with three triangles around it, tripling the
//! triangle count per iteration. The new vertex takes the average of the
//! corner attributes and can be pushed along the face normal by
//! `sqrt(area) * displacement`, which gives faceted relief (rocks, terrain).
//!
//! # Edge Midpoints
//!
//! The midpoint scheme inserts a vertex on each edge and replaces every
//! triangle with four, sharing the midpoints between neighboring triangles of
//! the list. With `smooth > 0` the midpoints follow a cubic Hermite curve
//! built from the vertex normals, which rounds the surface off.
//!
//! # Example
//!
//! ```
//! use facette::algo::shapes::{platonic, Platonic};
//! use facette::algo::subdivide::{subdivide_all, subdivide_all_with, SubdivideOptions};
//!
//! let mut mesh = platonic(Platonic::Octahedron).unwrap();
//! let triangles = mesh.triangle_ids().to_vec();
//! let triangles = subdivide_all(&mut mesh, &triangles, 1, 0.0).unwrap();
//! assert_eq!(triangles.len(), 24);
//!
//! let options = SubdivideOptions::midpoint(1).with_smooth(0.5);
//! let triangles = subdivide_all_with(&mut mesh, &triangles, &options).unwrap();
//! assert_eq!(triangles.len(), 96);
//! ```

mod centroid;
mod midpoint;

use std::collections::HashSet;

use tracing::info;

use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, TriangleId};

/// How new vertices are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdivisionScheme {
    /// One vertex at the barycenter, three children per triangle.
    #[default]
    Centroid,
    /// One vertex per edge, four children per triangle.
    Midpoint,
}

/// Options for subdivision.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision iterations.
    pub iterations: usize,

    /// Vertex insertion scheme.
    pub scheme: SubdivisionScheme,

    /// Offset of centroid vertices along the face normal, in units of
    /// `sqrt(area)`. Ignored by the midpoint scheme.
    pub displacement: f64,

    /// Hermite tangent scale for midpoint vertices; 0 places them on the
    /// edge. Ignored by the centroid scheme.
    pub smooth: f64,

    /// Whether to compute new vertex attributes in parallel (default: true).
    pub parallel: bool,
}

impl SubdivideOptions {
    /// Centroid insertion with the specified number of iterations.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            scheme: SubdivisionScheme::Centroid,
            displacement: 0.0,
            smooth: 0.0,
            parallel: true,
        }
    }

    /// Edge midpoint subdivision with the specified number of iterations.
    pub fn midpoint(iterations: usize) -> Self {
        Self::new(iterations).with_scheme(SubdivisionScheme::Midpoint)
    }

    /// Set the insertion scheme.
    pub fn with_scheme(mut self, scheme: SubdivisionScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the centroid displacement.
    pub fn with_displacement(mut self, displacement: f64) -> Self {
        self.displacement = displacement;
        self
    }

    /// Set the midpoint smoothing factor.
    pub fn with_smooth(mut self, smooth: f64) -> Self {
        self.smooth = smooth;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Triangle multiplier of one iteration.
    pub fn factor(&self) -> usize {
        match self.scheme {
            SubdivisionScheme::Centroid => 3,
            SubdivisionScheme::Midpoint => 4,
        }
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Subdivide `triangles` by centroid insertion.
///
/// Each iteration replaces every triangle with three. With zero displacement
/// no vertex leaves the original surface.
pub fn subdivide_all(
    mesh: &mut Mesh,
    triangles: &[TriangleId],
    iterations: usize,
    displacement: f64,
) -> Result<Vec<TriangleId>> {
    let options = SubdivideOptions::new(iterations).with_displacement(displacement);
    subdivide_all_with(mesh, triangles, &options)
}

/// Subdivide `triangles` with the given options.
pub fn subdivide_all_with(
    mesh: &mut Mesh,
    triangles: &[TriangleId],
    options: &SubdivideOptions,
) -> Result<Vec<TriangleId>> {
    subdivide_all_with_progress(mesh, triangles, options, &Progress::none())
}

/// Subdivision with progress reporting.
pub fn subdivide_all_with_progress(
    mesh: &mut Mesh,
    triangles: &[TriangleId],
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<Vec<TriangleId>> {
    if !options.displacement.is_finite() {
        return Err(MeshError::invalid_param(
            "displacement",
            options.displacement,
            "must be finite",
        ));
    }
    if !options.smooth.is_finite() {
        return Err(MeshError::invalid_param("smooth", options.smooth, "must be finite"));
    }

    let mut seen = HashSet::with_capacity(triangles.len());
    let mut current = Vec::with_capacity(triangles.len());
    for &t in triangles {
        mesh.try_triangle(t)?;
        if seen.insert(t) {
            current.push(t);
        }
    }

    let original = current.len();
    let current = mesh.with_deferred_compaction(|mesh| -> Result<Vec<TriangleId>> {
        let mut current = current;
        for iter in 0..options.iterations {
            progress.report(iter, options.iterations, "Subdividing triangles");
            current = match options.scheme {
                SubdivisionScheme::Centroid => {
                    centroid::subdivide_once(mesh, &current, options.displacement, options.parallel)?
                }
                SubdivisionScheme::Midpoint => {
                    midpoint::subdivide_once(mesh, &current, options.smooth, options.parallel)?
                }
            };
        }
        Ok(current)
    })?;
    progress.report(options.iterations, options.iterations, "Subdividing triangles");

    info!(
        scheme = ?options.scheme,
        iterations = options.iterations,
        original,
        result = current.len(),
        "Subdivision complete"
    );
    Ok(current)
}
