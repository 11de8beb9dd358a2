//! Triangle records and their cached geometry.

use nalgebra::{Point3, Vector3};

use super::index::HalfEdgeId;
use super::vertex::unit_or_zero;

/// Geometry derived from the three corner positions of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleGeometry {
    /// Unit normal, zero for a degenerate triangle.
    pub normal: Vector3<f64>,
    /// Centroid of the three corners.
    pub center: Point3<f64>,
    /// Surface area, zero for a degenerate triangle.
    pub area: f64,
    /// Plane offset: `normal · p + w = 0` for points of the plane.
    pub w: f64,
}

impl TriangleGeometry {
    /// Compute the geometry of triangle `(p0, p1, p2)`.
    pub fn from_points(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Self {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let normal = unit_or_zero(cross);
        let area = if normal == Vector3::zeros() {
            0.0
        } else {
            0.5 * cross.norm()
        };
        Self {
            normal,
            center: Point3::from((p0.coords + p1.coords + p2.coords) / 3.0),
            area,
            w: -normal.dot(&p0.coords),
        }
    }

    /// True when the triangle has no usable normal.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.area == 0.0
    }
}

/// A triangle in the mesh.
///
/// Geometry is cached when the triangle is created or edited and refreshed by
/// [`Mesh::compute_normals`]. Moving vertices through
/// [`Mesh::attributes_mut`] leaves it stale until then.
///
/// [`Mesh::compute_normals`]: super::Mesh::compute_normals
/// [`Mesh::attributes_mut`]: super::Mesh::attributes_mut
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Half-edge leaving the first vertex.
    pub(crate) halfedge: HalfEdgeId,
    pub(crate) geometry: TriangleGeometry,
    pub(crate) tangent: Vector3<f64>,
}

impl Triangle {
    pub(crate) fn new(halfedge: HalfEdgeId, geometry: TriangleGeometry) -> Self {
        Self {
            halfedge,
            geometry,
            tangent: Vector3::zeros(),
        }
    }

    /// Cached unit normal.
    #[inline]
    pub fn normal(&self) -> &Vector3<f64> {
        &self.geometry.normal
    }

    /// Cached surface area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.geometry.area
    }

    /// Cached centroid.
    #[inline]
    pub fn center(&self) -> &Point3<f64> {
        &self.geometry.center
    }

    /// Cached plane offset.
    #[inline]
    pub fn w(&self) -> f64 {
        self.geometry.w
    }

    /// Tangent computed by [`Mesh::compute_tangents`].
    ///
    /// [`Mesh::compute_tangents`]: super::Mesh::compute_tangents
    #[inline]
    pub fn tangent(&self) -> &Vector3<f64> {
        &self.tangent
    }

    /// All cached geometry.
    #[inline]
    pub fn geometry(&self) -> &TriangleGeometry {
        &self.geometry
    }
}
