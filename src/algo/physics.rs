//! Mass properties of closed meshes.
//!
//! Volume, center of mass and inertia tensor come from the divergence
//! theorem: every triangle forms a signed tetrahedron with the origin, and
//! the volume integrals of the tetrahedra add up to those of the solid
//! (Mirtich 1996).
//!
//! The mesh must be closed with outward-facing triangles. This is not
//! checked: an open or inverted mesh gives a meaningless, possibly negative
//! volume.
//!
//! # Example
//!
//! ```
//! use facette::algo::physics::MassProperties;
//! use facette::algo::shapes::box_mesh;
//! use nalgebra::Point3;
//!
//! let cube = box_mesh(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).unwrap();
//! let props = MassProperties::compute(&cube, 0.5).unwrap();
//!
//! assert!((props.volume - 8.0).abs() < 1e-12);
//! assert!((props.mass - 4.0).abs() < 1e-12);
//! ```

use std::ops::Add;

use nalgebra::{Matrix3, Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, TriangleId};

/// Volume integrals accumulated over signed tetrahedra.
#[derive(Debug, Clone, Copy)]
struct Moments {
    volume: f64,
    /// ∫x, ∫y, ∫z
    first: Vector3<f64>,
    /// ∫x², ∫y², ∫z²
    square: Vector3<f64>,
    /// ∫xy, ∫xz, ∫yz
    product: Vector3<f64>,
}

impl Moments {
    fn zero() -> Self {
        Self {
            volume: 0.0,
            first: Vector3::zeros(),
            square: Vector3::zeros(),
            product: Vector3::zeros(),
        }
    }

    /// Integrals over the tetrahedron (origin, a, b, c).
    #[allow(clippy::suspicious_operation_groupings)]
    fn tetrahedron(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Self {
        let det = a.cross(b).dot(c);
        let volume = det / 6.0;
        let f60 = det / 60.0;
        let f120 = det / 120.0;

        let square = |i: usize| a[i] * a[i] + b[i] * b[i] + c[i] * c[i] + a[i] * b[i] + a[i] * c[i] + b[i] * c[i];
        let product = |i: usize, j: usize| {
            2.0 * (a[i] * a[j] + b[i] * b[j] + c[i] * c[j])
                + a[i] * b[j]
                + a[j] * b[i]
                + a[i] * c[j]
                + a[j] * c[i]
                + b[i] * c[j]
                + b[j] * c[i]
        };

        Self {
            volume,
            first: (a + b + c) * (volume / 4.0),
            square: Vector3::new(square(0), square(1), square(2)) * f60,
            product: Vector3::new(product(0, 1), product(0, 2), product(1, 2)) * f120,
        }
    }
}

impl Add for Moments {
    type Output = Moments;

    fn add(self, other: Moments) -> Moments {
        Moments {
            volume: self.volume + other.volume,
            first: self.first + other.first,
            square: self.square + other.square,
            product: self.product + other.product,
        }
    }
}

/// Mass properties of a solid of uniform density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Enclosed volume.
    pub volume: f64,
    /// Volume times density.
    pub mass: f64,
    /// Center of mass (centroid of the volume).
    pub center_of_mass: Point3<f64>,
    /// Inertia tensor about the center of mass.
    pub inertia: Matrix3<f64>,
}

impl MassProperties {
    /// Integrate over the triangles of `mesh` with the given density.
    ///
    /// Zero-area triangles are skipped.
    ///
    /// # Errors
    /// - [`MeshError::EmptyMesh`] if the mesh has no triangle
    /// - [`MeshError::InvalidParameter`] if `density` is negative or not
    ///   finite, or the volume is zero
    pub fn compute(mesh: &Mesh, density: f64) -> Result<Self> {
        if !(density >= 0.0 && density.is_finite()) {
            return Err(MeshError::invalid_param("density", density, "must be non-negative"));
        }
        if mesh.triangle_count() == 0 {
            return Err(MeshError::EmptyMesh);
        }

        let tetrahedron = |&t: &TriangleId| {
            if mesh.compute_triangle_geometry(t).is_degenerate() {
                return Moments::zero();
            }
            let [a, b, c] = mesh.triangle_positions(t);
            Moments::tetrahedron(&a.coords, &b.coords, &c.coords)
        };
        let m = mesh
            .triangle_ids()
            .par_iter()
            .map(tetrahedron)
            .reduce(Moments::zero, Add::add);

        if m.volume == 0.0 {
            return Err(MeshError::invalid_param("mesh", mesh.name(), "encloses no volume"));
        }

        let d = m.first / m.volume;
        let [xx, yy, zz] = [m.square.x, m.square.y, m.square.z];
        let [xy, xz, yz] = [m.product.x, m.product.y, m.product.z];
        #[rustfmt::skip]
        let at_origin = Matrix3::new(
            yy + zz, -xy,     -xz,
            -xy,     xx + zz, -yz,
            -xz,     -yz,     xx + yy,
        );
        // parallel axis theorem, moved to the center of mass
        let shift = (Matrix3::identity() * d.dot(&d) - d * d.transpose()) * m.volume;

        let props = Self {
            volume: m.volume,
            mass: m.volume * density,
            center_of_mass: Point3::from(d),
            inertia: (at_origin - shift) * density,
        };
        debug!(
            triangles = mesh.triangle_count(),
            volume = props.volume,
            "Integrated volume"
        );
        Ok(props)
    }
}

/// Mass integration over a mesh with a settable density.
///
/// Keeps the last computed properties for the getters.
#[derive(Debug, Clone)]
pub struct MassIntegrator {
    density: f64,
    properties: Option<MassProperties>,
}

impl Default for MassIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MassIntegrator {
    /// Create an integrator with unit density.
    pub fn new() -> Self {
        Self {
            density: 1.0,
            properties: None,
        }
    }

    /// Set the density used by the next integration.
    pub fn set_density(&mut self, density: f64) {
        self.density = density;
    }

    /// Current density.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Integrate over `mesh` and keep the result.
    pub fn compute_volume_integrals(&mut self, mesh: &Mesh) -> Result<MassProperties> {
        let props = MassProperties::compute(mesh, self.density)?;
        info!(
            mesh = mesh.name(),
            volume = props.volume,
            mass = props.mass,
            cog_x = props.center_of_mass.x,
            cog_y = props.center_of_mass.y,
            cog_z = props.center_of_mass.z,
            "Computed mass properties"
        );
        self.properties = Some(props);
        Ok(props)
    }

    /// Last computed properties.
    pub fn properties(&self) -> Option<&MassProperties> {
        self.properties.as_ref()
    }

    /// Last computed volume, zero before the first integration.
    pub fn volume(&self) -> f64 {
        self.properties.map_or(0.0, |p| p.volume)
    }

    /// Last computed mass, zero before the first integration.
    pub fn mass(&self) -> f64 {
        self.properties.map_or(0.0, |p| p.mass)
    }

    /// Last computed center of mass.
    pub fn center_of_mass(&self) -> Option<Point3<f64>> {
        self.properties.map(|p| p.center_of_mass)
    }
}
