//! Shape generators.
//!
//! Every generator returns a new mesh with outward-facing triangles and
//! computed normals. Surfaces of revolution are built on
//! [`add_rectangular_surface`] and [`add_revolution_surface`] by moving the
//! grid vertices into place.

use std::f64::consts::PI;

use nalgebra::{Point2, Point3, Vector2};

use crate::algo::subdivide::{subdivide_all_with, SubdivideOptions};
use crate::algo::topology::{add_rectangular_surface, add_revolution_surface};
use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, VertexId};

/// Axis-aligned box between two corners.
///
/// Corners are named after their side on each axis, lowercase for `min` and
/// uppercase for `max`: `"xyz"` is `min`, `"XYZ"` is `max`.
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> Result<Mesh> {
    let mut mesh = Mesh::with_capacity("box", 8, 12);
    for (iz, z) in [(0, min.z), (1, max.z)] {
        for (iy, y) in [(0, min.y), (1, max.y)] {
            for (ix, x) in [(0, min.x), (1, max.x)] {
                let name: String = [('x', ix), ('y', iy), ('z', iz)]
                    .iter()
                    .map(|&(c, high)| if high == 1 { c.to_ascii_uppercase() } else { c })
                    .collect();
                mesh.add_vertex_at(name, Point3::new(x, y, z));
            }
        }
    }
    let ids = mesh.vertex_ids().to_vec();
    let c = |ix: usize, iy: usize, iz: usize| ids[ix + 2 * iy + 4 * iz];

    mesh.add_quad(c(0, 0, 0), c(0, 0, 1), c(0, 1, 1), c(0, 1, 0))?;
    mesh.add_quad(c(1, 0, 0), c(1, 1, 0), c(1, 1, 1), c(1, 0, 1))?;
    mesh.add_quad(c(0, 0, 0), c(1, 0, 0), c(1, 0, 1), c(0, 0, 1))?;
    mesh.add_quad(c(0, 1, 0), c(0, 1, 1), c(1, 1, 1), c(1, 1, 0))?;
    mesh.add_quad(c(0, 0, 0), c(0, 1, 0), c(1, 1, 0), c(1, 0, 0))?;
    mesh.add_quad(c(0, 0, 1), c(1, 0, 1), c(1, 1, 1), c(0, 1, 1))?;

    mesh.compute_normals();
    Ok(mesh)
}

/// Regular polyhedra with triangular faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platonic {
    /// 4 vertices, 4 triangles.
    Tetrahedron,
    /// 6 vertices, 8 triangles.
    Octahedron,
    /// 12 vertices, 20 triangles.
    Icosahedron,
}

const TETRA_C: f64 = 0.577350269189625764;
const TETRAHEDRON_VERTICES: [[f64; 3]; 4] = [
    [TETRA_C, TETRA_C, TETRA_C],
    [-TETRA_C, -TETRA_C, TETRA_C],
    [TETRA_C, -TETRA_C, -TETRA_C],
    [-TETRA_C, TETRA_C, -TETRA_C],
];
const TETRAHEDRON_TRIANGLES: [[usize; 3]; 4] = [[0, 1, 2], [1, 0, 3], [1, 3, 2], [0, 2, 3]];

const OCTAHEDRON_VERTICES: [[f64; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [1.0, 0.0, 0.0],
    [0.0, -1.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];
const OCTAHEDRON_TRIANGLES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [0, 2, 3],
    [0, 3, 4],
    [0, 4, 1],
    [5, 2, 1],
    [5, 3, 2],
    [5, 4, 3],
    [5, 1, 4],
];

const ICO_A: f64 = 0.525731112119133606;
const ICO_B: f64 = 0.850650808352039932;
const ICOSAHEDRON_VERTICES: [[f64; 3]; 12] = [
    [ICO_A, 0.0, -ICO_B],
    [-ICO_A, 0.0, -ICO_B],
    [ICO_A, 0.0, ICO_B],
    [-ICO_A, 0.0, ICO_B],
    [0.0, -ICO_B, -ICO_A],
    [0.0, -ICO_B, ICO_A],
    [0.0, ICO_B, -ICO_A],
    [0.0, ICO_B, ICO_A],
    [-ICO_B, -ICO_A, 0.0],
    [ICO_B, -ICO_A, 0.0],
    [-ICO_B, ICO_A, 0.0],
    [ICO_B, ICO_A, 0.0],
];
const ICOSAHEDRON_TRIANGLES: [[usize; 3]; 20] = [
    [0, 4, 1],
    [0, 9, 4],
    [9, 5, 4],
    [4, 5, 8],
    [4, 8, 1],
    [8, 10, 1],
    [8, 3, 10],
    [5, 3, 8],
    [5, 2, 3],
    [2, 7, 3],
    [7, 10, 3],
    [7, 6, 10],
    [7, 11, 6],
    [11, 0, 6],
    [0, 1, 6],
    [6, 1, 10],
    [9, 0, 11],
    [9, 11, 2],
    [9, 2, 5],
    [7, 2, 11],
];

/// Platonic solid inscribed in the unit sphere.
///
/// Vertices are named `A`, `B`, `C`...
pub fn platonic(solid: Platonic) -> Result<Mesh> {
    let (name, vertices, triangles): (&str, &[[f64; 3]], &[[usize; 3]]) = match solid {
        Platonic::Tetrahedron => ("tetrahedron", &TETRAHEDRON_VERTICES[..], &TETRAHEDRON_TRIANGLES[..]),
        Platonic::Octahedron => ("octahedron", &OCTAHEDRON_VERTICES[..], &OCTAHEDRON_TRIANGLES[..]),
        Platonic::Icosahedron => ("icosahedron", &ICOSAHEDRON_VERTICES[..], &ICOSAHEDRON_TRIANGLES[..]),
    };

    let mut mesh = Mesh::with_capacity(name, vertices.len(), triangles.len());
    let ids: Vec<VertexId> = vertices
        .iter()
        .zip('A'..)
        .map(|(&[x, y, z], letter)| mesh.add_vertex_at(letter.to_string(), Point3::new(x, y, z)))
        .collect();
    for &[a, b, c] in triangles {
        mesh.add_triangle(ids[a], ids[b], ids[c])?;
    }

    mesh.compute_normals();
    Ok(mesh)
}

/// Sphere tessellated from a platonic solid.
///
/// Each iteration splits every triangle in four at its edge midpoints, then
/// all vertices are pushed back onto the unit sphere. Normals equal
/// positions.
pub fn sphere_tess(solid: Platonic, iterations: usize) -> Result<Mesh> {
    let mut mesh = platonic(solid)?;
    let triangles = mesh.triangle_ids().to_vec();
    subdivide_all_with(&mut mesh, &triangles, &SubdivideOptions::midpoint(iterations))?;

    for v in mesh.vertex_ids().to_vec() {
        let direction = mesh.position(v).coords.normalize();
        mesh.set_position(v, Point3::from(direction));
        mesh.attributes_mut(v).normal = direction;
    }
    Ok(mesh)
}

/// Add the open surface swept by `profile` around the Y axis.
///
/// Profile points are `(radius, height)`; going up the profile keeps the
/// surface facing outward. Returns the grid, ring by ring.
fn add_lathe(mesh: &mut Mesh, profile: &[Point2<f64>], slices: usize) -> Result<Vec<VertexId>> {
    if profile.len() < 2 {
        return Err(MeshError::invalid_param(
            "profile",
            profile.len(),
            "need at least 2 points",
        ));
    }
    if let Some(p) = profile.iter().find(|p| !(p.x >= 0.0 && p.y.is_finite())) {
        return Err(MeshError::invalid_param(
            "profile",
            format!("({}, {})", p.x, p.y),
            "radius must be non-negative and height finite",
        ));
    }

    let first = add_rectangular_surface(mesh, slices, profile.len(), "L%d-%d", true, false)?;
    let ids = mesh.vertex_ids()[first..].to_vec();

    let last = (profile.len() - 1) as f64;
    for (j, p) in profile.iter().enumerate() {
        for i in 0..slices {
            let theta = i as f64 / slices as f64 * 2.0 * PI;
            let attributes = mesh.attributes_mut(ids[i + j * slices]);
            attributes.position = Point3::new(-p.x * theta.sin(), p.y, p.x * theta.cos());
            attributes.texcoord = Vector2::new(i as f64 / slices as f64, j as f64 / last);
        }
    }
    Ok(ids)
}

/// Close a ring with a fan around a new vertex at `center`.
fn add_cap(mesh: &mut Mesh, ring: &[VertexId], center: Point3<f64>, name: &str, facing_up: bool) -> Result<()> {
    let c = mesh.add_vertex_at(name, center);
    let n = ring.len();
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        if facing_up {
            mesh.add_triangle(c, b, a)?;
        } else {
            mesh.add_triangle(c, a, b)?;
        }
    }
    Ok(())
}

/// Open surface of revolution of `profile` around the Y axis.
pub fn lathe(profile: &[Point2<f64>], slices: usize) -> Result<Mesh> {
    let mut mesh = Mesh::new("lathe");
    add_lathe(&mut mesh, profile, slices)?;
    mesh.compute_normals();
    Ok(mesh)
}

/// Closed surface of revolution: the profile plus flat caps at both ends.
fn capped_lathe(name: &str, profile: &[Point2<f64>], slices: usize, bottom: Point3<f64>, top: Point3<f64>) -> Result<Mesh> {
    let mut mesh = Mesh::new(name);
    let ids = add_lathe(&mut mesh, profile, slices)?;
    let rings = profile.len();
    add_cap(&mut mesh, &ids[..slices], bottom, "bottom", false)?;
    add_cap(&mut mesh, &ids[(rings - 1) * slices..], top, "top", true)?;
    mesh.compute_normals();
    Ok(mesh)
}

/// Closed cylinder around the Y axis, centered on the origin.
pub fn cylinder(slices: usize, stacks: usize, radius: f64, height: f64) -> Result<Mesh> {
    if stacks < 1 {
        return Err(MeshError::invalid_param("stacks", stacks, "need at least 1"));
    }
    check_positive("radius", radius)?;
    check_positive("height", height)?;

    let profile: Vec<Point2<f64>> = (0..=stacks)
        .map(|j| Point2::new(radius, height * (j as f64 / stacks as f64 - 0.5)))
        .collect();
    capped_lathe(
        "cylinder",
        &profile,
        slices,
        Point3::new(0.0, -height / 2.0, 0.0),
        Point3::new(0.0, height / 2.0, 0.0),
    )
}

/// Closed cone frustum standing on the XZ plane.
///
/// A zero radius gives a pointed cone: the ring at that end collapses on
/// the axis and its cap triangles have zero area.
pub fn cone_frustum(slices: usize, bottom_radius: f64, top_radius: f64, height: f64) -> Result<Mesh> {
    check_positive("height", height)?;
    let profile = [Point2::new(bottom_radius, 0.0), Point2::new(top_radius, height)];
    capped_lathe(
        "cone",
        &profile,
        slices,
        Point3::origin(),
        Point3::new(0.0, height, 0.0),
    )
}

/// Unit UV sphere with `slices` meridians and `stacks` bands.
pub fn uv_sphere(slices: usize, stacks: usize) -> Result<Mesh> {
    if stacks < 3 {
        return Err(MeshError::invalid_param("stacks", stacks, "need at least 3"));
    }
    let profile: Vec<Point2<f64>> = (1..stacks)
        .map(|j| {
            let phi = -PI / 2.0 + j as f64 * PI / stacks as f64;
            Point2::new(phi.cos(), phi.sin())
        })
        .collect();
    capped_lathe(
        "sphere",
        &profile,
        slices,
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    )
}

/// Torus around the Y axis with major radius 1.
pub fn torus(nlon: usize, nlat: usize, minor_radius: f64) -> Result<Mesh> {
    check_positive("minor_radius", minor_radius)?;
    let mut mesh = Mesh::with_capacity("torus", nlon * nlat, 2 * nlon * nlat);
    let first = add_rectangular_surface(&mut mesh, nlon, nlat, "T%d-%d", true, true)?;
    let ids = mesh.vertex_ids()[first..].to_vec();

    for j in 0..nlat {
        for i in 0..nlon {
            let (a, b) = (i as f64 / nlon as f64, j as f64 / nlat as f64);
            let (lon, lat) = (-a * 2.0 * PI, b * 2.0 * PI);
            let ring = 1.0 + minor_radius * lat.cos();
            let attributes = mesh.attributes_mut(ids[i + j * nlon]);
            attributes.position = Point3::new(ring * lon.sin(), minor_radius * lat.sin(), ring * lon.cos());
            attributes.texcoord = Vector2::new(a, b);
        }
    }
    mesh.compute_normals();
    Ok(mesh)
}

/// Flat disk on the XZ plane facing +Y, made of `segments` rings.
pub fn disk(spokes: usize, segments: usize, radius: f64) -> Result<Mesh> {
    check_positive("radius", radius)?;
    if segments == 0 {
        return Err(MeshError::invalid_param("segments", segments, "need at least 1"));
    }
    let mut mesh = Mesh::new("disk");
    let first = add_revolution_surface(&mut mesh, spokes, segments, "D%d-%d")?;
    let scale = radius / segments as f64;
    for v in mesh.vertex_ids()[first..].to_vec() {
        let p = *mesh.position(v);
        // mirroring Z flips the fan to face +Y
        mesh.attributes_mut(v).position = Point3::new(p.x * scale, 0.0, -p.z * scale);
    }
    mesh.compute_normals();
    Ok(mesh)
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(MeshError::invalid_param(name, value, "must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// Every non-degenerate triangle faces away from `center_of(its center)`.
    fn assert_outward(mesh: &Mesh, center_of: impl Fn(&Point3<f64>) -> Point3<f64>) {
        for (t, tri) in mesh.triangles() {
            if tri.area() == 0.0 {
                continue;
            }
            let c = tri.center();
            assert!(
                tri.normal().dot(&(c - center_of(c))) > 0.0,
                "{:?} faces inward",
                t
            );
        }
    }

    #[test]
    fn test_box() {
        let mesh = box_mesh(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.is_closed());
        assert_outward(&mesh, |_| Point3::origin());

        let max = mesh.vertex_by_name("XYZ").unwrap();
        assert_eq!(*mesh.position(max), Point3::new(1.0, 2.0, 3.0));
        let min = mesh.vertex_by_name("xyz").unwrap();
        assert_eq!(*mesh.position(min), Point3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_platonic_solids() {
        for (solid, v, t) in [
            (Platonic::Tetrahedron, 4, 4),
            (Platonic::Octahedron, 6, 8),
            (Platonic::Icosahedron, 12, 20),
        ] {
            let mesh = platonic(solid).unwrap();
            assert_eq!(mesh.vertex_count(), v);
            assert_eq!(mesh.triangle_count(), t);
            assert!(mesh.is_closed());
            assert_outward(&mesh, |_| Point3::origin());
            for (_, vertex) in mesh.vertices() {
                assert_relative_eq!(vertex.position().coords.norm(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_sphere_tess() {
        let mesh = sphere_tess(Platonic::Icosahedron, 2).unwrap();
        assert_eq!(mesh.triangle_count(), 20 * 16);
        assert_eq!(mesh.vertex_count(), 162);
        assert!(mesh.is_closed());
        for (_, v) in mesh.vertices() {
            assert_relative_eq!(v.position().coords.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(v.position().coords, *v.normal(), epsilon = 1e-12);
        }
        assert_outward(&mesh, |_| Point3::origin());
    }

    #[test]
    fn test_uv_sphere() {
        let mesh = uv_sphere(12, 6).unwrap();
        assert_eq!(mesh.vertex_count(), 12 * 5 + 2);
        assert_eq!(mesh.triangle_count(), 2 * 12 * 5);
        assert!(mesh.is_closed());
        assert_outward(&mesh, |_| Point3::origin());
        assert!(uv_sphere(12, 2).is_err());
    }

    #[test]
    fn test_cylinder() {
        let mesh = cylinder(16, 3, 0.5, 2.0).unwrap();
        assert_eq!(mesh.vertex_count(), 16 * 4 + 2);
        assert!(mesh.is_closed());
        assert_outward(&mesh, |_| Point3::origin());
        let (min, max) = mesh.bounding_box().unwrap();
        assert_relative_eq!(min.y, -1.0);
        assert_relative_eq!(max.y, 1.0);
        assert!(cylinder(16, 3, -0.5, 2.0).is_err());
    }

    #[test]
    fn test_pointed_cone_is_closed() {
        let mesh = cone_frustum(12, 1.0, 0.0, 2.0).unwrap();
        assert!(mesh.is_closed());
        assert_outward(&mesh, |_| Point3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_lathe_is_open() {
        let profile = [Point2::new(1.0, 0.0), Point2::new(1.5, 1.0), Point2::new(1.0, 2.0)];
        let mesh = lathe(&profile, 10).unwrap();
        assert_eq!(mesh.vertex_count(), 30);
        assert_eq!(mesh.triangle_count(), 40);
        assert_eq!(mesh.boundary_halfedge_count(), 20);
        assert_outward(&mesh, |c| Point3::new(0.0, c.y, 0.0));
        assert!(lathe(&profile[..1], 10).is_err());
    }

    #[test]
    fn test_torus() {
        let mesh = torus(16, 8, 0.25).unwrap();
        assert_eq!(mesh.vertex_count(), 128);
        assert_eq!(mesh.triangle_count(), 256);
        assert!(mesh.is_closed());
        assert_outward(&mesh, |c| {
            let axis = Vector3::new(c.x, 0.0, c.z).normalize();
            Point3::from(axis)
        });
    }

    #[test]
    fn test_disk_faces_up() {
        let mesh = disk(8, 2, 3.0).unwrap();
        assert_eq!(mesh.vertex_count(), 17);
        for (_, t) in mesh.triangles() {
            assert!(t.normal().y > 0.99);
        }
        let (min, max) = mesh.bounding_box().unwrap();
        assert_relative_eq!(max.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(min.x, -3.0, epsilon = 1e-12);
        assert!(disk(8, 0, 3.0).is_err());
    }
}
