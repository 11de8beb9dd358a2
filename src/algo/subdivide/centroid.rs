//! Centroid insertion.

use rayon::prelude::*;

use crate::algo::utils::center_name;
use crate::error::Result;
use crate::mesh::{Mesh, TriangleId, VertexAttributes, VertexId};

/// New center vertex of a triangle, computed before the mesh is edited.
struct Center {
    triangle: TriangleId,
    corners: [VertexId; 3],
    name: String,
    attributes: VertexAttributes,
}

fn compute_center(mesh: &Mesh, t: TriangleId, displacement: f64) -> Center {
    let corners = mesh.triangle_vertices(t);
    let [a, b, c] = corners.map(|v| mesh.attributes(v));
    let geometry = mesh.compute_triangle_geometry(t);

    let mut attributes = VertexAttributes::barycenter(a, b, c);
    attributes.position += geometry.normal * (geometry.area.sqrt() * displacement);

    let [na, nb, nc] = corners.map(|v| mesh.vertex(v).name());
    Center {
        triangle: t,
        corners,
        name: center_name(na, nb, nc),
        attributes,
    }
}

/// Replace each triangle with three triangles around its barycenter.
pub(super) fn subdivide_once(
    mesh: &mut Mesh,
    triangles: &[TriangleId],
    displacement: f64,
    parallel: bool,
) -> Result<Vec<TriangleId>> {
    let view: &Mesh = mesh;
    let centers: Vec<Center> = if parallel {
        triangles
            .par_iter()
            .map(|&t| compute_center(view, t, displacement))
            .collect()
    } else {
        triangles
            .iter()
            .map(|&t| compute_center(view, t, displacement))
            .collect()
    };

    let mut result = Vec::with_capacity(triangles.len() * 3);
    for center in centers {
        let [a, b, c] = center.corners;
        mesh.delete_triangle(center.triangle)?;
        let m = mesh.add_vertex_with(center.name, center.attributes);
        result.push(mesh.add_triangle(a, b, m)?);
        result.push(mesh.add_triangle(b, c, m)?);
        result.push(mesh.add_triangle(c, a, m)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3, Vector4};

    fn create_triangle() -> (Mesh, TriangleId) {
        let mut mesh = Mesh::new("tri");
        let a = mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex_at("b", Point3::new(0.0, 0.0, 3.0));
        let c = mesh.add_vertex_at("c", Point3::new(3.0, 0.0, 0.0));
        mesh.attributes_mut(a).color = Vector4::new(1.0, 0.0, 0.0, 1.0);
        mesh.attributes_mut(b).color = Vector4::new(0.0, 1.0, 0.0, 1.0);
        mesh.attributes_mut(c).color = Vector4::new(0.0, 0.0, 1.0, 1.0);
        let t = mesh.add_triangle(a, b, c).unwrap();
        mesh.compute_normals();
        (mesh, t)
    }

    #[test]
    fn test_center_attributes() {
        let (mut mesh, t) = create_triangle();
        let result = subdivide_once(&mut mesh, &[t], 0.0, false).unwrap();
        assert_eq!(result.len(), 3);

        let m = mesh.vertex_at(3).unwrap();
        assert_relative_eq!(*mesh.position(m), Point3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(mesh.attributes(m).color, Vector4::new(1.0, 1.0, 1.0, 3.0) / 3.0);
        assert_relative_eq!(*mesh.vertex(m).normal(), Vector3::y());
        for t in result {
            assert!(mesh.triangle_contains(t, m));
            assert!(mesh.triangle(t).normal().y > 0.99);
        }
    }

    #[test]
    fn test_displacement_follows_normal() {
        let (mut mesh, t) = create_triangle();
        // area 4.5, so the center moves by sqrt(4.5) * 0.5
        subdivide_once(&mut mesh, &[t], 0.5, true).unwrap();
        let m = mesh.vertex_at(3).unwrap();
        assert_relative_eq!(mesh.position(m).y, 4.5f64.sqrt() * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (mut a, t) = create_triangle();
        let mut b = a.clone();
        subdivide_once(&mut a, &[t], 0.3, true).unwrap();
        subdivide_once(&mut b, &[t], 0.3, false).unwrap();
        let pa: Vec<_> = a.vertices().map(|(_, v)| *v.position()).collect();
        let pb: Vec<_> = b.vertices().map(|(_, v)| *v.position()).collect();
        assert_eq!(pa, pb);
    }
}
