//! Mesh construction from face-vertex lists.
//!
//! Face-vertex lists (a position array plus index triples or quadruples) are
//! the common exchange format of mesh files and GPU buffers. These functions
//! convert between them and the half-edge [`Mesh`].

use nalgebra::Point3;

use super::halfedge::Mesh;
use super::index::VertexId;
use crate::error::{MeshError, Result};

/// Build a mesh from vertex positions and triangle faces.
///
/// Vertices are named `v0`, `v1`, ... after their index.
///
/// # Example
/// ```
/// use facette::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Mesh> {
    build_from_faces(vertices, faces)
}

/// Build a mesh from vertex positions and quad faces.
///
/// Each quad `[a, b, c, d]` becomes the triangles `(a, b, c)` and `(a, c, d)`.
pub fn build_from_quads(vertices: &[Point3<f64>], faces: &[[usize; 4]]) -> Result<Mesh> {
    build_from_faces(vertices, faces)
}

fn build_from_faces<const N: usize>(vertices: &[Point3<f64>], faces: &[[usize; N]]) -> Result<Mesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidFaceIndex { face: fi, vertex: vi });
        }
    }

    let mut mesh = Mesh::with_capacity("mesh", vertices.len(), faces.len() * (N - 2));
    let ids: Vec<VertexId> = vertices
        .iter()
        .enumerate()
        .map(|(i, &p)| mesh.add_vertex_at(format!("v{i}"), p))
        .collect();

    for face in faces {
        let corners: Vec<VertexId> = face.iter().map(|&vi| ids[vi]).collect();
        match N {
            3 => {
                mesh.add_triangle(corners[0], corners[1], corners[2])?;
            }
            _ => {
                mesh.add_polygon_convex(&corners)?;
            }
        }
    }

    mesh.compute_normals();
    Ok(mesh)
}

/// Convert a mesh back to positions and triangle index triples.
///
/// Indices refer to positions in the vertex list, so the result is compact
/// even after deletions.
pub fn to_face_vertex(mesh: &Mesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().iter().map(|&v| *mesh.position(v)).collect();

    let mut slot_to_index = vec![usize::MAX; mesh.vertices.len()];
    for (i, v) in mesh.vertex_ids().iter().enumerate() {
        slot_to_index[v.index()] = i;
    }

    let faces: Vec<[usize; 3]> = mesh
        .triangle_ids()
        .iter()
        .map(|&t| mesh.triangle_vertices(t).map(|v| slot_to_index[v.index()]))
        .collect();

    (vertices, faces)
}
