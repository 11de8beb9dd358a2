//! Edge midpoint subdivision.

use std::collections::HashMap;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::algo::utils::mid_name;
use crate::error::Result;
use crate::mesh::{Mesh, TriangleId, VertexAttributes, VertexId};

type EdgeKey = (VertexId, VertexId);

#[inline]
fn edge_key(a: VertexId, b: VertexId) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Tangent at `p` toward the other end of the chord, in the plane of `normal`.
#[inline]
fn hermite_tangent(normal: &Vector3<f64>, chord: &Vector3<f64>) -> Vector3<f64> {
    normal.cross(&chord.cross(normal))
}

/// Attributes of the vertex inserted on edge `a`–`b`.
pub(crate) fn midpoint_attributes(mesh: &Mesh, a: VertexId, b: VertexId, smooth: f64) -> VertexAttributes {
    let (pa, pb) = (mesh.attributes(a), mesh.attributes(b));
    if smooth > 0.0 {
        let chord = (pb.position - pa.position) * smooth;
        let ta = hermite_tangent(&pa.normal, &chord);
        let tb = hermite_tangent(&pb.normal, &chord);
        VertexAttributes::hermite(pa, &ta, pb, &tb, 0.5)
    } else {
        VertexAttributes::lerp(pa, pb, 0.5)
    }
}

/// Replace each triangle with four, sharing edge midpoints.
pub(super) fn subdivide_once(
    mesh: &mut Mesh,
    triangles: &[TriangleId],
    smooth: f64,
    parallel: bool,
) -> Result<Vec<TriangleId>> {
    let view: &Mesh = mesh;
    let corners: Vec<[VertexId; 3]> = triangles.iter().map(|&t| view.triangle_vertices(t)).collect();

    let mut edges: Vec<EdgeKey> = Vec::with_capacity(triangles.len() * 2);
    let mut edge_index: HashMap<EdgeKey, usize> = HashMap::with_capacity(triangles.len() * 2);
    for c in &corners {
        for k in 0..3 {
            let key = edge_key(c[k], c[(k + 1) % 3]);
            edge_index.entry(key).or_insert_with(|| {
                edges.push(key);
                edges.len() - 1
            });
        }
    }

    let compute = |&(a, b): &EdgeKey| {
        let name = mid_name(view.vertex(a).name(), view.vertex(b).name());
        (name, midpoint_attributes(view, a, b, smooth))
    };
    let new_vertices: Vec<(String, VertexAttributes)> = if parallel {
        edges.par_iter().map(compute).collect()
    } else {
        edges.iter().map(compute).collect()
    };

    let mids: Vec<VertexId> = new_vertices
        .into_iter()
        .map(|(name, attributes)| mesh.add_vertex_with(name, attributes))
        .collect();

    let mut result = Vec::with_capacity(triangles.len() * 4);
    for (&t, s) in triangles.iter().zip(&corners) {
        let m = [0, 1, 2].map(|k| mids[edge_index[&edge_key(s[k], s[(k + 1) % 3])]]);
        mesh.delete_triangle(t)?;
        result.push(mesh.add_triangle(s[0], m[0], m[2])?);
        result.push(mesh.add_triangle(s[1], m[1], m[0])?);
        result.push(mesh.add_triangle(s[2], m[2], m[1])?);
        result.push(mesh.add_triangle(m[0], m[1], m[2])?);
    }
    Ok(result)
}
