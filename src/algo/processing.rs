//! Mesh editing operations.
//!
//! - [`transform`]: apply an affine matrix to positions, normals and tangents
//! - [`homothety`]: scale one triangle about its center
//! - [`bevel_vertex`]: cut a flat facet where a vertex used to be
//! - [`split_border`]: detach the region inside a closed border
//! - [`extrude_polygon`] / [`extrude_triangle`]: raise a region and stitch
//!   its rim with quads
//!
//! Mesh validation lives in [`crate::algo::utils::check_mesh`].

use std::collections::HashMap;

use nalgebra::{Matrix3, Matrix4, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::algo::utils::{average_normal, mid_name, triangles_inside_border, vertices_of};
use crate::error::{MeshError, Result};
use crate::mesh::{unit_or_zero, Mesh, TriangleId, VertexAttributes, VertexId};

// ==================== Transform ====================

/// Apply an affine transform to every vertex.
///
/// Positions (and morph positions) go through the full matrix, normals
/// through the inverse-transpose of its linear part and tangents through the
/// linear part. Directions are renormalized.
///
/// # Errors
/// [`MeshError::InvalidParameter`] if the linear part is singular.
pub fn transform(mesh: &mut Mesh, matrix: &Matrix4<f64>) -> Result<()> {
    let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let normal_matrix = linear
        .try_inverse()
        .ok_or_else(|| MeshError::invalid_param("matrix", "singular", "linear part must be invertible"))?
        .transpose();

    let ids = mesh.vertex_ids().to_vec();
    let view: &Mesh = mesh;
    let moved: Vec<VertexAttributes> = ids
        .par_iter()
        .map(|&v| {
            let mut a = view.attributes(v).clone();
            a.position = matrix.transform_point(&a.position);
            a.normal = unit_or_zero(normal_matrix * a.normal);
            a.tangent = unit_or_zero(linear * a.tangent);
            a.morph_position = a.morph_position.map(|p| matrix.transform_point(&p));
            a.morph_normal = a.morph_normal.map(|n| unit_or_zero(normal_matrix * n));
            a
        })
        .collect();

    for (v, attributes) in ids.into_iter().zip(moved) {
        *mesh.attributes_mut(v) = attributes;
    }
    for t in mesh.triangle_ids().to_vec() {
        mesh.update_triangle_geometry(t);
    }
    Ok(())
}

/// Scale the corners of a triangle about its center.
///
/// Neighboring triangles follow the moved corners.
pub fn homothety(mesh: &mut Mesh, t: TriangleId, scale: f64) -> Result<()> {
    mesh.try_triangle(t)?;
    let center = mesh.compute_triangle_geometry(t).center;
    for v in mesh.triangle_vertices(t) {
        let p = *mesh.position(v);
        mesh.set_position(v, center + (p - center) * scale);
    }
    Ok(())
}

// ==================== Bevel ====================

/// Replace a vertex with a flat facet.
///
/// The cut plane is perpendicular to `axis` (the area-weighted normal of the
/// incident triangles when `None`) at depth `amount` below the vertex. One
/// vertex is created on every incident edge, where it crosses the plane;
/// every incident triangle becomes a quad and the facet is filled by ear
/// clipping. Returns the facet border, counterclockwise around the axis.
///
/// A vertex with fewer than 3 incident triangles is left alone and an empty
/// border is returned.
///
/// # Errors
/// - [`MeshError::InvalidParameter`] when `amount` is not positive, the axis
///   is zero, or the plane does not cross every incident edge
/// - [`MeshError::PolygonTriangulation`] when the facet cannot be ear
///   clipped around the axis, as with a fan folded over itself
///
/// The mesh is unchanged on error.
pub fn bevel_vertex(
    mesh: &mut Mesh,
    v: VertexId,
    amount: f64,
    axis: Option<Vector3<f64>>,
) -> Result<Vec<VertexId>> {
    mesh.try_vertex(v)?;
    if !(amount > 0.0 && amount.is_finite()) {
        return Err(MeshError::invalid_param("amount", amount, "must be positive"));
    }

    let triangles = mesh.triangles_ordered_around(v);
    if triangles.len() < 3 {
        debug!(vertex = v.index(), triangles = triangles.len(), "Vertex too sparse to bevel");
        return Ok(Vec::new());
    }

    let axis = unit_or_zero(axis.unwrap_or_else(|| average_normal(mesh, &triangles)));
    if axis == Vector3::zeros() {
        return Err(MeshError::invalid_param("axis", "zero", "need a direction"));
    }

    // (triangle, a, b) with the triangle read as (v, a, b)
    let fans: Vec<(TriangleId, VertexId, VertexId)> = triangles
        .iter()
        .map(|&t| {
            let [x, y, z] = mesh.triangle_vertices(t);
            let (a, b) = if x == v {
                (y, z)
            } else if y == v {
                (z, x)
            } else {
                (x, y)
            };
            (t, a, b)
        })
        .collect();

    let p = *mesh.position(v);
    let mut depth: HashMap<VertexId, f64> = HashMap::new();
    for &(_, a, b) in &fans {
        for n in [a, b] {
            let d = axis.dot(&(p - mesh.position(n)));
            if d <= amount {
                return Err(MeshError::invalid_param(
                    "amount",
                    amount,
                    "cut plane misses an incident edge",
                ));
            }
            depth.insert(n, d);
        }
    }

    let border = mesh.transaction(|mesh| {
        let mut border = Vec::with_capacity(depth.len());
        let mut cut: HashMap<VertexId, VertexId> = HashMap::with_capacity(depth.len());
        let mut cut_point = |mesh: &mut Mesh, n: VertexId| {
            *cut.entry(n).or_insert_with(|| {
                let name = mid_name(mesh.vertex(v).name(), mesh.vertex(n).name());
                let attributes =
                    VertexAttributes::lerp(mesh.attributes(v), mesh.attributes(n), amount / depth[&n]);
                let m = mesh.add_vertex_with(name, attributes);
                border.push(m);
                m
            })
        };

        for &(t, a, b) in &fans {
            let ma = cut_point(mesh, a);
            let mb = cut_point(mesh, b);
            mesh.delete_triangle(t)?;
            mesh.add_quad(a, b, mb, ma)?;
        }

        mesh.delete_vertex(v)?;
        mesh.add_polygon(&border, &axis)?;
        Ok(border)
    })?;
    mesh.compute_normals();

    debug!(vertex = v.index(), facet = border.len(), amount, "Beveled vertex");
    Ok(border)
}

// ==================== Border operations ====================

/// Clone every vertex of `border` for the triangles on its left.
///
/// The region inside the border is detached from the rest of the mesh along
/// the border, leaving a crease that normals do not smooth across. Clones
/// are named after their source with a `clone` suffix. Returns the clones in
/// border order. The mesh is unchanged on error.
pub fn split_border(mesh: &mut Mesh, border: &[VertexId]) -> Result<Vec<VertexId>> {
    let inside = triangles_inside_border(mesh, border)?;
    let clones = mesh.transaction(|mesh| clone_border(mesh, border, &inside))?;
    debug!(border = border.len(), triangles = inside.len(), "Split border");
    Ok(clones)
}

fn clone_border(mesh: &mut Mesh, border: &[VertexId], inside: &[TriangleId]) -> Result<Vec<VertexId>> {
    let mut clones = Vec::with_capacity(border.len());
    for &b in border {
        let clone = mesh.clone_vertex(b, "clone")?;
        for &t in inside {
            if mesh.triangle_contains(t, b) {
                mesh.replace_vertex(t, b, clone)?;
            }
        }
        clones.push(clone);
    }
    Ok(clones)
}

/// Raise the region inside a closed border by `height`.
///
/// The border is a loop of vertices with the region on its left. The region
/// moves along its area-weighted average normal, the border vertices are
/// cloned to form its new rim, and a quad `(a, b, b', a')` joins every border
/// edge `a -> b` to its raised copy. Returns the clones in border order.
///
/// # Errors
/// [`MeshError::BrokenBorder`] if two successive border vertices are not
/// joined by a half-edge. The mesh is unchanged on error.
pub fn extrude_polygon(mesh: &mut Mesh, border: &[VertexId], height: f64) -> Result<Vec<VertexId>> {
    if !height.is_finite() {
        return Err(MeshError::invalid_param("height", height, "must be finite"));
    }
    let inside = triangles_inside_border(mesh, border)?;
    let direction = average_normal(mesh, &inside);

    let n = border.len();
    let clones = mesh.transaction(|mesh| {
        let clones = clone_border(mesh, border, &inside)?;
        for u in vertices_of(mesh, &inside) {
            let p = *mesh.position(u);
            mesh.attributes_mut(u).position = p + direction * height;
        }
        for i in 0..n {
            let j = (i + 1) % n;
            mesh.add_quad(border[i], border[j], clones[j], clones[i])?;
        }
        Ok(clones)
    })?;
    mesh.compute_normals();

    info!(
        border = n,
        triangles = inside.len(),
        height,
        "Extruded polygon"
    );
    Ok(clones)
}

/// Raise a single triangle along its normal by `distance`, with three side
/// quads. Returns the raised corners.
pub fn extrude_triangle(mesh: &mut Mesh, t: TriangleId, distance: f64) -> Result<[VertexId; 3]> {
    mesh.try_triangle(t)?;
    let corners = mesh.triangle_vertices(t);
    let clones = extrude_polygon(mesh, &corners, distance)?;
    Ok([clones[0], clones[1], clones[2]])
}
