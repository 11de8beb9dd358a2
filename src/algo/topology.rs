//! Parametric grid topologies.
//!
//! These generators create the vertices and triangles of regular grids and
//! return the position of their first vertex in the mesh's vertex list, so
//! that grid vertex `(i, j)` is `mesh.vertex_at(first + i + j * nu)`.
//!
//! Vertices are laid out on the XZ plane (grid coordinates for the
//! rectangular surface, staggered rows for the hexagonal one, unit-spaced
//! rings for the revolution surface). Callers move them to their final
//! positions, as [`shapes`](super::shapes) does.
//!
//! Name patterns replace successive `%d` with the grid indices: `"P%d-%d"`
//! names vertex `(3, 4)` `"P3-4"`.

use std::f64::consts::PI;

use nalgebra::Point3;
use tracing::{debug, warn};

use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, VertexId};

/// Replace the successive `%d` of `pattern` with `values`.
pub fn format_name(pattern: &str, values: &[&dyn std::fmt::Display]) -> String {
    values.iter().fold(pattern.to_string(), |name, value| {
        name.replacen("%d", &value.to_string(), 1)
    })
}

fn check_grid(nu: usize, nv: usize, close_u: bool, close_v: bool) -> Result<()> {
    if nu < 2 || (close_u && nu < 3) {
        return Err(MeshError::invalid_param(
            "nu",
            nu,
            "need 2 columns, 3 when closed",
        ));
    }
    if nv < 2 || (close_v && nv < 3) {
        return Err(MeshError::invalid_param("nv", nv, "need 2 rows, 3 when closed"));
    }
    Ok(())
}

/// Add `nu * nv` grid vertices named after `name_pattern`, at positions
/// given by `place(i, j)`.
fn add_grid_vertices(
    mesh: &mut Mesh,
    nu: usize,
    nv: usize,
    name_pattern: &str,
    place: impl Fn(usize, usize) -> Point3<f64>,
) -> Vec<VertexId> {
    let mut ids = Vec::with_capacity(nu * nv);
    for j in 0..nv {
        for i in 0..nu {
            ids.push(mesh.add_vertex_at(format_name(name_pattern, &[&i, &j]), place(i, j)));
        }
    }
    ids
}

/// Number of cells along a direction of `n` vertices.
#[inline]
fn cells(n: usize, closed: bool) -> usize {
    if closed {
        n
    } else {
        n - 1
    }
}

/// Add a rectangular grid of `nu × nv` vertices.
///
/// Every cell is a quad `(v00, v01, v11, v10)`. With `close_u` the last
/// column is stitched to the first one; with `close_v` the last row is
/// stitched to the first one (a cylinder, or a torus with both).
///
/// Triangle count is `2 * cu * cv` where `cu` is `nu` when closed in U and
/// `nu - 1` otherwise, likewise for `cv`.
///
/// # Errors
/// [`MeshError::InvalidParameter`] if `nu` or `nv` is below 2, or below 3
/// in a closed direction.
pub fn add_rectangular_surface(
    mesh: &mut Mesh,
    nu: usize,
    nv: usize,
    name_pattern: &str,
    close_u: bool,
    close_v: bool,
) -> Result<usize> {
    check_grid(nu, nv, close_u, close_v)?;
    let first = mesh.vertex_count();
    let ids = add_grid_vertices(mesh, nu, nv, name_pattern, |i, j| {
        Point3::new(i as f64, 0.0, j as f64)
    });
    let at = |i: usize, j: usize| ids[i % nu + (j % nv) * nu];

    for j in 0..cells(nv, close_v) {
        for i in 0..cells(nu, close_u) {
            mesh.add_quad(at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j))?;
        }
    }

    debug!(
        nu,
        nv,
        close_u,
        close_v,
        triangles = 2 * cells(nu, close_u) * cells(nv, close_v),
        "Added rectangular surface"
    );
    Ok(first)
}

/// Add a hexagonal grid of `nu × nv` vertices.
///
/// Odd rows are shifted by half a step, so that every inner vertex has six
/// neighbors. Triangle counts are those of [`add_rectangular_surface`].
/// Closing in V only lines up when `nv` is even; an odd `nv` is accepted
/// with a warning.
pub fn add_hexagonal_surface(
    mesh: &mut Mesh,
    nu: usize,
    nv: usize,
    name_pattern: &str,
    close_u: bool,
    close_v: bool,
) -> Result<usize> {
    check_grid(nu, nv, close_u, close_v)?;
    if close_v && nv % 2 == 1 {
        warn!(nv, "Closing a hexagonal surface with an odd row count shears the seam");
    }

    let first = mesh.vertex_count();
    let row_height = 3f64.sqrt() / 2.0;
    let ids = add_grid_vertices(mesh, nu, nv, name_pattern, |i, j| {
        Point3::new(i as f64 - 0.5 * (j % 2) as f64, 0.0, j as f64 * row_height)
    });
    let at = |i: usize, j: usize| ids[i % nu + (j % nv) * nu];

    for j in 0..cells(nv, close_v) {
        for i in 0..cells(nu, close_u) {
            let (v00, v01, v10, v11) = (at(i, j), at(i, j + 1), at(i + 1, j), at(i + 1, j + 1));
            if j % 2 == 0 {
                mesh.add_triangle(v00, v01, v11)?;
                mesh.add_triangle(v00, v11, v10)?;
            } else {
                mesh.add_triangle(v00, v01, v10)?;
                mesh.add_triangle(v10, v01, v11)?;
            }
        }
    }

    debug!(nu, nv, close_u, close_v, "Added hexagonal surface");
    Ok(first)
}

/// Add a disk of `spokes` rays with `segments` vertices each around a
/// center vertex.
///
/// The center comes first, named after `name_pattern` with its first two
/// `%d` replaced by `C`. Ring vertex `(r, s)` follows at `first + 1 + r *
/// segments + s`, at distance `s + 1` from the center. The innermost ring is
/// a fan of triangles around the center, outer rings are quads.
///
/// Creates `1 + spokes * segments` vertices and
/// `spokes * (2 * segments - 1)` triangles. With no segment only the
/// center is added.
pub fn add_revolution_surface(
    mesh: &mut Mesh,
    spokes: usize,
    segments: usize,
    name_pattern: &str,
) -> Result<usize> {
    if spokes < 3 {
        return Err(MeshError::invalid_param("spokes", spokes, "need at least 3"));
    }

    let first = mesh.vertex_count();
    let center = mesh.add_vertex_at(name_pattern.replacen("%d", "C", 2), Point3::origin());
    if segments == 0 {
        return Ok(first);
    }

    let mut ring = Vec::with_capacity(spokes * segments);
    for r in 0..spokes {
        let angle = r as f64 / spokes as f64 * 2.0 * PI;
        for s in 0..segments {
            let radius = (s + 1) as f64;
            ring.push(mesh.add_vertex_at(
                format_name(name_pattern, &[&r, &s]),
                Point3::new(radius * angle.cos(), 0.0, radius * angle.sin()),
            ));
        }
    }
    let at = |r: usize, s: usize| ring[(r % spokes) * segments + s];

    for r in 0..spokes {
        mesh.add_triangle(center, at(r, 0), at(r + 1, 0))?;
        for s in 0..segments - 1 {
            mesh.add_quad(at(r, s), at(r, s + 1), at(r + 1, s + 1), at(r + 1, s))?;
        }
    }

    debug!(spokes, segments, "Added revolution surface");
    Ok(first)
}
