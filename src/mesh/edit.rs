//! Construction and editing of a [`Mesh`].
//!
//! Every operation that builds topology validates its input before touching
//! the mesh: on error the mesh is left as it was.

use std::collections::HashSet;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::halfedge::{HalfEdge, Mesh};
use super::index::{next_mesh_tag, HalfEdgeId, TriangleId, VertexId};
use super::triangle::{Triangle, TriangleGeometry};
use super::vertex::{unit_or_zero, Vertex, VertexAttributes};
use crate::error::{MeshError, Result};

impl Mesh {
    // ==================== Vertices ====================

    /// Add a new vertex at the origin and return its id.
    pub fn add_vertex(&mut self, name: impl Into<String>) -> VertexId {
        self.add_vertex_with(name, VertexAttributes::default())
    }

    /// Add a new vertex at the given position.
    pub fn add_vertex_at(&mut self, name: impl Into<String>, position: Point3<f64>) -> VertexId {
        self.add_vertex_with(name, VertexAttributes::at(position))
    }

    /// Add a new vertex with all of its attributes.
    pub fn add_vertex_with(
        &mut self,
        name: impl Into<String>,
        attributes: VertexAttributes,
    ) -> VertexId {
        let id = VertexId::new(self.tag, self.vertices.len());
        self.vertices.push(Some(Vertex::new(name.into(), attributes)));
        self.vertex_list.push(id);
        self.live_vertices += 1;
        id
    }

    /// Add a copy of a vertex's attributes, named after it with `suffix`.
    pub fn clone_vertex(&mut self, v: VertexId, suffix: &str) -> Result<VertexId> {
        let source = self.try_vertex(v)?;
        let name = format!("{}{}", source.name, suffix);
        let attributes = source.attributes.clone();
        Ok(self.add_vertex_with(name, attributes))
    }

    /// Delete a vertex and every triangle using it.
    pub fn delete_vertex(&mut self, v: VertexId) -> Result<()> {
        self.try_vertex(v)?;
        for t in self.triangles_around(v) {
            self.remove_triangle(t);
        }
        self.vertices[v.index()] = None;
        self.live_vertices -= 1;
        if !self.deferred {
            self.vertex_list.retain(|&x| x != v);
        }
        Ok(())
    }

    // ==================== Triangles ====================

    /// Add a triangle `(v0, v1, v2)`, counterclockwise around its normal.
    ///
    /// # Errors
    /// - [`MeshError::InvalidReference`] if a vertex is foreign or deleted
    /// - [`MeshError::DegenerateTriangle`] if a vertex is repeated
    /// - [`MeshError::NonManifoldEdge`] if a directed edge is already used,
    ///   or its reverse is already shared by two triangles
    ///
    /// Zero-area triangles are accepted; their normal and area are zero.
    pub fn add_triangle(&mut self, v0: VertexId, v1: VertexId, v2: VertexId) -> Result<TriangleId> {
        self.validate_triangle(v0, v1, v2)?;

        let t = TriangleId::new(self.tag, self.triangles.len());
        let base = self.halfedges.len();
        let tag = self.tag;
        let ids = [0, 1, 2].map(|k| HalfEdgeId::new(tag, base + k));
        let corners = [v0, v1, v2];

        for k in 0..3 {
            self.halfedges.push(Some(HalfEdge {
                origin: corners[k],
                triangle: t,
                next: ids[(k + 1) % 3],
                opposite: None,
                sibling: None,
            }));
        }

        let geometry = TriangleGeometry::from_points(
            self.position(v0),
            self.position(v1),
            self.position(v2),
        );
        self.triangles.push(Some(Triangle::new(ids[0], geometry)));
        self.triangle_list.push(t);
        self.live_triangles += 1;

        for k in 0..3 {
            self.link_sibling(ids[k], corners[k]);
        }
        for he in ids {
            self.pair_opposite(he);
        }

        Ok(t)
    }

    /// Add a quad as the two triangles `(v0, v1, v2)` and `(v0, v2, v3)`,
    /// sharing the diagonal v0–v2.
    pub fn add_quad(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
        v3: VertexId,
    ) -> Result<[TriangleId; 2]> {
        if let Some(v) = first_repeated(&[v0, v1, v2, v3]) {
            self.try_vertex(v)?;
            return Err(MeshError::DegenerateTriangle { vertex: v.index() });
        }

        let t0 = self.add_triangle(v0, v1, v2)?;
        match self.add_triangle(v0, v2, v3) {
            Ok(t1) => Ok([t0, t1]),
            Err(e) => {
                self.remove_triangle(t0);
                Err(e)
            }
        }
    }

    /// Add a convex polygon as a fan of triangles around its first vertex.
    pub fn add_polygon_convex(&mut self, vertices: &[VertexId]) -> Result<Vec<TriangleId>> {
        if vertices.len() < 3 {
            return Err(MeshError::PolygonTriangulation {
                remaining: vertices.len(),
            });
        }

        let mut added = Vec::with_capacity(vertices.len() - 2);
        for i in 1..vertices.len() - 1 {
            match self.add_triangle(vertices[0], vertices[i], vertices[i + 1]) {
                Ok(t) => added.push(t),
                Err(e) => {
                    self.remove_triangles(&added);
                    return Err(e);
                }
            }
        }
        Ok(added)
    }

    /// Add a simple polygon by ear clipping.
    ///
    /// The vertices must turn counterclockwise around `normal`, which only
    /// needs to be roughly perpendicular to the polygon.
    ///
    /// # Errors
    /// [`MeshError::PolygonTriangulation`] when no ear can be found, plus the
    /// errors of [`Mesh::add_triangle`]. Nothing is added on error.
    pub fn add_polygon(
        &mut self,
        vertices: &[VertexId],
        normal: &Vector3<f64>,
    ) -> Result<Vec<TriangleId>> {
        if vertices.len() < 3 {
            return Err(MeshError::PolygonTriangulation {
                remaining: vertices.len(),
            });
        }
        for &v in vertices {
            self.try_vertex(v)?;
        }

        let mut remaining = vertices.to_vec();
        let mut added = Vec::with_capacity(vertices.len() - 2);

        while remaining.len() >= 3 {
            let ear = self
                .find_ear(&remaining, normal, true)
                .or_else(|| self.find_ear(&remaining, normal, false));

            let Some(i) = ear else {
                self.remove_triangles(&added);
                return Err(MeshError::PolygonTriangulation {
                    remaining: remaining.len(),
                });
            };

            let n = remaining.len();
            let (a, b, c) = (remaining[i], remaining[(i + 1) % n], remaining[(i + 2) % n]);
            match self.add_triangle(a, b, c) {
                Ok(t) => added.push(t),
                Err(e) => {
                    self.remove_triangles(&added);
                    return Err(e);
                }
            }
            remaining.remove((i + 1) % n);
        }

        Ok(added)
    }

    /// Delete a triangle. Its vertices stay in the mesh.
    pub fn delete_triangle(&mut self, t: TriangleId) -> Result<()> {
        self.try_triangle(t)?;
        self.remove_triangle(t);
        Ok(())
    }

    /// Replace corner `old` of triangle `t` by `new`, keeping the triangle id.
    pub fn replace_vertex(&mut self, t: TriangleId, old: VertexId, new: VertexId) -> Result<()> {
        self.try_triangle(t)?;
        self.try_vertex(new)?;

        let corners = self.triangle_vertices(t);
        let Some(k) = corners.iter().position(|&v| v == old) else {
            return Err(MeshError::InvalidReference {
                kind: "vertex",
                index: old.index(),
            });
        };
        if new == old {
            return Ok(());
        }
        if corners.contains(&new) {
            return Err(MeshError::DegenerateTriangle { vertex: new.index() });
        }

        let a = corners[(k + 1) % 3];
        let b = corners[(k + 2) % 3];
        for (from, to) in [(new, a), (b, new)] {
            if self.halfedge_to(from, to).is_some() {
                return Err(MeshError::NonManifoldEdge {
                    from: from.index(),
                    to: to.index(),
                });
            }
        }

        let hes = self.triangle_halfedges(t);
        let outgoing = hes[k];
        let incoming = hes[(k + 2) % 3];

        self.unpair_opposite(outgoing);
        self.unpair_opposite(incoming);
        self.unlink_sibling(outgoing, old);
        self.halfedge_mut(outgoing).origin = new;
        self.link_sibling(outgoing, new);
        self.pair_opposite(outgoing);
        self.pair_opposite(incoming);

        self.update_triangle_geometry(t);
        Ok(())
    }

    /// Rotate the corners of `t` so that `v` comes first, keeping the winding.
    pub fn cycle_vertex_first(&mut self, t: TriangleId, v: VertexId) -> Result<()> {
        self.try_triangle(t)?;
        let Some(he) = self
            .triangle_halfedges(t)
            .into_iter()
            .find(|&he| self.origin(he) == v)
        else {
            return Err(MeshError::InvalidReference {
                kind: "vertex",
                index: v.index(),
            });
        };
        self.triangle_mut(t).halfedge = he;
        Ok(())
    }

    /// Release every element. Ids issued before are rejected afterwards.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.halfedges.clear();
        self.vertex_list.clear();
        self.triangle_list.clear();
        self.live_vertices = 0;
        self.live_triangles = 0;
        self.tag = next_mesh_tag();
    }

    // ==================== Batches ====================

    /// Run `edit`, restoring the mesh as it was if it fails.
    ///
    /// Ids issued before the call stay valid after a rollback.
    pub(crate) fn transaction<T>(&mut self, edit: impl FnOnce(&mut Mesh) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let result = edit(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    /// Run `edit` with the ordered lists compacted once at the end instead
    /// of after every deletion.
    ///
    /// Inside `edit`, [`Mesh::vertex_ids`], [`Mesh::triangle_ids`] and the
    /// positional accessors may still list deleted elements. Counts and
    /// navigation are exact.
    pub(crate) fn with_deferred_compaction<T>(&mut self, edit: impl FnOnce(&mut Mesh) -> T) -> T {
        let outer = std::mem::replace(&mut self.deferred, true);
        let result = edit(self);
        self.deferred = outer;
        if !outer {
            self.compact_lists();
        }
        result
    }

    fn compact_lists(&mut self) {
        let vertices = &self.vertices;
        self.vertex_list.retain(|v| vertices[v.index()].is_some());
        let triangles = &self.triangles;
        self.triangle_list.retain(|t| triangles[t.index()].is_some());
    }

    // ==================== Normals ====================

    /// Recompute triangle geometry and vertex normals.
    ///
    /// A vertex normal is the area-weighted average of the normals of the
    /// triangles around it. Vertices without triangles, or whose triangles
    /// are all degenerate, get a zero normal.
    pub fn compute_normals(&mut self) {
        let geometries: Vec<(TriangleId, TriangleGeometry)> = self
            .triangle_list
            .par_iter()
            .map(|&t| (t, self.compute_triangle_geometry(t)))
            .collect();

        let mut sums = vec![Vector3::zeros(); self.vertices.len()];
        for (t, geometry) in geometries {
            for v in self.triangle_vertices(t) {
                sums[v.index()] += geometry.normal * geometry.area;
            }
            self.triangle_mut(t).geometry = geometry;
        }

        for i in 0..self.vertex_list.len() {
            let v = self.vertex_list[i];
            self.vertex_mut(v).attributes.normal = unit_or_zero(sums[v.index()]);
        }
    }

    /// Compute triangle and vertex tangents from texture coordinates.
    ///
    /// Vertex tangents are made orthogonal to the vertex normals, so call
    /// [`Mesh::compute_normals`] first.
    pub fn compute_tangents(&mut self) {
        let tangents: Vec<(TriangleId, Vector3<f64>, f64)> = self
            .triangle_list
            .iter()
            .map(|&t| {
                let [v0, v1, v2] = self.triangle_vertices(t);
                let (a0, a1, a2) = (self.attributes(v0), self.attributes(v1), self.attributes(v2));
                let e1 = a1.position - a0.position;
                let e2 = a2.position - a0.position;
                let d1 = a1.texcoord - a0.texcoord;
                let d2 = a2.texcoord - a0.texcoord;
                let r = d1.x * d2.y - d2.x * d1.y;
                let tangent = if r.abs() < 1e-12 {
                    Vector3::zeros()
                } else {
                    unit_or_zero((e1 * d2.y - e2 * d1.y) / r)
                };
                (t, tangent, 0.5 * e1.cross(&e2).norm())
            })
            .collect();

        let mut sums = vec![Vector3::zeros(); self.vertices.len()];
        for (t, tangent, area) in tangents {
            for v in self.triangle_vertices(t) {
                sums[v.index()] += tangent * area;
            }
            self.triangle_mut(t).tangent = tangent;
        }

        for i in 0..self.vertex_list.len() {
            let v = self.vertex_list[i];
            let attributes = &mut self.vertex_mut(v).attributes;
            let n = attributes.normal;
            let t = sums[v.index()];
            attributes.tangent = unit_or_zero(t - n * n.dot(&t));
        }
    }

    // ==================== Internals ====================

    fn validate_triangle(&self, v0: VertexId, v1: VertexId, v2: VertexId) -> Result<()> {
        for v in [v0, v1, v2] {
            self.try_vertex(v)?;
        }
        if let Some(v) = first_repeated(&[v0, v1, v2]) {
            return Err(MeshError::DegenerateTriangle { vertex: v.index() });
        }
        for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
            let reverse_shared = self
                .halfedge_to(b, a)
                .is_some_and(|he| self.opposite(he).is_some());
            if self.halfedge_to(a, b).is_some() || reverse_shared {
                return Err(MeshError::NonManifoldEdge {
                    from: a.index(),
                    to: b.index(),
                });
            }
        }
        Ok(())
    }

    /// Remove a live triangle and its half-edges.
    pub(crate) fn remove_triangle(&mut self, t: TriangleId) {
        let hes = self.triangle_halfedges(t);
        for he in hes {
            self.unpair_opposite(he);
            let origin = self.origin(he);
            self.unlink_sibling(he, origin);
        }
        for he in hes {
            self.halfedges[he.index()] = None;
        }
        self.triangles[t.index()] = None;
        self.live_triangles -= 1;
        if !self.deferred {
            self.triangle_list.retain(|&x| x != t);
        }
    }

    fn remove_triangles(&mut self, triangles: &[TriangleId]) {
        for &t in triangles.iter().rev() {
            self.remove_triangle(t);
        }
    }

    pub(crate) fn link_sibling(&mut self, he: HalfEdgeId, v: VertexId) {
        let head = self.vertex(v).halfedge;
        self.halfedge_mut(he).sibling = head;
        self.vertex_mut(v).halfedge = Some(he);
    }

    pub(crate) fn unlink_sibling(&mut self, he: HalfEdgeId, v: VertexId) {
        let sibling = self.halfedge(he).sibling;
        if self.vertex(v).halfedge == Some(he) {
            self.vertex_mut(v).halfedge = sibling;
        } else {
            let mut current = self.vertex(v).halfedge;
            while let Some(c) = current {
                let next = self.halfedge(c).sibling;
                if next == Some(he) {
                    self.halfedge_mut(c).sibling = sibling;
                    break;
                }
                current = next;
            }
        }
        self.halfedge_mut(he).sibling = None;
    }

    /// Pair `he` with the reverse half-edge, when one exists and is free.
    fn pair_opposite(&mut self, he: HalfEdgeId) {
        let (a, b) = (self.origin(he), self.target(he));
        if let Some(reverse) = self.halfedge_to(b, a) {
            if self.opposite(reverse).is_none() {
                self.halfedge_mut(reverse).opposite = Some(he);
                self.halfedge_mut(he).opposite = Some(reverse);
            }
        }
    }

    fn unpair_opposite(&mut self, he: HalfEdgeId) {
        if let Some(o) = self.halfedge_mut(he).opposite.take() {
            self.halfedge_mut(o).opposite = None;
        }
    }

    fn find_ear(&self, polygon: &[VertexId], normal: &Vector3<f64>, strict: bool) -> Option<usize> {
        let n = polygon.len();
        (0..n).find(|&i| {
            let (a, b, c) = (polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
            let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
            let turn = (pb - pa).cross(&(pc - pb)).dot(normal);
            let convex = if strict { turn > 1e-12 } else { turn >= 0.0 };
            if !convex {
                return false;
            }
            !polygon.iter().any(|&p| {
                p != a && p != b && p != c && point_in_triangle(self.position(p), pa, pb, pc, normal)
            })
        })
    }
}

/// Inside test of `p` against triangle `(a, b, c)` seen along `normal`.
///
/// Points on an edge count as inside, so that a diagonal never runs through
/// another polygon vertex.
fn point_in_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    [(a, b), (b, c), (c, a)]
        .iter()
        .all(|(from, to)| normal.cross(&(*to - *from)).dot(&(p - *from)) >= -1e-12)
}

fn first_repeated(vertices: &[VertexId]) -> Option<VertexId> {
    let mut seen = HashSet::with_capacity(vertices.len());
    vertices.iter().copied().find(|&v| !seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_quad() -> (Mesh, [VertexId; 4]) {
        let mut mesh = Mesh::new("quad");
        let v = [
            mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0)),
            mesh.add_vertex_at("b", Point3::new(0.0, 0.0, 1.0)),
            mesh.add_vertex_at("c", Point3::new(1.0, 0.0, 1.0)),
            mesh.add_vertex_at("d", Point3::new(1.0, 0.0, 0.0)),
        ];
        (mesh, v)
    }

    #[test]
    fn test_add_triangle_links() {
        let (mut mesh, v) = flat_quad();
        let t = mesh.add_triangle(v[0], v[1], v[2]).unwrap();
        assert_eq!(mesh.triangle_vertices(t), [v[0], v[1], v[2]]);
        for he in mesh.triangle_halfedges(t) {
            assert_eq!(mesh.next(mesh.next(mesh.next(he))), he);
            assert!(mesh.is_boundary_halfedge(he));
        }
        assert_relative_eq!(*mesh.triangle(t).normal(), Vector3::y());
        assert_relative_eq!(mesh.triangle(t).area(), 0.5);
    }

    #[test]
    fn test_add_quad_shares_diagonal() {
        let (mut mesh, v) = flat_quad();
        let [t0, t1] = mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();
        assert_eq!(mesh.triangle_vertices(t0), [v[0], v[1], v[2]]);
        assert_eq!(mesh.triangle_vertices(t1), [v[0], v[2], v[3]]);

        let diagonal = mesh.halfedge_to(v[2], v[0]).unwrap();
        let reverse = mesh.halfedge_to(v[0], v[2]).unwrap();
        assert_eq!(mesh.opposite(diagonal), Some(reverse));
        assert_eq!(mesh.triangle_of(diagonal), t0);
        assert_eq!(mesh.triangle_of(reverse), t1);
        assert_eq!(mesh.boundary_halfedge_count(), 4);
    }

    #[test]
    fn test_flat_quad_normals() {
        let (mut mesh, v) = flat_quad();
        mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();
        mesh.compute_normals();
        for id in v {
            assert_relative_eq!(*mesh.vertex(id).normal(), Vector3::y(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_isolated_vertex_normal_is_zero() {
        let (mut mesh, v) = flat_quad();
        mesh.add_triangle(v[0], v[1], v[2]).unwrap();
        mesh.compute_normals();
        assert_eq!(*mesh.vertex(v[3]).normal(), Vector3::zeros());
    }

    #[test]
    fn test_degenerate_triangle_is_tolerated() {
        let mut mesh = Mesh::new("line");
        let a = mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex_at("b", Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex_at("c", Point3::new(2.0, 0.0, 0.0));
        let t = mesh.add_triangle(a, b, c).unwrap();
        mesh.compute_normals();
        assert_eq!(mesh.triangle(t).area(), 0.0);
        assert_eq!(*mesh.triangle(t).normal(), Vector3::zeros());
        assert_eq!(*mesh.vertex(a).normal(), Vector3::zeros());
    }

    #[test]
    fn test_rejects_repeated_vertex() {
        let (mut mesh, v) = flat_quad();
        let err = mesh.add_triangle(v[0], v[1], v[0]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateTriangle { .. }));
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_rejects_foreign_vertex() {
        let (mut mesh, v) = flat_quad();
        let mut other = Mesh::new("other");
        let w = other.add_vertex("w");
        let err = mesh.add_triangle(v[0], v[1], w).unwrap_err();
        assert!(matches!(err, MeshError::InvalidReference { kind: "vertex", .. }));
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.valence(v[0]), 0);
    }

    #[test]
    fn test_rejects_duplicate_directed_edge() {
        let (mut mesh, v) = flat_quad();
        mesh.add_triangle(v[0], v[1], v[2]).unwrap();
        let err = mesh.add_triangle(v[0], v[1], v[3]).unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldEdge { .. }));
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.valence(v[3]), 0);
    }

    #[test]
    fn test_rejects_third_triangle_on_edge() {
        let mut mesh = Mesh::new("fin");
        let a = mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex_at("b", Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex_at("c", Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex_at("d", Point3::new(0.0, -1.0, 0.0));
        let e = mesh.add_vertex_at("e", Point3::new(0.0, 0.0, 1.0));
        mesh.add_triangle(a, b, c).unwrap();
        mesh.add_triangle(b, a, d).unwrap();
        let err = mesh.add_triangle(b, a, e).unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldEdge { .. }));
    }

    #[test]
    fn test_failed_quad_leaves_mesh_unchanged() {
        let (mut mesh, v) = flat_quad();
        mesh.add_triangle(v[0], v[2], v[1]).unwrap();
        let before = mesh.triangle_count();
        // (v0, v1, v2) is fine but (v0, v2, v3) reuses the edge v0 -> v2
        assert!(mesh.add_quad(v[0], v[1], v[2], v[3]).is_err());
        assert_eq!(mesh.triangle_count(), before);
        assert_eq!(mesh.valence(v[3]), 0);
        assert_eq!(mesh.boundary_halfedge_count(), 3);
    }

    #[test]
    fn test_add_polygon_concave() {
        // L-shaped hexagon in the XZ plane, counterclockwise seen from +Y
        let mut mesh = Mesh::new("L");
        let coords = [
            (0.0, 0.0),
            (0.0, 2.0),
            (2.0, 2.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
        ];
        let ids: Vec<VertexId> = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, z))| mesh.add_vertex_at(format!("p{i}"), Point3::new(x, 0.0, z)))
            .collect();
        let tris = mesh.add_polygon(&ids, &Vector3::y()).unwrap();
        assert_eq!(tris.len(), 4);
        assert_relative_eq!(mesh.surface_area(), 3.0, epsilon = 1e-12);
        for t in tris {
            assert!(mesh.triangle(t).normal().y > 0.0);
        }
    }

    #[test]
    fn test_add_polygon_wrong_orientation_fails() {
        let mut mesh = Mesh::new("square");
        let ids: Vec<VertexId> = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
            .iter()
            .map(|&(x, z)| mesh.add_vertex_at("p", Point3::new(x, 0.0, z)))
            .collect();
        let err = mesh.add_polygon(&ids, &-Vector3::y()).unwrap_err();
        assert!(matches!(err, MeshError::PolygonTriangulation { remaining: 4 }));
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_polygon_convex_fan() {
        let (mut mesh, v) = flat_quad();
        let tris = mesh.add_polygon_convex(&v).unwrap();
        assert_eq!(tris.len(), 2);
        assert!(mesh.add_polygon_convex(&v[..2]).is_err());
    }

    #[test]
    fn test_delete_vertex_removes_triangles() {
        let (mut mesh, v) = flat_quad();
        mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();
        mesh.delete_vertex(v[1]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_at(1), Some(v[2]));
        assert!(mesh.get_vertex(v[1]).is_none());
        // the remaining triangle is now alone
        assert_eq!(mesh.boundary_halfedge_count(), 3);
        assert!(mesh.delete_vertex(v[1]).is_err());
    }

    #[test]
    fn test_replace_vertex_repairs_opposites() {
        let (mut mesh, v) = flat_quad();
        let [t0, t1] = mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();
        let e = mesh.add_vertex_at("e", Point3::new(1.0, 0.0, -1.0));

        mesh.replace_vertex(t1, v[0], e).unwrap();
        assert_eq!(mesh.triangle_vertices(t1), [e, v[2], v[3]]);
        // t0 and t1 no longer share an edge
        assert_eq!(mesh.boundary_halfedge_count(), 6);
        assert!(mesh.halfedge_to(v[0], v[2]).is_none());

        mesh.replace_vertex(t1, e, v[0]).unwrap();
        assert_eq!(mesh.boundary_halfedge_count(), 4);
        assert!(mesh.triangle_contains(t0, v[0]));
    }

    #[test]
    fn test_cycle_vertex_first() {
        let (mut mesh, v) = flat_quad();
        let t = mesh.add_triangle(v[0], v[1], v[2]).unwrap();
        mesh.cycle_vertex_first(t, v[2]).unwrap();
        assert_eq!(mesh.triangle_vertices(t), [v[2], v[0], v[1]]);
        assert!(mesh.cycle_vertex_first(t, v[3]).is_err());
    }

    #[test]
    fn test_clone_vertex() {
        let (mut mesh, v) = flat_quad();
        let c = mesh.clone_vertex(v[2], "'").unwrap();
        assert_eq!(mesh.vertex(c).name(), "c'");
        assert_eq!(mesh.position(c), mesh.position(v[2]));
        assert!(mesh.vertex(c).is_isolated());
    }

    #[test]
    fn test_clear_invalidates_ids() {
        let (mut mesh, v) = flat_quad();
        mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();
        mesh.clear();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        let w = mesh.add_vertex("w");
        assert_eq!(w.index(), v[0].index());
        assert!(mesh.get_vertex(v[0]).is_none());
    }

    #[test]
    fn test_compute_tangents() {
        let (mut mesh, v) = flat_quad();
        for (id, uv) in v.iter().zip([(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]) {
            mesh.attributes_mut(*id).texcoord = nalgebra::Vector2::new(uv.0, uv.1);
        }
        let [t0, _] = mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();
        mesh.compute_normals();
        mesh.compute_tangents();
        // u follows +X
        assert_relative_eq!(*mesh.triangle(t0).tangent(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(mesh.attributes(v[0]).tangent, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_transaction_rolls_back() {
        let (mut mesh, v) = flat_quad();
        let [t0, t1] = mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();

        let result = mesh.transaction(|m| {
            m.delete_triangle(t0)?;
            m.add_vertex("stray");
            m.add_triangle(v[0], v[0], v[1])
        });

        assert!(matches!(result, Err(MeshError::DegenerateTriangle { .. })));
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_ids(), &[t0, t1]);
        assert_eq!(mesh.triangle_vertices(t0), [v[0], v[1], v[2]]);
        assert!(mesh.halfedge_to(v[0], v[2]).is_some());
    }

    #[test]
    fn test_transaction_keeps_success() {
        let (mut mesh, v) = flat_quad();
        let t = mesh.transaction(|m| m.add_triangle(v[0], v[1], v[2])).unwrap();
        assert_eq!(mesh.triangle_ids(), &[t]);
    }

    #[test]
    fn test_deferred_compaction() {
        let (mut mesh, v) = flat_quad();
        let [t0, t1] = mesh.add_quad(v[0], v[1], v[2], v[3]).unwrap();

        mesh.with_deferred_compaction(|m| {
            m.delete_vertex(v[1]).unwrap();
            assert_eq!(m.vertex_count(), 3);
            assert_eq!(m.triangle_count(), 1);
            // lists still hold the dead ids
            assert_eq!(m.vertex_ids().len(), 4);
            assert_eq!(m.triangle_ids().len(), 2);
        });

        assert_eq!(mesh.vertex_ids(), &[v[0], v[2], v[3]]);
        assert_eq!(mesh.triangle_ids(), &[t1]);
        assert!(mesh.get_triangle(t0).is_none());
    }
}
