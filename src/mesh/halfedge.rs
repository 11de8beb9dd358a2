//! Half-edge mesh data structure.
//!
//! Each triangle owns three directed **half-edges** forming a cycle through
//! `next`. A half-edge knows its **origin** vertex, its **triangle**, its
//! **opposite** (the reverse half-edge in the adjacent triangle, if any) and
//! its **sibling**, the next outgoing half-edge around the same origin.
//! Each vertex stores the head of its sibling chain.
//!
//! # Boundary Handling
//!
//! Only triangles own half-edges. A half-edge without an opposite lies on the
//! mesh boundary; a closed mesh has none.
//!
//! # Storage
//!
//! Elements live in arenas indexed by their ids. Deleted slots stay empty and
//! are never reused. The mesh also keeps the ordered lists of live vertices
//! and triangles, which give the positional numbering used by
//! [`Mesh::vertex_at`] and [`Mesh::triangle_at`].

use std::collections::{BTreeSet, HashSet};

use nalgebra::{Point3, Vector3};

use super::index::{next_mesh_tag, HalfEdgeId, TriangleId, VertexId};
use super::triangle::{Triangle, TriangleGeometry};
use super::vertex::{Vertex, VertexAttributes};
use crate::error::{MeshError, Result};

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    pub(crate) origin: VertexId,
    pub(crate) triangle: TriangleId,
    pub(crate) next: HalfEdgeId,
    pub(crate) opposite: Option<HalfEdgeId>,
    pub(crate) sibling: Option<HalfEdgeId>,
}

impl HalfEdge {
    /// The vertex this half-edge leaves from.
    #[inline]
    pub fn origin(&self) -> VertexId {
        self.origin
    }

    /// The triangle this half-edge belongs to.
    #[inline]
    pub fn triangle(&self) -> TriangleId {
        self.triangle
    }

    /// The next half-edge around the triangle.
    #[inline]
    pub fn next(&self) -> HalfEdgeId {
        self.next
    }

    /// The reverse half-edge in the adjacent triangle.
    #[inline]
    pub fn opposite(&self) -> Option<HalfEdgeId> {
        self.opposite
    }

    /// The next outgoing half-edge around the same origin.
    #[inline]
    pub fn sibling(&self) -> Option<HalfEdgeId> {
        self.sibling
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.opposite.is_none()
    }
}

/// A half-edge triangle mesh.
///
/// The mesh owns all of its vertices, triangles and half-edges. Ids issued by
/// one mesh are rejected by every other mesh.
///
/// A clone is a snapshot: it keeps the tag, so ids stay valid in both
/// copies, and an id issued by one copy after they diverge can still pass
/// the other copy's tag check. Use [`Mesh::fork`] for an independent copy.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    pub(crate) tag: u32,
    pub(crate) vertices: Vec<Option<Vertex>>,
    pub(crate) triangles: Vec<Option<Triangle>>,
    pub(crate) halfedges: Vec<Option<HalfEdge>>,
    pub(crate) vertex_list: Vec<VertexId>,
    pub(crate) triangle_list: Vec<TriangleId>,
    pub(crate) live_vertices: usize,
    pub(crate) live_triangles: usize,
    /// Deleted ids stay in the ordered lists until the enclosing
    /// [`Mesh::with_deferred_compaction`] returns.
    pub(crate) deferred: bool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new("mesh")
    }
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0, 0)
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(name: impl Into<String>, num_vertices: usize, num_triangles: usize) -> Self {
        Self {
            name: name.into(),
            tag: next_mesh_tag(),
            vertices: Vec::with_capacity(num_vertices),
            triangles: Vec::with_capacity(num_triangles),
            halfedges: Vec::with_capacity(num_triangles * 3),
            vertex_list: Vec::with_capacity(num_vertices),
            triangle_list: Vec::with_capacity(num_triangles),
            live_vertices: 0,
            live_triangles: 0,
            deferred: false,
        }
    }

    /// Copy the mesh under a fresh tag.
    ///
    /// Unlike a clone, ids issued by the original are rejected by the fork
    /// and the other way around. The fork's ids keep the arena slots of the
    /// original, so `fork.vertex_at(i)` matches `original.vertex_at(i)`.
    pub fn fork(&self) -> Mesh {
        let mut fork = self.clone();
        let tag = next_mesh_tag();
        fork.tag = tag;

        for vertex in fork.vertices.iter_mut().flatten() {
            vertex.halfedge = vertex.halfedge.map(|he| he.with_tag(tag));
        }
        for triangle in fork.triangles.iter_mut().flatten() {
            triangle.halfedge = triangle.halfedge.with_tag(tag);
        }
        for he in fork.halfedges.iter_mut().flatten() {
            he.origin = he.origin.with_tag(tag);
            he.triangle = he.triangle.with_tag(tag);
            he.next = he.next.with_tag(tag);
            he.opposite = he.opposite.map(|o| o.with_tag(tag));
            he.sibling = he.sibling.map(|s| s.with_tag(tag));
        }
        for v in fork.vertex_list.iter_mut() {
            *v = v.with_tag(tag);
        }
        for t in fork.triangle_list.iter_mut() {
            *t = t.with_tag(tag);
        }
        fork
    }

    /// Name of the mesh.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the mesh.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ==================== Accessors ====================

    /// Number of live vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    /// Number of live triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.live_triangles
    }

    /// Number of live half-edges (three per triangle).
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.live_triangles * 3
    }

    /// True when the mesh has no vertex.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_vertices == 0
    }

    /// Ids of live vertices, in creation order.
    #[inline]
    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_list
    }

    /// Ids of live triangles, in creation order.
    #[inline]
    pub fn triangle_ids(&self) -> &[TriangleId] {
        &self.triangle_list
    }

    /// Id of the vertex at position `i` of the vertex list.
    ///
    /// Positions shift down when an earlier vertex is deleted.
    #[inline]
    pub fn vertex_at(&self, i: usize) -> Option<VertexId> {
        self.vertex_list.get(i).copied()
    }

    /// Id of the triangle at position `i` of the triangle list.
    #[inline]
    pub fn triangle_at(&self, i: usize) -> Option<TriangleId> {
        self.triangle_list.get(i).copied()
    }

    /// Get a vertex by id, if it belongs to this mesh and is alive.
    #[inline]
    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        if id.mesh_tag() != self.tag {
            return None;
        }
        self.vertices.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a triangle by id, if it belongs to this mesh and is alive.
    #[inline]
    pub fn get_triangle(&self, id: TriangleId) -> Option<&Triangle> {
        if id.mesh_tag() != self.tag {
            return None;
        }
        self.triangles.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a half-edge by id, if it belongs to this mesh and is alive.
    #[inline]
    pub fn get_halfedge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        if id.mesh_tag() != self.tag {
            return None;
        }
        self.halfedges.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a vertex, failing with [`MeshError::InvalidReference`].
    pub fn try_vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.get_vertex(id).ok_or(MeshError::InvalidReference {
            kind: "vertex",
            index: id.index(),
        })
    }

    /// Get a triangle, failing with [`MeshError::InvalidReference`].
    pub fn try_triangle(&self, id: TriangleId) -> Result<&Triangle> {
        self.get_triangle(id).ok_or(MeshError::InvalidReference {
            kind: "triangle",
            index: id.index(),
        })
    }

    /// Get a vertex by id.
    ///
    /// # Panics
    /// Panics if the id is foreign or names a deleted vertex.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        match self.get_vertex(id) {
            Some(v) => v,
            None => panic!("{:?} is not a vertex of mesh {:?}", id, self.name),
        }
    }

    /// Get a triangle by id.
    ///
    /// # Panics
    /// Panics if the id is foreign or names a deleted triangle.
    #[inline]
    pub fn triangle(&self, id: TriangleId) -> &Triangle {
        match self.get_triangle(id) {
            Some(t) => t,
            None => panic!("{:?} is not a triangle of mesh {:?}", id, self.name),
        }
    }

    /// Get a half-edge by id.
    ///
    /// # Panics
    /// Panics if the id is foreign or names a deleted half-edge.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        match self.get_halfedge(id) {
            Some(he) => he,
            None => panic!("{:?} is not a half-edge of mesh {:?}", id, self.name),
        }
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        match self.vertices.get_mut(id.index()).and_then(Option::as_mut) {
            Some(v) => v,
            None => panic!("{:?} is not a vertex of mesh {:?}", id, self.name),
        }
    }

    #[inline]
    pub(crate) fn triangle_mut(&mut self, id: TriangleId) -> &mut Triangle {
        match self.triangles.get_mut(id.index()).and_then(Option::as_mut) {
            Some(t) => t,
            None => panic!("{:?} is not a triangle of mesh {:?}", id, self.name),
        }
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        match self.halfedges.get_mut(id.index()).and_then(Option::as_mut) {
            Some(he) => he,
            None => panic!("{:?} is not a half-edge of mesh {:?}", id, self.name),
        }
    }

    /// Iterate over live vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertex_list.iter().map(move |&id| (id, self.vertex(id)))
    }

    /// Iterate over live triangles with their ids.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> + '_ {
        self.triangle_list.iter().map(move |&id| (id, self.triangle(id)))
    }

    /// Find the first vertex, in list order, with the given name.
    pub fn vertex_by_name(&self, name: &str) -> Option<VertexId> {
        self.vertices()
            .find(|(_, v)| v.name == name)
            .map(|(id, _)| id)
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).attributes.position
    }

    /// Get the attributes of a vertex.
    #[inline]
    pub fn attributes(&self, v: VertexId) -> &VertexAttributes {
        &self.vertex(v).attributes
    }

    /// Mutable access to the attributes of a vertex.
    ///
    /// Cached triangle geometry is not refreshed; use [`Mesh::set_position`]
    /// or call [`Mesh::compute_normals`] after moving vertices.
    #[inline]
    pub fn attributes_mut(&mut self, v: VertexId) -> &mut VertexAttributes {
        &mut self.vertex_mut(v).attributes
    }

    /// Move a vertex and refresh the geometry of its triangles.
    pub fn set_position(&mut self, v: VertexId, position: Point3<f64>) {
        self.vertex_mut(v).attributes.position = position;
        for t in self.triangles_around(v) {
            self.update_triangle_geometry(t);
        }
    }

    // ==================== Topology Queries ====================

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the target vertex of a half-edge.
    #[inline]
    pub fn target(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.next(he))
    }

    /// Get the next half-edge around the triangle.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the triangle.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.next(self.next(he))
    }

    /// Get the opposite half-edge, if the edge is shared by two triangles.
    #[inline]
    pub fn opposite(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedge(he).opposite
    }

    /// Get the triangle of a half-edge.
    #[inline]
    pub fn triangle_of(&self, he: HalfEdgeId) -> TriangleId {
        self.halfedge(he).triangle
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary vertices.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let mut outgoing = self.outgoing_halfedges(v).peekable();
        if outgoing.peek().is_none() {
            return true;
        }
        outgoing.any(|he| self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.prev(he)))
    }

    /// Find the half-edge going from `a` to `b`.
    pub fn halfedge_to(&self, a: VertexId, b: VertexId) -> Option<HalfEdgeId> {
        self.outgoing_halfedges(a).find(|&he| self.target(he) == b)
    }

    /// Iterate over the outgoing half-edges of a vertex (its sibling chain).
    pub fn outgoing_halfedges(&self, v: VertexId) -> OutgoingHalfEdges<'_> {
        OutgoingHalfEdges {
            mesh: self,
            current: self.vertex(v).halfedge,
        }
    }

    /// Number of triangles using a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.outgoing_halfedges(v).count()
    }

    /// The three half-edges of a triangle, starting at its first vertex.
    pub fn triangle_halfedges(&self, t: TriangleId) -> [HalfEdgeId; 3] {
        let he0 = self.triangle(t).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [he0, he1, he2]
    }

    /// The three vertices of a triangle.
    pub fn triangle_vertices(&self, t: TriangleId) -> [VertexId; 3] {
        self.triangle_halfedges(t).map(|he| self.origin(he))
    }

    /// The positions of the three vertices of a triangle.
    pub fn triangle_positions(&self, t: TriangleId) -> [Point3<f64>; 3] {
        self.triangle_vertices(t).map(|v| *self.position(v))
    }

    /// True when `v` is one of the corners of `t`.
    pub fn triangle_contains(&self, t: TriangleId, v: VertexId) -> bool {
        self.triangle_vertices(t).contains(&v)
    }

    /// Triangles using a vertex, in sibling-chain order.
    pub fn triangles_around(&self, v: VertexId) -> Vec<TriangleId> {
        self.outgoing_halfedges(v)
            .map(|he| self.triangle_of(he))
            .collect()
    }

    /// Triangles using a vertex, ordered counterclockwise around it.
    ///
    /// On a boundary vertex the walk starts at the triangle following the
    /// boundary. Triangles that cannot be reached by walking across edges
    /// (a pinched fan) are appended at the end.
    pub fn triangles_ordered_around(&self, v: VertexId) -> Vec<TriangleId> {
        let outgoing: Vec<HalfEdgeId> = self.outgoing_halfedges(v).collect();
        let Some(&first) = outgoing.first() else {
            return Vec::new();
        };

        let start = outgoing
            .iter()
            .copied()
            .find(|&he| self.opposite(he).is_none())
            .unwrap_or(first);

        let mut visited = HashSet::with_capacity(outgoing.len());
        let mut result = Vec::with_capacity(outgoing.len());
        let mut he = start;
        while visited.insert(he) {
            result.push(self.triangle_of(he));
            // (b -> v) closes the triangle; its opposite leaves v in the next one
            match self.opposite(self.prev(he)) {
                Some(o) => he = o,
                None => break,
            }
        }

        for he in outgoing {
            if visited.insert(he) {
                result.push(self.triangle_of(he));
            }
        }
        result
    }

    /// Vertices joined to `v` by an edge.
    pub fn neighbor_vertices(&self, v: VertexId) -> BTreeSet<VertexId> {
        let mut neighbors = BTreeSet::new();
        for he in self.outgoing_halfedges(v) {
            neighbors.insert(self.target(he));
            neighbors.insert(self.origin(self.prev(he)));
        }
        neighbors
    }

    /// Each undirected edge once, as a pair of vertices.
    pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
        let mut edges = Vec::with_capacity(self.halfedge_count() / 2 + 1);
        for &t in &self.triangle_list {
            for he in self.triangle_halfedges(t) {
                let keep = match self.opposite(he) {
                    None => true,
                    Some(o) => he < o,
                };
                if keep {
                    edges.push((self.origin(he), self.target(he)));
                }
            }
        }
        edges
    }

    /// Number of half-edges without an opposite.
    pub fn boundary_halfedge_count(&self) -> usize {
        self.triangle_list
            .iter()
            .flat_map(|&t| self.triangle_halfedges(t))
            .filter(|&he| self.is_boundary_halfedge(he))
            .count()
    }

    /// True when every half-edge has an opposite.
    pub fn is_closed(&self) -> bool {
        self.triangle_count() > 0 && self.boundary_halfedge_count() == 0
    }

    // ==================== Geometry ====================

    /// Geometry of a triangle computed from the current vertex positions.
    pub fn compute_triangle_geometry(&self, t: TriangleId) -> TriangleGeometry {
        let [p0, p1, p2] = self.triangle_positions(t);
        TriangleGeometry::from_points(&p0, &p1, &p2)
    }

    pub(crate) fn update_triangle_geometry(&mut self, t: TriangleId) {
        let geometry = self.compute_triangle_geometry(t);
        self.triangle_mut(t).geometry = geometry;
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, he: HalfEdgeId) -> f64 {
        (self.position(self.target(he)) - self.position(self.origin(he))).norm()
    }

    /// Compute the edge vector (from origin to target).
    pub fn edge_vector(&self, he: HalfEdgeId) -> Vector3<f64> {
        self.position(self.target(he)) - self.position(self.origin(he))
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertex_list.first()?;
        let mut min = *self.position(first);
        let mut max = min;

        for (_, v) in self.vertices() {
            min = min.inf(v.position());
            max = max.sup(v.position());
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.triangle_list
            .iter()
            .map(|&t| self.compute_triangle_geometry(t).area)
            .sum()
    }
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct OutgoingHalfEdges<'a> {
    mesh: &'a Mesh,
    current: Option<HalfEdgeId>,
}

impl<'a> Iterator for OutgoingHalfEdges<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        self.current = self.mesh.halfedge(result).sibling;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new("empty");
        assert_eq!(mesh.name(), "empty");
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.halfedge_count(), 0);
        assert!(mesh.bounding_box().is_none());
        assert!(!mesh.is_closed());
    }

    #[test]
    fn test_foreign_ids_are_rejected() {
        let mut a = Mesh::new("a");
        let b = Mesh::new("b");
        let v = a.add_vertex("v");
        assert!(a.get_vertex(v).is_some());
        assert!(b.get_vertex(v).is_none());
        assert!(matches!(
            b.try_vertex(v),
            Err(MeshError::InvalidReference { kind: "vertex", .. })
        ));
    }

    #[test]
    fn test_clone_shares_ids() {
        let mut a = Mesh::new("a");
        let v = a.add_vertex_at("v", Point3::new(1.0, 2.0, 3.0));
        let mut b = a.clone();
        assert_eq!(b.position(v), &Point3::new(1.0, 2.0, 3.0));

        // diverged copies still accept each other's new ids
        let w = b.add_vertex("w");
        assert!(b.get_vertex(w).is_some());
        assert!(a.get_vertex(w).is_none());
        let x = a.add_vertex("x");
        assert_eq!(x.index(), w.index());
        assert!(b.get_vertex(x).is_some());
    }

    #[test]
    fn test_fork_rejects_original_ids() {
        let mut a = Mesh::new("a");
        let u = a.add_vertex_at("u", Point3::new(0.0, 0.0, 0.0));
        let v = a.add_vertex_at("v", Point3::new(1.0, 0.0, 0.0));
        let w = a.add_vertex_at("w", Point3::new(0.0, 1.0, 0.0));
        let t = a.add_triangle(u, v, w).unwrap();

        let mut b = a.fork();
        assert!(b.get_vertex(u).is_none());
        assert!(b.get_triangle(t).is_none());
        assert_eq!(b.vertex_count(), 3);

        let bu = b.vertex_at(0).unwrap();
        let bt = b.triangle_at(0).unwrap();
        assert_eq!(bu.index(), u.index());
        assert!(a.get_vertex(bu).is_none());
        assert_eq!(b.triangle_vertices(bt), [bu, b.vertex_at(1).unwrap(), b.vertex_at(2).unwrap()]);

        // navigation in the fork only yields fork ids
        for he in b.triangle_halfedges(bt) {
            assert!(b.get_halfedge(he).is_some());
            assert!(b.get_vertex(b.origin(he)).is_some());
        }
        let x = b.add_vertex("x");
        b.add_triangle(b.vertex_at(1).unwrap(), bu, x).unwrap();
        assert_eq!(b.boundary_halfedge_count(), 4);
        assert_eq!(a.triangle_count(), 1);
    }

    #[test]
    fn test_fan_queries() {
        // Square split into four triangles around a center vertex
        let mut mesh = Mesh::new("fan");
        let c = mesh.add_vertex_at("c", Point3::new(0.0, 0.0, 0.0));
        let ring = [
            mesh.add_vertex_at("a", Point3::new(1.0, 0.0, 0.0)),
            mesh.add_vertex_at("b", Point3::new(0.0, 1.0, 0.0)),
            mesh.add_vertex_at("d", Point3::new(-1.0, 0.0, 0.0)),
            mesh.add_vertex_at("e", Point3::new(0.0, -1.0, 0.0)),
        ];
        let mut tris = Vec::new();
        for i in 0..4 {
            tris.push(mesh.add_triangle(c, ring[i], ring[(i + 1) % 4]).unwrap());
        }

        assert_eq!(mesh.valence(c), 4);
        assert!(!mesh.is_boundary_vertex(c));
        assert!(mesh.is_boundary_vertex(ring[0]));
        assert_eq!(mesh.neighbor_vertices(c).len(), 4);
        assert_eq!(mesh.neighbor_vertices(ring[0]).len(), 3);
        assert_eq!(mesh.edges().len(), 8);
        assert_eq!(mesh.boundary_halfedge_count(), 4);

        let ordered = mesh.triangles_ordered_around(c);
        assert_eq!(ordered.len(), 4);
        let start = ordered.iter().position(|&t| t == tris[0]).unwrap();
        for k in 0..4 {
            assert_eq!(ordered[(start + k) % 4], tris[k]);
        }
    }

    #[test]
    fn test_ordered_around_boundary_vertex() {
        let mut mesh = Mesh::new("half fan");
        let c = mesh.add_vertex_at("c", Point3::new(0.0, 0.0, 0.0));
        let a = mesh.add_vertex_at("a", Point3::new(1.0, 0.0, 0.0));
        let b = mesh.add_vertex_at("b", Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex_at("d", Point3::new(-1.0, 0.0, 0.0));
        // Added out of order on purpose
        let t1 = mesh.add_triangle(c, b, d).unwrap();
        let t0 = mesh.add_triangle(c, a, b).unwrap();
        assert_eq!(mesh.triangles_ordered_around(c), vec![t0, t1]);
    }

    #[test]
    fn test_set_position_refreshes_geometry() {
        let mut mesh = Mesh::new("tri");
        let a = mesh.add_vertex_at("a", Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex_at("b", Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex_at("c", Point3::new(0.0, 1.0, 0.0));
        let t = mesh.add_triangle(a, b, c).unwrap();
        assert!((mesh.triangle(t).area() - 0.5).abs() < 1e-12);

        mesh.set_position(c, Point3::new(0.0, 2.0, 0.0));
        assert!((mesh.triangle(t).area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let mut mesh = Mesh::new("box");
        mesh.add_vertex_at("a", Point3::new(-1.0, 2.0, 0.5));
        mesh.add_vertex_at("b", Point3::new(3.0, -2.0, 0.0));
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3::new(3.0, 2.0, 0.5));
    }
}
