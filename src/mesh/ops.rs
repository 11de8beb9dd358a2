//! Local topological operations: edge collapse and edge flip.

use std::collections::BTreeSet;

use super::halfedge::Mesh;
use super::index::{HalfEdgeId, TriangleId, VertexId};
use crate::error::{MeshError, Result};

impl Mesh {
    /// Check that `u` can be merged into `v`, returning the triangles that
    /// share the edge u–v.
    ///
    /// The collapse is refused when the vertices are not adjacent, when it
    /// would break the link condition, pinch two boundaries together through
    /// an interior edge, or create a triangle with the same corners as an
    /// existing one.
    pub fn check_collapse(&self, u: VertexId, v: VertexId) -> Result<Vec<TriangleId>> {
        self.try_vertex(u)?;
        self.try_vertex(v)?;
        let refuse = |reason| MeshError::InvalidCollapse {
            from: u.index(),
            to: v.index(),
            reason,
        };

        if u == v || (self.halfedge_to(u, v).is_none() && self.halfedge_to(v, u).is_none()) {
            return Err(refuse("vertices are not adjacent"));
        }

        let around_u = self.triangles_around(u);
        let (shared, others): (Vec<TriangleId>, Vec<TriangleId>) = around_u
            .into_iter()
            .partition(|&t| self.triangle_contains(t, v));

        let thirds: BTreeSet<VertexId> = shared
            .iter()
            .flat_map(|&t| self.triangle_vertices(t))
            .filter(|&w| w != u && w != v)
            .collect();
        let neighbors_v = self.neighbor_vertices(v);
        let common: BTreeSet<VertexId> = self
            .neighbor_vertices(u)
            .intersection(&neighbors_v)
            .copied()
            .collect();
        if common != thirds {
            return Err(refuse("link condition"));
        }

        if shared.len() == 2 && self.is_boundary_vertex(u) && self.is_boundary_vertex(v) {
            return Err(refuse("interior edge joins two boundary vertices"));
        }

        let existing: BTreeSet<[VertexId; 3]> = self
            .triangles_around(v)
            .into_iter()
            .filter(|t| !shared.contains(t))
            .map(|t| sorted_corners(self.triangle_vertices(t)))
            .collect();
        for &t in &others {
            let moved = self.triangle_vertices(t).map(|w| if w == u { v } else { w });
            if existing.contains(&sorted_corners(moved)) {
                return Err(refuse("would duplicate a triangle"));
            }
        }

        Ok(shared)
    }

    /// Merge vertex `u` into its neighbor `v`.
    ///
    /// The triangles sharing the edge are deleted, the other triangles of
    /// `u` are rewired to `v`, then `u` is deleted. `v` keeps its attributes.
    pub fn collapse_vertex(&mut self, u: VertexId, v: VertexId) -> Result<()> {
        let shared = self.check_collapse(u, v)?;

        for t in shared {
            self.remove_triangle(t);
        }
        for t in self.triangles_around(u) {
            self.replace_vertex(t, u, v)?;
        }
        self.delete_vertex(u)
    }

    /// Swap the diagonal of the two triangles sharing `he`.
    ///
    /// With `he` going from `a` to `b` in triangle `(a, b, c)` and its
    /// opposite in `(b, a, d)`, the triangles become `(a, d, c)` and
    /// `(d, b, c)`. Both keep their ids and half-edges; `he` and its opposite
    /// become the new diagonal `d -> c` and `c -> d`. A refused flip leaves
    /// the mesh unchanged.
    pub fn flip_edge(&mut self, he: HalfEdgeId) -> Result<[TriangleId; 2]> {
        let Some(edge) = self.get_halfedge(he) else {
            return Err(MeshError::InvalidReference {
                kind: "half-edge",
                index: he.index(),
            });
        };
        let Some(opposite) = edge.opposite else {
            return Err(MeshError::invalid_param("he", format!("{he:?}"), "boundary edge cannot be flipped"));
        };

        let (a, b) = (self.origin(he), self.target(he));
        let c = self.origin(self.prev(he));
        let d = self.origin(self.prev(opposite));
        if c == d || self.halfedge_to(c, d).is_some() || self.halfedge_to(d, c).is_some() {
            return Err(MeshError::NonManifoldEdge {
                from: c.index(),
                to: d.index(),
            });
        }

        let (h1, h2) = (self.next(he), self.prev(he));
        let (o1, o2) = (self.next(opposite), self.prev(opposite));
        let t0 = self.triangle_of(he);
        let t1 = self.triangle_of(opposite);

        self.unlink_sibling(he, a);
        self.unlink_sibling(opposite, b);
        self.halfedge_mut(he).origin = d;
        self.halfedge_mut(opposite).origin = c;
        self.link_sibling(he, d);
        self.link_sibling(opposite, c);

        for (t, cycle) in [(t0, [o1, he, h2]), (t1, [o2, h1, opposite])] {
            for k in 0..3 {
                let edge = self.halfedge_mut(cycle[k]);
                edge.next = cycle[(k + 1) % 3];
                edge.triangle = t;
            }
            self.triangle_mut(t).halfedge = cycle[0];
            self.update_triangle_geometry(t);
        }
        Ok([t0, t1])
    }
}

fn sorted_corners(mut corners: [VertexId; 3]) -> [VertexId; 3] {
    corners.sort();
    corners
}
