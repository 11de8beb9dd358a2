//! Shared helpers: vertex naming, border walks and mesh validation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::algo::shapes::box_mesh;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, Mesh, TriangleId, VertexId};

// ==================== Naming ====================

/// Name of the vertex inserted between `a` and `b`, independent of order.
pub fn mid_name(a: &str, b: &str) -> String {
    if a <= b {
        format!("({a}+{b})")
    } else {
        format!("({b}+{a})")
    }
}

/// Name of the vertex inserted at the center of `a`, `b` and `c`.
pub fn center_name(a: &str, b: &str, c: &str) -> String {
    let mut names = [a, b, c];
    names.sort_unstable();
    format!("({}+{}+{})", names[0], names[1], names[2])
}

// ==================== Borders ====================

/// Half-edges following a closed border `v0 -> v1 -> ... -> v0`.
///
/// # Errors
/// [`MeshError::BrokenBorder`] when two successive vertices are not joined
/// by a half-edge in that direction.
pub fn halfedges_along_border(mesh: &Mesh, border: &[VertexId]) -> Result<Vec<HalfEdgeId>> {
    if border.len() < 3 {
        return Err(MeshError::invalid_param(
            "border",
            border.len(),
            "a closed border needs at least 3 vertices",
        ));
    }
    let n = border.len();
    (0..n)
        .map(|i| {
            let (a, b) = (border[i], border[(i + 1) % n]);
            mesh.try_vertex(a)?;
            mesh.halfedge_to(a, b).ok_or(MeshError::BrokenBorder {
                from: a.index(),
                to: b.index(),
            })
        })
        .collect()
}

/// Triangles on the left of a closed border, reached by flooding from the
/// border half-edges without crossing them.
///
/// On a closed mesh the border must actually enclose a region, otherwise the
/// flood reaches every triangle of the component.
pub fn triangles_inside_border(mesh: &Mesh, border: &[VertexId]) -> Result<Vec<TriangleId>> {
    let along = halfedges_along_border(mesh, border)?;
    let fence: HashSet<HalfEdgeId> = along.iter().copied().collect();

    let mut visited = HashSet::new();
    let mut queue: VecDeque<TriangleId> = along.iter().map(|&he| mesh.triangle_of(he)).collect();
    let mut inside = Vec::new();
    while let Some(t) = queue.pop_front() {
        if !visited.insert(t) {
            continue;
        }
        inside.push(t);
        for he in mesh.triangle_halfedges(t) {
            if fence.contains(&he) {
                continue;
            }
            if let Some(o) = mesh.opposite(he) {
                queue.push_back(mesh.triangle_of(o));
            }
        }
    }
    Ok(inside)
}

/// Distinct vertices of a set of triangles, in first-seen order.
pub fn vertices_of(mesh: &Mesh, triangles: &[TriangleId]) -> Vec<VertexId> {
    let mut seen = HashSet::new();
    triangles
        .iter()
        .flat_map(|&t| mesh.triangle_vertices(t))
        .filter(|&v| seen.insert(v))
        .collect()
}

/// Area-weighted average normal of a set of triangles, zero if they have no
/// area.
pub fn average_normal(mesh: &Mesh, triangles: &[TriangleId]) -> Vector3<f64> {
    let sum: Vector3<f64> = triangles
        .iter()
        .map(|&t| {
            let g = mesh.compute_triangle_geometry(t);
            g.normal * g.area
        })
        .sum();
    crate::mesh::unit_or_zero(sum)
}

/// Closed box mesh enclosing every vertex of `mesh`.
pub fn create_aabb(mesh: &Mesh) -> Result<Mesh> {
    let (min, max) = mesh.bounding_box().ok_or(MeshError::EmptyMesh)?;
    let mut aabb = box_mesh(min, max)?;
    aabb.set_name(format!("{} aabb", mesh.name()));
    Ok(aabb)
}

// ==================== Validation ====================

/// A problem found by [`check_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeshIssue {
    /// The half-edge cycle of a triangle is missing, foreign or not a 3-cycle.
    BrokenTriangle {
        /// The triangle.
        triangle: TriangleId,
    },
    /// A triangle corner is not a live vertex.
    DeletedVertex {
        /// The triangle.
        triangle: TriangleId,
        /// The dead corner.
        vertex: VertexId,
    },
    /// A triangle uses a vertex twice.
    RepeatedVertex {
        /// The triangle.
        triangle: TriangleId,
    },
    /// A triangle has (near) zero area.
    ZeroArea {
        /// The triangle.
        triangle: TriangleId,
    },
    /// Two triangles have the same three corners.
    DuplicateTriangle {
        /// First triangle.
        first: TriangleId,
        /// Triangle repeating it.
        second: TriangleId,
    },
    /// A directed edge appears in two triangles.
    NonManifoldEdge {
        /// Edge origin.
        from: VertexId,
        /// Edge target.
        to: VertexId,
    },
    /// The opposite of a half-edge does not point back at it.
    BadOpposite {
        /// The half-edge.
        halfedge: HalfEdgeId,
    },
    /// The sibling chain of a vertex misses or leaks half-edges.
    BrokenSiblingChain {
        /// The vertex.
        vertex: VertexId,
    },
    /// A vertex without triangles.
    IsolatedVertex {
        /// The vertex.
        vertex: VertexId,
    },
}

impl MeshIssue {
    /// Issues that only degrade geometry and leave topology usable.
    pub fn is_tolerable(&self) -> bool {
        matches!(self, MeshIssue::ZeroArea { .. } | MeshIssue::IsolatedVertex { .. })
    }
}

impl fmt::Display for MeshIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshIssue::BrokenTriangle { triangle } => {
                write!(f, "triangle {triangle:?} has a broken half-edge cycle")
            }
            MeshIssue::DeletedVertex { triangle, vertex } => {
                write!(f, "triangle {triangle:?} uses dead vertex {vertex:?}")
            }
            MeshIssue::RepeatedVertex { triangle } => {
                write!(f, "triangle {triangle:?} repeats a vertex")
            }
            MeshIssue::ZeroArea { triangle } => write!(f, "triangle {triangle:?} has zero area"),
            MeshIssue::DuplicateTriangle { first, second } => {
                write!(f, "triangles {first:?} and {second:?} have the same corners")
            }
            MeshIssue::NonManifoldEdge { from, to } => {
                write!(f, "edge {from:?} -> {to:?} is used twice")
            }
            MeshIssue::BadOpposite { halfedge } => {
                write!(f, "opposite of {halfedge:?} is not reciprocal")
            }
            MeshIssue::BrokenSiblingChain { vertex } => {
                write!(f, "sibling chain of {vertex:?} is broken")
            }
            MeshIssue::IsolatedVertex { vertex } => write!(f, "vertex {vertex:?} is isolated"),
        }
    }
}

/// Options for [`check_mesh`].
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Fail with [`MeshError::Inconsistent`] on the first issue instead of
    /// collecting them.
    pub fail_fast: bool,

    /// Delete isolated vertices after checking.
    pub remove_isolated: bool,

    /// Area at or below which a triangle is reported as zero area.
    pub degenerate_area_threshold: f64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            remove_isolated: false,
            degenerate_area_threshold: 1e-12,
        }
    }
}

impl CheckOptions {
    /// Set whether to stop at the first issue.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set whether to delete isolated vertices.
    pub fn with_remove_isolated(mut self, remove: bool) -> Self {
        self.remove_isolated = remove;
        self
    }

    /// Set the zero area threshold.
    pub fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }
}

/// Result of [`check_mesh`].
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    /// Live vertices when the check ran.
    pub vertex_count: usize,
    /// Live triangles when the check ran.
    pub triangle_count: usize,
    /// Half-edges without an opposite.
    pub boundary_halfedge_count: usize,
    /// Every issue found, in discovery order.
    pub issues: Vec<MeshIssue>,
    /// Isolated vertices deleted on request.
    pub removed_vertices: usize,
}

impl MeshReport {
    /// True when no issue was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// True when every issue is tolerable (zero area, isolated vertices).
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.issues.iter().all(MeshIssue::is_tolerable)
    }

    /// True when the mesh has triangles and no boundary.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.triangle_count > 0 && self.boundary_halfedge_count == 0
    }

    /// Number of issues found.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

impl fmt::Display for MeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Boundary half-edges: {}", self.boundary_halfedge_count)?;
        if self.removed_vertices > 0 {
            writeln!(f, "  Removed isolated vertices: {}", self.removed_vertices)?;
        }
        if !self.issues.is_empty() {
            writeln!(f, "  Issues:")?;
            for issue in &self.issues {
                writeln!(f, "    {issue}")?;
            }
        }
        Ok(())
    }
}

struct IssueCollector {
    fail_fast: bool,
    issues: Vec<MeshIssue>,
}

impl IssueCollector {
    fn push(&mut self, issue: MeshIssue) -> Result<()> {
        if self.fail_fast {
            return Err(MeshError::Inconsistent(issue.to_string()));
        }
        self.issues.push(issue);
        Ok(())
    }
}

/// Check the internal consistency of a mesh.
///
/// Checks triangle half-edge cycles, corner liveness, repeated corners,
/// duplicate triangles, directed edges used twice, opposite reciprocity,
/// sibling chains, zero-area triangles and isolated vertices.
///
/// Issues are collected in the report; with [`CheckOptions::fail_fast`] the
/// first one is returned as [`MeshError::Inconsistent`] instead.
pub fn check_mesh(mesh: &mut Mesh, options: &CheckOptions) -> Result<MeshReport> {
    let mut collector = IssueCollector {
        fail_fast: options.fail_fast,
        issues: Vec::new(),
    };

    let mut owned: HashMap<VertexId, HashSet<HalfEdgeId>> = HashMap::new();
    let mut corner_sets: HashMap<[VertexId; 3], TriangleId> = HashMap::new();
    let mut directed: HashSet<(VertexId, VertexId)> = HashSet::new();
    let mut boundary = 0;

    for &t in mesh.triangle_ids() {
        let Some(cycle) = triangle_cycle(mesh, t) else {
            collector.push(MeshIssue::BrokenTriangle { triangle: t })?;
            continue;
        };
        let corners = cycle.map(|he| mesh.halfedge(he).origin());

        if let Some(&dead) = corners.iter().find(|&&v| mesh.get_vertex(v).is_none()) {
            collector.push(MeshIssue::DeletedVertex {
                triangle: t,
                vertex: dead,
            })?;
            continue;
        }
        if corners[0] == corners[1] || corners[1] == corners[2] || corners[0] == corners[2] {
            collector.push(MeshIssue::RepeatedVertex { triangle: t })?;
        }
        if mesh.compute_triangle_geometry(t).area <= options.degenerate_area_threshold {
            collector.push(MeshIssue::ZeroArea { triangle: t })?;
        }

        let mut key = corners;
        key.sort();
        if let Some(&first) = corner_sets.get(&key) {
            collector.push(MeshIssue::DuplicateTriangle { first, second: t })?;
        } else {
            corner_sets.insert(key, t);
        }

        for (k, &he) in cycle.iter().enumerate() {
            let (from, to) = (corners[k], corners[(k + 1) % 3]);
            if !directed.insert((from, to)) {
                collector.push(MeshIssue::NonManifoldEdge { from, to })?;
            }
            owned.entry(from).or_default().insert(he);

            match mesh.halfedge(he).opposite() {
                None => boundary += 1,
                Some(o) => {
                    let reciprocal = mesh.get_halfedge(o).is_some_and(|oh| {
                        oh.opposite() == Some(he)
                            && oh.origin() == to
                            && mesh.get_triangle(oh.triangle()).is_some()
                    });
                    if !reciprocal {
                        collector.push(MeshIssue::BadOpposite { halfedge: he })?;
                    }
                }
            }
        }
    }

    let mut isolated = Vec::new();
    for &v in mesh.vertex_ids() {
        let expected = owned.get(&v);
        let chain = sibling_chain(mesh, v);
        let consistent = match (&chain, expected) {
            (Some(chain), Some(expected)) => chain == expected,
            (Some(chain), None) => chain.is_empty(),
            (None, _) => false,
        };
        if !consistent {
            collector.push(MeshIssue::BrokenSiblingChain { vertex: v })?;
        } else if expected.is_none() {
            collector.push(MeshIssue::IsolatedVertex { vertex: v })?;
            isolated.push(v);
        }
    }

    let mut report = MeshReport {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        boundary_halfedge_count: boundary,
        issues: collector.issues,
        removed_vertices: 0,
    };

    if options.remove_isolated {
        for v in isolated {
            mesh.delete_vertex(v)?;
            report.removed_vertices += 1;
        }
    }

    if report.is_valid() {
        info!(
            vertices = report.vertex_count,
            triangles = report.triangle_count,
            "Mesh check passed"
        );
    } else {
        warn!(issues = report.issue_count(), "Mesh check found issues");
    }
    debug!("{}", report);

    Ok(report)
}

/// The three half-edges of `t`, if they form a valid cycle owned by `t`.
fn triangle_cycle(mesh: &Mesh, t: TriangleId) -> Option<[HalfEdgeId; 3]> {
    let he0 = mesh.get_triangle(t)?.halfedge;
    let mut cycle = [he0; 3];
    let mut he = he0;
    for slot in cycle.iter_mut() {
        let edge = mesh.get_halfedge(he)?;
        if edge.triangle() != t {
            return None;
        }
        *slot = he;
        he = edge.next();
    }
    (he == he0).then_some(cycle)
}

/// Half-edges of the sibling chain of `v`, or `None` if the chain loops,
/// leaves the mesh or strays to another origin.
fn sibling_chain(mesh: &Mesh, v: VertexId) -> Option<HashSet<HalfEdgeId>> {
    let mut chain = HashSet::new();
    let mut current = mesh.vertex(v).halfedge;
    while let Some(he) = current {
        let edge = mesh.get_halfedge(he)?;
        if edge.origin() != v || !chain.insert(he) {
            return None;
        }
        current = edge.sibling();
    }
    Some(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::topology::add_rectangular_surface;
    use nalgebra::Point3;

    fn create_grid_mesh(n: usize) -> Mesh {
        let mut mesh = Mesh::new("grid");
        add_rectangular_surface(&mut mesh, n, n, "P%d-%d", false, false).unwrap();
        mesh
    }

    fn grid_vertex(mesh: &Mesh, n: usize, i: usize, j: usize) -> VertexId {
        mesh.vertex_at(i + j * n).unwrap()
    }

    #[test]
    fn test_names_are_symmetric() {
        assert_eq!(mid_name("a", "b"), mid_name("b", "a"));
        assert_eq!(mid_name("a", "b"), "(a+b)");
        assert_eq!(center_name("c", "a", "b"), "(a+b+c)");
    }

    #[test]
    fn test_border_walk() {
        let mesh = create_grid_mesh(4);
        // inner square (1,1) (1,2) (2,2) (2,1), counterclockwise seen from +Y
        let border: Vec<VertexId> = [(1, 1), (1, 2), (2, 2), (2, 1)]
            .iter()
            .map(|&(i, j)| grid_vertex(&mesh, 4, i, j))
            .collect();

        // grid edges run along i and j, the square's sides are edges
        let hes = halfedges_along_border(&mesh, &border);
        assert!(hes.is_ok());

        let inside = triangles_inside_border(&mesh, &border).unwrap();
        assert_eq!(inside.len(), 2);
        assert_eq!(vertices_of(&mesh, &inside).len(), 4);
        assert!((average_normal(&mesh, &inside) - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn test_border_walk_reversed_is_outside() {
        let mesh = create_grid_mesh(4);
        let border: Vec<VertexId> = [(1, 1), (2, 1), (2, 2), (1, 2)]
            .iter()
            .map(|&(i, j)| grid_vertex(&mesh, 4, i, j))
            .collect();
        let outside = triangles_inside_border(&mesh, &border).unwrap();
        assert_eq!(outside.len(), mesh.triangle_count() - 2);
    }

    #[test]
    fn test_broken_border() {
        let mesh = create_grid_mesh(4);
        let border = [
            grid_vertex(&mesh, 4, 0, 0),
            grid_vertex(&mesh, 4, 3, 3),
            grid_vertex(&mesh, 4, 0, 3),
        ];
        assert!(matches!(
            halfedges_along_border(&mesh, &border),
            Err(MeshError::BrokenBorder { .. })
        ));
    }

    #[test]
    fn test_check_valid_mesh() {
        let mut mesh = create_grid_mesh(3);
        let report = check_mesh(&mut mesh, &CheckOptions::default()).unwrap();
        assert!(report.is_valid());
        assert!(!report.is_closed());
        assert_eq!(report.boundary_halfedge_count, 8);
        assert_eq!(report.triangle_count, 8);
    }

    #[test]
    fn test_check_reports_isolated_and_zero_area() {
        let mut mesh = create_grid_mesh(2);
        let lonely = mesh.add_vertex("lonely");
        let a = mesh.add_vertex_at("a", Point3::new(5.0, 0.0, 0.0));
        let b = mesh.add_vertex_at("b", Point3::new(6.0, 0.0, 0.0));
        let c = mesh.add_vertex_at("c", Point3::new(7.0, 0.0, 0.0));
        let flat = mesh.add_triangle(a, b, c).unwrap();

        let report = check_mesh(&mut mesh, &CheckOptions::default()).unwrap();
        assert!(!report.is_valid());
        assert!(report.is_usable());
        assert!(report.issues.contains(&MeshIssue::IsolatedVertex { vertex: lonely }));
        assert!(report.issues.contains(&MeshIssue::ZeroArea { triangle: flat }));
        assert_eq!(mesh.vertex_count(), 8);

        let options = CheckOptions::default().with_remove_isolated(true);
        let report = check_mesh(&mut mesh, &options).unwrap();
        assert_eq!(report.removed_vertices, 1);
        assert_eq!(mesh.vertex_count(), 7);
    }

    #[test]
    fn test_check_detects_broken_opposite() {
        let mut mesh = create_grid_mesh(2);
        let a = grid_vertex(&mesh, 2, 0, 0);
        let c = grid_vertex(&mesh, 2, 1, 1);
        let he = mesh.halfedge_to(a, c).unwrap();
        mesh.halfedge_mut(he).opposite = None;

        let report = check_mesh(&mut mesh, &CheckOptions::default()).unwrap();
        assert_eq!(report.issue_count(), 1);
        assert!(matches!(report.issues[0], MeshIssue::BadOpposite { .. }));

        let err = check_mesh(&mut mesh, &CheckOptions::default().with_fail_fast(true)).unwrap_err();
        assert!(matches!(err, MeshError::Inconsistent(_)));
    }

    #[test]
    fn test_check_detects_broken_sibling_chain() {
        let mut mesh = create_grid_mesh(2);
        let v = grid_vertex(&mesh, 2, 0, 0);
        mesh.vertex_mut(v).halfedge = None;
        let report = check_mesh(&mut mesh, &CheckOptions::default()).unwrap();
        assert_eq!(report.issues, vec![MeshIssue::BrokenSiblingChain { vertex: v }]);
    }

    #[test]
    fn test_create_aabb() {
        let mut mesh = Mesh::new("points");
        mesh.add_vertex_at("a", Point3::new(-1.0, 0.0, 2.0));
        mesh.add_vertex_at("b", Point3::new(3.0, 1.0, -2.0));
        let aabb = create_aabb(&mesh).unwrap();
        assert_eq!(aabb.vertex_count(), 8);
        assert_eq!(aabb.triangle_count(), 12);
        assert!(aabb.is_closed());
        assert_eq!(aabb.bounding_box(), mesh.bounding_box());

        assert!(matches!(create_aabb(&Mesh::new("empty")), Err(MeshError::EmptyMesh)));
    }
}
