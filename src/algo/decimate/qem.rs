//! Quadric error metrics and the collapse queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{unit_or_zero, Mesh, TriangleGeometry, TriangleId, VertexId};

use super::{ReduxOptions, ReduxReport};

/// A quadric error matrix (4x4 symmetric matrix).
///
/// Represents the sum of squared distances to a set of planes.
/// Stored as 10 unique elements since the matrix is symmetric.
#[derive(Debug, Clone, Copy)]
struct Quadric {
    /// Upper triangular elements: [a, b, c, d, e, f, g, h, i, j]
    /// Matrix form:
    /// | a b c d |
    /// | b e f g |
    /// | c f h i |
    /// | d g i j |
    data: [f64; 10],
}

impl Quadric {
    fn zero() -> Self {
        Self { data: [0.0; 10] }
    }

    /// Quadric of the plane `ax + by + cz + d = 0`, scaled by the squared
    /// norm of `(a, b, c)`.
    fn from_plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            data: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    /// Plane of a triangle, weighted by `1 / sqrt(area)`.
    ///
    /// Degenerate triangles have no plane.
    fn from_triangle(geometry: &TriangleGeometry) -> Option<Self> {
        if geometry.is_degenerate() {
            return None;
        }
        let s = 1.0 / geometry.area.sqrt();
        let n = geometry.normal * s;
        Some(Self::from_plane(n.x, n.y, n.z, geometry.w * s))
    }

    fn add_assign(&mut self, other: &Quadric) {
        for i in 0..10 {
            self.data[i] += other.data[i];
        }
    }

    /// Returns v^T * Q * v where v = [x, y, z, 1].
    fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let (x, y, z) = (p.x, p.y, p.z);
        self.data[0] * x * x
            + 2.0 * self.data[1] * x * y
            + 2.0 * self.data[2] * x * z
            + 2.0 * self.data[3] * x
            + self.data[4] * y * y
            + 2.0 * self.data[5] * y * z
            + 2.0 * self.data[6] * y
            + self.data[7] * z * z
            + 2.0 * self.data[8] * z
            + self.data[9]
    }
}

impl std::ops::Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        let mut result = self;
        result.add_assign(&other);
        result
    }
}

/// The cheapest valid collapse of a vertex.
#[derive(Debug, Clone)]
struct Candidate {
    vertex: VertexId,
    target: VertexId,
    cost: f64,
    /// Version of `vertex` when the candidate was computed.
    version: usize,
}

// Reversed for a min-heap; ties go to the lowest vertex id.
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// When to stop collapsing.
#[derive(Debug, Clone, Copy)]
enum Stop {
    Count(usize),
    Cost(f64),
}

/// Simplification state over a mesh.
struct Redux<'a> {
    mesh: &'a mut Mesh,
    quadrics: Vec<Quadric>,
    versions: Vec<usize>,
    heap: BinaryHeap<Candidate>,
    min_cos: f64,
}

impl<'a> Redux<'a> {
    fn new(mesh: &'a mut Mesh, options: &ReduxOptions) -> Self {
        mesh.compute_normals();

        let view: &Mesh = mesh;
        let planes = |&t: &TriangleId| {
            Quadric::from_triangle(view.triangle(t).geometry()).map(|q| (t, q))
        };
        let planes: Vec<(TriangleId, Quadric)> = if options.parallel {
            view.triangle_ids().par_iter().filter_map(planes).collect()
        } else {
            view.triangle_ids().iter().filter_map(planes).collect()
        };

        let slots = mesh.vertices.len();
        let mut quadrics = vec![Quadric::zero(); slots];
        for (t, q) in &planes {
            for v in mesh.triangle_vertices(*t) {
                quadrics[v.index()].add_assign(q);
            }
        }

        let mut redux = Self {
            mesh,
            quadrics,
            versions: vec![0; slots],
            heap: BinaryHeap::new(),
            min_cos: options.max_normal_deviation.cos(),
        };
        for v in redux.mesh.vertex_ids().to_vec() {
            redux.push_candidate(v);
        }
        redux
    }

    fn cost(&self, u: VertexId, v: VertexId) -> f64 {
        (self.quadrics[u.index()] + self.quadrics[v.index()]).evaluate(self.mesh.position(v))
    }

    /// True when merging `u` into `v` keeps the mesh manifold and leaves
    /// every moved triangle non-degenerate and close to its old orientation.
    fn is_valid(&self, u: VertexId, v: VertexId) -> bool {
        let mesh = &*self.mesh;
        if mesh.check_collapse(u, v).is_err() {
            return false;
        }
        let target = mesh.position(v);
        mesh.triangles_around(u)
            .into_iter()
            .filter(|&t| !mesh.triangle_contains(t, v))
            .all(|t| {
                let [a, b, c] = mesh
                    .triangle_vertices(t)
                    .map(|w| if w == u { *target } else { *mesh.position(w) });
                let moved = TriangleGeometry::from_points(&a, &b, &c);
                !moved.is_degenerate() && moved.normal.dot(mesh.triangle(t).normal()) >= self.min_cos
            })
    }

    /// Queue the cheapest valid collapse of `u`, if any.
    fn push_candidate(&mut self, u: VertexId) {
        let best = self
            .mesh
            .neighbor_vertices(u)
            .into_iter()
            .filter(|&v| self.is_valid(u, v))
            .map(|v| (v, self.cost(u, v)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((target, cost)) = best {
            self.heap.push(Candidate {
                vertex: u,
                target,
                cost,
                version: self.versions[u.index()],
            });
        }
    }

    fn is_current(&self, c: &Candidate) -> bool {
        self.mesh.get_vertex(c.vertex).is_some()
            && self.mesh.get_vertex(c.target).is_some()
            && self.versions[c.vertex.index()] == c.version
    }

    /// Merge `u` into `v`, then refresh the normals and candidates around
    /// `v`.
    fn collapse(&mut self, u: VertexId, v: VertexId) -> Result<()> {
        self.mesh.collapse_vertex(u, v)?;
        let merged = self.quadrics[u.index()];
        self.quadrics[v.index()].add_assign(&merged);

        let mut touched: Vec<VertexId> = self.mesh.neighbor_vertices(v).into_iter().collect();
        touched.push(v);
        for &w in &touched {
            let normal = self
                .mesh
                .triangles_around(w)
                .into_iter()
                .map(|t| {
                    let triangle = self.mesh.triangle(t);
                    triangle.normal() * triangle.area()
                })
                .sum();
            self.mesh.attributes_mut(w).normal = unit_or_zero(normal);
        }
        for w in touched {
            self.versions[w.index()] += 1;
            self.push_candidate(w);
        }
        Ok(())
    }

    fn run(&mut self, stop: Stop, progress: &Progress) -> Result<ReduxReport> {
        let requested = match stop {
            Stop::Count(n) => n,
            Stop::Cost(_) => usize::MAX,
        };
        let mut report = ReduxReport {
            requested,
            removed: 0,
            max_cost: 0.0,
        };

        while report.removed < requested {
            let Some(candidate) = self.heap.pop() else {
                break;
            };
            if !self.is_current(&candidate) {
                continue;
            }
            if let Stop::Cost(max_cost) = stop {
                if candidate.cost > max_cost {
                    break;
                }
            }
            if !self.is_valid(candidate.vertex, candidate.target) {
                self.versions[candidate.vertex.index()] += 1;
                self.push_candidate(candidate.vertex);
                continue;
            }

            self.collapse(candidate.vertex, candidate.target)?;
            report.removed += 1;
            report.max_cost = report.max_cost.max(candidate.cost);
            if let Stop::Count(n) = stop {
                progress.report(report.removed, n, "Collapsing vertices");
            }
            debug!(
                vertex = candidate.vertex.index(),
                target = candidate.target.index(),
                cost = candidate.cost,
                "Collapsed vertex"
            );
        }
        Ok(report)
    }
}

/// Remove `n` vertices by successive cheapest collapses.
///
/// Stops early, with a warning, when no valid collapse is left; the report
/// tells how many vertices were actually removed.
pub fn redux_count(mesh: &mut Mesh, n: usize, options: &ReduxOptions) -> Result<ReduxReport> {
    redux_count_with_progress(mesh, n, options, &Progress::none())
}

/// [`redux_count`] with progress reporting.
pub fn redux_count_with_progress(
    mesh: &mut Mesh,
    n: usize,
    options: &ReduxOptions,
    progress: &Progress,
) -> Result<ReduxReport> {
    check_options(options)?;
    let original = mesh.vertex_count();
    let report = mesh.with_deferred_compaction(|mesh| {
        Redux::new(mesh, options).run(Stop::Count(n), progress)
    })?;

    if !report.is_complete() {
        warn!(
            requested = n,
            removed = report.removed,
            "No valid collapse left, stopping early"
        );
    }
    info!(
        original_vertices = original,
        final_vertices = mesh.vertex_count(),
        final_triangles = mesh.triangle_count(),
        max_cost = report.max_cost,
        "Redux complete"
    );
    Ok(report)
}

/// Collapse vertices while the cheapest collapse costs at most `max_cost`.
pub fn redux_cost(mesh: &mut Mesh, max_cost: f64, options: &ReduxOptions) -> Result<ReduxReport> {
    check_options(options)?;
    if max_cost.is_nan() {
        return Err(MeshError::invalid_param("max_cost", max_cost, "must be a number"));
    }
    let original = mesh.vertex_count();
    let report = mesh.with_deferred_compaction(|mesh| {
        Redux::new(mesh, options).run(Stop::Cost(max_cost), &Progress::none())
    })?;

    info!(
        original_vertices = original,
        final_vertices = mesh.vertex_count(),
        removed = report.removed,
        max_cost = report.max_cost,
        "Redux complete"
    );
    Ok(report)
}

fn check_options(options: &ReduxOptions) -> Result<()> {
    let angle = options.max_normal_deviation;
    if !(angle >= 0.0 && angle.is_finite()) {
        return Err(MeshError::invalid_param(
            "max_normal_deviation",
            angle,
            "must be a non-negative angle",
        ));
    }
    Ok(())
}
