//! Mesh simplification by vertex collapse ("redux").
//!
//! Each vertex carries a quadric, the sum of squared distances to the planes
//! of its original triangles (Garland & Heckbert, 1997). Every vertex keeps
//! its cheapest valid neighbor as collapse target, the cost being the
//! combined quadric of both vertices evaluated at the target position. The
//! globally cheapest vertex is merged into its target, then the costs around
//! the target are refreshed.
//!
//! A collapse is refused when it would make the mesh non-manifold (see
//! [`Mesh::check_collapse`]), produce a zero-area triangle, or tilt an
//! adjacent triangle normal further than
//! [`ReduxOptions::max_normal_deviation`].
//!
//! # Example
//!
//! ```
//! use facette::algo::decimate::{redux_count, ReduxOptions};
//! use facette::algo::shapes::{sphere_tess, Platonic};
//!
//! let mut mesh = sphere_tess(Platonic::Icosahedron, 2).unwrap();
//! let report = redux_count(&mut mesh, 40, &ReduxOptions::default()).unwrap();
//!
//! assert_eq!(report.removed, 40);
//! assert!(mesh.is_closed());
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using Quadric
//!   Error Metrics." SIGGRAPH '97.
//!
//! [`Mesh::check_collapse`]: crate::mesh::Mesh::check_collapse

mod qem;

pub use qem::{redux_cost, redux_count, redux_count_with_progress};

use std::f64::consts::FRAC_PI_2;

/// Options for mesh simplification.
#[derive(Debug, Clone)]
pub struct ReduxOptions {
    /// Largest angle, in radians, an adjacent triangle normal may turn by
    /// during one collapse (default: π/2).
    pub max_normal_deviation: f64,

    /// Whether to compute the initial quadrics in parallel (default: true).
    pub parallel: bool,
}

impl Default for ReduxOptions {
    fn default() -> Self {
        Self {
            max_normal_deviation: FRAC_PI_2,
            parallel: true,
        }
    }
}

impl ReduxOptions {
    /// Set the largest allowed normal deviation, in radians.
    pub fn with_max_normal_deviation(mut self, angle: f64) -> Self {
        self.max_normal_deviation = angle;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Use sequential execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Outcome of a simplification run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduxReport {
    /// Vertices asked to be removed (`usize::MAX` for cost-bounded runs).
    pub requested: usize,
    /// Vertices actually removed.
    pub removed: usize,
    /// Highest cost among the collapses performed, zero if none.
    pub max_cost: f64,
}

impl ReduxReport {
    /// True when every requested vertex was removed.
    pub fn is_complete(&self) -> bool {
        self.removed == self.requested
    }
}
