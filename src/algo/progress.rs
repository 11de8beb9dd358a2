//! Progress reporting for long-running algorithms.
//!
//! Iterative algorithms (subdivision, redux) take a [`Progress`] in their
//! `*_with_progress` variants and report once per step.
//!
//! # Example
//!
//! ```
//! use facette::algo::progress::Progress;
//! use facette::algo::shapes::{platonic, Platonic};
//! use facette::algo::subdivide::{subdivide_all_with_progress, SubdivideOptions};
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let mut mesh = platonic(Platonic::Octahedron).unwrap();
//! let triangles = mesh.triangle_ids().to_vec();
//! subdivide_all_with_progress(&mut mesh, &triangles, &SubdivideOptions::new(2), &progress).unwrap();
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
