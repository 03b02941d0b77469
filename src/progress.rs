//! Progress reporting for batch operations.
//!
//! Batch edits ([`Mesh::flip_pass`](crate::mesh::Mesh::flip_pass),
//! [`Mesh::refine_all`](crate::mesh::Mesh::refine_all)) and frame export
//! call a [`Progress`] after each unit of work so a front end can draw a
//! progress bar.
//!
//! # Example
//!
//! ```
//! use affine_motion::progress::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 10, "Refining faces");
//! ```

/// A progress callback that receives updates during batch operations.
///
/// The callback receives:
/// - `current`: Number of units finished
/// - `total`: Total number of units
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
