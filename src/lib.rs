//! # affine-motion
//!
//! Triangle mesh editing and smooth interpolation of affine motions.
//!
//! The crate has two halves:
//!
//! - [`mesh`]: a topological triangle mesh with explicit node, edge and face
//!   adjacency, stable handles, and local edits (edge flip, 1-to-3 refine,
//!   soft face removal) that keep the adjacency consistent.
//! - [`motion`]: an engine that moves a mesh from the identity to a 4x4 end
//!   pose `A` along `exp(t · log A)`, so every intermediate frame is itself a
//!   valid affine transform.
//!
//! ## Quick Start
//!
//! ```no_run
//! use affine_motion::prelude::*;
//!
//! let mut motion = AffineMotion::new(MotionOptions::new(100)).unwrap();
//! motion.load_mesh("bunny.off").unwrap();
//! motion.load_affinity_matrix("pose.txt").unwrap();
//!
//! while let Some(t) = motion.advance().unwrap() {
//!     let mesh = motion.current().unwrap();
//!     println!("t = {:.2}: area {}", t, mesh.surface_area());
//! }
//!
//! affine_motion::io::save(motion.current().unwrap(), "end.obj").unwrap();
//! ```
//!
//! ## Editing Meshes
//!
//! ```
//! use affine_motion::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(-2.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2], [1, 0, 3]];
//! let mut mesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! // The long shared edge is replaced by the short diagonal.
//! let shared = mesh.find_edge(NodeId::new(0), NodeId::new(1)).unwrap();
//! assert!(mesh.flip(shared).unwrap());
//! assert!(mesh.find_edge(NodeId::new(2), NodeId::new(3)).is_some());
//!
//! // Split every face at its centroid.
//! assert_eq!(mesh.refine_all().unwrap(), 2);
//! assert_eq!(mesh.num_active_faces(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod motion;
pub mod progress;

/// Prelude module for convenient imports.
///
/// ```
/// use affine_motion::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, Edge, EdgeId, Face, FaceId, Mesh, Node, NodeId,
    };
    pub use crate::motion::{
        apply_transform, AffineMotion, Command, CommandOutcome, DisplayOptions, LieGroup,
        MatrixLieGroup, MotionOptions, MotionState,
    };
    pub use crate::progress::Progress;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
