//! Core mesh data structures.
//!
//! This module provides a topological triangle mesh with explicit node,
//! edge and face records, plus the local editing operators that keep their
//! adjacency consistent.
//!
//! # Overview
//!
//! The primary type is [`Mesh`]. It owns three append-only arenas and hands
//! out typed handles ([`NodeId`], [`EdgeId`], [`FaceId`]) into them. Each
//! edge knows its two endpoints and up to two faces; each face knows its
//! three nodes and three sides; each node knows its incident faces and the
//! edges for which it is the lower-id endpoint.
//!
//! Elements are never erased. Editing operators clear `active` flags, so any
//! traversal over raw element lists must skip inactive elements.
//!
//! # Construction
//!
//! ```
//! use affine_motion::mesh::{Mesh, NodeId};
//! use nalgebra::Point3;
//!
//! let mut mesh = Mesh::new();
//! let a = mesh.add_node(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_node(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_node(Point3::new(0.0, 1.0, 0.0));
//! let d = mesh.add_node(Point3::new(1.0, 1.0, 0.0));
//!
//! mesh.add_face([a, b, c]).unwrap();
//! mesh.add_face([c, b, d]).unwrap();
//!
//! // The shared side is a single edge with two faces.
//! let shared = mesh.find_edge(b, c).unwrap();
//! assert!(mesh.edge(shared).is_interior());
//! ```
//!
//! # Editing
//!
//! ```
//! use affine_motion::mesh::{build_from_triangles, FaceId};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//!
//! mesh.refine(FaceId::new(0)).unwrap();
//! assert_eq!(mesh.num_active_faces(), 3);
//! assert_eq!(mesh.num_active_nodes(), 4);
//! ```

mod builder;
mod edit;
mod element;
pub mod geometry;
mod index;
mod trimesh;

pub use builder::{build_from_triangles, compaction_map, to_face_vertex};
pub use edit::{FLIP_MIN_ANGLE_SUM, REFINE_AREA_EPSILON};
pub use element::{Edge, Face, Node};
pub use index::{EdgeId, FaceId, NodeId};
pub use trimesh::Mesh;
