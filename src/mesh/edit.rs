//! Local remeshing operators.
//!
//! - [`Mesh::remove`]: soft-delete a face and unhook it from its edges and nodes
//! - [`Mesh::flip`]: swap the shared diagonal of two adjacent triangles
//! - [`Mesh::refine`]: split a triangle 1-to-3 at its centroid
//!
//! Flip and refine check everything that could fail before they touch the
//! mesh, so a rejected edit leaves the mesh exactly as it was. Degenerate
//! geometry (zero-area faces, zero-length sides) is not an error: the
//! operator reports that it skipped.

use log::debug;

use super::builder::{build_from_triangles, to_face_vertex_with_map};
use super::geometry;
use super::index::{EdgeId, FaceId, NodeId};
use super::trimesh::Mesh;
use crate::error::{MeshError, Result};
use crate::progress::Progress;

/// Faces with area at or below this are never refined.
pub const REFINE_AREA_EPSILON: f64 = 1.0e-10;

/// Minimum sum of the two angles opposite a flippable edge, in degrees.
pub const FLIP_MIN_ANGLE_SUM: f64 = 180.0;

impl Mesh {
    fn check_face_handle(&self, f: FaceId) -> Result<()> {
        if f.index() >= self.faces.len() {
            return Err(MeshError::InvalidHandle(format!("{:?} is out of range", f)));
        }
        Ok(())
    }

    /// Soft-delete a face.
    ///
    /// The face leaves both slots of each of its edges (a surviving face in
    /// slot 1 moves down to slot 0) and the face lists of its nodes, and its
    /// `active` flag is cleared. Edges and nodes stay active. Removing an
    /// already inactive face does nothing.
    pub fn remove(&mut self, f: FaceId) -> Result<()> {
        self.check_face_handle(f)?;
        if !self.faces[f.index()].active {
            return Ok(());
        }

        let face = &self.faces[f.index()];
        let (edges, nodes) = (face.edges, face.nodes);

        for e in edges {
            self.edges[e.index()].detach(f);
        }
        for n in nodes {
            self.nodes[n.index()].faces.retain(|&g| g != f);
        }

        self.faces[f.index()].active = false;
        Ok(())
    }

    /// Flip an interior edge.
    ///
    /// With `n0, n1` the edge endpoints and `on0, on1` the corners of its two
    /// faces opposite the edge, the flip happens only when
    /// `|n0 n1|² >= |on0 on1|²` and the angles at `on0` and `on1` sum to at
    /// least 180 degrees. The two faces are then replaced by `(n0, on0, on1)`
    /// and `(n1, on1, on0)`, oriented like the faces they replace, and the old
    /// edge is marked inactive.
    ///
    /// Returns `Ok(true)` if the edge was flipped and `Ok(false)` if it was
    /// left alone (inactive, boundary, criteria not met, or degenerate).
    ///
    /// # Errors
    ///
    /// [`MeshError::NonManifoldEdge`] if `on0` and `on1` are already joined by
    /// an edge with faces; the mesh is not modified.
    pub fn flip(&mut self, e: EdgeId) -> Result<bool> {
        if e.index() >= self.edges.len() {
            return Err(MeshError::InvalidHandle(format!("{:?} is out of range", e)));
        }

        let edge = self.edge(e);
        if !edge.active {
            return Ok(false);
        }
        let [Some(f0), Some(f1)] = edge.faces else {
            return Ok(false);
        };
        let [n0, n1] = edge.nodes;

        let (Some(on0), Some(on1)) = (
            self.face(f0).opposite(n0, n1),
            self.face(f1).opposite(n0, n1),
        ) else {
            return Err(MeshError::InvalidState(format!(
                "{:?} lists a face that does not contain it",
                e
            )));
        };
        if on0 == on1 {
            debug!("flip {:?}: faces {:?} and {:?} fold onto each other", e, f0, f1);
            return Ok(false);
        }

        let d0 = geometry::length2(self.position(n0), self.position(n1));
        let d1 = geometry::length2(self.position(on0), self.position(on1));
        if d0 < d1 {
            return Ok(false);
        }

        let (Some(theta0), Some(theta1)) =
            (self.face_angle_at(f0, on0), self.face_angle_at(f1, on1))
        else {
            debug!("flip {:?}: degenerate opposite angle", e);
            return Ok(false);
        };
        if theta0 + theta1 < FLIP_MIN_ANGLE_SUM {
            return Ok(false);
        }

        if let Some(diagonal) = self.find_edge(on0, on1) {
            if self.edge(diagonal).face_count() > 0 {
                return Err(MeshError::NonManifoldEdge {
                    v0: on0.index(),
                    v1: on1.index(),
                });
            }
        }

        let (a, b) = if self.face(f0).has_directed_side(n0, n1) {
            ([n0, on1, on0], [n1, on0, on1])
        } else {
            ([n0, on0, on1], [n1, on1, on0])
        };

        self.remove(f0)?;
        self.remove(f1)?;
        self.add_face(a)?;
        self.add_face(b)?;
        self.edges[e.index()].active = false;

        debug!("flipped {:?} ({:?}-{:?} -> {:?}-{:?})", e, n0, n1, on0, on1);
        Ok(true)
    }

    /// Split a face 1-to-3 at its centroid.
    ///
    /// A new node is created at the centroid with the next sequential id, the
    /// face is removed and three faces are inserted, each pairing one side of
    /// the original with the new node.
    ///
    /// Returns the new node, or `None` if the face is inactive or its area is
    /// not above [`REFINE_AREA_EPSILON`].
    pub fn refine(&mut self, f: FaceId) -> Result<Option<NodeId>> {
        self.check_face_handle(f)?;
        if !self.face(f).active {
            return Ok(None);
        }

        let area = self.face_area(f);
        if area <= REFINE_AREA_EPSILON {
            debug!("refine {:?}: area {:e} too small, skipped", f, area);
            return Ok(None);
        }

        let [a, b, c] = self.face(f).nodes;
        let centroid = self.face_centroid(f);

        self.remove(f)?;
        let g = self.add_node(centroid);
        self.add_face([a, b, g])?;
        self.add_face([b, c, g])?;
        self.add_face([c, a, g])?;

        Ok(Some(g))
    }

    /// Attempt one flip on every interior edge that is active at call time.
    ///
    /// Edges whose flip would create a non-manifold edge are skipped.
    /// Returns the number of edges flipped.
    pub fn flip_pass(&mut self) -> Result<usize> {
        self.flip_pass_with_progress(&Progress::none())
    }

    /// Like [`Mesh::flip_pass`], reporting progress per edge.
    pub fn flip_pass_with_progress(&mut self, progress: &Progress) -> Result<usize> {
        let candidates: Vec<EdgeId> = self
            .active_edge_ids()
            .filter(|&e| self.edge(e).is_interior())
            .collect();

        let total = candidates.len();
        let mut flipped = 0;

        for (i, e) in candidates.into_iter().enumerate() {
            match self.flip(e) {
                Ok(true) => flipped += 1,
                Ok(false) => {}
                Err(err) if err.is_invalid_topology() => {
                    debug!("flip {:?} rejected: {}", e, err);
                }
                Err(err) => return Err(err),
            }
            progress.report(i + 1, total, "Flipping edges");
        }

        debug!("flip pass: {} of {} edges flipped", flipped, total);
        Ok(flipped)
    }

    /// Refine every face that is active at call time.
    ///
    /// Returns the number of faces split.
    pub fn refine_all(&mut self) -> Result<usize> {
        self.refine_all_with_progress(&Progress::none())
    }

    /// Like [`Mesh::refine_all`], reporting progress per face.
    pub fn refine_all_with_progress(&mut self, progress: &Progress) -> Result<usize> {
        let faces: Vec<FaceId> = self.active_face_ids().collect();
        let total = faces.len();
        let mut split = 0;

        for (i, f) in faces.into_iter().enumerate() {
            if self.refine(f)?.is_some() {
                split += 1;
            }
            progress.report(i + 1, total, "Refining faces");
        }

        Ok(split)
    }

    /// Rebuild the mesh from its active faces, dropping every inactive
    /// element and every node no active face uses.
    ///
    /// Returns a map from old node index to new node handle.
    pub fn compact(&mut self) -> Result<Vec<Option<NodeId>>> {
        let (vertices, faces, map) = to_face_vertex_with_map(self);
        let normals: Vec<_> = self.active_faces().map(|(_, f)| f.normal).collect();

        let mut rebuilt = build_from_triangles(&vertices, &faces)?;
        for (face, normal) in rebuilt.faces.iter_mut().zip(normals) {
            face.normal = normal;
        }
        rebuilt.update_bounds();

        debug!(
            "compacted mesh: {} -> {} nodes, {} -> {} faces",
            self.num_nodes(),
            rebuilt.num_nodes(),
            self.num_faces(),
            rebuilt.num_faces()
        );

        *self = rebuilt;
        Ok(map.into_iter().map(|m| m.map(NodeId::new)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::{grid, quad_pair, quad_pair_at, unit_cube};
    use nalgebra::Point3;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    #[test]
    fn test_remove_interior_face() {
        let mut mesh = quad_pair();
        let shared = mesh.find_edge(n(0), n(1)).unwrap();

        mesh.remove(FaceId::new(0)).unwrap();

        let f = FaceId::new(0);
        assert!(!mesh.face(f).active);
        for node in mesh.node_ids() {
            assert!(!mesh.node(node).faces().contains(&f));
        }
        for e in mesh.face(f).edges {
            assert!(!mesh.edge(e).faces.contains(&Some(f)));
            assert!(mesh.edge(e).active);
        }
        // The survivor moved into slot 0 and the edge is now a boundary.
        assert_eq!(mesh.edge(shared).faces, [Some(FaceId::new(1)), None]);
        assert!(mesh.edge(shared).is_boundary());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_remove_second_slot() {
        let mut mesh = quad_pair();
        let shared = mesh.find_edge(n(0), n(1)).unwrap();

        mesh.remove(FaceId::new(1)).unwrap();
        assert_eq!(mesh.edge(shared).faces, [Some(FaceId::new(0)), None]);
        assert_eq!(mesh.num_active_faces(), 1);
        assert_eq!(mesh.num_active_nodes(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut mesh = quad_pair();
        mesh.remove(FaceId::new(0)).unwrap();
        mesh.remove(FaceId::new(0)).unwrap();
        assert_eq!(mesh.num_active_faces(), 1);
        assert!(mesh.remove(FaceId::new(9)).is_err());
    }

    #[test]
    fn test_removed_pair_can_be_reinserted() {
        let mut mesh = quad_pair();
        mesh.remove(FaceId::new(0)).unwrap();
        let f = mesh.add_face([n(0), n(1), n(2)]).unwrap();

        let shared = mesh.find_edge(n(0), n(1)).unwrap();
        assert_eq!(mesh.edge(shared).faces, [Some(FaceId::new(1)), Some(f)]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_executes() {
        // Long shared edge, obtuse opposite angles (about 127 degrees each).
        let mut mesh = quad_pair();
        let e = mesh.find_edge(n(0), n(1)).unwrap();
        let edges_before = mesh.num_active_edges();

        assert!(mesh.flip(e).unwrap());

        assert!(!mesh.edge(e).active);
        assert!(mesh.find_edge(n(0), n(1)).is_none());
        let diagonal = mesh.find_edge(n(2), n(3)).unwrap();
        assert!(mesh.edge(diagonal).is_interior());

        assert_eq!(mesh.num_active_faces(), 2);
        assert_eq!(mesh.num_active_edges(), edges_before);
        assert_eq!(mesh.num_active_nodes(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_keeps_winding() {
        let mut mesh = quad_pair();
        let e = mesh.find_edge(n(0), n(1)).unwrap();
        mesh.flip(e).unwrap();
        mesh.set_surface_normals();

        for f in mesh.active_face_ids() {
            assert!(mesh.face(f).normal.z > 0.99, "{:?} flipped orientation", f);
        }
    }

    #[test]
    fn test_flip_rejected_when_diagonal_longer() {
        // Shared edge of length 2, opposite diagonal of length 4.
        let mut mesh = quad_pair_at([[-1.0, 0.0], [1.0, 0.0], [0.0, 2.0], [0.0, -2.0]]);
        let e = mesh.find_edge(n(0), n(1)).unwrap();

        assert!(!mesh.flip(e).unwrap());
        assert!(mesh.edge(e).active);
        assert!(mesh.find_edge(n(2), n(3)).is_none());
    }

    #[test]
    fn test_flip_rejected_when_angles_too_small() {
        // d0 = 16 >= d1 = 13, but the opposite angles sum to about 160 degrees.
        let mut mesh = quad_pair_at([[-2.0, 0.0], [2.0, 0.0], [0.0, 1.0], [3.0, -1.0]]);
        let e = mesh.find_edge(n(0), n(1)).unwrap();

        let sum = mesh.face_angle_at(FaceId::new(0), n(2)).unwrap()
            + mesh.face_angle_at(FaceId::new(1), n(3)).unwrap();
        assert!(sum < FLIP_MIN_ANGLE_SUM);

        assert!(!mesh.flip(e).unwrap());
        assert_eq!(mesh.num_active_faces(), 2);
        assert!(mesh.edge(e).active);
    }

    #[test]
    fn test_flip_boundary_and_inactive_noop() {
        let mut mesh = quad_pair();
        let boundary = mesh.find_edge(n(1), n(2)).unwrap();
        assert!(!mesh.flip(boundary).unwrap());

        let e = mesh.find_edge(n(0), n(1)).unwrap();
        assert!(mesh.flip(e).unwrap());
        assert!(!mesh.flip(e).unwrap());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_onto_existing_edge_rejected() {
        // In a tetrahedron the other diagonal of any two faces is already an edge.
        let mut mesh = Mesh::new();
        for p in [
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [2.0, 0.2, 0.1],
            [2.0, -0.2, 0.1],
        ] {
            mesh.add_node(Point3::new(p[0], p[1], p[2]));
        }
        for f in [[0, 1, 2], [1, 0, 3], [0, 2, 3], [1, 3, 2]] {
            mesh.add_face([n(f[0]), n(f[1]), n(f[2])]).unwrap();
        }
        let e = mesh.find_edge(n(0), n(1)).unwrap();

        let err = mesh.flip(e).unwrap_err();
        assert!(err.is_invalid_topology());
        assert!(mesh.edge(e).active);
        assert_eq!(mesh.num_active_faces(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_refine_splits_one_into_three() {
        let mut mesh = quad_pair();
        let nodes_before = mesh.num_active_nodes();
        let faces_before = mesh.num_active_faces();

        let g = mesh.refine(FaceId::new(0)).unwrap().unwrap();

        assert_eq!(g.index(), nodes_before);
        assert_eq!(mesh.num_active_nodes(), nodes_before + 1);
        assert_eq!(mesh.num_active_faces(), faces_before + 2);
        assert!(!mesh.face(FaceId::new(0)).active);
        assert_eq!(mesh.node(g).faces().len(), 3);
        assert!((mesh.position(g) - Point3::new(0.0, 1.0 / 3.0, 0.0)).norm() < 1e-12);

        // The shared edge is still interior, now against one of the new faces.
        let shared = mesh.find_edge(n(0), n(1)).unwrap();
        assert!(mesh.edge(shared).is_interior());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_refine_preserves_area() {
        let mut mesh = quad_pair();
        let area = mesh.surface_area();
        mesh.refine(FaceId::new(1)).unwrap();
        assert!((mesh.surface_area() - area).abs() < 1e-12);
    }

    #[test]
    fn test_refine_degenerate_skipped() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_node(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_node(Point3::new(2.0, 0.0, 0.0));
        let f = mesh.add_face([a, b, c]).unwrap();

        assert_eq!(mesh.refine(f).unwrap(), None);
        assert_eq!(mesh.num_active_nodes(), 3);
        assert_eq!(mesh.num_active_faces(), 1);
        assert!(mesh.face(f).active);
    }

    #[test]
    fn test_refine_tiny_area_skipped() {
        // Right triangle with legs 1e-6: area 5e-13, positive but under the threshold.
        let mut mesh = Mesh::new();
        let a = mesh.add_node(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_node(Point3::new(1.0e-6, 0.0, 0.0));
        let c = mesh.add_node(Point3::new(0.0, 1.0e-6, 0.0));
        let f = mesh.add_face([a, b, c]).unwrap();

        let area = mesh.face_area(f);
        assert!(area > 0.0 && area <= REFINE_AREA_EPSILON);
        assert_eq!(mesh.refine(f).unwrap(), None);
        assert_eq!(mesh.num_nodes(), 3);
        assert_eq!(mesh.num_active_faces(), 1);

        // Legs of 1e-4 give area 5e-9, which is refined.
        let d = mesh.add_node(Point3::new(1.0e-4, 0.0, 1.0));
        let e = mesh.add_node(Point3::new(0.0, 1.0e-4, 1.0));
        let g = mesh.add_node(Point3::new(0.0, 0.0, 1.0));
        let big = mesh.add_face([g, d, e]).unwrap();
        assert!(mesh.refine(big).unwrap().is_some());
    }

    #[test]
    fn test_refine_inactive_skipped() {
        let mut mesh = quad_pair();
        mesh.remove(FaceId::new(0)).unwrap();
        assert_eq!(mesh.refine(FaceId::new(0)).unwrap(), None);
        assert_eq!(mesh.num_nodes(), 4);
    }

    #[test]
    fn test_cube_refine_then_flip() {
        let mut mesh = unit_cube();

        mesh.refine(FaceId::new(0)).unwrap().unwrap();
        assert_eq!(mesh.num_active_faces(), 14);
        assert_eq!(mesh.num_active_nodes(), 9);

        // Face 1 is still intact; try the diagonal it shares with face 0's square.
        let face = mesh.face(FaceId::new(1)).clone();
        assert!(face.active);
        let e = face
            .edges
            .into_iter()
            .find(|&e| mesh.edge(e).is_interior())
            .unwrap();

        let faces_before = mesh.num_active_faces();
        let flipped = mesh.flip(e).unwrap();
        assert_eq!(mesh.num_active_faces(), faces_before);
        assert_eq!(mesh.edge(e).active, !flipped);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_pass() {
        let mut mesh = quad_pair();
        assert_eq!(mesh.flip_pass().unwrap(), 1);
        assert_eq!(mesh.flip_pass().unwrap(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_refine_all() {
        let mut mesh = grid(3);
        let faces = mesh.num_active_faces();
        let nodes = mesh.num_active_nodes();

        assert_eq!(mesh.refine_all().unwrap(), faces);
        assert_eq!(mesh.num_active_faces(), faces * 3);
        assert_eq!(mesh.num_active_nodes(), nodes + faces);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_refine_then_flip_pass_restores_regularity() {
        let mut mesh = grid(4);
        mesh.refine_all().unwrap();
        let area = mesh.surface_area();

        let flipped = mesh.flip_pass().unwrap();
        assert!(flipped > 0);
        assert!((mesh.surface_area() - area).abs() < 1e-9);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_compact() {
        let mut mesh = quad_pair();
        mesh.refine(FaceId::new(0)).unwrap();
        mesh.remove(FaceId::new(1)).unwrap();
        let area = mesh.surface_area();

        let map = mesh.compact().unwrap();

        assert_eq!(map.len(), 5);
        // Node 3 was only used by the removed face.
        assert_eq!(map[3], None);
        assert_eq!(map[4], Some(NodeId::new(3)));
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_active_faces(), 3);
        assert_eq!(mesh.num_edges(), mesh.num_active_edges());
        assert!((mesh.surface_area() - area).abs() < 1e-12);
        assert!(mesh.is_valid());
    }
}
