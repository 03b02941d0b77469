//! The mesh container.
//!
//! [`Mesh`] owns three append-only arenas (nodes, edges, faces). Faces are
//! inserted through [`Mesh::add_face`], which resolves or creates the three
//! sides and wires all back-references. Nothing is ever erased: local edits
//! clear `active` flags instead, so handles stay valid for the life of the
//! mesh. Memory therefore grows with every edit; call
//! [`Mesh::compact`](Mesh::compact) to rebuild dense arrays after a long
//! editing session.

use nalgebra::{Point3, Vector3};

use super::element::{Edge, Face, Node};
use super::geometry;
use super::index::{EdgeId, FaceId, NodeId};
use crate::error::{MeshError, Result};

/// A triangle mesh with explicit node, edge and face adjacency.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,

    /// Bounding sphere, used only for framing the mesh in a viewer.
    center: Point3<f64>,
    radius: f64,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            center: Point3::origin(),
            radius: 0.0,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_nodes: usize, num_faces: usize) -> Self {
        // Closed triangle meshes have E = 3F/2.
        let num_edges = num_faces * 3 / 2 + num_faces / 4;

        Self {
            nodes: Vec::with_capacity(num_nodes),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
            center: Point3::origin(),
            radius: 0.0,
        }
    }

    // ==================== Accessors ====================

    /// Number of nodes ever allocated, active or not.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges ever allocated, active or not.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces ever allocated, active or not.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of active nodes.
    pub fn num_active_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.active).count()
    }

    /// Number of active edges.
    pub fn num_active_edges(&self) -> usize {
        self.edges.iter().filter(|e| e.active).count()
    }

    /// Number of active faces.
    pub fn num_active_faces(&self) -> usize {
        self.faces.iter().filter(|f| f.active).count()
    }

    /// Get a node by handle.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get an edge by handle.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Get a face by handle.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a node.
    #[inline]
    pub fn position(&self, id: NodeId) -> &Point3<f64> {
        &self.node(id).position
    }

    /// Move a node. Face normals are not refreshed.
    #[inline]
    pub fn set_position(&mut self, id: NodeId, pos: Point3<f64>) {
        self.nodes[id.index()].position = pos;
    }

    /// Center of the bounding sphere computed by [`Mesh::update_bounds`].
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Radius of the bounding sphere computed by [`Mesh::update_bounds`].
    pub fn radius(&self) -> f64 {
        self.radius
    }

    // ==================== Iteration ====================

    /// Iterate over all node handles, in id order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Iterate over active edge handles.
    pub fn active_edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Iterate over active face handles.
    pub fn active_face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.active)
            .map(|(i, _)| FaceId::new(i))
    }

    /// Iterate over active faces with their handles.
    pub fn active_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.active)
            .map(|(i, f)| (FaceId::new(i), f))
    }

    // ==================== Construction ====================

    /// Add an isolated node and return its handle.
    ///
    /// The handle index is the node count at the time of the call, which is
    /// also the node's identifier.
    pub fn add_node(&mut self, position: Point3<f64>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(position));
        id
    }

    /// Find the active edge joining `a` and `b`, in either order.
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        let owner = a.min(b);
        self.node(owner)
            .edges
            .iter()
            .copied()
            .find(|&e| {
                let edge = self.edge(e);
                edge.active && edge.has_nodes(a, b)
            })
    }

    /// Resolve the edge `(n0, n1)` for `face`, creating it if needed.
    ///
    /// An existing edge gets `face` in its free slot. A new edge is
    /// registered on the lower-id endpoint and in the global edge list.
    pub(crate) fn add_edge(&mut self, n0: NodeId, n1: NodeId, face: FaceId) -> Result<EdgeId> {
        if let Some(e) = self.find_edge(n0, n1) {
            if !self.edges[e.index()].attach(face) {
                return Err(MeshError::NonManifoldEdge {
                    v0: n0.index(),
                    v1: n1.index(),
                });
            }
            return Ok(e);
        }

        let id = EdgeId::new(self.edges.len());
        let mut edge = Edge::new(n0, n1);
        edge.attach(face);
        self.edges.push(edge);
        self.nodes[n0.min(n1).index()].edges.push(id);
        Ok(id)
    }

    /// Check that a triangle over `nodes` could be inserted right now.
    pub(crate) fn check_face(&self, nodes: [NodeId; 3]) -> Result<()> {
        for n in nodes {
            if n.index() >= self.nodes.len() || !self.node(n).active {
                return Err(MeshError::InvalidHandle(format!("{:?} is not a live node", n)));
            }
        }

        let [n0, n1, n2] = nodes;
        if n0 == n1 || n1 == n2 || n2 == n0 {
            return Err(MeshError::DegenerateFace {
                nodes: [n0.index(), n1.index(), n2.index()],
            });
        }

        for i in 0..3 {
            let a = nodes[i];
            let b = nodes[(i + 1) % 3];
            if let Some(e) = self.find_edge(a, b) {
                if self.edge(e).face_count() == 2 {
                    return Err(MeshError::NonManifoldEdge {
                        v0: a.index(),
                        v1: b.index(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Insert the triangle `(n0, n1, n2)`.
    ///
    /// Resolves or creates the three sides, records the face on its nodes and
    /// appends it to the face list. The insertion is rejected, leaving the
    /// mesh untouched, if the nodes are not pairwise distinct
    /// ([`MeshError::DegenerateFace`]) or if a side already has two faces
    /// ([`MeshError::NonManifoldEdge`]).
    ///
    /// The face normal is left at zero until [`Mesh::set_surface_normals`].
    pub fn add_face(&mut self, nodes: [NodeId; 3]) -> Result<FaceId> {
        self.check_face(nodes)?;

        let id = FaceId::new(self.faces.len());
        let [n0, n1, n2] = nodes;

        let edges = [
            self.add_edge(n0, n1, id)?,
            self.add_edge(n1, n2, id)?,
            self.add_edge(n2, n0, id)?,
        ];

        for n in nodes {
            self.nodes[n.index()].faces.push(id);
        }

        self.faces.push(Face {
            nodes,
            edges,
            normal: Vector3::zeros(),
            active: true,
        });

        Ok(id)
    }

    // ==================== Geometry ====================

    /// Positions of the three corners of a face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [a, b, c] = self.face(f).nodes;
        [*self.position(a), *self.position(b), *self.position(c)]
    }

    /// Area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [a, b, c] = self.face_positions(f);
        geometry::triangle_area(&a, &b, &c)
    }

    /// Centroid of a face.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        let [a, b, c] = self.face_positions(f);
        geometry::centroid(&a, &b, &c)
    }

    /// Interior angle of face `f` at corner `node`, in degrees.
    ///
    /// `None` if `node` is not a corner or the angle is undefined.
    pub fn face_angle_at(&self, f: FaceId, node: NodeId) -> Option<f64> {
        let face = self.face(f);
        let pos = face.position_of(node)?;
        let b = face.nodes[(pos + 1) % 3];
        let c = face.nodes[(pos + 2) % 3];
        geometry::angle_at(self.position(node), self.position(b), self.position(c))
    }

    /// Recompute the unit normal of every active face.
    ///
    /// Zero-area faces get a zero normal.
    pub fn set_surface_normals(&mut self) {
        for i in 0..self.faces.len() {
            if !self.faces[i].active {
                continue;
            }
            let [a, b, c] = self.face_positions(FaceId::new(i));
            self.faces[i].normal = geometry::unit_normal(&a, &b, &c).unwrap_or_else(Vector3::zeros);
        }
    }

    /// Total area of the active faces.
    pub fn surface_area(&self) -> f64 {
        self.active_face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Number of active edges with exactly one incident face.
    pub fn num_boundary_edges(&self) -> usize {
        self.edges
            .iter()
            .filter(|e| e.active && e.face_count() == 1)
            .count()
    }

    /// Axis-aligned bounds of the active nodes.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.nodes.iter().filter(|n| n.active);
        let first = iter.next()?.position;
        let (mut min, mut max) = (first, first);

        for n in iter {
            for i in 0..3 {
                min[i] = min[i].min(n.position[i]);
                max[i] = max[i].max(n.position[i]);
            }
        }

        Some((min, max))
    }

    /// Refresh the bounding sphere from the active nodes.
    pub fn update_bounds(&mut self) {
        match self.bounding_box() {
            Some((min, max)) => {
                self.center = nalgebra::center(&min, &max);
                self.radius = 0.5 * (max - min).norm();
            }
            None => {
                self.center = Point3::origin();
                self.radius = 0.0;
            }
        }
    }

    // ==================== Validation ====================

    /// Check that all adjacency is consistent.
    ///
    /// Verifies that active faces have distinct active nodes, that each side
    /// of an active face is an active edge listing the face, that edge slots
    /// only name active faces containing the edge, and that node face lists
    /// hold exactly the active faces using the node.
    pub fn is_valid(&self) -> bool {
        for (fid, face) in self.active_faces() {
            let [n0, n1, n2] = face.nodes;
            if n0 == n1 || n1 == n2 || n2 == n0 {
                return false;
            }
            for i in 0..3 {
                let a = face.nodes[i];
                let b = face.nodes[(i + 1) % 3];
                if !self.node(a).active {
                    return false;
                }
                let edge = self.edge(face.edges[i]);
                if !edge.active || !edge.has_nodes(a, b) || !edge.faces.contains(&Some(fid)) {
                    return false;
                }
                if !self.node(a).faces.contains(&fid) {
                    return false;
                }
            }
        }

        for edge in self.edges.iter().filter(|e| e.active) {
            if edge.faces[0].is_none() && edge.faces[1].is_some() {
                return false;
            }
            if edge.faces[0].is_some() && edge.faces[0] == edge.faces[1] {
                return false;
            }
            for f in edge.faces.iter().flatten() {
                let face = self.face(*f);
                if !face.active || face.opposite(edge.nodes[0], edge.nodes[1]).is_none() {
                    return false;
                }
            }
        }

        for (nid, node) in self.nodes.iter().enumerate() {
            for f in &node.faces {
                let face = self.face(*f);
                if !face.active || face.position_of(NodeId::new(nid)).is_none() {
                    return false;
                }
            }
            for e in &node.edges {
                let edge = self.edge(*e);
                if edge.nodes[0].min(edge.nodes[1]).index() != nid {
                    return false;
                }
            }
        }

        true
    }
}
