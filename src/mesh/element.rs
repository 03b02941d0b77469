//! Topological elements: nodes, edges and faces.
//!
//! Elements refer to each other through handles into the owning
//! [`Mesh`](super::Mesh). Every element carries an `active` flag; inactive
//! elements stay allocated and must be skipped by traversals.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, NodeId};

/// A mesh node (vertex).
#[derive(Debug, Clone)]
pub struct Node {
    /// The 3D position of this node.
    pub position: Point3<f64>,

    /// Soft-delete marker.
    pub active: bool,

    /// Edges registered on this node.
    ///
    /// An edge is registered only on the endpoint with the lower id, which is
    /// where [`Mesh::find_edge`](super::Mesh::find_edge) looks for it.
    pub(crate) edges: Vec<EdgeId>,

    /// Active faces using this node.
    pub(crate) faces: Vec<FaceId>,
}

impl Node {
    /// Create a new isolated node at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            active: true,
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Edges whose lower-id endpoint is this node.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Active faces incident on this node.
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }
}

/// An undirected edge with up to two incident faces.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The two endpoints, in the order of the face that created the edge.
    pub nodes: [NodeId; 2],

    /// Incident faces. Slot 1 is filled only when slot 0 is.
    pub faces: [Option<FaceId>; 2],

    /// Soft-delete marker.
    pub active: bool,
}

impl Edge {
    pub(crate) fn new(n0: NodeId, n1: NodeId) -> Self {
        Self {
            nodes: [n0, n1],
            faces: [None, None],
            active: true,
        }
    }

    /// True if this edge joins `a` and `b` in either order.
    #[inline]
    pub fn has_nodes(&self, a: NodeId, b: NodeId) -> bool {
        (self.nodes[0] == a && self.nodes[1] == b) || (self.nodes[0] == b && self.nodes[1] == a)
    }

    /// True if the edge has at most one incident face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.faces[1].is_none()
    }

    /// True if the edge has two incident faces.
    #[inline]
    pub fn is_interior(&self) -> bool {
        self.faces[0].is_some() && self.faces[1].is_some()
    }

    /// Number of incident faces (0, 1 or 2).
    pub fn face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_some()).count()
    }

    /// Record `face` in the first free slot. Returns false if both are taken.
    pub(crate) fn attach(&mut self, face: FaceId) -> bool {
        match self.faces {
            [None, _] => {
                self.faces[0] = Some(face);
                true
            }
            [Some(_), None] => {
                self.faces[1] = Some(face);
                true
            }
            [Some(_), Some(_)] => false,
        }
    }

    /// Drop `face` from the slots, compacting the survivor into slot 0.
    pub(crate) fn detach(&mut self, face: FaceId) {
        if self.faces[0] == Some(face) {
            self.faces[0] = self.faces[1];
            self.faces[1] = None;
        } else if self.faces[1] == Some(face) {
            self.faces[1] = None;
        }
    }
}

/// A triangle.
///
/// `edges[i]` joins `nodes[i]` and `nodes[(i + 1) % 3]`.
#[derive(Debug, Clone)]
pub struct Face {
    /// The three corners in insertion winding.
    pub nodes: [NodeId; 3],

    /// The three sides.
    pub edges: [EdgeId; 3],

    /// Unit normal, refreshed only by
    /// [`Mesh::set_surface_normals`](super::Mesh::set_surface_normals).
    pub normal: Vector3<f64>,

    /// Soft-delete marker.
    pub active: bool,
}

impl Face {
    /// Position of `node` among the corners, if it is one.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// The corner not on the side `(a, b)`, in either order.
    pub fn opposite(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        (0..3).find_map(|i| {
            let p = self.nodes[i];
            let q = self.nodes[(i + 1) % 3];
            if (p == a && q == b) || (p == b && q == a) {
                Some(self.nodes[(i + 2) % 3])
            } else {
                None
            }
        })
    }

    /// True if the face walks from `a` directly to `b`.
    pub fn has_directed_side(&self, a: NodeId, b: NodeId) -> bool {
        (0..3).any(|i| self.nodes[i] == a && self.nodes[(i + 1) % 3] == b)
    }
}
