//! Mesh construction utilities.
//!
//! Converts between [`Mesh`] and plain face-vertex lists, the form used by
//! the mesh file formats.

use nalgebra::Point3;

use super::index::NodeId;
use super::trimesh::Mesh;
use crate::error::{MeshError, Result};

/// Build a mesh from vertices and triangle faces.
///
/// Node `i` of the result sits at `vertices[i]`, and faces are inserted in
/// order through [`Mesh::add_face`].
///
/// # Example
/// ```
/// use affine_motion::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_nodes(), 3);
/// assert_eq!(mesh.num_active_faces(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Mesh> {
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
    }

    let mut mesh = Mesh::with_capacity(vertices.len(), faces.len());
    for &pos in vertices {
        mesh.add_node(pos);
    }
    for face in faces {
        mesh.add_face([NodeId::new(face[0]), NodeId::new(face[1]), NodeId::new(face[2])])?;
    }

    mesh.update_bounds();
    Ok(mesh)
}

/// Dense 0-based indices for the nodes used by active faces, in node id order.
///
/// Entry `i` is `None` when node `i` is not used by any active face.
pub fn compaction_map(mesh: &Mesh) -> Vec<Option<usize>> {
    let mut used = vec![false; mesh.num_nodes()];
    for (_, face) in mesh.active_faces() {
        for n in face.nodes {
            used[n.index()] = true;
        }
    }

    let mut next = 0;
    used.into_iter()
        .map(|u| {
            u.then(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}

/// Convert the active part of a mesh to a face-vertex representation.
///
/// Only nodes used by active faces are emitted, in node id order, so the
/// output is the same for the same mesh state.
pub fn to_face_vertex(mesh: &Mesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let (vertices, faces, _) = to_face_vertex_with_map(mesh);
    (vertices, faces)
}

pub(crate) fn to_face_vertex_with_map(
    mesh: &Mesh,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>, Vec<Option<usize>>) {
    let map = compaction_map(mesh);

    let vertices: Vec<Point3<f64>> = mesh
        .node_ids()
        .filter(|n| map[n.index()].is_some())
        .map(|n| *mesh.position(n))
        .collect();

    // Every corner of an active face is in the map by construction.
    let faces: Vec<[usize; 3]> = mesh
        .active_faces()
        .map(|(_, f)| f.nodes.map(|n| map[n.index()].unwrap_or_default()))
        .collect();

    (vertices, faces, map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FaceId;
    use crate::mesh::tests::quad_pair;

    #[test]
    fn test_invalid_index() {
        let vertices = vec![Point3::origin(); 3];
        let err = build_from_triangles(&vertices, &[[0, 1, 2], [0, 1, 5]]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { face: 1, vertex: 5 }));
    }

    #[test]
    fn test_degenerate_input() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let err = build_from_triangles(&vertices, &[[0, 1, 1]]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { .. }));
    }

    #[test]
    fn test_empty_face_list() {
        let vertices = vec![Point3::new(1.0, 2.0, 3.0)];
        let mesh = build_from_triangles(&vertices, &[]).unwrap();
        assert_eq!(mesh.num_nodes(), 1);
        assert_eq!(mesh.num_faces(), 0);
    }

    #[test]
    fn test_to_face_vertex_skips_unused_nodes() {
        let mut mesh = quad_pair();
        mesh.remove(FaceId::new(1)).unwrap();

        let (vertices, faces) = to_face_vertex(&mesh);
        assert_eq!(vertices.len(), 3);
        assert_eq!(faces, vec![[0, 1, 2]]);
        assert_eq!(compaction_map(&mesh), vec![Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn test_roundtrip_through_face_vertex() {
        let mesh = quad_pair();
        let (vertices, faces) = to_face_vertex(&mesh);
        let rebuilt = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(rebuilt.num_edges(), mesh.num_edges());
        for n in mesh.node_ids() {
            assert_eq!(rebuilt.position(n), mesh.position(n));
        }
    }
}
