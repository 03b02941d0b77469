//! Wavefront OBJ support.
//!
//! The writer produces the minimal dump used for saving edited meshes: one
//! `v x y z` line per node used by an active face, in node id order, then one
//! `f a b c` line per active face with 1-based indices. There is no header.
//!
//! Reading goes through the `wavefront_obj` parser, which triangulates
//! polygons. Only positions and triangles are kept: texture coordinates,
//! normals, points and lines are dropped. Objects are concatenated in file
//! order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use nalgebra::Point3;
use wavefront_obj::obj::Primitive;

use super::with_path;
use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, Mesh};

/// Write the active part of a mesh as OBJ text.
///
/// Output depends only on the mesh state, so saving the same mesh twice
/// gives identical files.
pub fn write<W: Write>(mesh: &Mesh, mut writer: W) -> Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);

    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for f in &faces {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }

    writer.flush()?;
    Ok(())
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use affine_motion::io::obj;
/// use affine_motion::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    write(mesh, BufWriter::new(file))?;
    info!(
        "mesh written to {} ({} faces)",
        path.display(),
        mesh.num_active_faces()
    );
    Ok(())
}

/// Read an OBJ mesh from a reader.
pub fn read<R: BufRead>(mut reader: R) -> Result<Mesh> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let set = wavefront_obj::obj::parse(text)
        .map_err(|e| MeshError::format(e.line_number, e.message))?;

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();
    let mut skipped = 0;

    for object in set.objects {
        // Corner indices are relative to the object's own vertex list.
        let offset = vertices.len();
        vertices.extend(object.vertices.iter().map(|v| Point3::new(v.x, v.y, v.z)));

        for shape in object.geometry.into_iter().flat_map(|g| g.shapes) {
            match shape.primitive {
                Primitive::Triangle(a, b, c) => {
                    faces.push([offset + a.0, offset + b.0, offset + c.0]);
                }
                Primitive::Point(_) | Primitive::Line(..) => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!("skipped {} point and line elements", skipped);
    }
    build_from_triangles(&vertices, &faces)
}

/// Load an OBJ mesh from a file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mesh = read(BufReader::new(file)).map_err(|e| with_path(e, path))?;
    info!(
        "loaded {}: {} nodes, {} faces",
        path.display(),
        mesh.num_nodes(),
        mesh.num_faces()
    );
    Ok(mesh)
}
