//! OFF (Object File Format) reader.
//!
//! The accepted layout is the magic token `OFF`, then
//! `<vertices> <faces> <edges>`, then one `x y z` record per vertex and one
//! `3 i j k` record per face with 0-based vertex indices. The edge count is
//! read but not checked. Faces of any degree other than 3 are rejected.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use nalgebra::Point3;

use super::{with_path, Tokens};
use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, Mesh};

/// Read an OFF mesh from a reader.
///
/// # Example
///
/// ```
/// use affine_motion::io::off;
///
/// let text = "OFF\n3 1 3\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
/// let mesh = off::read(text.as_bytes()).unwrap();
/// assert_eq!(mesh.num_active_faces(), 1);
/// ```
pub fn read<R: BufRead>(mut reader: R) -> Result<Mesh> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

/// Load an OFF mesh from a file.
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

fn parse(text: &str) -> Result<Mesh> {
    let mut tokens = Tokens::new(text);

    let magic = tokens.expect("OFF header")?;
    if magic != "OFF" {
        return Err(MeshError::format(
            tokens.line(),
            format!("expected OFF header, found {:?}", magic),
        ));
    }

    let num_vertices: usize = tokens.parse("vertex count")?;
    let num_faces: usize = tokens.parse("face count")?;
    let num_edges: usize = tokens.parse("edge count")?;

    let mut vertices = Vec::with_capacity(num_vertices);
    for _ in 0..num_vertices {
        let x = tokens.parse("x coordinate")?;
        let y = tokens.parse("y coordinate")?;
        let z = tokens.parse("z coordinate")?;
        vertices.push(Point3::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(num_faces);
    for fi in 0..num_faces {
        let degree: usize = tokens.parse("face degree")?;
        if degree != 3 {
            return Err(MeshError::format(
                tokens.line(),
                format!("face {} has {} vertices, only triangles are supported", fi, degree),
            ));
        }
        let i = tokens.parse("vertex index")?;
        let j = tokens.parse("vertex index")?;
        let k = tokens.parse("vertex index")?;
        faces.push([i, j, k]);
    }

    let mesh = build_from_triangles(&vertices, &faces)?;

    if num_edges != 0 && num_edges != mesh.num_edges() {
        warn!(
            "OFF header declares {} edges, mesh has {}",
            num_edges,
            mesh.num_edges()
        );
    }

    Ok(mesh)
}
