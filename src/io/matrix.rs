//! 4x4 transform reader.
//!
//! A transform file holds 16 numbers, whitespace separated, in row-major
//! order (four rows of four). There is no header. Text after `#` on a line
//! is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use nalgebra::Matrix4;

use super::{with_path, Tokens};
use crate::error::{MeshError, Result};

/// Read a row-major 4x4 matrix.
///
/// # Example
///
/// ```
/// use affine_motion::io::matrix;
///
/// let text = "1 0 0 5\n0 1 0 0\n0 0 1 0\n0 0 0 1\n";
/// let m = matrix::read(text.as_bytes()).unwrap();
/// assert_eq!(m[(0, 3)], 5.0);
/// ```
pub fn read<R: BufRead>(mut reader: R) -> Result<Matrix4<f64>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut tokens = Tokens::new(&text);
    let mut values = [0.0f64; 16];
    for (i, value) in values.iter_mut().enumerate() {
        *value = tokens.parse(&format!("matrix entry ({}, {})", i / 4, i % 4))?;
    }

    if tokens.remaining() > 0 {
        warn!(
            "ignoring {} trailing tokens after the 16 matrix entries",
            tokens.remaining()
        );
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(MeshError::format(tokens.line(), "matrix entries must be finite"));
    }

    Ok(Matrix4::from_row_slice(&values))
}

/// Load a row-major 4x4 matrix from a file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Matrix4<f64>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    read(BufReader::new(file)).map_err(|e| with_path(e, path))
}
