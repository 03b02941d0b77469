//! Mesh and transform file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | OFF | `.off` | ✓ | ✗ | Triangle faces only |
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | `v` / `f` records only |
//!
//! Affine transforms are read from plain text files holding 16 numbers in
//! row-major order, see [`matrix`].
//!
//! # Usage
//!
//! ```no_run
//! use affine_motion::io::{load, save};
//!
//! let mesh = load("model.off").unwrap();
//! save(&mesh, "output.obj").unwrap();
//! ```

pub mod matrix;
pub mod obj;
pub mod off;

use std::path::Path;
use std::str::FromStr;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Object File Format.
    Off,
    /// Wavefront OBJ format.
    Obj,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "off" => Some(Format::Off),
            "obj" => Some(Format::Obj),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file, choosing the format by extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Off => off::load(path),
        Format::Obj => obj::load(path),
    }
}

/// Save a mesh to a file, choosing the format by extension.
///
/// Only OBJ output is supported.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Off => Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "OFF output is not supported, use .obj".to_string(),
        }),
    }
}

/// Attach the file path to a parse error.
pub(crate) fn with_path(err: MeshError, path: &Path) -> MeshError {
    match err {
        MeshError::InputFormat { line, message } => MeshError::LoadError {
            path: path.to_path_buf(),
            message: format!("line {}: {}", line, message),
        },
        other => other,
    }
}

/// Whitespace-separated tokens with their 1-based line numbers.
///
/// Text after `#` on a line is a comment.
pub(crate) struct Tokens<'a> {
    tokens: std::vec::IntoIter<(usize, &'a str)>,
    line: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let tokens: Vec<(usize, &'a str)> = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| {
                let content = line.split('#').next().unwrap_or("");
                content.split_whitespace().map(move |t| (i + 1, t))
            })
            .collect();

        Self {
            tokens: tokens.into_iter(),
            line: 1,
        }
    }

    /// The next token, or an error naming what was expected.
    pub(crate) fn expect(&mut self, what: &str) -> Result<&'a str> {
        match self.tokens.next() {
            Some((line, tok)) => {
                self.line = line;
                Ok(tok)
            }
            None => Err(MeshError::format(
                self.line,
                format!("unexpected end of input, expected {}", what),
            )),
        }
    }

    /// Parse the next token as `T`.
    pub(crate) fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let tok = self.expect(what)?;
        tok.parse().map_err(|_| {
            MeshError::format(self.line, format!("expected {}, found {:?}", what, tok))
        })
    }

    /// Number of tokens left.
    pub(crate) fn remaining(&self) -> usize {
        self.tokens.len()
    }

    /// Line of the most recently consumed token.
    pub(crate) fn line(&self) -> usize {
        self.line
    }
}
