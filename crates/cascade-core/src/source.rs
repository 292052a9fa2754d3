use std::fs;
use std::path::Path;

use crate::error::CascadeError;

/// A vertex/fragment source pair ready to be compiled by a backend.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
    /// Optional human-friendly origin (path/label) for logs.
    pub origin: Option<String>,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Loads a source pair from two files. The origin is derived from the
    /// fragment path, which is usually the interesting one in logs.
    pub fn from_files(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, CascadeError> {
        let fragment_path = fragment_path.as_ref();
        let vertex = read_source(vertex_path)?;
        let fragment = read_source(fragment_path)?;
        Ok(Self {
            vertex,
            fragment,
            origin: Some(fragment_path.display().to_string()),
        })
    }
}

/// Reads shader source text from a file.
pub fn read_source(path: impl AsRef<Path>) -> Result<String, CascadeError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| CascadeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
