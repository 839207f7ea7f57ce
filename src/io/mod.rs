// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh loading and result output

mod stl;
mod text;

pub use stl::{load_stl, read_stl};
pub use text::{load_split, load_text, parse_text, write_text};

use crate::error::{GeodesicError, MeshError, Result};
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat vertex and triangle buffers as read from a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    /// xyz triples
    pub vertices: Vec<f64>,
    /// Vertex-index triples
    pub triangles: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Build the mesh topology
    pub fn build(&self) -> std::result::Result<Mesh, MeshError> {
        Mesh::from_flat(&self.vertices, &self.triangles)
    }
}

/// Load a mesh, picking the format from the file extension (`.stl`, else text)
pub fn load(path: impl AsRef<Path>) -> Result<MeshBuffers> {
    let path = path.as_ref();
    let is_stl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("stl"));
    if is_stl {
        load_stl(path)
    } else {
        load_text(path)
    }
}

/// Serialize any result as JSON
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| GeodesicError::Parse {
        path: "<json>".into(),
        message: e.to_string(),
    })
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> GeodesicError {
    GeodesicError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn parse_error(path: &Path, message: impl Into<String>) -> GeodesicError {
    GeodesicError::Parse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.txt");
        std::fs::write(&path, "3 1\n0 0 0\n1 0 0\n0 1 0\n0 1 2\n").unwrap();
        let buffers = load(&path).unwrap();
        assert_eq!(buffers.vertex_count(), 3);
        assert_eq!(buffers.triangle_count(), 1);
        assert_eq!(buffers.build().unwrap().edge_count(), 3);

        assert!(matches!(
            load(dir.path().join("missing.stl")),
            Err(GeodesicError::Io { .. })
        ));
    }

    #[test]
    fn test_json_output() {
        let buffers = MeshBuffers {
            vertices: vec![0.0, 1.0, 2.0],
            triangles: vec![],
        };
        let json = to_json(&buffers, false).unwrap();
        assert_eq!(json, r#"{"vertices":[0.0,1.0,2.0],"triangles":[]}"#);
    }
}
