// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import (ASCII or binary) via stl_io

use super::{io_error, parse_error, MeshBuffers};
use crate::error::Result;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Load an STL file; coincident corners are welded into shared vertices
pub fn load_stl(path: impl AsRef<Path>) -> Result<MeshBuffers> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut reader = BufReader::new(file);
    read_stl(&mut reader).map_err(|e| parse_error(path, e.to_string()))
}

/// Read STL data from any seekable reader
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> std::io::Result<MeshBuffers> {
    let stl = stl_io::read_stl(reader)?;

    let mut buffers = MeshBuffers {
        vertices: Vec::with_capacity(3 * stl.vertices.len()),
        triangles: Vec::with_capacity(3 * stl.faces.len()),
    };
    for v in &stl.vertices {
        buffers
            .vertices
            .extend([v[0] as f64, v[1] as f64, v[2] as f64]);
    }

    let mut skipped = 0usize;
    for face in &stl.faces {
        let [a, b, c] = face.vertices;
        // Slivers collapse to repeated indices once corners are welded
        if a == b || b == c || a == c {
            skipped += 1;
            continue;
        }
        buffers.triangles.extend([a as u32, b as u32, c as u32]);
    }
    if skipped > 0 {
        warn!("Skipped {} degenerate STL triangle(s)", skipped);
    }
    debug!(
        "Read STL: {} vertices, {} triangles",
        buffers.vertex_count(),
        buffers.triangle_count()
    );
    Ok(buffers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use stl_io::{Normal, Triangle, Vertex};

    fn triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
        Triangle {
            normal: Normal::new([0.0, 0.0, 1.0]),
            vertices: [Vertex::new(a), Vertex::new(b), Vertex::new(c)],
        }
    }

    #[test]
    fn test_stl_corners_are_welded() {
        let tris = vec![
            triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            triangle([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let mut bytes = Cursor::new(Vec::new());
        stl_io::write_stl(&mut bytes, tris.iter()).unwrap();
        bytes.set_position(0);

        let buffers = read_stl(&mut bytes).unwrap();
        assert_eq!(buffers.vertex_count(), 4);
        assert_eq!(buffers.triangle_count(), 2);
        let mesh = buffers.build().unwrap();
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn test_stl_drops_slivers() {
        let tris = vec![
            triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            triangle([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let mut bytes = Cursor::new(Vec::new());
        stl_io::write_stl(&mut bytes, tris.iter()).unwrap();
        bytes.set_position(0);
        assert_eq!(read_stl(&mut bytes).unwrap().triangle_count(), 1);
    }
}
