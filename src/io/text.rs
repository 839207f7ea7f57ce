// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Whitespace-separated text meshes
//!
//! Combined layout: a header line `n_vertices n_triangles`, then one `x y z`
//! row per vertex, then one `i j k` row per triangle. Blank lines and lines
//! starting with `#` are skipped.

use super::{io_error, parse_error, MeshBuffers};
use crate::error::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Load a combined text mesh
pub fn load_text(path: impl AsRef<Path>) -> Result<MeshBuffers> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    parse_text(&content).map_err(|message| parse_error(path, message))
}

/// Load separate vertex (`x y z` rows) and triangle (`i j k` rows) files
pub fn load_split(vertices: impl AsRef<Path>, triangles: impl AsRef<Path>) -> Result<MeshBuffers> {
    let (vpath, tpath) = (vertices.as_ref(), triangles.as_ref());
    let vtext = std::fs::read_to_string(vpath).map_err(|e| io_error(vpath, e))?;
    let ttext = std::fs::read_to_string(tpath).map_err(|e| io_error(tpath, e))?;

    let mut buffers = MeshBuffers::default();
    for (line_no, row) in rows(&vtext) {
        buffers
            .vertices
            .extend(parse_row::<f64>(row, line_no).map_err(|m| parse_error(vpath, m))?);
    }
    for (line_no, row) in rows(&ttext) {
        buffers
            .triangles
            .extend(parse_row::<u32>(row, line_no).map_err(|m| parse_error(tpath, m))?);
    }
    Ok(buffers)
}

/// Parse a combined text mesh from memory
pub fn parse_text(content: &str) -> std::result::Result<MeshBuffers, String> {
    let mut lines = rows(content);
    let (header_no, header) = lines.next().ok_or_else(|| "empty mesh file".to_string())?;
    let counts: Vec<usize> = header
        .split_whitespace()
        .map(|t| t.parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("line {}: bad header: {}", header_no, e))?;
    let [n_vertices, n_triangles] = counts[..] else {
        return Err(format!(
            "line {}: header must be `n_vertices n_triangles`",
            header_no
        ));
    };

    let mut buffers = MeshBuffers {
        vertices: Vec::with_capacity(3 * n_vertices),
        triangles: Vec::with_capacity(3 * n_triangles),
    };
    for _ in 0..n_vertices {
        let (line_no, row) = lines
            .next()
            .ok_or_else(|| format!("expected {} vertex rows", n_vertices))?;
        buffers.vertices.extend(parse_row::<f64>(row, line_no)?);
    }
    for _ in 0..n_triangles {
        let (line_no, row) = lines
            .next()
            .ok_or_else(|| format!("expected {} triangle rows", n_triangles))?;
        // Triangle rows are sometimes written as floats ("0.0 1.0 2.0")
        let values = parse_row::<f64>(row, line_no)?;
        for v in values {
            if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
                return Err(format!("line {}: bad vertex index {}", line_no, v));
            }
            buffers.triangles.push(v as u32);
        }
    }
    if let Some((line_no, _)) = lines.next() {
        return Err(format!("line {}: unexpected trailing data", line_no));
    }
    Ok(buffers)
}

/// Render buffers in the combined layout
pub fn write_text(buffers: &MeshBuffers) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", buffers.vertex_count(), buffers.triangle_count());
    for v in buffers.vertices.chunks_exact(3) {
        let _ = writeln!(out, "{} {} {}", v[0], v[1], v[2]);
    }
    for t in buffers.triangles.chunks_exact(3) {
        let _ = writeln!(out, "{} {} {}", t[0], t[1], t[2]);
    }
    out
}

/// Non-empty, non-comment lines with 1-based line numbers
fn rows(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_row<T: std::str::FromStr>(row: &str, line_no: usize) -> std::result::Result<[T; 3], String> {
    let mut fields = row.split_whitespace().map(|t| t.parse::<T>());
    let mut next = || match fields.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(_)) => Err(format!("line {}: not a number in {:?}", line_no, row)),
        None => Err(format!("line {}: expected 3 values in {:?}", line_no, row)),
    };
    let triple = [next()?, next()?, next()?];
    if fields.next().is_some() {
        return Err(format!("line {}: expected 3 values in {:?}", line_no, row));
    }
    Ok(triple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeodesicError;

    const SQUARE: &str = "# unit square\n4 2\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n\n0 1 2\n0.0 2.0 3.0\n";

    #[test]
    fn test_parse_combined() {
        let buffers = parse_text(SQUARE).unwrap();
        assert_eq!(buffers.vertex_count(), 4);
        assert_eq!(buffers.triangles, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_round_trip_through_text() {
        let buffers = parse_text(SQUARE).unwrap();
        assert_eq!(parse_text(&write_text(&buffers)).unwrap(), buffers);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_text("").is_err());
        assert!(parse_text("2\n").is_err());
        assert!(parse_text("1 0\n0 0\n").unwrap_err().contains("line 2"));
        assert!(parse_text("3 1\n0 0 0\n1 0 0\n0 1 0\n0 1 2.5\n").is_err());
        assert!(parse_text("1 0\n0 0 0\n9 9 9\n").unwrap_err().contains("trailing"));
    }

    #[test]
    fn test_load_split_files() {
        let dir = tempfile::tempdir().unwrap();
        let vpath = dir.path().join("vertices.txt");
        let tpath = dir.path().join("triangles.txt");
        std::fs::write(&vpath, "0 0 0\n1 0 0\n0 1 0\n").unwrap();
        std::fs::write(&tpath, "0 1 2\n").unwrap();
        let buffers = load_split(&vpath, &tpath).unwrap();
        assert_eq!(buffers.vertex_count(), 3);
        assert_eq!(buffers.triangles, vec![0, 1, 2]);

        std::fs::write(&tpath, "0 1\n").unwrap();
        assert!(matches!(
            load_split(&vpath, &tpath),
            Err(GeodesicError::Parse { .. })
        ));
    }
}
