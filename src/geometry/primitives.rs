// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared-vertex mesh generators used by tests, benches and the CLI

use super::Mesh;
use crate::error::MeshError;
use nalgebra::Point3;
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    /// Flat grid in the xy plane with `nx * ny` quads, each split in two
    Grid { nx: usize, ny: usize, spacing: f64 },
    /// Closed axis-aligned cube with corner at the origin
    Cube { size: f64 },
    /// Closed UV sphere with single pole vertices
    Sphere { r: f64, segments: u32 },
    /// Open tube along z (two boundary loops)
    Cylinder { h: f64, r: f64, segments: u32 },
}

impl Primitive {
    pub fn grid(nx: usize, ny: usize, spacing: f64) -> Self {
        Self::Grid {
            nx: nx.max(1),
            ny: ny.max(1),
            spacing,
        }
    }

    pub fn cube(size: f64) -> Self {
        Self::Cube { size }
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        let segments = if segments > 2 { segments } else { 32 };
        Self::Sphere { r, segments }
    }

    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        let segments = if segments > 2 { segments } else { 32 };
        Self::Cylinder { h, r, segments }
    }

    /// Vertex positions and triangles
    pub fn to_buffers(&self) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        match *self {
            Self::Grid { nx, ny, spacing } => generate_grid(nx, ny, spacing),
            Self::Cube { size } => generate_cube(size),
            Self::Sphere { r, segments } => generate_sphere(r, segments),
            Self::Cylinder { h, r, segments } => generate_cylinder(h, r, segments),
        }
    }

    /// Flat buffers in the layout taken by [`crate::api`]
    pub fn to_flat(&self) -> (Vec<f64>, Vec<u32>) {
        let (vertices, faces) = self.to_buffers();
        let flat_vertices = vertices.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        let flat_faces = faces
            .iter()
            .flat_map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
            .collect();
        (flat_vertices, flat_faces)
    }

    pub fn to_mesh(&self) -> Result<Mesh, MeshError> {
        let (vertices, faces) = self.to_buffers();
        Mesh::new(&vertices, &faces)
    }
}

fn generate_grid(nx: usize, ny: usize, spacing: f64) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.push(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }

    let index = |i: usize, j: usize| j * (nx + 1) + i;
    let mut faces = Vec::with_capacity(nx * ny * 2);
    for j in 0..ny {
        for i in 0..nx {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            // Alternate the diagonal so no direction is favoured
            if (i + j) % 2 == 0 {
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            } else {
                faces.push([a, b, d]);
                faces.push([b, c, d]);
            }
        }
    }

    (vertices, faces)
}

fn generate_cube(size: f64) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let s = size;
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(s, 0.0, 0.0),
        Point3::new(s, s, 0.0),
        Point3::new(0.0, s, 0.0),
        Point3::new(0.0, 0.0, s),
        Point3::new(s, 0.0, s),
        Point3::new(s, s, s),
        Point3::new(0.0, s, s),
    ];

    let faces = vec![
        // Front (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Back (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Top (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Bottom (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];

    (vertices, faces)
}

fn generate_sphere(radius: f64, segments: u32) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let stacks = segments as usize;
    let slices = segments as usize;
    let mut vertices = Vec::with_capacity((stacks - 1) * slices + 2);

    vertices.push(Point3::new(0.0, radius, 0.0));
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();
        for j in 0..slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            vertices.push(Point3::new(r * theta.cos(), y, r * theta.sin()));
        }
    }
    vertices.push(Point3::new(0.0, -radius, 0.0));

    let north = 0;
    let south = vertices.len() - 1;
    let ring = |i: usize, j: usize| 1 + (i - 1) * slices + (j % slices);

    let mut faces = Vec::with_capacity(2 * slices * (stacks - 1));
    for j in 0..slices {
        faces.push([north, ring(1, j + 1), ring(1, j)]);
    }
    for i in 1..stacks - 1 {
        for j in 0..slices {
            let a = ring(i, j);
            let b = ring(i, j + 1);
            let c = ring(i + 1, j + 1);
            let d = ring(i + 1, j);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    for j in 0..slices {
        faces.push([south, ring(stacks - 1, j), ring(stacks - 1, j + 1)]);
    }

    (vertices, faces)
}

fn generate_cylinder(height: f64, radius: f64, segments: u32) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let n = segments as usize;
    let mut vertices = Vec::with_capacity(2 * n);
    for z in [0.0, height] {
        for j in 0..n {
            let theta = 2.0 * PI * j as f64 / n as f64;
            vertices.push(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
        }
    }

    let mut faces = Vec::with_capacity(2 * n);
    for j in 0..n {
        let a = j;
        let b = (j + 1) % n;
        let c = n + (j + 1) % n;
        let d = n + j;
        faces.push([a, b, c]);
        faces.push([a, c, d]);
    }

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_generation() {
        let mesh = Primitive::grid(4, 3, 0.5).to_mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.face_count(), 24);
        assert!((mesh.surface_area() - 3.0).abs() < 1e-12);
        // Every vertex of a flat sheet is either on the boundary or flat
        assert_eq!(mesh.saddle_or_boundary_count(), mesh.vertex_count());
    }

    #[test]
    fn test_cube_is_closed() {
        let mesh = Primitive::cube(1.0).to_mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.edge_count(), 18);
        assert_eq!(mesh.boundary_edge_count(), 0);
        assert!((mesh.surface_area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_is_closed() {
        let mesh = Primitive::sphere(1.0, 12).to_mesh().unwrap();
        assert_eq!(mesh.boundary_edge_count(), 0);
        // Euler characteristic of a sphere
        let chi = mesh.vertex_count() as i64 - mesh.edge_count() as i64 + mesh.face_count() as i64;
        assert_eq!(chi, 2);
        assert_eq!(mesh.saddle_or_boundary_count(), 0);
    }

    #[test]
    fn test_cylinder_has_two_boundary_loops() {
        let mesh = Primitive::cylinder(2.0, 1.0, 16).to_mesh().unwrap();
        assert_eq!(mesh.boundary_edge_count(), 32);
        assert_eq!(mesh.vertex_count(), 32);
    }

    #[test]
    fn test_flat_buffers() {
        let (vertices, triangles) = Primitive::grid(1, 1, 1.0).to_flat();
        assert_eq!(vertices.len(), 12);
        assert_eq!(triangles, vec![0, 1, 3, 0, 3, 2]);
    }
}
