// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh with vertex, face and edge adjacency
//!
//! The mesh is built once from raw vertex/triangle arrays and never mutated
//! afterwards, so a single instance can be shared by any number of concurrent
//! propagation runs.

use super::SurfacePoint;
use crate::error::MeshError;
use ahash::AHashMap;
use log::debug;
use nalgebra::Point3;
use serde::Serialize;
use std::f64::consts::PI;

/// Vertices whose corner angles sum to at least `2π - FLAT_ANGLE_TOLERANCE`
/// are treated as saddles (flat vertices included).
const FLAT_ANGLE_TOLERANCE: f64 = 1e-6;

/// Mesh vertex with back-references to the elements around it
#[derive(Debug, Clone, Serialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    /// Incident faces
    pub faces: Vec<usize>,
    /// Incident edges
    pub edges: Vec<usize>,
    /// Sum of the corner angles of the incident faces
    pub angle_sum: f64,
    /// Geodesics may bend around this vertex
    pub saddle_or_boundary: bool,
}

/// Triangle referencing shared vertices and edges
///
/// `edges[k]` and `angles[k]` belong to the corner `vertices[k]`: the edge is
/// the one opposite that corner.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Face {
    pub vertices: [usize; 3],
    pub edges: [usize; 3],
    pub angles: [f64; 3],
}

/// Edge shared by one or two faces
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    /// Endpoints, smaller index first
    pub vertices: [usize; 2],
    pub faces: Vec<usize>,
    pub length: f64,
}

impl Edge {
    pub fn is_boundary(&self) -> bool {
        self.faces.len() < 2
    }

    /// The endpoint that is not `vertex`
    pub fn other_vertex(&self, vertex: usize) -> usize {
        if self.vertices[0] == vertex {
            self.vertices[1]
        } else {
            self.vertices[0]
        }
    }
}

/// Immutable manifold triangle mesh
#[derive(Debug, Clone, Serialize)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    edges: Vec<Edge>,
}

impl Mesh {
    /// Build the mesh topology, validating every triangle
    pub fn new(positions: &[Point3<f64>], triangles: &[[usize; 3]]) -> Result<Self, MeshError> {
        for (index, p) in positions.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(MeshError::NonFiniteCoordinate { vertex: index });
            }
        }

        for (face_idx, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if v >= positions.len() {
                    return Err(MeshError::InvalidVertexIndex {
                        face: face_idx,
                        vertex: v,
                        vertex_count: positions.len(),
                    });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(MeshError::DegenerateFace { face: face_idx });
            }
        }

        let mut vertices: Vec<Vertex> = positions
            .iter()
            .map(|&position| Vertex {
                position,
                faces: Vec::new(),
                edges: Vec::new(),
                angle_sum: 0.0,
                saddle_or_boundary: false,
            })
            .collect();
        let mut edges: Vec<Edge> = Vec::with_capacity(triangles.len() * 3 / 2 + 1);
        let mut faces: Vec<Face> = Vec::with_capacity(triangles.len());

        // Map: (min_vertex, max_vertex) -> edge index
        let mut edge_map: AHashMap<(usize, usize), usize> =
            AHashMap::with_capacity(triangles.len() * 3 / 2 + 1);

        for (face_idx, tri) in triangles.iter().enumerate() {
            let mut face_edges = [0usize; 3];

            for k in 0..3 {
                let a = tri[(k + 1) % 3];
                let b = tri[(k + 2) % 3];
                let key = if a < b { (a, b) } else { (b, a) };

                let edge_idx = match edge_map.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let length = (positions[key.0] - positions[key.1]).norm();
                        if length == 0.0 {
                            return Err(MeshError::ZeroLengthEdge {
                                v0: key.0,
                                v1: key.1,
                            });
                        }
                        let idx = edges.len();
                        edges.push(Edge {
                            vertices: [key.0, key.1],
                            faces: Vec::with_capacity(2),
                            length,
                        });
                        edge_map.insert(key, idx);
                        vertices[key.0].edges.push(idx);
                        vertices[key.1].edges.push(idx);
                        idx
                    }
                };

                let edge = &mut edges[edge_idx];
                if edge.faces.len() == 2 {
                    return Err(MeshError::NonManifoldEdge {
                        v0: key.0,
                        v1: key.1,
                    });
                }
                edge.faces.push(face_idx);
                face_edges[k] = edge_idx;
            }

            // Corner angles from the intrinsic edge lengths (law of cosines)
            let mut angles = [0.0; 3];
            for k in 0..3 {
                let opposite = edges[face_edges[k]].length;
                let left = edges[face_edges[(k + 1) % 3]].length;
                let right = edges[face_edges[(k + 2) % 3]].length;
                let cos = (left * left + right * right - opposite * opposite) / (2.0 * left * right);
                angles[k] = cos.clamp(-1.0, 1.0).acos();
            }

            for (k, &v) in tri.iter().enumerate() {
                vertices[v].faces.push(face_idx);
                vertices[v].angle_sum += angles[k];
            }

            faces.push(Face {
                vertices: *tri,
                edges: face_edges,
                angles,
            });
        }

        for vertex in &mut vertices {
            let boundary = vertex.edges.iter().any(|&e| edges[e].is_boundary());
            vertex.saddle_or_boundary =
                boundary || vertex.angle_sum >= 2.0 * PI - FLAT_ANGLE_TOLERANCE;
        }

        let mesh = Self {
            vertices,
            faces,
            edges,
        };

        debug!(
            "Built mesh: {} vertices, {} faces, {} edges ({} boundary)",
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.edge_count(),
            mesh.boundary_edge_count()
        );

        Ok(mesh)
    }

    /// Build from flat buffers: `x y z` triples and `a b c` index triples
    pub fn from_flat(vertices: &[f64], triangles: &[u32]) -> Result<Self, MeshError> {
        if vertices.len() % 3 != 0 {
            return Err(MeshError::RaggedVertexBuffer {
                len: vertices.len(),
            });
        }
        if triangles.len() % 3 != 0 {
            return Err(MeshError::RaggedTriangleBuffer {
                len: triangles.len(),
            });
        }

        let positions: Vec<Point3<f64>> = vertices
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces: Vec<[usize; 3]> = triangles
            .chunks_exact(3)
            .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
            .collect();

        Self::new(&positions, &faces)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex(&self, index: usize) -> &Vertex {
        &self.vertices[index]
    }

    pub fn face(&self, index: usize) -> &Face {
        &self.faces[index]
    }

    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get face count
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_boundary()).count()
    }

    pub fn saddle_or_boundary_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.saddle_or_boundary).count()
    }

    /// Edge joining `a` and `b`, if any
    pub fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.vertices
            .get(a)?
            .edges
            .iter()
            .copied()
            .find(|&e| self.edges[e].other_vertex(a) == b)
    }

    /// Corner of `face` that is not an endpoint of `edge`
    pub fn opposite_vertex(&self, face: usize, edge: usize) -> usize {
        let f = &self.faces[face];
        let k = f.edges.iter().position(|&e| e == edge).unwrap_or(0);
        f.vertices[k]
    }

    /// Edge of `face` that does not touch `vertex`
    pub fn opposite_edge(&self, face: usize, vertex: usize) -> usize {
        let f = &self.faces[face];
        let k = f.vertices.iter().position(|&v| v == vertex).unwrap_or(0);
        f.edges[k]
    }

    /// Face across `edge` from `face`
    pub fn other_face(&self, edge: usize, face: usize) -> Option<usize> {
        self.edges[edge].faces.iter().copied().find(|&f| f != face)
    }

    pub fn is_boundary_edge(&self, edge: usize) -> bool {
        self.edges[edge].is_boundary()
    }

    /// 3D position of a surface point on this mesh
    pub fn point_position(&self, point: &SurfacePoint) -> Point3<f64> {
        point.position(self)
    }

    /// Total area of all faces
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| {
                let p0 = self.vertices[f.vertices[0]].position;
                let p1 = self.vertices[f.vertices[1]].position;
                let p2 = self.vertices[f.vertices[2]].position;
                (p1 - p0).cross(&(p2 - p0)).norm() * 0.5
            })
            .sum()
    }

    /// Mean edge length, zero for a mesh without edges
    pub fn mean_edge_length(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.edges.iter().map(|e| e.length).sum::<f64>() / self.edges.len() as f64
    }
}
