// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Locations on the mesh surface

use super::Mesh;
use crate::error::{GeodesicError, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Parameters closer than this to 0 or 1 snap to the nearest mesh vertex/edge
const SNAP_EPSILON: f64 = 1e-12;

/// A point on the surface, classified by the mesh element it lies on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfacePoint {
    /// Exactly at a mesh vertex
    Vertex { vertex: usize },
    /// Inside an edge; `t` runs from the edge's first to its second vertex
    Edge { edge: usize, t: f64 },
    /// Inside a face, barycentric weights follow the face's vertex order
    Face { face: usize, barycentric: [f64; 3] },
}

impl SurfacePoint {
    /// Point at a vertex, validated against the mesh
    pub fn vertex(mesh: &Mesh, vertex: usize) -> Result<Self> {
        if vertex >= mesh.vertex_count() {
            return Err(GeodesicError::InvalidQueryPoint {
                index: vertex,
                vertex_count: mesh.vertex_count(),
            });
        }
        Ok(Self::Vertex { vertex })
    }

    /// Point at parameter `t` along an edge, snapped to an endpoint when `t` is 0 or 1
    pub fn on_edge(mesh: &Mesh, edge: usize, t: f64) -> Result<Self> {
        if edge >= mesh.edge_count() {
            return Err(GeodesicError::invalid_point(format!(
                "edge {} out of range (mesh has {} edges)",
                edge,
                mesh.edge_count()
            )));
        }
        if !(0.0..=1.0).contains(&t) {
            return Err(GeodesicError::invalid_point(format!(
                "edge parameter {} outside [0, 1]",
                t
            )));
        }
        Ok(Self::Edge { edge, t }.canonical(mesh))
    }

    /// Point inside a face from barycentric weights (normalized to sum to one)
    pub fn in_face(mesh: &Mesh, face: usize, barycentric: [f64; 3]) -> Result<Self> {
        if face >= mesh.face_count() {
            return Err(GeodesicError::invalid_point(format!(
                "face {} out of range (mesh has {} faces)",
                face,
                mesh.face_count()
            )));
        }
        let sum: f64 = barycentric.iter().sum();
        if barycentric.iter().any(|&b| !(b >= 0.0) || !b.is_finite()) || sum <= 0.0 {
            return Err(GeodesicError::invalid_point(format!(
                "barycentric weights {:?} must be finite, non-negative and not all zero",
                barycentric
            )));
        }
        let normalized = barycentric.map(|b| b / sum);
        Ok(Self::Face {
            face,
            barycentric: normalized,
        }
        .canonical(mesh))
    }

    /// Simplest equivalent representation: a face point with a zero weight is
    /// moved to the edge, an edge point at an end is moved to the vertex.
    pub fn canonical(self, mesh: &Mesh) -> Self {
        match self {
            Self::Vertex { .. } => self,
            Self::Edge { edge, t } => {
                let e = mesh.edge(edge);
                if t <= SNAP_EPSILON {
                    Self::Vertex {
                        vertex: e.vertices[0],
                    }
                } else if t >= 1.0 - SNAP_EPSILON {
                    Self::Vertex {
                        vertex: e.vertices[1],
                    }
                } else {
                    self
                }
            }
            Self::Face { face, barycentric } => {
                let f = mesh.face(face);
                if let Some(k) = barycentric.iter().position(|&b| b >= 1.0 - SNAP_EPSILON) {
                    return Self::Vertex {
                        vertex: f.vertices[k],
                    };
                }
                if let Some(k) = barycentric.iter().position(|&b| b <= SNAP_EPSILON) {
                    // Weight k vanishes: the point is on the edge opposite corner k
                    let edge = f.edges[k];
                    let first = mesh.edge(edge).vertices[0];
                    let a = (k + 1) % 3;
                    let b = (k + 2) % 3;
                    let (wa, wb) = (barycentric[a], barycentric[b]);
                    // Parameter measured from the edge's first vertex
                    let t = if f.vertices[a] == first {
                        wb / (wa + wb)
                    } else {
                        wa / (wa + wb)
                    };
                    return Self::Edge { edge, t }.canonical(mesh);
                }
                self
            }
        }
    }

    /// 3D position of the point
    pub fn position(&self, mesh: &Mesh) -> Point3<f64> {
        match *self {
            Self::Vertex { vertex } => mesh.vertex(vertex).position,
            Self::Edge { edge, t } => {
                let e = mesh.edge(edge);
                let p0 = mesh.vertex(e.vertices[0]).position;
                let p1 = mesh.vertex(e.vertices[1]).position;
                p0 + (p1 - p0) * t
            }
            Self::Face { face, barycentric } => {
                let f = mesh.face(face);
                let mut coords = nalgebra::Vector3::zeros();
                for k in 0..3 {
                    coords += mesh.vertex(f.vertices[k]).position.coords * barycentric[k];
                }
                Point3::from(coords)
            }
        }
    }

    /// Faces whose closure contains the point
    pub fn containing_faces(&self, mesh: &Mesh) -> Vec<usize> {
        match *self {
            Self::Vertex { vertex } => mesh.vertex(vertex).faces.clone(),
            Self::Edge { edge, .. } => mesh.edge(edge).faces.clone(),
            Self::Face { face, .. } => vec![face],
        }
    }

    /// Both points lie in the closure of a common face
    pub fn shares_face_with(&self, other: &SurfacePoint, mesh: &Mesh) -> bool {
        let mine = self.containing_faces(mesh);
        other
            .containing_faces(mesh)
            .iter()
            .any(|f| mine.contains(f))
    }

    /// Checks indices against the mesh
    pub fn validate(&self, mesh: &Mesh) -> Result<()> {
        self.checked(mesh).map(|_| ())
    }

    /// Validated, normalized and canonical copy of the point
    pub fn checked(&self, mesh: &Mesh) -> Result<Self> {
        match *self {
            Self::Vertex { vertex } => Self::vertex(mesh, vertex),
            Self::Edge { edge, t } => Self::on_edge(mesh, edge, t),
            Self::Face { face, barycentric } => Self::in_face(mesh, face, barycentric),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        Mesh::new(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_vertex_point_validation() {
        let mesh = square();
        assert_eq!(
            SurfacePoint::vertex(&mesh, 3).unwrap(),
            SurfacePoint::Vertex { vertex: 3 }
        );
        assert!(matches!(
            SurfacePoint::vertex(&mesh, 4),
            Err(GeodesicError::InvalidQueryPoint {
                index: 4,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn test_edge_point_snaps_to_vertex() {
        let mesh = square();
        let diagonal = mesh.edge_between(0, 2).unwrap();
        assert_eq!(
            SurfacePoint::on_edge(&mesh, diagonal, 0.0).unwrap(),
            SurfacePoint::Vertex { vertex: 0 }
        );
        assert_eq!(
            SurfacePoint::on_edge(&mesh, diagonal, 1.0).unwrap(),
            SurfacePoint::Vertex { vertex: 2 }
        );
        let mid = SurfacePoint::on_edge(&mesh, diagonal, 0.5).unwrap();
        let p = mid.position(&mesh);
        assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        assert!(SurfacePoint::on_edge(&mesh, diagonal, 1.5).is_err());
        assert!(SurfacePoint::on_edge(&mesh, 99, 0.5).is_err());
    }

    #[test]
    fn test_face_point_snaps_to_edge() {
        let mesh = square();
        // Weight on vertex 1 vanishes: halfway along the diagonal 0-2
        let p = SurfacePoint::in_face(&mesh, 0, [1.0, 0.0, 1.0]).unwrap();
        let diagonal = mesh.edge_between(0, 2).unwrap();
        match p {
            SurfacePoint::Edge { edge, t } => {
                assert_eq!(edge, diagonal);
                assert!((t - 0.5).abs() < 1e-12);
            }
            other => panic!("expected edge point, got {:?}", other),
        }

        let corner = SurfacePoint::in_face(&mesh, 1, [0.0, 0.0, 2.0]).unwrap();
        assert_eq!(corner, SurfacePoint::Vertex { vertex: 3 });
    }

    #[test]
    fn test_face_point_position_and_faces() {
        let mesh = square();
        let p = SurfacePoint::in_face(&mesh, 0, [1.0, 1.0, 1.0]).unwrap();
        let pos = p.position(&mesh);
        assert!((pos - Point3::new(2.0 / 3.0, 1.0 / 3.0, 0.0)).norm() < 1e-12);
        assert_eq!(p.containing_faces(&mesh), vec![0]);

        let v3 = SurfacePoint::Vertex { vertex: 3 };
        assert!(!p.shares_face_with(&v3, &mesh));
        let v2 = SurfacePoint::Vertex { vertex: 2 };
        assert!(p.shares_face_with(&v2, &mesh));
    }

    #[test]
    fn test_invalid_barycentric_rejected() {
        let mesh = square();
        assert!(SurfacePoint::in_face(&mesh, 0, [0.0, 0.0, 0.0]).is_err());
        assert!(SurfacePoint::in_face(&mesh, 0, [-0.5, 1.0, 0.5]).is_err());
        assert!(SurfacePoint::in_face(&mesh, 0, [f64::NAN, 1.0, 0.5]).is_err());
        assert!(SurfacePoint::in_face(&mesh, 5, [1.0, 1.0, 1.0]).is_err());
    }
}
