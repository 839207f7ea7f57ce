// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Distance lookups against the windows left by a propagation run

use super::engine::{layout_position, GeodesicAlgorithmExact, VISIBILITY_FRACTION};
use super::GEODESIC_INF;
use crate::geometry::unfold::axis_crossing;
use crate::geometry::SurfacePoint;
use nalgebra::Point2;

/// Running minimum; ties keep the first offer
struct Best {
    distance: f64,
    source: Option<usize>,
}

impl Best {
    fn new() -> Self {
        Self {
            distance: GEODESIC_INF,
            source: None,
        }
    }

    fn offer(&mut self, distance: f64, source: Option<usize>) {
        if source.is_some() && distance < self.distance {
            self.distance = distance;
            self.source = source;
        }
    }
}

impl GeodesicAlgorithmExact<'_> {
    /// Geodesic distance from `point` to the nearest source of the last run,
    /// and that source's index. Points beyond the distance limit, unreached
    /// points and points that do not belong to the mesh give
    /// `(GEODESIC_INF, None)`.
    pub fn best_source(&self, point: &SurfacePoint) -> (f64, Option<usize>) {
        let Ok(point) = point.checked(self.mesh) else {
            return (GEODESIC_INF, None);
        };
        match self.estimate(&point) {
            (distance, Some(source)) if distance <= self.distance_limit => (distance, Some(source)),
            _ => (GEODESIC_INF, None),
        }
    }

    /// Distances of all vertices; entries beyond the limit are `GEODESIC_INF`
    pub fn distances(&self) -> Vec<f64> {
        self.vertex_distance
            .iter()
            .map(|&d| if d <= self.distance_limit { d } else { GEODESIC_INF })
            .collect()
    }

    /// Best current distance for a canonical point, ignoring the limit
    pub(super) fn estimate(&self, point: &SurfacePoint) -> (f64, Option<usize>) {
        let mesh = self.mesh;
        let mut best = Best::new();
        match *point {
            SurfacePoint::Vertex { vertex } => {
                best.offer(self.vertex_distance[vertex], self.vertex_source[vertex]);
            }
            SurfacePoint::Edge { edge, t } => {
                let e = mesh.edge(edge);
                let x = t * e.length;
                let slack = VISIBILITY_FRACTION * e.length;
                let [a, b] = e.vertices;
                best.offer(self.vertex_distance[a] + x, self.vertex_source[a]);
                best.offer(self.vertex_distance[b] + e.length - x, self.vertex_source[b]);
                for &id in &self.edge_windows[edge] {
                    let window = &self.windows[id];
                    if window.covers(x, slack) {
                        best.offer(window.distance_at(x), Some(window.source_index));
                    }
                }
            }
            SurfacePoint::Face { face, barycentric } => {
                let f = mesh.face(face);
                let position = point.position(mesh);
                for &v in &f.vertices {
                    let straight = (mesh.vertex(v).position - position).norm();
                    best.offer(self.vertex_distance[v] + straight, self.vertex_source[v]);
                }
                for &edge in &f.edges {
                    let layout = self.unfold_face(face, edge, true);
                    let mut q = Point2::origin();
                    for k in 0..3 {
                        q += layout_position(&layout, f.vertices[k]).coords * barycentric[k];
                    }
                    let slack = VISIBILITY_FRACTION * mesh.edge(edge).length;
                    for &id in &self.edge_windows[edge] {
                        let window = &self.windows[id];
                        if window.into != Some(face) {
                            continue;
                        }
                        if window.covers(axis_crossing(&window.source, &q), slack) {
                            let distance = window.sigma + (q - window.source).norm();
                            best.offer(distance, Some(window.source_index));
                        }
                    }
                }
            }
        }

        // Straight segments inside a face shared with a source
        for (index, source) in self.sources.iter().enumerate() {
            if source.shares_face_with(point, mesh) {
                let straight = (source.position(mesh) - point.position(mesh)).norm();
                best.offer(straight, Some(index));
            }
        }

        (best.distance, best.source)
    }
}
