// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Buffer-level entry points: flat coordinate and index arrays in, distances out

use crate::error::{GeodesicError, Result};
use crate::geometry::{Mesh, SurfacePoint};
use crate::matrix::{local_matrix, SparseMatrix};
use crate::propagation::{GeodesicAlgorithmExact, GEODESIC_INF};

/// Geodesic distance from the nearest of `sources` to each of `targets`.
///
/// `vertices` holds xyz triples, `triangles` vertex-index triples. A `None`
/// limit propagates over the whole mesh; targets beyond the limit or in
/// another connected component come back as [`GEODESIC_INF`].
pub fn compute_distances(
    vertices: &[f64],
    triangles: &[u32],
    sources: &[u32],
    targets: &[u32],
    distance_limit: Option<f64>,
) -> Result<Vec<f64>> {
    let mesh = Mesh::from_flat(vertices, triangles)?;
    distances_on_mesh(&mesh, sources, targets, distance_limit)
}

/// [`compute_distances`] on an already built mesh
pub fn distances_on_mesh(
    mesh: &Mesh,
    sources: &[u32],
    targets: &[u32],
    distance_limit: Option<f64>,
) -> Result<Vec<f64>> {
    let sources = vertex_points(mesh, sources)?;
    let targets = vertex_points(mesh, targets)?;

    let mut engine = GeodesicAlgorithmExact::new(mesh);
    engine.propagate(
        &sources,
        distance_limit.unwrap_or(GEODESIC_INF),
        Some(targets.as_slice()),
    )?;
    Ok(targets.iter().map(|t| engine.best_source(t).0).collect())
}

/// Sparse matrix of all vertex pairs within `max_distance` of each other
pub fn local_distance_matrix(
    vertices: &[f64],
    triangles: &[u32],
    max_distance: Option<f64>,
) -> Result<SparseMatrix> {
    let mesh = Mesh::from_flat(vertices, triangles)?;
    local_matrix(&mesh, max_distance.unwrap_or(GEODESIC_INF))
}

fn vertex_points(mesh: &Mesh, indices: &[u32]) -> Result<Vec<SurfacePoint>> {
    indices
        .iter()
        .map(|&i| SurfacePoint::vertex(mesh, i as usize))
        .collect()
}

/// Convenience for callers holding signed indices (numpy int32 arrays)
pub fn to_vertex_indices(indices: &[i32]) -> Result<Vec<u32>> {
    indices
        .iter()
        .map(|&i| {
            u32::try_from(i).map_err(|_| {
                GeodesicError::invalid_param("vertex index", i, "must be non-negative")
            })
        })
        .collect()
}
