// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Node.js bindings using napi-rs

#[cfg(feature = "napi")]
use napi::bindgen_prelude::*;
#[cfg(feature = "napi")]
use napi_derive::napi;

/// Sparse distance matrix handed to JavaScript
#[cfg(feature = "napi")]
#[napi(object)]
pub struct JsSparseMatrix {
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
    pub values: Vec<f64>,
}

#[cfg(feature = "napi")]
fn to_js_error(e: crate::GeodesicError) -> Error {
    Error::from_reason(format!("Geodesic error: {}", e))
}

/// Geodesic distance from the nearest source to each target
#[cfg(feature = "napi")]
#[napi]
pub fn compute_distances(
    vertices: Vec<f64>,
    triangles: Vec<u32>,
    sources: Vec<u32>,
    targets: Vec<u32>,
    distance_limit: Option<f64>,
) -> Result<Vec<f64>> {
    crate::api::compute_distances(&vertices, &triangles, &sources, &targets, distance_limit)
        .map_err(to_js_error)
}

/// Sparse matrix of all vertex pairs within `max_distance`
#[cfg(feature = "napi")]
#[napi]
pub fn local_distance_matrix(
    vertices: Vec<f64>,
    triangles: Vec<u32>,
    max_distance: Option<f64>,
) -> Result<JsSparseMatrix> {
    let matrix = crate::api::local_distance_matrix(&vertices, &triangles, max_distance)
        .map_err(to_js_error)?;
    Ok(JsSparseMatrix {
        rows: matrix.rows.iter().map(|&r| r as u32).collect(),
        cols: matrix.cols.iter().map(|&c| c as u32).collect(),
        values: matrix.values,
    })
}

/// Load a mesh file and compute distances from vertex sources
#[cfg(feature = "napi")]
#[napi]
pub fn compute_distances_file(
    path: String,
    sources: Vec<u32>,
    targets: Vec<u32>,
    distance_limit: Option<f64>,
) -> Result<Vec<f64>> {
    let buffers = crate::io::load(&path).map_err(to_js_error)?;
    let mesh = buffers.build().map_err(|e| to_js_error(e.into()))?;
    crate::api::distances_on_mesh(&mesh, &sources, &targets, distance_limit).map_err(to_js_error)
}

/// Get version
#[cfg(feature = "napi")]
#[napi]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
