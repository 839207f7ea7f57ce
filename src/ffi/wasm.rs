// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WASM bindings using wasm-bindgen

use crate::api;
use crate::matrix::SparseMatrix;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSparseMatrix {
    inner: SparseMatrix,
}

#[wasm_bindgen]
impl WasmSparseMatrix {
    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn rows(&self) -> Vec<u32> {
        self.inner.rows.iter().map(|&r| r as u32).collect()
    }

    pub fn cols(&self) -> Vec<u32> {
        self.inner.cols.iter().map(|&c| c as u32).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.inner.values.clone()
    }

    /// Entries as JSON
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner)
            .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {}", e)))
    }
}

/// Geodesic distance from the nearest source to each target
#[wasm_bindgen]
pub fn compute_distances(
    vertices: &[f64],
    triangles: &[u32],
    sources: &[u32],
    targets: &[u32],
    distance_limit: Option<f64>,
) -> Result<Vec<f64>, JsValue> {
    api::compute_distances(vertices, triangles, sources, targets, distance_limit)
        .map_err(|e| JsValue::from_str(&format!("Geodesic error: {}", e)))
}

/// Sparse matrix of all vertex pairs within `max_distance`
#[wasm_bindgen]
pub fn local_distance_matrix(
    vertices: &[f64],
    triangles: &[u32],
    max_distance: Option<f64>,
) -> Result<WasmSparseMatrix, JsValue> {
    let inner = api::local_distance_matrix(vertices, triangles, max_distance)
        .map_err(|e| JsValue::from_str(&format!("Geodesic error: {}", e)))?;
    Ok(WasmSparseMatrix { inner })
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_accessors() {
        let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let matrix = local_distance_matrix(&vertices, &[0, 1, 2], None)
            .unwrap_or_else(|_| panic!("matrix failed"));
        assert_eq!(matrix.len(), 6);
        assert_eq!(matrix.rows().len(), matrix.cols().len());
    }
}
