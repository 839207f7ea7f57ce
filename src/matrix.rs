// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sparse pairwise distance matrix restricted to a cutoff
//!
//! Every vertex is propagated on its own up to the cutoff; rows run in
//! parallel with rayon, one engine per worker, and are stitched back together
//! in row order.

use crate::error::{GeodesicError, Result};
use crate::geometry::{Mesh, SurfacePoint};
use crate::propagation::GeodesicAlgorithmExact;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Coordinate-format sparse matrix of geodesic distances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    pub size: usize,
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    /// Stored value at `(row, col)`; rows and columns are kept sorted
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let start = self.rows.partition_point(|&r| r < row);
        let end = self.rows.partition_point(|&r| r <= row);
        self.cols[start..end]
            .binary_search(&col)
            .ok()
            .map(|k| self.values[start + k])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .zip(&self.cols)
            .zip(&self.values)
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// Rows, then columns, then values in one buffer of `3 * len` doubles
    pub fn into_flat(self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(3 * self.len());
        flat.extend(self.rows.iter().map(|&r| r as f64));
        flat.extend(self.cols.iter().map(|&c| c as f64));
        flat.extend(self.values);
        flat
    }

    /// Every entry has a mirrored entry within `tolerance` (relative)
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.iter().all(|(r, c, v)| match self.get(c, r) {
            Some(w) => (v - w).abs() <= tolerance * v.abs().max(w.abs()).max(1.0),
            None => false,
        })
    }

    fn append_row(&mut self, row: usize, entries: Vec<(usize, f64)>) {
        for (col, value) in entries {
            self.push(row, col, value);
        }
    }
}

/// Progress callback: `(rows_done, rows_total)`
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Options for [`local_matrix_with`]
#[derive(Clone)]
pub struct MatrixOptions {
    /// Build rows on the rayon pool
    pub parallel: bool,
    pub progress: Option<ProgressFn>,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            progress: None,
        }
    }
}

impl fmt::Debug for MatrixOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixOptions")
            .field("parallel", &self.parallel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl MatrixOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// All vertex pairs `(i, j)` with `0 < d(i, j) <= max_distance`
pub fn local_matrix(mesh: &Mesh, max_distance: f64) -> Result<SparseMatrix> {
    local_matrix_with(mesh, max_distance, &MatrixOptions::default())
}

pub fn local_matrix_with(
    mesh: &Mesh,
    max_distance: f64,
    options: &MatrixOptions,
) -> Result<SparseMatrix> {
    if max_distance.is_nan() || max_distance < 0.0 {
        return Err(GeodesicError::invalid_param(
            "max_distance",
            max_distance,
            "must be a non-negative number",
        ));
    }

    let total = mesh.vertex_count();
    info!(
        "Building local distance matrix: {} vertices, cutoff {} ({})",
        total,
        max_distance,
        if options.parallel { "parallel" } else { "sequential" }
    );

    let done = AtomicUsize::new(0);
    let report = || {
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = &options.progress {
            progress(finished, total);
        }
    };

    let rows: Vec<Vec<(usize, f64)>> = if options.parallel {
        (0..total)
            .into_par_iter()
            .map_init(
                || GeodesicAlgorithmExact::new(mesh),
                |engine, vertex| {
                    let row = matrix_row(engine, vertex, max_distance);
                    report();
                    row
                },
            )
            .collect::<Result<_>>()?
    } else {
        let mut engine = GeodesicAlgorithmExact::new(mesh);
        (0..total)
            .map(|vertex| {
                let row = matrix_row(&mut engine, vertex, max_distance);
                report();
                row
            })
            .collect::<Result<_>>()?
    };

    let mut matrix = SparseMatrix::new(total);
    for (row, entries) in rows.into_iter().enumerate() {
        matrix.append_row(row, entries);
    }
    debug!("Local distance matrix has {} entries", matrix.len());
    Ok(matrix)
}

fn matrix_row(
    engine: &mut GeodesicAlgorithmExact<'_>,
    vertex: usize,
    max_distance: f64,
) -> Result<Vec<(usize, f64)>> {
    engine.propagate(&[SurfacePoint::Vertex { vertex }], max_distance, None)?;
    Ok(engine
        .distances()
        .into_iter()
        .enumerate()
        .filter(|&(_, d)| d.is_finite() && d > 0.0 && d <= max_distance)
        .collect())
}
