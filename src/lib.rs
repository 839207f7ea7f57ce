// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! gdist - exact geodesic distances on triangle meshes
//!
//! Distances are propagated over the surface as windows of edge intervals
//! that each carry an unfolded pseudo-source, so results are exact for the
//! piecewise-flat surface rather than approximations along mesh edges.
//!
//! ```
//! let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
//! let triangles = [0, 1, 2, 0, 2, 3];
//! let d = gdist::compute_distances(&vertices, &triangles, &[0], &[2], None).unwrap();
//! assert!((d[0] - 2f64.sqrt()).abs() < 1e-12);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ffi;
pub mod geometry;
pub mod io;
pub mod matrix;
pub mod propagation;

pub use api::{compute_distances, distances_on_mesh, local_distance_matrix};
pub use config::GdistConfig;
pub use error::{GeodesicError, MeshError, Result};
pub use geometry::{Mesh, Primitive, SurfacePoint};
pub use matrix::{local_matrix, local_matrix_with, MatrixOptions, SparseMatrix};
pub use propagation::{GeodesicAlgorithmExact, PropagationStats, StopPolicy, GEODESIC_INF};
