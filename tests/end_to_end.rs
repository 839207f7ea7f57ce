// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end checks through the buffer API

use anyhow::Result;
use approx::assert_relative_eq;
use gdist::geometry::Primitive;
use gdist::{compute_distances, local_distance_matrix, GeodesicError, MeshError, GEODESIC_INF};

#[test]
fn test_single_flat_triangle() -> Result<()> {
    let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let d = compute_distances(&vertices, &[0, 1, 2], &[0], &[0, 1], None)?;
    assert_eq!(d[0], 0.0);
    assert_relative_eq!(d[1], 1.0, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_unit_square_diagonal() -> Result<()> {
    let vertices = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
    ];
    // Split along the other diagonal so the answer crosses an edge
    let triangles = [0, 1, 3, 1, 2, 3];
    let d = compute_distances(&vertices, &triangles, &[0], &[2], None)?;
    assert_relative_eq!(d[0], 2f64.sqrt(), epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_disconnected_components() -> Result<()> {
    let vertices = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
        5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 5.0, 1.0, 0.0,
    ];
    let triangles = [0, 1, 2, 3, 4, 5];
    let d = compute_distances(&vertices, &triangles, &[0], &[2, 4], None)?;
    assert_relative_eq!(d[0], 1.0, epsilon = 1e-12);
    assert_eq!(d[1], GEODESIC_INF);

    let matrix = local_distance_matrix(&vertices, &triangles, None)?;
    assert!(matrix.iter().all(|(r, c, _)| (r < 3) == (c < 3)));
    Ok(())
}

#[test]
fn test_multiple_sources_take_the_nearest() -> Result<()> {
    let (vertices, triangles) = Primitive::grid(4, 1, 1.0).to_flat();
    let d = compute_distances(&vertices, &triangles, &[0, 4], &[1, 2, 3], None)?;
    assert_relative_eq!(d[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(d[1], 2.0, epsilon = 1e-12);
    assert_relative_eq!(d[2], 1.0, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_empty_targets_and_sources() -> Result<()> {
    let (vertices, triangles) = Primitive::grid(2, 2, 1.0).to_flat();
    assert!(compute_distances(&vertices, &triangles, &[0], &[], None)?.is_empty());
    let d = compute_distances(&vertices, &triangles, &[], &[3], None)?;
    assert_eq!(d, vec![GEODESIC_INF]);
    Ok(())
}

#[test]
fn test_error_reporting() {
    let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    let err = compute_distances(&vertices, &[0, 1, 2], &[0], &[3], None).unwrap_err();
    assert!(matches!(err, GeodesicError::InvalidQueryPoint { index: 3, .. }));

    let err = compute_distances(&vertices, &[0, 1, 1], &[0], &[1], None).unwrap_err();
    assert!(matches!(
        err,
        GeodesicError::MalformedMesh(MeshError::DegenerateFace { face: 0 })
    ));

    let err = compute_distances(&vertices[..8], &[0, 1, 2], &[0], &[1], None).unwrap_err();
    assert!(matches!(
        err,
        GeodesicError::MalformedMesh(MeshError::RaggedVertexBuffer { len: 8 })
    ));

    let err = compute_distances(&vertices, &[0, 1, 2], &[0], &[1], Some(-2.0)).unwrap_err();
    assert!(matches!(err, GeodesicError::InvalidParameter { .. }));

    // Three triangles on one edge
    let fan = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0,
    ];
    let err = local_distance_matrix(&fan, &[0, 1, 2, 1, 0, 3, 0, 1, 4], None).unwrap_err();
    assert!(matches!(
        err,
        GeodesicError::MalformedMesh(MeshError::NonManifoldEdge { v0: 0, v1: 1 })
    ));
}

#[test]
fn test_flat_triangular_mesh_matrix() -> Result<()> {
    // 11 x 11 vertices, 0.2 apart
    let (vertices, triangles) = Primitive::grid(10, 10, 0.2).to_flat();

    let matrix = local_distance_matrix(&vertices, &triangles, None)?;
    assert!(matrix.is_symmetric(1e-6));
    assert_relative_eq!(matrix.get(1, 0).unwrap_or(0.0), 0.2, epsilon = 1e-9);
    assert_eq!(matrix.len(), 121 * 120);

    let cut = local_distance_matrix(&vertices, &triangles, Some(0.3))?;
    assert!(cut.is_symmetric(1e-6));
    assert!(cut.values.iter().all(|&d| d > 0.0 && d <= 0.3));
    // Axis neighbours (0.2) and diagonal neighbours (0.283) only
    assert_eq!(cut.iter().filter(|&(r, _, _)| r == 60).count(), 8);
    Ok(())
}
