// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Metric properties of computed distances on curved and perturbed surfaces

use anyhow::Result;
use gdist::geometry::Primitive;
use gdist::{compute_distances, local_distance_matrix, GEODESIC_INF};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Unit grid with every vertex pushed off the plane
fn bumpy_grid(n: usize, seed: u64) -> (Vec<f64>, Vec<u32>) {
    let (mut vertices, triangles) = Primitive::grid(n, n, 1.0).to_flat();
    let mut rng = StdRng::seed_from_u64(seed);
    for z in vertices.iter_mut().skip(2).step_by(3) {
        *z = rng.gen_range(-0.3..0.3);
    }
    (vertices, triangles)
}

fn position(vertices: &[f64], v: usize) -> [f64; 3] {
    [vertices[3 * v], vertices[3 * v + 1], vertices[3 * v + 2]]
}

fn euclidean(vertices: &[f64], a: usize, b: usize) -> f64 {
    let (p, q) = (position(vertices, a), position(vertices, b));
    ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) + (p[2] - q[2]).powi(2)).sqrt()
}

/// Shortest path restricted to mesh edges
fn edge_path_lengths(vertices: &[f64], triangles: &[u32], source: usize) -> Vec<f64> {
    let n = vertices.len() / 3;
    let mut adjacency = vec![Vec::new(); n];
    for tri in triangles.chunks_exact(3) {
        for k in 0..3 {
            let a = tri[k] as usize;
            let b = tri[(k + 1) % 3] as usize;
            let w = euclidean(vertices, a, b);
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut heap = BinaryHeap::new();
    dist[source] = 0.0;
    heap.push(Reverse((0u64, source)));
    while let Some(Reverse((bits, v))) = heap.pop() {
        let d = f64::from_bits(bits);
        if d > dist[v] {
            continue;
        }
        for &(u, w) in &adjacency[v] {
            let next = d + w;
            if next < dist[u] {
                dist[u] = next;
                // Non-negative floats order the same as their bit patterns
                heap.push(Reverse((next.to_bits(), u)));
            }
        }
    }
    dist
}

#[test]
fn test_symmetry_on_bumpy_grid() -> Result<()> {
    let (vertices, triangles) = bumpy_grid(6, 7);
    let n = (vertices.len() / 3) as u32;
    let all: Vec<u32> = (0..n).collect();

    let rows: Vec<Vec<f64>> = [0u32, 10, 17, 30, 48]
        .iter()
        .map(|&s| compute_distances(&vertices, &triangles, &[s], &all, None))
        .collect::<Result<_, _>>()?;

    for (i, &a) in [0usize, 10, 17, 30, 48].iter().enumerate() {
        for (j, &b) in [0usize, 10, 17, 30, 48].iter().enumerate() {
            let ab = rows[i][b];
            let ba = rows[j][a];
            assert!(
                (ab - ba).abs() < 1e-8,
                "d({}, {}) = {} but d({}, {}) = {}",
                a,
                b,
                ab,
                b,
                a,
                ba
            );
        }
    }
    Ok(())
}

#[test]
fn test_bounded_by_chord_and_edge_path() -> Result<()> {
    for seed in [1u64, 2, 3] {
        let (vertices, triangles) = bumpy_grid(5, seed);
        let n = vertices.len() / 3;
        let all: Vec<u32> = (0..n as u32).collect();

        for source in [0usize, 14, 20] {
            let d = compute_distances(&vertices, &triangles, &[source as u32], &all, None)?;
            let graph = edge_path_lengths(&vertices, &triangles, source);
            for v in 0..n {
                let chord = euclidean(&vertices, source, v);
                assert!(
                    d[v] >= chord - 1e-9,
                    "seed {}: d({}, {}) = {} shorter than chord {}",
                    seed,
                    source,
                    v,
                    d[v],
                    chord
                );
                assert!(
                    d[v] <= graph[v] + 1e-9,
                    "seed {}: d({}, {}) = {} longer than edge path {}",
                    seed,
                    source,
                    v,
                    d[v],
                    graph[v]
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_triangle_inequality() -> Result<()> {
    let (vertices, triangles) = Primitive::sphere(1.0, 10).to_flat();
    let n = (vertices.len() / 3) as u32;
    let all: Vec<u32> = (0..n).collect();
    let picks = [0u32, 5, 23, 47, 66, n - 1];

    let rows: Vec<Vec<f64>> = picks
        .iter()
        .map(|&s| compute_distances(&vertices, &triangles, &[s], &all, None))
        .collect::<Result<_, _>>()?;

    for (i, row_a) in rows.iter().enumerate() {
        for (j, row_b) in rows.iter().enumerate() {
            let ab = row_a[picks[j] as usize];
            for c in 0..n as usize {
                assert!(
                    row_a[c] <= ab + row_b[c] + 1e-9,
                    "d({}, {}) > d({}, {}) + d({}, {})",
                    picks[i],
                    c,
                    picks[i],
                    picks[j],
                    picks[j],
                    c
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_limit_only_prunes() -> Result<()> {
    let (vertices, triangles) = bumpy_grid(6, 11);
    let n = (vertices.len() / 3) as u32;
    let all: Vec<u32> = (0..n).collect();
    let limit = 3.0;

    let full = compute_distances(&vertices, &triangles, &[8], &all, None)?;
    let limited = compute_distances(&vertices, &triangles, &[8], &all, Some(limit))?;

    for v in 0..n as usize {
        if full[v] < limit - 1e-9 {
            assert!(
                (limited[v] - full[v]).abs() < 1e-9,
                "vertex {}: {} vs {}",
                v,
                limited[v],
                full[v]
            );
        } else if full[v] > limit + 1e-9 {
            assert_eq!(limited[v], GEODESIC_INF, "vertex {} should be cut off", v);
        }
    }
    Ok(())
}

#[test]
fn test_extra_sources_never_increase_distance() -> Result<()> {
    let (vertices, triangles) = bumpy_grid(5, 5);
    let n = (vertices.len() / 3) as u32;
    let all: Vec<u32> = (0..n).collect();

    let one = compute_distances(&vertices, &triangles, &[0], &all, None)?;
    let two = compute_distances(&vertices, &triangles, &[0, 35], &all, None)?;
    let other = compute_distances(&vertices, &triangles, &[35], &all, None)?;

    for v in 0..n as usize {
        assert!(two[v] <= one[v] + 1e-12);
        assert!((two[v] - one[v].min(other[v])).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_matrix_entries_are_sorted_and_bounded() -> Result<()> {
    let (vertices, triangles) = bumpy_grid(5, 9);
    let matrix = local_distance_matrix(&vertices, &triangles, Some(1.5))?;

    assert!(!matrix.is_empty());
    assert!(matrix.is_symmetric(1e-8));
    let entries: Vec<_> = matrix.iter().collect();
    for pair in entries.windows(2) {
        assert!((pair[0].0, pair[0].1) < (pair[1].0, pair[1].1));
    }
    for &(r, c, d) in &entries {
        assert_ne!(r, c);
        assert!(d > 0.0 && d <= 1.5);
    }
    Ok(())
}
