// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Windows: edge intervals carrying a distance function back to a pseudo-source
//!
//! A window lives in the local frame of its edge (first vertex at the origin,
//! second vertex at `(length, 0)`). Its pseudo-source is unfolded into the same
//! plane on the side it came from (`y >= 0`), so the distance at arc-length `x`
//! is `sigma + |(x, 0) - source|`.

use nalgebra::Point2;

/// Index into the per-run window arena
pub(crate) type WindowId = usize;

/// Closed interval `[start, end]` of arc-length along an edge
pub(crate) type Span = (f64, f64);

/// Relative margin a candidate must beat an existing window by
const STRICTLY_CLOSER: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowState {
    /// Waiting in the event queue
    Queued,
    /// Unfolded into its face (or has no face to unfold into)
    Propagated,
    /// Replaced by trimmed pieces or beaten entirely
    Discarded,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub edge: usize,
    pub start: f64,
    pub end: f64,
    /// Pseudo-source in the edge frame
    pub source: Point2<f64>,
    /// Geodesic distance from the real source to the pseudo-source
    pub sigma: f64,
    pub source_index: usize,
    /// Face the window propagates into, `None` across a boundary
    pub into: Option<usize>,
    pub state: WindowState,
}

impl Window {
    #[inline]
    pub fn distance_at(&self, x: f64) -> f64 {
        self.sigma + (x - self.source.x).hypot(self.source.y)
    }

    /// Smallest distance anywhere on the window
    pub fn min_distance(&self) -> f64 {
        self.distance_at(self.source.x.clamp(self.start, self.end))
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn with_range(&self, start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            ..*self
        }
    }

    pub fn covers(&self, x: f64, tolerance: f64) -> bool {
        x >= self.start - tolerance && x <= self.end + tolerance
    }
}

/// Remove `remove` from `from`; both sorted and pairwise disjoint
pub(crate) fn subtract(from: &[Span], remove: &[Span]) -> Vec<Span> {
    let mut out = Vec::with_capacity(from.len() + remove.len());
    for &(start, end) in from {
        let mut lo = start;
        for &(r0, r1) in remove {
            if r1 <= lo {
                continue;
            }
            if r0 >= end {
                break;
            }
            if r0 > lo {
                out.push((lo, r0));
            }
            lo = lo.max(r1);
            if lo >= end {
                break;
            }
        }
        if lo < end {
            out.push((lo, end));
        }
    }
    out
}

/// Sub-spans of `[lo, hi]` where `candidate` is strictly closer than `existing`
pub(crate) fn candidate_wins(candidate: &Window, existing: &Window, lo: f64, hi: f64) -> Vec<Span> {
    let mut breaks = Vec::with_capacity(4);
    breaks.push(lo);
    for root in equal_distance_points(candidate, existing) {
        if root > lo && root < hi {
            breaks.push(root);
        }
    }
    breaks.push(hi);
    breaks.sort_by(f64::total_cmp);

    let mut wins: Vec<Span> = Vec::with_capacity(2);
    for pair in breaks.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b <= a {
            continue;
        }
        let mid = 0.5 * (a + b);
        let theirs = existing.distance_at(mid);
        if candidate.distance_at(mid) < theirs - STRICTLY_CLOSER * theirs {
            match wins.last_mut() {
                Some(last) if last.1 == a => last.1 = b,
                _ => wins.push((a, b)),
            }
        }
    }
    wins
}

/// Arc-length positions where both distance functions agree.
///
/// Solves `s1 + |x - p1| = s2 + |x - p2|` by squaring twice, which may add
/// spurious roots; callers classify the pieces between roots by sampling.
fn equal_distance_points(w1: &Window, w2: &Window) -> Vec<f64> {
    // Shift so the second pseudo-source sits above x = 0
    let shift = w2.source.x;
    let a1 = w1.source.x - shift;
    let h1_sq = w1.source.y * w1.source.y;
    let h2_sq = w2.source.y * w2.source.y;
    let d = w2.sigma - w1.sigma;

    // |x - p1| = |x - p2| + d  =>  a x + b = 2 d |x - p2|
    let a = -2.0 * a1;
    let b = a1 * a1 + h1_sq - h2_sq - d * d;

    let qa = a * a - 4.0 * d * d;
    let qb = 2.0 * a * b;
    let qc = b * b - 4.0 * d * d * h2_sq;

    let mut roots = Vec::with_capacity(3);
    if a != 0.0 {
        roots.push(-b / a);
    }

    let scale = a * a + 4.0 * d * d;
    if qa.abs() <= 1e-14 * scale {
        if qb != 0.0 {
            roots.push(-qc / qb);
        }
    } else {
        let mut disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 && disc > -1e-12 * (qb * qb + (4.0 * qa * qc).abs()) {
            disc = 0.0;
        }
        if disc >= 0.0 {
            let sq = disc.sqrt();
            let q = -0.5 * (qb + qb.signum() * sq);
            if q != 0.0 {
                roots.push(q / qa);
                roots.push(qc / q);
            } else {
                roots.push(0.0);
            }
        }
    }

    roots
        .into_iter()
        .filter(|r| r.is_finite())
        .map(|r| r + shift)
        .collect()
}
