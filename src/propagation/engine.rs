// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Continuous Dijkstra over edge windows
//!
//! Sources seed windows on nearby edges. The event queue always advances the
//! window (or saddle vertex) closest to the sources: a window is unfolded into
//! the face behind it and the part of the wavefront that is still visible lands
//! on the two far edges. Each edge keeps only the pieces of windows that are
//! strictly closer than anything already there, so every edge ends up with a
//! lower envelope of distance functions.

use super::queue::{EventKind, EventQueue};
use super::window::{candidate_wins, subtract, Span, Window, WindowId, WindowState};
use super::{PropagationStats, StopPolicy, GEODESIC_INF};
use crate::error::{GeodesicError, Result};
use crate::geometry::unfold::{axis_crossing, place_apex, ray_segment_parameter, EdgeFrame};
use crate::geometry::{Mesh, SurfacePoint};
use log::{debug, trace};
use nalgebra::Point2;

/// Windows narrower than this fraction of their edge are dropped
const MIN_WINDOW_FRACTION: f64 = 1e-10;

/// Visibility slack, as a fraction of the edge length
pub(super) const VISIBILITY_FRACTION: f64 = 1e-9;

/// Pops between refreshes of the early-exit threshold
const STOP_CHECK_INTERVAL: usize = 32;

/// A face laid out in the frame of one of its edges: the edge's endpoints on
/// the x axis, the opposite corner last
pub(super) type FaceLayout = [(usize, Point2<f64>); 3];

/// Exact geodesic distance propagation over one mesh.
///
/// The engine borrows the mesh immutably and owns all per-run state, so one
/// engine per thread can share a mesh freely.
pub struct GeodesicAlgorithmExact<'a> {
    pub(super) mesh: &'a Mesh,
    pub(super) windows: Vec<Window>,
    pub(super) edge_windows: Vec<Vec<WindowId>>,
    pub(super) vertex_distance: Vec<f64>,
    pub(super) vertex_source: Vec<Option<usize>>,
    /// Distance at which a vertex last acted as a pseudo-source
    expanded_at: Vec<f64>,
    queue: EventQueue,
    pub(super) sources: Vec<SurfacePoint>,
    pub(super) distance_limit: f64,
    stop_policy: StopPolicy,
    stats: PropagationStats,
}

impl<'a> GeodesicAlgorithmExact<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            windows: Vec::new(),
            edge_windows: vec![Vec::new(); mesh.edge_count()],
            vertex_distance: vec![GEODESIC_INF; mesh.vertex_count()],
            vertex_source: vec![None; mesh.vertex_count()],
            expanded_at: vec![GEODESIC_INF; mesh.vertex_count()],
            queue: EventQueue::new(),
            sources: Vec::new(),
            distance_limit: GEODESIC_INF,
            stop_policy: StopPolicy::default(),
            stats: PropagationStats::default(),
        }
    }

    /// Builder-style stop policy
    pub fn with_stop_policy(mut self, policy: StopPolicy) -> Self {
        self.stop_policy = policy;
        self
    }

    pub fn set_stop_policy(&mut self, policy: StopPolicy) {
        self.stop_policy = policy;
    }

    pub fn stop_policy(&self) -> StopPolicy {
        self.stop_policy
    }

    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// Sources of the last run, in canonical form
    pub fn sources(&self) -> &[SurfacePoint] {
        &self.sources
    }

    pub fn distance_limit(&self) -> f64 {
        self.distance_limit
    }

    /// Counters from the last run
    pub fn propagation_stats(&self) -> PropagationStats {
        self.stats
    }

    /// Run the wavefront from `sources` until the queue is empty, the next
    /// event lies beyond `distance_limit`, or (under [`StopPolicy::EarlyExit`])
    /// every stop point has its final distance.
    pub fn propagate(
        &mut self,
        sources: &[SurfacePoint],
        distance_limit: f64,
        stop_points: Option<&[SurfacePoint]>,
    ) -> Result<()> {
        if distance_limit.is_nan() || distance_limit < 0.0 {
            return Err(GeodesicError::invalid_param(
                "distance_limit",
                distance_limit,
                "must be a non-negative number",
            ));
        }
        let sources = sources
            .iter()
            .map(|p| p.checked(self.mesh))
            .collect::<Result<Vec<_>>>()?;
        let stop_points = stop_points
            .unwrap_or_default()
            .iter()
            .map(|p| p.checked(self.mesh))
            .collect::<Result<Vec<_>>>()?;

        self.reset(distance_limit);
        debug!(
            "Propagating from {} source(s), limit {}, {} stop point(s)",
            sources.len(),
            distance_limit,
            stop_points.len()
        );

        for (index, source) in sources.iter().enumerate() {
            self.seed(index, *source);
        }
        self.sources = sources;

        let early_exit = self.stop_policy == StopPolicy::EarlyExit && !stop_points.is_empty();
        let mut threshold = GEODESIC_INF;
        let mut until_refresh = 0usize;

        while let Some(event) = self.queue.pop() {
            if event.key > self.distance_limit {
                trace!("Next event at {} exceeds the limit", event.key);
                break;
            }
            if early_exit {
                if until_refresh == 0 {
                    threshold = self.stop_threshold(&stop_points);
                    until_refresh = STOP_CHECK_INTERVAL;
                }
                until_refresh -= 1;
                if event.key >= threshold {
                    trace!("All stop points settled at {}", threshold);
                    break;
                }
            }

            match event.kind {
                EventKind::Window(id) => {
                    if self.windows[id].state != WindowState::Queued {
                        continue;
                    }
                    self.windows[id].state = WindowState::Propagated;
                    self.stats.events_processed += 1;
                    self.propagate_window(id);
                }
                EventKind::Vertex(vertex) => {
                    let distance = self.vertex_distance[vertex];
                    if event.key != distance || distance >= self.expanded_at[vertex] {
                        continue;
                    }
                    self.expanded_at[vertex] = distance;
                    self.stats.events_processed += 1;
                    if let Some(source_index) = self.vertex_source[vertex] {
                        self.emit_vertex_windows(vertex, distance, source_index);
                    }
                }
            }
        }

        if !self.queue.is_empty() {
            trace!("Stopped with {} event(s) still queued", self.queue.len());
        }
        self.stats.vertices_reached = self
            .vertex_distance
            .iter()
            .filter(|&&d| d <= self.distance_limit)
            .count();
        debug!(
            "Propagation finished: {} windows, {} events, {} of {} vertices reached",
            self.stats.windows_created,
            self.stats.events_processed,
            self.stats.vertices_reached,
            self.mesh.vertex_count()
        );
        Ok(())
    }

    fn reset(&mut self, distance_limit: f64) {
        self.windows.clear();
        self.edge_windows.iter_mut().for_each(Vec::clear);
        self.vertex_distance.fill(GEODESIC_INF);
        self.vertex_source.fill(None);
        self.expanded_at.fill(GEODESIC_INF);
        self.queue.clear();
        self.sources.clear();
        self.stats = PropagationStats::default();
        self.distance_limit = distance_limit;
    }

    /// Largest current estimate over the stop points
    fn stop_threshold(&self, stop_points: &[SurfacePoint]) -> f64 {
        stop_points
            .iter()
            .map(|p| self.estimate(p).0)
            .fold(0.0, f64::max)
    }

    fn seed(&mut self, index: usize, source: SurfacePoint) {
        let mesh = self.mesh;
        match source {
            SurfacePoint::Vertex { vertex } => {
                self.update_vertex(vertex, 0.0, index);
                // A coincident earlier source already owns this vertex
                if self.vertex_source[vertex] == Some(index) {
                    self.expanded_at[vertex] = 0.0;
                    self.emit_vertex_windows(vertex, 0.0, index);
                }
            }
            SurfacePoint::Edge { edge, t } => {
                let e = mesh.edge(edge);
                let offset = t * e.length;
                self.update_vertex(e.vertices[0], offset, index);
                self.update_vertex(e.vertices[1], e.length - offset, index);

                let position = Point2::new(offset, 0.0);
                for &face in &e.faces {
                    let layout = self.unfold_face(face, edge, false);
                    for &far in &mesh.face(face).edges {
                        if far != edge {
                            let span = (0.0, mesh.edge(far).length);
                            let window =
                                self.window_in_layout(&layout, face, far, span, position, 0.0, index);
                            self.insert_window(window);
                        }
                    }
                }
            }
            SurfacePoint::Face { face, barycentric } => {
                let f = mesh.face(face);
                let layout = self.unfold_face(face, f.edges[0], false);
                let mut position = Point2::origin();
                for k in 0..3 {
                    position += layout_position(&layout, f.vertices[k]).coords * barycentric[k];
                }
                for &edge in &f.edges {
                    let span = (0.0, mesh.edge(edge).length);
                    let window = self.window_in_layout(&layout, face, edge, span, position, 0.0, index);
                    self.insert_window(window);
                }
            }
        }
    }

    /// Treat `vertex` as a pseudo-source at distance `sigma`
    fn emit_vertex_windows(&mut self, vertex: usize, sigma: f64, source_index: usize) {
        let mesh = self.mesh;
        for &face in &mesh.vertex(vertex).faces {
            let edge = mesh.opposite_edge(face, vertex);
            let layout = self.unfold_face(face, edge, false);
            let span = (0.0, mesh.edge(edge).length);
            let window =
                self.window_in_layout(&layout, face, edge, span, layout[2].1, sigma, source_index);
            self.insert_window(window);
        }
    }

    fn propagate_window(&mut self, id: WindowId) {
        let window = self.windows[id];
        let Some(face) = window.into else {
            return;
        };
        let mesh = self.mesh;
        let layout = self.unfold_face(face, window.edge, true);
        let slack = VISIBILITY_FRACTION * mesh.edge(window.edge).length;

        let (apex, apex_pos) = layout[2];
        let apex_x = axis_crossing(&window.source, &apex_pos);
        if window.covers(apex_x, slack) {
            let distance = window.sigma + (apex_pos - window.source).norm();
            self.update_vertex(apex, distance, window.source_index);
        }

        for k in 0..2 {
            let (near, near_pos) = layout[k];
            let far_edge = mesh.opposite_edge(face, layout[1 - k].0);

            // Part of the window whose rays hit the segment near -> apex
            let lo = window.start.max(near_pos.x.min(apex_x));
            let hi = window.end.min(near_pos.x.max(apex_x));
            if hi <= lo {
                continue;
            }
            let along = |x: f64| {
                if x == near_pos.x {
                    0.0
                } else if x == apex_x {
                    1.0
                } else {
                    ray_segment_parameter(&window.source, x, &near_pos, &apex_pos)
                }
            };
            let (u0, u1) = {
                let (p, q) = (along(lo), along(hi));
                if p <= q {
                    (p, q)
                } else {
                    (q, p)
                }
            };

            let e = mesh.edge(far_edge);
            let span = if e.vertices[0] == near {
                (u0 * e.length, u1 * e.length)
            } else {
                ((1.0 - u1) * e.length, (1.0 - u0) * e.length)
            };
            let candidate = self.window_in_layout(
                &layout,
                face,
                far_edge,
                span,
                window.source,
                window.sigma,
                window.source_index,
            );
            self.insert_window(candidate);
        }
    }

    /// Merge `candidate` into the lower envelope of its edge
    fn insert_window(&mut self, candidate: Window) {
        let edge = candidate.edge;
        let (first, second, length) = {
            let e = self.mesh.edge(edge);
            (e.vertices[0], e.vertices[1], e.length)
        };
        let start = candidate.start.max(0.0);
        let end = candidate.end.min(length);
        if !(end >= start) {
            return;
        }
        let candidate = candidate.with_range(start, end);
        if candidate.min_distance() > self.distance_limit {
            return;
        }

        let endpoint_slack = VISIBILITY_FRACTION * length;
        if start <= endpoint_slack {
            self.update_vertex(first, candidate.distance_at(0.0), candidate.source_index);
        }
        if end >= length - endpoint_slack {
            self.update_vertex(second, candidate.distance_at(length), candidate.source_index);
        }

        let min_width = MIN_WINDOW_FRACTION * length;
        if candidate.width() <= min_width {
            return;
        }

        let mut winning: Vec<Span> = vec![(start, end)];
        for &id in &self.edge_windows[edge] {
            let existing = &self.windows[id];
            let lo = start.max(existing.start);
            let hi = end.min(existing.end);
            if hi <= lo {
                continue;
            }
            let wins = candidate_wins(&candidate, existing, lo, hi);
            let losing = subtract(&[(lo, hi)], &wins);
            winning = subtract(&winning, &losing);
            if winning.is_empty() {
                return;
            }
        }
        winning.retain(|&(a, b)| b - a > min_width);
        if winning.is_empty() {
            return;
        }

        let existing = std::mem::take(&mut self.edge_windows[edge]);
        let mut kept = Vec::with_capacity(existing.len() + winning.len());
        for id in existing {
            let old = self.windows[id];
            let remaining = subtract(&[(old.start, old.end)], &winning);
            if remaining.len() == 1 && remaining[0] == (old.start, old.end) {
                kept.push(id);
                continue;
            }
            self.windows[id].state = WindowState::Discarded;
            for (a, b) in remaining {
                if b - a > min_width {
                    kept.push(self.push_window(old.with_range(a, b)));
                }
            }
        }
        for (a, b) in winning {
            kept.push(self.push_window(candidate.with_range(a, b)));
        }
        self.edge_windows[edge] = kept;
    }

    fn push_window(&mut self, mut window: Window) -> WindowId {
        let id = self.windows.len();
        if window.state == WindowState::Queued {
            if window.into.is_some() {
                self.queue.push(window.min_distance(), EventKind::Window(id));
            } else {
                window.state = WindowState::Propagated;
            }
        }
        self.windows.push(window);
        self.stats.windows_created += 1;
        self.stats.max_queue_len = self.stats.max_queue_len.max(self.queue.len());
        id
    }

    fn update_vertex(&mut self, vertex: usize, distance: f64, source_index: usize) {
        if distance >= self.vertex_distance[vertex] {
            return;
        }
        self.vertex_distance[vertex] = distance;
        self.vertex_source[vertex] = Some(source_index);
        if self.mesh.vertex(vertex).saddle_or_boundary && distance <= self.distance_limit {
            self.queue.push(distance, EventKind::Vertex(vertex));
        }
    }

    /// Lay `face` out in the frame of `edge`, with the opposite corner above
    /// the axis or, when `below` is set, beneath it
    pub(super) fn unfold_face(&self, face: usize, edge: usize, below: bool) -> FaceLayout {
        let mesh = self.mesh;
        let e = mesh.edge(edge);
        let (a, b) = (e.vertices[0], e.vertices[1]);
        let c = mesh.opposite_vertex(face, edge);
        let from_a = mesh.edge(mesh.opposite_edge(face, b)).length;
        let from_b = mesh.edge(mesh.opposite_edge(face, a)).length;
        let mut apex = place_apex(e.length, from_a, from_b);
        if below {
            apex.y = -apex.y;
        }
        [
            (a, Point2::origin()),
            (b, Point2::new(e.length, 0.0)),
            (c, apex),
        ]
    }

    /// Window over `span` of `edge`, one side of `face`, whose pseudo-source
    /// sits at `source` in the coordinates of `layout`
    #[allow(clippy::too_many_arguments)]
    fn window_in_layout(
        &self,
        layout: &FaceLayout,
        face: usize,
        edge: usize,
        span: Span,
        source: Point2<f64>,
        sigma: f64,
        source_index: usize,
    ) -> Window {
        let e = self.mesh.edge(edge);
        let side = layout
            .iter()
            .find(|(v, _)| !e.vertices.contains(v))
            .map(|&(_, p)| p)
            .unwrap_or_else(Point2::origin);
        let frame = EdgeFrame::new(
            layout_position(layout, e.vertices[0]),
            layout_position(layout, e.vertices[1]),
            side,
        );
        let mut local = frame.to_local(source);
        local.y = local.y.max(0.0);
        Window {
            edge,
            start: span.0,
            end: span.1,
            source: local,
            sigma,
            source_index,
            into: self.mesh.other_face(edge, face),
            state: WindowState::Queued,
        }
    }
}

pub(super) fn layout_position(layout: &FaceLayout, vertex: usize) -> Point2<f64> {
    layout
        .iter()
        .find(|(v, _)| *v == vertex)
        .map(|&(_, p)| p)
        .unwrap_or_else(Point2::origin)
}
