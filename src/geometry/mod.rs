// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh topology, surface points and planar unfolding

mod mesh;
mod primitives;
mod surface_point;
pub mod unfold;

pub use mesh::{Edge, Face, Mesh, Vertex};
pub use primitives::Primitive;
pub use surface_point::SurfacePoint;
