// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh construction and geodesic queries

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, GeodesicError>;

/// Reasons a vertex/triangle buffer cannot be turned into a [`crate::geometry::Mesh`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Flat vertex buffer is not made of xyz triples
    #[error("vertex buffer length {len} is not a multiple of 3")]
    RaggedVertexBuffer { len: usize },

    /// Flat triangle buffer is not made of index triples
    #[error("triangle buffer length {len} is not a multiple of 3")]
    RaggedTriangleBuffer { len: usize },

    /// A coordinate is NaN or infinite
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate { vertex: usize },

    /// A face references a vertex that does not exist
    #[error("face {face} references invalid vertex index {vertex} (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },

    /// A face repeats one of its vertex indices
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace { face: usize },

    /// Two distinct vertices of a face sit at the same position
    #[error("edge ({v0}, {v1}) has zero length")]
    ZeroLengthEdge { v0: usize, v1: usize },

    /// An edge is shared by more than two faces
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge { v0: usize, v1: usize },
}

/// Errors raised by geodesic propagation and the public API
#[derive(Error, Debug)]
pub enum GeodesicError {
    /// Mesh construction failed
    #[error("malformed mesh: {0}")]
    MalformedMesh(#[from] MeshError),

    /// A source or target vertex index is outside the mesh
    #[error("invalid query point: vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    InvalidQueryPoint { index: usize, vertex_count: usize },

    /// A surface point references a missing element or carries an out-of-range parameter
    #[error("invalid surface point: {reason}")]
    InvalidSurfacePoint { reason: String },

    /// A numeric argument is outside its domain
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Reading a mesh file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A mesh file could not be parsed
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl GeodesicError {
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        GeodesicError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_point(reason: impl Into<String>) -> Self {
        GeodesicError::InvalidSurfacePoint {
            reason: reason.into(),
        }
    }

    /// Status code reported across the C boundary
    pub fn code(&self) -> i32 {
        match self {
            GeodesicError::MalformedMesh(_) => -1,
            GeodesicError::InvalidQueryPoint { .. } => -2,
            GeodesicError::InvalidSurfacePoint { .. } => -3,
            GeodesicError::InvalidParameter { .. } => -4,
            GeodesicError::Io { .. } | GeodesicError::Parse { .. } => -5,
        }
    }
}
