//! Error types for strix.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::mesh::{EdgeHandle, HalfEdgeHandle, VertexHandle};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// A face was given fewer than three vertices.
    #[error("face needs at least 3 vertices, got {count}")]
    FaceTooSmall {
        /// Number of vertices supplied.
        count: usize,
    },

    /// Adding the face would create a second boundary fan around a vertex.
    #[error("adding face would make vertex {vertex:?} complex (non-manifold)")]
    ComplexVertex {
        /// The offending vertex.
        vertex: VertexHandle,
    },

    /// An edge of the new face already bounds two faces.
    #[error("edge ({from:?}, {to:?}) already bounds two faces")]
    NonManifoldEdge {
        /// Origin of the directed edge.
        from: VertexHandle,
        /// Target of the directed edge.
        to: VertexHandle,
    },

    /// The two half-edges passed to `insert_edge` do not bound the same face.
    #[error("half-edges {he_prev:?} and {he_next:?} do not bound the same face")]
    FacesDiffer {
        /// First half-edge.
        he_prev: HalfEdgeHandle,
        /// Second half-edge.
        he_next: HalfEdgeHandle,
    },

    /// The edge cannot be flipped (boundary, non-triangle faces, or the
    /// flipped edge already exists).
    #[error("edge {edge:?} is not flippable")]
    EdgeNotFlippable {
        /// The edge.
        edge: EdgeHandle,
    },

    /// The operation requires a mesh where every face is an n-gon.
    #[error("operation requires a pure {expected}-gon mesh")]
    NotNGonMesh {
        /// Required face valence.
        expected: usize,
    },

    /// A property handle is stale or belongs to a different mesh.
    #[error("property handle is stale or foreign (slot {slot})")]
    StaleProperty {
        /// Raw column slot of the handle.
        slot: usize,
    },

    /// A face references a vertex index outside the vertex array.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index in the input list.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index in the input list.
        face: usize,
    },

    /// The input face list is empty.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
