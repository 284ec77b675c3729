//! Mesh processing algorithms.

pub mod triangulate;
