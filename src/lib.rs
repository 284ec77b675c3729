//! # Strix
//!
//! A half-edge polygon mesh data structure for offline geometry
//! processing.
//!
//! Strix provides a manifold half-edge mesh with dynamic, named attribute
//! columns, incremental face insertion, topological editing (edge
//! splits and flips, face splits, uniform subdivision), sweep-based face
//! triangulation, and the usual geometric queries (normals with crease
//! splitting, dihedral angles, centroids, bounds).
//!
//! ## Features
//!
//! - **Half-edge connectivity**: O(1) opposite via index pairing, lazy
//!   circulators with lap-count termination, manifold-with-boundary
//!   invariants validated by a [`check`](mesh::HalfEdgeMesh::check)
//!   diagnostic
//! - **Property columns**: positions, normals, colors, texture
//!   coordinates, and arbitrary user data as named per-entity side tables
//! - **Scalar genericity**: any [`nalgebra::RealField`] scalar
//!   (`f64` by default)
//! - **Primitives**: box, tetrahedron, icosahedron, octahedron, sphere,
//!   cylinder, torus, disk, geodesic sphere
//!
//! ## Quick start
//!
//! ```
//! use strix::prelude::*;
//!
//! let mut mesh = create_box::<f64>().unwrap();
//! assert_eq!(mesh.num_faces(), 6);
//! assert!(mesh.is_quad_mesh());
//! assert!(mesh.is_closed());
//! assert_eq!(mesh.check(false), 0);
//!
//! // Triangulate in place and recompute shading normals.
//! strix::algo::triangulate::triangulate_convex(&mut mesh).unwrap();
//! assert!(mesh.is_triangle_mesh());
//! assert_eq!(mesh.num_faces(), 12);
//! ```
//!
//! ## Building meshes incrementally
//!
//! ```
//! use strix::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = HalfEdgeMesh::<f64>::new();
//! let v = mesh.add_vertices_from(&[
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ]);
//!
//! mesh.add_face(&[v[0], v[2], v[1]]).unwrap();
//! mesh.add_face(&[v[0], v[1], v[3]]).unwrap();
//! mesh.add_face(&[v[1], v[2], v[3]]).unwrap();
//! mesh.add_face(&[v[2], v[0], v[3]]).unwrap();
//!
//! assert!(mesh.is_closed());
//! assert_eq!(mesh.check(false), 0);
//! ```
//!
//! ## Traversal
//!
//! ```
//! use strix::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let mesh = build_from_triangles::<f64>(&vertices, &[[0, 1, 2]]).unwrap();
//! let v = VertexHandle::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("neighbor: {:?}", neighbor);
//! }
//!
//! let f = FaceHandle::new(0);
//! let corners: Vec<_> = mesh.face_vertices(f).collect();
//! assert_eq!(corners.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use strix::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, create_box,
        create_geodesic_sphere, create_icosahedron, create_sphere, create_torus,
        default_crease_angle, EdgeHandle, FaceHandle, HalfEdgeHandle, HalfEdgeMesh, Status,
        VertexHandle,
    };
}

// Re-export nalgebra for downstream convenience.
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_box_euler() {
        let b = create_box::<f64>().unwrap();
        assert_eq!(
            b.num_vertices() as isize - b.num_edges() as isize + b.num_faces() as isize,
            2
        );
    }

    #[test]
    fn test_f32_scalar() {
        let ico = create_icosahedron::<f32>(1.0).unwrap();
        assert_eq!(ico.num_vertices(), 12);
        assert_eq!(ico.num_edges(), 30);
        assert_eq!(ico.num_faces(), 20);
        assert_eq!(ico.check(false), 0);
    }
}
