//! Mesh construction from face-vertex lists.
//!
//! File readers and other producers hand over a list of vertex positions
//! and a list of per-face vertex index loops; these helpers validate the
//! input and feed it through the incremental
//! [`add_face`](HalfEdgeMesh::add_face) core.

use nalgebra::{Point3, RealField};

use crate::error::{MeshError, Result};

use super::halfedge::HalfEdgeMesh;
use super::index::VertexHandle;

fn build<'a, S, I>(vertices: &[Point3<S>], faces: I) -> Result<HalfEdgeMesh<S>>
where
    S: RealField + Copy,
    I: Iterator<Item = &'a [usize]> + Clone,
{
    let mut any = false;
    for (fi, face) in faces.clone().enumerate() {
        any = true;
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        for (i, &vi) in face.iter().enumerate() {
            if face[i + 1..].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
    }
    if !any {
        return Err(MeshError::EmptyMesh);
    }

    let mut mesh = HalfEdgeMesh::new();
    mesh.reserve_vertices(vertices.len());
    let handles = mesh.add_vertices_from(vertices);

    let mut loop_handles: Vec<VertexHandle> = Vec::new();
    for face in faces {
        loop_handles.clear();
        loop_handles.extend(face.iter().map(|&vi| handles[vi]));
        mesh.add_face(&loop_handles)?;
    }
    Ok(mesh)
}

/// Build a half-edge mesh from vertices and arbitrary polygonal faces,
/// each given as a counter-clockwise vertex index loop.
///
/// # Example
/// ```
/// use strix::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh = build_from_polygons::<f64>(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert!(mesh.is_quad_mesh());
/// ```
pub fn build_from_polygons<S: RealField + Copy>(
    vertices: &[Point3<S>],
    faces: &[Vec<usize>],
) -> Result<HalfEdgeMesh<S>> {
    build(vertices, faces.iter().map(|f| f.as_slice()))
}

/// Build a half-edge mesh from vertices and triangle faces.
pub fn build_from_triangles<S: RealField + Copy>(
    vertices: &[Point3<S>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<S>> {
    build(vertices, faces.iter().map(|f| f.as_slice()))
}

/// Build a half-edge mesh from vertices and quad faces.
pub fn build_from_quads<S: RealField + Copy>(
    vertices: &[Point3<S>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<S>> {
    build(vertices, faces.iter().map(|f| f.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.check(false), 0);

        for v in mesh.vertices() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_tetrahedron_from_triangles() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.is_closed());
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_two_quads() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
        let mesh = build_from_quads(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 7);
        assert!(mesh.is_quad_mesh());
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_mixed_polygons() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 2.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
        let mesh = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_quads(), 1);
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_empty_input() {
        let result = build_from_triangles::<f64>(&[], &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::<f64>::new(0.0, 0.0, 0.0)];
        let result = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let vertices = vec![
            Point3::<f64>::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let result = build_from_triangles(&vertices, &[[0, 0, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_nonmanifold_input_is_refused() {
        // Three triangles over the same edge (0, 1).
        let vertices = vec![
            Point3::<f64>::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        assert!(build_from_triangles(&vertices, &faces).is_err());
    }
}
