//! Topological editing operations.
//!
//! Everything that mutates mesh connectivity lives here: face insertion
//! with boundary stitching, edge insertion (face splitting), edge and face
//! splitting, edge flips, and uniform subdivision. All operations either
//! succeed and leave the mesh consistent (in the sense of
//! [`check`](HalfEdgeMesh::check)), or fail with a typed error and leave
//! the mesh untouched.

use nalgebra::{Point3, RealField};

use crate::error::{MeshError, Result};

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeHandle, FaceHandle, HalfEdgeHandle, VertexHandle};

impl<S: RealField + Copy> HalfEdgeMesh<S> {
    /// Add a face over existing vertices, given in counter-clockwise order.
    ///
    /// For each consecutive vertex pair the connecting half-edge is found
    /// or created, then the new face's loop is stitched into the existing
    /// boundary structure. The first vertex of the returned face (as
    /// reported by [`face_vertices`](Self::face_vertices)) is
    /// `vertices[0]`.
    ///
    /// # Errors
    ///
    /// - [`MeshError::FaceTooSmall`] for fewer than three vertices.
    /// - [`MeshError::ComplexVertex`] if a vertex is interior: the new face
    ///   would give it a second boundary fan, which the data structure
    ///   cannot represent.
    /// - [`MeshError::NonManifoldEdge`] if a consecutive pair is already
    ///   connected by a half-edge bounding a face.
    ///
    /// On failure, edges created for this call are rolled back and the mesh
    /// is unchanged.
    pub fn add_face(&mut self, vertices: &[VertexHandle]) -> Result<FaceHandle> {
        if vertices.len() < 3 {
            log::warn!("refusing face with {} vertices", vertices.len());
            return Err(MeshError::FaceTooSmall {
                count: vertices.len(),
            });
        }
        if let Some(&v) = vertices.iter().find(|&&v| !self.is_boundary_vertex(v)) {
            log::warn!("refusing face: vertex {:?} would become complex", v);
            return Err(MeshError::ComplexVertex { vertex: v });
        }

        let num_edges_old = self.num_edges();

        // Find or create the half-edge of every consecutive pair. Nothing
        // is linked into the old structure yet, so a refusal below only
        // needs to truncate the edge arrays.
        let mut hes = Vec::with_capacity(vertices.len());
        for i in 0..vertices.len() {
            let from = vertices[i];
            let to = vertices[(i + 1) % vertices.len()];
            let mut he = self.find_halfedge(from, to);
            if !he.is_valid() {
                he = self.add_edge(from, to).halfedge();
            } else if !self.is_boundary_halfedge(he) {
                self.truncate_edges(num_edges_old);
                log::warn!(
                    "refusing face: edge ({:?}, {:?}) already bounds two faces",
                    from,
                    to
                );
                return Err(MeshError::NonManifoldEdge { from, to });
            }
            hes.push(he);
        }

        // All preconditions hold; from here on the insertion cannot fail.
        let f = self.create_face(hes[hes.len() - 1]);
        for &he in &hes {
            self.he_mut(he).face = f;
        }

        // Stitch each face corner. `he_cur` targets the corner vertex,
        // `he_next` leaves it; four structural cases depending on which of
        // the two was already linked into a boundary loop.
        let n = hes.len();
        for i in 0..n {
            let he_cur = hes[i];
            let he_next = hes[(i + 1) % n];
            let v = self.target(he_cur);

            if self.is_isolated(v) {
                self.he_mut(he_cur).next = he_next;
                let temp = he_next.opposite();
                self.he_mut(temp).next = he_cur.opposite();
                self.vertices[v.index()].incoming = temp;
                continue;
            }

            if self.next(he_cur) == he_next {
                // Corner already linked correctly; the corner vertex may
                // have lost its boundary status though.
                if self.incoming(v) == he_cur {
                    self.adjust_incoming(v);
                }
                continue;
            }

            let cur_linked = self.next(he_cur).is_valid();
            let next_linked = self.next(he_next.opposite()).is_valid();

            if cur_linked {
                if next_linked {
                    // Both half-edges pre-existed in different boundary
                    // loops around `v`: walk the star to find the boundary
                    // gap and splice it between the displaced neighbors.
                    let a = self.next(he_cur);
                    let b = self.prev_around_origin(he_next);
                    let mut he_gap = he_next.opposite();
                    while !self.is_boundary_halfedge(he_gap) {
                        he_gap = self.next_incoming(he_gap);
                    }
                    let gap_next = self.next(he_gap);
                    self.he_mut(b).next = gap_next;
                    self.he_mut(he_gap).next = a;
                    self.he_mut(he_cur).next = he_next;
                    self.adjust_incoming(v);
                } else {
                    let temp = he_next.opposite();
                    let after = self.next(he_cur);
                    self.he_mut(temp).next = after;
                    self.he_mut(he_cur).next = he_next;
                    self.vertices[v.index()].incoming = temp;
                }
            } else if next_linked {
                let b = self.prev_around_origin(he_next);
                self.he_mut(b).next = he_cur.opposite();
                self.he_mut(he_cur).next = he_next;
                self.adjust_incoming(v);
            } else {
                // Both new: hook them into the boundary gap at `v`, which
                // the adjustment invariant guarantees `incoming(v)` marks.
                let he_gap = self.incoming(v);
                debug_assert!(self.is_boundary_halfedge(he_gap));
                let gap_next = self.next(he_gap);
                self.he_mut(he_next.opposite()).next = gap_next;
                self.he_mut(he_gap).next = he_cur.opposite();
                self.he_mut(he_cur).next = he_next;
                self.adjust_incoming(v);
            }
        }

        Ok(f)
    }

    /// Re-point `incoming(v)` at a boundary half-edge if the vertex has
    /// one. Keeps the boundary adjustment invariant after stitching.
    pub(crate) fn adjust_incoming(&mut self, v: VertexHandle) {
        if self.is_boundary_halfedge(self.incoming(v)) {
            return;
        }
        let mut found = HalfEdgeHandle::invalid();
        for he in self.incoming_halfedges(v) {
            if self.is_boundary_halfedge(he) {
                found = he;
                break;
            }
        }
        if found.is_valid() {
            self.vertices[v.index()].incoming = found;
        }
    }

    /// Insert an edge from `target(he_prev)` to `origin(he_next)`, splitting
    /// the face both half-edges bound into two. Returns the half-edge of
    /// the new edge lying in the newly created face; its opposite stays in
    /// the old face.
    ///
    /// This is the primitive underlying triangulation, face splitting, and
    /// subdivision.
    ///
    /// # Errors
    ///
    /// [`MeshError::FacesDiffer`] if the half-edges are invalid, boundary,
    /// or bound different faces.
    pub fn insert_edge(
        &mut self,
        he_prev: HalfEdgeHandle,
        he_next: HalfEdgeHandle,
    ) -> Result<HalfEdgeHandle> {
        if !he_prev.is_valid()
            || !he_next.is_valid()
            || !self.face(he_prev).is_valid()
            || self.face(he_prev) != self.face(he_next)
        {
            return Err(MeshError::FacesDiffer { he_prev, he_next });
        }

        let e = self.add_edge(self.target(he_prev), self.origin(he_next));
        let he = e.halfedge();
        let he_opp = he.opposite();
        let f_old = self.face(he_prev);
        let he_next_prev = self.prev(he_next);

        self.he_mut(he_opp).face = f_old;
        self.faces[f_old.index()].inner = he_opp;
        let after = self.next(he_prev);
        self.he_mut(he_opp).next = after;
        self.he_mut(he_prev).next = he;
        self.he_mut(he).next = he_next;
        self.he_mut(he_next_prev).next = he_opp;

        let f_new = self.create_face(he);
        self.he_mut(he).face = f_new;
        let mut he2 = self.next(he);
        while he2 != he {
            self.he_mut(he2).face = f_new;
            he2 = self.next(he2);
        }

        Ok(he)
    }

    /// Split a half-edge at an existing vertex `v`, preserving face
    /// membership on both sides. `he` ends at `v` afterwards; the returned
    /// half-edge belongs to the new edge and points to `v` from the old
    /// target's side.
    pub fn split_halfedge_at(&mut self, he: HalfEdgeHandle, v: VertexHandle) -> HalfEdgeHandle {
        let he_opp = he.opposite();
        let he_opp_prev = self.prev(he_opp);
        let v_old = self.target(he);

        let e = self.add_edge(v_old, v);
        let he_new = e.halfedge();
        let he_new_opp = he_new.opposite();

        if self.incoming(v_old) == he {
            self.vertices[v_old.index()].incoming = he_new_opp;
        }

        self.he_mut(he_opp_prev).next = he_new;
        let after = self.next(he);
        self.he_mut(he_new_opp).next = after;
        self.he_mut(he).next = he_new_opp;
        self.he_mut(he_new).next = he_opp;

        self.he_mut(he).target = v;
        let face_opp = self.face(he_opp);
        let face_he = self.face(he);
        self.he_mut(he_new).face = face_opp;
        self.he_mut(he_new_opp).face = face_he;
        if !face_opp.is_valid() {
            self.vertices[v.index()].incoming = he_new;
        } else {
            self.vertices[v.index()].incoming = he;
        }

        he_new
    }

    /// Split a half-edge at a new vertex placed at `position`.
    pub fn split_halfedge(&mut self, he: HalfEdgeHandle, position: Point3<S>) -> HalfEdgeHandle {
        let v = self.add_vertex(position);
        self.split_halfedge_at(he, v)
    }

    /// Split an edge at an existing vertex. Returns the new edge.
    pub fn split_edge_at(&mut self, e: EdgeHandle, v: VertexHandle) -> EdgeHandle {
        self.split_halfedge_at(e.halfedge(), v).edge()
    }

    /// Split an edge at a new vertex placed at `position`. Returns the new
    /// edge.
    pub fn split_edge(&mut self, e: EdgeHandle, position: Point3<S>) -> EdgeHandle {
        self.split_halfedge(e.halfedge(), position).edge()
    }

    /// Split every pre-existing edge at its midpoint. Returns the edges
    /// created by the splits.
    pub fn split_edges(&mut self) -> Vec<EdgeHandle> {
        let first_new = self.num_edges();
        for i in 0..first_new {
            let e = EdgeHandle::new(i);
            let mid = self.midpoint(e);
            self.split_edge(e, mid);
        }
        (first_new..self.num_edges()).map(EdgeHandle::new).collect()
    }

    /// Split a face into a fan around an existing vertex `v`: every face
    /// edge is midpoint-split, then spokes connect the midpoints to `v`,
    /// yielding one quad per original face edge.
    pub fn split_face_at(&mut self, f: FaceHandle, v: VertexHandle) {
        let hes_old: Vec<_> = self.inner_halfedges(f).collect();
        let mut spokes = Vec::with_capacity(hes_old.len());

        for &he in &hes_old {
            let mid = self.halfedge_midpoint(he);
            self.split_halfedge(he, mid);
            let e = self.add_edge(self.target(he), v);
            spokes.push(e);
            let after = self.next(he);
            self.he_mut(e.halfedge().opposite()).next = after;
            self.he_mut(he).next = e.halfedge();
        }

        let n = spokes.len();
        let mut face = f;
        for i in 0..n {
            let spoke = spokes[i].halfedge();
            let spoke_prev = spokes[(i + n - 1) % n].halfedge();
            if i == 0 {
                self.faces[face.index()].inner = spoke;
            } else {
                face = self.create_face(spoke);
            }
            self.he_mut(spoke).next = spoke_prev.opposite();
            let mut he2 = spoke;
            loop {
                self.he_mut(he2).face = face;
                he2 = self.next(he2);
                if he2 == spoke {
                    break;
                }
            }
        }
        self.vertices[v.index()].incoming = spokes[0].halfedge();
    }

    /// Split a face into a fan around a new vertex placed at `position`.
    /// Returns the new center vertex.
    pub fn split_face(&mut self, f: FaceHandle, position: Point3<S>) -> VertexHandle {
        let v = self.add_vertex(position);
        self.split_face_at(f, v);
        v
    }

    /// Whether an edge may be flipped: it must be interior, both incident
    /// faces must be triangles, and the flipped edge must not already
    /// exist.
    pub fn is_flippable(&self, e: EdgeHandle) -> bool {
        if self.is_boundary_edge(e) {
            return false;
        }
        let [he1, he2] = e.halfedge_pair();
        if !self.is_triangle(self.face(he1)) || !self.is_triangle(self.face(he2)) {
            return false;
        }
        let v1 = self.target(self.next(he1));
        let v2 = self.target(self.next(he2));
        !self.find_halfedge(v1, v2).is_valid()
    }

    /// Rotate an interior edge between two triangles so it connects the
    /// two opposite vertices instead.
    ///
    /// # Errors
    ///
    /// [`MeshError::EdgeNotFlippable`] if [`is_flippable`](Self::is_flippable)
    /// is false; the mesh is unchanged in that case.
    pub fn flip_edge(&mut self, e: EdgeHandle) -> Result<()> {
        if !self.is_flippable(e) {
            return Err(MeshError::EdgeNotFlippable { edge: e });
        }

        let [he1, he2] = e.halfedge_pair();
        let f1 = self.face(he1);
        let f2 = self.face(he2);
        let n1 = self.next(he1);
        let p1 = self.next(n1);
        let n2 = self.next(he2);
        let p2 = self.next(n2);
        let v1 = self.target(n1);
        let v2 = self.target(n2);
        let v3 = self.target(he1);
        let v4 = self.target(he2);

        self.he_mut(p1).next = n2;
        self.he_mut(p2).next = n1;
        self.he_mut(n2).next = he2;
        self.he_mut(n1).next = he1;
        self.he_mut(he1).next = p2;
        self.he_mut(he2).next = p1;

        self.he_mut(p2).face = f1;
        self.he_mut(p1).face = f2;
        if self.inner(f1) == p1 {
            self.faces[f1.index()].inner = he1;
        }
        if self.inner(f2) == p2 {
            self.faces[f2.index()].inner = he2;
        }
        self.he_mut(he1).target = v1;
        self.he_mut(he2).target = v2;
        if self.incoming(v3) == he1 {
            self.vertices[v3.index()].incoming = p2;
        }
        if self.incoming(v4) == he2 {
            self.vertices[v4.index()].incoming = p1;
        }

        Ok(())
    }

    /// Uniformly refine a triangle mesh: every edge is midpoint-split and
    /// every triangle replaced by four (one per corner plus the center).
    ///
    /// # Errors
    ///
    /// [`MeshError::NotNGonMesh`] if a face is not a triangle.
    pub fn subdivide_triangle_split(&mut self) -> Result<()> {
        if !self.is_triangle_mesh() {
            return Err(MeshError::NotNGonMesh { expected: 3 });
        }
        self.reserve_vertices(self.num_edges());
        self.reserve_faces(3 * self.num_faces());
        self.reserve_edges(self.num_edges() + 3 * self.num_faces());

        let num_vertices_old = self.num_vertices();
        self.split_edges();

        let num_faces_old = self.num_faces();
        for i in 0..num_faces_old {
            let f = FaceHandle::new(i);
            // Start at a midpoint vertex; the hexagon alternates old
            // corners and midpoints.
            let mut he_prev = self.inner(f);
            if self.target(he_prev).index() < num_vertices_old {
                he_prev = self.next(he_prev);
            }
            let mut he_next = self.next(self.next(self.next(he_prev)));
            self.insert_edge(he_prev, he_next)?;
            he_prev = self.next(he_prev);
            he_next = self.next(self.next(he_next));
            self.insert_edge(he_prev, he_next)?;
            he_prev = self.next(he_prev);
            he_next = self.next(self.next(he_next));
            self.insert_edge(he_prev, he_next)?;
        }
        Ok(())
    }

    /// Uniformly refine a quad mesh: every edge is midpoint-split, a center
    /// vertex is placed at each face centroid, and every quad replaced by
    /// four.
    ///
    /// # Errors
    ///
    /// [`MeshError::NotNGonMesh`] if a face is not a quad.
    pub fn subdivide_quad_split(&mut self) -> Result<()> {
        if !self.is_quad_mesh() {
            return Err(MeshError::NotNGonMesh { expected: 4 });
        }
        self.reserve_vertices(self.num_edges() + self.num_faces());
        self.reserve_faces(3 * self.num_faces());
        self.reserve_edges(self.num_edges() + 4 * self.num_faces());

        // Face centroids move once edges are split; capture them first.
        let centroids: Vec<Point3<S>> =
            self.faces().map(|f| self.face_centroid(f)).collect();

        let num_vertices_old = self.num_vertices();
        self.split_edges();

        let num_faces_old = self.num_faces();
        for i in 0..num_faces_old {
            let f = FaceHandle::new(i);
            let mut he_prev = self.inner(f);
            if self.target(he_prev).index() < num_vertices_old {
                he_prev = self.next(he_prev);
            }
            let he_next = self.next(self.next(self.next(he_prev)));
            // Cut off the first corner, then split the cut diagonal at the
            // centroid: the corner becomes a quad and the center vertex
            // appears on the remaining face's boundary.
            let diagonal = self.insert_edge(he_prev, he_next)?;
            self.split_halfedge(diagonal, centroids[i]);

            let he_prev = self.next(he_prev);
            let mut he_next = self.next(self.next(he_next));
            while he_next != he_prev {
                self.insert_edge(he_prev, he_next)?;
                he_next = self.next(self.next(he_next));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;

    fn tetrahedron() -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]);
        mesh.add_face(&[v[0], v[2], v[1]]).unwrap();
        mesh.add_face(&[v[0], v[3], v[2]]).unwrap();
        mesh.add_face(&[v[0], v[1], v[3]]).unwrap();
        mesh.add_face(&[v[1], v[2], v[3]]).unwrap();
        mesh
    }

    #[test]
    fn test_tetrahedron_is_consistent() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_closed());
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.check(false), 0);
        // Euler relation for a genus-0 closed mesh.
        assert_eq!(
            mesh.num_vertices() as isize - mesh.num_edges() as isize
                + mesh.num_faces() as isize,
            2
        );
    }

    #[test]
    fn test_add_face_fan_mixed_order() {
        // Five faces sharing vertex 0, inserted in an order that exercises
        // every stitching case around the shared vertex.
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(7);
        mesh.add_face(&[v[1], v[2], v[0]]).unwrap();
        mesh.add_face(&[v[6], v[0], v[5]]).unwrap();
        mesh.add_face(&[v[0], v[3], v[4]]).unwrap();
        mesh.add_face(&[v[5], v[0], v[4]]).unwrap();
        mesh.add_face(&[v[2], v[3], v[0]]).unwrap();
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_add_face_three_islands_then_bridges() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(9);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        mesh.add_face(&[v[3], v[4], v[5]]).unwrap();
        mesh.add_face(&[v[6], v[7], v[8]]).unwrap();
        mesh.add_face(&[v[0], v[3], v[6]]).unwrap();
        mesh.add_face(&[v[0], v[6], v[8]]).unwrap();
        mesh.add_face(&[v[2], v[4], v[3], v[0]]).unwrap();
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_add_face_shared_interior_edge() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(6);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        mesh.add_face(&[v[1], v[3], v[4]]).unwrap();
        mesh.add_face(&[v[2], v[4], v[5]]).unwrap();
        mesh.add_face(&[v[1], v[4], v[2]]).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_add_face_too_small() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(2);
        assert!(matches!(
            mesh.add_face(&[v[0], v[1]]),
            Err(MeshError::FaceTooSmall { count: 2 })
        ));
    }

    #[test]
    fn test_add_face_rejects_nonmanifold_edge() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(4);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let num_edges = mesh.num_edges();

        // Same winding over the shared edge (0, 1): its half-edge already
        // bounds a face.
        let err = mesh.add_face(&[v[0], v[1], v[3]]).unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldEdge { .. }));
        // Rollback: no new edges, mesh still consistent.
        assert_eq!(mesh.num_edges(), num_edges);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_add_face_rejects_complex_vertex() {
        let mut mesh = tetrahedron();
        // Every vertex of a closed mesh is interior.
        let extra = mesh.add_vertices(2);
        let v0 = VertexHandle::new(0);
        let err = mesh.add_face(&[v0, extra[0], extra[1]]).unwrap_err();
        assert!(matches!(err, MeshError::ComplexVertex { vertex } if vertex == v0));
        assert_eq!(mesh.check(true), 0);
    }

    #[test]
    fn test_insert_edge_splits_quad() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let f = mesh.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();

        // Diagonal from v1 to v3.
        let he_prev = mesh.find_halfedge(v[0], v[1]);
        let mut he_next = mesh.inner(f);
        while mesh.origin(he_next) != v[3] {
            he_next = mesh.next(he_next);
        }
        let he = mesh.insert_edge(he_prev, he_next).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.origin(he), v[1]);
        assert_eq!(mesh.target(he), v[3]);
        assert!(mesh.find_edge(v[1], v[3]).is_valid());
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_insert_edge_rejects_different_faces() {
        let mut mesh = tetrahedron();
        let he_a = mesh.inner(FaceHandle::new(0));
        let he_b = mesh.inner(FaceHandle::new(1));
        assert!(matches!(
            mesh.insert_edge(he_a, he_b),
            Err(MeshError::FacesDiffer { .. })
        ));
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_split_edge() {
        let mut mesh = tetrahedron();
        let e = EdgeHandle::new(0);
        let mid = mesh.midpoint(e);
        let e_new = mesh.split_edge(e, mid);

        assert!(e_new.is_valid());
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_edges(), 7);
        // Faces unchanged; the two incident triangles became quads.
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_quads(), 2);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_split_boundary_halfedge_keeps_adjustment() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ]);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let e = mesh.find_edge(v[0], v[1]);
        mesh.split_edge(e, Point3::new(0.5, 0.0, 0.0));

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.face_valence(FaceHandle::new(0)), 4);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_split_face() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let f = mesh.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();
        let centroid = mesh.face_centroid(f);
        let center = mesh.split_face(f, centroid);

        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_quad_mesh());
        assert_eq!(mesh.valence(center), 4);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_flip_edge() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        mesh.add_face(&[v[0], v[2], v[3]]).unwrap();

        let e = mesh.find_edge(v[0], v[2]);
        assert!(mesh.is_flippable(e));
        mesh.flip_edge(e).unwrap();

        assert!(mesh.find_edge(v[1], v[3]).is_valid());
        assert!(!mesh.find_edge(v[0], v[2]).is_valid());
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_flip_rejects_boundary_edge() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(3);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let e = mesh.find_edge(v[0], v[1]);
        assert!(!mesh.is_flippable(e));
        assert!(matches!(
            mesh.flip_edge(e),
            Err(MeshError::EdgeNotFlippable { .. })
        ));
    }

    #[test]
    fn test_flip_rejects_existing_edge() {
        // Two triangles of a tetrahedron share an edge whose flip target
        // edge already exists.
        let mut mesh = tetrahedron();
        for e in mesh.edges().collect::<Vec<_>>() {
            assert!(!mesh.is_flippable(e));
        }
    }

    #[test]
    fn test_subdivide_triangle_split_counts() {
        let mut mesh = tetrahedron();
        mesh.subdivide_triangle_split().unwrap();

        assert_eq!(mesh.num_faces(), 16);
        assert_eq!(mesh.num_vertices(), 4 + 6);
        assert!(mesh.is_triangle_mesh());
        assert!(mesh.is_closed());
        assert_eq!(mesh.check(false), 0);

        mesh.subdivide_triangle_split().unwrap();
        assert_eq!(mesh.num_faces(), 64);
        assert_eq!(mesh.check(false), 0);
    }

    #[test]
    fn test_subdivide_triangle_split_requires_triangles() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices(4);
        mesh.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();
        assert!(matches!(
            mesh.subdivide_triangle_split(),
            Err(MeshError::NotNGonMesh { expected: 3 })
        ));
    }

    #[test]
    fn test_subdivide_quad_split_counts() {
        let mut mesh = HalfEdgeMesh::<f64>::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();
        mesh.subdivide_quad_split().unwrap();

        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_quad_mesh());
        // 4 corners + 4 midpoints + 1 center.
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.check(false), 0);

        // The center vertex sits at the face centroid.
        let center = VertexHandle::new(8);
        assert_eq!(*mesh.position(center), Point3::new(0.5, 0.5, 0.0));
    }
}
