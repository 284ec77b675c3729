//! Face tessellation.
//!
//! Replaces polygonal faces by triangles without moving any vertex, built
//! entirely on [`HalfEdgeMesh::insert_edge`]. Two strategies:
//!
//! - [`triangulate_convex`]: O(n) fan triangulation, valid for convex
//!   faces only.
//! - [`triangulate_monotone`]: a plane sweep over the face projected onto
//!   the two axes orthogonal to its dominant normal component, valid for
//!   simple (possibly non-convex) polygons whose boundary splits into two
//!   chains monotone along the sweep axis. Faces with holes,
//!   self-intersections, or interior cusps needing a general monotone
//!   decomposition are outside its domain; behavior on such input is
//!   unspecified.
//!
//! # Example
//!
//! ```
//! use strix::algo::triangulate::triangulate_convex;
//! use strix::mesh::create_box;
//!
//! let mut mesh = create_box::<f64>().unwrap();
//! triangulate_convex(&mut mesh).unwrap();
//! assert!(mesh.is_triangle_mesh());
//! assert_eq!(mesh.num_faces(), 12);
//! ```

use nalgebra::{RealField, Vector3};

use crate::error::Result;
use crate::mesh::{default_crease_angle, FaceHandle, HalfEdgeHandle, HalfEdgeMesh, VertexHandle};

/// The indices of the two components of `n` with smallest magnitude,
/// ordered so that projecting onto them keeps a counter-clockwise
/// polygon (as seen along `n`) counter-clockwise in 2D. Dropping the
/// dominant normal direction this way lets all sign tests below work on
/// the projection unchanged.
fn min_abs_components<S: RealField + Copy>(n: &Vector3<S>) -> (usize, usize) {
    let (x, y, z) = (n.x.abs(), n.y.abs(), n.z.abs());
    if x >= y {
        if x >= z {
            if n.x >= S::zero() {
                (1, 2)
            } else {
                (2, 1)
            }
        } else if n.z >= S::zero() {
            (0, 1)
        } else {
            (1, 0)
        }
    } else if y >= z {
        if n.y >= S::zero() {
            (2, 0)
        } else {
            (0, 2)
        }
    } else if n.z >= S::zero() {
        (0, 1)
    } else {
        (1, 0)
    }
}

/// Tessellates one face of a mesh.
///
/// Construction projects the face onto the plane orthogonal to the
/// dominant component of its normal; all predicates below work on that 2D
/// projection.
pub struct FaceTessellator<'a, S: RealField + Copy> {
    mesh: &'a mut HalfEdgeMesh<S>,
    face: FaceHandle,
    u: usize,
    v: usize,
}

impl<'a, S: RealField + Copy> FaceTessellator<'a, S> {
    /// Prepare tessellation of `face`.
    pub fn new(mesh: &'a mut HalfEdgeMesh<S>, face: FaceHandle) -> Self {
        let nml = mesh.compute_face_normal(face);
        let (u, v) = min_abs_components(&nml);
        Self { mesh, face, u, v }
    }

    fn is_triangle(&self) -> bool {
        self.mesh.is_triangle(self.face)
    }

    /// Whether the projected face polygon is convex (signed-area test over
    /// every corner).
    pub fn is_convex(&self) -> bool {
        if self.is_triangle() {
            return true;
        }
        let mut z_min = S::zero();
        let mut z_max = S::zero();
        let mut first = true;
        for he in self.mesh.inner_halfedges(self.face) {
            let p = self.mesh.position(self.mesh.target(he));
            let p_next = self.mesh.position(self.mesh.target(self.mesh.next(he)));
            let p_prev = self.mesh.position(self.mesh.origin(he));
            let d1 = p_next - p;
            let d2 = p_prev - p;
            let z = d1[self.u] * d2[self.v] - d1[self.v] * d2[self.u];
            if first {
                z_min = z;
                z_max = z;
                first = false;
            } else {
                if z < z_min {
                    z_min = z;
                }
                if z > z_max {
                    z_max = z;
                }
            }
        }
        z_min >= S::zero() && z_max >= S::zero()
    }

    /// Lexicographic sweep order on projected positions: first axis `u`,
    /// then axis `v`.
    fn less_equal(&self, v_a: VertexHandle, v_b: VertexHandle) -> bool {
        let a = self.mesh.position(v_a);
        let b = self.mesh.position(v_b);
        a[self.u] < b[self.u] || (a[self.u] == b[self.u] && a[self.v] <= b[self.v])
    }

    /// Convexity test of the corner `a -> b -> c` relative to the sweep:
    /// positive for convex, negative for concave corners.
    fn edge_sign(&self, a: VertexHandle, b: VertexHandle, c: VertexHandle) -> S {
        let pos_a = self.mesh.position(a);
        let pos_b = self.mesh.position(b);
        let pos_c = self.mesh.position(c);

        let gap_l = pos_b[self.u] - pos_a[self.u];
        let gap_r = pos_c[self.u] - pos_b[self.u];

        if gap_l + gap_r > S::zero() {
            (pos_b[self.v] - pos_c[self.v]) * gap_l + (pos_b[self.v] - pos_a[self.v]) * gap_r
        } else {
            S::zero()
        }
    }

    fn edge_goes_left(&self, he: HalfEdgeHandle) -> bool {
        self.less_equal(self.mesh.target(he), self.mesh.origin(he))
    }

    fn edge_goes_right(&self, he: HalfEdgeHandle) -> bool {
        self.less_equal(self.mesh.origin(he), self.mesh.target(he))
    }

    fn next(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.mesh.next(he)
    }

    fn prev(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.mesh.prev(he)
    }

    fn target(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.mesh.target(he)
    }

    fn origin(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.mesh.origin(he)
    }

    fn insert_edge(
        &mut self,
        he_prev: HalfEdgeHandle,
        he_next: HalfEdgeHandle,
    ) -> Result<HalfEdgeHandle> {
        self.mesh.insert_edge(he_prev, he_next)
    }

    /// Fan-triangulate the face. Requires a convex face; a no-op for
    /// triangles.
    pub fn triangulate_convex(&mut self) -> Result<()> {
        debug_assert!(self.is_convex());
        if self.is_triangle() {
            return Ok(());
        }

        let he_prev = self.mesh.inner(self.face);
        let mut he_next = self.next(self.next(self.next(he_prev)));
        while he_next != he_prev {
            self.insert_edge(he_prev, he_next)?;
            he_next = self.next(he_next);
        }
        Ok(())
    }

    /// Sweep-triangulate the face: locate the lexicographically extreme
    /// half-edges of the boundary, then advance whichever chain (upper or
    /// lower) lags behind, inserting a diagonal whenever the corner it
    /// closes is convex under [`edge_sign`](Self::edge_sign), and finally
    /// zip the remaining gap between the chains. A no-op for triangles.
    pub fn triangulate_monotone(&mut self) -> Result<()> {
        if self.is_triangle() {
            return Ok(());
        }

        let mut up = self.mesh.inner(self.face);
        while self.less_equal(self.target(up), self.origin(up)) {
            up = self.prev(up);
        }
        while self.less_equal(self.origin(up), self.target(up)) {
            up = self.next(up);
        }
        let mut lo = self.prev(up);

        while self.next(up) != lo {
            if self.less_equal(self.target(up), self.origin(lo)) {
                while self.next(lo) != up
                    && (self.edge_goes_left(self.next(lo))
                        || self.edge_sign(
                            self.origin(lo),
                            self.target(lo),
                            self.target(self.next(lo)),
                        ) <= S::zero())
                {
                    let next_lo = self.next(lo);
                    lo = self.insert_edge(next_lo, lo)?.opposite();
                }
                lo = self.prev(lo);
            } else {
                while self.next(lo) != up
                    && (self.edge_goes_right(self.prev(up))
                        || self.edge_sign(
                            self.target(up),
                            self.origin(up),
                            self.origin(self.prev(up)),
                        ) >= S::zero())
                {
                    let prev_up = self.prev(up);
                    up = self.insert_edge(up, prev_up)?.opposite();
                }
                up = self.next(up);
            }
        }

        while self.next(self.next(lo)) != up {
            let next_lo = self.next(lo);
            lo = self.insert_edge(next_lo, lo)?.opposite();
        }
        Ok(())
    }
}

/// Tessellates every face of a mesh.
pub struct Tessellator<'a, S: RealField + Copy> {
    mesh: &'a mut HalfEdgeMesh<S>,
    update_normals: bool,
}

impl<'a, S: RealField + Copy> Tessellator<'a, S> {
    /// Create a tessellator that refreshes the stored normals afterwards.
    pub fn new(mesh: &'a mut HalfEdgeMesh<S>) -> Self {
        Self {
            mesh,
            update_normals: true,
        }
    }

    /// Leave the stored normal columns untouched.
    pub fn without_normal_update(mut self) -> Self {
        self.update_normals = false;
        self
    }

    /// Sweep-triangulate a single face.
    pub fn triangulate_monotone_face(&mut self, f: FaceHandle) -> Result<()> {
        FaceTessellator::new(self.mesh, f).triangulate_monotone()
    }

    /// Fan-triangulate a single convex face.
    pub fn triangulate_convex_face(&mut self, f: FaceHandle) -> Result<()> {
        FaceTessellator::new(self.mesh, f).triangulate_convex()
    }

    /// Sweep-triangulate every face.
    pub fn triangulate_monotone(&mut self) -> Result<()> {
        for i in 0..self.mesh.num_faces() {
            self.triangulate_monotone_face(FaceHandle::new(i))?;
        }
        if self.update_normals {
            self.mesh.update_normals(default_crease_angle());
        }
        Ok(())
    }

    /// Fan-triangulate every (convex) face.
    pub fn triangulate_convex(&mut self) -> Result<()> {
        for i in 0..self.mesh.num_faces() {
            self.triangulate_convex_face(FaceHandle::new(i))?;
        }
        if self.update_normals {
            self.mesh.update_normals(default_crease_angle());
        }
        Ok(())
    }
}

/// Sweep-triangulate every face of the mesh and refresh its normals.
pub fn triangulate_monotone<S: RealField + Copy>(mesh: &mut HalfEdgeMesh<S>) -> Result<()> {
    Tessellator::new(mesh).triangulate_monotone()
}

/// Fan-triangulate every (convex) face of the mesh and refresh its
/// normals.
pub fn triangulate_convex<S: RealField + Copy>(mesh: &mut HalfEdgeMesh<S>) -> Result<()> {
    Tessellator::new(mesh).triangulate_convex()
}
