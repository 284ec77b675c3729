//! Geometric queries on top of the topology.
//!
//! Everything here is read-only with respect to connectivity; the only
//! mutations are writes into the stored normal columns
//! ([`update_normals`](HalfEdgeMesh::update_normals)) and the whole-mesh
//! [`transform`](HalfEdgeMesh::transform).

use nalgebra::{Matrix4, Point3, RealField, Vector3};

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeHandle, FaceHandle, HalfEdgeHandle, VertexHandle};

/// The default crease threshold for [`HalfEdgeMesh::is_sharp`] and
/// [`HalfEdgeMesh::update_normals`]: 44 degrees, in radians.
pub fn default_crease_angle<S: RealField + Copy>() -> S {
    nalgebra::convert(44.0_f64.to_radians())
}

fn normalized_or_zero<S: RealField + Copy>(v: Vector3<S>) -> Vector3<S> {
    let n = v.norm();
    if n == S::zero() {
        Vector3::zeros()
    } else {
        v / n
    }
}

impl<S: RealField + Copy> HalfEdgeMesh<S> {
    /// Vector from the origin to the target of a half-edge.
    pub fn direction(&self, he: HalfEdgeHandle) -> Vector3<S> {
        self.position(self.target(he)) - self.position(self.origin(he))
    }

    /// Length of a half-edge.
    pub fn length(&self, he: HalfEdgeHandle) -> S {
        self.direction(he).norm()
    }

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeHandle) -> S {
        self.length(e.halfedge())
    }

    /// Midpoint of a half-edge's endpoints.
    pub fn halfedge_midpoint(&self, he: HalfEdgeHandle) -> Point3<S> {
        nalgebra::center(
            self.position(self.origin(he)),
            self.position(self.target(he)),
        )
    }

    /// Midpoint of an edge's endpoints.
    pub fn midpoint(&self, e: EdgeHandle) -> Point3<S> {
        self.halfedge_midpoint(e.halfedge())
    }

    /// Centroid of a face's vertices.
    pub fn face_centroid(&self, f: FaceHandle) -> Point3<S> {
        let mut sum = Vector3::zeros();
        let mut n = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            n += 1;
        }
        Point3::from(sum / nalgebra::convert::<f64, S>(n as f64))
    }

    /// Normal of the triangular wedge at the corner of `he`'s loop:
    /// the cross product of the two edge directions meeting at
    /// `target(he)`.
    pub fn compute_sector_normal(&self, he: HalfEdgeHandle, normalize: bool) -> Vector3<S> {
        let nml = self.direction(self.next(he)).cross(&self.direction(he.opposite()));
        if normalize {
            normalized_or_zero(nml)
        } else {
            nml
        }
    }

    /// Sum of the sector normals around the loop of `he`. For a planar
    /// face loop this points along the face normal.
    pub fn compute_loop_normal(&self, he: HalfEdgeHandle, normalize: bool) -> Vector3<S> {
        let mut nml = Vector3::zeros();
        for he in self.halfedge_loop(he) {
            nml += self.compute_sector_normal(he, false);
        }
        if normalize {
            normalized_or_zero(nml)
        } else {
            nml
        }
    }

    /// Newly computed (not stored) normal of a face.
    pub fn compute_face_normal(&self, f: FaceHandle) -> Vector3<S> {
        self.compute_loop_normal(self.inner(f), true)
    }

    /// Area-weighted smooth normal at a vertex: the normalized sum of the
    /// sector normals of all incident face corners.
    pub fn compute_vertex_normal(&self, v: VertexHandle) -> Vector3<S> {
        let mut nml = Vector3::zeros();
        for he in self.incoming_halfedges(v) {
            if !self.is_boundary_halfedge(he) {
                nml += self.compute_sector_normal(he, false);
            }
        }
        normalized_or_zero(nml)
    }

    /// Area of a (planar, simple) face: half the norm of the shoelace
    /// cross-product sum over its boundary.
    pub fn face_area(&self, f: FaceHandle) -> S {
        let mut sum = Vector3::zeros();
        for he in self.inner_halfedges(f) {
            let p = self.position(self.origin(he)).coords;
            let q = self.position(self.target(he)).coords;
            sum += p.cross(&q);
        }
        sum.norm() / nalgebra::convert::<f64, S>(2.0)
    }

    /// Total surface area over all faces.
    pub fn surface_area(&self) -> S {
        let mut sum = S::zero();
        for f in self.faces() {
            sum += self.face_area(f);
        }
        sum
    }

    /// Interior angle of the face corner at `target(he)`, in radians.
    /// Returns 0 for corners with a zero-length edge. For boundary
    /// half-edges the angle is signed by the hole's loop normal.
    pub fn sector_angle(&self, he: HalfEdgeHandle) -> S {
        let v0 = self.direction(self.next(he));
        let v1 = self.direction(he.opposite());
        let denom = v0.norm() * v1.norm();
        if denom == S::zero() {
            return S::zero();
        }
        let cos_a = nalgebra::clamp(v0.dot(&v1) / denom, -S::one(), S::one());
        if self.is_boundary_halfedge(he) {
            let f_n = self.compute_loop_normal(he.opposite(), true);
            let sign_a = v0.cross(&v1).dot(&f_n);
            if sign_a >= S::zero() {
                cos_a.acos()
            } else {
                -cos_a.acos()
            }
        } else {
            cos_a.acos()
        }
    }

    /// Signed angle between the sector normals of the two faces sharing an
    /// edge, in radians; the sign is resolved against the edge direction.
    /// Returns 0 for boundary edges and degenerate sectors.
    pub fn dihedral_angle(&self, e: EdgeHandle) -> S {
        if self.is_boundary_edge(e) {
            return S::zero();
        }
        let he = e.halfedge();
        let n0 = self.compute_sector_normal(he, false);
        let n1 = self.compute_sector_normal(he.opposite(), false);
        let he_dir = self.direction(he);
        let denom = n0.norm() * n1.norm();
        if denom == S::zero() {
            return S::zero();
        }
        let da_cos = nalgebra::clamp(n0.dot(&n1) / denom, -S::one(), S::one());
        let da_sin_sign = n0.cross(&n1).dot(&he_dir);
        if da_sin_sign >= S::zero() {
            da_cos.acos()
        } else {
            -da_cos.acos()
        }
    }

    /// Whether the dihedral angle across an edge reaches `max_angle`
    /// (radians). Crease detection for
    /// [`update_normals`](Self::update_normals).
    pub fn is_sharp(&self, e: EdgeHandle, max_angle: S) -> bool {
        self.dihedral_angle(e).abs() >= max_angle
    }

    /// Recompute and store the normal of every face.
    pub fn update_face_normals(&mut self) {
        for i in 0..self.num_faces() {
            let f = FaceHandle::new(i);
            let nml = self.compute_face_normal(f);
            self.set_face_normal(f, nml);
        }
    }

    /// Recompute and store the normal of every half-edge: the flat loop
    /// normal where the half-edge's edge is sharp, the smooth vertex
    /// normal of its target elsewhere. This yields hard shading along
    /// creases and smooth shading everywhere else.
    pub fn update_halfedge_normals(&mut self, max_angle: S) {
        for i in 0..self.num_halfedges() {
            let he = HalfEdgeHandle::new(i);
            let nml = if self.is_sharp(he.edge(), max_angle) {
                self.compute_loop_normal(he, true)
            } else {
                self.compute_vertex_normal(self.target(he))
            };
            self.set_halfedge_normal(he, nml);
        }
    }

    /// Two-pass normal update: face normals first, then the split
    /// half-edge normals against the `max_angle` crease threshold
    /// (radians; see [`default_crease_angle`]).
    pub fn update_normals(&mut self, max_angle: S) {
        self.update_face_normals();
        self.update_halfedge_normals(max_angle);
    }

    /// Axis-aligned bounding box of all vertex positions, or `None` for a
    /// vertex-free mesh.
    pub fn bounds(&self) -> Option<(Point3<S>, Point3<S>)> {
        let positions = self.positions();
        let first = positions.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in positions {
            for i in 0..3 {
                if p[i] < min[i] {
                    min[i] = p[i];
                }
                if p[i] > max[i] {
                    max[i] = p[i];
                }
            }
        }
        Some((min, max))
    }

    /// Apply an affine transform to every vertex position, and its
    /// inverse-transpose to every stored normal (renormalized). Normals
    /// are left untouched if the matrix is singular.
    pub fn transform(&mut self, m: &Matrix4<S>) {
        for p in self.positions_mut() {
            *p = m.transform_point(p);
        }
        let Some(normal_m) = m.try_inverse().map(|inv| inv.transpose()) else {
            return;
        };
        for i in 0..self.num_faces() {
            let f = FaceHandle::new(i);
            let nml = normalized_or_zero(normal_m.transform_vector(self.face_normal(f)));
            self.set_face_normal(f, nml);
        }
        for i in 0..self.num_halfedges() {
            let he = HalfEdgeHandle::new(i);
            let nml = normalized_or_zero(normal_m.transform_vector(self.halfedge_normal(he)));
            self.set_halfedge_normal(he, nml);
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Matrix4, Point3, Vector3};

    use super::*;

    const EPS: f64 = 1e-10;

    /// Two triangles sharing the edge (v0, v1); the second one is folded
    /// up by `fold` radians out of the z = 0 plane (0 = coplanar).
    fn folded_pair(fold: f64) -> (HalfEdgeMesh, EdgeHandle) {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -(fold.cos()), fold.sin()),
        ]);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        mesh.add_face(&[v[1], v[0], v[3]]).unwrap();
        let e = mesh.find_edge(v[0], v[1]);
        (mesh, e)
    }

    #[test]
    fn test_direction_and_length() {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            Point3::new(0.0, 8.0, 0.0),
        ]);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();

        let he = mesh.find_halfedge(v[0], v[1]);
        assert_eq!(mesh.direction(he), Vector3::new(3.0, 4.0, 0.0));
        assert!((mesh.length(he) - 5.0).abs() < EPS);
        assert!((mesh.edge_length(he.edge()) - 5.0).abs() < EPS);
        assert_eq!(mesh.halfedge_midpoint(he), Point3::new(1.5, 2.0, 0.0));
    }

    #[test]
    fn test_face_centroid_and_area() {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let f = mesh.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();

        assert_eq!(mesh.face_centroid(f), Point3::new(0.5, 0.5, 0.0));
        assert!((mesh.face_area(f) - 1.0).abs() < EPS);
        assert!((mesh.surface_area() - 1.0).abs() < EPS);

        let nml = mesh.compute_face_normal(f);
        assert!((nml - Vector3::new(0.0, 0.0, 1.0)).norm() < EPS);
    }

    #[test]
    fn test_sector_angle_right_corner() {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.add_face(&[v[0], v[1], v[2], v[3]]).unwrap();

        // Interior angle at every quad corner is 90 degrees.
        let he = mesh.find_halfedge(v[0], v[1]);
        assert!((mesh.sector_angle(he) - std::f64::consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_sector_angle_degenerate_edge() {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertices_from(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let he = mesh.find_halfedge(v[0], v[1]);
        assert_eq!(mesh.sector_angle(he), 0.0);
    }

    #[test]
    fn test_dihedral_angle_flat_and_folded() {
        let (mesh, e) = folded_pair(0.0);
        // Coplanar triangles: no crease.
        assert!(mesh.dihedral_angle(e).abs() < 1e-7);

        let (mesh, e) = folded_pair(std::f64::consts::FRAC_PI_2);
        assert!((mesh.dihedral_angle(e).abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-7);
    }

    #[test]
    fn test_dihedral_angle_boundary_edge_is_zero() {
        let (mesh, _) = folded_pair(std::f64::consts::FRAC_PI_2);
        for e in mesh.edges() {
            if mesh.is_boundary_edge(e) {
                assert_eq!(mesh.dihedral_angle(e), 0.0);
            }
        }
    }

    #[test]
    fn test_is_sharp_threshold() {
        let (mesh, e) = folded_pair(std::f64::consts::FRAC_PI_2);
        assert!(mesh.is_sharp(e, default_crease_angle()));
        assert!(!mesh.is_sharp(e, std::f64::consts::PI * 0.9));

        let (mesh, e) = folded_pair(0.0);
        assert!(!mesh.is_sharp(e, default_crease_angle()));
    }

    #[test]
    fn test_update_normals_smooth_when_flat() {
        let (mut mesh, e) = folded_pair(0.0);
        mesh.update_normals(default_crease_angle());

        // Both faces lie in z = 0; all normals agree.
        let he = e.halfedge();
        let expected = *mesh.face_normal(mesh.face(he));
        for i in 0..mesh.num_halfedges() {
            let he = HalfEdgeHandle::new(i);
            if !mesh.is_boundary_halfedge(he) {
                assert!((mesh.halfedge_normal(he) - expected).norm() < 1e-7);
            }
        }
    }

    #[test]
    fn test_update_normals_split_at_crease() {
        let (mut mesh, e) = folded_pair(std::f64::consts::FRAC_PI_2);
        mesh.update_normals(default_crease_angle());

        // Across the sharp edge each side keeps its own face normal.
        let [h0, h1] = e.halfedge_pair();
        let n0 = *mesh.halfedge_normal(h0);
        let n1 = *mesh.halfedge_normal(h1);
        assert!((n0 - mesh.face_normal(mesh.face(h0))).norm() < 1e-7);
        assert!((n1 - mesh.face_normal(mesh.face(h1))).norm() < 1e-7);
        assert!((n0 - n1).norm() > 0.5);
    }

    #[test]
    fn test_vertex_normal_of_corner() {
        let (mesh, e) = folded_pair(0.0);
        let v = mesh.target(e.halfedge());
        let nml = mesh.compute_vertex_normal(v);
        assert!((nml.norm() - 1.0).abs() < EPS);
        assert!(nml.z.abs() > 0.99);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = HalfEdgeMesh::new();
        assert!(mesh.bounds().is_none());

        mesh.add_vertices_from(&[
            Point3::new(-1.0, 2.0, 0.5),
            Point3::new(3.0, -4.0, 0.0),
            Point3::new(0.0, 0.0, 7.0),
        ]);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(-1.0, -4.0, 0.0));
        assert_eq!(max, Point3::new(3.0, 2.0, 7.0));
    }

    #[test]
    fn test_transform_translation() {
        let (mut mesh, e) = folded_pair(0.0);
        mesh.update_normals(default_crease_angle());
        let he = e.halfedge();
        let normal_before = *mesh.face_normal(mesh.face(he));

        let m = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));
        let p_before = *mesh.position(mesh.target(he));
        mesh.transform(&m);

        assert_eq!(
            *mesh.position(mesh.target(he)),
            p_before + Vector3::new(1.0, 2.0, 3.0)
        );
        // Translation leaves normals untouched.
        assert!((mesh.face_normal(mesh.face(he)) - normal_before).norm() < EPS);
    }
}
