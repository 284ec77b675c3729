//! Primitive mesh constructors.
//!
//! All constructors return meshes with counter-clockwise (outward-facing)
//! winding and consistent topology; closed primitives satisfy
//! `check() == 0` and `is_closed()`.
//!
//! ```
//! use strix::mesh::create_box;
//!
//! let b = create_box::<f64>().unwrap();
//! assert_eq!(b.num_faces(), 6);
//! assert!(b.is_closed());
//! ```

use nalgebra::{Point3, RealField, Vector2, Vector3};

use crate::error::{MeshError, Result};

use super::geometry::default_crease_angle;
use super::halfedge::HalfEdgeMesh;

fn s<S: RealField + Copy>(x: f64) -> S {
    nalgebra::convert(x)
}

/// A single triangle in the z = 0 plane.
pub fn create_triangle<S: RealField + Copy>() -> Result<HalfEdgeMesh<S>> {
    let mut m = HalfEdgeMesh::new();
    let v = m.add_vertices_from(&[
        Point3::new(S::zero(), S::zero(), S::zero()),
        Point3::new(S::one(), S::zero(), S::zero()),
        Point3::new(s(0.5), S::one(), S::zero()),
    ]);
    m.add_face(&[v[0], v[1], v[2]])?;
    Ok(m)
}

/// A unit quad centered at the origin in the z = 0 plane.
pub fn create_quad<S: RealField + Copy>() -> Result<HalfEdgeMesh<S>> {
    let mut m = HalfEdgeMesh::new();
    let v = m.add_vertices_from(&[
        Point3::new(s(-0.5), s(-0.5), S::zero()),
        Point3::new(s(0.5), s(-0.5), S::zero()),
        Point3::new(s(0.5), s(0.5), S::zero()),
        Point3::new(s(-0.5), s(0.5), S::zero()),
    ]);
    m.add_face(&[v[0], v[1], v[2], v[3]])?;
    Ok(m)
}

/// The unit box `[0, 1]^3` as six quads, with a cross-shaped texture atlas
/// and hard (per-face) shading normals.
pub fn create_box<S: RealField + Copy>() -> Result<HalfEdgeMesh<S>> {
    let mut m = HalfEdgeMesh::new();
    let v = m.add_vertices_from(&[
        Point3::new(S::zero(), S::zero(), S::zero()),
        Point3::new(S::one(), S::zero(), S::zero()),
        Point3::new(S::zero(), S::one(), S::zero()),
        Point3::new(S::one(), S::one(), S::zero()),
        Point3::new(S::zero(), S::zero(), S::one()),
        Point3::new(S::one(), S::zero(), S::one()),
        Point3::new(S::zero(), S::one(), S::one()),
        Point3::new(S::one(), S::one(), S::one()),
    ]);

    let uv = |x: f64, y: f64| Vector2::new(s::<S>(x), s::<S>(y));

    let right = m.add_face(&[v[1], v[3], v[7], v[5]])?;
    m.set_face_texcoords(
        right,
        &[uv(0.5, 0.25), uv(0.5, 0.5), uv(0.75, 0.5), uv(0.75, 0.25)],
    );

    let left = m.add_face(&[v[0], v[4], v[6], v[2]])?;
    m.set_face_texcoords(
        left,
        &[uv(0.0, 0.5), uv(0.25, 0.5), uv(0.25, 0.25), uv(0.0, 0.25)],
    );

    let top = m.add_face(&[v[2], v[6], v[7], v[3]])?;
    m.set_face_texcoords(
        top,
        &[uv(0.25, 0.0), uv(0.25, 0.25), uv(0.5, 0.25), uv(0.5, 0.0)],
    );

    let bottom = m.add_face(&[v[0], v[1], v[5], v[4]])?;
    m.set_face_texcoords(
        bottom,
        &[uv(0.25, 0.75), uv(0.5, 0.75), uv(0.5, 0.5), uv(0.25, 0.5)],
    );

    let front = m.add_face(&[v[4], v[5], v[7], v[6]])?;
    m.set_face_texcoords(
        front,
        &[uv(0.25, 0.5), uv(0.5, 0.5), uv(0.5, 0.25), uv(0.25, 0.25)],
    );

    let back = m.add_face(&[v[0], v[2], v[3], v[1]])?;
    m.set_face_texcoords(
        back,
        &[uv(1.0, 0.5), uv(1.0, 0.25), uv(0.75, 0.25), uv(0.75, 0.5)],
    );

    // Zero crease threshold: every edge is a hard edge.
    m.update_normals(S::zero());
    Ok(m)
}

/// A tetrahedron spanning the origin and the three unit axis points.
pub fn create_tetrahedron<S: RealField + Copy>() -> Result<HalfEdgeMesh<S>> {
    let mut m = HalfEdgeMesh::new();
    let v = m.add_vertices_from(&[
        Point3::new(S::zero(), S::zero(), S::zero()),
        Point3::new(S::one(), S::zero(), S::zero()),
        Point3::new(S::zero(), S::one(), S::zero()),
        Point3::new(S::zero(), S::zero(), S::one()),
    ]);
    m.add_face(&[v[0], v[2], v[1]])?;
    m.add_face(&[v[0], v[3], v[2]])?;
    m.add_face(&[v[0], v[1], v[3]])?;
    m.add_face(&[v[1], v[2], v[3]])?;
    m.update_normals(default_crease_angle());
    Ok(m)
}

/// An icosahedron inscribed in the sphere of the given radius, with hard
/// shading normals.
pub fn create_icosahedron<S: RealField + Copy>(radius: S) -> Result<HalfEdgeMesh<S>> {
    let mut m = HalfEdgeMesh::new();

    let a = radius * s::<S>(4.0) / (s::<S>(10.0) + s::<S>(2.0) * s::<S>(5.0).sqrt()).sqrt();
    let h = (s::<S>(2.0) * (a / (s::<S>(2.0) * radius)).asin()).cos() * radius;
    let r2 = (radius * radius - h * h).sqrt();

    let mut points = Vec::with_capacity(12);
    points.push(Point3::new(S::zero(), radius, S::zero()));
    for i in 0..5 {
        let angle = s::<S>(i as f64 * 72.0_f64.to_radians());
        points.push(Point3::new(angle.cos() * r2, h, -angle.sin() * r2));
    }
    for i in 0..5 {
        let angle = s::<S>(36.0_f64.to_radians() + i as f64 * 72.0_f64.to_radians());
        points.push(Point3::new(angle.cos() * r2, -h, -angle.sin() * r2));
    }
    points.push(Point3::new(S::zero(), -radius, S::zero()));

    let v = m.add_vertices_from(&points);
    for i in 0..5 {
        m.add_face(&[v[0], v[i + 1], v[(i + 1) % 5 + 1]])?;
        m.add_face(&[v[11], v[(i + 1) % 5 + 6], v[i + 6]])?;
        m.add_face(&[v[i + 1], v[i + 6], v[(i + 1) % 5 + 1]])?;
        m.add_face(&[v[(i + 1) % 5 + 1], v[i + 6], v[(i + 1) % 5 + 6]])?;
    }
    m.update_normals(S::zero());
    Ok(m)
}

/// An octahedron inscribed in the sphere of the given radius.
pub fn create_octahedron<S: RealField + Copy>(radius: S) -> Result<HalfEdgeMesh<S>> {
    let mut m = HalfEdgeMesh::new();

    let mut points = Vec::with_capacity(6);
    points.push(Point3::new(S::zero(), radius, S::zero()));
    for i in 0..4 {
        let angle = s::<S>(i as f64 * std::f64::consts::FRAC_PI_2);
        points.push(Point3::new(angle.cos() * radius, S::zero(), -angle.sin() * radius));
    }
    points.push(Point3::new(S::zero(), -radius, S::zero()));

    let v = m.add_vertices_from(&points);
    for i in 0..4 {
        m.add_face(&[v[0], v[i + 1], v[(i + 1) % 4 + 1]])?;
        m.add_face(&[v[5], v[(i + 1) % 4 + 1], v[i + 1]])?;
    }
    Ok(m)
}

/// A UV sphere: two triangle fans at the poles, quads elsewhere. Shading
/// normals point radially outward.
pub fn create_sphere<S: RealField + Copy>(
    radius: S,
    slices: usize,
    stacks: usize,
) -> Result<HalfEdgeMesh<S>> {
    if slices < 3 {
        return Err(MeshError::invalid_param("slices", slices, "must be at least 3"));
    }
    if stacks < 3 {
        return Err(MeshError::invalid_param("stacks", stacks, "must be at least 3"));
    }

    let mut m = HalfEdgeMesh::new();
    let mut positions = Vec::with_capacity(slices * (stacks - 1) + 2);
    positions.push(Point3::new(S::zero(), radius, S::zero()));
    for i in 1..stacks {
        let angle1 =
            S::frac_pi_2() - s::<S>(i as f64) * S::pi() / s::<S>(stacks as f64);
        let r = angle1.cos() * radius;
        let height = angle1.sin() * radius;
        for j in 0..slices {
            let angle2 = s::<S>(j as f64) * S::two_pi() / s::<S>(slices as f64);
            positions.push(Point3::new(angle2.cos() * r, height, angle2.sin() * r));
        }
    }
    positions.push(Point3::new(S::zero(), -radius, S::zero()));

    let v = m.add_vertices_from(&positions);
    for i in 0..slices {
        m.add_face(&[v[0], v[1 + (1 + i) % slices], v[1 + i % slices]])?;
        for j in 0..stacks - 2 {
            let a = 1 + j * slices + i % slices;
            let b = 1 + j * slices + (1 + i) % slices;
            let c = 1 + (j + 1) * slices + (1 + i) % slices;
            let d = 1 + (j + 1) * slices + i % slices;
            m.add_face(&[v[a], v[b], v[c], v[d]])?;
        }
        m.add_face(&[
            v[1 + slices * (stacks - 1)],
            v[1 + (stacks - 2) * slices + i % slices],
            v[1 + (stacks - 2) * slices + (1 + i) % slices],
        ])?;
    }

    for i in 0..m.num_vertices() {
        let vert = v[i];
        let nml = m.position(vert).coords;
        let nml = nml / nml.norm();
        let incident: Vec<_> = m.incoming_halfedges(vert).collect();
        for he in incident {
            m.set_halfedge_normal(he, nml);
        }
    }
    m.update_face_normals();
    Ok(m)
}

/// A capped cylinder of the given radius and height along the y axis.
pub fn create_cylinder<S: RealField + Copy>(
    radius: S,
    height: S,
    stacks: usize,
    slices: usize,
) -> Result<HalfEdgeMesh<S>> {
    if slices < 3 {
        return Err(MeshError::invalid_param("slices", slices, "must be at least 3"));
    }
    if stacks < 1 {
        return Err(MeshError::invalid_param("stacks", stacks, "must be at least 1"));
    }

    let mut m = HalfEdgeMesh::new();
    let mut positions = Vec::with_capacity(2 + slices * (stacks + 1));
    positions.push(Point3::new(S::zero(), height, S::zero()));
    for i in 0..stacks + 1 {
        let h = s::<S>((stacks - i) as f64) * height / s::<S>(stacks as f64);
        for j in 0..slices {
            let angle = s::<S>(j as f64) * S::two_pi() / s::<S>(slices as f64);
            positions.push(Point3::new(angle.cos() * radius, h, angle.sin() * radius));
        }
    }
    positions.push(Point3::new(S::zero(), S::zero(), S::zero()));

    let v = m.add_vertices_from(&positions);
    for i in 0..slices {
        m.add_face(&[v[0], v[1 + (1 + i) % slices], v[1 + i % slices]])?;
        for j in 0..stacks {
            let a = 1 + j * slices + i % slices;
            let b = 1 + j * slices + (1 + i) % slices;
            let c = 1 + (j + 1) * slices + (1 + i) % slices;
            let d = 1 + (j + 1) * slices + i % slices;
            m.add_face(&[v[a], v[b], v[c], v[d]])?;
        }
        m.add_face(&[
            v[v.len() - 1],
            v[1 + stacks * slices + i % slices],
            v[1 + stacks * slices + (1 + i) % slices],
        ])?;
    }
    Ok(m)
}

/// A torus with pipe radius `r` and ring radius `big_r`, as a closed quad
/// mesh of `rings * nsides` faces.
pub fn create_torus<S: RealField + Copy>(
    r: S,
    big_r: S,
    nsides: usize,
    rings: usize,
) -> Result<HalfEdgeMesh<S>> {
    if nsides < 3 {
        return Err(MeshError::invalid_param("nsides", nsides, "must be at least 3"));
    }
    if rings < 3 {
        return Err(MeshError::invalid_param("rings", rings, "must be at least 3"));
    }

    let mut m = HalfEdgeMesh::new();
    let mut positions = Vec::with_capacity(rings * nsides);
    for i in 0..rings {
        let angle1 = s::<S>(i as f64) * S::two_pi() / s::<S>(rings as f64);
        let center = Vector3::new(angle1.cos() * big_r, S::zero(), angle1.sin() * big_r);
        let t1 = Vector3::new(angle1.cos(), S::zero(), angle1.sin());
        let t2 = Vector3::new(S::zero(), S::one(), S::zero());

        for j in 0..nsides {
            let angle2 = s::<S>(j as f64) * S::two_pi() / s::<S>(nsides as f64);
            positions.push(Point3::from(
                center + t1 * (angle2.sin() * r) + t2 * (angle2.cos() * r),
            ));
        }
    }

    let v = m.add_vertices_from(&positions);
    for i in 0..rings {
        for j in 0..nsides {
            let a = (i + 1) % rings * nsides + j;
            let b = (i + 1) % rings * nsides + (j + 1) % nsides;
            let c = i * nsides + (j + 1) % nsides;
            let d = i * nsides + j;
            m.add_face(&[v[a], v[b], v[c], v[d]])?;
        }
    }
    Ok(m)
}

/// A flat disk of triangles around a center vertex; an open mesh with one
/// boundary loop.
pub fn create_disk<S: RealField + Copy>(radius: S, slices: usize) -> Result<HalfEdgeMesh<S>> {
    if slices < 3 {
        return Err(MeshError::invalid_param("slices", slices, "must be at least 3"));
    }

    let mut m = HalfEdgeMesh::new();
    let mut positions = Vec::with_capacity(slices + 1);
    positions.push(Point3::new(S::zero(), S::zero(), S::zero()));
    for i in 0..slices {
        let angle = -s::<S>(i as f64) * S::two_pi() / s::<S>(slices as f64);
        positions.push(Point3::new(angle.cos() * radius, S::zero(), angle.sin() * radius));
    }

    let v = m.add_vertices_from(&positions);
    for i in 0..slices {
        m.add_face(&[v[0], v[1 + i % slices], v[1 + (1 + i) % slices]])?;
    }
    Ok(m)
}

/// A geodesic sphere: an icosahedron refined by `levels` rounds of
/// triangle splitting, with every new vertex re-projected onto the sphere.
/// Yields `20 * 4^levels` triangles.
pub fn create_geodesic_sphere<S: RealField + Copy>(
    radius: S,
    levels: usize,
) -> Result<HalfEdgeMesh<S>> {
    let mut m = create_icosahedron(radius)?;
    for _ in 0..levels {
        let n_old = m.num_vertices();
        m.subdivide_triangle_split()?;
        for p in &mut m.positions_mut()[n_old..] {
            let dir = p.coords / p.coords.norm();
            *p = Point3::from(dir * radius);
        }
    }
    m.update_normals(default_crease_angle());
    Ok(m)
}
