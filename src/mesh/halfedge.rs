//! Half-edge mesh data structure.
//!
//! This module provides a half-edge representation for polygon meshes
//! (triangles, quads, and general n-gons): storage, navigation,
//! predicates, circulators, and the `check` diagnostic. Editing
//! operations, geometric queries, and the tessellators in
//! [`crate::algo::triangulate`] build on it.
//!
//! # Structure
//!
//! - Each undirected edge owns exactly two **half-edges** pointing in
//!   opposite directions, stored pairwise: edge `k` owns half-edges `2k`
//!   and `2k + 1`, so the opposite of a half-edge is index arithmetic,
//!   never a stored pointer.
//! - Each half-edge knows its **target vertex**, its **next** half-edge
//!   (counter-clockwise around its face, or around the hole for boundary
//!   half-edges), and its **face**. There is no `prev` pointer; `prev` is
//!   a forward walk around the loop.
//! - Each vertex stores one **incoming** half-edge (targeting the vertex).
//!   For boundary vertices this is kept pointing at a boundary half-edge,
//!   so boundary walks start from a canonical half-edge.
//! - Each face stores one **inner** half-edge on its boundary loop.
//!
//! # Boundary handling
//!
//! Boundary half-edges have an invalid face handle. Only manifold meshes
//! (possibly with boundary) are representable: a vertex may have at most
//! one boundary fan, and face insertion refuses faces that would violate
//! this.

use std::fmt::{self, Debug};

use nalgebra::{Point3, RealField, Vector2, Vector3};

use super::index::{EdgeHandle, FaceHandle, HalfEdgeHandle, VertexHandle};
use super::property::{
    EdgeTag, FaceTag, HalfEdgeTag, PropertyHandle, PropertySet, PropertyValue, VertexTag,
};
use super::status::Status;

/// RGBA face color, 8 bits per channel.
pub type Rgba = [u8; 4];

#[derive(Debug, Clone, Default)]
pub(crate) struct VertexRecord {
    pub incoming: HalfEdgeHandle,
    pub status: Status,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct HalfEdgeRecord {
    pub target: VertexHandle,
    pub next: HalfEdgeHandle,
    pub face: FaceHandle,
    pub status: Status,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeRecord {
    pub halfedges: [HalfEdgeRecord; 2],
    pub status: Status,
}

impl EdgeRecord {
    pub(crate) fn new(from: VertexHandle, to: VertexHandle) -> Self {
        Self {
            halfedges: [
                HalfEdgeRecord {
                    target: to,
                    ..Default::default()
                },
                HalfEdgeRecord {
                    target: from,
                    ..Default::default()
                },
            ],
            status: Status::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FaceRecord {
    pub inner: HalfEdgeHandle,
    pub status: Status,
}

/// A half-edge mesh over scalar type `S`.
///
/// Entity records live in dense append-only arrays; attributes (the
/// mandatory vertex position and the optional face/half-edge normals,
/// face colors, and half-edge texture coordinates, plus any user-defined
/// columns) live in per-kind [`PropertySet`]s that are resized in lockstep
/// with the records. Cloning the mesh deep-clones every property column.
#[derive(Clone)]
pub struct HalfEdgeMesh<S: RealField + Copy = f64> {
    pub(crate) vertices: Vec<VertexRecord>,
    pub(crate) edges: Vec<EdgeRecord>,
    pub(crate) faces: Vec<FaceRecord>,

    pub(crate) vertex_props: PropertySet<VertexTag>,
    pub(crate) edge_props: PropertySet<EdgeTag>,
    pub(crate) halfedge_props: PropertySet<HalfEdgeTag>,
    pub(crate) face_props: PropertySet<FaceTag>,

    position: PropertyHandle<Point3<S>, VertexTag>,
    face_normal: PropertyHandle<Vector3<S>, FaceTag>,
    face_color: PropertyHandle<Rgba, FaceTag>,
    halfedge_normal: PropertyHandle<Vector3<S>, HalfEdgeTag>,
    halfedge_texcoord: PropertyHandle<Vector2<S>, HalfEdgeTag>,
}

impl<S: RealField + Copy> Default for HalfEdgeMesh<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RealField + Copy> Debug for HalfEdgeMesh<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalfEdgeMesh")
            .field("vertices", &self.num_vertices())
            .field("edges", &self.num_edges())
            .field("faces", &self.num_faces())
            .finish()
    }
}

impl<S: RealField + Copy> HalfEdgeMesh<S> {
    /// Create a new empty mesh with the built-in attribute columns
    /// (vertex position, face normal/color, half-edge normal/texcoord)
    /// registered.
    pub fn new() -> Self {
        let mut vertex_props = PropertySet::new();
        let edge_props = PropertySet::new();
        let mut halfedge_props = PropertySet::new();
        let mut face_props = PropertySet::new();

        let position = vertex_props.add("vertex_position", Point3::origin());
        let face_normal = face_props.add("face_normal", Vector3::zeros());
        let face_color = face_props.add("face_color", [0, 0, 0, 255]);
        let halfedge_normal = halfedge_props.add("halfedge_normal", Vector3::zeros());
        let halfedge_texcoord = halfedge_props.add("halfedge_texcoord", Vector2::zeros());

        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            vertex_props,
            edge_props,
            halfedge_props,
            face_props,
            position,
            face_normal,
            face_color,
            halfedge_normal,
            halfedge_texcoord,
        }
    }

    // ==================== Counts ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of half-edges (always twice the edge count).
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        2 * self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of faces with exactly `n` sides.
    pub fn num_n_gons(&self, n: usize) -> usize {
        self.faces().filter(|&f| self.is_n_gon(f, n)).count()
    }

    /// Number of triangular faces.
    pub fn num_triangles(&self) -> usize {
        self.num_n_gons(3)
    }

    /// Number of quadrilateral faces.
    pub fn num_quads(&self) -> usize {
        self.num_n_gons(4)
    }

    /// Whether the mesh holds no entities at all.
    pub fn empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    /// Drop all entities and attribute values. Registered property columns
    /// survive, but every outstanding entity handle is invalidated.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.vertex_props.clear();
        self.edge_props.clear();
        self.halfedge_props.clear();
        self.face_props.clear();
    }

    /// Reserve storage for `n` additional vertices.
    pub fn reserve_vertices(&mut self, n: usize) {
        self.vertices.reserve(n);
        self.vertex_props.reserve(n);
    }

    /// Reserve storage for `n` additional edges.
    pub fn reserve_edges(&mut self, n: usize) {
        self.edges.reserve(n);
        self.edge_props.reserve(n);
        self.halfedge_props.reserve(2 * n);
    }

    /// Reserve storage for `n` additional faces.
    pub fn reserve_faces(&mut self, n: usize) {
        self.faces.reserve(n);
        self.face_props.reserve(n);
    }

    // ==================== Record access (crate-internal) ====================

    #[inline]
    pub(crate) fn he(&self, he: HalfEdgeHandle) -> &HalfEdgeRecord {
        &self.edges[he.index() >> 1].halfedges[he.index() & 1]
    }

    #[inline]
    pub(crate) fn he_mut(&mut self, he: HalfEdgeHandle) -> &mut HalfEdgeRecord {
        &mut self.edges[he.index() >> 1].halfedges[he.index() & 1]
    }

    /// Append a new edge record between `from` and `to`; the two half-edge
    /// property slots and the edge property slot grow in lockstep. The new
    /// half-edges have invalid `next` and `face` and must be linked by the
    /// caller.
    pub(crate) fn add_edge(&mut self, from: VertexHandle, to: VertexHandle) -> EdgeHandle {
        let e = EdgeHandle::new(self.edges.len());
        self.edges.push(EdgeRecord::new(from, to));
        self.edge_props.add_elem();
        self.halfedge_props.add_elems(2);
        e
    }

    /// Truncate the edge arrays back to `n` edges (rollback of a failed
    /// `add_face`). Only valid while the removed edges are unreferenced.
    pub(crate) fn truncate_edges(&mut self, n: usize) {
        self.edges.truncate(n);
        self.edge_props.resize(n);
        self.halfedge_props.resize(2 * n);
    }

    /// Append a face record with `inner` as its loop representative.
    pub(crate) fn create_face(&mut self, inner: HalfEdgeHandle) -> FaceHandle {
        let f = FaceHandle::new(self.faces.len());
        self.faces.push(FaceRecord {
            inner,
            status: Status::new(),
        });
        self.face_props.add_elem();
        f
    }

    // ==================== Vertex construction ====================

    /// Add a vertex at the given position.
    pub fn add_vertex(&mut self, position: Point3<S>) -> VertexHandle {
        let v = VertexHandle::new(self.vertices.len());
        self.vertices.push(VertexRecord::default());
        let slot = self.vertex_props.add_elem();
        self.vertex_props.values_mut(self.position)[slot] = position;
        v
    }

    /// Add `n` vertices at the origin.
    pub fn add_vertices(&mut self, n: usize) -> Vec<VertexHandle> {
        let first = self.vertices.len();
        self.vertices.resize_with(first + n, VertexRecord::default);
        self.vertex_props.add_elems(n);
        (first..first + n).map(VertexHandle::new).collect()
    }

    /// Add one vertex per position.
    pub fn add_vertices_from(&mut self, positions: &[Point3<S>]) -> Vec<VertexHandle> {
        let handles = self.add_vertices(positions.len());
        let values = self.vertex_props.values_mut(self.position);
        for (v, &p) in handles.iter().zip(positions) {
            values[v.index()] = p;
        }
        handles
    }

    // ==================== Navigation ====================

    /// Target vertex of a half-edge.
    #[inline]
    pub fn target(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.he(he).target
    }

    /// Origin vertex of a half-edge (target of its opposite).
    #[inline]
    pub fn origin(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.he(he.opposite()).target
    }

    /// Next half-edge around the face (or hole) loop.
    #[inline]
    pub fn next(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.he(he).next
    }

    /// The oppositely directed half-edge of the same edge (index
    /// arithmetic, see [`HalfEdgeHandle::opposite`]).
    #[inline]
    pub fn opposite(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        he.opposite()
    }

    /// Face bounded by a half-edge; invalid for boundary half-edges.
    #[inline]
    pub fn face(&self, he: HalfEdgeHandle) -> FaceHandle {
        self.he(he).face
    }

    /// The edge owning a half-edge.
    #[inline]
    pub fn edge(&self, he: HalfEdgeHandle) -> EdgeHandle {
        he.edge()
    }

    /// The first half-edge of an edge.
    #[inline]
    pub fn halfedge(&self, e: EdgeHandle) -> HalfEdgeHandle {
        e.halfedge()
    }

    /// Both half-edges of an edge.
    #[inline]
    pub fn halfedge_pair(&self, e: EdgeHandle) -> [HalfEdgeHandle; 2] {
        e.halfedge_pair()
    }

    /// One half-edge on the inner loop of a face.
    #[inline]
    pub fn inner(&self, f: FaceHandle) -> HalfEdgeHandle {
        self.faces[f.index()].inner
    }

    /// The opposite of the face's inner half-edge.
    #[inline]
    pub fn outer(&self, f: FaceHandle) -> HalfEdgeHandle {
        self.inner(f).opposite()
    }

    /// The canonical incoming half-edge of a vertex; invalid for isolated
    /// vertices. If the vertex is on a boundary this is a boundary
    /// half-edge.
    #[inline]
    pub fn incoming(&self, v: VertexHandle) -> HalfEdgeHandle {
        self.vertices[v.index()].incoming
    }

    /// The canonical outgoing half-edge of a vertex; invalid for isolated
    /// vertices.
    #[inline]
    pub fn outgoing(&self, v: VertexHandle) -> HalfEdgeHandle {
        let incoming = self.incoming(v);
        if incoming.is_valid() {
            incoming.opposite()
        } else {
            HalfEdgeHandle::invalid()
        }
    }

    /// Next incoming half-edge counter-clockwise around the target vertex.
    #[inline]
    pub fn next_incoming(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.next(he).opposite()
    }

    /// Previous incoming half-edge around the target vertex.
    #[inline]
    pub fn prev_incoming(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.prev(he.opposite())
    }

    /// Next outgoing half-edge around the origin vertex.
    #[inline]
    pub fn next_outgoing(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.next(he.opposite())
    }

    /// Previous outgoing half-edge around the origin vertex.
    #[inline]
    pub fn prev_outgoing(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.prev(he).opposite()
    }

    /// Previous half-edge in the loop of `he`.
    ///
    /// No `prev` pointer is stored; this walks forward around the loop and
    /// costs O(loop length).
    pub fn prev(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        let mut prev = self.next(he);
        let mut next = self.next(prev);
        while next != he {
            prev = next;
            next = self.next(next);
        }
        prev
    }

    /// The half-edge whose `next` is `he`, found by circulating the star of
    /// `he`'s origin vertex instead of walking the loop. Costs O(valence of
    /// the origin) and, unlike [`prev`](Self::prev), works while a loop is
    /// only partially linked (face insertion).
    pub fn prev_around_origin(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        let mut prev = self.next(he.opposite()).opposite();
        let mut next = self.next(prev);
        while next != he {
            prev = next.opposite();
            next = self.next(prev);
        }
        prev
    }

    /// Find the half-edge from `from` to `to`, if the two vertices are
    /// connected.
    pub fn find_halfedge(&self, from: VertexHandle, to: VertexHandle) -> HalfEdgeHandle {
        for he in self.outgoing_halfedges(from) {
            if self.target(he) == to {
                return he;
            }
        }
        HalfEdgeHandle::invalid()
    }

    /// Find the edge connecting `from` and `to`.
    pub fn find_edge(&self, from: VertexHandle, to: VertexHandle) -> EdgeHandle {
        let he = self.find_halfedge(from, to);
        if he.is_valid() {
            he.edge()
        } else {
            EdgeHandle::invalid()
        }
    }

    // ==================== Predicates ====================

    /// Whether a half-edge bounds no face (mesh boundary).
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeHandle) -> bool {
        !self.face(he).is_valid()
    }

    /// Whether a vertex lies on the mesh boundary (or is isolated).
    ///
    /// Relies on the adjustment invariant: if any incident half-edge is a
    /// boundary half-edge, `incoming(v)` is one of them.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexHandle) -> bool {
        let he = self.incoming(v);
        !(he.is_valid() && self.face(he).is_valid())
    }

    /// Whether an edge has a boundary half-edge on either side.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeHandle) -> bool {
        let [h0, h1] = e.halfedge_pair();
        self.is_boundary_halfedge(h0) || self.is_boundary_halfedge(h1)
    }

    /// Whether any edge of the face lies on the mesh boundary.
    pub fn is_boundary_face(&self, f: FaceHandle) -> bool {
        self.inner_halfedges(f)
            .any(|he| self.is_boundary_halfedge(he.opposite()))
    }

    /// Whether a vertex has no incident half-edge.
    #[inline]
    pub fn is_isolated(&self, v: VertexHandle) -> bool {
        !self.incoming(v).is_valid()
    }

    /// Whether a vertex has more than one boundary fan. The data structure
    /// only represents manifold configurations; this reports a violated
    /// invariant, it does not repair it.
    pub fn is_non_manifold(&self, v: VertexHandle) -> bool {
        let mut n = 0;
        for he in self.incoming_halfedges(v) {
            if self.is_boundary_halfedge(he) {
                n += 1;
                if n > 1 {
                    return true;
                }
            }
        }
        false
    }

    /// Whether the face has exactly `n` sides.
    pub fn is_n_gon(&self, f: FaceHandle, n: usize) -> bool {
        self.face_valence(f) == n
    }

    /// Whether the face is a triangle.
    pub fn is_triangle(&self, f: FaceHandle) -> bool {
        let he = self.inner(f);
        he == self.next(self.next(self.next(he)))
    }

    /// Whether the face is a quad.
    pub fn is_quad(&self, f: FaceHandle) -> bool {
        let he = self.inner(f);
        he == self.next(self.next(self.next(self.next(he))))
    }

    /// Whether every face has exactly `n` sides.
    pub fn is_n_gon_mesh(&self, n: usize) -> bool {
        self.faces().all(|f| self.is_n_gon(f, n))
    }

    /// Whether every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.is_n_gon_mesh(3)
    }

    /// Whether every face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.is_n_gon_mesh(4)
    }

    /// Whether the mesh has no boundary half-edge.
    pub fn is_closed(&self) -> bool {
        self.halfedges().all(|he| !self.is_boundary_halfedge(he))
    }

    /// Whether the mesh has at least one boundary half-edge.
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// Number of incident edges of a vertex.
    pub fn valence(&self, v: VertexHandle) -> usize {
        self.incoming_halfedges(v).count()
    }

    /// Number of sides of a face.
    pub fn face_valence(&self, f: FaceHandle) -> usize {
        self.inner_halfedges(f).count()
    }

    /// Number of edge-connected face components.
    pub fn num_shells(&self) -> usize {
        let mut count = 0;
        let mut visited = vec![false; self.num_faces()];
        let mut stack = Vec::new();
        for f in self.faces() {
            if visited[f.index()] {
                continue;
            }
            count += 1;
            stack.push(f);
            while let Some(fc) = stack.pop() {
                visited[fc.index()] = true;
                for adj in self.adjacent_faces(fc) {
                    if !visited[adj.index()] {
                        stack.push(adj);
                    }
                }
            }
        }
        count
    }

    // ==================== Status ====================

    /// Status flags of a vertex.
    #[inline]
    pub fn vertex_status(&self, v: VertexHandle) -> Status {
        self.vertices[v.index()].status
    }

    /// Mutable status flags of a vertex.
    #[inline]
    pub fn vertex_status_mut(&mut self, v: VertexHandle) -> &mut Status {
        &mut self.vertices[v.index()].status
    }

    /// Status flags of an edge.
    #[inline]
    pub fn edge_status(&self, e: EdgeHandle) -> Status {
        self.edges[e.index()].status
    }

    /// Mutable status flags of an edge.
    #[inline]
    pub fn edge_status_mut(&mut self, e: EdgeHandle) -> &mut Status {
        &mut self.edges[e.index()].status
    }

    /// Status flags of a face.
    #[inline]
    pub fn face_status(&self, f: FaceHandle) -> Status {
        self.faces[f.index()].status
    }

    /// Mutable status flags of a face.
    #[inline]
    pub fn face_status_mut(&mut self, f: FaceHandle) -> &mut Status {
        &mut self.faces[f.index()].status
    }

    /// Mark every isolated, not-yet-removed vertex as removed.
    pub fn remove_isolated_vertices(&mut self) {
        for i in 0..self.vertices.len() {
            let v = VertexHandle::new(i);
            if self.is_isolated(v) && !self.vertex_status(v).is_removed() {
                self.vertex_status_mut(v).remove();
            }
        }
    }

    // ==================== Attributes ====================

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexHandle) -> &Point3<S> {
        &self.vertex_props.values(self.position)[v.index()]
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexHandle, p: Point3<S>) {
        self.vertex_props.values_mut(self.position)[v.index()] = p;
    }

    /// All vertex positions, indexed by vertex handle.
    #[inline]
    pub fn positions(&self) -> &[Point3<S>] {
        self.vertex_props.values(self.position)
    }

    /// All vertex positions, mutable.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [Point3<S>] {
        self.vertex_props.values_mut(self.position)
    }

    /// Stored normal of a face (see
    /// [`update_face_normals`](Self::update_face_normals)).
    #[inline]
    pub fn face_normal(&self, f: FaceHandle) -> &Vector3<S> {
        &self.face_props.values(self.face_normal)[f.index()]
    }

    /// Set the stored normal of a face.
    #[inline]
    pub fn set_face_normal(&mut self, f: FaceHandle, n: Vector3<S>) {
        self.face_props.values_mut(self.face_normal)[f.index()] = n;
    }

    /// Stored normal of a half-edge (see
    /// [`update_halfedge_normals`](Self::update_halfedge_normals)).
    #[inline]
    pub fn halfedge_normal(&self, he: HalfEdgeHandle) -> &Vector3<S> {
        &self.halfedge_props.values(self.halfedge_normal)[he.index()]
    }

    /// Set the stored normal of a half-edge.
    #[inline]
    pub fn set_halfedge_normal(&mut self, he: HalfEdgeHandle, n: Vector3<S>) {
        self.halfedge_props.values_mut(self.halfedge_normal)[he.index()] = n;
    }

    /// Texture coordinate of a half-edge.
    #[inline]
    pub fn texcoord(&self, he: HalfEdgeHandle) -> &Vector2<S> {
        &self.halfedge_props.values(self.halfedge_texcoord)[he.index()]
    }

    /// Set the texture coordinate of a half-edge.
    #[inline]
    pub fn set_texcoord(&mut self, he: HalfEdgeHandle, uv: Vector2<S>) {
        self.halfedge_props.values_mut(self.halfedge_texcoord)[he.index()] = uv;
    }

    /// Color of a face.
    #[inline]
    pub fn color(&self, f: FaceHandle) -> Rgba {
        self.face_props.values(self.face_color)[f.index()]
    }

    /// Set the color of a face.
    #[inline]
    pub fn set_color(&mut self, f: FaceHandle, color: Rgba) {
        self.face_props.values_mut(self.face_color)[f.index()] = color;
    }

    /// Set one texture coordinate per inner half-edge of `f`, in loop order
    /// starting at `inner(f)`.
    pub fn set_face_texcoords(&mut self, f: FaceHandle, uvs: &[Vector2<S>]) {
        let hes: Vec<_> = self.inner_halfedges(f).collect();
        for (he, &uv) in hes.into_iter().zip(uvs) {
            self.set_texcoord(he, uv);
        }
    }

    /// Assign one color to every face.
    pub fn colorize_faces(&mut self, color: Rgba) {
        for c in self.face_props.values_mut(self.face_color) {
            *c = color;
        }
    }

    // ==================== User properties ====================

    /// Register a vertex property column.
    pub fn add_vertex_property<T: PropertyValue>(
        &mut self,
        name: &str,
        default: T,
    ) -> PropertyHandle<T, VertexTag> {
        self.vertex_props.add(name, default)
    }

    /// Register an edge property column.
    pub fn add_edge_property<T: PropertyValue>(
        &mut self,
        name: &str,
        default: T,
    ) -> PropertyHandle<T, EdgeTag> {
        self.edge_props.add(name, default)
    }

    /// Register a half-edge property column.
    pub fn add_halfedge_property<T: PropertyValue>(
        &mut self,
        name: &str,
        default: T,
    ) -> PropertyHandle<T, HalfEdgeTag> {
        self.halfedge_props.add(name, default)
    }

    /// Register a face property column.
    pub fn add_face_property<T: PropertyValue>(
        &mut self,
        name: &str,
        default: T,
    ) -> PropertyHandle<T, FaceTag> {
        self.face_props.add(name, default)
    }

    /// Vertex property sets for typed access beyond the built-in columns.
    pub fn vertex_properties(&self) -> &PropertySet<VertexTag> {
        &self.vertex_props
    }

    /// Mutable vertex property set.
    pub fn vertex_properties_mut(&mut self) -> &mut PropertySet<VertexTag> {
        &mut self.vertex_props
    }

    /// Edge property set.
    pub fn edge_properties(&self) -> &PropertySet<EdgeTag> {
        &self.edge_props
    }

    /// Mutable edge property set.
    pub fn edge_properties_mut(&mut self) -> &mut PropertySet<EdgeTag> {
        &mut self.edge_props
    }

    /// Half-edge property set.
    pub fn halfedge_properties(&self) -> &PropertySet<HalfEdgeTag> {
        &self.halfedge_props
    }

    /// Mutable half-edge property set.
    pub fn halfedge_properties_mut(&mut self) -> &mut PropertySet<HalfEdgeTag> {
        &mut self.halfedge_props
    }

    /// Face property set.
    pub fn face_properties(&self) -> &PropertySet<FaceTag> {
        &self.face_props
    }

    /// Mutable face property set.
    pub fn face_properties_mut(&mut self) -> &mut PropertySet<FaceTag> {
        &mut self.face_props
    }

    // ==================== Iteration ====================

    /// All vertex handles.
    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle> {
        (0..self.vertices.len()).map(VertexHandle::new)
    }

    /// All edge handles.
    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> {
        (0..self.edges.len()).map(EdgeHandle::new)
    }

    /// All half-edge handles.
    pub fn halfedges(&self) -> impl Iterator<Item = HalfEdgeHandle> {
        (0..2 * self.edges.len()).map(HalfEdgeHandle::new)
    }

    /// All face handles.
    pub fn faces(&self) -> impl Iterator<Item = FaceHandle> {
        (0..self.faces.len()).map(FaceHandle::new)
    }

    /// The half-edges of the loop containing `he`, starting at `he`.
    pub fn halfedge_loop(&self, he: HalfEdgeHandle) -> LoopCirculator<'_, S> {
        LoopCirculator::new(self, he)
    }

    /// The inner half-edges of a face, starting at `inner(f)`.
    pub fn inner_halfedges(&self, f: FaceHandle) -> LoopCirculator<'_, S> {
        LoopCirculator::new(self, self.inner(f))
    }

    /// The opposites of the inner half-edges of a face.
    pub fn outer_halfedges(&self, f: FaceHandle) -> impl Iterator<Item = HalfEdgeHandle> + '_ {
        self.inner_halfedges(f).map(|he| he.opposite())
    }

    /// The incoming half-edges of a vertex, counter-clockwise.
    pub fn incoming_halfedges(&self, v: VertexHandle) -> StarCirculator<'_, S> {
        StarCirculator::new(self, self.incoming(v), StarDirection::Incoming)
    }

    /// The outgoing half-edges of a vertex, counter-clockwise.
    pub fn outgoing_halfedges(&self, v: VertexHandle) -> StarCirculator<'_, S> {
        StarCirculator::new(self, self.outgoing(v), StarDirection::Outgoing)
    }

    /// The vertices of a face in loop order, starting at the target of
    /// `inner(f)`.
    pub fn face_vertices(&self, f: FaceHandle) -> impl Iterator<Item = VertexHandle> + '_ {
        self.inner_halfedges(f).map(move |he| self.target(he))
    }

    /// The vertices of a face in loop order, starting at `v_start`.
    ///
    /// `v_start` must lie on the face.
    pub fn face_vertices_from(
        &self,
        f: FaceHandle,
        v_start: VertexHandle,
    ) -> impl Iterator<Item = VertexHandle> + '_ {
        let mut he = self.inner(f);
        while self.target(he) != v_start {
            he = self.next(he);
        }
        self.halfedge_loop(he).map(move |he| self.target(he))
    }

    /// The edges of a face in loop order.
    pub fn face_edges(&self, f: FaceHandle) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.inner_halfedges(f).map(|he| he.edge())
    }

    /// The one-ring neighbor vertices of a vertex.
    pub fn vertex_neighbors(&self, v: VertexHandle) -> impl Iterator<Item = VertexHandle> + '_ {
        self.incoming_halfedges(v).map(move |he| self.origin(he))
    }

    /// The faces incident to a vertex.
    pub fn vertex_faces(&self, v: VertexHandle) -> impl Iterator<Item = FaceHandle> + '_ {
        self.incoming_halfedges(v)
            .map(move |he| self.face(he))
            .filter(|f| f.is_valid())
    }

    /// The faces sharing an edge with `f`.
    pub fn adjacent_faces(&self, f: FaceHandle) -> impl Iterator<Item = FaceHandle> + '_ {
        self.inner_halfedges(f)
            .map(move |he| self.face(he.opposite()))
            .filter(|f| f.is_valid())
    }

    // ==================== Validation ====================

    /// Walk the whole mesh and report every violated invariant through the
    /// `log` side channel. Returns the number of errors plus warnings; a
    /// topologically consistent mesh yields `0`.
    ///
    /// Checked invariants: every half-edge has a valid target and `next`
    /// and agrees with its successor about the face; every non-isolated
    /// vertex has an incoming half-edge that targets it, whose incoming
    /// ring closes; boundary vertices are adjusted (their `incoming` is a
    /// boundary half-edge); face loops close and agree on the face handle;
    /// removed entities are not referenced. Isolated vertices are warnings
    /// unless `suppress_warnings` is set.
    pub fn check(&self, suppress_warnings: bool) -> usize {
        let mut errors = 0usize;
        let mut warnings = 0usize;
        // Any consistent cycle is shorter than the half-edge count.
        let cap = self.num_halfedges() + 1;

        for he in self.halfedges() {
            if !self.target(he).is_valid() {
                log::error!("target({:?}) is invalid", he);
                errors += 1;
            }
            if !self.next(he).is_valid() {
                log::error!("next({:?}) is invalid", he);
                errors += 1;
            } else if self.face(he) != self.face(self.next(he)) {
                log::error!(
                    "face mismatch along loop: face({:?}) = {:?}, face(next = {:?}) = {:?}",
                    he,
                    self.face(he),
                    self.next(he),
                    self.face(self.next(he))
                );
                errors += 1;
            }
        }

        for v in self.vertices() {
            if self.is_isolated(v) {
                if !suppress_warnings {
                    log::warn!("mesh contains isolated vertex {:?}", v);
                    warnings += 1;
                }
                continue;
            }
            let incoming = self.incoming(v);
            if self.edge_status(incoming.edge()).is_removed() {
                log::error!("incoming half-edge of {:?} lies on a removed edge", v);
                errors += 1;
            }
            if self.target(incoming) != v {
                log::error!(
                    "inconsistent vertex linkage: incoming({:?}) = {:?} targets {:?}",
                    v,
                    incoming,
                    self.target(incoming)
                );
                errors += 1;
                continue;
            }
            // Incoming ring must close back onto `incoming` and target `v`
            // throughout.
            let mut he = incoming;
            let mut steps = 0;
            let mut closed = false;
            while steps < cap {
                if self.target(he) != v {
                    log::error!(
                        "incoming ring of {:?} contains {:?} targeting {:?}",
                        v,
                        he,
                        self.target(he)
                    );
                    errors += 1;
                    break;
                }
                if !self.is_boundary_vertex(v) && self.is_boundary_halfedge(he) {
                    log::error!("vertex {:?} is not adjusted to boundary half-edge {:?}", v, he);
                    errors += 1;
                }
                if !self.next(he).is_valid() {
                    // Already reported in the half-edge pass.
                    break;
                }
                he = self.next_incoming(he);
                steps += 1;
                if he == incoming {
                    closed = true;
                    break;
                }
            }
            if !closed && steps >= cap {
                log::error!("incoming ring of {:?} does not close", v);
                errors += 1;
            }
        }

        for f in self.faces() {
            if self.face_status(f).is_removed() {
                if self.inner(f).is_valid() {
                    log::error!("removed face {:?} still references a half-edge", f);
                    errors += 1;
                }
                continue;
            }
            let inner = self.inner(f);
            if !inner.is_valid() {
                log::error!("inner half-edge of face {:?} is invalid", f);
                errors += 1;
                continue;
            }
            if self.edge_status(inner.edge()).is_removed() {
                log::error!("inner half-edge of face {:?} lies on a removed edge", f);
                errors += 1;
            }
            let mut he = inner;
            let mut steps = 0;
            loop {
                if self.face(he) != f {
                    log::error!("face {:?} contains inconsistent half-edge {:?}", f, he);
                    errors += 1;
                    break;
                }
                if !self.next(he).is_valid() {
                    // Already reported in the half-edge pass.
                    break;
                }
                he = self.next(he);
                steps += 1;
                if he == inner {
                    break;
                }
                if steps >= cap {
                    log::error!("loop of face {:?} does not close", f);
                    errors += 1;
                    break;
                }
            }
        }

        errors + warnings
    }
}

// ==================== Circulators ====================

/// Circulator over the half-edges of one face (or hole) loop.
///
/// Cyclic ranges cannot terminate on handle equality alone: the start handle
/// is part of the range, so "back at the start" is only a stop condition
/// after at least one step. The circulator therefore tracks a lap counter
/// next to the current handle.
pub struct LoopCirculator<'a, S: RealField + Copy> {
    mesh: &'a HalfEdgeMesh<S>,
    start: HalfEdgeHandle,
    current: HalfEdgeHandle,
    lap: usize,
}

impl<'a, S: RealField + Copy> LoopCirculator<'a, S> {
    fn new(mesh: &'a HalfEdgeMesh<S>, start: HalfEdgeHandle) -> Self {
        Self {
            mesh,
            start,
            current: start,
            lap: 0,
        }
    }
}

impl<S: RealField + Copy> Iterator for LoopCirculator<'_, S> {
    type Item = HalfEdgeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() || (self.lap > 0 && self.current == self.start) {
            return None;
        }
        let result = self.current;
        self.current = self.mesh.next(self.current);
        if self.current == self.start {
            self.lap += 1;
        }
        Some(result)
    }
}

pub(crate) enum StarDirection {
    Incoming,
    Outgoing,
}

/// Circulator over the incoming or outgoing half-edges of one vertex star,
/// with the same lap-count termination as [`LoopCirculator`].
pub struct StarCirculator<'a, S: RealField + Copy> {
    mesh: &'a HalfEdgeMesh<S>,
    start: HalfEdgeHandle,
    current: HalfEdgeHandle,
    lap: usize,
    direction: StarDirection,
}

impl<'a, S: RealField + Copy> StarCirculator<'a, S> {
    pub(crate) fn new(
        mesh: &'a HalfEdgeMesh<S>,
        start: HalfEdgeHandle,
        direction: StarDirection,
    ) -> Self {
        Self {
            mesh,
            start,
            current: start,
            lap: 0,
            direction,
        }
    }
}

impl<S: RealField + Copy> Iterator for StarCirculator<'_, S> {
    type Item = HalfEdgeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() || (self.lap > 0 && self.current == self.start) {
            return None;
        }
        let result = self.current;
        self.current = match self.direction {
            StarDirection::Incoming => self.mesh.next_incoming(self.current),
            StarDirection::Outgoing => self.mesh.next_outgoing(self.current),
        };
        if self.current == self.start {
            self.lap += 1;
        }
        Some(result)
    }
}
