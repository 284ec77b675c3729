//! Half-edge mesh data structure and operations.
//!
//! The main type is [`HalfEdgeMesh`]. Entities are addressed through typed
//! handles; attributes live in named property columns; connectivity
//! editing, geometric queries, face-vertex-list construction, and standard
//! primitive shapes round out the module.

mod builder;
mod edit;
mod geometry;
mod halfedge;
mod index;
mod primitives;
mod property;
mod status;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles};
pub use geometry::default_crease_angle;
pub use halfedge::{HalfEdgeMesh, LoopCirculator, Rgba, StarCirculator};
pub use index::{EdgeHandle, FaceHandle, HalfEdgeHandle, VertexHandle};
pub use primitives::{
    create_box, create_cylinder, create_disk, create_geodesic_sphere, create_icosahedron,
    create_octahedron, create_quad, create_sphere, create_tetrahedron, create_torus,
    create_triangle,
};
pub use property::{
    EdgeTag, FaceTag, HalfEdgeTag, PropertyHandle, PropertySet, PropertyValue, VertexTag,
};
pub use status::Status;
