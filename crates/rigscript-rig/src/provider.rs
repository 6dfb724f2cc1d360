//! Provider interfaces for the data an export reads
//!
//! The scene graph and mesh are owned by whoever hosts the exporter. The
//! pipeline only sees them through these two read-only traits, and captures
//! everything it needs up front so the source cannot change mid-export.

use crate::document::NodeDesc;
use crate::geometry::BoneWeight;

/// Read access to a mesh and its skin weights
pub trait MeshProvider {
    /// Name of the mesh object
    fn mesh_name(&self) -> &str;

    /// Vertex positions in source space
    fn vertices(&self) -> &[[f32; 3]];

    /// Vertex normals (empty when the mesh has none)
    fn normals(&self) -> &[[f32; 3]];

    /// First UV channel (empty when the mesh has none)
    fn uvs(&self) -> &[[f32; 2]];

    /// Number of submeshes
    fn submesh_count(&self) -> usize;

    /// Flattened triangle indices of one submesh
    fn submesh_triangles(&self, submesh: usize) -> &[u32];

    /// Material bound to one submesh, if any
    fn submesh_material(&self, submesh: usize) -> Option<&str>;

    /// Four influence slots per vertex, `None` for an unskinned mesh
    fn bone_weights(&self) -> Option<&[BoneWeight]>;
}

/// Read access to the scene node tree around a mesh
pub trait SkeletonProvider {
    /// Every scene node; the slice order is the native child order
    fn scene_nodes(&self) -> &[NodeDesc];

    /// Arena indices of the bones the skin binding references, in slot order
    fn registered_bones(&self) -> &[usize];

    /// Arena index of the node that carries the mesh
    fn mesh_node(&self) -> usize;
}
