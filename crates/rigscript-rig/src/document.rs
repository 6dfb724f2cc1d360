//! Scene document: the serialized form of a mesh provider
//!
//! A scene document is a flat node list (parents by index, children in list
//! order) plus one or more skinned meshes that reference those nodes.

use rigscript_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::BoneWeight;
use crate::provider::{MeshProvider, SkeletonProvider};

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// One scene node with its local transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    /// Node name
    pub name: String,
    /// Index of the parent node (None for top-level nodes)
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local position
    #[serde(default)]
    pub position: [f32; 3],
    /// Local rotation quaternion, `[x, y, z, w]`
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    /// Local scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl NodeDesc {
    /// Create a node at the origin
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            position: [0.0; 3],
            rotation: identity_rotation(),
            scale: unit_scale(),
        }
    }

    /// Set local position
    pub fn at(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    /// Set local rotation (`[x, y, z, w]`)
    pub fn rotated(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set local scale
    pub fn scaled(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }
}

/// Triangle run of one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmeshDesc {
    /// Material name (None when no material is assigned)
    #[serde(default)]
    pub material: Option<String>,
    /// Flattened triangle indices
    #[serde(default)]
    pub triangles: Vec<u32>,
}

/// A skinned mesh and its binding to scene nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDesc {
    /// Mesh object name
    pub name: String,
    /// Node carrying the mesh
    pub node: usize,
    /// Vertex positions
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    /// First UV channel
    #[serde(default)]
    pub uv: Vec<[f32; 2]>,
    /// Material groups
    #[serde(default)]
    pub submeshes: Vec<SubmeshDesc>,
    /// Registered bones (node indices, in skin slot order)
    #[serde(default)]
    pub bones: Vec<usize>,
    /// Per-vertex influence slots (absent for unskinned meshes)
    #[serde(default)]
    pub bone_weights: Option<Vec<BoneWeight>>,
}

/// Scene document root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// All scene nodes
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,
    /// Meshes available for export
    #[serde(default)]
    pub meshes: Vec<MeshDesc>,
}

impl SceneDocument {
    /// Decode a document from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidDocument {
            message: e.to_string(),
        })
    }

    /// Read and decode a document file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(Error::from)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("decoding {}", path.display()))
    }

    /// Pick the mesh to export: by name, or the first one
    pub fn select_mesh(&self, name: Option<&str>) -> Result<SelectedMesh<'_>> {
        let mesh = match name {
            Some(name) => self
                .meshes
                .iter()
                .find(|m| m.name == name)
                .ok_or_else(|| Error::selection_invalid(format!("no mesh named '{}'", name)))?,
            None => self
                .meshes
                .first()
                .ok_or_else(|| Error::selection_invalid("document contains no meshes"))?,
        };

        if mesh.node >= self.nodes.len() {
            return Err(Error::invalid_input(format!(
                "mesh '{}' sits on node {} but the document has {} nodes",
                mesh.name,
                mesh.node,
                self.nodes.len()
            )));
        }

        Ok(SelectedMesh {
            document: self,
            mesh,
        })
    }

    /// Names of all meshes in the document
    pub fn mesh_names(&self) -> Vec<&str> {
        self.meshes.iter().map(|m| m.name.as_str()).collect()
    }
}

/// One mesh of a document, viewed as mesh and skeleton provider
#[derive(Debug, Clone, Copy)]
pub struct SelectedMesh<'a> {
    document: &'a SceneDocument,
    mesh: &'a MeshDesc,
}

impl MeshProvider for SelectedMesh<'_> {
    fn mesh_name(&self) -> &str {
        &self.mesh.name
    }

    fn vertices(&self) -> &[[f32; 3]] {
        &self.mesh.vertices
    }

    fn normals(&self) -> &[[f32; 3]] {
        &self.mesh.normals
    }

    fn uvs(&self) -> &[[f32; 2]] {
        &self.mesh.uv
    }

    fn submesh_count(&self) -> usize {
        self.mesh.submeshes.len()
    }

    fn submesh_triangles(&self, submesh: usize) -> &[u32] {
        self.mesh
            .submeshes
            .get(submesh)
            .map(|s| s.triangles.as_slice())
            .unwrap_or(&[])
    }

    fn submesh_material(&self, submesh: usize) -> Option<&str> {
        self.mesh
            .submeshes
            .get(submesh)
            .and_then(|s| s.material.as_deref())
    }

    fn bone_weights(&self) -> Option<&[BoneWeight]> {
        self.mesh.bone_weights.as_deref()
    }
}

impl SkeletonProvider for SelectedMesh<'_> {
    fn scene_nodes(&self) -> &[NodeDesc] {
        &self.document.nodes
    }

    fn registered_bones(&self) -> &[usize] {
        &self.mesh.bones
    }

    fn mesh_node(&self) -> usize {
        self.mesh.node
    }
}
