//! In-memory providers for unit tests

use crate::document::NodeDesc;
use crate::geometry::BoneWeight;
use crate::provider::{MeshProvider, SkeletonProvider};

/// Mesh provider backed by plain vectors
#[derive(Debug, Clone, Default)]
pub struct TestMesh {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub submeshes: Vec<Vec<u32>>,
    pub materials: Vec<Option<String>>,
    pub weights: Option<Vec<BoneWeight>>,
}

impl TestMesh {
    /// One skinned triangle over two bones
    pub fn triangle() -> Self {
        Self {
            name: "Body".to_string(),
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            submeshes: vec![vec![0, 1, 2]],
            materials: vec![Some("Skin".to_string())],
            weights: Some(vec![
                BoneWeight::from_pairs(&[(0, 1.0)]),
                BoneWeight::from_pairs(&[(0, 0.5), (1, 0.5)]),
                BoneWeight::from_pairs(&[(1, 1.0)]),
            ]),
        }
    }
}

impl MeshProvider for TestMesh {
    fn mesh_name(&self) -> &str {
        &self.name
    }

    fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    fn submesh_triangles(&self, submesh: usize) -> &[u32] {
        &self.submeshes[submesh]
    }

    fn submesh_material(&self, submesh: usize) -> Option<&str> {
        self.materials.get(submesh).and_then(|m| m.as_deref())
    }

    fn bone_weights(&self) -> Option<&[BoneWeight]> {
        self.weights.as_deref()
    }
}

/// Skeleton provider backed by a node list
#[derive(Debug, Clone, Default)]
pub struct TestScene {
    pub nodes: Vec<NodeDesc>,
    pub bones: Vec<usize>,
    pub mesh_node: usize,
}

impl TestScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index
    pub fn add(&mut self, node: NodeDesc) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Model > Armature > A > B, with the mesh on Model
    ///
    /// Indices: Model 0, Armature 1, A 2, B 3, Body 4.
    pub fn two_bone() -> Self {
        let mut scene = Self::new();
        let model = scene.add(NodeDesc::new("Model", None));
        let armature = scene.add(NodeDesc::new("Armature", Some(model)));
        let a = scene.add(NodeDesc::new("A", Some(armature)).at([0.0, 1.0, 0.0]));
        let b = scene.add(NodeDesc::new("B", Some(a)).at([0.0, 1.0, 0.0]));
        scene.mesh_node = scene.add(NodeDesc::new("Body", Some(model)));
        scene.bones = vec![a, b];
        scene
    }
}

impl SkeletonProvider for TestScene {
    fn scene_nodes(&self) -> &[NodeDesc] {
        &self.nodes
    }

    fn registered_bones(&self) -> &[usize] {
        &self.bones
    }

    fn mesh_node(&self) -> usize {
        self.mesh_node
    }
}
