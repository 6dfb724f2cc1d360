//! Geometry snapshot of a skinned mesh

use glam::{Vec2, Vec3};
use rigscript_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::provider::MeshProvider;

/// Material name written for submeshes without a material
pub const NULL_MATERIAL: &str = "null";

/// Four (bone index, weight) influence slots of one vertex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoneWeight {
    /// Index into the registered bone list, per slot
    pub indices: [u32; 4],
    /// Influence weight, per slot
    pub weights: [f32; 4],
}

impl BoneWeight {
    /// Create a weight record from explicit slots
    pub fn new(indices: [u32; 4], weights: [f32; 4]) -> Self {
        Self { indices, weights }
    }

    /// Build from up to four `(bone, weight)` pairs; unused slots stay zero
    pub fn from_pairs(pairs: &[(u32, f32)]) -> Self {
        let mut weight = Self::default();
        for (slot, &(bone, w)) in pairs.iter().take(4).enumerate() {
            weight.indices[slot] = bone;
            weight.weights[slot] = w;
        }
        weight
    }

    /// Slots carrying a non-zero weight
    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w != 0.0)
            .map(|(&i, &w)| (i, w))
    }
}

/// One material group of triangles
#[derive(Debug, Clone, PartialEq)]
pub struct Submesh {
    /// Material name, or [`NULL_MATERIAL`]
    pub material: String,
    /// Flattened triangle indices (length is a multiple of 3)
    pub indices: Vec<u32>,
}

impl Submesh {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Immutable capture of everything the script needs from the mesh
#[derive(Debug, Clone)]
pub struct GeometrySnapshot {
    /// Mesh name
    pub name: String,
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals (empty or one per vertex)
    pub normals: Vec<Vec3>,
    /// UV coordinates (empty or one per vertex)
    pub uvs: Vec<Vec2>,
    /// Material groups
    pub submeshes: Vec<Submesh>,
    /// Influence slots (empty for unskinned meshes, else one per vertex)
    pub weights: Vec<BoneWeight>,
}

impl GeometrySnapshot {
    /// Capture and validate a mesh in one pass
    pub fn capture(mesh: &impl MeshProvider) -> Result<Self> {
        let name = mesh.mesh_name().to_string();
        let vertex_count = mesh.vertices().len();

        if vertex_count == 0 {
            return Err(Error::invalid_input(format!("mesh '{}' has no vertices", name)));
        }

        let normals = mesh.normals();
        if !normals.is_empty() && normals.len() != vertex_count {
            return Err(Error::invalid_input(format!(
                "mesh '{}' has {} normals for {} vertices",
                name,
                normals.len(),
                vertex_count
            )));
        }

        let uvs = mesh.uvs();
        if !uvs.is_empty() && uvs.len() != vertex_count {
            return Err(Error::invalid_input(format!(
                "mesh '{}' has {} UVs for {} vertices",
                name,
                uvs.len(),
                vertex_count
            )));
        }

        let weights = match mesh.bone_weights() {
            Some(weights) if weights.len() != vertex_count => {
                return Err(Error::invalid_input(format!(
                    "mesh '{}' has {} bone weights for {} vertices",
                    name,
                    weights.len(),
                    vertex_count
                )));
            }
            Some(weights) => weights.to_vec(),
            None => Vec::new(),
        };

        let mut submeshes = Vec::with_capacity(mesh.submesh_count());
        for index in 0..mesh.submesh_count() {
            let indices = mesh.submesh_triangles(index);
            if indices.len() % 3 != 0 {
                return Err(Error::invalid_input(format!(
                    "submesh {} of '{}' has {} indices, not a multiple of 3",
                    index,
                    name,
                    indices.len()
                )));
            }
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::invalid_input(format!(
                    "submesh {} of '{}' references vertex {} of {}",
                    index, name, bad, vertex_count
                )));
            }

            submeshes.push(Submesh {
                material: mesh
                    .submesh_material(index)
                    .unwrap_or(NULL_MATERIAL)
                    .to_string(),
                indices: indices.to_vec(),
            });
        }

        let snapshot = Self {
            name,
            positions: mesh.vertices().iter().map(|&p| Vec3::from_array(p)).collect(),
            normals: normals.iter().map(|&n| Vec3::from_array(n)).collect(),
            uvs: uvs.iter().map(|&uv| Vec2::from_array(uv)).collect(),
            submeshes,
            weights,
        };

        tracing::debug!(
            mesh = %snapshot.name,
            vertices = snapshot.vertex_count(),
            triangles = snapshot.triangle_count(),
            submeshes = snapshot.submeshes.len(),
            skinned = snapshot.is_skinned(),
            "Captured geometry"
        );

        Ok(snapshot)
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Triangle count across all submeshes
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(Submesh::triangle_count).sum()
    }

    /// Check if the mesh has normals
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Check if the mesh has UV coordinates
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Check if the mesh carries skin weights
    pub fn is_skinned(&self) -> bool {
        !self.weights.is_empty()
    }

    /// All triangles, submesh by submesh
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.submeshes
            .iter()
            .flat_map(|s| s.indices.chunks_exact(3))
            .map(|t| [t[0], t[1], t[2]])
    }
}
