//! Scene node arena and transform queries

use glam::{Affine3A, Quat, Vec3};
use rigscript_core::{Error, NodeId, Result};
use std::collections::HashSet;

use crate::provider::SkeletonProvider;

/// Local transform of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation
    pub position: Vec3,
    /// Rotation (normalized)
    pub rotation: Quat,
    /// Scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// World-space placement of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    /// World position
    pub position: Vec3,
    /// World rotation
    pub rotation: Quat,
}

/// How local scale enters a world-space query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Compose every node's scale
    Keep,
    /// Treat the scale of this node and all its descendants as one
    NormalizeSubtree(NodeId),
}

/// A scene node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name
    pub name: String,
    /// Parent node
    pub parent: Option<NodeId>,
    /// Children in native order
    pub children: Vec<NodeId>,
    /// Local transform
    pub local: Transform,
}

/// The full node tree around a skinned mesh
#[derive(Debug, Clone)]
pub struct SkeletonModel {
    nodes: Vec<Node>,
    registered: Vec<NodeId>,
    registered_set: HashSet<NodeId>,
    mesh_node: NodeId,
}

impl SkeletonModel {
    /// Capture the node tree from a provider
    pub fn capture(provider: &impl SkeletonProvider) -> Result<Self> {
        let descs = provider.scene_nodes();
        let count = descs.len();

        let mut nodes = Vec::with_capacity(count);
        for (index, desc) in descs.iter().enumerate() {
            if let Some(parent) = desc.parent {
                if parent >= count {
                    return Err(Error::invalid_input(format!(
                        "node '{}' has invalid parent index {}",
                        desc.name, parent
                    )));
                }
                if parent == index {
                    return Err(Error::invalid_input(format!(
                        "node '{}' references itself as parent",
                        desc.name
                    )));
                }
            }

            let rotation = Quat::from_array(desc.rotation);
            if !rotation.is_finite() || rotation.length_squared() == 0.0 {
                return Err(Error::invalid_input(format!(
                    "node '{}' has a degenerate rotation {:?}",
                    desc.name, desc.rotation
                )));
            }

            nodes.push(Node {
                name: desc.name.clone(),
                parent: desc.parent.map(NodeId),
                children: Vec::new(),
                local: Transform {
                    position: Vec3::from_array(desc.position),
                    rotation: rotation.normalize(),
                    scale: Vec3::from_array(desc.scale),
                },
            });
        }

        // Children keep document order, which is the native child order.
        for index in 0..count {
            if let Some(parent) = nodes[index].parent {
                nodes[parent.0].children.push(NodeId(index));
            }
        }

        // A parent chain longer than the arena means a cycle.
        for index in 0..count {
            let mut steps = 0;
            let mut current = nodes[index].parent;
            while let Some(parent) = current {
                steps += 1;
                if steps > count {
                    return Err(Error::invalid_input(format!(
                        "node '{}' is part of a parent cycle",
                        nodes[index].name
                    )));
                }
                current = nodes[parent.0].parent;
            }
        }

        let mesh_node = provider.mesh_node();
        if mesh_node >= count {
            return Err(Error::invalid_input(format!(
                "mesh node index {} out of range ({} nodes)",
                mesh_node, count
            )));
        }

        let mut registered = Vec::with_capacity(provider.registered_bones().len());
        for &bone in provider.registered_bones() {
            if bone >= count {
                return Err(Error::invalid_input(format!(
                    "registered bone index {} out of range ({} nodes)",
                    bone, count
                )));
            }
            registered.push(NodeId(bone));
        }
        let registered_set = registered.iter().copied().collect();

        tracing::debug!(
            nodes = count,
            registered = registered.len(),
            "Captured skeleton"
        );

        Ok(Self {
            nodes,
            registered,
            registered_set,
            mesh_node: NodeId(mesh_node),
        })
    }

    /// Get a node by ID
    ///
    /// IDs are only minted by this model, so lookups are in range.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Node name
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of a node, in native order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Check if a node has no children
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].children.is_empty()
    }

    /// Check if a node is referenced by the skin binding
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.registered_set.contains(&id)
    }

    /// Registered bones in skin slot order
    pub fn registered_bones(&self) -> &[NodeId] {
        &self.registered
    }

    /// Names of the registered bones in skin slot order
    pub fn registered_names(&self) -> Vec<String> {
        self.registered
            .iter()
            .map(|&id| self.nodes[id.0].name.clone())
            .collect()
    }

    /// Node carrying the mesh
    pub fn mesh_node(&self) -> NodeId {
        self.mesh_node
    }

    /// Scene parent of the mesh (the root search starts here)
    pub fn mesh_parent(&self) -> Option<NodeId> {
        self.parent(self.mesh_node)
    }

    /// Chain from the top-level ancestor down to `id` (inclusive)
    pub fn chain_from_top(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;

        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        chain
    }

    /// World transform of a node under a scale policy
    pub fn world_transform(&self, id: NodeId, policy: ScalePolicy) -> WorldTransform {
        let mut affine = Affine3A::IDENTITY;
        let mut rotation = Quat::IDENTITY;
        let mut normalized = false;

        for node_id in self.chain_from_top(id) {
            if policy == ScalePolicy::NormalizeSubtree(node_id) {
                normalized = true;
            }

            let local = &self.nodes[node_id.0].local;
            let scale = if normalized { Vec3::ONE } else { local.scale };

            affine = affine
                * Affine3A::from_scale_rotation_translation(scale, local.rotation, local.position);
            rotation = (rotation * local.rotation).normalize();
        }

        WorldTransform {
            position: affine.transform_point3(Vec3::ZERO),
            rotation,
        }
    }

    /// World position with all scales composed
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_transform(id, ScalePolicy::Keep).position
    }

    /// Pre-order listing of a subtree as `(node, depth)` pairs
    pub fn subtree(&self, root: NodeId) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            for &child in self.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        out
    }
}
