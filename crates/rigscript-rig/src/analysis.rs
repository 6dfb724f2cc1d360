//! Everything derived from a skeleton and its skin weights

use rigscript_core::{Error, Result};

use crate::diagnostics::RigDiagnostics;
use crate::geometry::BoneWeight;
use crate::root::{resolve_root, RootBone};
use crate::skeleton::SkeletonModel;
use crate::walker::{BoneTree, BoneTreeWalker};
use crate::weights::{aggregate, VertexGroups};

/// Root, bone records and vertex groups of one skinned mesh
#[derive(Debug, Clone)]
pub struct RigAnalysis {
    /// The captured node tree
    pub skeleton: SkeletonModel,
    /// Resolved root, `None` when the search failed
    pub root: Option<RootBone>,
    /// Walked bones (empty without a root)
    pub tree: BoneTree,
    /// Per-bone vertex groups (empty without a root)
    pub groups: VertexGroups,
    /// Commentary for the script header
    pub diagnostics: RigDiagnostics,
}

impl RigAnalysis {
    /// Resolve, walk and aggregate
    ///
    /// A missing root is not an error here: the rig is left empty and the
    /// failure is logged, so the mesh can still be exported.
    pub fn analyze(skeleton: SkeletonModel, weights: &[BoneWeight]) -> Self {
        match resolve_root(&skeleton) {
            Ok(root) => {
                let tree = BoneTreeWalker::new(&skeleton).walk(&root);
                let groups = aggregate(weights, &skeleton.registered_names());
                if groups.is_empty() && !weights.is_empty() {
                    tracing::warn!(
                        bones = skeleton.registered_bones().len(),
                        "No registered bone received any weight"
                    );
                }
                let diagnostics = RigDiagnostics::collect(&skeleton, &root, &tree);

                if !diagnostics.loose_bones.is_empty() {
                    tracing::info!(
                        count = diagnostics.loose_bones.len(),
                        "Registered bones outside the walked hierarchy"
                    );
                }

                Self {
                    skeleton,
                    root: Some(root),
                    tree,
                    groups,
                    diagnostics,
                }
            }
            Err(err) => {
                tracing::warn!("{}; skipping skeleton and skin data", err);
                let diagnostics = RigDiagnostics::unresolved(&skeleton);
                Self {
                    skeleton,
                    root: None,
                    tree: BoneTree::default(),
                    groups: VertexGroups::default(),
                    diagnostics,
                }
            }
        }
    }

    /// Check if the skeleton and skin data can be exported
    pub fn has_skeleton(&self) -> bool {
        self.root.is_some()
    }

    /// Name of the resolved root bone
    pub fn root_name(&self) -> Option<&str> {
        self.root.map(|r| self.skeleton.name(r.root))
    }

    /// Fail unless a root was found
    pub fn require_skeleton(&self) -> Result<()> {
        if self.has_skeleton() {
            Ok(())
        } else {
            Err(Error::RootNotFound {
                mesh: self.skeleton.name(self.skeleton.mesh_node()).to_string(),
            })
        }
    }
}
