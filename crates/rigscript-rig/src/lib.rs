//! rigscript Rig Library
//!
//! Reads a skinned mesh and the node tree around it, infers the root bone,
//! walks the hierarchy into head/tail bone records and groups the skin
//! weights per bone.
//!
//! # Example
//!
//! ```no_run
//! use rigscript_rig::{GeometrySnapshot, RigAnalysis, SceneDocument, SkeletonModel};
//!
//! let document = SceneDocument::from_path("scene.json")?;
//! let selected = document.select_mesh(None)?;
//! let geometry = GeometrySnapshot::capture(&selected)?;
//! let rig = RigAnalysis::analyze(SkeletonModel::capture(&selected)?, &geometry.weights);
//! println!("root: {:?}", rig.root_name());
//! # Ok::<(), rigscript_core::Error>(())
//! ```

pub mod analysis;
pub mod diagnostics;
pub mod document;
pub mod geometry;
pub mod provider;
pub mod root;
pub mod skeleton;
pub mod walker;
pub mod weights;

#[cfg(test)]
mod test_support;

pub use analysis::RigAnalysis;
pub use diagnostics::RigDiagnostics;
pub use document::{MeshDesc, NodeDesc, SceneDocument, SelectedMesh, SubmeshDesc};
pub use geometry::{BoneWeight, GeometrySnapshot, Submesh, NULL_MATERIAL};
pub use provider::{MeshProvider, SkeletonProvider};
pub use root::{resolve_root, RootBone};
pub use skeleton::{Node, ScalePolicy, SkeletonModel, Transform, WorldTransform};
pub use walker::{sanitize_identifier, BoneRecord, BoneTree, BoneTreeWalker};
pub use weights::{aggregate, VertexGroup, VertexGroups};
