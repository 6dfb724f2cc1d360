//! Root bone inference
//!
//! The skin binding rarely lists the bone that actually anchors the
//! hierarchy. The root is found as the first node, in pre-order from the
//! mesh's scene parent, that has a registered bone as a direct child.

use rigscript_core::{Error, NodeId, Result};

use crate::skeleton::SkeletonModel;

/// Resolved root of the bone hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootBone {
    /// The node whose child is the first registered bone found
    pub root: NodeId,
    /// Where the walk starts: the root's own parent, if it has one
    pub effective_root: Option<NodeId>,
}

/// Find the root bone above the registered bones
///
/// For each child of the node being searched, in order: a registered child
/// ends the search at the current node, anything else is searched fully
/// before its next sibling is looked at.
pub fn resolve_root(skeleton: &SkeletonModel) -> Result<RootBone> {
    let mesh = skeleton.mesh_node();
    let not_found = || Error::RootNotFound {
        mesh: skeleton.name(mesh).to_string(),
    };

    let start = skeleton.mesh_parent().ok_or_else(not_found)?;

    // (node, index of the next child to look at)
    let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        let children = skeleton.children(node);

        if next >= children.len() {
            stack.pop();
            continue;
        }

        frame.1 += 1;
        let child = children[next];
        if skeleton.is_registered(child) {
            let root = RootBone {
                root: node,
                effective_root: skeleton.parent(node),
            };
            tracing::debug!(
                root = %skeleton.name(node),
                first_bone = %skeleton.name(child),
                "Resolved root bone"
            );
            return Ok(root);
        }

        stack.push((child, 0));
    }

    Err(not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeDesc;
    use crate::test_support::TestScene;

    #[test]
    fn test_root_is_parent_of_first_registered() {
        let scene = TestScene::two_bone();
        let skeleton = SkeletonModel::capture(&scene).unwrap();
        let root = resolve_root(&skeleton).unwrap();

        assert_eq!(skeleton.name(root.root), "Armature");
        assert_eq!(root.effective_root.map(|id| skeleton.name(id)), Some("Model"));
    }

    #[test]
    fn test_depth_first_beats_shallower_sibling() {
        // Model
        //   Deep
        //     Holder
        //       BoneX (registered)
        //   Shallow
        //     BoneY (registered)
        //   Body (mesh)
        let mut scene = TestScene::new();
        let model = scene.add(NodeDesc::new("Model", None));
        let deep = scene.add(NodeDesc::new("Deep", Some(model)));
        let holder = scene.add(NodeDesc::new("Holder", Some(deep)));
        let bone_x = scene.add(NodeDesc::new("BoneX", Some(holder)));
        let shallow = scene.add(NodeDesc::new("Shallow", Some(model)));
        let bone_y = scene.add(NodeDesc::new("BoneY", Some(shallow)));
        scene.mesh_node = scene.add(NodeDesc::new("Body", Some(model)));
        scene.bones = vec![bone_y, bone_x];

        let skeleton = SkeletonModel::capture(&scene).unwrap();
        let root = resolve_root(&skeleton).unwrap();
        assert_eq!(skeleton.name(root.root), "Holder");
    }

    #[test]
    fn test_registered_child_of_start() {
        let mut scene = TestScene::new();
        let model = scene.add(NodeDesc::new("Model", None));
        let bone = scene.add(NodeDesc::new("Hips", Some(model)));
        scene.mesh_node = scene.add(NodeDesc::new("Body", Some(model)));
        scene.bones = vec![bone];

        let skeleton = SkeletonModel::capture(&scene).unwrap();
        let root = resolve_root(&skeleton).unwrap();
        assert_eq!(root.root, NodeId(model));
        assert_eq!(root.effective_root, None);
    }

    #[test]
    fn test_no_registered_bones() {
        let mut scene = TestScene::two_bone();
        scene.bones.clear();
        let skeleton = SkeletonModel::capture(&scene).unwrap();

        let err = resolve_root(&skeleton).unwrap_err();
        assert!(matches!(err, Error::RootNotFound { ref mesh } if mesh == "Body"));
    }

    #[test]
    fn test_mesh_without_parent() {
        let mut scene = TestScene::new();
        scene.mesh_node = scene.add(NodeDesc::new("Body", None));
        let skeleton = SkeletonModel::capture(&scene).unwrap();

        assert!(matches!(
            resolve_root(&skeleton),
            Err(Error::RootNotFound { .. })
        ));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let scene = TestScene::two_bone();
        let skeleton = SkeletonModel::capture(&scene).unwrap();
        assert_eq!(resolve_root(&skeleton).unwrap(), resolve_root(&skeleton).unwrap());
    }
}
