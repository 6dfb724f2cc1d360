//! Human-readable rig diagnostics

use rigscript_core::NodeId;
use serde::Serialize;

use crate::root::RootBone;
use crate::skeleton::SkeletonModel;
use crate::walker::BoneTree;

/// Commentary about a rig; never affects the exported data
#[derive(Debug, Clone, Default, Serialize)]
pub struct RigDiagnostics {
    /// Resolved root bone name
    pub root: Option<String>,
    /// Indented listing of the walked bones
    pub tree: Vec<String>,
    /// Registered bones the walk never reached
    pub loose_bones: Vec<String>,
}

impl RigDiagnostics {
    /// Collect diagnostics for a resolved rig
    pub fn collect(skeleton: &SkeletonModel, root: &RootBone, tree: &BoneTree) -> Self {
        Self {
            root: Some(skeleton.name(root.root).to_string()),
            tree: tree_lines(tree),
            loose_bones: tree
                .loose_bones(skeleton)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Diagnostics for a rig whose root could not be found
    pub fn unresolved(skeleton: &SkeletonModel) -> Self {
        Self {
            root: None,
            tree: Vec::new(),
            loose_bones: skeleton.registered_names(),
        }
    }
}

/// Render the walked bones as an indented tree, two spaces per level
pub fn tree_lines(tree: &BoneTree) -> Vec<String> {
    let children = |parent: Option<NodeId>| -> Vec<usize> {
        tree.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.parent == parent)
            .map(|(i, _)| i)
            .collect()
    };

    let mut lines = Vec::with_capacity(tree.len());
    let mut stack: Vec<(usize, usize)> = children(None).into_iter().rev().map(|i| (i, 0)).collect();

    while let Some((index, depth)) = stack.pop() {
        let record = &tree.records[index];
        let marker = if record.terminal { " (tail)" } else { "" };
        lines.push(format!("{}{}{}", "  ".repeat(depth), record.name, marker));

        for child in children(Some(record.node)).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeDesc;
    use crate::root::resolve_root;
    use crate::test_support::TestScene;
    use crate::walker::BoneTreeWalker;

    #[test]
    fn test_two_bone_tree() {
        let skeleton = SkeletonModel::capture(&TestScene::two_bone()).unwrap();
        let root = resolve_root(&skeleton).unwrap();
        let tree = BoneTreeWalker::new(&skeleton).walk(&root);

        let diagnostics = RigDiagnostics::collect(&skeleton, &root, &tree);
        assert_eq!(diagnostics.root.as_deref(), Some("Armature"));
        assert_eq!(
            diagnostics.tree,
            vec!["Model", "  Armature", "    A", "      B (tail)"]
        );
        assert!(diagnostics.loose_bones.is_empty());
    }

    #[test]
    fn test_siblings_keep_order() {
        let mut scene = TestScene::two_bone();
        let c = scene.add(NodeDesc::new("C", Some(2)));
        scene.bones.push(c);
        let skeleton = SkeletonModel::capture(&scene).unwrap();
        let root = resolve_root(&skeleton).unwrap();
        let tree = BoneTreeWalker::new(&skeleton).walk(&root);

        let lines = tree_lines(&tree);
        assert_eq!(lines[3], "      B (tail)");
        assert_eq!(lines[4], "      C (tail)");
    }

    #[test]
    fn test_unresolved_lists_all_bones() {
        let skeleton = SkeletonModel::capture(&TestScene::two_bone()).unwrap();
        let diagnostics = RigDiagnostics::unresolved(&skeleton);

        assert!(diagnostics.root.is_none());
        assert_eq!(diagnostics.loose_bones, vec!["A", "B"]);
        assert!(diagnostics.tree.is_empty());
    }
}
