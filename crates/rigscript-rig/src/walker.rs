//! Bone tree walk
//!
//! Turns the node hierarchy under the resolved root into head/tail bone
//! records. Every leaf gets a synthetic tail so the target rig has no
//! zero-length bones.

use glam::{Quat, Vec3};
use rigscript_core::NodeId;
use std::collections::HashSet;

use crate::root::RootBone;
use crate::skeleton::{ScalePolicy, SkeletonModel};

/// Leaf distance above which hardpoint leaves point away from their parent
pub const HARDPOINT_DISTANCE_THRESHOLD: f32 = 0.1;

/// Tail length of a hardpoint leaf
pub const HARDPOINT_TAIL_LENGTH: f32 = 0.1;

/// Tail length of any other leaf
pub const DEFAULT_TAIL_LENGTH: f32 = 0.2;

/// Name prefix of hardpoint leaves (case-insensitive)
pub const HARDPOINT_PREFIX: &str = "hp";

/// Local axis a default leaf tail follows
pub const LEAF_AXIS: Vec3 = Vec3::NEG_X;

/// One bone of the output armature, in source space
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRecord {
    /// Node the bone was made from
    pub node: NodeId,
    /// Bone name (the node name, unsanitized)
    pub name: String,
    /// Declared parent bone
    pub parent: Option<NodeId>,
    /// Name of the declared parent
    pub parent_name: Option<String>,
    /// Head position
    pub head: Vec3,
    /// Tail position
    pub tail: Vec3,
    /// World rotation of the node
    pub rotation: Quat,
    /// Whether the tail was synthesized for a leaf
    pub terminal: bool,
}

/// Ordered bone records produced by one walk
#[derive(Debug, Clone, Default)]
pub struct BoneTree {
    /// Records in emission order
    pub records: Vec<BoneRecord>,
    /// Every node that received a record
    pub visited: HashSet<NodeId>,
    /// Top of the scale-normalized subtree
    pub scope: Option<NodeId>,
}

impl BoneTree {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the walk produced nothing
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registered bones the walk never reached, in slot order
    pub fn loose_bones<'a>(&self, skeleton: &'a SkeletonModel) -> Vec<&'a str> {
        skeleton
            .registered_bones()
            .iter()
            .filter(|id| !self.visited.contains(id))
            .map(|&id| skeleton.name(id))
            .collect()
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Offset from a leaf's head to its synthetic tail
pub fn terminal_direction(head: Vec3, leaf: Vec3, leaf_name: &str, leaf_rotation: Quat) -> Vec3 {
    let delta = leaf - head;
    let is_hardpoint = leaf_name
        .get(..HARDPOINT_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HARDPOINT_PREFIX));

    if delta.length() > HARDPOINT_DISTANCE_THRESHOLD && is_hardpoint {
        delta.normalize() * HARDPOINT_TAIL_LENGTH
    } else {
        leaf_rotation * LEAF_AXIS * DEFAULT_TAIL_LENGTH
    }
}

/// One pending bone pair
#[derive(Debug, Clone, Copy)]
struct Frame {
    head: NodeId,
    tail: NodeId,
    parent: Option<NodeId>,
}

/// Walks the hierarchy below a resolved root
pub struct BoneTreeWalker<'a> {
    skeleton: &'a SkeletonModel,
}

impl<'a> BoneTreeWalker<'a> {
    /// Create a walker over a skeleton
    pub fn new(skeleton: &'a SkeletonModel) -> Self {
        Self { skeleton }
    }

    /// Produce the bone records for a resolved root
    pub fn walk(&self, root: &RootBone) -> BoneTree {
        let skeleton = self.skeleton;
        let scope = root.effective_root.unwrap_or(root.root);
        let mut tree = BoneTree {
            scope: Some(scope),
            ..BoneTree::default()
        };

        let mut stack = Vec::new();
        match root.effective_root {
            Some(top) => stack.push(Frame {
                head: top,
                tail: root.root,
                parent: None,
            }),
            None => {
                for &child in skeleton.children(root.root).iter().rev() {
                    stack.push(Frame {
                        head: root.root,
                        tail: child,
                        parent: None,
                    });
                }
            }
        }

        let policy = ScalePolicy::NormalizeSubtree(scope);

        while let Some(frame) = stack.pop() {
            let head = skeleton.world_transform(frame.head, policy);
            let tail = skeleton.world_transform(frame.tail, policy);

            self.push_record(
                &mut tree,
                BoneRecord {
                    node: frame.head,
                    name: skeleton.name(frame.head).to_string(),
                    parent: frame.parent,
                    parent_name: frame.parent.map(|p| skeleton.name(p).to_string()),
                    head: head.position,
                    tail: tail.position,
                    rotation: head.rotation,
                    terminal: false,
                },
            );

            if skeleton.is_leaf(frame.tail) {
                let leaf_name = skeleton.name(frame.tail);
                let direction =
                    terminal_direction(head.position, tail.position, leaf_name, tail.rotation);

                self.push_record(
                    &mut tree,
                    BoneRecord {
                        node: frame.tail,
                        name: leaf_name.to_string(),
                        parent: Some(frame.head),
                        parent_name: Some(skeleton.name(frame.head).to_string()),
                        head: tail.position,
                        tail: tail.position + direction,
                        rotation: tail.rotation,
                        terminal: true,
                    },
                );
            } else {
                for &child in skeleton.children(frame.tail).iter().rev() {
                    stack.push(Frame {
                        head: frame.tail,
                        tail: child,
                        parent: Some(frame.head),
                    });
                }
            }
        }

        tracing::debug!(
            bones = tree.len(),
            scope = %skeleton.name(scope),
            "Walked bone tree"
        );

        tree
    }

    fn push_record(&self, tree: &mut BoneTree, record: BoneRecord) {
        if tree.visited.insert(record.node) {
            tree.records.push(record);
        } else {
            tracing::debug!(
                bone = %record.name,
                parent = ?record.parent_name,
                "Dropped repeated bone record"
            );
        }
    }
}
