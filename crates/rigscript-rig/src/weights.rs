//! Per-bone vertex group aggregation

use crate::geometry::BoneWeight;

/// Vertices influenced by one registered bone
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGroup {
    /// Slot index of the bone in the skin binding
    pub bone: usize,
    /// Bone name
    pub name: String,
    /// `(vertex index, raw weight)` in ascending vertex order
    pub entries: Vec<(u32, f32)>,
}

/// Result of aggregating all weight slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexGroups {
    /// Non-empty groups, in registered-bone order
    pub groups: Vec<VertexGroup>,
    /// Registered bones without a single non-zero slot
    pub empty_bones: Vec<String>,
    /// Non-zero slots naming a bone outside the binding
    pub out_of_range_slots: usize,
}

impl VertexGroups {
    /// Check if no bone received any weight
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group raw weights by bone
///
/// Each bone scans every vertex's four slots. Weights are kept as-is:
/// nothing is sorted, normalized or deduplicated.
pub fn aggregate(weights: &[BoneWeight], bone_names: &[String]) -> VertexGroups {
    let mut result = VertexGroups::default();

    for (bone, name) in bone_names.iter().enumerate() {
        let mut entries = Vec::new();

        for (vertex, weight) in weights.iter().enumerate() {
            for (index, w) in weight.influences() {
                if index as usize == bone {
                    entries.push((vertex as u32, w));
                }
            }
        }

        if entries.is_empty() {
            tracing::debug!(bone = %name, "No weights for bone");
            result.empty_bones.push(name.clone());
        } else {
            result.groups.push(VertexGroup {
                bone,
                name: name.clone(),
                entries,
            });
        }
    }

    result.out_of_range_slots = weights
        .iter()
        .flat_map(|w| w.influences())
        .filter(|(index, _)| *index as usize >= bone_names.len())
        .count();

    if result.out_of_range_slots > 0 {
        tracing::warn!(
            slots = result.out_of_range_slots,
            bones = bone_names.len(),
            "Weight slots reference bones outside the skin binding"
        );
    }

    result
}
