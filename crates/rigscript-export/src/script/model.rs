//! The `model` mapping: data in target space

use glam::{Vec2, Vec3};
use rigscript_core::coords::{remap_position, remap_rotation, remap_scale, wxyz};
use rigscript_core::NodeId;
use rigscript_rig::{GeometrySnapshot, RigAnalysis, ScalePolicy};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use super::literal::{PyPair, PyStr, PyTuple};
use super::writer::{ScriptWriter, CONTINUATION, INDENT};
use super::LineWrap;

/// Name of the global the importer reads
pub const MODEL_VAR: &str = "model";

/// One entry of `model['bones']`
#[derive(Debug, Clone, PartialEq)]
pub struct BoneEntry {
    /// Bone name
    pub name: String,
    /// Head position
    pub pos: Vec3,
    /// World rotation, `(w, x, y, z)`
    pub rot: [f32; 4],
    /// Local position
    pub lpos: Vec3,
    /// Local rotation, `(w, x, y, z)`
    pub lrot: [f32; 4],
    /// Local scale
    pub lscl: Vec3,
    /// Tail position
    pub tail: Vec3,
    /// Index of the parent entry
    pub parent: Option<usize>,
    /// Indices of the child entries
    pub children: Vec<usize>,
}

/// Everything the script assigns to `model`, already remapped
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptModel {
    pub name: String,
    pub pos: Vec3,
    pub rot: [f32; 4],
    pub scl: Vec3,
    pub verts: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub submeshes: Vec<Vec<u32>>,
    pub materials: Vec<String>,
    pub uv: Option<Vec<[Vec2; 3]>>,
    pub vg: Option<Vec<(String, Vec<(u32, f32)>)>>,
    pub bones: Option<Vec<BoneEntry>>,
    pub root_bone: Option<String>,
}

impl ScriptModel {
    /// Build the mapping from a captured mesh and its rig
    pub fn build(geometry: &GeometrySnapshot, rig: &RigAnalysis) -> Self {
        let skeleton = &rig.skeleton;
        let mesh_node = skeleton.mesh_node();
        let placement = skeleton.world_transform(mesh_node, ScalePolicy::Keep);

        let uv = geometry.has_uvs().then(|| {
            geometry
                .triangles()
                .map(|[a, b, c]| {
                    [
                        geometry.uvs[a as usize],
                        geometry.uvs[b as usize],
                        geometry.uvs[c as usize],
                    ]
                })
                .collect()
        });

        let vg: Option<Vec<(String, Vec<(u32, f32)>)>> =
            (rig.has_skeleton() && geometry.is_skinned()).then(|| {
                rig.groups
                    .groups
                    .iter()
                    .map(|g| (g.name.clone(), g.entries.clone()))
                    .collect()
            });

        let bones = rig.has_skeleton().then(|| bone_entries(rig));

        if let Some(vg) = &vg {
            warn_shared_keys(&geometry.name, "vg", vg.iter().map(|(name, _)| name.as_str()));
        }
        if let Some(bones) = &bones {
            warn_shared_keys(&geometry.name, "bones", bones.iter().map(|b| b.name.as_str()));
        }

        Self {
            name: geometry.name.clone(),
            pos: remap_position(placement.position),
            rot: wxyz(remap_rotation(placement.rotation)),
            scl: remap_scale(skeleton.node(mesh_node).local.scale),
            verts: geometry.positions.iter().map(|&p| remap_position(p)).collect(),
            normals: geometry
                .has_normals()
                .then(|| geometry.normals.iter().map(|&n| remap_position(n)).collect()),
            submeshes: geometry.submeshes.iter().map(|s| s.indices.clone()).collect(),
            materials: geometry.submeshes.iter().map(|s| s.material.clone()).collect(),
            uv,
            vg,
            bones,
            root_bone: rig.root_name().map(str::to_string),
        }
    }

    /// Write `model = OrderedDict()` and one statement per present key
    pub fn write<W: Write>(&self, w: &mut ScriptWriter<W>, wrap: &LineWrap) -> io::Result<()> {
        w.assign(MODEL_VAR, "OrderedDict()")?;
        w.assign(key("name"), PyStr(&self.name))?;
        w.assign(key("pos"), PyTuple(self.pos.to_array()))?;
        w.assign(key("rot"), PyTuple(self.rot))?;
        w.assign(key("scl"), PyTuple(self.scl.to_array()))?;

        w.assign_list(
            key("verts"),
            self.verts.iter().map(|v| PyTuple(v.to_array())),
            wrap.verts,
        )?;

        if let Some(normals) = &self.normals {
            w.assign_list(
                key("normals"),
                normals.iter().map(|n| PyTuple(n.to_array())),
                wrap.normals,
            )?;
        }

        self.write_submeshes(w, wrap.submeshes)?;
        w.assign_list(key("materials"), self.materials.iter().map(|m| PyStr(m)), 0)?;

        if let Some(uv) = &self.uv {
            w.assign_list(key("uv"), uv.iter().map(UvTriangle), wrap.uv)?;
        }

        if let Some(vg) = &self.vg {
            w.assign(key("vg"), "OrderedDict()")?;
            for (name, entries) in vg {
                w.assign_list(
                    format!("{}[{}]", key("vg"), PyStr(name)),
                    entries.iter().map(|&(v, weight)| PyPair(v, weight)),
                    wrap.vg,
                )?;
            }
        }

        if let Some(bones) = &self.bones {
            w.assign(key("bones"), "OrderedDict()")?;
            for bone in bones {
                w.assign(
                    format!("{}[{}]", key("bones"), PyStr(&bone.name)),
                    BoneDict { bone, bones },
                )?;
            }
        }

        if let Some(root) = &self.root_bone {
            w.assign(key("root_bone"), PyStr(root))?;
        }

        Ok(())
    }

    fn write_submeshes<W: Write>(&self, w: &mut ScriptWriter<W>, limit: usize) -> io::Result<()> {
        if self.submeshes.is_empty() {
            return w.assign(key("submeshes"), "[]");
        }

        w.line(format!("{} = [", key("submeshes")))?;
        for submesh in &self.submeshes {
            w.raw(INDENT)?;
            w.write_list(submesh.iter(), limit)?;
            w.raw(",\n")?;
        }
        w.line("]")
    }
}

/// Names that occur more than once, in first-seen order
pub fn shared_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut shared = Vec::new();
    for name in names {
        if !seen.insert(name) && !shared.contains(&name) {
            shared.push(name);
        }
    }
    shared
}

// Entries are keyed by name, so the last entry of a shared name wins in Python.
fn warn_shared_keys<'a>(mesh: &str, map: &str, names: impl IntoIterator<Item = &'a str>) {
    for name in shared_names(names) {
        tracing::warn!(
            mesh = %mesh,
            key = %map,
            name = %name,
            "Several entries share a name; the last one replaces the others"
        );
    }
}

fn key(name: &str) -> String {
    format!("{}[{}]", MODEL_VAR, PyStr(name))
}

fn bone_entries(rig: &RigAnalysis) -> Vec<BoneEntry> {
    let skeleton = &rig.skeleton;
    let index: HashMap<NodeId, usize> = rig
        .tree
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.node, i))
        .collect();

    rig.tree
        .records
        .iter()
        .map(|record| {
            let local = skeleton.node(record.node).local;
            BoneEntry {
                name: record.name.clone(),
                pos: remap_position(record.head),
                rot: wxyz(remap_rotation(record.rotation)),
                lpos: remap_position(local.position),
                lrot: wxyz(remap_rotation(local.rotation)),
                lscl: remap_scale(local.scale),
                tail: remap_position(record.tail),
                parent: record.parent.and_then(|p| index.get(&p).copied()),
                children: rig
                    .tree
                    .records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.parent == Some(record.node))
                    .map(|(i, _)| i)
                    .collect(),
            }
        })
        .collect()
}

struct UvTriangle<'a>(&'a [Vec2; 3]);

impl std::fmt::Display for UvTriangle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.0;
        write!(
            f,
            "[{}, {}, {}]",
            PyTuple(a.to_array()),
            PyTuple(b.to_array()),
            PyTuple(c.to_array())
        )
    }
}

struct BoneDict<'a> {
    bone: &'a BoneEntry,
    bones: &'a [BoneEntry],
}

impl std::fmt::Display for BoneDict<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bone = self.bone;
        write!(
            f,
            "{{'pos': {}, 'rot': {}, 'lpos': {}, 'lrot': {}, 'lscl': {}, 'tail': {}",
            PyTuple(bone.pos.to_array()),
            PyTuple(bone.rot),
            PyTuple(bone.lpos.to_array()),
            PyTuple(bone.lrot),
            PyTuple(bone.lscl.to_array()),
            PyTuple(bone.tail.to_array()),
        )?;

        if let Some(parent) = bone.parent {
            write!(f, ",\n{}'parent': {}", CONTINUATION, PyStr(&self.bones[parent].name))?;
        }

        if !bone.children.is_empty() {
            write!(f, ",\n{}'children': [", CONTINUATION)?;
            for (i, &child) in bone.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", PyStr(&self.bones[child].name))?;
            }
            f.write_str("]")?;
        }

        f.write_str("}")
    }
}
