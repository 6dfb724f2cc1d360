//! Blender Python script rendering
//!
//! A script is a header comment block, the `model` mapping and, in
//! [`ScriptStyle::Builder`], functions that build the mesh and armature
//! directly when the script is run inside Blender.

pub mod builder;
pub mod literal;
pub mod model;
pub mod writer;

use rigscript_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use rigscript_rig::{GeometrySnapshot, RigAnalysis, NULL_MATERIAL};

pub use builder::bone_identifiers;
pub use model::{BoneEntry, ScriptModel};
pub use writer::ScriptWriter;

/// Generator string written into the header
pub const GENERATOR: &str = concat!("rigscript ", env!("CARGO_PKG_VERSION"));

/// What the script contains besides the data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptStyle {
    /// Only the `model` mapping, for the importer add-on
    #[default]
    Model,
    /// The mapping plus self-contained build functions
    Builder,
}

impl std::str::FromStr for ScriptStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(ScriptStyle::Model),
            "builder" => Ok(ScriptStyle::Builder),
            _ => Err(format!("Unknown script style: {}", s)),
        }
    }
}

/// Elements per line before a long list wraps (0 disables wrapping)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineWrap {
    /// Vertex tuples per line
    pub verts: usize,
    /// Normal tuples per line
    pub normals: usize,
    /// Triangle indices per line
    pub submeshes: usize,
    /// UV triangles per line
    pub uv: usize,
    /// Vertex group pairs per line
    pub vg: usize,
}

impl Default for LineWrap {
    fn default() -> Self {
        Self {
            verts: 256,
            normals: 256,
            submeshes: 256,
            uv: 64,
            vg: 16,
        }
    }
}

/// Script export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptExportOptions {
    /// Script style
    pub style: ScriptStyle,

    /// Line wrapping limits
    pub wrap: LineWrap,

    /// Write the bone tree and rig findings into the header
    pub diagnostics: bool,

    /// Fail instead of skipping the skeleton when no root bone is found
    pub require_skeleton: bool,

    /// Generator name in the header
    pub generator: String,
}

impl Default for ScriptExportOptions {
    fn default() -> Self {
        Self {
            style: ScriptStyle::Model,
            wrap: LineWrap::default(),
            diagnostics: true,
            require_skeleton: false,
            generator: GENERATOR.to_string(),
        }
    }
}

impl ScriptExportOptions {
    /// Parse options from YAML text; missing fields keep their defaults
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Load options from a YAML file
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_config(e.to_string()))
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Counts and findings for the header comment block
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptHeader {
    pub name: String,
    pub generator: String,
    pub vertices: usize,
    pub triangles: usize,
    pub bones: usize,
    pub materials: usize,
    pub submeshes: usize,
    pub notes: Vec<String>,
}

impl ScriptHeader {
    /// Collect header data; `notes` stays empty without diagnostics
    pub fn build(
        geometry: &GeometrySnapshot,
        rig: &RigAnalysis,
        options: &ScriptExportOptions,
    ) -> Self {
        let materials: BTreeSet<&str> = geometry
            .submeshes
            .iter()
            .map(|s| s.material.as_str())
            .filter(|m| *m != NULL_MATERIAL)
            .collect();

        Self {
            name: geometry.name.clone(),
            generator: options.generator.clone(),
            vertices: geometry.vertex_count(),
            triangles: geometry.triangle_count(),
            bones: rig.skeleton.registered_bones().len(),
            materials: materials.len(),
            submeshes: geometry.submeshes.len(),
            notes: if options.diagnostics {
                diagnostic_notes(geometry, rig)
            } else {
                Vec::new()
            },
        }
    }

    fn write<W: Write>(&self, w: &mut ScriptWriter<W>) -> std::io::Result<()> {
        w.comment(format!("Blender model script for {}", literal::PyStr(&self.name)))?;
        w.comment(format!("Written by {}", self.generator))?;
        w.comment(format!("Verts:      {}", self.vertices))?;
        w.comment(format!("Tris:       {}", self.triangles))?;
        w.comment(format!("Bones:      {}", self.bones))?;
        w.comment(format!("Materials:  {}", self.materials))?;
        w.comment(format!("Sub meshes: {}", self.submeshes))?;

        if !self.notes.is_empty() {
            w.line("#")?;
            for note in &self.notes {
                w.comment(note)?;
            }
        }

        w.blank()
    }
}

fn diagnostic_notes(geometry: &GeometrySnapshot, rig: &RigAnalysis) -> Vec<String> {
    let mut notes = Vec::new();
    let diagnostics = &rig.diagnostics;

    match &diagnostics.root {
        Some(root) => {
            notes.push(format!("Root bone: {}", root));
            notes.push("Bone tree:".to_string());
            notes.extend(diagnostics.tree.iter().map(|line| format!("  {}", line)));
            notes.extend(
                diagnostics
                    .loose_bones
                    .iter()
                    .map(|bone| format!("Loose bone: {}", bone)),
            );
        }
        None => {
            notes.push("WARNING: root bone not found, skeleton data skipped".to_string());
        }
    }

    if rig.has_skeleton() && geometry.is_skinned() {
        notes.extend(
            rig.groups
                .empty_bones
                .iter()
                .map(|bone| format!("No weights for bone {}", bone)),
        );
        if rig.groups.out_of_range_slots > 0 {
            notes.push(format!(
                "{} weight slots reference bones outside the skin binding",
                rig.groups.out_of_range_slots
            ));
        }
    }

    notes
}

/// Render a complete script
pub fn write_script<W: Write>(
    out: W,
    header: &ScriptHeader,
    model: &ScriptModel,
    options: &ScriptExportOptions,
) -> Result<W> {
    let mut w = ScriptWriter::new(out);

    header.write(&mut w)?;

    if options.style == ScriptStyle::Builder {
        w.line("import bpy")?;
    }
    w.line("from collections import OrderedDict")?;
    w.blank()?;

    model.write(&mut w, &options.wrap)?;

    if options.style == ScriptStyle::Builder {
        w.blank()?;
        w.blank()?;
        builder::write_builder(&mut w, model)?;
    }

    Ok(w.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ScriptExportOptions::default();
        assert_eq!(options.style, ScriptStyle::Model);
        assert_eq!(options.wrap.uv, 64);
        assert_eq!(options.wrap.vg, 16);
        assert!(options.diagnostics);
        assert!(options.generator.starts_with("rigscript "));
    }

    #[test]
    fn test_yaml_partial_options() {
        let options = ScriptExportOptions::from_yaml_str(
            "style: builder\nwrap:\n  verts: 8\ndiagnostics: false\n",
        )
        .unwrap();

        assert_eq!(options.style, ScriptStyle::Builder);
        assert_eq!(options.wrap.verts, 8);
        assert_eq!(options.wrap.normals, 256);
        assert!(!options.diagnostics);
    }

    #[test]
    fn test_yaml_rejects_unknown_style() {
        let err = ScriptExportOptions::from_yaml_str("style: fbx\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("Builder".parse::<ScriptStyle>(), Ok(ScriptStyle::Builder));
        assert!("gltf".parse::<ScriptStyle>().is_err());
    }
}
