//! Standalone builder functions appended in `builder` style

use std::collections::HashSet;
use std::io::{self, Write};

use rigscript_rig::sanitize_identifier;

use super::literal::{PyStr, PyTuple};
use super::model::{ScriptModel, MODEL_VAR};
use super::writer::ScriptWriter;

/// Prefix of the per-bone local variables
pub const BONE_VAR_PREFIX: &str = "bone_";

/// One unique Python identifier per bone entry, in entry order
///
/// Names that sanitize to the same identifier get `_2`, `_3`, ... suffixes.
pub fn bone_identifiers(names: &[&str]) -> Vec<String> {
    let mut taken = HashSet::new();

    names
        .iter()
        .map(|name| {
            let base = format!("{}{}", BONE_VAR_PREFIX, sanitize_identifier(name));
            let mut ident = base.clone();
            let mut n = 2;
            while !taken.insert(ident.clone()) {
                ident = format!("{}_{}", base, n);
                n += 1;
            }
            ident
        })
        .collect()
}

/// Write the import line and the four builder functions
pub fn write_builder<W: Write>(w: &mut ScriptWriter<W>, model: &ScriptModel) -> io::Result<()> {
    write_mesh_builder(w)?;
    write_armature_builder(w, model)?;
    write_skin_builder(w)?;
    write_main(w, model)
}

fn write_mesh_builder<W: Write>(w: &mut ScriptWriter<W>) -> io::Result<()> {
    w.line("def build_mesh(model):")?;
    w.indent();
    w.line("print('Building mesh')")?;
    w.line("me = bpy.data.meshes.new(model['name'] + '_mesh')")?;
    w.line("ob = bpy.data.objects.new(model['name'], me)")?;
    w.line("ob.location = model['pos']")?;
    w.line("ob.rotation_mode = 'QUATERNION'")?;
    w.line("ob.rotation_quaternion = model['rot']")?;
    w.line("ob.scale = model['scl']")?;
    w.line("bpy.context.collection.objects.link(ob)")?;
    w.blank()?;

    w.comment("Create materials and collect faces per submesh")?;
    w.line("faces = []")?;
    w.line("face_materials = []")?;
    w.line("for index, (name, indices) in enumerate(zip(model['materials'], model['submeshes'])):")?;
    w.indent();
    w.line("mat = bpy.data.materials.get(name) or bpy.data.materials.new(name)")?;
    w.line("me.materials.append(mat)")?;
    w.line("for i in range(0, len(indices), 3):")?;
    w.indent();
    w.line("faces.append(tuple(indices[i:i + 3]))")?;
    w.line("face_materials.append(index)")?;
    w.dedent();
    w.dedent();
    w.blank()?;

    w.line("me.from_pydata(model['verts'], [], faces)")?;
    w.line("for poly, index in zip(me.polygons, face_materials):")?;
    w.indent();
    w.line("poly.material_index = index")?;
    w.line("poly.use_smooth = True")?;
    w.dedent();
    w.blank()?;

    w.line("if 'uv' in model:")?;
    w.indent();
    w.line("layer = me.uv_layers.new(name=model['name'] + '_uv')")?;
    w.line("for poly, tri in zip(me.polygons, model['uv']):")?;
    w.indent();
    w.line("for loop, uv in zip(poly.loop_indices, tri):")?;
    w.indent();
    w.line("layer.data[loop].uv = uv")?;
    w.dedent();
    w.dedent();
    w.dedent();
    w.blank()?;

    w.line("me.update()")?;
    w.line("return ob")?;
    w.dedent();
    w.blank()?;
    w.blank()
}

fn write_armature_builder<W: Write>(w: &mut ScriptWriter<W>, model: &ScriptModel) -> io::Result<()> {
    w.line("def build_armature(model):")?;
    w.indent();
    w.line("print('Building armature')")?;
    w.line("amt = bpy.data.armatures.new(model['name'] + '_amt')")?;
    w.line("rig = bpy.data.objects.new(model['name'] + '_rig', amt)")?;
    w.line("bpy.context.collection.objects.link(rig)")?;
    w.line("bpy.context.view_layer.objects.active = rig")?;
    w.line("bpy.ops.object.mode_set(mode='EDIT')")?;
    w.blank()?;

    let bones = model.bones.as_deref().unwrap_or_default();
    if !bones.is_empty() {
        w.comment("Create bones")?;
    }

    let names: Vec<&str> = bones.iter().map(|b| b.name.as_str()).collect();
    let idents = bone_identifiers(&names);

    for (bone, ident) in bones.iter().zip(&idents) {
        w.assign(ident, format!("amt.edit_bones.new({})", PyStr(&bone.name)))?;
        w.assign(format!("{}.head", ident), PyTuple(bone.pos.to_array()))?;
        w.assign(format!("{}.tail", ident), PyTuple(bone.tail.to_array()))?;
        if let Some(parent) = bone.parent {
            w.assign(format!("{}.parent", ident), &idents[parent])?;
            w.assign(format!("{}.use_connect", ident), "True")?;
        }
        w.blank()?;
    }

    w.line("bpy.ops.object.mode_set(mode='OBJECT')")?;
    w.line("return rig")?;
    w.dedent();
    w.blank()?;
    w.blank()
}

fn write_skin_builder<W: Write>(w: &mut ScriptWriter<W>) -> io::Result<()> {
    w.line("def build_skin(ob, rig, vg):")?;
    w.indent();
    w.line("print('Skinning mesh')")?;
    w.comment("Vertex groups take (vertex, weight) pairs as written")?;
    w.line("for name, vgroup in vg.items():")?;
    w.indent();
    w.line("grp = ob.vertex_groups.new(name=name)")?;
    w.line("for (v, w) in vgroup:")?;
    w.indent();
    w.line("grp.add([v], w, 'REPLACE')")?;
    w.dedent();
    w.dedent();
    w.blank()?;

    w.comment("Armature modifier using vertex groups but not envelopes")?;
    w.line("mod = ob.modifiers.new('Armature', 'ARMATURE')")?;
    w.line("mod.object = rig")?;
    w.line("mod.use_bone_envelopes = False")?;
    w.line("mod.use_vertex_groups = True")?;
    w.line("ob.parent = rig")?;
    w.dedent();
    w.blank()?;
    w.blank()
}

fn write_main<W: Write>(w: &mut ScriptWriter<W>, model: &ScriptModel) -> io::Result<()> {
    w.line("def build():")?;
    w.indent();
    w.line(format!("print('Building model ' + {}['name'])", MODEL_VAR))?;
    w.line(format!("ob = build_mesh({})", MODEL_VAR))?;
    if model.bones.is_some() {
        w.line(format!("rig = build_armature({})", MODEL_VAR))?;
        w.line(format!("build_skin(ob, rig, {}.get('vg', OrderedDict()))", MODEL_VAR))?;
    }
    w.dedent();
    w.blank()?;
    w.blank()?;

    w.line("if __name__ == '__main__':")?;
    w.indent();
    w.line("build()")?;
    w.dedent();
    Ok(())
}
