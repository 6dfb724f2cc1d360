//! End-to-end tests for script export
//!
//! These tests drive the full pipeline from a scene document:
//! - Vertex group and bone output for a two-bone rig
//! - Structural properties of the `model` mapping
//! - Root-not-found fallback
//! - Builder style output
//! - Destination handling (cancel, atomic replace, determinism)

use proptest::prelude::*;
use rigscript_core::Error;
use rigscript_export::{ExportSession, LineWrap, ScriptExportOptions, ScriptStyle};
use rigscript_rig::{BoneWeight, MeshDesc, NodeDesc, SceneDocument, SubmeshDesc};

/// Helper to create the Model > Armature > A > B scene with one triangle
fn two_bone_document() -> SceneDocument {
    SceneDocument {
        nodes: vec![
            NodeDesc::new("Model", None),
            NodeDesc::new("Armature", Some(0)),
            NodeDesc::new("A", Some(1)).at([0.0, 1.0, 0.0]),
            NodeDesc::new("B", Some(2)).at([0.0, 1.0, 0.0]),
            NodeDesc::new("Body", Some(0)),
        ],
        meshes: vec![MeshDesc {
            name: "Body".to_string(),
            node: 4,
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uv: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            submeshes: vec![SubmeshDesc {
                material: Some("Skin".to_string()),
                triangles: vec![0, 1, 2],
            }],
            bones: vec![2, 3],
            bone_weights: Some(vec![
                BoneWeight::from_pairs(&[(0, 1.0)]),
                BoneWeight::from_pairs(&[(0, 0.5), (1, 0.5)]),
                BoneWeight::from_pairs(&[(1, 1.0)]),
            ]),
        }],
    }
}

fn prepare(document: &SceneDocument) -> ExportSession {
    ExportSession::prepare(&document.select_mesh(None).unwrap()).unwrap()
}

fn render(document: &SceneDocument, options: &ScriptExportOptions) -> String {
    String::from_utf8(prepare(document).render(options).unwrap()).unwrap()
}

mod two_bone {
    use super::*;

    #[test]
    fn test_vertex_groups() {
        let model = prepare(&two_bone_document()).model();
        let vg = model.vg.unwrap();

        assert_eq!(
            vg,
            vec![
                ("A".to_string(), vec![(0, 1.0), (1, 0.5)]),
                ("B".to_string(), vec![(1, 0.5), (2, 1.0)]),
            ]
        );
    }

    #[test]
    fn test_bones_include_terminal() {
        let session = prepare(&two_bone_document());
        let model = session.model();
        let bones = model.bones.as_ref().unwrap();

        let a = bones.iter().find(|b| b.name == "A").unwrap();
        let b = bones.iter().find(|b| b.name == "B").unwrap();
        assert_eq!(bones.iter().filter(|b| b.name == "B").count(), 1);

        // B is the leaf: its tail is synthesized 0.2 along its -X, remapped to +X.
        assert_eq!(b.parent.map(|p| bones[p].name.as_str()), Some("A"));
        assert!(((b.tail - b.pos).length() - 0.2).abs() < 1e-6);
        assert!((b.tail.x - b.pos.x - 0.2).abs() < 1e-6);
        assert_eq!(a.tail, b.pos);
        assert!(session.rig().tree.records.iter().any(|r| r.terminal && r.name == "B"));
    }

    #[test]
    fn test_script_text() {
        let text = render(&two_bone_document(), &ScriptExportOptions::default());

        assert!(text.starts_with("# Blender model script for 'Body'\n"));
        assert!(text.contains("# Verts:      3\n"));
        assert!(text.contains("# Tris:       1\n"));
        assert!(text.contains("# Root bone: Armature\n"));
        assert!(text.contains("from collections import OrderedDict\n"));
        assert!(text.contains("model = OrderedDict()\n"));
        assert!(text.contains("model['vg']['A'] = [(0, 1.0), (1, 0.5)]\n"));
        assert!(text.contains("model['vg']['B'] = [(1, 0.5), (2, 1.0)]\n"));
        assert!(text.contains("model['bones']['A'] = {'pos': (-0.0, -0.0, 1.0)"));
        assert!(text.contains("model['root_bone'] = 'Armature'\n"));
        assert!(!text.contains("def build"));
    }

    #[test]
    fn test_line_breaks_in_names_stay_commented() {
        let mut document = two_bone_document();
        document.nodes[3].name = "B\nimport os; os.system('echo hi')".to_string();
        let options = ScriptExportOptions {
            generator: "tool\rprint('x')".to_string(),
            ..ScriptExportOptions::default()
        };
        let text = render(&document, &options);

        assert!(!text.contains('\r'));
        assert!(text.contains("# Written by tool\n# print('x')\n"));
        assert!(text.contains("# import os; os.system('echo hi') (tail)\n"));

        for line in text.lines().filter(|l| l.contains("import os")) {
            assert!(
                line.starts_with('#') || line.contains(r"'B\x0aimport os; os.system(\'echo hi\')'"),
                "live line in script: {}",
                line
            );
        }
        for line in text.lines().filter(|l| l.contains("print('x')")) {
            assert!(line.starts_with('#'), "live line in script: {}", line);
        }
    }

    #[test]
    fn test_no_diagnostics() {
        let options = ScriptExportOptions {
            diagnostics: false,
            ..ScriptExportOptions::default()
        };
        let text = render(&two_bone_document(), &options);
        assert!(!text.contains("Bone tree"));
        assert!(text.contains("# Bones:      2\n"));
    }
}

mod structure {
    use super::*;

    #[test]
    fn test_lengths_align() {
        let mut document = two_bone_document();
        document.meshes[0].submeshes.push(SubmeshDesc {
            material: None,
            triangles: vec![2, 1, 0],
        });
        let model = prepare(&document).model();

        assert_eq!(model.verts.len(), 3);
        assert_eq!(model.normals.as_ref().unwrap().len(), model.verts.len());
        assert_eq!(model.materials, vec!["Skin", "null"]);
        assert_eq!(model.submeshes.len(), model.materials.len());
        assert_eq!(model.uv.as_ref().unwrap().len(), 2);
        for submesh in &model.submeshes {
            assert_eq!(submesh.len() % 3, 0);
            assert!(submesh.iter().all(|&i| (i as usize) < model.verts.len()));
        }
    }

    #[test]
    fn test_verts_wrap() {
        let options = ScriptExportOptions {
            wrap: LineWrap {
                verts: 2,
                ..LineWrap::default()
            },
            ..ScriptExportOptions::default()
        };
        let text = render(&two_bone_document(), &options);
        assert!(text.contains(
            "model['verts'] = [(-0.0, -0.0, 0.0), (-1.0, -0.0, 0.0),\n        (-0.0, -0.0, 1.0)]\n"
        ));
    }

    #[test]
    fn test_invalid_input_aborts() {
        let mut document = two_bone_document();
        document.meshes[0].bone_weights.as_mut().unwrap().pop();

        let err = ExportSession::prepare(&document.select_mesh(None).unwrap()).unwrap_err();
        assert!(matches!(err.root_cause(), Error::InvalidInput { .. }));
        assert_eq!(err.exit_code(), rigscript_core::error::exit_code::INVALID_INPUT);
    }

    fn weight() -> impl Strategy<Value = BoneWeight> {
        (
            prop::array::uniform4(0u32..2),
            prop::array::uniform4(prop_oneof![Just(0.0f32), 0.05f32..1.0]),
        )
            .prop_map(|(indices, weights)| BoneWeight::new(indices, weights))
    }

    proptest! {
        #[test]
        fn prop_vertex_groups_cover_nonzero_slots(
            weights in prop::collection::vec(weight(), 3..24)
        ) {
            let mut document = two_bone_document();
            let count = weights.len();
            let mesh = &mut document.meshes[0];
            mesh.vertices = (0..count).map(|i| [i as f32, 0.0, 0.0]).collect();
            mesh.normals.clear();
            mesh.uv.clear();
            mesh.bone_weights = Some(weights.clone());

            let model = prepare(&document).model();
            let vg = model.vg.unwrap_or_default();

            for (vertex, w) in weights.iter().enumerate() {
                let pairs = vg
                    .iter()
                    .flat_map(|(_, entries)| entries.iter())
                    .filter(|(v, _)| *v as usize == vertex)
                    .count();
                prop_assert!(pairs <= 4);
                prop_assert_eq!(pairs, w.influences().count());
            }

            let mut names: Vec<_> = vg.iter().map(|(name, _)| name.clone()).collect();
            names.dedup();
            prop_assert_eq!(names.len(), vg.len());
        }
    }
}

mod rootless {
    use super::*;

    fn rootless_document() -> SceneDocument {
        let mut document = two_bone_document();
        document.meshes[0].bones.clear();
        document.meshes[0].bone_weights = None;
        document
    }

    #[test]
    fn test_mesh_written_without_skeleton() {
        let text = render(&rootless_document(), &ScriptExportOptions::default());

        assert!(text.contains("model['verts']"));
        assert!(text.contains("model['materials'] = ['Skin']"));
        assert!(!text.contains("model['vg']"));
        assert!(!text.contains("model['bones']"));
        assert!(!text.contains("model['root_bone']"));
        assert!(text.contains("# WARNING: root bone not found"));
    }

    #[test]
    fn test_require_skeleton_fails() {
        let options = ScriptExportOptions {
            require_skeleton: true,
            ..ScriptExportOptions::default()
        };
        let err = prepare(&rootless_document()).render(&options).unwrap_err();
        assert!(matches!(err, Error::RootNotFound { ref mesh } if mesh == "Body"));
    }
}

mod builder {
    use super::*;

    #[test]
    fn test_builder_functions() {
        let mut document = two_bone_document();
        document.nodes[3].name = "B.end".to_string();
        let options = ScriptExportOptions {
            style: ScriptStyle::Builder,
            ..ScriptExportOptions::default()
        };
        let text = render(&document, &options);

        assert!(text.contains("import bpy\n"));
        assert!(text.contains("def build_mesh(model):\n"));
        assert!(text.contains("def build_armature(model):\n"));
        assert!(text.contains("def build_skin(ob, rig, vg):\n"));
        assert!(text.contains("    bone_A = amt.edit_bones.new('A')\n"));
        assert!(text.contains("    bone_B_end = amt.edit_bones.new('B.end')\n"));
        assert!(text.contains("    bone_B_end.parent = bone_A\n"));
        assert!(text.contains("    bone_B_end.use_connect = True\n"));
        assert!(text.ends_with("if __name__ == '__main__':\n    build()\n"));
    }
}

mod destination {
    use super::*;

    #[test]
    fn test_empty_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = prepare(&two_bone_document());

        let err = session
            .export_to_path(&ScriptExportOptions::default(), "")
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(err.is_io_failure());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("body.py");
        std::fs::write(&target, "stale").unwrap();

        let report = prepare(&two_bone_document())
            .export_to_path(&ScriptExportOptions::default(), &target)
            .unwrap();

        let written = std::fs::read(&target).unwrap();
        assert_eq!(written.len(), report.bytes);
        assert!(written.starts_with(b"# Blender model script"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_exports_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.py");
        let second = dir.path().join("second.py");
        let options = ScriptExportOptions::default();

        prepare(&two_bone_document()).export_to_path(&options, &first).unwrap();
        prepare(&two_bone_document()).export_to_path(&options, &second).unwrap();

        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }
}
