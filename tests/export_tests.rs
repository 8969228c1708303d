//! Integration tests for exporting scenes to COLLADA documents.

use std::collections::HashSet;
use std::fs::File;

use dae_export::dae::element::dangling_references;
use dae_export::dae::format::format_document;
use dae_export::prelude::*;
use glam::{vec3, Mat4, Vec3};
use tempfile::NamedTempFile;
use xmltree::Element;

const RIG_JSON: &str = include_str!("../demos/rig.json");

fn rig_scene() -> Scene {
    Scene::from_json_str(RIG_JSON).expect("Failed to parse sample scene")
}

fn library<'a>(root: &'a Element, name: &str) -> &'a Element {
    root.get_child(name).unwrap_or_else(|| panic!("missing {}", name))
}

fn find_by_id<'a>(root: &'a Element, id: &str) -> &'a Element {
    root.descendants()
        .into_iter()
        .find(|e| e.attr("id") == Some(id))
        .unwrap_or_else(|| panic!("no element with id {}", id))
}

fn text_of(e: &Element) -> String {
    e.get_text().map(|t| t.into_owned()).unwrap_or_default()
}

fn ints(text: &str) -> Vec<u32> {
    text.split_whitespace().map(|t| t.parse().expect("integer token")).collect()
}

#[test]
fn test_single_quad_scenario() {
    let mut scene = Scene::new("Scene");
    scene
        .add_mesh(Mesh::from_faces(
            "Quad",
            &[Vec3::ZERO, Vec3::X, vec3(1.0, 1.0, 0.0), Vec3::Y],
            &[&[0, 1, 2, 3]],
        ))
        .add_object(SceneObject::mesh("Quad", "Quad"));

    let root = export_document(&scene, &ExportOptions::default()).expect("Failed to export");

    let geometries: Vec<_> = library(&root, "library_geometries").child_elements().collect();
    assert_eq!(geometries.len(), 1, "Expected exactly one geometry");
    let mesh = geometries[0].get_child("mesh").expect("geometry without mesh");
    let triangles: Vec<_> = mesh.child_elements().filter(|e| e.name == "triangles").collect();
    assert_eq!(triangles.len(), 1);
    assert_eq!(triangles[0].attr("count"), Some("2"));

    assert_eq!(library(&root, "library_controllers").child_elements().count(), 0);
    assert_eq!(library(&root, "library_animations").child_elements().count(), 0);
}

#[test]
fn test_reference_integrity() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    let dangling = dangling_references(&root);
    assert!(dangling.is_empty(), "Dangling references: {:?}", dangling);

    let mut seen = HashSet::new();
    for e in root.descendants() {
        if let Some(id) = e.attr("id") {
            assert!(seen.insert(id.to_string()), "Duplicate id {}", id);
        }
    }
}

#[test]
fn test_skin_weights() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");

    let controller = find_by_id(&root, "Armature.Strip.skin");
    assert_eq!(controller.attr("name"), Some("Rig"));

    let joints = find_by_id(&root, "Armature.Strip.skin.joints.data");
    assert_eq!(text_of(joints), "Root Tip");

    let weights = find_by_id(&root, "Armature.Strip.skin.weights.data");
    assert_eq!(text_of(weights), "1 0.5", "Weights should be deduplicated");

    let vw = controller
        .get_child("skin")
        .and_then(|s| s.get_child("vertex_weights"))
        .expect("missing vertex_weights");
    assert_eq!(vw.attr("count"), Some("6"));
    let vcount = ints(&text_of(vw.get_child("vcount").expect("missing vcount")));
    let v = ints(&text_of(vw.get_child("v").expect("missing v")));
    assert_eq!(vcount, vec![1, 1, 2, 2, 1, 1]);
    assert_eq!(vcount.iter().sum::<u32>() as usize * 2, v.len());
    assert_eq!(v, vec![0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 1, 0, 1, 0]);
}

#[test]
fn test_inverse_bind_matrices() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    let data = find_by_id(&root, "Armature.Strip.skin.inverse_bind.data");
    assert_eq!(data.attr("count"), Some("32"));
    let values: Vec<f32> = text_of(data).split_whitespace().map(|t| t.parse().unwrap()).collect();
    // Tip rest is one unit up, so its inverse moves one unit down
    assert_eq!(values[16 + 7], -1.0);
}

#[test]
fn test_geometry_streams() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");

    let positions = find_by_id(&root, "StripMesh.geom.positions.data");
    assert_eq!(positions.attr("count"), Some("18"));

    let uvs = find_by_id(&root, "StripMesh.geom.uv.0.data");
    assert_eq!(text_of(uvs), "0 0 1 0 1 0.5 0 0.5 1 1 0 1");

    let geometry = find_by_id(&root, "StripMesh.geom");
    let triangles = geometry
        .get_child("mesh")
        .and_then(|m| m.get_child("triangles"))
        .expect("missing triangles");
    assert_eq!(triangles.attr("count"), Some("4"));
    let p = ints(&text_of(triangles.get_child("p").expect("missing p")));
    assert_eq!(p, vec![0, 0, 1, 0, 2, 0, 0, 0, 2, 0, 3, 0, 3, 1, 2, 1, 4, 1, 3, 1, 4, 1, 5, 1]);
}

#[test]
fn test_bone_nodes_and_skeletons() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");

    let tip = find_by_id(&root, "Rig.Tip");
    assert_eq!(tip.attr("sid"), Some("Tip"));
    assert_eq!(tip.attr("type"), Some("JOINT"));
    let matrix = tip.get_child("matrix").expect("joint without matrix");
    assert_eq!(text_of(matrix), "1 0 0 0 0 1 0 1 0 0 1 0 0 0 0 1");

    // Joint nodes nest under their parent
    let root_bone = find_by_id(&root, "Rig.Root");
    assert!(root_bone.child_elements().any(|e| e.attr("id") == Some("Rig.Tip")));

    let strip = find_by_id(&root, "Strip");
    let skeleton = strip
        .get_child("instance_controller")
        .and_then(|c| c.get_child("skeleton"))
        .expect("missing skeleton");
    assert_eq!(text_of(skeleton), "#Rig.Root");
}

#[test]
fn test_animation_resampled_on_union() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    let anims: Vec<_> = library(&root, "library_animations").child_elements().collect();
    assert_eq!(anims.len(), 1);
    assert_eq!(anims[0].attr("id"), Some("Rig.Tip.anim"));

    let time = find_by_id(&root, "Rig.Tip.anim.time.data");
    assert_eq!(text_of(time), "0 5 10");

    let transform = find_by_id(&root, "Rig.Tip.anim.transform.data");
    assert_eq!(transform.attr("count"), Some("48"));
    let accessor = find_by_id(&root, "Rig.Tip.anim.transform")
        .get_child("technique_common")
        .and_then(|t| t.get_child("accessor"))
        .expect("missing accessor");
    assert_eq!(accessor.attr("count"), Some("3"));
    assert_eq!(accessor.attr("stride"), Some("16"));

    let values: Vec<f32> = text_of(transform).split_whitespace().map(|t| t.parse().unwrap()).collect();
    // First sample: rest offset plus the held translation key
    assert_eq!(values[7], 1.25);

    let channel = anims[0].get_child("channel").expect("missing channel");
    assert_eq!(channel.attr("target"), Some("Rig.Tip/transform"));
}

#[test]
fn test_transpose_option() {
    let transposed = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    let rig = find_by_id(&transposed, "Rig");
    assert_eq!(
        text_of(rig.get_child("matrix").expect("missing matrix")),
        "1 0 0 2 0 1 0 0 0 0 1 0 0 0 0 1"
    );

    let options = ExportOptions { transpose_matrices: false, ..Default::default() };
    let raw = export_document(&rig_scene(), &options).expect("Failed to export");
    let rig = find_by_id(&raw, "Rig");
    assert_eq!(
        text_of(rig.get_child("matrix").expect("missing matrix")),
        "1 0 0 0 0 1 0 0 0 0 1 0 2 0 0 1"
    );
}

#[test]
fn test_format_idempotent_on_document() {
    let mut root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    let once = document_to_string(&root).expect("Failed to serialize");
    format_document(&mut root);
    let twice = document_to_string(&root).expect("Failed to serialize");
    assert_eq!(once, twice);
}

#[test]
fn test_export_to_file() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    export_to_file(&rig_scene(), path, &ExportOptions::default()).expect("Failed to write document");

    let text = std::fs::read_to_string(path).expect("Failed to read back");
    assert!(text.starts_with("<?xml"), "Missing XML declaration");

    let parsed = Element::parse(File::open(path).expect("Failed to open")).expect("Failed to parse");
    assert_eq!(parsed.name, "COLLADA");
    assert_eq!(parsed.attr("version"), Some("1.5.0"));
    let names: Vec<_> = parsed.child_elements().map(|e| e.name.clone()).collect();
    assert_eq!(
        names,
        vec!["library_animations", "library_geometries", "library_controllers", "library_visual_scenes"]
    );
}

#[test]
fn test_options_file() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let options = ExportOptions { time_scale: 0.25, pretty: false, ..Default::default() };
    options.save(temp.path()).expect("Failed to save options");

    let loaded = ExportOptions::load(temp.path()).expect("Failed to load options");
    assert_eq!(loaded, options);

    let root = export_document(&rig_scene(), &loaded).expect("Failed to export");
    assert_eq!(text_of(find_by_id(&root, "Rig.Tip.anim.time.data")), "0 1.25 2.5");
}

#[test]
fn test_bone_cycle_rejected() {
    let mut scene = Scene::new("Scene");
    scene
        .add_armature(Armature::new(
            "Loop",
            vec![
                Bone::new("A", Some("B"), Mat4::IDENTITY),
                Bone::new("B", Some("A"), Mat4::IDENTITY),
            ],
        ))
        .add_object(SceneObject::armature("Rig", "Loop"));

    let err = export_document(&scene, &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, Error::BoneCycle { .. }), "Unexpected error: {}", err);
}

#[test]
fn test_skin_to_missing_object_rejected() {
    let mut scene = rig_scene();
    scene.objects.retain(|o| o.name != "Rig");
    let err = export_document(&scene, &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MissingObject(ref name) if name == "Rig"));
}

#[test]
fn test_whitespace_bone_name_rejected() {
    let mut scene = rig_scene();
    let armature = scene.armatures.iter_mut().find(|a| a.name == "RigData").expect("missing armature");
    armature.bones[1].name = "Upper Arm".to_string();

    let err = export_document(&scene, &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidName { kind: "bone", .. }), "Unexpected error: {}", err);
}

#[test]
fn test_name_arrays_count_matches_tokens() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    for array in root.descendants().into_iter().filter(|e| e.name == "Name_array") {
        let tokens = text_of(array).split_whitespace().count();
        assert_eq!(array.attr("count"), Some(tokens.to_string().as_str()), "Bad count on {:?}", array.attr("id"));
    }
}

#[test]
fn test_bind_shape_uses_armature_object() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    let skin = find_by_id(&root, "Armature.Strip.skin").get_child("skin").expect("missing skin");
    let bind_shape = skin.get_child("bind_shape_matrix").expect("missing bind_shape_matrix");
    // The Rig object sits at x = 2
    assert_eq!(text_of(bind_shape), "1 0 0 2 0 1 0 0 0 0 1 0 0 0 0 1");
}

#[test]
fn test_nodes_carry_object_type() {
    let root = export_document(&rig_scene(), &ExportOptions::default()).expect("Failed to export");
    assert_eq!(find_by_id(&root, "Strip").attr("obj_type"), Some("MESH"));
    assert_eq!(find_by_id(&root, "Rig").attr("obj_type"), Some("ARMATURE"));
}
