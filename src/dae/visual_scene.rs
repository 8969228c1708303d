//! Scene Assembler: the single pass over scene objects that builds the
//! `<visual_scene>` and records what the later library passes consume.

use xmltree::Element;

use super::element::{fragment, matrix_element, ElementExt};
use super::geometry::geometry_id;
use super::skeleton::{build_joint_tree, joint_id};
use super::skin::SkinBinding;
use crate::options::ExportOptions;
use crate::scene::{Armature, Mesh, ObjectKind, SceneObject, SceneSource};
use crate::util::{format_matrix, Error, Result};

/// State threaded from the visual-scene pass into the library passes.
#[derive(Debug, Default)]
pub struct ExportContext<'s> {
    /// Instanced meshes, deduplicated by name, in first-instance order.
    pub meshes: Vec<&'s Mesh>,
    /// Skin bindings in object order, then modifier order.
    pub skins: Vec<SkinBinding<'s>>,
    /// Armature objects with their armature data, in object order.
    pub armatures: Vec<(&'s SceneObject, &'s Armature)>,
}

impl<'s> ExportContext<'s> {
    fn register_mesh(&mut self, mesh: &'s Mesh) {
        if !self.meshes.iter().any(|m| m.name == mesh.name) {
            self.meshes.push(mesh);
        }
    }
}

/// Armature object and armature data a skin modifier points at.
fn resolve_skin_target<'s, S: SceneSource + ?Sized>(
    source: &'s S,
    object: &SceneObject,
    modifier: &str,
    target: &str,
) -> Result<(&'s SceneObject, &'s Armature)> {
    let target_obj = source.object(target).ok_or_else(|| Error::MissingObject(target.to_string()))?;
    let ObjectKind::Armature(arm_obj) = &target_obj.kind else {
        return Err(Error::other(format!(
            "Skin modifier '{}' on '{}' targets '{}', which is not an armature",
            modifier, object.name, target
        )));
    };
    let armature = source
        .armature(&arm_obj.armature)
        .ok_or_else(|| Error::MissingArmature(arm_obj.armature.clone()))?;
    Ok((target_obj, armature))
}

/// Build `<visual_scene>` and the context for the library passes.
///
/// Objects are visited in native order. Each becomes a flat `NODE` with
/// its world matrix; mesh objects instance their geometry and one
/// controller per skin modifier, armature objects carry their joint tree.
#[tracing::instrument(skip_all, fields(scene = %source.name()))]
pub fn build_visual_scene<'s, S: SceneSource + ?Sized>(
    source: &'s S,
    options: &ExportOptions,
) -> Result<(Element, ExportContext<'s>)> {
    let mut ctx = ExportContext::default();
    let mut scene = Element::new("visual_scene")
        .with_attr("id", source.name())
        .with_attr("name", source.name());

    for object in source.objects() {
        let mut node = Element::new("node")
            .with_attr("id", &object.name)
            .with_attr("name", &object.name)
            .with_attr("type", "NODE")
            .with_attr("obj_type", object.type_name())
            .with_child(matrix_element(
                "transform",
                format_matrix(&object.matrix_world, options.transpose_matrices),
            ));

        match &object.kind {
            ObjectKind::Mesh(mesh_object) => {
                let mesh = source
                    .mesh(&mesh_object.mesh)
                    .ok_or_else(|| Error::MissingMesh(mesh_object.mesh.clone()))?;
                ctx.register_mesh(mesh);
                node.push(Element::new("instance_geometry").with_attr("url", fragment(&geometry_id(&mesh.name))));

                for modifier in &mesh_object.skins {
                    let (armature_object, armature) =
                        resolve_skin_target(source, object, &modifier.name, &modifier.armature_object)?;
                    let binding = SkinBinding { object, mesh_object, mesh, modifier, armature_object, armature };

                    let mut instance = Element::new("instance_controller").with_attr("url", fragment(&binding.id()));
                    for root in armature.roots() {
                        instance.push(
                            Element::new("skeleton").with_text(fragment(&joint_id(&armature_object.name, &root.name))),
                        );
                    }
                    node.push(instance);
                    ctx.skins.push(binding);
                }
            }
            ObjectKind::Armature(arm_object) => {
                let armature = source
                    .armature(&arm_object.armature)
                    .ok_or_else(|| Error::MissingArmature(arm_object.armature.clone()))?;
                let tree = build_joint_tree(&object.name, armature, options);
                tracing::debug!(bones = tree.visit_order.len(), "walked armature '{}'", object.name);
                for root in tree.roots {
                    node.push(root);
                }
                ctx.armatures.push((object, armature));
            }
        }

        scene.push(node);
    }

    tracing::debug!(
        meshes = ctx.meshes.len(),
        skins = ctx.skins.len(),
        armatures = ctx.armatures.len(),
        "built visual scene"
    );
    Ok((scene, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bone, Scene};
    use glam::{vec3, Mat4, Vec3};

    fn skinned_scene() -> Scene {
        let quad = Mesh::from_faces(
            "Body",
            &[Vec3::ZERO, Vec3::X, vec3(1.0, 1.0, 0.0), Vec3::Y],
            &[&[0, 1, 2, 3]],
        );
        let rig = Armature::new(
            "RigData",
            vec![
                Bone::new("Hip", None, Mat4::IDENTITY),
                Bone::new("Spine", Some("Hip"), Mat4::from_translation(Vec3::Y)),
                Bone::new("Prop", None, Mat4::IDENTITY),
            ],
        );
        let mut scene = Scene::new("Scene");
        scene
            .add_mesh(quad)
            .add_armature(rig)
            .add_object(
                SceneObject::mesh("BodyA", "Body")
                    .with_vertex_groups(["Hip"])
                    .with_skin("Armature", "Rig"),
            )
            .add_object(SceneObject::mesh("BodyB", "Body"))
            .add_object(SceneObject::armature("Rig", "RigData"));
        scene
    }

    #[test]
    fn test_nodes_in_object_order() {
        let scene = skinned_scene();
        let (vs, _) = build_visual_scene(&scene, &ExportOptions::default()).unwrap();
        assert_eq!(vs.attr("id"), Some("Scene"));
        let ids: Vec<_> = vs.child_elements().map(|n| n.attr("id").unwrap()).collect();
        assert_eq!(ids, vec!["BodyA", "BodyB", "Rig"]);
        for node in vs.child_elements() {
            let first = node.child_elements().next().unwrap();
            assert_eq!(first.name, "matrix");
            assert_eq!(first.attr("sid"), Some("transform"));
        }
        let types: Vec<_> = vs.child_elements().map(|n| n.attr("obj_type").unwrap()).collect();
        assert_eq!(types, vec!["MESH", "MESH", "ARMATURE"]);
    }

    #[test]
    fn test_mesh_registered_once() {
        let scene = skinned_scene();
        let (_, ctx) = build_visual_scene(&scene, &ExportOptions::default()).unwrap();
        assert_eq!(ctx.meshes.len(), 1);
        assert_eq!(ctx.skins.len(), 1);
        assert_eq!(ctx.skins[0].id(), "Armature.BodyA.skin");
        assert_eq!(ctx.armatures.len(), 1);
    }

    #[test]
    fn test_instance_controller_skeletons() {
        let scene = skinned_scene();
        let (vs, _) = build_visual_scene(&scene, &ExportOptions::default()).unwrap();
        let body = vs.child_elements().next().unwrap();
        assert_eq!(body.get_child("instance_geometry").unwrap().attr("url"), Some("#Body.geom"));

        let ctrl = body.get_child("instance_controller").unwrap();
        assert_eq!(ctrl.attr("url"), Some("#Armature.BodyA.skin"));
        let skeletons: Vec<_> = ctrl
            .child_elements()
            .map(|s| s.get_text().unwrap_or_default().into_owned())
            .collect();
        assert_eq!(skeletons, vec!["#Rig.Hip", "#Rig.Prop"]);
    }

    #[test]
    fn test_armature_node_holds_joints() {
        let scene = skinned_scene();
        let (vs, _) = build_visual_scene(&scene, &ExportOptions::default()).unwrap();
        let rig = vs.child_elements().nth(2).unwrap();
        let joints: Vec<_> = rig
            .child_elements()
            .filter(|e| e.name == "node")
            .map(|e| e.attr("id").unwrap())
            .collect();
        assert_eq!(joints, vec!["Rig.Hip", "Rig.Prop"]);
    }

    #[test]
    fn test_skin_target_must_be_armature() {
        let mut scene = skinned_scene();
        scene.objects[0] = SceneObject::mesh("BodyA", "Body").with_skin("Armature", "BodyB");
        let err = build_visual_scene(&scene, &ExportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("not an armature"));
    }
}
