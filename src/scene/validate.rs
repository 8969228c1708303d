//! Up-front checks on a scene before any document is assembled.
//!
//! These catch the inputs the builders would otherwise turn into broken
//! output (dangling references, out-of-range loops, bone cycles, names
//! that would split into several array tokens).

use std::collections::HashSet;

use super::{Mesh, ObjectKind, SceneSource};
use crate::util::{Error, Result};

/// Names end up in ids, `#id` references and whitespace separated
/// Name arrays, so they must be a single non-empty token.
pub(crate) fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::invalid_name(kind, name));
    }
    Ok(())
}

/// Validate every object reachable from `source`.
pub fn validate_scene<S: SceneSource + ?Sized>(source: &S) -> Result<()> {
    let mut checked_meshes = HashSet::new();
    let mut checked_armatures = HashSet::new();

    validate_name("scene", source.name())?;
    for object in source.objects() {
        validate_name("object", &object.name)?;
        match &object.kind {
            ObjectKind::Mesh(mesh_obj) => {
                let mesh = source
                    .mesh(&mesh_obj.mesh)
                    .ok_or_else(|| Error::MissingMesh(mesh_obj.mesh.clone()))?;
                if checked_meshes.insert(mesh.name.as_str()) {
                    validate_name("mesh", &mesh.name)?;
                    validate_mesh(mesh)?;
                }
                for group in &mesh_obj.vertex_groups {
                    validate_name("vertex group", group)?;
                }
                for skin in &mesh_obj.skins {
                    validate_name("skin modifier", &skin.name)?;
                    let target = source
                        .object(&skin.armature_object)
                        .ok_or_else(|| Error::MissingObject(skin.armature_object.clone()))?;
                    let ObjectKind::Armature(arm_obj) = &target.kind else {
                        return Err(Error::other(format!(
                            "Skin modifier '{}' on '{}' targets '{}', which is not an armature",
                            skin.name, object.name, target.name
                        )));
                    };
                    if source.armature(&arm_obj.armature).is_none() {
                        return Err(Error::MissingArmature(arm_obj.armature.clone()));
                    }
                }
            }
            ObjectKind::Armature(arm_obj) => {
                let armature = source
                    .armature(&arm_obj.armature)
                    .ok_or_else(|| Error::MissingArmature(arm_obj.armature.clone()))?;
                if checked_armatures.insert(armature.name.as_str()) {
                    for bone in &armature.bones {
                        validate_name("bone", &bone.name)?;
                    }
                    armature.validate()?;
                }
                if let Some(action) = source.action(&object.name) {
                    for track in &action.tracks {
                        if let Some(channel) = track.channels.iter().find(|c| !c.is_sorted()) {
                            return Err(Error::InvalidAnimation {
                                object: object.name.clone(),
                                detail: format!(
                                    "{:?} keys of bone '{}' are not in time order",
                                    channel.property, track.bone
                                ),
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Check loop spans and loop vertex indices of one mesh.
pub(crate) fn validate_mesh(mesh: &Mesh) -> Result<()> {
    let num_verts = mesh.vertices.len();
    if let Some((i, &v)) = mesh.loops.iter().enumerate().find(|&(_, &v)| v as usize >= num_verts) {
        return Err(Error::invalid_loop(
            &mesh.name,
            format!("loop {} references vertex {} (vertex count: {})", i, v, num_verts),
        ));
    }
    for (i, polygon) in mesh.polygons.iter().enumerate() {
        if mesh.polygon_loops(polygon).is_none() {
            return Err(Error::invalid_loop(
                &mesh.name,
                format!(
                    "polygon {} spans loops {}..{} (loop count: {})",
                    i,
                    polygon.loop_start,
                    polygon.loop_start as u64 + polygon.loop_total as u64,
                    mesh.loops.len()
                ),
            ));
        }
    }
    Ok(())
}
