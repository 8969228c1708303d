//! `<controller>` blocks: joint names, inverse-bind matrices and the
//! deduplicated vertex-weight table of one skinned mesh.

use std::collections::HashMap;

use glam::Mat4;
use xmltree::Element;

use super::element::{fragment, input, ElementExt};
use super::geometry::geometry_id;
use super::source::{build_source, SourceData, JOINT, TRANSFORM, WEIGHT};
use crate::options::{BindShapeSpace, ExportOptions, JointSource};
use crate::scene::{Armature, Mesh, MeshObject, SceneObject, SkinModifier};
use crate::util::{flatten_matrix, format_ints, format_matrix, Error, Result};

/// Id of the controller for a modifier on an object.
pub fn controller_id(modifier: &str, object: &str) -> String {
    format!("{}.{}.skin", modifier, object)
}

/// Everything the controller pass needs about one skin binding.
#[derive(Clone, Copy, Debug)]
pub struct SkinBinding<'s> {
    pub object: &'s SceneObject,
    pub mesh_object: &'s MeshObject,
    pub mesh: &'s Mesh,
    pub modifier: &'s SkinModifier,
    pub armature_object: &'s SceneObject,
    pub armature: &'s Armature,
}

impl SkinBinding<'_> {
    pub fn id(&self) -> String {
        controller_id(&self.modifier.name, &self.object.name)
    }
}

/// Joint list of a skin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Joints {
    pub names: Vec<String>,
    /// Inverse-bind matrix per joint, same order as `names`.
    pub inverse_bind: Vec<Mat4>,
    /// Vertex group index -> joint index. `None` drops the membership.
    pub group_map: Vec<Option<u32>>,
}

/// Resolve joint names and inverse-bind matrices for a binding.
pub fn resolve_joints(mesh_object: &MeshObject, armature: &Armature, source: JointSource) -> Joints {
    let inverse_bind_of = |name: &str| {
        armature
            .bone(name)
            .map(|b| armature.inverse_bind_matrix(b))
            .unwrap_or(Mat4::IDENTITY)
    };

    match source {
        JointSource::VertexGroups => Joints {
            names: mesh_object.vertex_groups.clone(),
            inverse_bind: mesh_object.vertex_groups.iter().map(|g| inverse_bind_of(g.as_str())).collect(),
            group_map: (0..mesh_object.vertex_groups.len() as u32).map(Some).collect(),
        },
        JointSource::Bones => {
            let names: Vec<String> = armature.bones.iter().map(|b| b.name.clone()).collect();
            let group_map = mesh_object
                .vertex_groups
                .iter()
                .map(|g| names.iter().position(|n| n == g).map(|i| i as u32))
                .collect();
            Joints {
                inverse_bind: armature.bones.iter().map(|b| armature.inverse_bind_matrix(b)).collect(),
                names,
                group_map,
            }
        }
    }
}

/// Weight values interned by exact value.
#[derive(Debug, Default)]
pub struct WeightTable {
    values: Vec<f32>,
    index: HashMap<u32, u32>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `weight`, adding it on first sight.
    pub fn intern(&mut self, weight: f32) -> u32 {
        // -0.0 and 0.0 are the same weight
        let weight = if weight == 0.0 { 0.0 } else { weight };
        let values = &mut self.values;
        *self.index.entry(weight.to_bits()).or_insert_with(|| {
            values.push(weight);
            (values.len() - 1) as u32
        })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Flattened per-vertex influences.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexWeights {
    /// Distinct weight values.
    pub weights: Vec<f32>,
    /// Influence count per vertex, in vertex order.
    pub vcount: Vec<u32>,
    /// Interleaved `(joint index, weight index)` pairs.
    pub v: Vec<u32>,
}

/// Flatten vertex group memberships into `vcount`/`v` with a shared
/// weight table.
///
/// Groups are mapped through `joints.group_map`; memberships mapping to
/// `None` are dropped. A group index past the map is an error.
pub fn flatten_vertex_weights(mesh: &Mesh, joints: &Joints) -> Result<VertexWeights> {
    let mut table = WeightTable::new();
    let mut vcount = Vec::with_capacity(mesh.vertices.len());
    let mut v = Vec::with_capacity(mesh.num_group_memberships() * 2);

    for (vi, vertex) in mesh.vertices.iter().enumerate() {
        let mut count = 0u32;
        for gw in &vertex.groups {
            let joint = joints.group_map.get(gw.group as usize).ok_or_else(|| Error::InvalidGroupIndex {
                mesh: mesh.name.clone(),
                vertex: vi,
                group: gw.group,
                joints: joints.group_map.len(),
            })?;
            if let Some(joint) = *joint {
                v.push(joint);
                v.push(table.intern(gw.weight));
                count += 1;
            }
        }
        vcount.push(count);
    }

    Ok(VertexWeights { weights: table.into_values(), vcount, v })
}

/// Build the `<controller>` element for one skin binding.
#[tracing::instrument(skip_all, fields(controller = %binding.id()))]
pub fn build_controller(binding: &SkinBinding<'_>, options: &ExportOptions) -> Result<Element> {
    let id = binding.id();
    let joints = resolve_joints(binding.mesh_object, binding.armature, options.joint_source);
    let weights = flatten_vertex_weights(binding.mesh, &joints)?;

    let bind_shape = match options.bind_shape_space {
        BindShapeSpace::Armature => binding.armature_object.matrix_world,
        BindShapeSpace::World => binding.object.matrix_world,
        BindShapeSpace::Local => binding.object.local_matrix(),
    };

    let mut skin = Element::new("skin")
        .with_attr("source", fragment(&geometry_id(&binding.mesh.name)))
        .with_child(
            Element::new("bind_shape_matrix").with_text(format_matrix(&bind_shape, options.transpose_matrices)),
        );

    let joints_id = format!("{}.joints", id);
    build_source(&mut skin, &joints_id, SourceData::Names(&joints.names), &JOINT)?;

    let inverse_bind_id = format!("{}.inverse_bind", id);
    let inverse_bind: Vec<f32> = joints
        .inverse_bind
        .iter()
        .flat_map(|m| flatten_matrix(m, options.transpose_matrices))
        .collect();
    build_source(&mut skin, &inverse_bind_id, SourceData::Floats(&inverse_bind), &TRANSFORM)?;

    let weights_id = format!("{}.weights", id);
    build_source(&mut skin, &weights_id, SourceData::Floats(&weights.weights), &WEIGHT)?;

    skin.push(
        Element::new("joints")
            .with_child(input("JOINT", &joints_id, None))
            .with_child(input("INV_BIND_MATRIX", &inverse_bind_id, None)),
    );
    skin.push(
        Element::new("vertex_weights")
            .with_attr("count", binding.mesh.vertices.len())
            .with_child(input("JOINT", &joints_id, Some(0)))
            .with_child(input("WEIGHT", &weights_id, Some(1)))
            .with_child(Element::new("vcount").with_text(format_ints(&weights.vcount)))
            .with_child(Element::new("v").with_text(format_ints(&weights.v))),
    );

    tracing::debug!(
        joints = joints.names.len(),
        weights = weights.weights.len(),
        "built controller for mesh '{}'",
        binding.mesh.name
    );

    Ok(Element::new("controller")
        .with_attr("id", &id)
        .with_attr("name", &binding.armature_object.name)
        .with_child(skin))
}
