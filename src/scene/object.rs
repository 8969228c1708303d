//! Scene objects.
//!
//! An object is a named, placed instance of a data block. The data it
//! carries depends on its kind, so kinds are a tagged union rather than
//! a type string.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// A placed object in the scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    /// World transform.
    #[serde(default)]
    pub matrix_world: Mat4,
    /// Parent-relative transform; defaults to the world transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_local: Option<Mat4>,
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Create a mesh object instancing `mesh`.
    pub fn mesh(name: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix_world: Mat4::IDENTITY,
            matrix_local: None,
            kind: ObjectKind::Mesh(MeshObject {
                mesh: mesh.into(),
                vertex_groups: Vec::new(),
                skins: Vec::new(),
            }),
        }
    }

    /// Create an armature object instancing `armature`.
    pub fn armature(name: impl Into<String>, armature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix_world: Mat4::IDENTITY,
            matrix_local: None,
            kind: ObjectKind::Armature(ArmatureObject { armature: armature.into() }),
        }
    }

    /// Set the world transform.
    pub fn with_matrix(mut self, matrix_world: Mat4) -> Self {
        self.matrix_world = matrix_world;
        self
    }

    /// Set vertex group names (mesh objects only).
    pub fn with_vertex_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ObjectKind::Mesh(mesh) = &mut self.kind {
            mesh.vertex_groups = groups.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Attach a skin modifier bound to `armature_object` (mesh objects only).
    pub fn with_skin(mut self, modifier: impl Into<String>, armature_object: impl Into<String>) -> Self {
        if let ObjectKind::Mesh(mesh) = &mut self.kind {
            mesh.skins.push(SkinModifier {
                name: modifier.into(),
                armature_object: armature_object.into(),
            });
        }
        self
    }

    /// Parent-relative transform, falling back to the world transform.
    pub fn local_matrix(&self) -> Mat4 {
        self.matrix_local.unwrap_or(self.matrix_world)
    }

    /// Short type tag, as shown by the CLI.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ObjectKind::Mesh(_) => "MESH",
            ObjectKind::Armature(_) => "ARMATURE",
        }
    }
}

/// Kind-specific object data.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Mesh(MeshObject),
    Armature(ArmatureObject),
}

/// Mesh instance with its vertex groups and skin modifiers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshObject {
    /// Mesh data block name.
    pub mesh: String,
    /// Vertex group names; `GroupWeight::group` indexes this list.
    #[serde(default)]
    pub vertex_groups: Vec<String>,
    #[serde(default)]
    pub skins: Vec<SkinModifier>,
}

/// Armature instance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ArmatureObject {
    /// Armature data block name.
    pub armature: String,
}

/// Binds a mesh object to an armature object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkinModifier {
    pub name: String,
    /// Name of the armature *object* driving the skin.
    pub armature_object: String,
}
