//! Export configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Where skin joint names come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointSource {
    /// The mesh object's vertex group names; group index = joint index.
    #[default]
    VertexGroups,
    /// The armature's bones; vertex groups are matched to bones by name.
    Bones,
}

/// Which object transform becomes the skin's bind-shape matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindShapeSpace {
    /// World transform of the armature object driving the skin.
    #[default]
    Armature,
    /// World transform of the skinned mesh object.
    World,
    /// Parent-relative transform of the skinned mesh object.
    Local,
}

/// Options controlling one export pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Transpose matrices before flattening (row-major output).
    pub transpose_matrices: bool,
    pub joint_source: JointSource,
    pub bind_shape_space: BindShapeSpace,
    /// Also write an `inverse_bind` matrix on every joint node.
    pub bone_inverse_bind: bool,
    /// Factor applied to keyframe times in TIME arrays.
    pub time_scale: f32,
    /// Indent the document with tabs.
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            transpose_matrices: true,
            joint_source: JointSource::VertexGroups,
            bind_shape_space: BindShapeSpace::Armature,
            bone_inverse_bind: false,
            time_scale: 1.0,
            pretty: true,
        }
    }
}

impl ExportOptions {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Save options as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
