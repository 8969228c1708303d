//! Owned in-memory scene, loadable from a JSON dump.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::traits::DEFAULT_SCENE_NAME;
use super::{Action, Armature, Mesh, SceneObject, SceneSource};
use crate::util::{Error, Result};

fn default_scene_name() -> String {
    DEFAULT_SCENE_NAME.to_string()
}

/// A self-contained scene snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_scene_name")]
    pub name: String,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub armatures: Vec<Armature>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_NAME)
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            meshes: Vec::new(),
            armatures: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Parse a scene from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check references, loop spans, bone links and key order.
    pub fn validate(&self) -> Result<()> {
        super::validate_scene(self)
    }

    pub fn add_object(&mut self, object: SceneObject) -> &mut Self {
        self.objects.push(object);
        self
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> &mut Self {
        self.meshes.push(mesh);
        self
    }

    pub fn add_armature(&mut self, armature: Armature) -> &mut Self {
        self.armatures.push(armature);
        self
    }

    pub fn add_action(&mut self, action: Action) -> &mut Self {
        self.actions.push(action);
        self
    }
}

impl SceneSource for Scene {
    fn name(&self) -> &str {
        &self.name
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    fn armature(&self, name: &str) -> Option<&Armature> {
        self.armatures.iter().find(|a| a.name == name)
    }

    fn action(&self, object: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.object == object)
    }
}
