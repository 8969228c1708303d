//! Query interface between the exporter and the host scene graph.

use super::{Action, Armature, Mesh, SceneObject};

/// Name used for the visual scene when the host does not supply one.
pub const DEFAULT_SCENE_NAME: &str = "Scene";

/// Read-only view of a host scene.
///
/// Objects reference their data blocks (meshes, armatures) by name; the
/// lookups below resolve those names. Enumeration order of [`objects`]
/// is preserved in the output document.
///
/// [`objects`]: SceneSource::objects
pub trait SceneSource {
    /// Scene name, used as the visual scene id.
    fn name(&self) -> &str {
        DEFAULT_SCENE_NAME
    }

    /// All objects in native enumeration order.
    fn objects(&self) -> &[SceneObject];

    /// Look up a mesh data block by name.
    fn mesh(&self, name: &str) -> Option<&Mesh>;

    /// Look up an armature data block by name.
    fn armature(&self, name: &str) -> Option<&Armature>;

    /// Animation assigned to an object, if any.
    fn action(&self, object: &str) -> Option<&Action>;

    /// Look up an object by name.
    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects().iter().find(|o| o.name == name)
    }
}
