//! # dae-export
//!
//! Flattens an in-memory scene graph (meshes, armatures, skin bindings and
//! keyframed bone animation) into a COLLADA 1.5 document.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports and the matrix/number codec
//! - [`scene`] - Read-only scene model and the [`SceneSource`] trait
//! - [`options`] - Export settings
//! - [`dae`] - Document builders, formatter and file output
//!
//! ## Example
//!
//! ```ignore
//! use dae_export::prelude::*;
//!
//! let scene = Scene::load("scene.json")?;
//! export_to_file(&scene, "scene.dae", &ExportOptions::default())?;
//! ```

pub mod dae;
pub mod options;
pub mod scene;
pub mod util;

// Re-export commonly used types
pub use dae::{document_to_string, export_document, export_to_file, write_document};
pub use options::ExportOptions;
pub use scene::{Scene, SceneSource};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dae::{document_to_string, export_document, export_to_file, write_document, ElementExt};
    pub use crate::options::{BindShapeSpace, ExportOptions, JointSource};
    pub use crate::scene::*;
    pub use crate::util::{Error, Result};
}
