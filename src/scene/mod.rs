//! Read-only scene graph consumed by the exporter.
//!
//! The exporter never owns or mutates the host scene. It reads it through
//! [`SceneSource`]; [`Scene`] is an owned implementation that can be built
//! in code or loaded from a JSON dump.

mod anim;
mod armature;
mod memory;
mod mesh;
mod object;
mod traits;
mod validate;

pub use anim::*;
pub use armature::*;
pub use memory::*;
pub use mesh::*;
pub use object::*;
pub use traits::*;
pub use validate::validate_scene;
