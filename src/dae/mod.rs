//! COLLADA document builders.
//!
//! Leaf-first:
//! - [`source`] - typed, strided arrays with their accessor
//! - [`geometry`] - triangulated mesh data
//! - [`skin`] - joints, inverse-bind matrices and vertex weights
//! - [`skeleton`] - joint node trees
//! - [`animation`] - resampled bone transforms
//! - [`visual_scene`] - the object pass tying the libraries together
//! - [`format`] - whitespace pretty-printing
//! - [`document`] - assembly, serialization and file output

pub mod animation;
pub mod document;
pub mod element;
pub mod format;
pub mod geometry;
pub mod skeleton;
pub mod skin;
pub mod source;
pub mod visual_scene;

pub use document::{document_to_string, export_document, export_to_file, write_document};
pub use element::ElementExt;
pub use visual_scene::ExportContext;
