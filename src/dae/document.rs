//! Document assembly and serialization.
//!
//! [`export_document`] is the core entry point: validate the scene, run
//! the visual-scene pass, build the libraries that pass registered, check
//! every `#id` reference and pretty-print. The remaining functions are
//! the thin byte-level wrapper around the finished tree.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use xmltree::{Element, EmitterConfig};

use super::animation::build_armature_animations;
use super::element::{check_references, ElementExt};
use super::format::format_document;
use super::geometry::build_geometry;
use super::skin::build_controller;
use super::visual_scene::{build_visual_scene, ExportContext};
use crate::options::ExportOptions;
use crate::scene::{validate_scene, SceneSource};
use crate::util::{Error, Result};

pub const COLLADA_NAMESPACE: &str = "http://www.collada.org/2005/11/COLLADASchema";
pub const COLLADA_VERSION: &str = "1.5.0";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Library element names in document order.
pub const LIBRARY_ORDER: [&str; 4] = [
    "library_animations",
    "library_geometries",
    "library_controllers",
    "library_visual_scenes",
];

/// `<library_geometries>` for every mesh the visual scene instanced.
pub fn build_library_geometries(ctx: &ExportContext<'_>) -> Result<Element> {
    let mut library = Element::new("library_geometries");
    for mesh in &ctx.meshes {
        library.push(build_geometry(mesh)?);
    }
    Ok(library)
}

/// `<library_controllers>` for every registered skin binding.
pub fn build_library_controllers(ctx: &ExportContext<'_>, options: &ExportOptions) -> Result<Element> {
    let mut library = Element::new("library_controllers");
    for binding in &ctx.skins {
        library.push(build_controller(binding, options)?);
    }
    Ok(library)
}

/// `<library_animations>` for every armature object with an action.
pub fn build_library_animations<S: SceneSource + ?Sized>(
    source: &S,
    ctx: &ExportContext<'_>,
    options: &ExportOptions,
) -> Result<Element> {
    let mut library = Element::new("library_animations");
    for (object, armature) in &ctx.armatures {
        let Some(action) = source.action(&object.name) else {
            continue;
        };
        for anim in build_armature_animations(&object.name, armature, &action.tracks, options)? {
            library.push(anim);
        }
    }
    Ok(library)
}

/// Build the complete `<COLLADA>` tree for a scene.
///
/// Any error aborts the export; no partial tree is returned.
#[tracing::instrument(skip_all, fields(scene = %source.name()))]
pub fn export_document<S: SceneSource + ?Sized>(source: &S, options: &ExportOptions) -> Result<Element> {
    validate_scene(source)?;

    // The visual scene pass registers what the library passes emit
    let (visual_scene, ctx) = build_visual_scene(source, options)?;
    let geometries = build_library_geometries(&ctx)?;
    let controllers = build_library_controllers(&ctx, options)?;
    let animations = build_library_animations(source, &ctx, options)?;

    let num_animations = animations.child_elements().count();
    let mut root = Element::new("COLLADA")
        .with_attr("xmlns", COLLADA_NAMESPACE)
        .with_attr("version", COLLADA_VERSION)
        .with_attr("xmlns:xsi", XSI_NAMESPACE)
        .with_child(animations)
        .with_child(geometries)
        .with_child(controllers)
        .with_child(Element::new("library_visual_scenes").with_child(visual_scene));

    check_references(&root)?;
    if options.pretty {
        format_document(&mut root);
    }

    tracing::info!(
        objects = source.objects().len(),
        geometries = ctx.meshes.len(),
        controllers = ctx.skins.len(),
        animations = num_animations,
        "exported scene '{}'",
        source.name()
    );
    Ok(root)
}

fn emitter_config() -> EmitterConfig {
    EmitterConfig::new()
        .perform_indent(false)
        .write_document_declaration(true)
}

/// Serialize a document to UTF-8 text with an XML declaration.
pub fn document_to_string(root: &Element) -> Result<String> {
    let mut buf = Vec::new();
    root.write_with_config(&mut buf, emitter_config())?;
    String::from_utf8(buf).map_err(|e| Error::other(format!("Document is not valid UTF-8: {}", e)))
}

/// Write a document to `path` with an XML declaration.
pub fn write_document(root: &Element, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    root.write_with_config(&mut writer, emitter_config())?;
    writer.flush()?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

/// Export a scene straight to a file.
pub fn export_to_file<S: SceneSource + ?Sized>(
    source: &S,
    path: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<()> {
    let root = export_document(source, options)?;
    write_document(&root, path)
}
