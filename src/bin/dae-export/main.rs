//! dae-export CLI - Convert JSON scene dumps to COLLADA and inspect them.

use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use dae_export::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "DAE_EXPORT_LOG";

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("dae-export");

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "warn",
            "-V" | "--version" => {
                println!("dae-export {} ({})", env!("CARGO_PKG_VERSION"), env!("DAE_EXPORT_BUILD_DATE"));
                return;
            }
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_usage(prog);
        return;
    }

    let result = match filtered_args[0] {
        "export" | "e" => cmd_export(&filtered_args[1..]),
        "info" | "i" => single_path(&filtered_args[1..], "info <scene.json>").and_then(cmd_info),
        "tree" | "t" => single_path(&filtered_args[1..], "tree <scene.json>").and_then(cmd_tree),
        "help" | "h" | "-h" | "--help" => {
            print_usage(prog);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(prog);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(prog: &str) {
    println!("dae-export - Convert scene dumps to COLLADA documents");
    println!();
    println!("Usage: {} [options] <command> ...", prog);
    println!();
    println!("Commands:");
    println!("  e, export <scene.json> <out.dae> [--config <options.json>]");
    println!("                 Export a scene to a .dae file");
    println!("  i, info <scene.json>   Show object, mesh, armature and action counts");
    println!("  t, tree <scene.json>   Show objects with their bone hierarchies");
    println!("  h, help        Show this help");
    println!();
    println!("Options:");
    println!("  -v, --verbose  Debug output");
    println!("  -vv, --trace   Trace output (very verbose)");
    println!("  -q, --quiet    Warnings and errors only");
    println!("  -V, --version  Show version and build date");
    println!();
    println!("The {} environment variable overrides the log filter.", LOG_ENV);
}

fn single_path<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    match args {
        &[path] => Ok(path),
        _ => bail!("usage: dae-export {}", usage),
    }
}

fn load_scene(path: &str) -> Result<Scene> {
    tracing::info!("Loading scene: {}", path);
    Scene::load(path).with_context(|| format!("failed to load scene {}", path))
}

fn cmd_export(args: &[&str]) -> Result<()> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        match arg {
            "-c" | "--config" => {
                let path = iter.next().context("--config needs a path")?;
                config = Some(*path);
            }
            _ => positional.push(arg),
        }
    }
    let [input, output] = positional[..] else {
        bail!("usage: dae-export export <scene.json> <out.dae> [--config <options.json>]");
    };

    let options = match config {
        Some(path) => {
            ExportOptions::load(path).with_context(|| format!("failed to load export options {}", path))?
        }
        None => ExportOptions::default(),
    };
    tracing::debug!(?options, "export options");

    let scene = load_scene(input)?;
    export_to_file(&scene, output, &options).with_context(|| format!("failed to export {}", input))?;

    tracing::info!("Wrote {}", Path::new(output).display());
    Ok(())
}

fn cmd_info(path: &str) -> Result<()> {
    let scene = load_scene(path)?;

    let num_vertices: usize = scene.meshes.iter().map(|m| m.vertices.len()).sum();
    let num_polygons: usize = scene.meshes.iter().map(|m| m.polygons.len()).sum();
    let num_bones: usize = scene.armatures.iter().map(|a| a.bones.len()).sum();
    let num_tracks: usize = scene.actions.iter().map(|a| a.tracks.len()).sum();
    let num_keys: usize = scene
        .actions
        .iter()
        .flat_map(|a| &a.tracks)
        .flat_map(|t| &t.channels)
        .map(|c| c.keyframes.len())
        .sum();
    let num_skins: usize = scene
        .objects
        .iter()
        .map(|o| match &o.kind {
            ObjectKind::Mesh(m) => m.skins.len(),
            ObjectKind::Armature(_) => 0,
        })
        .sum();

    println!("Scene: {}", scene.name);
    println!();
    println!("Objects:   {}", scene.objects.len());
    println!("Meshes:    {} ({} vertices, {} polygons)", scene.meshes.len(), num_vertices, num_polygons);
    println!("Skins:     {}", num_skins);
    println!("Armatures: {} ({} bones)", scene.armatures.len(), num_bones);
    println!("Actions:   {} ({} tracks, {} keys)", scene.actions.len(), num_tracks, num_keys);

    if let Err(e) = scene.validate() {
        println!();
        println!("Invalid: {}", e);
    }
    Ok(())
}

fn cmd_tree(path: &str) -> Result<()> {
    let scene = load_scene(path)?;
    println!("Scene: {}", scene.name);

    for object in &scene.objects {
        println!("  {} [{}]", object.name, object.type_name());
        match &object.kind {
            ObjectKind::Mesh(mesh_obj) => {
                println!("    mesh: {}", mesh_obj.mesh);
                for skin in &mesh_obj.skins {
                    println!("    skin: {} -> {}", skin.name, skin.armature_object);
                }
            }
            ObjectKind::Armature(arm_obj) => {
                let Some(armature) = scene.armature(&arm_obj.armature) else {
                    println!("    armature: {} (missing)", arm_obj.armature);
                    continue;
                };
                // Parent cycles would never end the walk below
                armature.validate()?;
                print_bones(armature);
            }
        }
    }
    Ok(())
}

fn print_bones(armature: &Armature) {
    let mut stack: Vec<(&Bone, usize)> = armature.roots().map(|b| (b, 0)).collect();
    stack.reverse();
    while let Some((bone, depth)) = stack.pop() {
        println!("    {}{}", "  ".repeat(depth), bone.name);
        let children: Vec<&Bone> = armature.children(&bone.name).collect();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
}
