//! `<geometry>` blocks: positions, per-vertex UVs, face normals and a
//! triangle index stream.

use glam::{Vec2, Vec3};
use smallvec::{smallvec, SmallVec};
use xmltree::Element;

use super::element::{fragment, input, ElementExt};
use super::source::{build_source, SourceData, ST, XYZ};
use crate::scene::{Mesh, UvLayer};
use crate::util::{format_ints, Error, Result};

/// Id of the geometry emitted for a mesh data block.
pub fn geometry_id(mesh_name: &str) -> String {
    format!("{}.geom", mesh_name)
}

/// Triangulated polygon list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    /// Interleaved `(vertex index, normal index)` pairs, three per triangle.
    pub indices: Vec<u32>,
    /// One face normal per source polygon, in polygon order.
    pub normals: Vec<Vec3>,
}

impl Triangulation {
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 6
    }
}

/// Split triangles and quads into a triangle stream.
///
/// A quad `(L0, L1, L2, L3)` becomes `(L0, L1, L2)` then `(L0, L2, L3)`.
/// Every vertex entry of a polygon's triangles carries that polygon's
/// normal index. Any other loop count is an error.
pub fn triangulate(mesh: &Mesh) -> Result<Triangulation> {
    let mut tri = Triangulation {
        indices: Vec::with_capacity(mesh.polygons.len() * 12),
        normals: Vec::with_capacity(mesh.polygons.len()),
    };

    for (pi, polygon) in mesh.polygons.iter().enumerate() {
        let range = mesh.polygon_loops(polygon).ok_or_else(|| {
            Error::invalid_loop(&mesh.name, format!("polygon {} spans loops outside the loop list", pi))
        })?;
        let n = tri.normals.len() as u32;
        let corners: SmallVec<[u32; 6]> = match mesh.loops[range] {
            [a, b, c] => smallvec![a, b, c],
            [a, b, c, d] => smallvec![a, b, c, a, c, d],
            ref other => {
                return Err(Error::UnsupportedPolygon {
                    mesh: mesh.name.clone(),
                    polygon: pi,
                    loops: other.len(),
                })
            }
        };
        for v in corners {
            tri.indices.extend_from_slice(&[v, n]);
        }
        tri.normals.push(polygon.normal);
    }
    Ok(tri)
}

/// Scatter a per-loop UV layer into a per-vertex table.
///
/// Vertices no loop of the layer touches keep `(0, 0)`. When several
/// loops share a vertex the last one wins.
pub fn uv_table(mesh: &Mesh, layer: &UvLayer) -> Vec<Vec2> {
    let mut table = vec![Vec2::ZERO; mesh.vertices.len()];
    for (uv, &v) in layer.uvs.iter().zip(&mesh.loops) {
        if let Some(slot) = table.get_mut(v as usize) {
            *slot = *uv;
        }
    }
    table
}

/// Build the `<geometry>` element for one mesh.
#[tracing::instrument(skip_all, fields(mesh = %mesh.name))]
pub fn build_geometry(mesh: &Mesh) -> Result<Element> {
    let geom_id = geometry_id(&mesh.name);
    let tri = triangulate(mesh)?;

    let mut mesh_el = Element::new("mesh");

    // Positions
    let positions_id = format!("{}.positions", geom_id);
    let positions: Vec<f32> = mesh.vertices.iter().flat_map(|v| v.co.to_array()).collect();
    build_source(&mut mesh_el, &positions_id, SourceData::Floats(&positions), &XYZ)?;

    // UV layers
    let mut uv_ids = Vec::with_capacity(mesh.uv_layers.len());
    for (i, layer) in mesh.uv_layers.iter().enumerate() {
        let uv_id = format!("{}.uv.{}", geom_id, i);
        let uvs: Vec<f32> = uv_table(mesh, layer).iter().flat_map(|uv| uv.to_array()).collect();
        build_source(&mut mesh_el, &uv_id, SourceData::Floats(&uvs), &ST)?;
        uv_ids.push(uv_id);
    }

    // Face normals
    let normals_id = format!("{}.normals", geom_id);
    let normals: Vec<f32> = tri.normals.iter().flat_map(|n| n.to_array()).collect();
    build_source(&mut mesh_el, &normals_id, SourceData::Floats(&normals), &XYZ)?;

    // Vertex indirection
    let vertices_id = format!("{}.vertices", geom_id);
    let mut vertices = Element::new("vertices")
        .with_attr("id", &vertices_id)
        .with_child(input("POSITION", &positions_id, None));
    for (i, uv_id) in uv_ids.iter().enumerate() {
        vertices.push(input("TEXCOORD", uv_id, None).with_attr("set", i));
    }
    mesh_el.push(vertices);

    // Triangles
    mesh_el.push(
        Element::new("triangles")
            .with_attr("count", tri.indices.len() / 6)
            .with_child(input("VERTEX", &vertices_id, Some(0)))
            .with_child(input("NORMAL", &normals_id, Some(1)))
            .with_child(Element::new("p").with_text(format_ints(&tri.indices))),
    );

    tracing::debug!(
        vertices = mesh.vertices.len(),
        triangles = tri.num_triangles(),
        uv_layers = mesh.uv_layers.len(),
        "built geometry {}",
        fragment(&geom_id)
    );

    Ok(Element::new("geometry")
        .with_attr("id", geom_id)
        .with_attr("name", &mesh.name)
        .with_child(mesh_el))
}
