//! Mesh data blocks: vertices, loops, polygons and UV layers.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::newell_normal;

/// Membership of a vertex in a vertex group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupWeight {
    /// Index into the owning object's vertex group list.
    pub group: u32,
    pub weight: f32,
}

/// A mesh vertex.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub co: Vec3,
    /// Group memberships in native order.
    #[serde(default)]
    pub groups: SmallVec<[GroupWeight; 4]>,
}

impl Vertex {
    pub fn new(co: Vec3) -> Self {
        Self { co, groups: SmallVec::new() }
    }
}

/// A polygon as a span into the loop list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub loop_start: u32,
    pub loop_total: u32,
    /// Face normal.
    pub normal: Vec3,
}

/// Per-loop texture coordinates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UvLayer {
    pub name: String,
    /// One entry per loop. May be shorter than the loop list; loops past
    /// the end are not covered by this layer.
    pub uvs: Vec<Vec2>,
}

/// Mesh data block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Vertex index of every loop (face corner).
    pub loops: Vec<u32>,
    pub polygons: Vec<Polygon>,
    #[serde(default)]
    pub uv_layers: Vec<UvLayer>,
}

impl Mesh {
    /// Build a mesh from positions and faces given as vertex index lists.
    ///
    /// Loops are laid out sequentially in face order and every face gets
    /// a Newell normal.
    pub fn from_faces(name: impl Into<String>, positions: &[Vec3], faces: &[&[u32]]) -> Self {
        let mut loops = Vec::new();
        let mut polygons = Vec::with_capacity(faces.len());
        for face in faces {
            let points: SmallVec<[Vec3; 4]> = face
                .iter()
                .map(|&v| positions.get(v as usize).copied().unwrap_or(Vec3::ZERO))
                .collect();
            polygons.push(Polygon {
                loop_start: loops.len() as u32,
                loop_total: face.len() as u32,
                normal: newell_normal(&points),
            });
            loops.extend_from_slice(face);
        }
        Self {
            name: name.into(),
            vertices: positions.iter().map(|&co| Vertex::new(co)).collect(),
            loops,
            polygons,
            uv_layers: Vec::new(),
        }
    }

    /// Append a UV layer.
    pub fn with_uv_layer(mut self, name: impl Into<String>, uvs: Vec<Vec2>) -> Self {
        self.uv_layers.push(UvLayer { name: name.into(), uvs });
        self
    }

    /// Set the group memberships of one vertex.
    pub fn with_vertex_weights(mut self, vertex: usize, weights: &[(u32, f32)]) -> Self {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.groups = weights
                .iter()
                .map(|&(group, weight)| GroupWeight { group, weight })
                .collect();
        }
        self
    }

    /// Loop indices spanned by a polygon, or `None` if the span is out of range.
    pub fn polygon_loops(&self, polygon: &Polygon) -> Option<std::ops::Range<usize>> {
        let start = polygon.loop_start as usize;
        let end = start.checked_add(polygon.loop_total as usize)?;
        (end <= self.loops.len()).then_some(start..end)
    }

    /// Total number of group memberships over all vertices.
    pub fn num_group_memberships(&self) -> usize {
        self.vertices.iter().map(|v| v.groups.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_faces_layout() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        let mesh = Mesh::from_faces("Quad", &positions, &[&[0, 1, 2, 3]]);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.loops, vec![0, 1, 2, 3]);
        assert_eq!(mesh.polygons.len(), 1);
        assert_eq!(mesh.polygons[0].loop_total, 4);
        assert!((mesh.polygons[0].normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_polygon_loops_range() {
        let mesh = Mesh::from_faces("Tri", &[Vec3::ZERO, Vec3::X, Vec3::Y], &[&[0, 1, 2]]);
        assert_eq!(mesh.polygon_loops(&mesh.polygons[0]), Some(0..3));

        let bad = Polygon { loop_start: 2, loop_total: 3, normal: Vec3::Z };
        assert_eq!(mesh.polygon_loops(&bad), None);
    }

    #[test]
    fn test_vertex_weights() {
        let mesh = Mesh::from_faces("Tri", &[Vec3::ZERO, Vec3::X, Vec3::Y], &[&[0, 1, 2]])
            .with_vertex_weights(0, &[(0, 0.5), (1, 0.5)])
            .with_vertex_weights(2, &[(1, 1.0)]);
        assert_eq!(mesh.vertices[0].groups.len(), 2);
        assert_eq!(mesh.vertices[1].groups.len(), 0);
        assert_eq!(mesh.num_group_memberships(), 3);
    }
}
