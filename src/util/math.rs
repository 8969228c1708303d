//! Math type re-exports and the matrix codec used by every document block.
//!
//! Matrices are glam `Mat4` (column-major storage). The document wants
//! row-major tokens, so writers flatten with `transpose = true`.

use std::fmt::Write;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Flatten a 4x4 matrix into 16 floats.
///
/// The matrix is optionally transposed, then its storage is read out in
/// order. With `transpose = true` this yields the rows of `m`, which is
/// what every `<matrix>` and float4x4 array expects.
#[inline]
pub fn flatten_matrix(m: &Mat4, transpose: bool) -> [f32; 16] {
    if transpose {
        m.transpose().to_cols_array()
    } else {
        m.to_cols_array()
    }
}

/// Join floats into a single whitespace separated token string.
pub fn format_floats<'a>(values: impl IntoIterator<Item = &'a f32>) -> String {
    let mut out = String::new();
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing to a String cannot fail
        let _ = write!(out, "{}", v);
    }
    out
}

/// Join integers into a single whitespace separated token string.
pub fn format_ints<'a>(values: impl IntoIterator<Item = &'a u32>) -> String {
    let mut out = String::new();
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", v);
    }
    out
}

/// Flatten and format a matrix in one step.
#[inline]
pub fn format_matrix(m: &Mat4, transpose: bool) -> String {
    format_floats(&flatten_matrix(m, transpose))
}

/// Compute a face normal with Newell's method.
///
/// Works for non-planar quads; returns +Z for degenerate input.
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n.try_normalize().unwrap_or(Vec3::Z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_transposed_is_row_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let flat = flatten_matrix(&m, true);
        // Translation sits at the end of the first three rows
        assert_eq!(flat[3], 1.0);
        assert_eq!(flat[7], 2.0);
        assert_eq!(flat[11], 3.0);
        assert_eq!(flat[15], 1.0);
        assert_eq!(flat[12], 0.0);
    }

    #[test]
    fn test_flatten_untransposed_is_storage_order() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let flat = flatten_matrix(&m, false);
        assert_eq!(&flat[12..], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(flat, m.to_cols_array());
    }

    #[test]
    fn test_format_floats() {
        assert_eq!(format_floats(&[0.0, 0.5, -1.0, 2.25]), "0 0.5 -1 2.25");
        assert_eq!(format_floats(Vec::<f32>::new().iter()), "");
        assert_eq!(format_ints(&[10, 5, 11]), "10 5 11");
    }

    #[test]
    fn test_format_identity_matrix() {
        assert_eq!(
            format_matrix(&Mat4::IDENTITY, true),
            "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1"
        );
    }

    #[test]
    fn test_newell_normal() {
        let quad = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        assert!((newell_normal(&quad) - Vec3::Z).length() < 1e-6);
        assert_eq!(newell_normal(&[Vec3::ZERO; 3]), Vec3::Z);
    }
}
