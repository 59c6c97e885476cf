//! Midpoint subdivision of the print-area patch.
//!
//! Each pass splits every triangle into four. The patch is expanded to a
//! non-indexed layout first, so no vertex is shared between triangles and
//! the output triangle count is exactly `input * 4^iterations`, unless that
//! would pass [`MAX_TESSELLATED_TRIANGLES`].

use glam::{Vec2, Vec3};
use log::{debug, info, warn};

use crate::config::MAX_TESSELLATED_TRIANGLES;
use crate::resources::{Geometry, Mesh};

/// Subdivides `geometry` `iterations` times.
///
/// Geometry with more than `ceiling` triangles, empty geometry and a zero
/// iteration count are returned unchanged. Passes stop early once another
/// one would exceed [`MAX_TESSELLATED_TRIANGLES`]. The result carries
/// fresh area-weighted normals and bounds; UVs (when present) are
/// interpolated at edge midpoints.
pub fn subdivide(geometry: &Geometry, iterations: u32, ceiling: usize) -> Geometry {
    let triangles = geometry.triangle_count();
    if iterations == 0 || geometry.is_empty() {
        return geometry.clone();
    }
    if triangles > ceiling {
        debug!("Patch has {triangles} triangles (ceiling {ceiling}), skipping subdivision");
        return geometry.clone();
    }

    let passes = allowed_passes(triangles, iterations);
    if passes < iterations {
        warn!(
            "Subdivision capped at {passes} of {iterations} passes ({triangles} triangles, limit {MAX_TESSELLATED_TRIANGLES})"
        );
    }
    if passes == 0 {
        return geometry.clone();
    }

    let flat = geometry.to_non_indexed();
    let mut positions = flat.positions().to_vec();
    let mut uvs = flat.uvs().map(<[Vec2]>::to_vec);

    for _ in 0..passes {
        let (p, u) = split_once(&positions, uvs.as_deref());
        positions = p;
        uvs = u;
    }

    let mut out = Geometry::from_positions(positions);
    out.set_uvs(uvs);
    out.compute_vertex_normals();
    out.compute_bounding_volume();
    out
}

/// Replaces the mesh geometry with its subdivision. Returns true when the
/// geometry actually changed.
pub fn tessellate_mesh(mesh: &mut Mesh, iterations: u32, ceiling: usize) -> bool {
    let before = mesh.geometry.triangle_count();
    if iterations == 0 || before == 0 || before > ceiling {
        return false;
    }
    if allowed_passes(before, iterations) == 0 {
        return false;
    }
    mesh.geometry = subdivide(&mesh.geometry, iterations, ceiling);
    info!(
        "Tessellated '{}': {before} -> {} triangles",
        mesh.name,
        mesh.geometry.triangle_count()
    );
    true
}

/// Number of passes (at most `iterations`) that keep `triangles` within
/// [`MAX_TESSELLATED_TRIANGLES`].
fn allowed_passes(triangles: usize, iterations: u32) -> u32 {
    let mut count = triangles;
    let mut passes = 0;
    while passes < iterations {
        match count.checked_mul(4) {
            Some(next) if next <= MAX_TESSELLATED_TRIANGLES => count = next,
            _ => break,
        }
        passes += 1;
    }
    passes
}

fn split_once(positions: &[Vec3], uvs: Option<&[Vec2]>) -> (Vec<Vec3>, Option<Vec<Vec2>>) {
    let tri_count = positions.len() / 3;
    let capacity = tri_count.checked_mul(12).unwrap_or(0);
    let mut out_pos = Vec::with_capacity(capacity);
    let mut out_uv = uvs.map(|_| Vec::with_capacity(capacity));

    for t in 0..tri_count {
        let i = t * 3;
        split_triangle(&positions[i..i + 3], &mut out_pos);
        if let (Some(src), Some(dst)) = (uvs, out_uv.as_mut()) {
            split_triangle(&src[i..i + 3], dst);
        }
    }

    (out_pos, out_uv)
}

/// Emits (a, ab, ca), (ab, b, bc), (ca, bc, c), (ab, bc, ca).
fn split_triangle<T>(corners: &[T], out: &mut Vec<T>)
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Mul<f32, Output = T>,
{
    let (a, b, c) = (corners[0], corners[1], corners[2]);
    let ab = (a + b) * 0.5;
    let bc = (b + c) * 0.5;
    let ca = (c + a) * 0.5;

    out.extend_from_slice(&[a, ab, ca, ab, b, bc, ca, bc, c, ab, bc, ca]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_pass_quadruples() {
        let geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        let out = subdivide(&geo, 1, 100);
        assert_eq!(out.triangle_count(), 4);
        assert_eq!(out.vertex_count(), 12);
        assert!(out.indices().is_none());
    }

    #[test]
    fn zero_iterations_is_identity() {
        let geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        let out = subdivide(&geo, 0, 100);
        assert_eq!(out.positions(), geo.positions());
    }

    #[test]
    fn passes_stop_at_the_triangle_limit() {
        assert_eq!(allowed_passes(2, 2), 2);
        assert_eq!(allowed_passes(2, 40), 8);
        assert_eq!(allowed_passes(MAX_TESSELLATED_TRIANGLES, 3), 0);
        assert_eq!(allowed_passes(usize::MAX, 1), 0);
    }

    #[test]
    fn center_child_keeps_winding() {
        let geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        let out = subdivide(&geo, 1, 100);
        let normals = out.normals().unwrap();
        assert!(normals.iter().all(|n| n.abs_diff_eq(Vec3::Z, 1e-6)));
    }
}
