//! Shrinkwrap projection of the patch onto the candidate surface.

use glam::Vec3;
use log::{debug, warn};

use crate::config::ResolvedTolerance;
use crate::decal::spatial::NearestTriangle;
use crate::errors::{ConformError, Result};
use crate::resources::Mesh;

/// Outcome of one [`project`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    pub vertices: usize,
    pub moved: usize,
    /// Vertices beyond `max_distance` or without a finite hit.
    pub skipped: usize,
}

/// Moves every patch vertex onto its closest candidate point, lifted by
/// `tolerance.epsilon` along that triangle's normal.
///
/// Vertices are processed in world space and written back in the patch's
/// model space, so the mesh transform itself is never modified. Normals and
/// bounds are recomputed when at least one vertex moved.
///
/// With an empty candidate set (or a singular world matrix) the patch is
/// left untouched and an error is returned.
pub fn project<S>(patch: &mut Mesh, index: &S, tolerance: &ResolvedTolerance) -> Result<ProjectionStats>
where
    S: NearestTriangle + ?Sized,
{
    if index.is_empty() {
        return Err(ConformError::NoCandidates {
            patch: patch.name.clone(),
        });
    }

    let world = patch.world_matrix;
    let det = world.matrix3.determinant();
    if !(det.is_finite() && det.abs() > f32::EPSILON * f32::EPSILON) {
        return Err(ConformError::SingularTransform(patch.name.clone()));
    }
    let inverse = world.inverse();

    let max_distance_sq = tolerance.max_distance.map(|d| d * d);
    let source = patch.geometry.positions();
    let mut stats = ProjectionStats {
        vertices: source.len(),
        ..Default::default()
    };

    let targets: Vec<Option<Vec3>> = source
        .iter()
        .map(|&local| {
            let p = world.transform_point3(local);
            let hit = index.nearest(p)?;
            if let Some(limit) = max_distance_sq
                && hit.distance_squared > limit
            {
                return None;
            }
            let lifted = hit.point + hit.normal * tolerance.epsilon;
            Some(inverse.transform_point3(lifted)).filter(|q| q.is_finite())
        })
        .collect();

    stats.moved = targets.iter().filter(|t| t.is_some()).count();
    stats.skipped = stats.vertices - stats.moved;
    if stats.moved == 0 {
        warn!("No vertex of '{}' was within reach of the surface", patch.name);
        return Ok(stats);
    }

    for (position, target) in patch.geometry.positions_mut().iter_mut().zip(targets) {
        if let Some(q) = target {
            *position = q;
        }
    }
    patch.geometry.compute_vertex_normals();
    patch.geometry.compute_bounding_volume();

    debug!(
        "Projected '{}': {} moved, {} skipped, {} candidates",
        patch.name,
        stats.moved,
        stats.skipped,
        index.len()
    );
    Ok(stats)
}
