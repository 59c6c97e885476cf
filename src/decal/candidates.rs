//! Broad phase: world-space triangles near the patch.

use log::debug;

use crate::decal::triangle::Triangle;
use crate::resources::BoundingBox;
use crate::scene::{MeshKey, Scene};

/// Collects every world-space triangle of `scene` whose bounds overlap
/// `patch_bounds` grown by `margin` on all sides.
///
/// The mesh `exclude` (the patch itself) never contributes. Triangles are
/// returned in scene insertion order, then index order within each mesh;
/// the projector's tie-break relies on that order.
pub fn collect_candidates(
    scene: &Scene,
    exclude: MeshKey,
    patch_bounds: &BoundingBox,
    margin: f32,
) -> Vec<Triangle> {
    let region = patch_bounds.expand_by_scalar(margin);
    let mut out = Vec::new();

    for (key, mesh) in scene.iter() {
        if key == exclude {
            continue;
        }
        // Whole-mesh rejection before touching individual triangles.
        if let Some(bounds) = mesh.world_bounding_box()
            && !bounds.intersects(&region)
        {
            continue;
        }

        let world = mesh.world_matrix;
        let before = out.len();
        out.extend(
            mesh.geometry
                .triangles()
                .map(|[a, b, c]| {
                    Triangle::new(
                        world.transform_point3(a),
                        world.transform_point3(b),
                        world.transform_point3(c),
                    )
                })
                .filter(|tri| tri.is_finite() && tri.bounding_box().intersects(&region)),
        );
        debug!("Mesh '{}' contributed {} candidates", mesh.name, out.len() - before);
    }

    out
}
