pub mod sphere;
pub mod plane;
pub mod box_shape;

pub use box_shape::create_box;
pub use sphere::{create_sphere, SphereOptions};
pub use plane::{create_plane, PlaneOptions};

use glam::{Affine3A, Vec3};

use crate::resources::mesh::{Material, Mesh};

/// Dimensions of the stand-in shown when the product mesh is unavailable.
pub const FALLBACK_SIZE: Vec3 = Vec3::new(0.13, 0.195, 0.045);

pub const FALLBACK_NAME: &str = "FallbackPlaceholder";

/// Neutral box resting on the ground plane (y = 0).
pub fn fallback_placeholder() -> Mesh {
    let geometry = create_box(FALLBACK_SIZE.x, FALLBACK_SIZE.y, FALLBACK_SIZE.z);
    Mesh::new(FALLBACK_NAME, geometry, Material::new("FallbackMaterial"))
        .with_world_matrix(Affine3A::from_translation(Vec3::new(0.0, FALLBACK_SIZE.y / 2.0, 0.0)))
}
