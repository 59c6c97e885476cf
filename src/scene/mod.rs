//! Scene module
//!
//! - Scene: named sub-meshes with world transforms
//! - Camera: perspective camera with an optional asymmetric view window
//! - framing: fitting the camera to bounds and shifting the view window

pub mod scene;
pub mod camera;
pub mod framing;

pub use scene::Scene;
pub use camera::{Camera, ViewOffset};
pub use framing::{ViewFramer, apply_view_offset, fit_to_box, pan_by_pixels};

use slotmap::new_key_type;

new_key_type! {
    pub struct MeshKey;
}
