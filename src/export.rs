//! Still-image export sizing.
//!
//! Export reuses the live camera at a different pixel size. The only thing
//! that has to change is the aspect ratio and the view window, which is
//! rescaled so the subject lands on the same fraction of the frame.

use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scene::Camera;

/// Device pixel ratios above this are clamped.
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// Smallest export edge, in pixels.
pub const MIN_EXPORT_EDGE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Multiplier on top of the display resolution.
    pub scale: f32,
    pub device_pixel_ratio: f32,
    /// Linear RGBA clear color; `None` exports with a transparent background.
    pub background: Option<[f32; 4]>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            device_pixel_ratio: 1.0,
            background: Some([1.0, 1.0, 1.0, 1.0]),
        }
    }
}

/// Camera and target size for one export.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub size: UVec2,
    pub camera: Camera,
    pub clear_color: [f32; 4],
}

impl ExportSettings {
    pub fn plan(&self, camera: &Camera, css_size: Vec2) -> ExportPlan {
        let size = export_size(css_size, self.device_pixel_ratio, self.scale);
        ExportPlan {
            size,
            camera: export_camera(camera, size),
            clear_color: self.background.unwrap_or([0.0; 4]),
        }
    }
}

/// `max(2, floor(css * min(dpr, 2) * scale))` per axis.
///
/// Non-finite or non-positive inputs collapse to the minimum edge.
pub fn export_size(css_size: Vec2, device_pixel_ratio: f32, scale: f32) -> UVec2 {
    let dpr = device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO);
    let raw = (css_size * dpr * scale).floor();
    let edge = |v: f32| {
        if v.is_finite() && v > MIN_EXPORT_EDGE as f32 {
            v as u32
        } else {
            MIN_EXPORT_EDGE
        }
    };
    UVec2::new(edge(raw.x), edge(raw.y))
}

/// Detached copy of `camera` rendering at `size`.
///
/// The view window is scaled with the frame, so a subject shifted by a
/// fraction of the viewport stays shifted by the same fraction.
pub fn export_camera(camera: &Camera, size: UVec2) -> Camera {
    let mut out = camera.clone();
    out.uuid = Uuid::new_v4();

    if let Some(view) = camera.view_offset
        && view.full_width > 0.0
        && view.full_height > 0.0
    {
        let sx = size.x as f32 / view.full_width;
        let sy = size.y as f32 / view.full_height;
        out.view_offset = Some(view.scaled(sx, sy));
    }
    out.set_viewport(size.x, size.y);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpr_is_clamped_to_two() {
        assert_eq!(export_size(Vec2::new(800.0, 600.0), 3.0, 1.0), UVec2::new(1600, 1200));
    }

    #[test]
    fn tiny_sizes_floor_at_two() {
        assert_eq!(export_size(Vec2::new(0.4, 0.0), 1.0, 1.0), UVec2::splat(2));
        assert_eq!(export_size(Vec2::new(f32::NAN, 10.0), 1.0, 1.0), UVec2::new(2, 10));
    }
}
