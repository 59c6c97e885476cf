//! Camera Framing
//!
//! Fits a camera to a bounding box without changing its orbit direction and
//! shifts the subject inside the frame through an off-axis projection.
//!
//! Both operations are idempotent: applying them twice with the same input
//! leaves the camera exactly as applying them once. [`ViewFramer`] collects
//! resize/offset requests between frames and applies only the latest ones.

use glam::{UVec2, Vec2, Vec3};
use log::{debug, warn};

use crate::config::FramingConfig;
use crate::errors::{ConformError, Result};
use crate::resources::BoundingBox;
use crate::scene::camera::{Camera, ViewOffset};

/// Pixels travelled per arrow-key press.
pub const KEY_PAN_PIXELS: f32 = 60.0;

/// Places `camera` so that `bbox` fills the vertical field of view scaled by
/// `framing.margin`.
///
/// The camera keeps its current viewing direction: only the target moves to
/// the box center and the distance changes. Near/far planes follow the
/// distance so depth precision stays usable at any object scale.
///
/// A degenerate box returns [`ConformError::DegenerateBounds`] and leaves the
/// camera untouched.
pub fn fit_to_box(bbox: &BoundingBox, camera: &mut Camera, framing: &FramingConfig) -> Result<()> {
    if bbox.is_degenerate() {
        return Err(ConformError::DegenerateBounds);
    }
    let half_fov = camera.fov * 0.5;
    if !(half_fov > 0.0 && half_fov < std::f32::consts::FRAC_PI_2) {
        return Err(ConformError::InvalidConfig(format!(
            "camera fov out of range: {} rad",
            camera.fov
        )));
    }

    let center = bbox.center();
    let distance = (bbox.max_extent() * 0.5) / half_fov.tan() * framing.margin;
    if !(distance.is_finite() && distance > 0.0) {
        return Err(ConformError::DegenerateBounds);
    }

    let direction = (camera.position - camera.target)
        .try_normalize()
        .unwrap_or(Vec3::Z);

    camera.target = center;
    camera.position = center + direction * distance;
    camera.near = framing.near_min.max(distance / 100.0);
    camera.far = distance * framing.far_factor;
    camera.update_projection_matrix();

    debug!(
        "Framed box {:?}..{:?}: distance {distance:.4}, near {:.4}, far {:.4}",
        bbox.min, bbox.max, camera.near, camera.far
    );
    Ok(())
}

/// Shifts the subject within the frame without moving the camera.
///
/// `fraction` is clamped to [-1, 1] per axis; +x moves the subject right and
/// +y moves it up, by half the viewport per unit. The projection then renders
/// a viewport-sized window displaced by that many pixels inside a full frame
/// of the same size. A zero offset restores the symmetric frustum.
pub fn apply_view_offset(fraction: Vec2, camera: &mut Camera, viewport: UVec2) -> Result<()> {
    if !fraction.is_finite() {
        return Err(ConformError::InvalidConfig(format!(
            "view offset must be finite, got {fraction}"
        )));
    }

    if fraction == Vec2::ZERO {
        if viewport.x > 0 && viewport.y > 0 {
            camera.set_viewport(viewport.x, viewport.y);
        }
        camera.clear_view_offset();
        return Ok(());
    }

    if viewport.x == 0 || viewport.y == 0 {
        return Err(ConformError::InvalidConfig(format!(
            "cannot offset an empty viewport {viewport}"
        )));
    }

    let fraction = fraction.clamp(Vec2::NEG_ONE, Vec2::ONE);
    let size = viewport.as_vec2();
    let shift = fraction * size * 0.5;

    camera.set_viewport(viewport.x, viewport.y);
    camera.set_view_offset(ViewOffset {
        full_width: size.x,
        full_height: size.y,
        offset_x: -shift.x,
        offset_y: shift.y,
        width: size.x,
        height: size.y,
    });
    Ok(())
}

/// Translates camera and target together by a screen-space distance.
///
/// One pixel covers `2 * tan(fov / 2) * distance / viewport_height` world
/// units at the target. Screen y grows downward.
pub fn pan_by_pixels(camera: &mut Camera, dx: f32, dy: f32, viewport_height: f32) {
    if viewport_height <= 0.0 {
        return;
    }
    let view_height = 2.0 * (camera.fov * 0.5).tan() * camera.distance();
    let world_per_pixel = view_height / viewport_height;

    let (right, up, _) = camera.basis();
    let pan = right * (dx * world_per_pixel) + up * (-dy * world_per_pixel);

    camera.position += pan;
    camera.target += pan;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanKey {
    Up,
    Down,
    Left,
    Right,
}

impl PanKey {
    /// Pixel delta handed to [`pan_by_pixels`] for one key press.
    pub fn pixel_delta(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, KEY_PAN_PIXELS),
            Self::Down => Vec2::new(0.0, -KEY_PAN_PIXELS),
            Self::Left => Vec2::new(KEY_PAN_PIXELS, 0.0),
            Self::Right => Vec2::new(-KEY_PAN_PIXELS, 0.0),
        }
    }
}

// ============================================================================
// Deferred framing
// ============================================================================

/// Coalesces framing requests until the next frame.
///
/// Every request overwrites the previous one of the same kind; [`flush`]
/// applies the latest subject, viewport and offset in that order.
///
/// [`flush`]: ViewFramer::flush
#[derive(Debug, Clone)]
pub struct ViewFramer {
    pub config: FramingConfig,
    subject: Option<BoundingBox>,
    offset: Vec2,
    pending_viewport: Option<UVec2>,
    dirty: bool,
}

impl ViewFramer {
    pub fn new(config: FramingConfig) -> Self {
        Self {
            config,
            subject: None,
            offset: Vec2::ZERO,
            pending_viewport: None,
            dirty: false,
        }
    }

    pub fn subject(&self) -> Option<BoundingBox> {
        self.subject
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_subject(&mut self, bbox: BoundingBox) {
        self.subject = Some(bbox);
        self.dirty = true;
    }

    pub fn request_offset(&mut self, fraction: Vec2) {
        self.offset = fraction;
        self.dirty = true;
    }

    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_viewport = Some(UVec2::new(width, height));
        self.dirty = true;
    }

    pub fn is_pending(&self) -> bool {
        self.dirty
    }

    /// Applies the latest requests to `camera`.
    ///
    /// A degenerate subject is reported but does not stop the viewport and
    /// offset from being applied.
    pub fn flush(&mut self, camera: &mut Camera) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;

        if let Some(viewport) = self.pending_viewport.take() {
            camera.set_viewport(viewport.x, viewport.y);
        }

        let fitted = match &self.subject {
            Some(bbox) => fit_to_box(bbox, camera, &self.config),
            None => Ok(()),
        };
        if let Err(err) = &fitted {
            warn!("Skipping camera fit: {err}");
        }

        apply_view_offset(self.offset, camera, camera.viewport())?;
        fitted
    }
}
