use glam::{Affine3A, Mat4, UVec2, Vec3, Vec4};
use std::borrow::Cow;
use uuid::Uuid;

/// Sub-window of a notional full frame, in pixels.
///
/// Rendering through a view offset shows `width x height` pixels starting
/// at (`offset_x`, `offset_y`) of a `full_width x full_height` frame, with
/// +y pointing down. The camera transform is not involved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOffset {
    pub full_width: f32,
    pub full_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewOffset {
    /// Same window expressed against a frame scaled by (`sx`, `sy`).
    #[must_use]
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            full_width: self.full_width * sx,
            full_height: self.full_height * sy,
            offset_x: self.offset_x * sx,
            offset_y: self.offset_y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

/// Perspective camera aimed at a target point.
///
/// The host renderer reads position/orientation, near/far and the projection
/// matrix; it writes back nothing but the viewport size.
#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,

    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    /// Vertical field of view, radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub view_offset: Option<ViewOffset>,

    pub(crate) viewport: UVec2,
    pub(crate) projection_matrix: Mat4,
}

impl Camera {
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            name: Cow::Borrowed("Camera"),
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            view_offset: None,
            viewport: UVec2::ZERO,
            projection_matrix: Mat4::IDENTITY,
        };

        cam.update_projection_matrix();
        cam
    }

    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Records the drawable size and derives the aspect ratio from it.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = UVec2::new(width, height);
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self.update_projection_matrix();
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Unit vector from the camera toward its target (falls back to -Z).
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// Orthonormal (right, up, back) basis of the camera.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward();
        let up = if forward.cross(self.up).length_squared() > 1e-12 {
            self.up
        } else if forward.cross(Vec3::Z).length_squared() > 1e-12 {
            Vec3::Z
        } else {
            Vec3::X
        };
        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward);
        (right, new_up, -forward)
    }

    /// Camera -> world.
    pub fn world_matrix(&self) -> Affine3A {
        let (right, up, back) = self.basis();
        Affine3A::from_cols(right.into(), up.into(), back.into(), self.position.into())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from(self.world_matrix()).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Rebuilds the projection from fov/aspect/near/far and the view offset.
    pub fn update_projection_matrix(&mut self) {
        let near = self.near;
        let mut top = near * (self.fov * 0.5).tan();
        let mut height = 2.0 * top;
        let mut width = self.aspect * height;
        let mut left = -0.5 * width;

        if let Some(view) = self.view_offset
            && view.full_width > 0.0
            && view.full_height > 0.0
        {
            left += view.offset_x * width / view.full_width;
            top -= view.offset_y * height / view.full_height;
            width *= view.width / view.full_width;
            height *= view.height / view.full_height;
        }

        self.projection_matrix =
            perspective_off_center_rh(left, left + width, top - height, top, near, self.far);
    }

    pub fn set_view_offset(&mut self, view: ViewOffset) {
        self.view_offset = Some(view);
        self.update_projection_matrix();
    }

    pub fn clear_view_offset(&mut self) {
        self.view_offset = None;
        self.update_projection_matrix();
    }
}

/// Right-handed off-axis perspective with a [0, 1] depth range.
///
/// With `left = -right` and `bottom = -top` this equals `Mat4::perspective_rh`.
pub fn perspective_off_center_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let inv_w = 1.0 / (right - left);
    let inv_h = 1.0 / (top - bottom);
    let r = far / (near - far);

    Mat4::from_cols(
        Vec4::new(2.0 * near * inv_w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * inv_h, 0.0, 0.0),
        Vec4::new((right + left) * inv_w, (top + bottom) * inv_h, r, -1.0),
        Vec4::new(0.0, 0.0, r * near, 0.0),
    )
}
