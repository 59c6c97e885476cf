//! Camera Framing Tests
//!
//! Tests for:
//! - Fit-to-box distance, direction and clipping planes
//! - Idempotence of fitting and view offsets
//! - Off-axis projection placement of the subject
//! - Degenerate and invalid inputs
//! - Deferred requests through ViewFramer
//! - Pixel panning

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

use conform::ConformError;
use conform::config::FramingConfig;
use conform::resources::BoundingBox;
use conform::scene::framing::{KEY_PAN_PIXELS, PanKey, apply_view_offset, fit_to_box, pan_by_pixels};
use conform::scene::{Camera, ViewFramer};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn unit_cube() -> BoundingBox {
    BoundingBox {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    }
}

fn tight() -> FramingConfig {
    FramingConfig {
        margin: 1.0,
        ..FramingConfig::default()
    }
}

fn ndc(camera: &Camera, p: Vec3) -> Vec3 {
    let clip: Vec4 = camera.view_projection_matrix() * p.extend(1.0);
    clip.truncate() / clip.w
}

// ============================================================================
// Fit To Box
// ============================================================================

#[test]
fn unit_cube_distance_is_independent_of_start_position() {
    for start in [Vec3::new(0.0, 0.0, 5.0), Vec3::new(3.0, 4.0, 0.0), Vec3::new(-0.1, 20.0, 0.3)] {
        let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
        cam.position = start;
        fit_to_box(&unit_cube(), &mut cam, &tight()).unwrap();

        assert!(approx(cam.distance(), 1.2071), "distance {} from {start}", cam.distance());
        assert!(cam.target.abs_diff_eq(Vec3::ZERO, EPSILON));
    }
}

#[test]
fn fit_keeps_viewing_direction() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    cam.position = Vec3::new(2.0, 2.0, 1.0);
    let before = cam.forward();

    let bbox = BoundingBox {
        min: Vec3::new(4.0, 0.0, 0.0),
        max: Vec3::new(6.0, 1.0, 1.0),
    };
    fit_to_box(&bbox, &mut cam, &FramingConfig::default()).unwrap();

    assert!(cam.forward().abs_diff_eq(before, EPSILON));
    assert!(cam.target.abs_diff_eq(Vec3::new(5.0, 0.5, 0.5), EPSILON));
}

#[test]
fn margin_scales_distance() {
    let mut a = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let mut b = a.clone();
    fit_to_box(&unit_cube(), &mut a, &tight()).unwrap();
    fit_to_box(&unit_cube(), &mut b, &FramingConfig::default()).unwrap();
    assert!(approx(b.distance(), a.distance() * 1.2));
}

#[test]
fn clip_planes_follow_distance() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let big = BoundingBox {
        min: Vec3::splat(-50.0),
        max: Vec3::splat(50.0),
    };
    fit_to_box(&big, &mut cam, &tight()).unwrap();
    let d = cam.distance();
    assert!(approx(cam.near, d / 100.0));
    assert!(approx(cam.far / d, 100.0));

    // Tiny boxes bottom out at near_min.
    let tiny = BoundingBox {
        min: Vec3::splat(-0.001),
        max: Vec3::splat(0.001),
    };
    fit_to_box(&tiny, &mut cam, &tight()).unwrap();
    assert!(approx(cam.near, 0.01));
}

#[test]
fn fitting_twice_is_a_noop() {
    let mut cam = Camera::new_perspective(50.0, 1.5, 0.1, 100.0);
    cam.position = Vec3::new(1.0, 0.5, 2.0);
    fit_to_box(&unit_cube(), &mut cam, &FramingConfig::default()).unwrap();
    let (pos, near, far, proj) = (cam.position, cam.near, cam.far, cam.projection_matrix());

    fit_to_box(&unit_cube(), &mut cam, &FramingConfig::default()).unwrap();
    assert!(cam.position.abs_diff_eq(pos, 1e-6));
    assert_eq!(cam.near, near);
    assert_eq!(cam.far, far);
    assert!(cam.projection_matrix().abs_diff_eq(proj, 1e-6));
}

#[test]
fn flat_box_is_rejected() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let before = cam.clone();
    let flat = BoundingBox {
        min: Vec3::new(-1.0, -1.0, 0.0),
        max: Vec3::new(1.0, 1.0, 0.0),
    };
    let result = fit_to_box(&flat, &mut cam, &tight());
    assert!(matches!(result, Err(ConformError::DegenerateBounds)));
    assert_eq!(cam.position, before.position);
    assert_eq!(cam.target, before.target);
    assert_eq!(cam.near, before.near);
    assert_eq!(cam.far, before.far);
}

#[test]
fn degenerate_box_leaves_camera_untouched() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let before = cam.clone();

    let cases = [
        BoundingBox {
            min: Vec3::ONE,
            max: Vec3::ONE,
        },
        BoundingBox {
            min: Vec3::ONE,
            max: Vec3::ZERO,
        },
        BoundingBox {
            min: Vec3::new(f32::NAN, 0.0, 0.0),
            max: Vec3::ONE,
        },
        BoundingBox {
            min: Vec3::ZERO,
            max: Vec3::new(f32::INFINITY, 1.0, 1.0),
        },
    ];
    for bbox in cases {
        let result = fit_to_box(&bbox, &mut cam, &tight());
        assert!(matches!(result, Err(ConformError::DegenerateBounds)), "{bbox:?}");
        assert_eq!(cam.position, before.position);
        assert_eq!(cam.target, before.target);
        assert_eq!(cam.near, before.near);
        assert_eq!(cam.far, before.far);
    }
}

// ============================================================================
// View Offset
// ============================================================================

#[test]
fn zero_offset_is_a_symmetric_frustum() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    apply_view_offset(Vec2::new(0.4, 0.2), &mut cam, UVec2::new(800, 600)).unwrap();
    apply_view_offset(Vec2::ZERO, &mut cam, UVec2::new(800, 600)).unwrap();

    assert!(cam.view_offset.is_none());
    let expected = Mat4::perspective_rh(cam.fov, 800.0 / 600.0, cam.near, cam.far);
    assert!(cam.projection_matrix().abs_diff_eq(expected, 1e-5));
}

#[test]
fn offset_moves_subject_by_fraction_of_half_viewport() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    fit_to_box(&unit_cube(), &mut cam, &FramingConfig::default()).unwrap();

    apply_view_offset(Vec2::new(0.5, -0.25), &mut cam, UVec2::new(1024, 768)).unwrap();
    let p = ndc(&cam, cam.target);
    assert!(approx(p.x, 0.5), "subject x at {}", p.x);
    assert!(approx(p.y, -0.25), "subject y at {}", p.y);
}

#[test]
fn offset_does_not_move_the_camera() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let (pos, target) = (cam.position, cam.target);
    apply_view_offset(Vec2::new(0.3, 0.3), &mut cam, UVec2::new(640, 480)).unwrap();
    assert_eq!(cam.position, pos);
    assert_eq!(cam.target, target);
}

#[test]
fn offset_is_clamped_and_idempotent() {
    let mut a = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let mut b = a.clone();
    apply_view_offset(Vec2::new(3.0, -7.0), &mut a, UVec2::new(500, 500)).unwrap();
    apply_view_offset(Vec2::new(1.0, -1.0), &mut b, UVec2::new(500, 500)).unwrap();
    apply_view_offset(Vec2::new(1.0, -1.0), &mut b, UVec2::new(500, 500)).unwrap();

    assert_eq!(a.view_offset, b.view_offset);
    assert!(a.projection_matrix().abs_diff_eq(b.projection_matrix(), 1e-6));
}

#[test]
fn invalid_offsets_are_rejected() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    assert!(apply_view_offset(Vec2::new(f32::NAN, 0.0), &mut cam, UVec2::new(10, 10)).is_err());
    assert!(apply_view_offset(Vec2::new(0.5, 0.0), &mut cam, UVec2::ZERO).is_err());
    assert!(cam.view_offset.is_none());
}

// ============================================================================
// ViewFramer
// ============================================================================

#[test]
fn framer_applies_only_latest_requests() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let mut framer = ViewFramer::new(FramingConfig::default());
    framer.set_subject(unit_cube());
    framer.request_offset(Vec2::new(0.3, 0.0));
    framer.request_offset(Vec2::new(-0.2, 0.1));
    framer.request_resize(800, 600);
    framer.request_resize(400, 400);
    assert!(framer.is_pending());

    framer.flush(&mut cam).unwrap();
    assert!(!framer.is_pending());
    assert_eq!(cam.viewport(), UVec2::new(400, 400));
    assert!(approx(cam.aspect, 1.0));

    let p = ndc(&cam, cam.target);
    assert!(approx(p.x, -0.2));
    assert!(approx(p.y, 0.1));
}

#[test]
fn framer_flush_is_idempotent() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let mut framer = ViewFramer::new(FramingConfig::default());
    framer.set_subject(unit_cube());
    framer.request_resize(300, 200);
    framer.request_offset(Vec2::new(0.1, 0.1));
    framer.flush(&mut cam).unwrap();
    let proj = cam.projection_matrix();

    framer.request_offset(Vec2::new(0.1, 0.1));
    framer.flush(&mut cam).unwrap();
    assert!(cam.projection_matrix().abs_diff_eq(proj, 1e-6));
}

#[test]
fn framer_reports_degenerate_subject_but_applies_viewport() {
    let mut cam = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    let mut framer = ViewFramer::new(FramingConfig::default());
    framer.set_subject(BoundingBox {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    });
    framer.request_resize(320, 240);

    assert!(matches!(framer.flush(&mut cam), Err(ConformError::DegenerateBounds)));
    assert_eq!(cam.viewport(), UVec2::new(320, 240));
}

// ============================================================================
// Pan
// ============================================================================

#[test]
fn pan_moves_camera_and_target_together() {
    let mut cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);
    cam.position = Vec3::new(0.0, 0.0, 4.0);
    let offset = cam.position - cam.target;

    pan_by_pixels(&mut cam, 600.0, 0.0, 600.0);

    // One viewport height of pixels covers the whole visible height.
    let expected = 2.0 * (30.0_f32).to_radians().tan() * 4.0;
    assert!(approx(cam.target.x, expected));
    assert!(approx(cam.target.y, 0.0));
    assert!((cam.position - cam.target).abs_diff_eq(offset, EPSILON));
}

#[test]
fn positive_screen_dy_lowers_the_target() {
    let mut cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);
    pan_by_pixels(&mut cam, 0.0, 10.0, 500.0);
    assert!(cam.target.y < 0.0);
}

#[test]
fn key_steps_are_sixty_pixels() {
    assert_eq!(PanKey::Up.pixel_delta(), Vec2::new(0.0, KEY_PAN_PIXELS));
    assert_eq!(PanKey::Right.pixel_delta().x.abs(), 60.0);
    assert_eq!(PanKey::Left.pixel_delta(), -PanKey::Right.pixel_delta());
}
