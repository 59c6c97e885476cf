//! Configuration
//!
//! Plain data structs handed to the decal pipeline, the camera framer and the
//! scene-setup collaborator. Every struct deserializes from JSON with
//! per-field defaults, so hosts only need to spell out what they override.

use serde::{Deserialize, Serialize};

use crate::errors::{ConformError, Result};
use crate::resources::geometry::BoundingBox;

/// Reserved material/mesh name that marks the print area.
pub const DEFAULT_PATCH_TOKEN: &str = "PrintArea";

/// Upper bound on the triangle count subdivision may produce.
pub const MAX_TESSELLATED_TRIANGLES: usize = 1 << 18;

// ============================================================================
// Decal
// ============================================================================

/// Distances used by the candidate builder and the shrinkwrap projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProjectionTolerance {
    /// World-unit values, tuned for one asset scale.
    Absolute {
        /// Expansion applied to the patch bounds before the overlap test.
        margin: f32,
        /// Outward offset along the surface normal (anti z-fighting).
        epsilon: f32,
        /// Vertices farther than this from every candidate stay put.
        max_distance: Option<f32>,
    },
    /// Fractions of the target's world bounding-box diagonal.
    Relative {
        margin_ratio: f32,
        epsilon_ratio: f32,
        max_distance_ratio: Option<f32>,
    },
}

impl Default for ProjectionTolerance {
    fn default() -> Self {
        Self::Absolute {
            margin: 0.15,
            epsilon: 5e-4,
            max_distance: Some(0.15),
        }
    }
}

/// Tolerance values after resolving against a concrete scene scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTolerance {
    pub margin: f32,
    pub epsilon: f32,
    pub max_distance: Option<f32>,
}

impl ProjectionTolerance {
    /// Resolves to world units. `scale` is only read for the relative mode.
    pub fn resolve(&self, scale: Option<&BoundingBox>) -> ResolvedTolerance {
        match *self {
            Self::Absolute {
                margin,
                epsilon,
                max_distance,
            } => ResolvedTolerance {
                margin,
                epsilon,
                max_distance,
            },
            Self::Relative {
                margin_ratio,
                epsilon_ratio,
                max_distance_ratio,
            } => {
                let diagonal = scale
                    .filter(|b| b.is_finite())
                    .map_or(1.0, |b| b.size().length());
                ResolvedTolerance {
                    margin: margin_ratio * diagonal,
                    epsilon: epsilon_ratio * diagonal,
                    max_distance: max_distance_ratio.map(|r| r * diagonal),
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let values: [(&str, Option<f32>); 3] = match *self {
            Self::Absolute {
                margin,
                epsilon,
                max_distance,
            } => [
                ("margin", Some(margin)),
                ("epsilon", Some(epsilon)),
                ("max_distance", max_distance),
            ],
            Self::Relative {
                margin_ratio,
                epsilon_ratio,
                max_distance_ratio,
            } => [
                ("margin_ratio", Some(margin_ratio)),
                ("epsilon_ratio", Some(epsilon_ratio)),
                ("max_distance_ratio", max_distance_ratio),
            ],
        };

        for (name, value) in values {
            if let Some(v) = value
                && (!v.is_finite() || v < 0.0)
            {
                return Err(ConformError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Nearest-triangle search used by the shrinkwrap projector.
///
/// Both produce identical results, including tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialIndexKind {
    Linear,
    #[default]
    Bvh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecalConfig {
    pub patch_token: String,
    pub tessellation_iterations: u32,
    /// Patches with more triangles than this are not subdivided.
    pub tessellation_ceiling: usize,
    pub tolerance: ProjectionTolerance,
    pub spatial_index: SpatialIndexKind,
}

impl Default for DecalConfig {
    fn default() -> Self {
        Self {
            patch_token: DEFAULT_PATCH_TOKEN.to_string(),
            tessellation_iterations: 2,
            tessellation_ceiling: 2000,
            tolerance: ProjectionTolerance::default(),
            spatial_index: SpatialIndexKind::default(),
        }
    }
}

impl DecalConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.patch_token.is_empty() {
            return Err(ConformError::InvalidConfig(
                "patch_token must not be empty".to_string(),
            ));
        }
        let worst = 4usize
            .checked_pow(self.tessellation_iterations)
            .and_then(|factor| self.tessellation_ceiling.checked_mul(factor));
        if !worst.is_some_and(|n| n <= MAX_TESSELLATED_TRIANGLES) {
            return Err(ConformError::InvalidConfig(format!(
                "{} subdivision passes over up to {} triangles exceed {MAX_TESSELLATED_TRIANGLES} triangles",
                self.tessellation_iterations, self.tessellation_ceiling
            )));
        }
        self.tolerance.validate()
    }
}

// ============================================================================
// Framing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Multiplier on the fitted distance (1.0 = box exactly fills the view).
    pub margin: f32,
    /// Lower bound on the near plane.
    pub near_min: f32,
    /// Far plane as a multiple of the camera distance.
    pub far_factor: f32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            margin: 1.2,
            near_min: 0.01,
            far_factor: 100.0,
        }
    }
}

impl FramingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = self.margin.is_finite()
            && self.margin > 0.0
            && self.near_min.is_finite()
            && self.near_min > 0.0
            && self.far_factor.is_finite()
            && self.far_factor > 1.0;
        if ok {
            Ok(())
        } else {
            Err(ConformError::InvalidConfig(format!(
                "framing values out of range: {self:?}"
            )))
        }
    }
}

// ============================================================================
// Scene Setup
// ============================================================================

/// Process-wide look switches, passed explicitly to the scene-setup host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Prefer lights authored in the asset over the built-in rig.
    pub use_gltf_lights: bool,
    pub use_hdr_env: bool,
    pub tone_exposure: f32,
    /// Multiplier applied to imported light intensities.
    pub light_intensity_boost: f32,
    /// Constant ambient term that keeps unlit faces from going black.
    pub ambient_floor: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            use_gltf_lights: true,
            use_hdr_env: false,
            tone_exposure: 1.25,
            light_intensity_boost: 2.2,
            ambient_floor: 0.18,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn decal_defaults() {
        let config = DecalConfig::default();
        let resolved = config.tolerance.resolve(None);
        assert_eq!(config.patch_token, "PrintArea");
        assert_eq!(config.tessellation_ceiling, 2000);
        assert!((resolved.margin - 0.15).abs() < 1e-6);
        assert!((resolved.epsilon - 5e-4).abs() < 1e-9);
    }

    #[test]
    fn relative_tolerance_scales_with_diagonal() {
        let tol = ProjectionTolerance::Relative {
            margin_ratio: 0.1,
            epsilon_ratio: 0.001,
            max_distance_ratio: None,
        };
        let bb = BoundingBox {
            min: Vec3::ZERO,
            max: Vec3::new(3.0, 4.0, 0.0),
        };
        let resolved = tol.resolve(Some(&bb));
        assert!((resolved.margin - 0.5).abs() < 1e-6);
        assert!((resolved.epsilon - 0.005).abs() < 1e-6);
        assert_eq!(resolved.max_distance, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DecalConfig::from_json(r#"{ "tessellation_iterations": 3 }"#).unwrap();
        assert_eq!(config.tessellation_iterations, 3);
        assert_eq!(config.patch_token, DEFAULT_PATCH_TOKEN);
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        let json = r#"{ "tolerance": { "mode": "absolute", "margin": 0.1, "epsilon": -1.0, "max_distance": null } }"#;
        assert!(matches!(
            DecalConfig::from_json(json),
            Err(ConformError::InvalidConfig(_))
        ));
    }

    #[test]
    fn runaway_iterations_are_rejected() {
        for iterations in [9, 40, u32::MAX] {
            let json = format!(r#"{{ "tessellation_iterations": {iterations} }}"#);
            assert!(
                matches!(DecalConfig::from_json(&json), Err(ConformError::InvalidConfig(_))),
                "iterations = {iterations}"
            );
        }

        // 2000 * 4^7 = 32.7M, but a tiny ceiling keeps the same depth in range.
        let config = DecalConfig {
            tessellation_iterations: 7,
            tessellation_ceiling: 10,
            ..DecalConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn framing_rejects_zero_margin() {
        let config = FramingConfig {
            margin: 0.0,
            ..FramingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
