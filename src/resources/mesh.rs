use std::sync::Arc;

use glam::Affine3A;
use uuid::Uuid;

use crate::resources::geometry::{BoundingBox, Geometry};
use crate::resources::texture::Texture;

/// Render state the host applies when drawing a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub transparent: bool,
    /// Fragments with alpha below this are discarded (0 = off).
    pub alpha_test: f32,
    pub depth_test: bool,
    pub depth_write: bool,
    /// (factor, units) depth bias, `None` = disabled.
    pub polygon_offset: Option<(f32, f32)>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            transparent: false,
            alpha_test: 0.0,
            depth_test: true,
            depth_write: true,
            polygon_offset: None,
        }
    }
}

impl RenderState {
    /// Opaque, depth-tested and pulled slightly toward the viewer so the
    /// decal wins ties against the surface it hugs.
    pub fn decal() -> Self {
        Self {
            transparent: false,
            alpha_test: 0.01,
            depth_test: true,
            depth_write: true,
            polygon_offset: Some((-1.0, -1.0)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub map: Option<Arc<Texture>>,
    pub state: RenderState,
    version: u64,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            map: None,
            state: RenderState::default(),
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Render order assigned to a print-area patch so it draws after the body.
pub const DECAL_RENDER_ORDER: i32 = 10;

/// A named sub-mesh placed in the world.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub uuid: Uuid,
    pub name: String,

    pub geometry: Geometry,
    pub material: Material,

    /// Model -> world.
    pub world_matrix: Affine3A,

    pub visible: bool,
    pub render_order: i32,
    pub frustum_culled: bool,
}

impl Mesh {
    pub fn new(name: &str, geometry: Geometry, material: Material) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            geometry,
            material,
            world_matrix: Affine3A::IDENTITY,
            visible: true,
            render_order: 0,
            frustum_culled: true,
        }
    }

    #[must_use]
    pub fn with_world_matrix(mut self, world_matrix: Affine3A) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    /// True when the mesh or its material carries `token` as name.
    pub fn matches_token(&self, token: &str) -> bool {
        self.material.name == token || self.name == token
    }

    pub fn world_bounding_box(&self) -> Option<BoundingBox> {
        self.geometry.world_bounding_box(&self.world_matrix)
    }

    /// Switches the mesh to stable decal rendering.
    pub fn apply_decal_state(&mut self) {
        self.material.state = RenderState::decal();
        self.material.needs_update();
        self.render_order = DECAL_RENDER_ORDER;
        // Projected vertices may leave the loader's cached bounds.
        self.frustum_culled = false;
    }
}
