use glam::{Mat3, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wgpu::{AddressMode, FilterMode, MipmapFilterMode};

use crate::resources::image::Image;

// ============================================================================
// Sampler
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: MipmapFilterMode,
    // 1 = off
    pub anisotropy_clamp: u16,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: MipmapFilterMode::Linear,
            anisotropy_clamp: 1,
        }
    }
}

impl TextureSampler {
    /// Sampler for an untrimmed decal: clamps at the edge so the image does
    /// not repeat past its patch.
    pub fn decal() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            anisotropy_clamp: 8,
            ..Self::default()
        }
    }
}

// ============================================================================
// UV Transform
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
    pub center: Vec2,
    /// When false the host keeps a hand-authored matrix instead of
    /// rebuilding it from the fields above.
    pub matrix_auto_update: bool,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::new(0.5, 0.5),
            matrix_auto_update: true,
        }
    }
}

impl TextureTransform {
    /// 3x3 UV matrix: rotate about `center`, scale by `repeat`, then offset.
    pub fn get_matrix(&self) -> Mat3 {
        let c = self.rotation.cos();
        let s = self.rotation.sin();
        let (ox, oy) = (self.offset.x, self.offset.y);
        let (rx, ry) = (self.repeat.x, self.repeat.y);
        let (cx, cy) = (self.center.x, self.center.y);

        Mat3::from_cols_array(&[
            c * rx,
            s * rx,
            0.0,
            -s * ry,
            c * ry,
            0.0,
            (c * -cx + s * -cy + cx) * rx + ox,
            (-s * -cx + c * -cy + cy) * ry + oy,
            1.0,
        ])
    }
}

/// `KHR_texture_transform` payload as it appears in glTF JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KhrTextureTransform {
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "unit_scale")]
    pub scale: [f32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<u32>,
}

fn unit_scale() -> [f32; 2] {
    [1.0, 1.0]
}

impl KhrTextureTransform {
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Extension data carried next to a texture for glTF interop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureExtensions {
    pub khr_texture_transform: Option<KhrTextureTransform>,
}

// ============================================================================
// Texture Asset
// ============================================================================

#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,

    pub image: Image,

    pub sampler: TextureSampler,
    pub transform: TextureTransform,
    pub extensions: TextureExtensions,

    /// Decals are authored with glTF's top-left UV origin.
    pub flip_y: bool,

    version: u64,
}

impl Texture {
    pub fn new(name: &str, image: Image) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            image,
            sampler: TextureSampler::default(),
            transform: TextureTransform::default(),
            extensions: TextureExtensions::default(),
            flip_y: false,
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

/// Everything [`carry_transform`] writes, assembled before it is stored.
#[derive(Debug, Clone)]
struct CarriedState {
    address_mode_u: AddressMode,
    address_mode_v: AddressMode,
    transform: TextureTransform,
    extension: Option<KhrTextureTransform>,
}

/// Copies UV framing from the texture being replaced onto its replacement.
///
/// Wrap modes, offset, repeat, rotation and rotation center are copied
/// verbatim and the `KHR_texture_transform` payload is deep-copied when the
/// previous texture has one (otherwise `new` keeps its own). Without a
/// previous texture the replacement gets clamp-to-edge wrapping on both axes
/// and an identity transform. Filtering and pixel data are left untouched.
///
/// The new state is built in full and then written in one step, so a renderer
/// reading `new` never sees a mix of old and new fields.
pub fn carry_transform(old: Option<&Texture>, new: &mut Texture) {
    let state = match old {
        Some(old) => CarriedState {
            address_mode_u: old.sampler.address_mode_u,
            address_mode_v: old.sampler.address_mode_v,
            transform: old.transform,
            extension: old.extensions.khr_texture_transform.clone(),
        },
        None => CarriedState {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            transform: TextureTransform::default(),
            extension: None,
        },
    };

    debug!(
        "Carrying UV transform onto '{}' (from {})",
        new.name,
        old.map_or("<none>", |t| t.name.as_str())
    );

    new.sampler.address_mode_u = state.address_mode_u;
    new.sampler.address_mode_v = state.address_mode_v;
    new.transform = state.transform;
    if let Some(extension) = state.extension {
        new.extensions.khr_texture_transform = Some(extension);
    }
    new.needs_update();
}
