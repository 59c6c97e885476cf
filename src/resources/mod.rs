pub mod geometry;
pub mod image;
pub mod mesh;
pub mod primitives;
pub mod texture;

pub use geometry::{BoundingBox, BoundingSphere, Geometry};
pub use image::Image;
pub use mesh::{Material, Mesh, RenderState};
pub use texture::{carry_transform, KhrTextureTransform, Texture, TextureSampler, TextureTransform};
