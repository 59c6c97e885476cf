use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Global Image ID generator
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded pixel data handed over by the texture loader.
///
/// Pixels are shared, so cloning an `Image` never copies the bitmap.
#[derive(Debug, Clone)]
pub struct Image {
    id: u64,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    data: Arc<Vec<u8>>,
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Image {
    pub fn new(label: &str, width: u32, height: u32, format: wgpu::TextureFormat, data: Vec<u8>) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
            width,
            height,
            format,
            data: Arc::new(data),
        }
    }

    /// 8-bit sRGB RGBA bitmap, the format decals are decoded to.
    pub fn rgba8(label: &str, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self::new(label, width, height, wgpu::TextureFormat::Rgba8UnormSrgb, data)
    }

    /// 1x1 image of a single color.
    pub fn solid(label: &str, color: [u8; 4]) -> Self {
        Self::rgba8(label, 1, 1, color.to_vec())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}
