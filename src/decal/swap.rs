//! Hand-off of decoded decal images from loader threads.
//!
//! Loaders push results through a [`TextureSender`]; the render side drains
//! the queue once per frame with [`TextureSwap::apply_pending`]. Only the
//! newest successful image is applied, so a slow request that finishes after
//! a newer one has already landed still loses.

use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};
use log::{debug, warn};

use crate::errors::ConformError;
use crate::resources::{Image, Material, Texture, TextureSampler, carry_transform};

#[derive(Debug)]
pub enum TextureEvent {
    Loaded { request: u64, image: Image },
    Failed { request: u64, error: ConformError },
}

impl TextureEvent {
    fn request(&self) -> u64 {
        match self {
            Self::Loaded { request, .. } | Self::Failed { request, .. } => *request,
        }
    }
}

/// Cloneable producer half handed to loaders.
#[derive(Debug, Clone)]
pub struct TextureSender {
    tx: Sender<TextureEvent>,
}

impl TextureSender {
    pub fn loaded(&self, request: u64, image: Image) {
        self.send(TextureEvent::Loaded { request, image });
    }

    pub fn failed(&self, request: u64, error: ConformError) {
        self.send(TextureEvent::Failed { request, error });
    }

    fn send(&self, event: TextureEvent) {
        if let Err(TrySendError::Disconnected(event)) = self.tx.try_send(event) {
            debug!("Texture swap receiver gone, dropping request {}", event.request());
        }
    }
}

#[derive(Debug)]
pub struct TextureSwap {
    tx: Sender<TextureEvent>,
    rx: Receiver<TextureEvent>,
    /// Newest request id applied so far.
    applied: Option<u64>,
}

impl Default for TextureSwap {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureSwap {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx, applied: None }
    }

    pub fn sender(&self) -> TextureSender {
        TextureSender { tx: self.tx.clone() }
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.applied
    }

    /// Installs the newest loaded image on `material.map`.
    ///
    /// The replacement texture inherits the previous map's UV framing via
    /// [`carry_transform`] and is stored with a single `Arc` swap. Failed
    /// loads and results older than the last applied request are logged and
    /// dropped; the current map stays in place. Returns the request id that
    /// was applied, if any.
    pub fn apply_pending(&mut self, material: &mut Material) -> Option<u64> {
        let mut newest: Option<(u64, Image)> = None;

        for event in self.rx.try_iter() {
            match event {
                TextureEvent::Loaded { request, image } => {
                    let stale = self.applied.is_some_and(|a| request <= a)
                        || newest.as_ref().is_some_and(|(n, _)| request < *n);
                    if stale {
                        debug!("Dropping stale decal request {request}");
                        continue;
                    }
                    newest = Some((request, image));
                }
                TextureEvent::Failed { request, error } => {
                    warn!("Decal request {request} failed, keeping current texture: {error}");
                }
            }
        }

        let (request, image) = newest?;
        let label = image.label.clone();
        let mut texture = Texture::new(&label, image);
        texture.sampler.anisotropy_clamp = TextureSampler::decal().anisotropy_clamp;
        carry_transform(material.map.as_deref(), &mut texture);

        material.map = Some(Arc::new(texture));
        material.needs_update();
        self.applied = Some(request);
        debug!("Applied decal request {request} to '{}'", material.name);
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_request_wins_regardless_of_arrival() {
        let mut swap = TextureSwap::new();
        let sender = swap.sender();
        sender.loaded(2, Image::solid("second", [0, 255, 0, 255]));
        sender.loaded(1, Image::solid("first", [255, 0, 0, 255]));

        let mut material = Material::new("PrintArea");
        assert_eq!(swap.apply_pending(&mut material), Some(2));
        assert_eq!(material.map.as_ref().unwrap().name, "second");

        // A late arrival of an older request is ignored.
        sender.loaded(1, Image::solid("first", [255, 0, 0, 255]));
        assert_eq!(swap.apply_pending(&mut material), None);
        assert_eq!(material.map.as_ref().unwrap().name, "second");
    }

    #[test]
    fn applied_texture_takes_name_and_pixels_from_the_image() {
        let mut swap = TextureSwap::new();
        swap.sender().loaded(7, Image::solid("upload.png", [10, 20, 30, 255]));

        let mut material = Material::new("PrintArea");
        assert_eq!(swap.apply_pending(&mut material), Some(7));
        let map = material.map.as_ref().unwrap();
        assert_eq!(map.name, "upload.png");
        assert_eq!(map.image.label, "upload.png");
        assert_eq!(map.image.width, 1);
    }

    #[test]
    fn failure_keeps_previous_map() {
        let mut swap = TextureSwap::new();
        let sender = swap.sender();
        sender.loaded(1, Image::solid("ok", [255; 4]));
        let mut material = Material::new("PrintArea");
        swap.apply_pending(&mut material);

        sender.failed(2, ConformError::AssetLoad("404".into()));
        assert_eq!(swap.apply_pending(&mut material), None);
        assert_eq!(material.map.as_ref().unwrap().name, "ok");
    }
}
