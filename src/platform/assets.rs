//! Decoded image lookup
//!
//! The core never loads files itself. The platform decodes every stick
//! image up front and hands them over through [`AssetProvider`].

use std::collections::HashMap;

use crate::catalog::StickId;
use crate::hitbox::RgbaImage;

/// Supplies decoded stick images by id
pub trait AssetProvider {
    fn stick_image(&self, id: StickId) -> Option<&RgbaImage>;
}

/// In-memory image set
#[derive(Debug, Default, Clone)]
pub struct ImageStore {
    images: HashMap<StickId, RgbaImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: StickId, image: RgbaImage) {
        self.images.insert(id, image);
    }

    pub fn with(mut self, id: StickId, image: RgbaImage) -> Self {
        self.insert(id, image);
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetProvider for ImageStore {
    fn stick_image(&self, id: StickId) -> Option<&RgbaImage> {
        self.images.get(&id)
    }
}
