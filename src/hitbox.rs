//! Pixel-accurate hitboxes for stick images
//!
//! A hitbox is derived once per stick from the image's alpha channel:
//! - `content_bounds`: tight box around solid pixels (used for layout)
//! - `local_bounds`: content box plus padding, clamped to the image (fast reject)
//! - `alpha_map`: 2x downsampled occupancy grid (precise confirm)
//!
//! Hitboxes are immutable and cached by stick id for the life of the process.

use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;

use crate::catalog::StickId;
use crate::error::{GameError, GameResult};
use crate::tuning::HitboxTuning;

/// Decoded RGBA8 image, row-major
#[derive(Debug, Clone)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> GameResult<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(GameError::InvalidImage {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Solid-colour image, handy for placeholders and tests
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels as `[r, g, b, a]` texels
    pub fn texels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn texels_mut(&mut self) -> &mut [[u8; 4]] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.texels()[(y * self.width + x) as usize][3]
    }
}

/// Axis-aligned rectangle in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Edges inclusive
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Downsampled occupancy grid (one cell per 2x2 source pixels)
#[derive(Debug, Clone)]
pub struct AlphaMap {
    pub width: u32,
    pub height: u32,
    cells: Vec<bool>,
}

impl AlphaMap {
    fn build(image: &RgbaImage, threshold: u8) -> Self {
        let width = image.width().div_ceil(2);
        let height = image.height().div_ceil(2);
        let mut cells = vec![false; width as usize * height as usize];

        for my in 0..height {
            for mx in 0..width {
                let solid = (0..2).any(|dy| {
                    (0..2).any(|dx| {
                        let (px, py) = (mx * 2 + dx, my * 2 + dy);
                        px < image.width() && py < image.height() && image.alpha(px, py) > threshold
                    })
                });
                cells[(my * width + mx) as usize] = solid;
            }
        }

        Self { width, height, cells }
    }

    /// Cell solidity, `None` outside the grid
    pub fn get(&self, x: i64, y: i64) -> Option<bool> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.cells[(y as u32 * self.width + x as u32) as usize])
    }
}

/// Derived hit-testing geometry for one image
#[derive(Debug, Clone)]
pub struct Hitbox {
    pub local_bounds: Rect,
    pub image_width: u32,
    pub image_height: u32,
    pub content_bounds: Rect,
    pub alpha_map: AlphaMap,
}

impl Hitbox {
    /// True when the image had no solid pixels
    pub fn is_degenerate(&self) -> bool {
        self.content_bounds.is_empty()
    }
}

/// Scan an image and derive its hitbox
pub fn compute_hitbox(image: &RgbaImage, tuning: HitboxTuning) -> Hitbox {
    let threshold = tuning.alpha_threshold;
    let mut min = (u32::MAX, u32::MAX);
    let mut max = (0u32, 0u32);
    let mut any_solid = false;

    for y in 0..image.height() {
        for x in 0..image.width() {
            if image.alpha(x, y) > threshold {
                any_solid = true;
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            }
        }
    }

    let (content_bounds, local_bounds) = if any_solid {
        let content = Rect::new(
            min.0 as f32,
            min.1 as f32,
            (max.0 - min.0 + 1) as f32,
            (max.1 - min.1 + 1) as f32,
        );
        let pad = tuning.padding;
        let x0 = min.0.saturating_sub(pad);
        let y0 = min.1.saturating_sub(pad);
        let x1 = (max.0 + 1 + pad).min(image.width());
        let y1 = (max.1 + 1 + pad).min(image.height());
        let local = Rect::new(x0 as f32, y0 as f32, (x1 - x0) as f32, (y1 - y0) as f32);
        (content, local)
    } else {
        (Rect::default(), Rect::default())
    };

    Hitbox {
        local_bounds,
        image_width: image.width(),
        image_height: image.height(),
        content_bounds,
        alpha_map: AlphaMap::build(image, threshold),
    }
}

/// Test a point in the image's unscaled local frame.
///
/// Bounding-box reject first; with `precise`, confirm against the alpha map.
/// Points inside the bounds but off the grid count as hits.
pub fn is_point_in_hitbox(local: Vec2, hitbox: &Hitbox, precise: bool) -> bool {
    let bounds = hitbox.local_bounds;
    if bounds.is_empty() || !bounds.contains(local) {
        return false;
    }

    if precise {
        let mx = (local.x / 2.0).floor() as i64;
        let my = (local.y / 2.0).floor() as i64;
        if let Some(solid) = hitbox.alpha_map.get(mx, my) {
            return solid;
        }
    }

    true
}

/// Process-lifetime hitbox cache keyed by stick id
#[derive(Debug, Default)]
pub struct HitboxCache {
    tuning: HitboxTuning,
    entries: HashMap<StickId, Rc<Hitbox>>,
}

impl HitboxCache {
    pub fn new(tuning: HitboxTuning) -> Self {
        Self {
            tuning,
            entries: HashMap::new(),
        }
    }

    /// Cached hitbox for `id`, computing it from `image` on first use
    pub fn calculate(&mut self, image: &RgbaImage, id: StickId) -> Rc<Hitbox> {
        let tuning = self.tuning;
        self.entries
            .entry(id)
            .or_insert_with(|| Rc::new(compute_hitbox(image, tuning)))
            .clone()
    }

    pub fn get(&self, id: StickId) -> Option<Rc<Hitbox>> {
        self.entries.get(&id).cloned()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
