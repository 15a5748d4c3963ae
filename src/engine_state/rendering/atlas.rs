//! # Texture Atlas
//!
//! The block textures live in one 512 x 512 image split into a 32 x 32 grid of 16 px cells.
//! A cell is addressed by `(x, y)` counted from the top-left corner of the image.
//!
//! [`UvRect::for_cell`] gives the cell's texture rectangle in bottom-up (`v` grows upward)
//! coordinates, shrunk by one texel on every edge so neighbouring cells never bleed in under
//! nearest filtering. [`UvRect::texture_coords`] converts to wgpu's top-down convention.
//!
//! Decoded images are held by a [`ResourceCache`] that the engine owns, so an atlas is read
//! from disk at most once no matter how many consumers ask for it.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use image::{imageops::FilterType, Rgba, RgbaImage};
use log::{info, warn};

use crate::error::ViewerError;

/// Cells per atlas side.
pub const ATLAS_CELLS: u32 = 32;
/// Pixels per cell side.
pub const CELL_PIXELS: u32 = 16;
/// Pixels per atlas side.
pub const ATLAS_PIXELS: u32 = ATLAS_CELLS * CELL_PIXELS;

const INSET: f32 = 1.0 / ATLAS_PIXELS as f32;

/// Texture rectangle of one atlas cell, `v` measured upward from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl UvRect {
    /// The inset rectangle of cell `(cx, cy)`.
    pub fn for_cell(cx: u32, cy: u32) -> Self {
        let cells = ATLAS_CELLS as f32;
        let (cx, cy) = (cx as f32, cy as f32);
        Self {
            u_min: cx / cells + INSET,
            u_max: (cx + 1.0) / cells - INSET,
            v_min: 1.0 - (cy + 1.0) / cells + INSET,
            v_max: 1.0 - cy / cells - INSET,
        }
    }

    /// Texture coordinates, in wgpu's top-down convention, of the point `(s, t)` of a face,
    /// where `(0, 0)` is the face's bottom-left corner and `(1, 1)` its top-right.
    pub fn texture_coords(&self, s: f32, t: f32) -> [f32; 2] {
        let u = self.u_min + (self.u_max - self.u_min) * s;
        let v = self.v_min + (self.v_max - self.v_min) * t;
        [u, 1.0 - v]
    }
}

/// A decoded RGBA atlas image.
#[derive(Debug)]
pub struct TextureAtlas {
    image: RgbaImage,
}

impl TextureAtlas {
    /// Reads the atlas at `path`.
    ///
    /// A missing file is replaced by [`TextureAtlas::placeholder`]. An image of the wrong size
    /// is rescaled so cell addressing still holds.
    ///
    /// # Errors
    /// [`ViewerError::Atlas`] if the file exists but cannot be decoded.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        if !path.exists() {
            warn!(
                "Texture atlas {} not found, using a placeholder",
                path.display()
            );
            return Ok(Self::placeholder());
        }

        let decoded = image::open(path).map_err(|source| ViewerError::Atlas {
            path: path.to_path_buf(),
            source,
        })?;
        let mut image = decoded.to_rgba8();

        if image.dimensions() != (ATLAS_PIXELS, ATLAS_PIXELS) {
            warn!(
                "Texture atlas {} is {}x{}, rescaling to {ATLAS_PIXELS}x{ATLAS_PIXELS}",
                path.display(),
                image.width(),
                image.height()
            );
            image = image::imageops::resize(&image, ATLAS_PIXELS, ATLAS_PIXELS, FilterType::Nearest);
        }

        info!("Loaded texture atlas {}", path.display());
        Ok(Self { image })
    }

    /// A grey checkerboard, one shade per cell, with a darker one-texel border around each cell.
    pub fn placeholder() -> Self {
        let image = RgbaImage::from_fn(ATLAS_PIXELS, ATLAS_PIXELS, |x, y| {
            let (local_x, local_y) = (x % CELL_PIXELS, y % CELL_PIXELS);
            if local_x == 0 || local_y == 0 || local_x == CELL_PIXELS - 1 || local_y == CELL_PIXELS - 1 {
                return Rgba([70, 70, 74, 255]);
            }
            let checker = ((x / CELL_PIXELS) + (y / CELL_PIXELS)) % 2;
            let shade = if checker == 0 { 128 } else { 150 };
            Rgba([shade, shade, shade + 6, 255])
        });

        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Tightly packed RGBA8 rows, top row first.
    pub fn rgba(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Engine-owned cache of decoded atlases keyed by path.
#[derive(Debug, Default)]
pub struct ResourceCache {
    atlases: HashMap<PathBuf, Rc<TextureAtlas>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The atlas at `path`, decoding it on first request.
    pub fn atlas(&mut self, path: &Path) -> Result<Rc<TextureAtlas>, ViewerError> {
        if let Some(atlas) = self.atlases.get(path) {
            return Ok(Rc::clone(atlas));
        }

        let atlas = Rc::new(TextureAtlas::load(path)?);
        self.atlases.insert(path.to_path_buf(), Rc::clone(&atlas));
        Ok(atlas)
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn stone_cell_rect() {
        let rect = UvRect::for_cell(19, 6);
        assert!(close(rect.u_min, 19.0 / 32.0 + 1.0 / 512.0));
        assert!(close(rect.u_max, 20.0 / 32.0 - 1.0 / 512.0));
        assert!(close(rect.v_min, 1.0 - 7.0 / 32.0 + 1.0 / 512.0));
        assert!(close(rect.v_max, 1.0 - 6.0 / 32.0 - 1.0 / 512.0));
    }

    #[test]
    fn texture_coords_flip_to_top_down() {
        let rect = UvRect::for_cell(0, 0);
        // Top-left corner of the face lands on the top-left texel of cell (0, 0).
        let [u, v] = rect.texture_coords(0.0, 1.0);
        assert!(close(u, 1.0 / 512.0));
        assert!(close(v, 1.0 / 512.0));

        let [u, v] = rect.texture_coords(1.0, 0.0);
        assert!(close(u, 16.0 / 512.0 - 1.0 / 512.0));
        assert!(close(v, 16.0 / 512.0 - 1.0 / 512.0));
    }

    #[test]
    fn placeholder_has_atlas_dimensions() {
        let atlas = TextureAtlas::placeholder();
        assert_eq!((atlas.width(), atlas.height()), (ATLAS_PIXELS, ATLAS_PIXELS));
        assert_eq!(atlas.rgba().len(), (ATLAS_PIXELS * ATLAS_PIXELS * 4) as usize);
    }

    #[test]
    fn cache_loads_each_path_once() {
        let mut cache = ResourceCache::new();
        let path = Path::new("/definitely/not/here/atlas.png");

        let first = cache.atlas(path).unwrap();
        let second = cache.atlas(path).unwrap();
        assert_eq!(first.rgba(), TextureAtlas::placeholder().rgba());
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn undecodable_file_is_an_atlas_error() {
        let path = std::env::temp_dir().join(format!(
            "voxel_viewer_bad_atlas_{}.png",
            std::process::id()
        ));
        std::fs::write(&path, b"not a png").unwrap();

        let result = TextureAtlas::load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ViewerError::Atlas { .. })));
    }
}
