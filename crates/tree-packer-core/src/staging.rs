use crate::config::{PackerConfig, PixelFormat};
use crate::error::{Result, TreePackerError};
use crate::model::Region;
use crate::sprite_pack::CommitTarget;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use tracing::trace;

/// Region that needs to be updated on the GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRegion {
    /// X coordinate of the region.
    pub x: u32,
    /// Y coordinate of the region.
    pub y: u32,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

impl UpdateRegion {
    /// Create an empty update region.
    pub fn empty() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        }
    }

    /// Check if this region is empty.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the area of this region in pixels.
    pub fn area(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    /// Smallest region covering both; empty regions are ignored.
    pub fn union(&self, other: &UpdateRegion) -> UpdateRegion {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        UpdateRegion {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

impl From<Region> for UpdateRegion {
    fn from(r: Region) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.w,
            height: r.h,
        }
    }
}

/// Converts `image` to tightly packed rows in `format`, ready to pass as a sprite payload.
pub fn image_bytes(image: &DynamicImage, format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::Rgba8 => image.to_rgba8().into_raw(),
        PixelFormat::Rgb8 => image.to_rgb8().into_raw(),
        PixelFormat::La8 => image.to_luma_alpha8().into_raw(),
        PixelFormat::L8 => image.to_luma8().into_raw(),
    }
}

/// Host-side copy of a packed texture.
///
/// Sprite rows are copied in as they are committed and the touched area is
/// accumulated until the renderer collects it with [`StagingTexture::update`].
pub struct StagingTexture {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
    bound: bool,
    pending: Option<UpdateRegion>,
}

impl StagingTexture {
    /// Zero-filled frame of `width` x `height`, not yet bound.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = (width as usize) * (height as usize) * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            pixels: vec![0; len],
            bound: false,
            pending: None,
        }
    }

    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg.canvas_width, cfg.canvas_height, cfg.format))
    }

    /// Marks the destination resource as created.
    pub fn bind(&mut self) {
        self.bound = true;
    }

    /// Builder-style [`StagingTexture::bind`].
    pub fn bound(mut self) -> Self {
        self.bind();
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn requires_update(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the area touched since the last call, clearing the pending flag.
    pub fn update(&mut self) -> Option<UpdateRegion> {
        self.pending.take()
    }

    /// Copies the pixels of `region` out of the frame, rows tightly packed.
    pub fn region_pixels(&self, region: Region) -> Result<Vec<u8>> {
        self.check_bounds(region)?;
        let bpp = self.format.bytes_per_pixel();
        let stride = region.w as usize * bpp;
        let mut out = Vec::with_capacity(stride * region.h as usize);
        for row in 0..region.h {
            let start = self.offset(region.x, region.y + row);
            out.extend_from_slice(&self.pixels[start..start + stride]);
        }
        Ok(out)
    }

    /// Converts the frame into an `image` buffer for encoding.
    pub fn to_image(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width, self.height);
        let raw = self.pixels.clone();
        let img = match self.format {
            PixelFormat::Rgba8 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
            PixelFormat::Rgb8 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            PixelFormat::La8 => GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
            PixelFormat::L8 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        };
        img.ok_or_else(|| TreePackerError::InvalidInput("staging frame size mismatch".into()))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * self.format.bytes_per_pixel()
    }

    fn check_bounds(&self, region: Region) -> Result<()> {
        let inside = matches!(region.x.checked_add(region.w), Some(right) if right <= self.width)
            && matches!(region.y.checked_add(region.h), Some(bottom) if bottom <= self.height);
        if !inside {
            return Err(TreePackerError::InvalidInput(format!(
                "region {}x{} at ({}, {}) exceeds texture {}x{}",
                region.w, region.h, region.x, region.y, self.width, self.height
            )));
        }
        Ok(())
    }
}

impl CommitTarget for StagingTexture {
    fn is_bound(&self) -> bool {
        self.bound
    }

    fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn commit(&mut self, region: Region, pixels: &[u8]) -> Result<()> {
        if region.w == 0 || region.h == 0 {
            return Err(TreePackerError::InvalidSize {
                width: region.w,
                height: region.h,
            });
        }
        self.check_bounds(region)?;
        let stride = region.w as usize * self.format.bytes_per_pixel();
        let expected = stride * region.h as usize;
        if pixels.len() != expected {
            return Err(TreePackerError::PayloadSize {
                expected,
                actual: pixels.len(),
            });
        }

        for (row, src) in pixels.chunks_exact(stride).enumerate() {
            let start = self.offset(region.x, region.y + row as u32);
            self.pixels[start..start + stride].copy_from_slice(src);
        }

        let touched = UpdateRegion::from(region);
        self.pending = Some(match self.pending {
            Some(prev) => prev.union(&touched),
            None => touched,
        });
        trace!(?region, "committed sprite pixels");
        Ok(())
    }
}
