use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Pixel layout of the destination texture.
/// Determines the expected payload size (`w * h * bytes_per_pixel`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel.
    Rgba8,
    /// 8-bit RGB, 3 bytes per pixel.
    Rgb8,
    /// 8-bit luminance + alpha, 2 bytes per pixel.
    La8,
    /// 8-bit luminance, 1 byte per pixel (glyph caches).
    L8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
            Self::La8 => 2,
            Self::L8 => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rgba8 => "RGBA8888",
            Self::Rgb8 => "RGB888",
            Self::La8 => "LA88",
            Self::L8 => "L8",
        }
    }
}

impl FromStr for PixelFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgba8" | "rgba" => Ok(Self::Rgba8),
            "rgb8" | "rgb" => Ok(Self::Rgb8),
            "la8" | "la" => Ok(Self::La8),
            "l8" | "l" | "luma" => Ok(Self::L8),
            _ => Err(()),
        }
    }
}

/// Sorting orders applied by batch callers before feeding the allocator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AreaDesc,
    MaxSideDesc,
    HeightDesc,
    WidthDesc,
    NameAsc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "height_desc" => Ok(Self::HeightDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "name_asc" => Ok(Self::NameAsc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl SortOrder {
    /// Sorts `(key, w, h)` entries in place. Ties fall back to the key so batches are deterministic.
    pub fn sort<K: Ord>(&self, items: &mut [(K, u32, u32)]) {
        match self {
            SortOrder::AreaDesc => items.sort_by(|a, b| {
                let aa = (a.1 as u64) * (a.2 as u64);
                let ba = (b.1 as u64) * (b.2 as u64);
                ba.cmp(&aa).then_with(|| a.0.cmp(&b.0))
            }),
            SortOrder::MaxSideDesc => {
                items.sort_by(|a, b| b.1.max(b.2).cmp(&a.1.max(a.2)).then_with(|| a.0.cmp(&b.0)))
            }
            SortOrder::HeightDesc => items.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0))),
            SortOrder::WidthDesc => items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))),
            SortOrder::NameAsc => items.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::None => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// Pixel layout of the destination texture.
    #[serde(default = "default_format")]
    pub format: PixelFormat,
    /// Order in which batch callers submit rectangles.
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1024,
            canvas_height: 1024,
            format: default_format(),
            sort_order: default_sort_order(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Canvas dimensions are zero
    /// - The staging frame (`width * height * bytes_per_pixel`) would not be addressable
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::TreePackerError;

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(TreePackerError::InvalidDimensions {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }

        let frame_bytes = (self.canvas_width as usize)
            .checked_mul(self.canvas_height as usize)
            .and_then(|px| px.checked_mul(self.format.bytes_per_pixel()));
        if frame_bytes.is_none() {
            return Err(TreePackerError::InvalidConfig(format!(
                "canvas {}x{} with {} bytes per pixel overflows the address space",
                self.canvas_width,
                self.canvas_height,
                self.format.bytes_per_pixel()
            )));
        }

        Ok(())
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_format() -> PixelFormat {
    PixelFormat::Rgba8
}
fn default_sort_order() -> SortOrder {
    SortOrder::AreaDesc
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_canvas_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.canvas_width = w;
        self.cfg.canvas_height = h;
        self
    }
    /// Square canvas, as used by sprite packs and glyph caches.
    pub fn with_square_canvas(self, size: u32) -> Self {
        self.with_canvas_size(size, size)
    }
    pub fn format(mut self, v: PixelFormat) -> Self {
        self.cfg.format = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}
