use crate::config::PixelFormat;
use crate::error::{Result, TreePackerError};
use crate::model::Region;
use crate::staging::image_bytes;
use image::DynamicImage;
use tracing::{debug, instrument};

/// A sprite sheet cut into square tiles on a fixed grid.
///
/// Tiles are numbered row-major from the top-left. Columns or rows that do not
/// hold a whole tile are dropped.
pub struct TileSheet {
    tile_size: u32,
    columns: u32,
    rows: u32,
    format: PixelFormat,
    tiles: Vec<Vec<u8>>,
}

impl TileSheet {
    #[instrument(skip(image), fields(w = image.width(), h = image.height()))]
    pub fn from_image(image: &DynamicImage, tile_size: u32, format: PixelFormat) -> Result<Self> {
        let (w, h) = (image.width(), image.height());
        if tile_size == 0 || tile_size > w || tile_size > h {
            return Err(TreePackerError::InvalidDimensions {
                width: tile_size,
                height: tile_size,
            });
        }

        let raw = image_bytes(image, format);

        let bpp = format.bytes_per_pixel();
        let columns = w / tile_size;
        let rows = h / tile_size;
        let sheet_stride = w as usize * bpp;
        let tile_stride = tile_size as usize * bpp;

        let mut tiles = Vec::with_capacity((columns * rows) as usize);
        for ty in 0..rows {
            for tx in 0..columns {
                let mut pix = Vec::with_capacity(tile_stride * tile_size as usize);
                for iy in 0..tile_size {
                    let offset = ((ty * tile_size + iy) as usize) * sheet_stride
                        + (tx * tile_size) as usize * bpp;
                    pix.extend_from_slice(&raw[offset..offset + tile_stride]);
                }
                tiles.push(pix);
            }
        }
        debug!(columns, rows, "sliced tile sheet");

        Ok(Self {
            tile_size,
            columns,
            rows,
            format,
            tiles,
        })
    }

    pub fn total(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Pixels of tile `id`, rows tightly packed.
    pub fn tile(&self, id: usize) -> Result<&[u8]> {
        self.tiles
            .get(id)
            .map(|t| t.as_slice())
            .ok_or(TreePackerError::InvalidTileId {
                id,
                total: self.total(),
            })
    }

    /// Where tile `id` sits on the source sheet.
    pub fn tile_rect(&self, id: usize) -> Result<Region> {
        if id >= self.total() {
            return Err(TreePackerError::InvalidTileId {
                id,
                total: self.total(),
            });
        }
        let id = id as u32;
        Ok(Region::new(
            (id % self.columns) * self.tile_size,
            (id / self.columns) * self.tile_size,
            self.tile_size,
            self.tile_size,
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8])> + '_ {
        self.tiles.iter().map(|t| t.as_slice()).enumerate()
    }
}
