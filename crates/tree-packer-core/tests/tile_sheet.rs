use image::{DynamicImage, Rgba, RgbaImage};
use tree_packer_core::prelude::*;

/// 3x2 grid of 4px tiles, each filled with its own id, plus a 2px ragged edge on the right.
fn sheet() -> DynamicImage {
    let mut img = RgbaImage::new(14, 8);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let id = if x >= 12 { 255 } else { (y / 4) * 3 + x / 4 };
        *px = Rgba([id as u8, 0, 0, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

#[test]
fn slices_row_major_and_drops_partial_tiles() {
    let tiles = TileSheet::from_image(&sheet(), 4, PixelFormat::Rgba8).unwrap();
    assert_eq!(tiles.columns(), 3);
    assert_eq!(tiles.rows(), 2);
    assert_eq!(tiles.total(), 6);
    assert_eq!(tiles.tile_size(), 4);

    for (id, pix) in tiles.iter() {
        assert_eq!(pix.len(), 4 * 4 * 4);
        assert!(pix.chunks_exact(4).all(|p| p == [id as u8, 0, 0, 255]));
    }
    assert_eq!(tiles.tile_rect(4).unwrap(), Region::new(4, 4, 4, 4));
}

#[test]
fn out_of_range_tile_id() {
    let tiles = TileSheet::from_image(&sheet(), 4, PixelFormat::Rgba8).unwrap();
    assert!(matches!(
        tiles.tile(6),
        Err(TreePackerError::InvalidTileId { id: 6, total: 6 })
    ));
    assert!(tiles.tile_rect(99).is_err());
    assert!(tiles.tile(5).is_ok());
}

#[test]
fn invalid_tile_sizes() {
    let img = sheet();
    assert!(matches!(
        TileSheet::from_image(&img, 0, PixelFormat::Rgba8),
        Err(TreePackerError::InvalidDimensions { .. })
    ));
    assert!(TileSheet::from_image(&img, 9, PixelFormat::Rgba8).is_err());
}

#[test]
fn tiles_repack_into_sprite_pack() {
    let tiles = TileSheet::from_image(&sheet(), 4, PixelFormat::Rgba8).unwrap();
    let cfg = PackerConfig::builder().with_square_canvas(8).build();
    let texture = StagingTexture::from_config(&cfg).unwrap().bound();
    let mut pack = SpritePack::from_config(&cfg, texture).unwrap();

    let mut placed = Vec::new();
    for (id, pix) in tiles.iter().take(4) {
        let r = pack.add(tiles.tile_size(), tiles.tile_size(), Some(pix)).unwrap();
        placed.push((id, r));
    }
    assert!(pack.add(4, 4, tiles.tile(4).ok()).is_err());
    for (id, r) in placed {
        assert_eq!(pack.target().region_pixels(r).unwrap(), tiles.tile(id).unwrap());
    }
}

#[test]
fn luma_slicing_converts_pixels() {
    let tiles = TileSheet::from_image(&sheet(), 4, PixelFormat::L8).unwrap();
    assert_eq!(tiles.tile(0).unwrap().len(), 16);
    assert_eq!(tiles.format(), PixelFormat::L8);
}
