use image::GenericImageView;
use tree_packer_core::prelude::*;

#[test]
fn update_region_union_and_empty() {
    let a = UpdateRegion {
        x: 2,
        y: 2,
        width: 4,
        height: 4,
    };
    let b = UpdateRegion {
        x: 10,
        y: 0,
        width: 2,
        height: 3,
    };
    let u = a.union(&b);
    assert_eq!(
        u,
        UpdateRegion {
            x: 2,
            y: 0,
            width: 10,
            height: 6
        }
    );
    assert_eq!(UpdateRegion::empty().union(&a), a);
    assert_eq!(a.union(&UpdateRegion::empty()), a);
    assert!(UpdateRegion::empty().is_empty());
    assert_eq!(u.area(), 60);
}

#[test]
fn commits_accumulate_until_update() {
    let mut tex = StagingTexture::new(32, 32, PixelFormat::Rgba8).bound();
    assert!(!tex.requires_update());
    assert!(tex.update().is_none());

    tex.commit(Region::new(0, 0, 2, 2), &[7u8; 16]).unwrap();
    tex.commit(Region::new(8, 4, 1, 1), &[9u8; 4]).unwrap();
    assert!(tex.requires_update());

    let dirty = tex.update().expect("pending update");
    assert_eq!(
        dirty,
        UpdateRegion {
            x: 0,
            y: 0,
            width: 9,
            height: 5
        }
    );
    assert!(!tex.requires_update());
    assert!(tex.update().is_none());
}

#[test]
fn commit_rejects_out_of_bounds_and_bad_length() {
    let mut tex = StagingTexture::new(8, 8, PixelFormat::Rgb8).bound();
    assert!(matches!(
        tex.commit(Region::new(6, 6, 4, 1), &[0u8; 12]),
        Err(TreePackerError::InvalidInput(_))
    ));
    assert!(matches!(
        tex.commit(Region::new(0, 0, 2, 2), &[0u8; 5]),
        Err(TreePackerError::PayloadSize {
            expected: 12,
            actual: 5
        })
    ));
    assert!(!tex.requires_update());
}

#[test]
fn regions_near_u32_max_are_out_of_bounds() {
    let mut tex = StagingTexture::new(8, 8, PixelFormat::L8).bound();
    let far = Region::new(u32::MAX - 1, 0, 4, 1);
    assert!(matches!(
        tex.region_pixels(far),
        Err(TreePackerError::InvalidInput(_))
    ));
    assert!(matches!(
        tex.commit(far, &[0u8; 4]),
        Err(TreePackerError::InvalidInput(_))
    ));
    assert!(matches!(
        tex.region_pixels(Region::new(0, u32::MAX, 1, 1)),
        Err(TreePackerError::InvalidInput(_))
    ));
    assert!(!tex.requires_update());
}

#[test]
fn rows_land_at_stride_offsets() {
    let mut tex = StagingTexture::new(4, 4, PixelFormat::L8).bound();
    tex.commit(Region::new(1, 2, 2, 2), &[1, 2, 3, 4]).unwrap();
    #[rustfmt::skip]
    let expected = vec![
        0, 0, 0, 0,
        0, 0, 0, 0,
        0, 1, 2, 0,
        0, 3, 4, 0,
    ];
    assert_eq!(tex.pixels(), expected.as_slice());
}

#[test]
fn to_image_matches_format() {
    let mut tex = StagingTexture::new(4, 2, PixelFormat::Rgba8);
    tex.bind();
    tex.commit(Region::new(3, 1, 1, 1), &[10, 20, 30, 40]).unwrap();
    let img = tex.to_image().unwrap();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 1).0, [10, 20, 30, 40]);

    let gray = StagingTexture::new(3, 3, PixelFormat::L8).to_image().unwrap();
    assert!(gray.as_luma8().is_some());
}
