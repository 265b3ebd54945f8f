use tree_packer_core::config::{PackerConfig, PixelFormat, SortOrder};
use tree_packer_core::error::TreePackerError;
use tree_packer_core::packer::TreePacker;

/// Test zero-sized canvas dimensions
#[test]
fn test_zero_width() {
    let cfg = PackerConfig {
        canvas_width: 0,
        canvas_height: 1024,
        ..Default::default()
    };

    let result = cfg.validate();
    assert!(result.is_err());
    match result {
        Err(TreePackerError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 1024);
        }
        _ => panic!("Expected InvalidDimensions error"),
    }
}

#[test]
fn test_zero_height() {
    let cfg = PackerConfig {
        canvas_width: 1024,
        canvas_height: 0,
        ..Default::default()
    };
    assert!(matches!(
        TreePacker::from_config(&cfg),
        Err(TreePackerError::InvalidDimensions { width: 1024, height: 0 })
    ));
}

#[test]
fn test_defaults_are_valid() {
    let cfg = PackerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.format, PixelFormat::Rgba8);
    assert_eq!(cfg.sort_order, SortOrder::AreaDesc);
    let packer = TreePacker::from_config(&cfg).unwrap();
    assert_eq!(packer.canvas_size(), (1024, 1024));
}

#[test]
fn test_builder_sets_fields() {
    let cfg = PackerConfig::builder()
        .with_canvas_size(300, 200)
        .format(PixelFormat::La8)
        .sort_order(SortOrder::NameAsc)
        .build();
    assert_eq!((cfg.canvas_width, cfg.canvas_height), (300, 200));
    assert_eq!(cfg.format.bytes_per_pixel(), 2);
    assert_eq!(cfg.sort_order, SortOrder::NameAsc);
}

#[test]
fn test_config_serde_defaults() {
    let cfg: PackerConfig =
        serde_json::from_str(r#"{"canvas_width": 64, "canvas_height": 32}"#).unwrap();
    assert_eq!(cfg.format, PixelFormat::Rgba8);
    assert_eq!(cfg.sort_order, SortOrder::AreaDesc);

    let cfg: PackerConfig = serde_json::from_str(
        r#"{"canvas_width": 64, "canvas_height": 32, "format": "l8", "sort_order": "height_desc"}"#,
    )
    .unwrap();
    assert_eq!(cfg.format, PixelFormat::L8);
    assert_eq!(cfg.sort_order, SortOrder::HeightDesc);
}

#[test]
fn test_one_pixel_canvas() {
    let mut packer = TreePacker::new(1, 1);
    assert!(packer.can_fit(1, 1));
    assert!(packer.insert(1, 1).is_ok());
    assert!(packer.insert(1, 1).is_err());
}

#[test]
fn test_zero_canvas_never_allocates() {
    let mut packer = TreePacker::new(0, 0);
    assert!(!packer.can_fit(1, 1));
    assert!(matches!(
        packer.insert(1, 1),
        Err(TreePackerError::CanvasFull { .. })
    ));
    assert_eq!(packer.stats().occupancy, 0.0);
}

#[test]
fn test_thin_slivers() {
    let mut packer = TreePacker::new(100, 1);
    for i in 0..100 {
        let r = packer.insert(1, 1).expect("sliver fits");
        assert_eq!(r.x, i);
    }
    assert!(packer.insert(1, 1).is_err());
    assert_eq!(packer.allocation_count(), 100);
}
