use tree_packer_core::prelude::*;

#[test]
fn can_fit_then_insert_lands_exactly() {
    for (w, h) in [(1, 1), (7, 13), (64, 3), (64, 64), (33, 64)] {
        let mut packer = TreePacker::new(64, 64);
        assert!(packer.can_fit(w, h), "{w}x{h} should fit");
        let r = packer.insert(w, h).expect("insert after can_fit");
        assert_eq!((r.w, r.h), (w, h));
    }
}

#[test]
fn can_fit_presplits_without_occupying() {
    let mut packer = TreePacker::new(10, 10);
    assert!(packer.can_fit(4, 6));
    // the tree was cut exactly as an insertion would cut it
    assert_eq!(packer.root().split_axis(), Some(SplitAxis::Vertical));
    assert_eq!(packer.allocation_count(), 0);
    assert!(packer.occupied().is_empty());

    // repeated queries reuse the pre-split leaf
    let nodes = packer.root().node_count();
    assert!(packer.can_fit(4, 6));
    assert_eq!(packer.root().node_count(), nodes);

    let r = packer.insert(4, 6).unwrap();
    assert_eq!(r, Region::new(0, 0, 4, 6));
    assert_eq!(packer.root().node_count(), nodes);
}

#[test]
fn presplit_shapes_later_placements() {
    // a query for a shape that is never inserted still fragments the canvas
    let mut packer = TreePacker::new(10, 10);
    assert!(packer.can_fit(4, 4));
    assert!(packer.insert(10, 10).is_err());
    let mut fresh = TreePacker::new(10, 10);
    assert!(fresh.insert(10, 10).is_ok());
}

#[test]
fn can_fit_rejects_zero_and_oversize() {
    let mut packer = TreePacker::new(16, 16);
    assert!(!packer.can_fit(0, 4));
    assert!(!packer.can_fit(4, 0));
    assert!(!packer.can_fit(17, 1));
    assert!(packer.root().is_leaf());
}

#[test]
fn counter_moves_only_on_successful_insert() {
    let mut packer = TreePacker::new(16, 16);
    assert_eq!(packer.allocation_count(), 0);

    packer.insert(8, 8).unwrap();
    assert_eq!(packer.allocation_count(), 1);

    assert!(packer.insert(32, 1).is_err());
    assert!(packer.insert(0, 1).is_err());
    assert_eq!(packer.allocation_count(), 1);

    assert!(packer.can_fit(8, 8));
    assert!(!packer.can_fit(16, 16));
    assert_eq!(packer.allocation_count(), 1);

    packer.insert(8, 8).unwrap();
    packer.insert(4, 4).unwrap();
    assert_eq!(packer.allocation_count(), 3);
    assert_eq!(packer.stats().allocations, 3);
}

#[test]
fn zero_sized_insert_is_invalid() {
    let mut packer = TreePacker::new(16, 16);
    match packer.insert(0, 5) {
        Err(TreePackerError::InvalidSize { width, height }) => assert_eq!((width, height), (0, 5)),
        other => panic!("expected InvalidSize, got {other:?}"),
    }
}
