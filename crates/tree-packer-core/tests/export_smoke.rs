use tree_packer_core::prelude::*;
use tree_packer_core::{to_json_array, to_json_hash};

fn layout() -> Layout<String> {
    let mut packer = TreePacker::new(32, 32);
    let placements = [("hero", 16, 16), ("coin", 8, 8)]
        .into_iter()
        .map(|(k, w, h)| Placement {
            key: k.to_string(),
            region: packer.insert(w, h).unwrap(),
        })
        .collect();
    Layout {
        width: 32,
        height: 32,
        placements,
        meta: Meta::new(PixelFormat::Rgba8.name(), (32, 32)),
    }
}

#[test]
fn json_hash_keys_frames_by_name() {
    let v = to_json_hash(&layout());
    assert_eq!(v["frames"]["hero"]["frame"]["w"], 16);
    assert_eq!(v["frames"]["coin"]["frame"]["x"], 16);
    assert_eq!(v["frames"]["coin"]["sourceSize"]["h"], 8);
    assert_eq!(v["meta"]["app"], "tree-packer");
    assert_eq!(v["meta"]["format"], "RGBA8888");
}

#[test]
fn json_array_keeps_insertion_order() {
    let v = to_json_array(&layout());
    let frames = v["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["key"], "hero");
    assert_eq!(frames[1]["key"], "coin");
    assert_eq!(v["size"]["w"], 32);
}

#[test]
fn layout_roundtrips_through_serde() {
    let l = layout();
    let s = serde_json::to_string(&l).unwrap();
    let back: Layout<String> = serde_json::from_str(&s).unwrap();
    assert_eq!(back.placements.len(), 2);
    assert_eq!(back.placements[1].region, l.placements[1].region);
}
