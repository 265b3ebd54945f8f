use crate::model::Layout;
use serde::Serialize;
use serde_json::{json, Value};

/// Serialize the whole `Layout` as `{ size, frames: [...], meta }` (array style).
pub fn to_json_array<K: ToString + Clone + Serialize>(layout: &Layout<K>) -> Value {
    let frames_val = layout
        .placements
        .iter()
        .map(|p| {
            let r = &p.region;
            json!({
                "key": p.key.to_string(),
                "frame": {"x": r.x, "y": r.y, "w": r.w, "h": r.h},
            })
        })
        .collect::<Vec<_>>();
    json!({
        "size": {"w": layout.width, "h": layout.height},
        "frames": frames_val,
        "meta": &layout.meta,
    })
}

/// Frames keyed by name: `{ frames: { name: { frame, sourceSize } }, meta }`.
/// Close to the TexturePacker JSON hash that most engine loaders already read.
pub fn to_json_hash<K: ToString + Clone>(layout: &Layout<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for p in &layout.placements {
        let r = &p.region;
        frames.insert(
            p.key.to_string(),
            json!({
                "frame": {"x": r.x, "y": r.y, "w": r.w, "h": r.h},
                "rotated": false,
                "trimmed": false,
                "sourceSize": {"w": r.w, "h": r.h},
            }),
        );
    }
    json!({ "frames": frames, "meta": &layout.meta })
}
