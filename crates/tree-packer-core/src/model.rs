use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle on the canvas (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge coordinate (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge coordinate (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Region) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two regions share at least one pixel.
    pub fn intersects(&self, r: &Region) -> bool {
        !(self.x >= r.right() || r.x >= self.right() || self.y >= r.bottom() || r.y >= self.bottom())
    }
}

/// A keyed allocation, as recorded by callers packing a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement<K = String> {
    /// User-specified key (e.g., filename or tile id).
    pub key: K,
    /// Region returned by the allocator.
    pub region: Region,
}

/// Canvas-level metadata written next to the layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub app: String,
    pub version: String,
    pub format: String,
    pub size: (u32, u32),
}

impl Meta {
    pub fn new(format: &str, size: (u32, u32)) -> Self {
        Self {
            app: "tree-packer".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            format: format.into(),
            size,
        }
    }
}

/// Every placement made on one canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout<K = String> {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement<K>>,
    pub meta: Meta,
}

/// Occupancy and tree-shape statistics for a canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackStats {
    /// Canvas width * height.
    pub canvas_area: u64,
    /// Sum of occupied leaf areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
    /// Successful allocations so far.
    pub allocations: usize,
    pub free_leaves: usize,
    pub occupied_leaves: usize,
    /// Total nodes in the tree, branches included.
    pub node_count: usize,
    /// Longest root-to-leaf path; a fresh canvas has depth 1.
    pub depth: usize,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Allocations: {}, Occupancy: {:.2}%, Canvas Area: {} px², Used Area: {} px², Nodes: {}, Depth: {}",
            self.allocations,
            self.occupancy * 100.0,
            self.canvas_area,
            self.used_area,
            self.node_count,
            self.depth,
        )
    }

    /// Returns unallocated space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }

    /// Returns unallocated space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.canvas_area > 0 {
            (self.wasted_area() as f64 / self.canvas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
