use crate::config::PackerConfig;
use crate::error::{Result, TreePackerError};
use crate::model::{PackStats, Region};
use tracing::debug;

pub mod node;

pub use node::{LeafState, Node, SplitAxis};

/// Binary-tree rectangle allocator over a fixed canvas.
///
/// Rectangles are placed without ever moving earlier placements, and nothing is
/// ever freed: the tree only grows until it is dropped as a whole.
/// Not internally synchronized; keep each packer on one thread.
#[derive(Debug)]
pub struct TreePacker {
    canvas_size: (u32, u32),
    root: Node,
    allocation_count: usize,
}

impl TreePacker {
    /// Canvas of `width` x `height` with a single free leaf at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas_size: (width, height),
            root: Node::new(Region::new(0, 0, width, height)),
            allocation_count: 0,
        }
    }

    pub fn from_config(cfg: &PackerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg.canvas_width, cfg.canvas_height))
    }

    /// Places a `w` x `h` rectangle and returns its region on the canvas.
    pub fn insert(&mut self, w: u32, h: u32) -> Result<Region> {
        if w == 0 || h == 0 {
            return Err(TreePackerError::InvalidSize {
                width: w,
                height: h,
            });
        }
        match self.root.try_insert(w, h) {
            Some(region) => {
                self.allocation_count += 1;
                debug!(?region, count = self.allocation_count, "allocated");
                Ok(region)
            }
            None => Err(TreePackerError::CanvasFull {
                width: w,
                height: h,
            }),
        }
    }

    /// Reports whether `w` x `h` would fit right now.
    ///
    /// Pre-splits the tree along the path an insertion would take (see
    /// [`Node::can_insert`]), so the next `insert(w, h)` is guaranteed to succeed.
    /// The allocation counter is never touched.
    pub fn can_fit(&mut self, w: u32, h: u32) -> bool {
        if w == 0 || h == 0 {
            return false;
        }
        self.root.can_insert(w, h)
    }

    /// Region the next `insert(w, h)` will return, without occupying it.
    ///
    /// Pre-splits exactly like [`TreePacker::can_fit`] and leaves the counter alone.
    pub fn locate(&mut self, w: u32, h: u32) -> Result<Region> {
        if w == 0 || h == 0 {
            return Err(TreePackerError::InvalidSize {
                width: w,
                height: h,
            });
        }
        self.root
            .find_slot(w, h)
            .ok_or(TreePackerError::CanvasFull {
                width: w,
                height: h,
            })
    }

    pub fn allocation_count(&self) -> usize {
        self.allocation_count
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Snapshot of every leaf, left subtree first.
    pub fn leaves(&self) -> Vec<(Region, LeafState)> {
        let mut out = Vec::new();
        self.root.for_each_leaf(&mut |leaf| {
            if let Some(state) = leaf.state() {
                out.push((leaf.region(), state));
            }
        });
        out
    }

    /// Regions handed out so far, in tree order (not insertion order).
    pub fn occupied(&self) -> Vec<Region> {
        self.leaves()
            .into_iter()
            .filter(|(_, s)| *s == LeafState::Occupied)
            .map(|(r, _)| r)
            .collect()
    }

    /// Computes occupancy and tree-shape statistics.
    pub fn stats(&self) -> PackStats {
        let mut used_area = 0u64;
        let mut free_leaves = 0;
        let mut occupied_leaves = 0;
        self.root.for_each_leaf(&mut |leaf| match leaf.state() {
            Some(LeafState::Occupied) => {
                occupied_leaves += 1;
                used_area += leaf.region().area();
            }
            Some(LeafState::Free) => free_leaves += 1,
            None => {}
        });

        let canvas_area = (self.canvas_size.0 as u64) * (self.canvas_size.1 as u64);
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };

        PackStats {
            canvas_area,
            used_area,
            occupancy,
            allocations: self.allocation_count,
            free_leaves,
            occupied_leaves,
            node_count: self.root.node_count(),
            depth: self.root.depth(),
        }
    }
}
