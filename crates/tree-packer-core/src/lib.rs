//! Core library for dynamic texture atlases backed by a binary-tree rectangle allocator.
//!
//! - Allocator: `TreePacker` places rectangles on a fixed canvas by guillotine-splitting free leaves; insertion-only
//! - Sprite packs: `SpritePack` pairs the allocator with a `CommitTarget` that receives sprite pixels
//! - Helpers: `StagingTexture` (host-side frame + dirty region), `TileSheet` (fixed-grid slicing), JSON export
//!
//! Quick example:
//! ```
//! use tree_packer_core::prelude::*;
//! # fn main() -> tree_packer_core::Result<()> {
//! let cfg = PackerConfig::builder().with_square_canvas(256).build();
//! let texture = StagingTexture::from_config(&cfg)?.bound();
//! let mut pack = SpritePack::from_config(&cfg, texture)?;
//! let region = pack.add(2, 2, Some(&[255u8; 2 * 2 * 4]))?;
//! assert_eq!((region.x, region.y, region.w, region.h), (0, 0, 2, 2));
//! assert_eq!(pack.allocation_count(), 1);
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod sprite_pack;
pub mod staging;
pub mod tiles;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use sprite_pack::*;

/// Convenience prelude for common types and functions.
/// Importing `tree_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder, PixelFormat, SortOrder};
    pub use crate::error::{Result, TreePackerError};
    pub use crate::model::{Layout, Meta, PackStats, Placement, Region};
    pub use crate::packer::{LeafState, Node, SplitAxis, TreePacker};
    pub use crate::sprite_pack::{CommitTarget, SpritePack};
    pub use crate::staging::{image_bytes, StagingTexture, UpdateRegion};
    pub use crate::tiles::TileSheet;
}
