use crate::config::PackerConfig;
use crate::error::{Result, TreePackerError};
use crate::model::Region;
use crate::packer::TreePacker;
use tracing::instrument;

/// Destination for sprite pixels once the allocator has picked their region.
///
/// Implemented by [`crate::staging::StagingTexture`]; renderers plug in their own
/// GPU-backed target.
pub trait CommitTarget {
    /// False until the destination resource exists; `SpritePack::add` refuses to run before that.
    fn is_bound(&self) -> bool;
    fn bytes_per_pixel(&self) -> usize;
    /// Pixel size of the destination; must cover the packer's canvas.
    fn dimensions(&self) -> (u32, u32);
    /// Writes tightly packed rows (`region.w * bytes_per_pixel` bytes each) into `region`.
    fn commit(&mut self, region: Region, pixels: &[u8]) -> Result<()>;
}

/// Tree allocator paired with the texture its regions address.
///
/// Serves both dynamic sprite packs and glyph/texture atlases; the only
/// difference between those is the commit target.
pub struct SpritePack<T: CommitTarget> {
    packer: TreePacker,
    target: T,
}

impl<T: CommitTarget> SpritePack<T> {
    /// Pairs `packer` with `target`; fails if the target is smaller than the canvas.
    pub fn new(packer: TreePacker, target: T) -> Result<Self> {
        let (cw, ch) = packer.canvas_size();
        let (tw, th) = target.dimensions();
        if tw < cw || th < ch {
            return Err(TreePackerError::InvalidDimensions {
                width: tw,
                height: th,
            });
        }
        Ok(Self { packer, target })
    }

    pub fn from_config(cfg: &PackerConfig, target: T) -> Result<Self> {
        Self::new(TreePacker::from_config(cfg)?, target)
    }

    /// Reserves a `w` x `h` region and, if `payload` holds pixels, commits them into it.
    ///
    /// Every precondition is checked before the tree is touched. The region is
    /// located first and only occupied once the commit succeeded, so a failed call
    /// never bumps the allocation count or leaks canvas space (a rejected commit
    /// may leave the pre-splits [`TreePacker::can_fit`] would make). An empty
    /// payload reserves space without committing anything.
    #[instrument(skip(self, payload), fields(bytes = payload.map(|p| p.len())))]
    pub fn add(&mut self, w: u32, h: u32, payload: Option<&[u8]>) -> Result<Region> {
        if !self.target.is_bound() {
            return Err(TreePackerError::NotBound);
        }
        if w == 0 || h == 0 {
            return Err(TreePackerError::InvalidSize {
                width: w,
                height: h,
            });
        }
        let payload = payload.filter(|p| !p.is_empty());
        if let Some(pixels) = payload {
            let expected = (w as usize) * (h as usize) * self.target.bytes_per_pixel();
            if pixels.len() != expected {
                return Err(TreePackerError::PayloadSize {
                    expected,
                    actual: pixels.len(),
                });
            }
        }

        let region = self.packer.locate(w, h)?;
        if let Some(pixels) = payload {
            self.target.commit(region, pixels)?;
        }
        self.packer.insert(w, h)
    }

    /// See [`TreePacker::can_fit`]; the same pre-splitting applies.
    pub fn can_fit(&mut self, w: u32, h: u32) -> bool {
        self.packer.can_fit(w, h)
    }

    pub fn allocation_count(&self) -> usize {
        self.packer.allocation_count()
    }

    pub fn packer(&self) -> &TreePacker {
        &self.packer
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_parts(self) -> (TreePacker, T) {
        (self.packer, self.target)
    }
}
