use core::fmt;
use std::io;

use log::{debug, trace, warn};
use zeroize::Zeroize;

use crate::alloc::{PinnedMemory, PinnedPages};
use crate::error::{AllocationError, CopyError, Error, RegionError};
use crate::random::EntropySource;
use crate::wipe;

/// Lifecycle of a [`LockedRegion`].
///
/// Reads and writes are only permitted while `Pinned`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RegionState {
    /// Mapped, pinned and accessible.
    Pinned,
    /// Zeroed; contents can be probed with [`LockedRegion::is_zeroized`] only.
    Cleared,
    /// Unpinned and unmapped.
    Released,
}

/// A pinned, page-backed, fixed-size memory region.
///
/// The contents are only reachable through borrows of the region itself
/// ([`bytes`](Self::bytes), [`bytes_mut`](Self::bytes_mut),
/// [`hex`](Self::hex)); nothing hands out an owned copy. Dropping the region
/// releases it, zeroing first unless it was already cleared.
///
/// A region is `Send` but not `Sync`: distinct regions may live on distinct
/// threads, a single region has exactly one owner.
pub struct LockedRegion {
    pages: Option<PinnedPages>,
    len: usize,
    state: RegionState,
}

impl LockedRegion {
    /// Allocates `size` bytes of process-private memory, pinned against swap
    /// and excluded from core dumps.
    pub fn allocate(size: usize) -> Result<Self, AllocationError> {
        Self::allocate_with(size, true)
    }

    /// Like [`allocate`](Self::allocate), with explicit control over core dump exclusion.
    pub fn allocate_with(size: usize, exclude_from_dumps: bool) -> Result<Self, AllocationError> {
        let pages = PinnedPages::pin(size, exclude_from_dumps)?;
        debug!(
            "pinned region of {} bytes ({} bytes mapped)",
            size,
            pages.mapped_len()
        );

        Ok(Self {
            pages: Some(pages),
            len: size,
            state: RegionState::Pinned,
        })
    }

    /// Total byte size, fixed at creation.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a region holds at least one byte.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    /// Read access to the whole region.
    pub fn bytes(&self) -> Result<&[u8], RegionError> {
        match self.pages.as_ref() {
            Some(pages) if self.state == RegionState::Pinned => Ok(pages.as_ref()),
            _ => Err(RegionError::NotPinned(self.state)),
        }
    }

    /// Write access to the whole region.
    pub fn bytes_mut(&mut self) -> Result<&mut [u8], RegionError> {
        match self.pages.as_mut() {
            Some(pages) if self.state == RegionState::Pinned => Ok(pages.as_mut()),
            _ => Err(RegionError::NotPinned(self.state)),
        }
    }

    /// Overwrites the whole region with secure random bytes.
    ///
    /// On a source failure the region is zeroed before the error is
    /// returned; it stays `Pinned`.
    pub fn fill_random<E: EntropySource + ?Sized>(&mut self, source: &E) -> Result<(), Error> {
        let bytes = self.bytes_mut()?;

        if let Err(err) = source.fill_bytes(bytes) {
            bytes.zeroize();
            return Err(err.into());
        }

        Ok(())
    }

    /// Copies this region's contents into `dst`. See [`copy`].
    pub fn copy_to(&self, dst: &mut LockedRegion) -> Result<(), Error> {
        self::copy(self, dst)
    }

    /// Overwrites every byte with zero and moves the region to `Cleared`.
    ///
    /// Safe to call in any state; a released region is left untouched.
    pub fn zero(&mut self) {
        if let Some(pages) = self.pages.as_mut() {
            let bytes: &mut [u8] = pages.as_mut();
            bytes.zeroize();
            self.state = RegionState::Cleared;
            trace!("zeroed region of {} bytes", self.len);
        }
    }

    /// Returns true if the region holds no non-zero byte.
    ///
    /// Works in `Pinned` and `Cleared`; a released region holds nothing.
    pub fn is_zeroized(&self) -> bool {
        self.pages.as_ref().map_or(true, |pages| {
            let bytes: &[u8] = pages.as_ref();
            wipe::is_zeroized(bytes)
        })
    }

    /// Unpins and unmaps the region, zeroing it first unless it is `Cleared`.
    ///
    /// Idempotent: releasing an already released region does nothing.
    pub fn release(&mut self) -> io::Result<()> {
        let Some(mut pages) = self.pages.take() else {
            return Ok(());
        };

        if self.state != RegionState::Cleared {
            let bytes: &mut [u8] = pages.as_mut();
            bytes.zeroize();
        }

        self.state = RegionState::Released;
        debug!("releasing region of {} bytes", self.len);
        pages.release()
    }

    /// Records that the owner has already cleared every byte it wrote, so
    /// that [`release`](Self::release) does not zero the region again.
    ///
    /// The caller guarantees that no sensitive byte remains in the region.
    pub(crate) fn mark_cleared(&mut self) {
        if self.state == RegionState::Pinned {
            self.state = RegionState::Cleared;
        }
    }

    /// Formats the region as hex, one byte at a time, without copying it.
    pub fn hex(&self) -> Result<Hex<'_>, RegionError> {
        self.bytes().map(Hex)
    }
}

/// Byte-for-byte copy between two regions of the same length.
///
/// Fails with [`CopyError::SizeMismatch`] instead of truncating; both
/// regions must be `Pinned`.
pub fn copy(src: &LockedRegion, dst: &mut LockedRegion) -> Result<(), Error> {
    let src_bytes = src.bytes()?;
    let dst_bytes = dst.bytes_mut()?;

    if src_bytes.len() != dst_bytes.len() {
        return Err(CopyError::SizeMismatch {
            src: src_bytes.len(),
            dst: dst_bytes.len(),
        }
        .into());
    }

    dst_bytes.copy_from_slice(src_bytes);
    Ok(())
}

impl fmt::Debug for LockedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedRegion")
            .field("len", &self.len)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Drop for LockedRegion {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("failed to release pinned region: {}", err);
        }
    }
}

/// Hex view over borrowed sensitive bytes.
///
/// Each byte is formatted on its own; the view never buffers the contents.
pub struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl<'a> Hex<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}
