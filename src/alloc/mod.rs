//! Platform backing for pinned regions.
//!
//! The types here are the only place in the crate where a raw mapping is
//! turned into a byte slice.

pub mod ffi;

#[cfg(target_family = "unix")]
mod unix;
#[cfg(target_family = "windows")]
mod windows;

use std::io;

use crate::error::AllocationError;

#[cfg(target_family = "unix")]
pub(crate) type PinnedPages = unix::UnixPinnedMemory;
#[cfg(target_family = "windows")]
pub(crate) type PinnedPages = windows::WindowsPinnedMemory;

/// Anonymous, process-private memory pinned against swap.
///
/// Implementors expose exactly the requested length through `AsRef`/`AsMut`,
/// even though the mapping itself spans whole pages. Dropping an
/// implementor unpins and unmaps without touching the contents; zeroing is
/// the owner's responsibility.
pub(crate) trait PinnedMemory: AsRef<[u8]> + AsMut<[u8]> + Sized {
    /// Maps and pins `len` bytes.
    ///
    /// On any failure after the mapping exists, the mapping is unpinned and
    /// unmapped before the error is returned.
    fn pin(len: usize, exclude_from_dumps: bool) -> Result<Self, AllocationError>;

    /// Unpins and unmaps, reporting the first failure.
    fn release(self) -> io::Result<()>;

    /// Length of the underlying mapping (a whole number of pages).
    fn mapped_len(&self) -> usize;
}
