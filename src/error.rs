//! Error types for pinned regions and the working-window manager.
use std::io;

use thiserror::Error;

use crate::locked::RegionState;

/// Reserving or pinning a backing region failed.
///
/// Fatal to that region, never to the process. Any partially acquired
/// mapping has already been released when this error is returned.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A region must hold at least one byte.
    #[error("region length must be greater than zero")]
    ZeroLength,

    /// The anonymous mapping could not be created.
    #[error("mapping failed: {0}")]
    Map(#[source] io::Error),

    /// The mapping could not be pinned against swap.
    #[error("pinning failed: {0}")]
    Pin(#[source] io::Error),

    /// The mapping could not be excluded from core dumps.
    #[error("dump exclusion failed: {0}")]
    Advise(#[source] io::Error),
}

/// The secure random source is unavailable or exhausted.
///
/// Fatal to the current operation; the caller may retry.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct RandomSourceError(#[from] pub getrandom::Error);

/// Byte-for-byte copy between regions of different lengths.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum CopyError {
    /// Source and destination lengths differ; nothing was copied.
    #[error("size mismatch: source is {src} bytes, destination is {dst} bytes")]
    SizeMismatch { src: usize, dst: usize },
}

/// Data does not fit in the active window.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[error("{len} bytes do not fit in a {capacity} byte window")]
pub struct CapacityError {
    pub len: usize,
    pub capacity: usize,
}

/// Access attempted outside the `Pinned` state.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum RegionError {
    #[error("region is not pinned (state: {0:?})")]
    NotPinned(RegionState),
}

/// Errors surfaced by [`LockedRegion`](crate::LockedRegion) and
/// [`SecureRegion`](crate::SecureRegion) operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Random(#[from] RandomSourceError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Region(#[from] RegionError),

    /// The active window holds data that has not been cleared yet.
    #[error("active window holds uncleared data")]
    WindowDirty,

    /// The active window has already been seeded.
    #[error("active window is already seeded")]
    AlreadySeeded,

    /// No usable window: none was derived, or the last one is spent.
    #[error("no window available, derive a fresh one")]
    NoWindow,

    /// The backing region was released after a failed setup step.
    #[error("backing region has been released")]
    Released,

    /// Unpinning or unmapping the backing region failed.
    #[error("releasing the backing region failed: {0}")]
    Release(#[source] io::Error),
}
