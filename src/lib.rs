//! Pinned memory regions with a randomized, single-clear working window.
//!
//! Two layers:
//!
//! - [`LockedRegion`]: a page-backed region pinned against swap (and kept
//!   out of core dumps) with raw read/write, explicit zeroing and explicit
//!   release.
//! - [`SecureRegion`]: one backing region with a working [`Window`] placed
//!   at a secure-random offset. Only the window is seeded and written, and
//!   only the bytes actually written are cleared, exactly once.
//!
//! ```rust,no_run
//! use secret_window::SecureRegion;
//!
//! fn example() -> Result<(), secret_window::Error> {
//!     let mut region = SecureRegion::open(2048)?;
//!
//!     region.derive_window(64)?;
//!     region.seed_window()?;
//!     region.write(b"highly sensitive information")?;
//!     assert_eq!(region.read()?, b"highly sensitive information");
//!
//!     region.clear()?;
//!     let stats = region.close()?;
//!     assert_eq!(stats.clears, 1);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Sensitive bytes are only ever reachable through borrows of the region
//! that holds them; no API returns them by value.

mod alloc;
mod config;
mod error;
mod locked;
mod manager;
mod random;
pub mod window;
pub mod wipe;

pub use alloc::ffi::page_size;
pub use config::Config;
pub use error::{
    AllocationError, CapacityError, CopyError, Error, RandomSourceError, RegionError,
};
pub use locked::{copy, Hex, LockedRegion, RegionState};
pub use manager::{ClearStats, SecureRegion};
pub use random::{EntropySource, SystemEntropySource};
pub use window::Window;
