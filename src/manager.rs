use core::fmt;

use log::{debug, trace, warn};
use zeroize::Zeroize;

use crate::config::Config;
use crate::error::{AllocationError, CapacityError, Error};
use crate::locked::{Hex, LockedRegion, RegionState};
use crate::random::{EntropySource, SystemEntropySource};
use crate::window::{self, Window};
use crate::wipe;

/// Counters of real clearing work performed by a [`SecureRegion`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ClearStats {
    /// Clears that overwrote at least one byte.
    pub clears: u64,
    /// Random passes completed across all clears.
    pub random_passes: u64,
    /// Bytes zeroed across all clears.
    pub bytes_cleared: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum WindowState {
    Derived,
    Seeded,
    /// Holds `n` bytes of sensitive data.
    Written(usize),
    /// Cleared; a fresh window must be derived before the next write.
    Spent,
}

#[derive(Debug, Clone, Copy)]
struct ActiveWindow {
    window: Window,
    state: WindowState,
}

impl ActiveWindow {
    fn data_len(&self) -> usize {
        match self.state {
            WindowState::Written(n) => n,
            _ => 0,
        }
    }
}

/// One pinned backing region with a single randomized working window.
///
/// Only the window is ever seeded or written, and only the bytes actually
/// written are cleared, exactly once per write. Bytes outside the window
/// keep whatever the allocator provided.
///
/// The window lifecycle is strictly sequential:
/// [`derive_window`](Self::derive_window) → [`seed_window`](Self::seed_window)
/// → [`write`](Self::write) → [`clear`](Self::clear), repeated as needed, then
/// [`close`](Self::close). A region has exactly one owner and is not `Sync`;
/// callers must not share one across threads. Dropping a region without
/// closing it performs the same shutdown.
pub struct SecureRegion<E: EntropySource = SystemEntropySource> {
    region: LockedRegion,
    active: Option<ActiveWindow>,
    config: Config,
    source: E,
    stats: ClearStats,
}

impl SecureRegion {
    /// Allocates a backing region of `capacity` bytes with the default
    /// configuration and the system entropy source.
    ///
    /// The region is not filled with random data.
    pub fn open(capacity: usize) -> Result<Self, AllocationError> {
        Self::open_with(capacity, Config::default(), SystemEntropySource)
    }
}

impl<E: EntropySource> SecureRegion<E> {
    pub fn open_with(capacity: usize, config: Config, source: E) -> Result<Self, AllocationError> {
        let region = LockedRegion::allocate_with(capacity, config.exclude_from_dumps)?;
        debug!(
            "opened secure region of {} bytes ({} random passes per clear)",
            capacity, config.random_passes
        );

        Ok(Self {
            region,
            active: None,
            config,
            source,
            stats: ClearStats::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> ClearStats {
        self.stats
    }

    /// The current window, spent or not.
    pub fn window(&self) -> Option<Window> {
        self.active.map(|active| active.window)
    }

    /// Length of the data currently held by the window.
    pub fn data_len(&self) -> usize {
        self.active.map_or(0, |active| active.data_len())
    }

    /// True while the window holds data that has not been cleared.
    pub fn is_dirty(&self) -> bool {
        matches!(
            self.active,
            Some(ActiveWindow {
                state: WindowState::Written(_),
                ..
            })
        )
    }

    fn ensure_open(&self) -> Result<(), Error> {
        match self.region.state() {
            RegionState::Pinned => Ok(()),
            _ => Err(Error::Released),
        }
    }

    /// Derives a fresh window at a secure-random offset, keeping at least
    /// `min_margin` bytes of slack on both sides when the capacity allows it.
    ///
    /// Refused while the current window is dirty. A random source failure
    /// releases the backing region before the error is returned.
    pub fn derive_window(&mut self, min_margin: usize) -> Result<Window, Error> {
        self.ensure_open()?;
        if self.is_dirty() {
            return Err(Error::WindowDirty);
        }

        match window::derive(self.capacity(), min_margin, &self.source) {
            Ok(window) => {
                self.active = Some(ActiveWindow {
                    window,
                    state: WindowState::Derived,
                });
                trace!("derived window of {} bytes", window.len());
                Ok(window)
            }
            Err(err) => {
                self.abort_setup();
                Err(err.into())
            }
        }
    }

    /// [`derive_window`](Self::derive_window) with the configured margin.
    pub fn derive_default_window(&mut self) -> Result<Window, Error> {
        self.derive_window(self.config.min_margin)
    }

    /// Fills only the window with secure random bytes.
    ///
    /// A window is seeded at most once, before any write. A random source
    /// failure zeroes the window and releases the backing region before the
    /// error is returned.
    pub fn seed_window(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        let active = self.usable_window()?;
        if active.state == WindowState::Seeded {
            return Err(Error::AlreadySeeded);
        }

        let bytes = &mut self.region.bytes_mut()?[active.window.range()];
        if let Err(err) = self.source.fill_bytes(bytes) {
            bytes.zeroize();
            self.abort_setup();
            return Err(err.into());
        }

        self.set_state(WindowState::Seeded);
        trace!("seeded window of {} bytes", active.window.len());
        Ok(())
    }

    /// Copies `data` to the start of the window.
    ///
    /// One write per clear: a dirty or spent window refuses further writes.
    pub fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.ensure_open()?;
        let active = self.usable_window()?;

        if data.len() > active.window.len() {
            return Err(CapacityError {
                len: data.len(),
                capacity: active.window.len(),
            }
            .into());
        }

        self.region.bytes_mut()?[active.window.prefix(data.len())].copy_from_slice(data);
        self.set_state(WindowState::Written(data.len()));
        trace!("wrote {} bytes into window", data.len());
        Ok(())
    }

    /// Borrows the bytes currently written into the window.
    ///
    /// Empty when nothing was written or the window has been cleared.
    pub fn read(&self) -> Result<&[u8], Error> {
        self.ensure_open()?;
        let active = self.active.ok_or(Error::NoWindow)?;

        let bytes = self.region.bytes()?;
        Ok(&bytes[active.window.prefix(active.data_len())])
    }

    /// Formats the written bytes as hex, one byte at a time.
    pub fn hex(&self) -> Result<Hex<'_>, Error> {
        self.read().map(Hex::new)
    }

    /// Overwrites exactly the written bytes with the configured random
    /// passes followed by zeros, then marks the window spent.
    ///
    /// A no-op unless the window is dirty, so repeated calls never repeat
    /// the work. If a random pass fails the bytes are still zeroed and the
    /// failure is returned.
    pub fn clear(&mut self) -> Result<(), Error> {
        let Some(active) = self.active else {
            return Ok(());
        };
        let WindowState::Written(data_len) = active.state else {
            return Ok(());
        };

        if data_len == 0 {
            self.set_state(WindowState::Spent);
            return Ok(());
        }

        let passes = self.config.random_passes;
        let bytes = &mut self.region.bytes_mut()?[active.window.prefix(data_len)];
        let (completed, outcome) = wipe::clear_range(bytes, passes, &self.source);

        self.set_state(WindowState::Spent);
        self.stats.clears += 1;
        self.stats.bytes_cleared += data_len as u64;
        self.stats.random_passes += completed as u64;

        debug!("cleared {} bytes with {} random passes", data_len, completed);
        outcome.map_err(Error::from)
    }

    /// Clears a dirty window, then releases the backing region.
    ///
    /// The backing region is not zeroed again: everything ever written has
    /// just been cleared.
    pub fn close(mut self) -> Result<ClearStats, Error> {
        let cleared = self.clear();
        let released = self.release_backing();

        cleared?;
        released?;
        Ok(self.stats)
    }

    fn usable_window(&self) -> Result<ActiveWindow, Error> {
        match self.active {
            Some(active) => match active.state {
                WindowState::Derived | WindowState::Seeded => Ok(active),
                WindowState::Written(_) => Err(Error::WindowDirty),
                WindowState::Spent => Err(Error::NoWindow),
            },
            None => Err(Error::NoWindow),
        }
    }

    fn set_state(&mut self, state: WindowState) {
        if let Some(active) = self.active.as_mut() {
            active.state = state;
        }
    }

    fn release_backing(&mut self) -> Result<(), Error> {
        if !self.is_dirty() {
            self.region.mark_cleared();
        }

        self.region.release().map_err(Error::Release)
    }

    /// Releases the backing region after a failed setup step.
    ///
    /// Setup steps run before any write, so no sensitive data is present.
    fn abort_setup(&mut self) {
        self.active = None;
        warn!("setup step failed, releasing backing region");

        if let Err(err) = self.release_backing() {
            warn!("failed to release backing region: {}", err);
        }
    }
}

impl<E: EntropySource> fmt::Debug for SecureRegion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureRegion")
            .field("capacity", &self.capacity())
            .field("dirty", &self.is_dirty())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<E: EntropySource> Drop for SecureRegion<E> {
    fn drop(&mut self) {
        if let Err(err) = self.clear() {
            warn!("clearing on drop failed: {}", err);
        }

        if let Err(err) = self.release_backing() {
            warn!("failed to release backing region: {}", err);
        }
    }
}
