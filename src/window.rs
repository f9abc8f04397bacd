//! Working windows and their randomized placement.

use core::ops::Range;

use crate::error::RandomSourceError;
use crate::random::{self, EntropySource};

/// A sub-range of a backing region that holds sensitive bytes.
///
/// A window is a plain range, never an allocation of its own.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Window {
    offset: usize,
    len: usize,
}

impl Window {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte of the window.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The first `data_len` bytes of the window as a range into the backing region.
    ///
    /// `data_len` is clamped to the window length.
    pub fn prefix(&self, data_len: usize) -> Range<usize> {
        self.offset..self.offset + data_len.min(self.len)
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Places a window inside a backing region of `capacity` bytes.
///
/// When `capacity > 2 * min_margin`, the window starts at a secure-random
/// offset in `[min_margin, min_margin + span / 2]` (with
/// `span = capacity - 2 * min_margin`) and ends `min_margin` bytes before
/// the end of the region, so at least `min_margin` bytes of slack remain on
/// both sides and the window is never shorter than `span - span / 2`.
/// Otherwise no slack is possible and the window covers the whole region.
pub fn derive<E: EntropySource + ?Sized>(
    capacity: usize,
    min_margin: usize,
    source: &E,
) -> Result<Window, RandomSourceError> {
    let slack = min_margin.saturating_mul(2);
    if capacity <= slack {
        return Ok(Window {
            offset: 0,
            len: capacity,
        });
    }

    let span = capacity - slack;
    let offset = min_margin + random::uniform_inclusive(source, span / 2)?;

    Ok(Window {
        offset,
        len: capacity - min_margin - offset,
    })
}
