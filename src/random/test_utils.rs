//! Entropy source doubles for failure paths and deterministic placement.

use core::cell::Cell;

use super::EntropySource;
use crate::error::RandomSourceError;

fn unavailable() -> RandomSourceError {
    RandomSourceError(getrandom::Error::UNSUPPORTED)
}

/// Always fails.
#[derive(Debug, Default)]
pub struct FailingEntropySource;

impl EntropySource for FailingEntropySource {
    fn fill_bytes(&self, _dest: &mut [u8]) -> Result<(), RandomSourceError> {
        Err(unavailable())
    }
}

/// Fills every byte with the same value.
#[derive(Debug)]
pub struct FixedEntropySource(pub u8);

impl EntropySource for FixedEntropySource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RandomSourceError> {
        dest.fill(self.0);
        Ok(())
    }
}

/// Fills with `fill` for the first `remaining` calls, then fails.
#[derive(Debug)]
pub struct FlakyEntropySource {
    remaining: Cell<usize>,
    fill: u8,
    calls: Cell<usize>,
}

impl FlakyEntropySource {
    pub fn new(successes: usize, fill: u8) -> Self {
        Self {
            remaining: Cell::new(successes),
            fill,
            calls: Cell::new(0),
        }
    }

    /// Number of `fill_bytes` calls observed, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl EntropySource for FlakyEntropySource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RandomSourceError> {
        self.calls.set(self.calls.get() + 1);

        match self.remaining.get() {
            0 => Err(unavailable()),
            n => {
                self.remaining.set(n - 1);
                dest.fill(self.fill);
                Ok(())
            }
        }
    }
}
