//! Secure random source used for offsets, seeding and clearing passes.

#[cfg(test)]
pub(crate) mod test_utils;

use crate::error::RandomSourceError;

/// Trait for cryptographically secure random number generators.
///
/// Window offsets, window seeding and clearing passes all draw from the
/// same source; a weaker generator for offsets would make placement
/// predictable.
pub trait EntropySource {
    /// Fills the destination buffer with cryptographically secure random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RandomSourceError`] if the source is unavailable or exhausted.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RandomSourceError>;

    /// Draws a uniformly distributed `u64`.
    fn next_u64(&self) -> Result<u64, RandomSourceError> {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes)?;
        Ok(u64::from_ne_bytes(bytes))
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &E {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RandomSourceError> {
        (**self).fill_bytes(dest)
    }
}

/// OS-level CSPRNG via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEntropySource;

impl EntropySource for SystemEntropySource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), RandomSourceError> {
        getrandom::fill(dest)?;
        Ok(())
    }
}

/// Draws a value uniformly distributed in `[0, bound]` (inclusive).
///
/// Uses rejection sampling so that no value is favoured by the modulo.
pub fn uniform_inclusive<E: EntropySource + ?Sized>(
    source: &E,
    bound: usize,
) -> Result<usize, RandomSourceError> {
    let range = match (bound as u64).checked_add(1) {
        Some(range) => range,
        None => return Ok(source.next_u64()? as usize),
    };

    let rejection_threshold = (u64::MAX / range) * range;
    loop {
        let r = source.next_u64()?;
        if r < rejection_threshold {
            return Ok((r % range) as usize);
        }
    }
}
