//! Clearing passes over an explicit byte range.

use zeroize::Zeroize;

use crate::error::RandomSourceError;
use crate::random::EntropySource;

/// Overwrites `bytes` with `passes` rounds of secure random data, then zeroes it.
///
/// Returns the number of random passes that completed, together with the
/// outcome. The zero pass always runs, even when a random pass fails; the
/// failure is reported afterwards so that a broken source never leaves data
/// behind.
pub fn clear_range<E: EntropySource + ?Sized>(
    bytes: &mut [u8],
    passes: usize,
    source: &E,
) -> (usize, Result<(), RandomSourceError>) {
    let mut completed = 0;
    let mut outcome = Ok(());

    while completed < passes {
        if let Err(err) = source.fill_bytes(bytes) {
            outcome = Err(err);
            break;
        }
        completed += 1;
    }

    bytes.zeroize();
    (completed, outcome)
}

/// Returns true if every byte is zero.
///
/// Reads the whole slice regardless of where the first non-zero byte is.
pub fn is_zeroized(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, &b| acc | b) == 0
}
