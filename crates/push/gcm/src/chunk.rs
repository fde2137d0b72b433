//! Target list chunking.

use crate::DispatchError;

/// Split targets into contiguous, order-preserving chunks of at most `max`
/// entries; the last chunk may be shorter. Empty input yields no chunks.
///
/// The iterator is lazy and produces exactly `ceil(len / max)` chunks.
pub fn chunk_targets<T>(
    targets: &[T],
    max: usize,
) -> Result<std::slice::Chunks<'_, T>, DispatchError> {
    if max == 0 {
        return Err(DispatchError::Configuration(
            "max recipients per request must be positive".into(),
        ));
    }

    Ok(targets.chunks(max))
}
