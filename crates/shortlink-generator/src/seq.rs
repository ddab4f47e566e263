use crate::Generator;
use shortlink_core::base62;
use shortlink_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

const DEFAULT_WIDTH: usize = 6;

/// A short code generator using a monotonic counter.
///
/// This generator produces base62-encoded sequential codes like "000000",
/// "000001", ..., "00000z", "000010". Within one instance it never repeats a
/// value, so candidates never collide with each other.
///
/// The counter lives in process memory. To resume after a restart, start from
/// a known offset with [`SeqGenerator::with_offset`]; codes issued before the
/// restart are still protected by the repository's unique key.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    width: usize,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            width: self.width,
        }
    }
}

impl SeqGenerator {
    /// Creates a generator starting at zero with 6-symbol codes.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a new generator starting from a specific counter value.
    ///
    /// Useful for resuming from a known state or distributing
    /// counter ranges across nodes (e.g., node 1 starts at 0, node 2 at 1_000_000).
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            width: DEFAULT_WIDTH,
        }
    }

    /// Sets the minimum code width. Codes grow past it once the counter
    /// no longer fits.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(base62::encode_padded(count, self.width))
    }
}
