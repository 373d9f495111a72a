use heapless::Vec;

use crate::color::BYTES_PER_LED;

/// Maximum number of transfer engines sharing one frame buffer
pub const MAX_ENGINES: usize = 4;

/// View of a transfer engine into the shared frame buffer
///
/// `offset` is a byte offset and does not have to be aligned to an LED
/// boundary. `leds` is the number of LEDs the engine streams, so the view
/// covers `3 * leds` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferWindow {
    pub offset: usize,
    pub leds: usize,
}

impl TransferWindow {
    pub const fn new(offset: usize, leds: usize) -> Self {
        Self { offset, leds }
    }

    /// Window covering the whole strand
    pub const fn full(num_leds: usize) -> Self {
        Self::new(0, num_leds)
    }

    /// Number of bytes the engine reads
    pub const fn byte_len(self) -> usize {
        self.leds.saturating_mul(BYTES_PER_LED)
    }

    /// Byte offset one past the last byte of the window
    ///
    /// Saturates at `usize::MAX`.
    pub const fn end(self) -> usize {
        self.offset.saturating_add(self.byte_len())
    }

    /// Returns if the window lies within a buffer of `buffer_len` bytes
    pub const fn fits_within(self, buffer_len: usize) -> bool {
        match self.offset.checked_add(self.byte_len()) {
            Some(end) => end <= buffer_len,
            None => false,
        }
    }

    /// Returns if two windows share at least one byte
    pub const fn overlaps(self, other: Self) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Overlapping multi-engine layout for shared memory stress testing
///
/// Engine `i` starts at byte `num_leds / (i + 1)` (engine 0 at byte 0) and
/// streams `num_leds / (i + 1)` LEDs, so every window overlaps the first
/// one and most start off an LED boundary. Only the first `engines` windows
/// are returned, capped at [`MAX_ENGINES`].
pub fn stress_layout(num_leds: usize, engines: usize) -> Vec<TransferWindow, MAX_ENGINES> {
    (0..engines.min(MAX_ENGINES))
        .map(|i| {
            let leds = num_leds / (i + 1);
            let offset = if i == 0 { 0 } else { leds };
            TransferWindow::new(offset, leds)
        })
        .collect()
}
