//! Shared color storage read by every transfer engine
//!
//! One flat array of per-LED triplets in wire order (green, red, blue).
//! Engines see it through their [`TransferWindow`]s, which may overlap and
//! may start in the middle of a triplet.

use crate::color::{BYTES_PER_LED, HueWheel, Rgb, from_grb, to_grb};
use crate::progress::{ProgressCounter, led_phase_step};
use crate::window::TransferWindow;

/// Color storage for a strand of `NUM_LEDS` LEDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer<const NUM_LEDS: usize> {
    leds: [[u8; BYTES_PER_LED]; NUM_LEDS],
}

impl<const NUM_LEDS: usize> Default for FrameBuffer<NUM_LEDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const NUM_LEDS: usize> FrameBuffer<NUM_LEDS> {
    /// Create a buffer with every LED off
    pub const fn new() -> Self {
        Self {
            leds: [[0; BYTES_PER_LED]; NUM_LEDS],
        }
    }

    /// Number of LEDs
    pub const fn len(&self) -> usize {
        NUM_LEDS
    }

    pub const fn is_empty(&self) -> bool {
        NUM_LEDS == 0
    }

    /// Size of the buffer in bytes
    pub const fn byte_len(&self) -> usize {
        NUM_LEDS * BYTES_PER_LED
    }

    /// Store the color of the LED at `index`
    ///
    /// Out of range indices are ignored.
    pub fn set(&mut self, index: usize, color: Rgb) {
        if let Some(led) = self.leds.get_mut(index) {
            *led = to_grb(color);
        }
    }

    /// Color of the LED at `index`
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.leds.get(index).copied().map(from_grb)
    }

    /// Raw bytes in wire order
    pub fn as_bytes(&self) -> &[u8] {
        self.leds.as_flattened()
    }

    /// Bytes visible through `window`, or `None` if it does not fit
    pub fn window(&self, window: TransferWindow) -> Option<&[u8]> {
        if !window.fits_within(self.byte_len()) {
            return None;
        }
        self.as_bytes().get(window.offset..window.end())
    }

    /// Paint one rainbow frame
    ///
    /// LED `i` gets the wheel color at `progress + i * istep`, where
    /// `istep` spreads one full wheel cycle across the strand.
    pub fn fill_rainbow(&mut self, wheel: HueWheel, progress: &ProgressCounter) {
        let istep = led_phase_step(wheel.smax(), NUM_LEDS);
        for (index, led) in self.leds.iter_mut().enumerate() {
            *led = to_grb(wheel.hue(progress.phase_of(index, istep)));
        }
    }
}
