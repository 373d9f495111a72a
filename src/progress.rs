//! Animation progress tracking
//!
//! The global [`ProgressCounter`] rotates the whole strand around the hue
//! wheel, one unit per frame. Each LED adds its own fixed phase offset on
//! top of it so the strand shows a travelling rainbow.

/// Distance in progress units between two adjacent LEDs
///
/// Spreads one full wheel cycle across the strand. Returns 0 for an
/// empty strand.
#[allow(clippy::cast_possible_truncation)]
pub const fn led_phase_step(smax: u32, num_leds: usize) -> u32 {
    if num_leds == 0 {
        return 0;
    }
    smax / num_leds as u32
}

/// Hue progress of the LED at `index` for a given global progress
///
/// The result is always in `[0, smax)`.
#[allow(clippy::cast_possible_truncation)]
pub const fn phase_of(progress: u32, index: usize, istep: u32, smax: u32) -> u32 {
    let offset = ((index as u64 * istep as u64) % smax as u64) as u32;
    (progress % smax + offset) % smax
}

/// Wrapping counter in `[0, smax)` advanced once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    value: u32,
    smax: u32,
}

impl ProgressCounter {
    /// Create a counter starting at zero
    ///
    /// A zero `smax` is treated as a cycle of one.
    pub const fn new(smax: u32) -> Self {
        Self {
            value: 0,
            smax: if smax == 0 { 1 } else { smax },
        }
    }

    /// Current progress value
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Cycle length
    pub const fn smax(&self) -> u32 {
        self.smax
    }

    /// Advance by one unit, wrapping at `smax`
    ///
    /// Returns the new value.
    pub fn advance(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.smax {
            self.value = 0;
        }
        self.value
    }

    /// Reset the counter to zero
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Progress of the LED at `index`
    pub const fn phase_of(&self, index: usize, istep: u32) -> u32 {
        phase_of(self.value, index, istep, self.smax)
    }
}
