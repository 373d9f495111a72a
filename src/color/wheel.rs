//! Six-sector saturated hue wheel
//!
//! Maps a cyclic progress value in `[0, smax)` to a fully saturated color.
//! The cycle is split into six sectors of `step` units each. In every sector
//! one channel is held at 255, one at 0, and the third ramps linearly
//! between them, so each channel is a trapezoidal wave with period `smax`.
//! Green lags red by two sectors and blue lags red by four.

use crate::color::Rgb;

/// Number of sectors on the wheel
pub const SECTORS: u32 = 6;

/// Default sector width (`1 << 5`), giving a 192-unit cycle
pub const DEFAULT_STEP: u16 = 1 << 5;

/// Integer hue wheel with a configurable sector width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HueWheel {
    step: u16,
}

impl Default for HueWheel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl HueWheel {
    /// Wheel with 32-unit sectors
    pub const DEFAULT: Self = Self { step: DEFAULT_STEP };

    /// Create a wheel with the given sector width
    ///
    /// Returns `None` for a zero width.
    pub const fn new(step: u16) -> Option<Self> {
        if step == 0 {
            return None;
        }
        Some(Self { step })
    }

    /// Width of a single sector
    pub const fn step(self) -> u32 {
        self.step as u32
    }

    /// Length of the full cycle (`6 * step`)
    pub const fn smax(self) -> u32 {
        self.step() * SECTORS
    }

    /// Linear 0..=255 ramp across one sector, rounded to nearest
    ///
    /// `distance` is clamped to the sector width.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn ramp(self, distance: u32) -> u8 {
        let step = self.step();
        let distance = if distance > step { step } else { distance };
        ((distance * 255 + step / 2) / step) as u8
    }

    /// Color at the given progress
    ///
    /// Progress is taken modulo [`HueWheel::smax`], so `hue(p)` and
    /// `hue(p + smax)` are always equal.
    pub const fn hue(self, progress: u32) -> Rgb {
        let smax = self.smax();
        let progress = progress % smax;
        let step = self.step();

        Rgb {
            r: self.red(progress),
            g: self.red((progress + smax - 2 * step) % smax),
            b: self.red((progress + smax - 4 * step) % smax),
        }
    }

    /// Red channel; the other two are the same wave shifted by whole sectors
    const fn red(self, progress: u32) -> u8 {
        let step = self.step();
        let sector = progress / step;
        let distance = progress % step;
        match sector {
            0 | 5 => 255,
            1 => 255 - self.ramp(distance),
            2 | 3 => 0,
            _ => self.ramp(distance),
        }
    }
}
