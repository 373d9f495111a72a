//! Initialization-time topology of a strand controller
//!
//! The engine count and every engine window are fixed once the scheduler
//! is built; there is no way to change them afterwards.

use heapless::Vec;

use crate::color::{BYTES_PER_LED, DEFAULT_STEP, HueWheel};
use crate::error::ConfigError;
use crate::registers::MAX_LEN;
use crate::window::{MAX_ENGINES, TransferWindow, stress_layout};

/// Configuration for the animation scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Hue wheel sector width
    pub hue_step: u16,
    /// One window per transfer engine, in engine order
    pub windows: Vec<TransferWindow, MAX_ENGINES>,
}

impl SchedulerConfig {
    /// One engine streaming the whole strand
    pub fn single(num_leds: usize) -> Self {
        let mut windows = Vec::new();
        let _ = windows.push(TransferWindow::full(num_leds));
        Self {
            hue_step: DEFAULT_STEP,
            windows,
        }
    }

    /// Overlapping layout from [`stress_layout`]
    pub fn overlapping(num_leds: usize, engines: usize) -> Self {
        Self {
            hue_step: DEFAULT_STEP,
            windows: stress_layout(num_leds, engines),
        }
    }

    /// Set the hue wheel sector width
    #[must_use]
    pub fn with_hue_step(mut self, step: u16) -> Self {
        self.hue_step = step;
        self
    }

    /// Hue wheel built from the configured step
    pub fn wheel(&self) -> Result<HueWheel, ConfigError> {
        HueWheel::new(self.hue_step).ok_or(ConfigError::InvalidHueStep)
    }

    /// Check the configuration against a strand of `num_leds` LEDs
    pub fn validate(&self, num_leds: usize) -> Result<(), ConfigError> {
        self.wheel()?;

        if self.windows.is_empty() {
            return Err(ConfigError::NoEngines);
        }

        let buffer_len = num_leds * BYTES_PER_LED;
        for (engine, window) in self.windows.iter().enumerate() {
            if window.leds == 0 {
                return Err(ConfigError::EmptyWindow { engine });
            }
            if window.leds > MAX_LEN as usize {
                return Err(ConfigError::WindowTooLong {
                    engine,
                    leds: window.leds,
                });
            }
            if !window.fits_within(buffer_len) {
                return Err(ConfigError::WindowOutOfBounds {
                    engine,
                    end: window.offset.saturating_add(window.byte_len()),
                    buffer_len,
                });
            }
        }

        Ok(())
    }
}
