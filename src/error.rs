use core::fmt;

/// Reasons a scheduler configuration is rejected at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one transfer engine is required
    NoEngines,
    /// More engines than completion bits
    TooManyEngines { count: usize },
    /// Number of engine drivers differs from the number of windows
    EngineCountMismatch { windows: usize, engines: usize },
    /// Completion tracker was built for a different engine count
    TrackerMismatch { tracker: usize, engines: usize },
    /// Engine would stream zero LEDs
    EmptyWindow { engine: usize },
    /// LED count does not fit the control register length field
    WindowTooLong { engine: usize, leds: usize },
    /// Engine view extends past the end of the frame buffer
    WindowOutOfBounds {
        engine: usize,
        end: usize,
        buffer_len: usize,
    },
    /// Hue wheel sector width must be non-zero
    InvalidHueStep,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEngines => write!(f, "no transfer engines configured"),
            Self::TooManyEngines { count } => {
                write!(f, "{} transfer engines configured, at most 4 supported", count)
            }
            Self::EngineCountMismatch { windows, engines } => write!(
                f,
                "{} windows configured for {} transfer engines",
                windows, engines
            ),
            Self::TrackerMismatch { tracker, engines } => write!(
                f,
                "completion tracker expects {} engines, got {}",
                tracker, engines
            ),
            Self::EmptyWindow { engine } => {
                write!(f, "engine {} has an empty window", engine)
            }
            Self::WindowTooLong { engine, leds } => {
                write!(f, "engine {} window of {} leds exceeds length field", engine, leds)
            }
            Self::WindowOutOfBounds {
                engine,
                end,
                buffer_len,
            } => write!(
                f,
                "engine {} window ends at byte {} past frame buffer of {} bytes",
                engine, end, buffer_len
            ),
            Self::InvalidHueStep => write!(f, "hue step must be non-zero"),
        }
    }
}

impl core::error::Error for ConfigError {}
