#![no_std]

pub mod color;
pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame_buffer;
pub mod pacer;
pub mod progress;
pub mod registers;
pub mod scheduler;
pub mod sim;
pub mod wait;
pub mod window;

pub use color::{HueWheel, Rgb};
pub use completion::{CompletionHandle, CompletionTracker};
pub use config::SchedulerConfig;
pub use engine::{MmioEngine, TransferEngine};
pub use error::ConfigError;
pub use frame_buffer::FrameBuffer;
pub use pacer::{FramePacer, FrameResult};
pub use progress::ProgressCounter;
pub use scheduler::AnimationScheduler;
pub use wait::{CompletionWait, SpinWait};
pub use window::{MAX_ENGINES, TransferWindow};

pub use embassy_time::{Duration, Instant};

/// LEDs on the reference strand
pub const DEFAULT_NUM_LEDS: usize = 24;
