//! Free-running animation loop
//!
//! Every iteration renders the next rainbow frame into the shared buffer,
//! waits for all engines to report the previous transfer done, clears the
//! completion mask and starts every engine again.
//!
//! The frame is rendered *before* the wait, so writing frame `k + 1` can
//! overlap the tail of the engines still reading frame `k`. The buffer is
//! not double buffered.
//!
//! The frame buffer is borrowed from the caller rather than owned, so its
//! address stays fixed when the scheduler is moved. On hardware it usually
//! lives in a `static`.

use embassy_time::Instant;
#[cfg(feature = "esp32-log")]
use esp_println::println;
use heapless::Vec;

use crate::color::HueWheel;
use crate::completion::CompletionTracker;
use crate::config::SchedulerConfig;
use crate::engine::TransferEngine;
use crate::error::ConfigError;
use crate::frame_buffer::FrameBuffer;
use crate::pacer::{FramePacer, FrameResult};
use crate::progress::ProgressCounter;
use crate::wait::CompletionWait;
use crate::window::{MAX_ENGINES, TransferWindow};

/// Animation scheduler for a strand of `NUM_LEDS` LEDs
///
/// Sole writer of the frame buffer, sole clearer of the completion mask and
/// the only code that starts engines.
pub struct AnimationScheduler<'a, E, W, const NUM_LEDS: usize>
where
    E: TransferEngine,
    W: CompletionWait,
{
    engines: Vec<E, MAX_ENGINES>,
    windows: Vec<TransferWindow, MAX_ENGINES>,
    tracker: &'a CompletionTracker,
    waiter: W,

    wheel: HueWheel,
    progress: ProgressCounter,
    frame: &'a mut FrameBuffer<NUM_LEDS>,

    /// Set once the first transfers have been started
    armed: bool,
    frames_armed: u32,
}

impl<'a, E, W, const NUM_LEDS: usize> AnimationScheduler<'a, E, W, NUM_LEDS>
where
    E: TransferEngine,
    W: CompletionWait,
{
    /// Validate the topology and configure every engine
    ///
    /// `engines[i]` is pointed at `config.windows[i]` of `frame` and reports
    /// to bit `i` of `tracker`. The tracker is reset to zero.
    pub fn new(
        config: &SchedulerConfig,
        frame: &'a mut FrameBuffer<NUM_LEDS>,
        mut engines: Vec<E, MAX_ENGINES>,
        tracker: &'a CompletionTracker,
        waiter: W,
    ) -> Result<Self, ConfigError> {
        Self::check(config, engines.len(), tracker).inspect_err(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("scheduler: rejected configuration: {}", _err);
        })?;
        let wheel = config.wheel()?;

        tracker.clear();
        for (engine, window) in engines.iter_mut().zip(&config.windows) {
            engine.configure(frame.as_bytes(), *window);
        }

        #[cfg(feature = "esp32-log")]
        for (index, window) in config.windows.iter().enumerate() {
            println!(
                "scheduler: engine {} offset={} leds={}",
                index, window.offset, window.leds
            );
        }

        Ok(Self {
            engines,
            windows: config.windows.clone(),
            tracker,
            waiter,
            wheel,
            progress: ProgressCounter::new(wheel.smax()),
            frame,
            armed: false,
            frames_armed: 0,
        })
    }

    fn check(
        config: &SchedulerConfig,
        engines: usize,
        tracker: &CompletionTracker,
    ) -> Result<(), ConfigError> {
        config.validate(NUM_LEDS)?;
        let windows = config.windows.len();
        if engines != windows {
            return Err(ConfigError::EngineCountMismatch { windows, engines });
        }
        if tracker.engine_count() != windows {
            return Err(ConfigError::TrackerMismatch {
                tracker: tracker.engine_count(),
                engines: windows,
            });
        }
        Ok(())
    }

    /// Compute the next frame and advance the progress counter
    pub fn render_frame(&mut self) {
        self.frame.fill_rainbow(self.wheel, &self.progress);
        self.progress.advance();
    }

    /// Start every engine if the previous transfers have all finished
    ///
    /// Never blocks. Returns `false`, leaving all engines untouched, while
    /// any engine is still outstanding.
    pub fn try_rearm(&mut self) -> bool {
        if self.armed && !self.tracker.is_all_done() {
            return false;
        }
        self.rearm();
        true
    }

    /// Block until the previous transfers have finished, then start every
    /// engine
    ///
    /// Blocks forever if an engine never reports completion.
    pub fn wait_and_rearm(&mut self) {
        if self.armed {
            self.waiter.wait_all_done(self.tracker);
        }
        self.rearm();
    }

    fn rearm(&mut self) {
        // Before the first start nothing is in flight and the mask is
        // already zero.
        if self.armed {
            self.tracker.clear();
        }
        let bytes = self.frame.as_bytes();
        for engine in &mut self.engines {
            engine.start(bytes);
        }
        self.armed = true;
        self.frames_armed = self.frames_armed.wrapping_add(1);
    }

    /// Run one full iteration of the animation loop
    pub fn tick(&mut self) {
        self.render_frame();
        self.wait_and_rearm();
    }

    /// Run one iteration and report when the next one is due
    pub fn tick_paced(&mut self, pacer: &mut FramePacer, now: Instant) -> FrameResult {
        self.tick();
        pacer.tick(now)
    }

    /// Run the animation loop forever
    pub fn run(mut self) -> ! {
        loop {
            self.tick();
        }
    }

    /// Current global progress
    pub const fn progress(&self) -> u32 {
        self.progress.value()
    }

    pub const fn frame(&self) -> &FrameBuffer<NUM_LEDS> {
        &*self.frame
    }

    pub const fn wheel(&self) -> HueWheel {
        self.wheel
    }

    pub fn windows(&self) -> &[TransferWindow] {
        &self.windows
    }

    pub fn engines(&self) -> &[E] {
        &self.engines
    }

    /// Number of times the engines have been started
    pub const fn frames_armed(&self) -> u32 {
        self.frames_armed
    }
}
