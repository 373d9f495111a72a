//! Terminal preview for myrtio-strand-scheduler
//!
//! Runs the animation scheduler against simulated transfer engines. A
//! background thread plays the part of the engine interrupts: it finishes
//! each transfer after the time a real WS2812 strand would need for its
//! window. Every frame is printed as a row of colored blocks per engine.
//!
//! Usage: `myrtio-strand-preview [engines] [frames]`

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration as StdDuration, Instant as StdInstant};

use myrtio_strand_scheduler::sim::SimulatedHardware;
use myrtio_strand_scheduler::{
    AnimationScheduler, CompletionTracker, DEFAULT_NUM_LEDS, Duration, FrameBuffer, FramePacer,
    Instant, MAX_ENGINES, SchedulerConfig, SpinWait, TransferWindow,
};

/// Number of LEDs in the simulated strand
const NUM_LEDS: usize = DEFAULT_NUM_LEDS;

/// Time to shift out one LED (24 bits at 800 kHz)
const LED_TIME: StdDuration = StdDuration::from_micros(30);

/// Reset/latch period after the last LED
const LATCH_TIME: StdDuration = StdDuration::from_micros(80);

/// Preview frame period
const FRAME_DURATION: Duration = Duration::from_millis(40);

fn transfer_time(window: TransferWindow) -> StdDuration {
    LED_TIME * u32::try_from(window.leds).unwrap_or(u32::MAX) + LATCH_TIME
}

/// Finish transfers once they have been running long enough
fn interrupt_source(
    hardware: &SimulatedHardware<'_>,
    windows: &[TransferWindow],
    stop: &AtomicBool,
) {
    let mut seen = [0usize; MAX_ENGINES];
    let mut started_at = [StdInstant::now(); MAX_ENGINES];

    while !stop.load(Ordering::Relaxed) {
        for (index, window) in windows.iter().enumerate() {
            let starts = hardware.starts(index);
            if starts != seen[index] {
                seen[index] = starts;
                started_at[index] = StdInstant::now();
            }
            if hardware.is_busy(index) && started_at[index].elapsed() >= transfer_time(*window) {
                hardware.complete(index);
            }
        }
        thread::sleep(StdDuration::from_micros(50));
    }
}

fn print_row(out: &mut impl Write, window: TransferWindow, bytes: &[u8]) -> io::Result<()> {
    write!(out, "{:>3}+{:<3}", window.offset, window.leds)?;
    // Unaligned windows start mid-triplet, so their colors come out rotated.
    for _ in 0..window.offset / 3 {
        write!(out, "  ")?;
    }
    for grb in bytes.chunks_exact(3) {
        write!(out, "\x1b[38;2;{};{};{}m██", grb[1], grb[0], grb[2])?;
    }
    writeln!(out, "\x1b[0m")
}

fn parse_arg(index: usize, default: usize) -> usize {
    std::env::args()
        .nth(index)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(default)
}

fn main() -> io::Result<()> {
    let engines = parse_arg(1, MAX_ENGINES).clamp(1, MAX_ENGINES);
    let frames = parse_arg(2, 400);

    let tracker = CompletionTracker::new(engines);
    let hardware = SimulatedHardware::new(&tracker);
    let config = SchedulerConfig::overlapping(NUM_LEDS, engines);
    let stop = AtomicBool::new(false);

    let mut frame = FrameBuffer::new();
    let mut scheduler = match AnimationScheduler::<_, _, NUM_LEDS>::new(
        &config,
        &mut frame,
        hardware.engines(engines),
        &tracker,
        SpinWait,
    ) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    thread::scope(|s| {
        s.spawn(|| interrupt_source(&hardware, &config.windows, &stop));

        let started = StdInstant::now();
        let mut pacer = FramePacer::new(FRAME_DURATION);
        let mut out = io::stdout().lock();
        let result = (|| -> io::Result<()> {
            for _ in 0..frames {
                let now = Instant::from_millis(
                    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                );
                let timing = scheduler.tick_paced(&mut pacer, now);

                write!(out, "\x1b[H\x1b[2J")?;
                writeln!(
                    out,
                    "frame {} progress {}/{}",
                    scheduler.frames_armed(),
                    scheduler.progress(),
                    scheduler.wheel().smax()
                )?;
                for (index, window) in config.windows.iter().enumerate() {
                    print_row(&mut out, *window, &hardware.streamed(index))?;
                }
                out.flush()?;

                thread::sleep(StdDuration::from_millis(timing.sleep_duration.as_millis()));
            }
            Ok(())
        })();

        stop.store(true, Ordering::Relaxed);
        result
    })
}
