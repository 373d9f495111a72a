mod tests {
    use core::ptr::NonNull;
    use std::thread;
    use std::time::{Duration, Instant};

    use myrtio_strand_scheduler::registers::RegisterBlock;
    use myrtio_strand_scheduler::sim::{SimulatedCompletion, SimulatedHardware};
    use myrtio_strand_scheduler::{
        AnimationScheduler, CompletionTracker, CompletionWait, ConfigError, FrameBuffer,
        FramePacer, HueWheel, MmioEngine, SchedulerConfig, SpinWait, TransferEngine,
        TransferWindow,
    };

    const NUM_LEDS: usize = 24;

    /// Poll `condition` until it holds, giving up after two seconds
    fn eventually(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    /// Waiter that records the mask it observed before returning
    struct RecordingWait<W> {
        inner: W,
        observed: Vec<(u8, u8)>,
    }

    impl<W: CompletionWait> CompletionWait for RecordingWait<W> {
        fn wait_all_done(&mut self, tracker: &CompletionTracker) {
            self.inner.wait_all_done(tracker);
            self.observed.push((tracker.mask(), tracker.all_done_mask()));
        }
    }

    #[test]
    fn test_rejects_engine_count_mismatch() {
        let tracker = CompletionTracker::new(2);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 2);
        let mut frame = FrameBuffer::new();
        let result = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(3),
            &tracker,
            SpinWait,
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::EngineCountMismatch {
                windows: 2,
                engines: 3
            })
        );
    }

    #[test]
    fn test_rejects_tracker_mismatch() {
        let tracker = CompletionTracker::new(4);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 2);
        let mut frame = FrameBuffer::new();
        let result = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(2),
            &tracker,
            SpinWait,
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::TrackerMismatch {
                tracker: 4,
                engines: 2
            })
        );
    }

    #[test]
    fn test_rejects_window_past_frame_buffer() {
        let tracker = CompletionTracker::new(2);
        let hardware = SimulatedHardware::new(&tracker);
        let mut config = SchedulerConfig::overlapping(NUM_LEDS, 2);
        config.windows[1] = TransferWindow::new(NUM_LEDS, NUM_LEDS);
        let mut frame = FrameBuffer::new();
        let result = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(2),
            &tracker,
            SpinWait,
        );
        assert!(matches!(
            result.err(),
            Some(ConfigError::WindowOutOfBounds { engine: 1, .. })
        ));
        assert_eq!(hardware.control(0).len(), 0);
    }

    #[test]
    fn test_configures_every_engine() {
        let tracker = CompletionTracker::new(4);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 4);
        let mut frame = FrameBuffer::new();
        let scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(4),
            &tracker,
            SpinWait,
        )
        .unwrap();

        for (index, window) in scheduler.windows().iter().enumerate() {
            let cr = hardware.control(index);
            assert_eq!(cr.len() as usize, window.leds);
            assert!(cr.interrupt_enabled());
            assert!(!cr.is_busy());
        }
        assert_eq!(scheduler.engines().len(), 4);
        assert_eq!(scheduler.frames_armed(), 0);
        assert_eq!(tracker.mask(), 0);
    }

    #[test]
    fn test_first_tick_arms_without_waiting() {
        let tracker = CompletionTracker::new(4);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 4);
        let mut waiter = SimulatedCompletion::new(&hardware);
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(4),
            &tracker,
            &mut waiter,
        )
        .unwrap();

        scheduler.tick();

        assert_eq!(scheduler.frames_armed(), 1);
        assert_eq!(scheduler.progress(), 1);
        for index in 0..4 {
            assert!(hardware.is_busy(index));
            assert_eq!(hardware.starts(index), 1);
            let window = config.windows[index];
            let expected = scheduler.frame().window(window).unwrap();
            assert_eq!(hardware.streamed(index).as_slice(), expected);
        }
        drop(scheduler);
        assert_eq!(waiter.polls(), 0);
    }

    #[test]
    fn test_engines_stream_overlapping_windows() {
        let tracker = CompletionTracker::new(4);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 4);
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(4),
            &tracker,
            SimulatedCompletion::new(&hardware),
        )
        .unwrap();

        scheduler.tick();

        let full = hardware.streamed(0);
        assert_eq!(full.len(), NUM_LEDS * 3);
        for index in 1..4 {
            let window = config.windows[index];
            let streamed = hardware.streamed(index);
            assert_eq!(streamed.len(), window.leds * 3);
            assert_eq!(streamed.as_slice(), &full[window.offset..window.end()]);
        }
    }

    #[test]
    fn test_held_engine_blocks_rearm() {
        for engines in 1..=4 {
            let tracker = CompletionTracker::new(engines);
            let hardware = SimulatedHardware::new(&tracker);
            let config = SchedulerConfig::overlapping(NUM_LEDS, engines);
            let mut frame = FrameBuffer::new();
            let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
                &config,
                &mut frame,
                hardware.engines(engines),
                &tracker,
                SpinWait,
            )
            .unwrap();

            scheduler.render_frame();
            assert!(scheduler.try_rearm());

            let held = engines - 1;
            hardware.hold(held);
            assert_eq!(hardware.complete_all(), engines - 1);

            scheduler.render_frame();
            for _ in 0..10 {
                assert!(!scheduler.try_rearm());
            }
            for index in 0..engines {
                assert_eq!(hardware.starts(index), 1);
            }
            assert_eq!(tracker.mask(), tracker.all_done_mask() & !(1 << held));

            hardware.release(held);
            assert!(hardware.complete(held));
            assert!(tracker.is_all_done());
            assert!(scheduler.try_rearm());
            assert_eq!(tracker.mask(), 0);
            for index in 0..engines {
                assert_eq!(hardware.starts(index), 2);
            }
        }
    }

    #[test]
    fn test_mask_is_all_done_before_every_clear() {
        let tracker = CompletionTracker::new(3);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 3);
        let mut waiter = RecordingWait {
            inner: SimulatedCompletion::with_order(&hardware, &[2, 0, 1]),
            observed: Vec::new(),
        };
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(3),
            &tracker,
            &mut waiter,
        )
        .unwrap();

        for _ in 0..20 {
            scheduler.tick();
            assert_eq!(tracker.mask(), 0);
        }
        assert_eq!(scheduler.frames_armed(), 20);
        drop(scheduler);

        assert_eq!(waiter.observed.len(), 19);
        for (mask, all_done) in waiter.observed {
            assert_eq!(mask, all_done);
        }
        for index in 0..3 {
            assert_eq!(hardware.starts(index), 20);
            assert_eq!(hardware.completions(index), 19);
        }
    }

    #[test]
    fn test_next_frame_is_written_while_engines_busy() {
        let tracker = CompletionTracker::new(2);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 2);
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(2),
            &tracker,
            SpinWait,
        )
        .unwrap();

        scheduler.tick();
        let streamed = hardware.streamed(0);

        scheduler.render_frame();
        assert!(hardware.is_busy(0));
        assert!(hardware.is_busy(1));
        assert_ne!(scheduler.frame().as_bytes(), streamed.as_slice());
        assert_eq!(scheduler.progress(), 2);
    }

    #[test]
    fn test_progress_follows_frames() {
        let tracker = CompletionTracker::new(1);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::single(NUM_LEDS);
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(1),
            &tracker,
            SimulatedCompletion::new(&hardware),
        )
        .unwrap();
        let wheel = HueWheel::DEFAULT;

        for frame in 0..wheel.smax() {
            scheduler.tick();
            let bytes = hardware.streamed(0);
            let expected = wheel.hue(frame);
            assert_eq!(&bytes[..3], &[expected.g, expected.r, expected.b]);
        }
        assert_eq!(scheduler.progress(), 0);
    }

    #[test]
    fn test_engines_outside_ram_never_start() {
        let tracker = CompletionTracker::new(1);
        let hardware = SimulatedHardware::new(&tracker).with_frame_address(0x0800_0000);
        let config = SchedulerConfig::single(NUM_LEDS);
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(1),
            &tracker,
            SpinWait,
        )
        .unwrap();

        scheduler.render_frame();
        assert!(scheduler.try_rearm());
        assert!(!hardware.is_busy(0));
        assert_eq!(hardware.starts(0), 0);
        assert!(!hardware.complete(0));
        assert!(!scheduler.try_rearm());
    }

    #[test]
    fn test_tick_paced_reports_deadline() {
        let tracker = CompletionTracker::new(1);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::single(NUM_LEDS);
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            hardware.engines(1),
            &tracker,
            SimulatedCompletion::new(&hardware),
        )
        .unwrap();
        let mut pacer = FramePacer::new(embassy_time::Duration::from_millis(20));

        let result = scheduler.tick_paced(&mut pacer, embassy_time::Instant::from_millis(0));
        assert_eq!(result.sleep_duration, embassy_time::Duration::from_millis(20));
        assert_eq!(scheduler.frames_armed(), 1);
    }

    #[test]
    fn test_spin_wait_blocks_until_every_interrupt() {
        let tracker = CompletionTracker::new(2);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 2);

        thread::scope(|s| {
            let worker = s.spawn(|| {
                let mut frame = FrameBuffer::new();
                let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
                    &config,
                    &mut frame,
                    hardware.engines(2),
                    &tracker,
                    SpinWait,
                )
                .unwrap();
                scheduler.tick();
                scheduler.tick();
                scheduler.frames_armed()
            });

            let armed_once = eventually(|| hardware.starts(0) == 1 && hardware.starts(1) == 1);
            thread::sleep(Duration::from_millis(20));
            let stalled = hardware.starts(0) == 1 && !worker.is_finished();

            hardware.complete(0);
            thread::sleep(Duration::from_millis(20));
            let still_stalled = hardware.starts(0) == 1 && !worker.is_finished();

            hardware.complete(1);
            let frames = worker.join().unwrap();

            assert!(armed_once);
            assert!(stalled);
            assert!(still_stalled);
            assert_eq!(frames, 2);
            assert_eq!(hardware.starts(0), 2);
            assert_eq!(hardware.starts(1), 2);
        });
    }

    #[test]
    fn test_held_engine_stalls_simulated_wait() {
        let tracker = CompletionTracker::new(4);
        let hardware = SimulatedHardware::new(&tracker);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 4);
        hardware.hold(2);

        thread::scope(|s| {
            let worker = s.spawn(|| {
                let mut frame = FrameBuffer::new();
                let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
                    &config,
                    &mut frame,
                    hardware.engines(4),
                    &tracker,
                    SimulatedCompletion::with_order(&hardware, &[3, 1, 0, 2]),
                )
                .unwrap();
                for _ in 0..3 {
                    scheduler.tick();
                }
                scheduler.frames_armed()
            });

            let waiting = eventually(|| tracker.mask() == 0b1011);
            thread::sleep(Duration::from_millis(20));
            let starts: Vec<usize> = (0..4).map(|i| hardware.starts(i)).collect();
            let finished_early = worker.is_finished();

            hardware.release(2);
            let frames = worker.join().unwrap();

            assert!(waiting);
            assert_eq!(starts, vec![1, 1, 1, 1]);
            assert!(!finished_early);
            assert_eq!(frames, 3);
            for index in 0..4 {
                assert_eq!(hardware.starts(index), 3);
            }
        });
    }

    #[test]
    fn test_engine_address_survives_scheduler_move() {
        let tracker = CompletionTracker::new(2);
        let config = SchedulerConfig::overlapping(NUM_LEDS, 2);
        let mut regs = [RegisterBlock::default(), RegisterBlock::default()];
        let [regs0, regs1] = &mut regs;
        // SAFETY: each block outlives its engine and is only read through it.
        let engines = unsafe {
            [
                MmioEngine::new(NonNull::from(regs0)),
                MmioEngine::new(NonNull::from(regs1)),
            ]
        };
        let mut frame = FrameBuffer::new();
        let mut scheduler = AnimationScheduler::<_, _, NUM_LEDS>::new(
            &config,
            &mut frame,
            engines.into_iter().collect(),
            &tracker,
            SpinWait,
        )
        .unwrap();

        scheduler.tick();
        let moved = Box::new(scheduler);

        let base = moved.frame().as_bytes().as_ptr() as usize;
        for (engine, window) in moved.engines().iter().zip(moved.windows()) {
            assert!(engine.is_busy());
            #[allow(clippy::cast_possible_truncation)]
            let expected = (base + window.offset) as u32;
            assert_eq!(engine.address(), expected);
        }
    }
}
