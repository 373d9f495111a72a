//! Simulated transfer engines for host-side testing
//!
//! [`SimulatedHardware`] models the register behaviour of the strand
//! engines: writes are ignored while an engine is busy, transfers only
//! start from RAM addresses, and a completion raises the engine's
//! interrupt (if enabled) which sets its bit in the [`CompletionTracker`].
//! Completions are injected explicitly by the test, and individual engines
//! can be held busy to emulate a lost or delayed interrupt.
//!
//! State is shared through critical sections, so engines owned by the
//! scheduler and the test driving completions may live on different
//! threads.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use crate::color::BYTES_PER_LED;
use crate::completion::CompletionTracker;
use crate::engine::TransferEngine;
use crate::registers::{ControlRegister, RAM_BASE, is_ram_address};
use crate::wait::CompletionWait;
use crate::window::{MAX_ENGINES, TransferWindow};

/// Default number of bytes captured per simulated transfer
pub const DEFAULT_STREAM_BYTES: usize = 256;

#[derive(Debug, Clone, Default)]
struct EngineState<const STREAM_BYTES: usize> {
    address: u32,
    control: ControlRegister,
    window: TransferWindow,
    held: bool,
    starts: usize,
    completions: usize,
    streamed: Vec<u8, STREAM_BYTES>,
}

/// Shared state of up to four simulated engines
///
/// The frame buffer is assumed to sit at `frame_address` in the simulated
/// memory map, [`RAM_BASE`] by default. Each transfer captures at most
/// `STREAM_BYTES` bytes of its window.
pub struct SimulatedHardware<'a, const STREAM_BYTES: usize = DEFAULT_STREAM_BYTES> {
    tracker: &'a CompletionTracker,
    frame_address: u32,
    engines: Mutex<RefCell<[EngineState<STREAM_BYTES>; MAX_ENGINES]>>,
}

impl<'a> SimulatedHardware<'a> {
    /// Create idle engines reporting completions to `tracker`
    pub fn new(tracker: &'a CompletionTracker) -> Self {
        Self::with_stream_capacity(tracker)
    }
}

impl<'a, const STREAM_BYTES: usize> SimulatedHardware<'a, STREAM_BYTES> {
    /// Create idle engines capturing up to `STREAM_BYTES` bytes per transfer
    pub fn with_stream_capacity(tracker: &'a CompletionTracker) -> Self {
        Self {
            tracker,
            frame_address: RAM_BASE,
            engines: Mutex::new(RefCell::new(Default::default())),
        }
    }

    /// Place the frame buffer at a different simulated address
    #[must_use]
    pub fn with_frame_address(mut self, address: u32) -> Self {
        self.frame_address = address;
        self
    }

    /// Driver handle for engine `index`
    ///
    /// A handle past the last engine drives nothing.
    pub fn engine(&self, index: usize) -> SimulatedEngine<'_, 'a, STREAM_BYTES> {
        SimulatedEngine {
            hardware: self,
            index,
        }
    }

    /// Driver handles for engines `0..count`
    pub fn engines(
        &self,
        count: usize,
    ) -> Vec<SimulatedEngine<'_, 'a, STREAM_BYTES>, MAX_ENGINES> {
        (0..count.min(MAX_ENGINES)).map(|i| self.engine(i)).collect()
    }

    /// Run `f` on the state of engine `index`, `None` if there is no such
    /// engine
    fn with_state<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut EngineState<STREAM_BYTES>) -> R,
    ) -> Option<R> {
        critical_section::with(|cs| {
            let mut engines = self.engines.borrow(cs).borrow_mut();
            engines.get_mut(index).map(f)
        })
    }

    /// Finish the transfer of engine `index`
    ///
    /// Clears the busy flag and, if its interrupt is enabled, runs the
    /// completion handler. Returns `false` if the engine was idle, held or
    /// does not exist.
    pub fn complete(&self, index: usize) -> bool {
        let raise_interrupt = self
            .with_state(index, |state| {
                if state.held || !state.control.is_busy() {
                    return None;
                }
                state.control = state.control.with_busy(false);
                state.completions += 1;
                Some(state.control.interrupt_enabled())
            })
            .flatten();

        match raise_interrupt {
            Some(true) => {
                if let Some(handle) = self.tracker.handle(index) {
                    handle.on_transfer_complete();
                }
                true
            }
            Some(false) => true,
            None => false,
        }
    }

    /// Finish every busy engine in index order
    ///
    /// Returns the number of transfers completed.
    pub fn complete_all(&self) -> usize {
        self.complete_in_order(&[0, 1, 2, 3])
    }

    /// Finish busy engines in the given order
    pub fn complete_in_order(&self, order: &[usize]) -> usize {
        order.iter().filter(|&&index| self.complete(index)).count()
    }

    /// Keep engine `index` busy until [`SimulatedHardware::release`]
    pub fn hold(&self, index: usize) {
        self.with_state(index, |state| state.held = true);
    }

    /// Allow engine `index` to complete again
    pub fn release(&self, index: usize) {
        self.with_state(index, |state| state.held = false);
    }

    pub fn is_busy(&self, index: usize) -> bool {
        self.with_state(index, |state| state.control.is_busy())
            .unwrap_or(false)
    }

    /// Number of transfers engine `index` has started
    pub fn starts(&self, index: usize) -> usize {
        self.with_state(index, |state| state.starts).unwrap_or(0)
    }

    /// Number of transfers engine `index` has finished
    pub fn completions(&self, index: usize) -> usize {
        self.with_state(index, |state| state.completions)
            .unwrap_or(0)
    }

    /// Bytes captured by the most recent transfer of engine `index`
    pub fn streamed(&self, index: usize) -> Vec<u8, STREAM_BYTES> {
        self.with_state(index, |state| state.streamed.clone())
            .unwrap_or_default()
    }

    pub fn control(&self, index: usize) -> ControlRegister {
        self.with_state(index, |state| state.control)
            .unwrap_or_default()
    }

    pub fn address(&self, index: usize) -> u32 {
        self.with_state(index, |state| state.address).unwrap_or(0)
    }
}

/// Driver for one simulated engine
#[derive(Clone, Copy)]
pub struct SimulatedEngine<'h, 'a, const STREAM_BYTES: usize = DEFAULT_STREAM_BYTES> {
    hardware: &'h SimulatedHardware<'a, STREAM_BYTES>,
    index: usize,
}

impl<const STREAM_BYTES: usize> SimulatedEngine<'_, '_, STREAM_BYTES> {
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl<const STREAM_BYTES: usize> TransferEngine for SimulatedEngine<'_, '_, STREAM_BYTES> {
    #[allow(clippy::cast_possible_truncation)]
    fn configure(&mut self, _frame: &[u8], window: TransferWindow) {
        let frame_address = self.hardware.frame_address;
        self.hardware.with_state(self.index, |state| {
            if state.control.is_busy() {
                return;
            }
            state.window = window;
            state.address = frame_address.wrapping_add(window.offset as u32);
            state.control = state
                .control
                .with_len(window.leds as u32)
                .with_interrupt(true);
        });
    }

    fn start(&mut self, frame: &[u8]) {
        self.hardware.with_state(self.index, |state| {
            if state.control.is_busy() || !is_ram_address(state.address) {
                return;
            }
            let end = state.window.offset + state.control.len() as usize * BYTES_PER_LED;
            state.streamed.clear();
            if let Some(bytes) = frame.get(state.window.offset..end) {
                let captured = bytes.len().min(STREAM_BYTES);
                let _ = state.streamed.extend_from_slice(&bytes[..captured]);
            }
            state.control = state.control.with_busy(true);
            state.starts += 1;
        });
    }

    fn is_busy(&self) -> bool {
        self.hardware.is_busy(self.index)
    }
}

/// Wait strategy that injects completions while it waits
///
/// Each poll completes the busy engines in `order`, then checks the mask.
/// Held engines keep it spinning until they are released.
pub struct SimulatedCompletion<'h, 'a, const STREAM_BYTES: usize = DEFAULT_STREAM_BYTES> {
    hardware: &'h SimulatedHardware<'a, STREAM_BYTES>,
    order: Vec<usize, MAX_ENGINES>,
    polls: usize,
}

impl<'h, 'a, const STREAM_BYTES: usize> SimulatedCompletion<'h, 'a, STREAM_BYTES> {
    /// Complete engines in index order
    pub fn new(hardware: &'h SimulatedHardware<'a, STREAM_BYTES>) -> Self {
        Self::with_order(hardware, &[0, 1, 2, 3])
    }

    /// Complete engines in a custom order
    pub fn with_order(
        hardware: &'h SimulatedHardware<'a, STREAM_BYTES>,
        order: &[usize],
    ) -> Self {
        Self {
            hardware,
            order: order.iter().copied().take(MAX_ENGINES).collect(),
            polls: 0,
        }
    }

    /// Number of times the mask has been polled
    pub const fn polls(&self) -> usize {
        self.polls
    }
}

impl<const STREAM_BYTES: usize> CompletionWait for SimulatedCompletion<'_, '_, STREAM_BYTES> {
    fn wait_all_done(&mut self, tracker: &CompletionTracker) {
        loop {
            self.hardware.complete_in_order(&self.order);
            self.polls += 1;
            if tracker.is_all_done() {
                return;
            }
            core::hint::spin_loop();
        }
    }
}
