//! Transfer engine driver seam
//!
//! The scheduler only talks to engines through [`TransferEngine`]. The
//! memory-mapped backend lives here; a simulated backend for host tests
//! lives in [`crate::sim`].

use core::ptr::{self, NonNull};

use crate::registers::{ControlRegister, RegisterBlock};
use crate::window::TransferWindow;

/// Asynchronous unit streaming a window of the frame buffer to a strand
pub trait TransferEngine {
    /// Point the engine at `window` of `frame` and enable the completion
    /// interrupt
    ///
    /// Called once at initialization, before the first transfer. `frame`
    /// must stay at the same address for as long as the engine is in use.
    fn configure(&mut self, frame: &[u8], window: TransferWindow);

    /// Begin streaming the configured window
    ///
    /// `frame` is the buffer given to [`TransferEngine::configure`]. Must
    /// return immediately; the transfer runs in the background and finishes
    /// with a completion interrupt.
    fn start(&mut self, frame: &[u8]);

    /// Returns if a transfer is in flight
    fn is_busy(&self) -> bool;
}

/// Engine driven through its memory-mapped register block
///
/// `ADR` is written once in [`TransferEngine::configure`]; every start only
/// sets the busy bit.
#[derive(Debug)]
pub struct MmioEngine {
    regs: NonNull<RegisterBlock>,
}

impl MmioEngine {
    /// Wrap the register block at `regs`
    ///
    /// # Safety
    ///
    /// `regs` must point to a valid engine register block that is not
    /// accessed through any other handle for the lifetime of the engine.
    ///
    /// The frame passed to [`TransferEngine::configure`] must not move or be
    /// freed while a transfer may still be in flight, including after the
    /// engine itself has been dropped.
    pub const unsafe fn new(regs: NonNull<RegisterBlock>) -> Self {
        Self { regs }
    }

    /// Current control register value
    pub fn control(&self) -> ControlRegister {
        // SAFETY: `regs` is valid for the lifetime of `self` per `new`.
        let bits = unsafe { ptr::read_volatile(&raw const (*self.regs.as_ptr()).cr) };
        ControlRegister::from_bits(bits)
    }

    /// Current address register value
    pub fn address(&self) -> u32 {
        // SAFETY: `regs` is valid for the lifetime of `self` per `new`.
        unsafe { ptr::read_volatile(&raw const (*self.regs.as_ptr()).adr) }
    }

    fn write_control(&mut self, value: ControlRegister) {
        // SAFETY: `regs` is valid and exclusively owned per `new`.
        unsafe { ptr::write_volatile(&raw mut (*self.regs.as_ptr()).cr, value.bits()) }
    }

    fn write_address(&mut self, address: u32) {
        // SAFETY: `regs` is valid and exclusively owned per `new`.
        unsafe { ptr::write_volatile(&raw mut (*self.regs.as_ptr()).adr, address) }
    }
}

impl TransferEngine for MmioEngine {
    #[allow(clippy::cast_possible_truncation)]
    fn configure(&mut self, frame: &[u8], window: TransferWindow) {
        let address = frame.as_ptr() as usize + window.offset;
        self.write_address(address as u32);
        let control = self
            .control()
            .with_len(window.leds as u32)
            .with_interrupt(true);
        self.write_control(control);
    }

    fn start(&mut self, _frame: &[u8]) {
        let control = self.control().with_busy(true);
        self.write_control(control);
    }

    fn is_busy(&self) -> bool {
        self.control().is_busy()
    }
}
