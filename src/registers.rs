//! Register-level view of a strand transfer engine
//!
//! Each engine exposes two 32-bit registers:
//!
//! | Offset | Register | Contents |
//! |--------|----------|----------|
//! | `0x00` | `ADR`    | Address of the first color byte to stream |
//! | `0x04` | `CR`     | Control: start/busy, interrupt enable, LED count |
//!
//! Both registers are read-only while a transfer is in flight. A transfer
//! only starts when `ADR` points into RAM.

/// Start transfer / busy flag. Cleared by hardware after the latch period.
pub const CR_BSY: u32 = 1 << 0;
/// Transfer complete interrupt enable
pub const CR_TXIE: u32 = 1 << 1;
/// Bit offset of the LED count field
pub const CR_LEN_OFFSET: u32 = 8;
/// Width of the LED count field in bits
pub const CR_LEN_BITS: u32 = 12;
/// Largest LED count an engine can stream
pub const MAX_LEN: u32 = (1 << CR_LEN_BITS) - 1;
/// LED count field mask
pub const CR_LEN_MASK: u32 = MAX_LEN << CR_LEN_OFFSET;

/// Start of the RAM region engines are allowed to read from
pub const RAM_BASE: u32 = 0x2000_0000;
/// End (exclusive) of the RAM region
pub const RAM_END: u32 = 0x4000_0000;

/// Returns if engines may stream from `address`
pub const fn is_ram_address(address: u32) -> bool {
    address >> 29 == 0b001
}

/// Memory-mapped register block of one engine
#[repr(C)]
#[derive(Debug, Default)]
pub struct RegisterBlock {
    pub adr: u32,
    pub cr: u32,
}

/// Decoded control register value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlRegister(u32);

impl ControlRegister {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_busy(self) -> bool {
        self.0 & CR_BSY != 0
    }

    pub const fn interrupt_enabled(self) -> bool {
        self.0 & CR_TXIE != 0
    }

    /// Number of LEDs to stream
    pub const fn len(self) -> u32 {
        (self.0 & CR_LEN_MASK) >> CR_LEN_OFFSET
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn with_busy(self, busy: bool) -> Self {
        if busy {
            Self(self.0 | CR_BSY)
        } else {
            Self(self.0 & !CR_BSY)
        }
    }

    #[must_use]
    pub const fn with_interrupt(self, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | CR_TXIE)
        } else {
            Self(self.0 & !CR_TXIE)
        }
    }

    /// Set the LED count, truncating to the field width
    #[must_use]
    pub const fn with_len(self, leds: u32) -> Self {
        Self((self.0 & !CR_LEN_MASK) | ((leds & MAX_LEN) << CR_LEN_OFFSET))
    }
}
