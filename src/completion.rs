//! Transfer completion tracking
//!
//! One bit per engine. Interrupt handlers only ever set their own bit, and
//! the scheduler only clears the whole mask after it has observed every bit
//! set. Because handlers never share a bit, no lock is needed between them.

use portable_atomic::{AtomicU8, Ordering};

use crate::error::ConfigError;
use crate::window::MAX_ENGINES;

/// Completion mask shared between the scheduler and interrupt handlers
#[derive(Debug)]
pub struct CompletionTracker {
    mask: AtomicU8,
    engines: u8,
}

impl CompletionTracker {
    /// Create a tracker for `engine_count` engines with an empty mask
    ///
    /// Usable in a `static`. Counts above [`MAX_ENGINES`] are kept as given
    /// and rejected when the scheduler is built; see
    /// [`CompletionTracker::try_new`] for an eager check.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(engine_count: usize) -> Self {
        let engines = if engine_count > u8::MAX as usize {
            u8::MAX
        } else {
            engine_count as u8
        };
        Self {
            mask: AtomicU8::new(0),
            engines,
        }
    }

    /// Create a tracker, rejecting unsupported engine counts
    pub fn try_new(engine_count: usize) -> Result<Self, ConfigError> {
        match engine_count {
            0 => Err(ConfigError::NoEngines),
            1..=MAX_ENGINES => Ok(Self::new(engine_count)),
            count => Err(ConfigError::TooManyEngines { count }),
        }
    }

    /// Number of engines this tracker expects
    pub const fn engine_count(&self) -> usize {
        self.engines as usize
    }

    /// Mask value meaning every engine has finished
    pub const fn all_done_mask(&self) -> u8 {
        if self.engines as usize >= MAX_ENGINES {
            (1 << MAX_ENGINES) - 1
        } else {
            (1 << self.engines) - 1
        }
    }

    /// Current mask value
    pub fn mask(&self) -> u8 {
        self.mask.load(Ordering::Acquire)
    }

    /// Returns if every engine has reported completion
    pub fn is_all_done(&self) -> bool {
        self.mask() == self.all_done_mask()
    }

    /// Reset the mask to zero in a single store
    pub fn clear(&self) {
        self.mask.store(0, Ordering::Release);
    }

    /// Set the bit of engine `bit`
    ///
    /// Out of range bits are ignored.
    pub fn mark_done(&self, bit: usize) {
        if bit < self.engine_count().min(MAX_ENGINES) {
            self.mask.fetch_or(1 << bit, Ordering::AcqRel);
        }
    }

    /// Handle for the completion interrupt of engine `index`
    pub fn handle(&self, index: usize) -> Option<CompletionHandle<'_>> {
        (index < self.engine_count().min(MAX_ENGINES)).then_some(CompletionHandle {
            tracker: self,
            bit: index,
        })
    }
}

/// Completion interrupt side of one engine
///
/// Can only set the bit it was created for.
#[derive(Debug, Clone, Copy)]
pub struct CompletionHandle<'a> {
    tracker: &'a CompletionTracker,
    bit: usize,
}

impl CompletionHandle<'_> {
    /// Engine index this handle reports for
    pub const fn engine(&self) -> usize {
        self.bit
    }

    /// Record that the engine finished its transfer
    ///
    /// Call from the engine's completion interrupt. Never blocks.
    #[inline]
    pub fn on_transfer_complete(&self) {
        self.tracker.mark_done(self.bit);
    }
}
