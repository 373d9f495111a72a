//! Blocking wait on the completion mask

use crate::completion::CompletionTracker;

/// Strategy for blocking until every armed engine has finished
///
/// There is no timeout: if an engine never raises its completion
/// interrupt, implementations block forever.
pub trait CompletionWait {
    /// Return once `tracker` reports every engine done
    fn wait_all_done(&mut self, tracker: &CompletionTracker);
}

/// Busy-poll the completion mask
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinWait;

impl CompletionWait for SpinWait {
    fn wait_all_done(&mut self, tracker: &CompletionTracker) {
        while !tracker.is_all_done() {
            core::hint::spin_loop();
        }
    }
}

impl<W: CompletionWait + ?Sized> CompletionWait for &mut W {
    fn wait_all_done(&mut self, tracker: &CompletionTracker) {
        (**self).wait_all_done(tracker);
    }
}
