use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cross-thread request to re-run representation selection.
///
/// Any thread may raise the flag; the tracker's own worker consumes it at
/// the next segment boundary where switching is allowed.
#[derive(Debug, Clone, Default)]
pub struct SelectionHandle {
    pending: Arc<AtomicBool>,
}

impl SelectionHandle {
    pub fn update_selected(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set.
    pub(crate) fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}
