use std::sync::atomic::{AtomicBool, Ordering};

/// Polled between keystrokes to stop a running sequence.
pub trait CancellationSource: Send + Sync {
    /// True if new interrupting input arrived since the previous call.
    fn interrupted(&self) -> bool;
}

/// Latch set by the touch handler and consumed by the executor.
#[derive(Debug, Default)]
pub struct TouchSignal {
    touched: AtomicBool,
}

impl TouchSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Safe to call from the touch interrupt path.
    pub fn touch(&self) {
        self.touched.store(true, Ordering::Release);
    }
}

impl CancellationSource for TouchSignal {
    fn interrupted(&self) -> bool {
        self.touched.swap(false, Ordering::AcqRel)
    }
}

/// Never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancellationSource for NeverCancel {
    fn interrupted(&self) -> bool {
        false
    }
}
