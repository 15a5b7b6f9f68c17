use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use touchdeck_core::{
    ActionExecutor, CallbackRegistry, CancellationSource, ExecutionQueue, KeyCode, KeyTable,
    KeyboardTransport, LoggingTransport, ParseOutcome, SequenceParser, TouchSignal,
};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn callbacks() -> CallbackRegistry {
    CallbackRegistry::new()
        .with("MENU", |_| true)
        .with("SCREEN", |_| true)
}

pub fn parse(text: &str) -> ParseOutcome {
    let keys = KeyTable::standard();
    let callbacks = callbacks();
    SequenceParser::new(&keys, &callbacks).parse(text)
}

pub fn executor<T: KeyboardTransport + 'static>(
    transport: Arc<T>,
    cancel: Arc<dyn CancellationSource>,
) -> ActionExecutor<T> {
    ActionExecutor::new(
        transport,
        Arc::new(callbacks()),
        cancel,
        Arc::new(ExecutionQueue::default()),
        Duration::ZERO,
    )
}

/// Recording transport that simulates a touch on the n-th key press.
pub struct TouchOnPress {
    pub recorder: LoggingTransport,
    pub signal: Arc<TouchSignal>,
    presses: AtomicUsize,
    touch_at: usize,
}

impl TouchOnPress {
    pub fn new(signal: Arc<TouchSignal>, touch_at: usize) -> Self {
        Self {
            recorder: LoggingTransport::new(),
            signal,
            presses: AtomicUsize::new(0),
            touch_at,
        }
    }
}

#[async_trait::async_trait]
impl KeyboardTransport for TouchOnPress {
    fn is_connected(&self) -> bool {
        true
    }

    async fn press(&self, key: KeyCode) {
        self.recorder.press(key).await;
        if self.presses.fetch_add(1, Ordering::SeqCst) + 1 == self.touch_at {
            self.signal.touch();
        }
    }

    async fn release(&self, key: KeyCode) {
        self.recorder.release(key).await;
    }

    async fn write(&self, key: KeyCode) {
        self.recorder.write(key).await;
    }

    async fn release_all(&self) {
        self.recorder.release_all().await;
    }
}
