//! Action execution engine.
//!
//! Drives the keyboard transport for keyboard actions and the callback
//! registry for local ones, polling the cancellation source between
//! keystrokes.

mod desktop;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::action::{Action, KeyStrokes, Payload, StrokeMode};
use crate::cancel::CancellationSource;
use crate::queue::ExecutionQueue;
use crate::registry::{CallbackRegistry, RegistryError};

pub use self::desktop::EnigoTransport;

/// A key as the HID link sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Key(u8),
    /// Two-byte consumer-control report.
    Media([u8; 2]),
}

#[async_trait::async_trait]
pub trait KeyboardTransport: Send + Sync {
    fn is_connected(&self) -> bool;
    async fn press(&self, key: KeyCode);
    async fn release(&self, key: KeyCode);
    /// Press and release in one report.
    async fn write(&self, key: KeyCode);
    async fn release_all(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Press(KeyCode),
    Release(KeyCode),
    Write(KeyCode),
    ReleaseAll,
}

/// Logs and records every transport call instead of sending it.
#[derive(Debug)]
pub struct LoggingTransport {
    connected: AtomicBool,
    events: Mutex<Vec<TransportEvent>>,
}

impl Default for LoggingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingTransport {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take_events(&self) -> Vec<TransportEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn record(&self, event: TransportEvent) {
        debug!("transport: {event:?}");
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[async_trait::async_trait]
impl KeyboardTransport for LoggingTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn press(&self, key: KeyCode) {
        self.record(TransportEvent::Press(key));
    }

    async fn release(&self, key: KeyCode) {
        self.record(TransportEvent::Release(key));
    }

    async fn write(&self, key: KeyCode) {
        self.record(TransportEvent::Write(key));
    }

    async fn release_all(&self) {
        self.record(TransportEvent::ReleaseAll);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Completed,
    /// Stopped at a cancellation checkpoint.
    Cancelled,
    /// Keyboard action dropped because the transport is not connected.
    Skipped,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("unknown local action `{0}`")]
    UnknownCallback(String),
    #[error("local action `{0}` reported failure")]
    CallbackFailed(String),
}

impl From<RegistryError> for ExecuteError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::Unknown(name) => ExecuteError::UnknownCallback(name),
        }
    }
}

pub struct ActionExecutor<T: KeyboardTransport + 'static> {
    transport: Arc<T>,
    callbacks: Arc<CallbackRegistry>,
    cancel: Arc<dyn CancellationSource>,
    queue: Arc<ExecutionQueue>,
    key_delay: Duration,
}

impl<T: KeyboardTransport + 'static> ActionExecutor<T> {
    pub fn new(
        transport: Arc<T>,
        callbacks: Arc<CallbackRegistry>,
        cancel: Arc<dyn CancellationSource>,
        queue: Arc<ExecutionQueue>,
        key_delay: Duration,
    ) -> Self {
        Self {
            transport,
            callbacks,
            cancel,
            queue,
            key_delay,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn queue(&self) -> &Arc<ExecutionQueue> {
        &self.queue
    }

    pub async fn execute(&self, action: &Action) -> Result<Execution, ExecuteError> {
        info!("Executing Action {action}");
        if self.check_for_stop().await {
            return Ok(Execution::Cancelled);
        }
        match action.payload() {
            Payload::Empty => Ok(Execution::Completed),
            Payload::Local => {
                if self.callbacks.invoke(action)? {
                    Ok(Execution::Completed)
                } else {
                    Err(ExecuteError::CallbackFailed(action.name().to_string()))
                }
            }
            Payload::Keyboard(strokes) => {
                if !self.transport.is_connected() {
                    warn!("Skipping action {action}. Keyboard not connected");
                    return Ok(Execution::Skipped);
                }
                let stopped = self.send_strokes(strokes).await;
                if stopped && action.needs_release() {
                    info!("Releasing all keys");
                    self.transport.release_all().await;
                }
                Ok(if stopped {
                    Execution::Cancelled
                } else {
                    Execution::Completed
                })
            }
        }
    }

    /// Returns true when a cancellation checkpoint fired.
    async fn send_strokes(&self, strokes: &KeyStrokes) -> bool {
        if strokes.double_byte {
            let key = media_key(&strokes.values);
            match strokes.mode {
                StrokeMode::Tap => self.transport.write(key).await,
                StrokeMode::Hold => self.transport.press(key).await,
                StrokeMode::Release => self.transport.release(key).await,
            }
            pause(self.key_delay).await;
            return false;
        }

        let hold = strokes.hold_time.unwrap_or_default();
        if !hold.is_zero() {
            info!("Pressing key with hold of {} ms", hold.as_millis());
        }
        for &value in &strokes.values {
            let key = KeyCode::Key(value);
            match strokes.mode {
                StrokeMode::Tap => {
                    self.transport.press(key).await;
                    pause(hold).await;
                    self.transport.release(key).await;
                }
                StrokeMode::Hold => self.transport.press(key).await,
                StrokeMode::Release => self.transport.release(key).await,
            }
            pause(self.key_delay).await;
            if self.check_for_stop().await {
                return true;
            }
        }
        false
    }

    async fn check_for_stop(&self) -> bool {
        if self.cancel.interrupted() {
            let dropped = self.queue.clear().await;
            info!("Execution interrupted, dropped {dropped} queued keyboard action(s)");
            return true;
        }
        false
    }
}

fn media_key(values: &[u8]) -> KeyCode {
    let low = values.first().copied().unwrap_or(0);
    let high = values.get(1).copied().unwrap_or(0);
    KeyCode::Media([low, high])
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
