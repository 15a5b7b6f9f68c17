//! Hand-off between button presses and the dispatch loop.
//!
//! Keyboard and screen actions wait in separate FIFOs behind one lock. The
//! lock is only ever held for a single push, pop or clear.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, error, trace};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};

use crate::action::Action;

pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("unable to lock the action queue within {timeout:?}; dropped {action}")]
    LockTimeout { action: String, timeout: Duration },
}

#[derive(Debug, Default)]
struct Queues {
    keyboard: VecDeque<Action>,
    screen: VecDeque<Action>,
}

#[derive(Debug)]
pub struct ExecutionQueue {
    queues: Mutex<Queues>,
    work: Notify,
    enqueue_timeout: Duration,
}

impl Default for ExecutionQueue {
    fn default() -> Self {
        Self::new(DEFAULT_ENQUEUE_TIMEOUT)
    }
}

impl ExecutionQueue {
    pub fn new(enqueue_timeout: Duration) -> Self {
        Self {
            queues: Mutex::new(Queues::default()),
            work: Notify::new(),
            enqueue_timeout,
        }
    }

    /// Pushes `action` to the screen or keyboard queue. Gives up, dropping the
    /// action, if the lock is not acquired within the enqueue timeout.
    pub async fn enqueue(&self, action: Action) -> Result<(), QueueError> {
        let Ok(mut queues) = tokio::time::timeout(self.enqueue_timeout, self.queues.lock()).await
        else {
            error!("Unable to queue new action {action}");
            return Err(QueueError::LockTimeout {
                action: action.to_string(),
                timeout: self.enqueue_timeout,
            });
        };
        if action.is_screen() {
            debug!("Pushing action {action} to screen queue");
            queues.screen.push_back(action);
        } else {
            debug!("Pushing action {action} to keyboard queue");
            queues.keyboard.push_back(action);
        }
        drop(queues);
        self.work.notify_one();
        Ok(())
    }

    pub async fn dequeue_keyboard(&self) -> Option<Action> {
        let mut queues = self.queues.lock().await;
        let action = queues.keyboard.pop_front();
        trace!("Action Queue Length : {}", queues.keyboard.len());
        action
    }

    pub async fn dequeue_screen(&self) -> Option<Action> {
        let mut queues = self.queues.lock().await;
        let action = queues.screen.pop_front();
        trace!("Screen Action Queue Length : {}", queues.screen.len());
        action
    }

    pub async fn size(&self) -> usize {
        let queues = self.queues.lock().await;
        queues.keyboard.len() + queues.screen.len()
    }

    /// Drops every pending keyboard action. The screen queue is untouched.
    pub async fn clear(&self) -> usize {
        let mut queues = self.queues.lock().await;
        let dropped = queues.keyboard.len();
        queues.keyboard.clear();
        if dropped > 0 {
            debug!("Cleared {dropped} pending keyboard action(s)");
        }
        dropped
    }

    /// Resolves after the next successful enqueue, or immediately if one
    /// happened since the last call.
    pub async fn wait_for_work(&self) {
        self.work.notified().await;
    }
}
