//! Consumer side of the execution queue.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::action::Action;
use crate::executor::{ActionExecutor, Execution, KeyboardTransport};

#[derive(Debug)]
pub struct DispatchHandle {
    pub join_handle: JoinHandle<()>,
}

impl DispatchHandle {
    pub fn shutdown(self) {
        self.join_handle.abort();
    }
}

/// Spawns the dispatch loop. Screen actions are served before keyboard
/// actions; when both queues are empty the loop sleeps until the next enqueue.
pub fn spawn_dispatcher<T: KeyboardTransport + 'static>(
    executor: Arc<ActionExecutor<T>>,
) -> DispatchHandle {
    let join_handle = tokio::spawn(async move {
        loop {
            match next_action(&executor).await {
                Some(action) => run_action(&executor, &action).await,
                None => executor.queue().wait_for_work().await,
            }
        }
    });
    DispatchHandle { join_handle }
}

/// Executes queued actions until both queues are empty. Returns how many
/// actions were taken off the queues.
pub async fn run_until_idle<T: KeyboardTransport + 'static>(executor: &ActionExecutor<T>) -> usize {
    let mut handled = 0;
    while let Some(action) = next_action(executor).await {
        run_action(executor, &action).await;
        handled += 1;
    }
    handled
}

async fn next_action<T: KeyboardTransport + 'static>(executor: &ActionExecutor<T>) -> Option<Action> {
    let queue = executor.queue();
    match queue.dequeue_screen().await {
        Some(action) => Some(action),
        None => queue.dequeue_keyboard().await,
    }
}

async fn run_action<T: KeyboardTransport + 'static>(executor: &ActionExecutor<T>, action: &Action) {
    match executor.execute(action).await {
        Ok(Execution::Completed) => debug!("Completed {action}"),
        Ok(Execution::Cancelled) => info!("Cancelled {action}"),
        Ok(Execution::Skipped) => debug!("Skipped {action}"),
        Err(err) => warn!("Action {action} failed: {err}"),
    }
}
