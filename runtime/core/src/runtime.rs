use std::path::PathBuf;
use std::sync::Arc;

use crate::action::Action;
use crate::app::{AppState, AppStateError};
use crate::cancel::CancellationSource;
use crate::dispatch::{spawn_dispatcher, DispatchHandle};
use crate::executor::{ActionExecutor, KeyboardTransport};
use crate::keys::KeyTable;
use crate::queue::{ExecutionQueue, QueueError};
use crate::registry::CallbackRegistry;
use log::{info, warn};
use tokio::sync::Mutex;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeManagerError {
    #[error("app state error: {0}")]
    App(#[from] AppStateError),
    #[error("no button {index} in menu `{menu}`")]
    UnknownButton { menu: String, index: usize },
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Owns the compiled deck, the execution queue and the dispatch loop.
pub struct RuntimeManager<T: KeyboardTransport + 'static> {
    pub state: Arc<Mutex<AppState>>,
    pub queue: Arc<ExecutionQueue>,
    pub executor: Arc<ActionExecutor<T>>,
    dispatcher: DispatchHandle,
}

impl<T: KeyboardTransport + 'static> RuntimeManager<T> {
    /// Must be called from within a tokio runtime.
    pub fn initialize(
        config_path: PathBuf,
        transport: Arc<T>,
        callbacks: CallbackRegistry,
        cancel: Arc<dyn CancellationSource>,
    ) -> Result<Self, RuntimeManagerError> {
        let callbacks = Arc::new(callbacks);
        let app_state = AppState::initialize(config_path, KeyTable::standard(), callbacks.clone())?;
        let settings = app_state.compiled_deck().settings;
        let queue = Arc::new(ExecutionQueue::new(settings.enqueue_timeout));
        let executor = Arc::new(ActionExecutor::new(
            transport,
            callbacks,
            cancel,
            queue.clone(),
            settings.key_delay,
        ));
        let dispatcher = spawn_dispatcher(executor.clone());

        Ok(Self {
            state: Arc::new(Mutex::new(app_state)),
            queue,
            executor,
            dispatcher,
        })
    }

    /// Queues every action of a button. Returns whether all of them were
    /// queued.
    pub async fn press(&self, menu: &str, index: usize) -> Result<bool, RuntimeManagerError> {
        let sequence = {
            let state = self.state.lock().await;
            let button = state.compiled_deck().button(menu, index).ok_or_else(|| {
                RuntimeManagerError::UnknownButton {
                    menu: menu.to_string(),
                    index,
                }
            })?;
            info!("Button {menu}[{index}] `{}` pressed", button.label);
            button.sequence.clone()
        };
        Ok(sequence.execute(&self.queue).await)
    }

    /// Re-reads the deck file; the previous deck stays active on failure.
    /// Key delay and enqueue timeout are fixed when the queue and executor
    /// are built, so a changed `general` section only applies after the next
    /// `initialize`.
    pub async fn reload(&self) -> Result<(), RuntimeManagerError> {
        let mut state = self.state.lock().await;
        let before = state.compiled_deck().settings;
        state.reload()?;
        if state.compiled_deck().settings != before {
            warn!("Deck timing settings changed on reload; they apply after a restart");
        }
        Ok(())
    }

    pub async fn reboot(&self) -> Result<(), RuntimeManagerError> {
        self.queue.enqueue(Action::reboot()).await?;
        Ok(())
    }

    pub fn shutdown(self) {
        self.dispatcher.shutdown();
    }
}
