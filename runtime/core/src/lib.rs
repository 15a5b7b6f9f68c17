pub mod action;
pub mod app;
pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod executor;
pub mod keys;
pub mod queue;
pub mod registry;
pub mod runtime;
pub mod sequence;
pub mod token;

pub use action::{Action, ActionKind, KeyStrokes, Payload, StrokeMode};
pub use app::{AppState, AppStateError};
pub use cancel::{CancellationSource, NeverCancel, TouchSignal};
pub use config::{
    compile_deck, compile_deck_from_str, load_from_path, load_from_str, CompiledButton,
    CompiledDeck, CompiledMenu, DeckSettings, Diagnostic, DiagnosticSeverity, LoadError,
    LoadedConfig,
};
pub use dispatch::{run_until_idle, spawn_dispatcher, DispatchHandle};
pub use executor::{
    ActionExecutor, EnigoTransport, ExecuteError, Execution, KeyCode, KeyboardTransport,
    LoggingTransport, TransportEvent,
};
pub use keys::{KeyCategory, KeyEntry, KeyTable};
pub use queue::{ExecutionQueue, QueueError};
pub use registry::{ActionCallback, CallbackRegistry, RegistryError};
pub use runtime::{RuntimeManager, RuntimeManagerError};
pub use sequence::{ActionSequence, ParseError, ParseOutcome, SequenceParser};
pub use token::{resolve_token, split_parameters, TokenError};
