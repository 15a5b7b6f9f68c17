use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{compile_deck, load_from_path, CompiledDeck, Diagnostic, LoadError, LoadedConfig};
use crate::keys::KeyTable;
use crate::registry::CallbackRegistry;
use thiserror::Error;

#[derive(Debug)]
pub struct AppState {
    config_path: PathBuf,
    keys: KeyTable,
    callbacks: Arc<CallbackRegistry>,
    pub loaded: LoadedConfig,
    pub compiled: CompiledDeck,
}

#[derive(Debug, Error)]
pub enum AppStateError {
    #[error("Failed to load config: {0}")]
    Load(#[from] LoadError),
}

impl AppState {
    pub fn initialize(
        config_path: impl Into<PathBuf>,
        keys: KeyTable,
        callbacks: Arc<CallbackRegistry>,
    ) -> Result<Self, AppStateError> {
        let path = config_path.into();
        let loaded = load_from_path(&path)?;
        let compiled = compile_deck(&loaded, &keys, &callbacks);
        Ok(Self {
            config_path: path,
            keys,
            callbacks,
            loaded,
            compiled,
        })
    }

    /// Re-reads the deck file. On failure the previous deck stays active.
    /// Only the compiled deck is replaced; a running queue and executor keep
    /// the timing they were built with.
    pub fn reload(&mut self) -> Result<(), AppStateError> {
        let loaded = load_from_path(&self.config_path)?;
        let compiled = compile_deck(&loaded, &self.keys, &self.callbacks);
        self.loaded = loaded;
        self.compiled = compiled;
        Ok(())
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.compiled.diagnostics
    }

    pub fn compiled_deck(&self) -> &CompiledDeck {
        &self.compiled
    }
}
