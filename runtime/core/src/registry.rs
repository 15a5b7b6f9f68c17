//! Named device-local behaviors (menu changes, reboot, user callbacks).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, error};
use serde_json::Value;
use thiserror::Error;

use crate::action::Action;

pub type ActionCallback = Arc<dyn Fn(&Action) -> bool + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no callback registered under `{0}`")]
    Unknown(String),
}

#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, ActionCallback>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Action) -> bool + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Arc::new(callback));
    }

    pub fn with<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Action) -> bool + Send + Sync + 'static,
    {
        self.register(name, callback);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Calls the callback named by the action's first parameter and returns
    /// its own result.
    pub fn invoke(&self, action: &Action) -> Result<bool, RegistryError> {
        let name = action.name();
        match self.callbacks.get(name) {
            Some(callback) => {
                debug!("Calling function {name}");
                Ok(callback(action))
            }
            None => {
                error!(
                    "Invalid callback name {name}. Valid callbacks are: {}",
                    self.names().join(", ")
                );
                Err(RegistryError::Unknown(name.to_string()))
            }
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.callbacks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn names_json(&self) -> Value {
        Value::Array(self.names().into_iter().map(Value::from).collect())
    }
}
