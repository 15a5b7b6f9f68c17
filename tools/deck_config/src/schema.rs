use std::collections::HashMap;

use serde::Deserialize;

pub const DEFAULT_KEY_DELAY_MS: u64 = 0;
pub const DEFAULT_ENQUEUE_TIMEOUT_MS: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub general: Option<General>,
    /// Names of the local actions the host registers at runtime.
    #[serde(default)]
    pub callbacks: Vec<String>,
    #[serde(default)]
    pub menus: HashMap<String, Menu>,
}

impl Config {
    pub fn key_delay_ms(&self) -> u64 {
        self.general
            .as_ref()
            .map(|g| g.key_delay_ms)
            .unwrap_or(DEFAULT_KEY_DELAY_MS)
    }

    pub fn enqueue_timeout_ms(&self) -> u64 {
        self.general
            .as_ref()
            .map(|g| g.enqueue_timeout_ms)
            .unwrap_or(DEFAULT_ENQUEUE_TIMEOUT_MS)
    }
}

#[derive(Debug, Deserialize)]
pub struct General {
    #[serde(default = "default_key_delay")]
    pub key_delay_ms: u64,
    #[serde(default = "default_enqueue_timeout")]
    pub enqueue_timeout_ms: u64,
}

fn default_key_delay() -> u64 {
    DEFAULT_KEY_DELAY_MS
}

fn default_enqueue_timeout() -> u64 {
    DEFAULT_ENQUEUE_TIMEOUT_MS
}

#[derive(Debug, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Deserialize)]
pub struct Button {
    pub label: String,
    /// Button definition, kept as a raw JSON value. Anything other than a
    /// non-empty string is reported when the button is compiled.
    #[serde(default)]
    pub actions: serde_json::Value,
}
