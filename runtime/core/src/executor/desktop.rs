//! Desktop stand-in for the BLE keyboard: injects keys into the local
//! session through `enigo`.

use std::sync::{Mutex, PoisonError};

use enigo::{Enigo, Key, KeyboardControllable};
use log::warn;
use tokio::task;

use super::{KeyCode, KeyboardTransport};
use crate::keys::{
    KEY_BACKSPACE, KEY_DELETE, KEY_DOWN_ARROW, KEY_LEFT_ALT, KEY_LEFT_ARROW, KEY_LEFT_CTRL,
    KEY_LEFT_GUI, KEY_LEFT_SHIFT, KEY_PAGE_DOWN, KEY_PAGE_UP, KEY_RETURN, KEY_RIGHT_ALT,
    KEY_RIGHT_ARROW, KEY_RIGHT_CTRL, KEY_RIGHT_GUI, KEY_RIGHT_SHIFT, KEY_TAB, KEY_UP_ARROW,
};

#[derive(Debug, Default)]
pub struct EnigoTransport {
    held: Mutex<Vec<u8>>,
}

impl EnigoTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn held(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Down,
    Up,
    Click,
}

#[async_trait::async_trait]
impl KeyboardTransport for EnigoTransport {
    fn is_connected(&self) -> bool {
        true
    }

    async fn press(&self, key: KeyCode) {
        if let KeyCode::Key(code) = key {
            self.held().push(code);
        }
        send(key, Op::Down).await;
    }

    async fn release(&self, key: KeyCode) {
        if let KeyCode::Key(code) = key {
            self.held().retain(|held| *held != code);
        }
        send(key, Op::Up).await;
    }

    async fn write(&self, key: KeyCode) {
        send(key, Op::Click).await;
    }

    async fn release_all(&self) {
        let held = std::mem::take(&mut *self.held());
        for code in held {
            send(KeyCode::Key(code), Op::Up).await;
        }
    }
}

async fn send(key: KeyCode, op: Op) {
    let KeyCode::Key(code) = key else {
        warn!("Media key {key:?} is not supported by the desktop transport");
        return;
    };
    if map_key(code).is_none() {
        warn!("No desktop key for code {code:#04x}");
        return;
    }
    let _ = task::spawn_blocking(move || send_key_blocking(code, op)).await;
}

fn send_key_blocking(code: u8, op: Op) {
    let Some(key) = map_key(code) else {
        return;
    };
    let mut enigo = Enigo::new();
    match op {
        Op::Down => enigo.key_down(key),
        Op::Up => enigo.key_up(key),
        Op::Click => enigo.key_click(key),
    }
}

fn map_key(code: u8) -> Option<Key> {
    let key = match code {
        KEY_LEFT_CTRL | KEY_RIGHT_CTRL => Key::Control,
        KEY_LEFT_SHIFT | KEY_RIGHT_SHIFT => Key::Shift,
        KEY_LEFT_ALT | KEY_RIGHT_ALT => Key::Alt,
        KEY_LEFT_GUI | KEY_RIGHT_GUI => Key::Meta,
        KEY_RETURN | b'\n' => Key::Return,
        KEY_BACKSPACE => Key::Backspace,
        KEY_TAB | b'\t' => Key::Tab,
        KEY_DELETE => Key::Delete,
        KEY_PAGE_UP => Key::PageUp,
        KEY_PAGE_DOWN => Key::PageDown,
        KEY_UP_ARROW => Key::UpArrow,
        KEY_DOWN_ARROW => Key::DownArrow,
        KEY_LEFT_ARROW => Key::LeftArrow,
        KEY_RIGHT_ARROW => Key::RightArrow,
        0xC2 => Key::F1,
        0xC3 => Key::F2,
        0xC4 => Key::F3,
        0xC5 => Key::F4,
        0xC6 => Key::F5,
        0xC7 => Key::F6,
        0xC8 => Key::F7,
        0xC9 => Key::F8,
        0xCA => Key::F9,
        0xCB => Key::F10,
        0xCC => Key::F11,
        0xCD => Key::F12,
        b' ' => Key::Space,
        c if c.is_ascii_graphic() => Key::Layout(c as char),
        _ => return None,
    };
    Some(key)
}
