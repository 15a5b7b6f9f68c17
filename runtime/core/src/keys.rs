//! Symbolic key names understood inside `{...}` tokens.
//!
//! Codes follow the BLE HID keyboard convention used by the device: single
//! byte codes for regular and modifier keys, two-byte consumer reports for
//! media keys.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCategory {
    Plain,
    /// Modifier: pressed now, released by the trailing release action.
    NeedsRelease,
    /// Both codes form one consumer-control report.
    DoubleByteMedia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    pub name: &'static str,
    pub codes: &'static [u8],
    pub category: KeyCategory,
}

impl KeyEntry {
    pub const fn plain(name: &'static str, codes: &'static [u8]) -> Self {
        Self {
            name,
            codes,
            category: KeyCategory::Plain,
        }
    }

    pub const fn modifier(name: &'static str, codes: &'static [u8]) -> Self {
        Self {
            name,
            codes,
            category: KeyCategory::NeedsRelease,
        }
    }

    pub const fn media(name: &'static str, codes: &'static [u8]) -> Self {
        Self {
            name,
            codes,
            category: KeyCategory::DoubleByteMedia,
        }
    }

    pub fn needs_release(&self) -> bool {
        self.category == KeyCategory::NeedsRelease
    }

    pub fn is_double_byte(&self) -> bool {
        self.category == KeyCategory::DoubleByteMedia
    }
}

pub const KEY_LEFT_CTRL: u8 = 0x80;
pub const KEY_LEFT_SHIFT: u8 = 0x81;
pub const KEY_LEFT_ALT: u8 = 0x82;
pub const KEY_LEFT_GUI: u8 = 0x83;
pub const KEY_RIGHT_CTRL: u8 = 0x84;
pub const KEY_RIGHT_SHIFT: u8 = 0x85;
pub const KEY_RIGHT_ALT: u8 = 0x86;
pub const KEY_RIGHT_GUI: u8 = 0x87;

pub const KEY_RETURN: u8 = 0xB0;
pub const KEY_BACKSPACE: u8 = 0xB2;
pub const KEY_TAB: u8 = 0xB3;
pub const KEY_F1: u8 = 0xC2;
pub const KEY_DELETE: u8 = 0xD4;
pub const KEY_PAGE_UP: u8 = 0xD3;
pub const KEY_PAGE_DOWN: u8 = 0xD6;
pub const KEY_RIGHT_ARROW: u8 = 0xD7;
pub const KEY_LEFT_ARROW: u8 = 0xD8;
pub const KEY_DOWN_ARROW: u8 = 0xD9;
pub const KEY_UP_ARROW: u8 = 0xDA;
pub const KEY_F13: u8 = 0xF0;

/// Lookup order matters: the first entry with a matching name wins.
pub const STANDARD_KEYS: &[KeyEntry] = &[
    KeyEntry::media("MUTE", &[16, 0]),
    KeyEntry::media("VOLUME_DOWN", &[64, 0]),
    KeyEntry::media("VOLUME_UP", &[32, 0]),
    KeyEntry::media("PLAY_PAUSE", &[8, 0]),
    KeyEntry::media("STOP", &[4, 0]),
    KeyEntry::media("NEXT_TRACK", &[1, 0]),
    KeyEntry::media("PREVIOUS_TRACK", &[2, 0]),
    KeyEntry::media("WWW_HOME", &[128, 0]),
    KeyEntry::media("LOCAL_MACHINE_BROWSER", &[0, 1]),
    KeyEntry::media("CALCULATOR", &[0, 2]),
    KeyEntry::media("WWW_BOOKMARKS", &[0, 4]),
    KeyEntry::media("WWW_SEARCH", &[0, 8]),
    KeyEntry::media("WWW_STOP", &[0, 16]),
    KeyEntry::media("WWW_BACK", &[0, 32]),
    KeyEntry::media("CONSUMER_CONTROL_CONFIGURATION", &[0, 64]),
    KeyEntry::media("EMAIL_READER", &[0, 128]),
    KeyEntry::plain("F1", &[KEY_F1]),
    KeyEntry::plain("F2", &[0xC3]),
    KeyEntry::plain("F3", &[0xC4]),
    KeyEntry::plain("F4", &[0xC5]),
    KeyEntry::plain("F5", &[0xC6]),
    KeyEntry::plain("F6", &[0xC7]),
    KeyEntry::plain("F7", &[0xC8]),
    KeyEntry::plain("F8", &[0xC9]),
    KeyEntry::plain("F9", &[0xCA]),
    KeyEntry::plain("F10", &[0xCB]),
    KeyEntry::plain("F11", &[0xCC]),
    KeyEntry::plain("F12", &[0xCD]),
    KeyEntry::plain("F13", &[KEY_F13]),
    KeyEntry::plain("F14", &[0xF1]),
    KeyEntry::plain("F15", &[0xF2]),
    KeyEntry::plain("F16", &[0xF3]),
    KeyEntry::plain("F17", &[0xF4]),
    KeyEntry::plain("F18", &[0xF5]),
    KeyEntry::plain("F19", &[0xF6]),
    KeyEntry::plain("F20", &[0xF7]),
    KeyEntry::plain("F21", &[0xF8]),
    KeyEntry::plain("F22", &[0xF9]),
    KeyEntry::plain("F23", &[0xFA]),
    KeyEntry::plain("F24", &[0xFB]),
    KeyEntry::plain("UP_ARROW", &[KEY_UP_ARROW]),
    KeyEntry::plain("DOWN_ARROW", &[KEY_DOWN_ARROW]),
    KeyEntry::plain("LEFT_ARROW", &[KEY_LEFT_ARROW]),
    KeyEntry::plain("RIGHT_ARROW", &[KEY_RIGHT_ARROW]),
    KeyEntry::plain("BACKSPACE", &[KEY_BACKSPACE]),
    KeyEntry::plain("TAB", &[KEY_TAB]),
    KeyEntry::plain("RETURN", &[KEY_RETURN]),
    KeyEntry::plain("PAGE_UP", &[KEY_PAGE_UP]),
    KeyEntry::plain("PAGE_DOWN", &[KEY_PAGE_DOWN]),
    KeyEntry::plain("DELETE", &[KEY_DELETE]),
    KeyEntry::modifier("LEFT_CTRL", &[KEY_LEFT_CTRL]),
    KeyEntry::modifier("LEFT_SHIFT", &[KEY_LEFT_SHIFT]),
    KeyEntry::modifier("LEFT_ALT", &[KEY_LEFT_ALT]),
    KeyEntry::modifier("LEFT_GUI", &[KEY_LEFT_GUI]),
    KeyEntry::modifier("RIGHT_CTRL", &[KEY_RIGHT_CTRL]),
    KeyEntry::modifier("RIGHT_SHIFT", &[KEY_RIGHT_SHIFT]),
    KeyEntry::modifier("RIGHT_ALT", &[KEY_RIGHT_ALT]),
    KeyEntry::modifier("RIGHT_GUI", &[KEY_RIGHT_GUI]),
];

#[derive(Debug, Clone, Copy)]
pub struct KeyTable {
    entries: &'static [KeyEntry],
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeyTable {
    pub const fn new(entries: &'static [KeyEntry]) -> Self {
        Self { entries }
    }

    pub const fn standard() -> Self {
        Self::new(STANDARD_KEYS)
    }

    /// Case-sensitive linear scan, first match wins.
    pub fn lookup(&self, name: &str) -> Option<&'static KeyEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn needs_release(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(KeyEntry::needs_release)
    }

    pub fn is_double_byte(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(KeyEntry::is_double_byte)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Key names as a JSON array, in table order.
    pub fn names_json(&self) -> Value {
        Value::Array(self.names().map(Value::from).collect())
    }
}
