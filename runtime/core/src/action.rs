//! The unit of execution produced by the sequence parser.

use std::fmt;
use std::time::Duration;

use crate::keys::KeyEntry;

pub const RELEASE_KEYS_NAME: &str = "Release Keys";
pub const REBOOT_ACTION_NAME: &str = "REBOOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Empty,
    Keyboard,
    Local,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Empty => "NONE",
            ActionKind::Keyboard => "KEYBOARD",
            ActionKind::Local => "LOCAL",
        };
        f.write_str(label)
    }
}

/// How the executor drives the transport for a keyboard action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeMode {
    /// Press, hold, release each value.
    Tap,
    /// Press each value and leave it down.
    Hold,
    /// Release each value.
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStrokes {
    pub values: Vec<u8>,
    pub mode: StrokeMode,
    pub double_byte: bool,
    pub hold_time: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Empty,
    Keyboard(KeyStrokes),
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    parameters: Vec<String>,
    payload: Payload,
}

impl Default for Action {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            payload: Payload::Empty,
        }
    }
}

impl Action {
    /// Keyboard action for a key table entry; flags come from the entry's
    /// category only.
    pub fn from_key(entry: &KeyEntry, hold_time: Option<Duration>) -> Self {
        let mode = if entry.needs_release() {
            StrokeMode::Hold
        } else {
            StrokeMode::Tap
        };
        Self {
            parameters: vec![entry.name.to_string()],
            payload: Payload::Keyboard(KeyStrokes {
                values: entry.codes.to_vec(),
                mode,
                double_byte: entry.is_double_byte(),
                hold_time,
            }),
        }
    }

    /// A single literal character held for `hold_time`.
    pub fn from_char(name: impl Into<String>, code: u8, hold_time: Option<Duration>) -> Self {
        Self {
            parameters: vec![name.into()],
            payload: Payload::Keyboard(KeyStrokes {
                values: vec![code],
                mode: StrokeMode::Tap,
                double_byte: false,
                hold_time,
            }),
        }
    }

    /// Literal text typed one character at a time.
    pub fn character_sequence(text: impl Into<String>, values: Vec<u8>) -> Self {
        Self {
            parameters: vec![text.into()],
            payload: Payload::Keyboard(KeyStrokes {
                values,
                mode: StrokeMode::Tap,
                double_byte: false,
                hold_time: None,
            }),
        }
    }

    pub fn release_keys(values: Vec<u8>) -> Self {
        Self {
            parameters: vec![RELEASE_KEYS_NAME.to_string()],
            payload: Payload::Keyboard(KeyStrokes {
                values,
                mode: StrokeMode::Release,
                double_byte: false,
                hold_time: None,
            }),
        }
    }

    pub fn local(parameters: Vec<String>) -> Self {
        Self {
            parameters,
            payload: Payload::Local,
        }
    }

    pub fn reboot() -> Self {
        Self::local(vec![REBOOT_ACTION_NAME.to_string()])
    }

    pub fn kind(&self) -> ActionKind {
        match self.payload {
            Payload::Empty => ActionKind::Empty,
            Payload::Keyboard(_) => ActionKind::Keyboard,
            Payload::Local => ActionKind::Local,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Parameter at `index`, or an empty string when absent.
    pub fn parameter(&self, index: usize) -> &str {
        self.parameters.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.parameter(0)
    }

    pub fn values(&self) -> &[u8] {
        match &self.payload {
            Payload::Keyboard(strokes) => &strokes.values,
            _ => &[],
        }
    }

    pub fn needs_release(&self) -> bool {
        matches!(
            &self.payload,
            Payload::Keyboard(KeyStrokes {
                mode: StrokeMode::Hold | StrokeMode::Release,
                ..
            })
        )
    }

    pub fn needs_double_byte(&self) -> bool {
        matches!(
            &self.payload,
            Payload::Keyboard(KeyStrokes {
                double_byte: true,
                ..
            })
        )
    }

    pub fn hold_time(&self) -> Option<Duration> {
        match &self.payload {
            Payload::Keyboard(strokes) => strokes.hold_time,
            _ => None,
        }
    }

    /// Local actions drive the on-device UI and go to the screen queue.
    pub fn is_screen(&self) -> bool {
        self.kind() == ActionKind::Local
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind() == ActionKind::Empty {
            return f.write_str("NONE");
        }
        let target = if self.is_screen() { "SCREEN" } else { "LOCAL" };
        write!(f, "{target}:{}:", self.kind())?;
        for parameter in &self.parameters {
            write!(f, " {parameter}")?;
        }
        write!(f, ", Values count: {}", self.values().len())?;
        if self.needs_release() {
            f.write_str(", NEEDS RELEASE")?;
        }
        Ok(())
    }
}
