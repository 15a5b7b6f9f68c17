//! Button definitions: `literal text{TOKEN}more text{TOKEN,param}...`.
//!
//! Text outside braces is typed as-is, each `{...}` token is resolved through
//! [`resolve_token`]. Modifier keys pressed anywhere in the definition are
//! released together by one action appended at the end.

use log::{debug, error, warn};
use serde_json::Value;
use thiserror::Error;

use crate::action::{Action, ActionKind};
use crate::keys::KeyTable;
use crate::queue::ExecutionQueue;
use crate::registry::CallbackRegistry;
use crate::token::{resolve_token, split_parameters, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("null or empty action sequence")]
    Empty,
    #[error("action json value is not a string")]
    NotAString,
    #[error("invalid token `{token}`: {source}")]
    Token { token: String, source: TokenError },
    #[error("unterminated token `{0}`")]
    Unterminated(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSequence {
    source_text: String,
    actions: Vec<Action>,
}

impl ActionSequence {
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// True if an action of `kind` exists, optionally with the given name.
    pub fn has_action(&self, kind: ActionKind, name: Option<&str>) -> bool {
        self.actions
            .iter()
            .any(|action| action.kind() == kind && name.is_none_or(|n| action.name() == n))
    }

    pub fn has_keyboard_action(&self) -> bool {
        self.has_action(ActionKind::Keyboard, None)
    }

    pub fn has_named_local_action(&self, name: &str) -> bool {
        self.has_action(ActionKind::Local, Some(name))
    }

    /// Queues a copy of every action. Returns false if any could not be
    /// queued; the remaining actions are still attempted.
    pub async fn execute(&self, queue: &ExecutionQueue) -> bool {
        let mut queued_all = true;
        for action in &self.actions {
            debug!("Queuing action {action}");
            if let Err(err) = queue.enqueue(action.clone()).await {
                warn!("Button action {action} could not be queued for execution: {err}");
                queued_all = false;
            }
        }
        queued_all
    }
}

/// Result of parsing one definition. The sequence holds every action that
/// did resolve even when `errors` is not empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub sequence: ActionSequence,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SequenceParser<'a> {
    keys: &'a KeyTable,
    callbacks: &'a CallbackRegistry,
}

impl<'a> SequenceParser<'a> {
    pub fn new(keys: &'a KeyTable, callbacks: &'a CallbackRegistry) -> Self {
        Self { keys, callbacks }
    }

    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut sequence = ActionSequence {
            source_text: text.to_string(),
            actions: Vec::new(),
        };
        if text.is_empty() {
            debug!("Null or empty action sequence received");
            return ParseOutcome {
                sequence,
                errors: vec![ParseError::Empty],
            };
        }

        debug!("Parsing free form text {text}");
        let mut errors = Vec::new();
        let mut literal = String::new();
        let mut release_codes: Vec<u8> = Vec::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                // `{{` types a single `{`.
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    flush_literal(&mut literal, &mut sequence.actions);
                    let mut token = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        token.push(c);
                    }
                    if !closed {
                        error!("Unterminated token {token} found");
                        errors.push(ParseError::Unterminated(token));
                        break;
                    }

                    debug!("Found token {token}");
                    let parameters = split_parameters(&token);
                    match resolve_token(&parameters, self.keys, self.callbacks) {
                        Ok(action) => {
                            if action.needs_release() {
                                release_codes.extend_from_slice(action.values());
                            }
                            sequence.actions.push(action);
                        }
                        Err(source) => {
                            error!("Invalid token {token} found");
                            errors.push(ParseError::Token { token, source });
                        }
                    }
                }
                _ => literal.push(c),
            }
        }
        flush_literal(&mut literal, &mut sequence.actions);

        if !release_codes.is_empty() {
            sequence.actions.push(Action::release_keys(release_codes));
        }

        ParseOutcome { sequence, errors }
    }

    /// Accepts only a non-empty JSON string, which is parsed as text.
    pub fn parse_json(&self, value: &Value) -> ParseOutcome {
        let failed = |err| ParseOutcome {
            sequence: ActionSequence::default(),
            errors: vec![err],
        };
        match value {
            Value::Null => {
                error!("empty action json object");
                failed(ParseError::Empty)
            }
            Value::String(text) if text.is_empty() => {
                error!("empty action json object string passed");
                failed(ParseError::Empty)
            }
            Value::String(text) => self.parse(text),
            _ => {
                error!("action json object is not a string");
                failed(ParseError::NotAString)
            }
        }
    }
}

fn flush_literal(literal: &mut String, actions: &mut Vec<Action>) {
    if literal.is_empty() {
        return;
    }
    let text = std::mem::take(literal);
    let mut values = Vec::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            values.push(c as u8);
        } else {
            warn!("Skipping non-ASCII character {c:?} in {text}");
        }
    }
    if values.is_empty() {
        return;
    }
    debug!("Character Sequence found with len {}: {text}", values.len());
    actions.push(Action::character_sequence(text, values));
}
