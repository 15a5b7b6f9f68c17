//! Turns the body of one `{...}` token into an [`Action`].

use std::time::Duration;

use log::{debug, error};
use thiserror::Error;

use crate::action::Action;
use crate::keys::KeyTable;
use crate::registry::CallbackRegistry;

const SEPARATORS: [char; 4] = [' ', '.', ':', ','];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no parameters or action name found")]
    Empty,
    #[error("unknown key or local action `{name}` with {count} parameter(s)")]
    Unresolved { name: String, count: usize },
}

/// Splits a token body on spaces, periods, colons and commas. Runs of
/// separators produce no empty parameters.
pub fn split_parameters(token: &str) -> Vec<String> {
    token
        .split(|c| SEPARATORS.contains(&c))
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolution order: key table, single character with a delay, local
/// callback. The first match wins.
pub fn resolve_token(
    parameters: &[String],
    keys: &KeyTable,
    callbacks: &CallbackRegistry,
) -> Result<Action, TokenError> {
    let Some(name) = parameters.first() else {
        error!("No parameters or action name found.");
        return Err(TokenError::Empty);
    };
    let delay = parameters.get(1).and_then(|p| parse_delay(p));
    let hold_time = delay.map(|ms| Duration::from_millis(u64::from(ms)));

    if let Some(entry) = keys.lookup(name) {
        debug!("Found Keyboard symbol {name}, press delay {}", delay.unwrap_or(0));
        return Ok(Action::from_key(entry, hold_time));
    }

    if delay.is_some() {
        if let Some(code) = single_ascii(name) {
            debug!("Found Keyboard symbol {name} with delay {}", delay.unwrap_or(0));
            return Ok(Action::from_char(name.clone(), code, hold_time));
        }
    }

    if callbacks.contains(name) {
        debug!(
            "Found user Action {name} with {} parameter(s)",
            parameters.len() - 1
        );
        return Ok(Action::local(parameters.to_vec()));
    }

    error!(
        "Invalid local action type {} with {} parameter(s)",
        parameters.join(","),
        parameters.len()
    );
    Err(TokenError::Unresolved {
        name: name.clone(),
        count: parameters.len(),
    })
}

/// Strictly positive decimal delay in milliseconds.
fn parse_delay(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|ms| *ms > 0)
}

fn single_ascii(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Some(c as u8),
        _ => None,
    }
}
