use std::collections::HashSet;

use crate::schema::Config;

/// Key delays above this are accepted but almost always a typo.
const KEY_DELAY_WARN_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub location: Option<Location>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl ValidationIssue {
    pub fn new(path: String, message: String, severity: Severity) -> Self {
        Self {
            path,
            message,
            location: None,
            severity,
        }
    }
}

pub fn validate_config(config: &Config, source: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if config.version != 1 {
        issues.push(ValidationIssue::new(
            "version".into(),
            format!("Unsupported schema version {} (expected 1)", config.version),
            Severity::Error,
        ));
    }

    if config.enqueue_timeout_ms() == 0 {
        issues.push(ValidationIssue::new(
            "general.enqueue_timeout_ms".into(),
            "enqueue_timeout_ms must be greater than zero".into(),
            Severity::Error,
        ));
    }

    if config.key_delay_ms() > KEY_DELAY_WARN_MS {
        issues.push(ValidationIssue::new(
            "general.key_delay_ms".into(),
            format!(
                "key_delay_ms of {} is unusually long (more than {} ms between keys)",
                config.key_delay_ms(),
                KEY_DELAY_WARN_MS
            ),
            Severity::Warning,
        ));
    }

    for (idx, name) in config.callbacks.iter().enumerate() {
        if name.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("callbacks[{idx}]"),
                "callback name must not be empty".into(),
                Severity::Error,
            ));
        }
    }

    for (menu_name, menu) in &config.menus {
        let path = format!("menus.{menu_name}");

        if menu.buttons.is_empty() {
            issues.push(ValidationIssue::new(
                path.clone(),
                "Menu has no buttons".into(),
                Severity::Warning,
            ));
        }

        let mut labels = HashSet::new();
        for (idx, button) in menu.buttons.iter().enumerate() {
            if !labels.insert(button.label.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("{path}.buttons[{idx}]"),
                    format!("Duplicate button label `{}` within menu", button.label),
                    Severity::Warning,
                ));
            }
        }
    }

    attach_locations(source, issues)
}

fn attach_locations(source: &str, mut issues: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
    for issue in &mut issues {
        issue.location = find_location(source, &issue.path);
    }
    issues
}

/// Walks the dotted path through the YAML text one key at a time, so
/// `menus.media.buttons[1].actions` lands on the second button of `media`
/// rather than on the first `actions` key in the file.
fn find_location(source: &str, path: &str) -> Option<Location> {
    let lines: Vec<&str> = source.lines().collect();
    let mut from = 0;
    let mut found = None;

    for segment in path.split('.') {
        let (key, index) = split_index(segment);
        let needle = format!("{key}:");
        let line = (from..lines.len()).find(|&i| {
            lines[i]
                .trim_start()
                .trim_start_matches("- ")
                .starts_with(&needle)
        })?;
        let column = lines[line].find(&needle).map(|c| c + 1).unwrap_or(1);
        found = Some(Location {
            line: line + 1,
            column,
        });
        from = line + 1;

        // Flow sequences (`[a, b]`) have no item lines; keep the key.
        if let Some(item) = index.and_then(|n| nth_item(&lines, line + 1, n)) {
            let column = lines[item].find('-').map(|c| c + 1).unwrap_or(1);
            found = Some(Location {
                line: item + 1,
                column,
            });
            from = item;
        }
    }
    found
}

fn split_index(segment: &str) -> (&str, Option<usize>) {
    match segment.split_once('[') {
        Some((key, rest)) => (key, rest.trim_end_matches(']').parse().ok()),
        None => (segment, None),
    }
}

/// Line of the `n`-th block sequence item that follows the key at `start - 1`.
fn nth_item(lines: &[&str], start: usize, n: usize) -> Option<usize> {
    let key_indent = start
        .checked_sub(1)
        .map(|key| indent(lines[key]))
        .unwrap_or(0);
    let mut item_indent = None;
    let mut seen = 0;
    for (i, line) in lines.iter().enumerate().skip(start) {
        if line.trim().is_empty() {
            continue;
        }
        let trimmed = line.trim_start();
        let is_item = trimmed.starts_with("- ") || trimmed == "-";
        if indent(line) < key_indent || (indent(line) == key_indent && !is_item) {
            return None;
        }
        // Only items of the first level count; nested lists are skipped.
        if is_item && *item_indent.get_or_insert(indent(line)) == indent(line) {
            if seen == n {
                return Some(i);
            }
            seen += 1;
        }
    }
    None
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
