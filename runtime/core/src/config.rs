use std::path::Path;
use std::time::Duration;
use std::{fs, path::PathBuf};

use deck_config::schema::Config;
use deck_config::{parse_config_str, validate_config, ConfigError, Location, Severity, ValidationIssue};
use log::warn;
use thiserror::Error;

use crate::keys::KeyTable;
use crate::queue::DEFAULT_ENQUEUE_TIMEOUT;
use crate::registry::CallbackRegistry;
use crate::sequence::{ActionSequence, ParseError, SequenceParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl From<Severity> for DiagnosticSeverity {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Error => DiagnosticSeverity::Error,
            Severity::Warning => DiagnosticSeverity::Warning,
            Severity::Info => DiagnosticSeverity::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
    pub location: Option<Location>,
    pub severity: DiagnosticSeverity,
}

/// Timing knobs taken from the `general` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSettings {
    pub key_delay: Duration,
    pub enqueue_timeout: Duration,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            key_delay: Duration::ZERO,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
        }
    }
}

impl DeckSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            key_delay: Duration::from_millis(config.key_delay_ms()),
            enqueue_timeout: Duration::from_millis(config.enqueue_timeout_ms()),
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub path: Option<PathBuf>,
    pub config: Config,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedConfig {
    pub fn settings(&self) -> DeckSettings {
        DeckSettings::from_config(&self.config)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error while reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ConfigError),
    #[error("Validation errors prevented loading")]
    Validation(Vec<Diagnostic>),
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<LoadedConfig, LoadError> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)?;
    let mut loaded = load_from_str(&content)?;
    loaded.path = Some(path_ref.to_path_buf());
    Ok(loaded)
}

pub fn load_from_str(content: &str) -> Result<LoadedConfig, LoadError> {
    let config = parse_config_str(content)?;
    let diagnostics = convert_issues(validate_config(&config, content));

    if diagnostics
        .iter()
        .any(|diag| diag.severity == DiagnosticSeverity::Error)
    {
        return Err(LoadError::Validation(diagnostics));
    }

    Ok(LoadedConfig {
        path: None,
        config,
        diagnostics,
    })
}

#[derive(Debug, Clone)]
pub struct CompiledButton {
    pub label: String,
    pub sequence: ActionSequence,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone)]
pub struct CompiledMenu {
    pub name: String,
    pub buttons: Vec<CompiledButton>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledDeck {
    pub settings: DeckSettings,
    /// Sorted by menu name.
    pub menus: Vec<CompiledMenu>,
    /// Validation diagnostics plus one warning per unresolved token.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledDeck {
    pub fn menu(&self, name: &str) -> Option<&CompiledMenu> {
        self.menus.iter().find(|menu| menu.name == name)
    }

    pub fn button(&self, menu: &str, index: usize) -> Option<&CompiledButton> {
        self.menu(menu).and_then(|menu| menu.buttons.get(index))
    }
}

/// Parses every button definition. Buttons with unresolved tokens are kept
/// with the actions that did resolve and reported as warnings.
pub fn compile_deck(
    loaded: &LoadedConfig,
    keys: &KeyTable,
    callbacks: &CallbackRegistry,
) -> CompiledDeck {
    let parser = SequenceParser::new(keys, callbacks);
    let mut diagnostics = loaded.diagnostics.clone();

    let mut names: Vec<_> = loaded.config.menus.keys().collect();
    names.sort();

    let menus = names
        .into_iter()
        .map(|name| {
            let menu = &loaded.config.menus[name];
            let buttons = menu
                .buttons
                .iter()
                .enumerate()
                .map(|(idx, button)| {
                    let outcome = parser.parse_json(&button.actions);
                    for err in &outcome.errors {
                        let path = format!("menus.{name}.buttons[{idx}].actions");
                        warn!("{path}: {err}");
                        diagnostics.push(Diagnostic {
                            path,
                            message: err.to_string(),
                            location: None,
                            severity: DiagnosticSeverity::Warning,
                        });
                    }
                    CompiledButton {
                        label: button.label.clone(),
                        sequence: outcome.sequence,
                        errors: outcome.errors,
                    }
                })
                .collect();
            CompiledMenu {
                name: name.clone(),
                buttons,
            }
        })
        .collect();

    CompiledDeck {
        settings: loaded.settings(),
        menus,
        diagnostics,
    }
}

pub fn compile_deck_from_str(
    content: &str,
    keys: &KeyTable,
    callbacks: &CallbackRegistry,
) -> Result<CompiledDeck, LoadError> {
    let loaded = load_from_str(content)?;
    Ok(compile_deck(&loaded, keys, callbacks))
}

fn convert_issues(issues: Vec<ValidationIssue>) -> Vec<Diagnostic> {
    issues.into_iter().map(convert_issue).collect()
}

fn convert_issue(issue: ValidationIssue) -> Diagnostic {
    Diagnostic {
        path: issue.path,
        message: issue.message,
        location: issue.location,
        severity: DiagnosticSeverity::from(issue.severity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    const DECK: &str = r#"version: 1
general:
  key_delay_ms: 12
menus:
  home:
    buttons:
      - label: Copy
        actions: "{LEFT_CTRL}{c,20}"
      - label: Media
        actions: "{MENU,media}"
  media:
    buttons:
      - label: Mute
        actions: "{MUTE}"
      - label: Broken
        actions: "ok{nope}"
"#;

    fn callbacks() -> CallbackRegistry {
        CallbackRegistry::new().with("MENU", |_| true)
    }

    #[test]
    fn loads_settings() {
        let loaded = load_from_str(DECK).expect("should load");
        let settings = loaded.settings();
        assert_eq!(settings.key_delay, Duration::from_millis(12));
        assert_eq!(settings.enqueue_timeout, DEFAULT_ENQUEUE_TIMEOUT);
        assert!(loaded.diagnostics.is_empty());
    }

    #[test]
    fn compiles_menus_in_name_order() {
        let deck =
            compile_deck_from_str(DECK, &KeyTable::standard(), &callbacks()).expect("compile");
        let names: Vec<_> = deck.menus.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["home", "media"]);

        let copy = deck.button("home", 0).expect("button");
        assert_eq!(copy.label, "Copy");
        assert_eq!(copy.sequence.len(), 3);
        assert!(copy.errors.is_empty());

        let media = deck.button("home", 1).expect("button");
        assert!(media.sequence.has_named_local_action("MENU"));
        assert!(deck.button("home", 2).is_none());
        assert!(deck.button("nowhere", 0).is_none());
    }

    #[test]
    fn unresolved_tokens_become_warnings() {
        let deck =
            compile_deck_from_str(DECK, &KeyTable::standard(), &callbacks()).expect("compile");
        let broken = deck.button("media", 1).expect("button");
        assert_eq!(broken.errors.len(), 1);
        assert!(broken.sequence.has_action(ActionKind::Keyboard, Some("ok")));
        assert_eq!(deck.diagnostics.len(), 1);
        let diag = &deck.diagnostics[0];
        assert_eq!(diag.path, "menus.media.buttons[1].actions");
        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
    }

    #[test]
    fn without_the_callback_local_tokens_fail() {
        let deck = compile_deck_from_str(DECK, &KeyTable::standard(), &CallbackRegistry::new())
            .expect("compile");
        assert!(!deck.button("home", 1).expect("button").errors.is_empty());
    }

    #[test]
    fn invalid_config_errors() {
        let yaml = r#"version: 2
menus:
  home:
    buttons:
      - label: Fine
        actions: "a"
"#;
        let err = load_from_str(yaml).unwrap_err();
        match err {
            LoadError::Validation(diags) => {
                assert_eq!(diags.len(), 1);
                assert_eq!(diags[0].path, "version");
                assert_eq!(diags[0].severity, DiagnosticSeverity::Error);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_string_definition_only_affects_its_button() {
        let yaml = r#"version: 1
menus:
  home:
    buttons:
      - label: Good
        actions: "Hi{RETURN}"
      - label: Bad
        actions: 7
      - label: Blank
        actions: ""
"#;
        let deck = compile_deck_from_str(yaml, &KeyTable::standard(), &callbacks())
            .expect("deck still loads");

        let good = deck.button("home", 0).expect("button");
        assert!(good.errors.is_empty());
        assert_eq!(good.sequence.len(), 2);

        let bad = deck.button("home", 1).expect("button");
        assert!(bad.sequence.is_empty());
        assert_eq!(bad.errors, vec![ParseError::NotAString]);

        let blank = deck.button("home", 2).expect("button");
        assert_eq!(blank.errors, vec![ParseError::Empty]);

        let paths: Vec<_> = deck
            .diagnostics
            .iter()
            .map(|diag| (diag.path.as_str(), diag.severity))
            .collect();
        assert_eq!(
            paths,
            vec![
                ("menus.home.buttons[1].actions", DiagnosticSeverity::Warning),
                ("menus.home.buttons[2].actions", DiagnosticSeverity::Warning),
            ]
        );
    }

    #[test]
    fn load_from_path_records_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("deck.yaml");
        fs::write(&path, DECK).expect("write config");
        let loaded = load_from_path(&path).expect("load");
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }
}
