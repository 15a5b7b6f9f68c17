use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use deck_config::schema::Config;
use log::{info, warn};
use thiserror::Error;
use touchdeck_core::action::REBOOT_ACTION_NAME;
use touchdeck_core::{
    compile_deck, load_from_str, run_until_idle, ActionExecutor, CallbackRegistry, CompiledDeck,
    Diagnostic, DiagnosticSeverity, ExecutionQueue, KeyTable, LoadError, LoggingTransport,
    NeverCancel, TransportEvent,
};

#[derive(Debug)]
pub struct LintReport {
    pub deck: CompiledDeck,
    pub callbacks: CallbackRegistry,
}

impl LintReport {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.deck.diagnostics
    }

    pub fn button_count(&self) -> usize {
        self.deck.menus.iter().map(|menu| menu.buttons.len()).sum()
    }
}

#[derive(Debug, Error)]
pub enum LintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Load(#[from] LoadError),
    #[error("expected MENU:INDEX, got `{0}`")]
    InvalidTarget(String),
    #[error("no button {index} in menu `{menu}`")]
    UnknownButton { menu: String, index: usize },
}

/// Registry with a logging no-op for every declared callback plus the
/// built-in reboot action.
pub fn declared_callbacks(config: &Config) -> CallbackRegistry {
    let mut registry = CallbackRegistry::new();
    for name in config
        .callbacks
        .iter()
        .map(String::as_str)
        .chain([REBOOT_ACTION_NAME])
    {
        registry.register(name, |action| {
            info!("would run local action {action}");
            true
        });
    }
    registry
}

pub fn lint_path(path: impl AsRef<Path>) -> Result<LintReport, LintError> {
    let content = fs::read_to_string(path.as_ref())?;
    lint_str(&content)
}

pub fn lint_str(content: &str) -> Result<LintReport, LintError> {
    let loaded = load_from_str(content)?;
    let callbacks = declared_callbacks(&loaded.config);
    let deck = compile_deck(&loaded, &KeyTable::standard(), &callbacks);
    Ok(LintReport { deck, callbacks })
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diag| diag.severity == DiagnosticSeverity::Error)
}

/// Splits `MENU:INDEX`. The index is the last colon-separated part so menu
/// names may contain colons.
pub fn parse_target(target: &str) -> Result<(String, usize), LintError> {
    let invalid = || LintError::InvalidTarget(target.to_string());
    let (menu, index) = target.rsplit_once(':').ok_or_else(invalid)?;
    if menu.is_empty() {
        return Err(invalid());
    }
    let index = index.parse().map_err(|_| invalid())?;
    Ok((menu.to_string(), index))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRun {
    pub events: Vec<TransportEvent>,
    /// False when some action could not be queued and was dropped.
    pub queued_all: bool,
}

/// Runs one button against a recording transport, without inter-key delay,
/// and returns what would have been sent.
pub async fn dry_run(report: &LintReport, menu: &str, index: usize) -> Result<DryRun, LintError> {
    let button = report
        .deck
        .button(menu, index)
        .ok_or_else(|| LintError::UnknownButton {
            menu: menu.to_string(),
            index,
        })?;

    let transport = Arc::new(LoggingTransport::new());
    let queue = Arc::new(ExecutionQueue::new(report.deck.settings.enqueue_timeout));
    let executor = ActionExecutor::new(
        transport.clone(),
        Arc::new(report.callbacks.clone()),
        Arc::new(NeverCancel),
        queue.clone(),
        Duration::ZERO,
    );

    let queued_all = button.sequence.execute(&queue).await;
    if !queued_all {
        warn!("Dry run of {menu}[{index}] dropped actions that could not be queued");
    }
    let handled = run_until_idle(&executor).await;
    info!("Dry run of {menu}[{index}] handled {handled} action(s)");
    Ok(DryRun {
        events: transport.take_events(),
        queued_all,
    })
}
