use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use deck_lint::{LintError, dry_run, has_errors, lint_path, parse_target};
use touchdeck_core::{Diagnostic, DiagnosticSeverity, KeyTable, LoadError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check deck configs and preview button output", long_about = None)]
struct Cli {
    /// Path to YAML deck configuration
    config: PathBuf,
    /// Print the key names usable inside `{...}` tokens and exit
    #[arg(long)]
    list_keys: bool,
    /// Execute one button against a recording transport
    #[arg(long, value_name = "MENU:INDEX")]
    dry_run: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_keys {
        let names = KeyTable::standard().names_json();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    let report = match lint_path(&cli.config) {
        Ok(report) => report,
        Err(LintError::Load(LoadError::Validation(diags))) => {
            print_diagnostics(&diags);
            eprintln!("Deck check failed due to validation errors.");
            std::process::exit(2);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("checking {}", cli.config.display()));
        }
    };

    print_diagnostics(report.diagnostics());
    if has_errors(report.diagnostics()) {
        std::process::exit(2);
    }
    println!(
        "Deck OK: {} menus, {} buttons, callbacks {}",
        report.deck.menus.len(),
        report.button_count(),
        report.callbacks.names_json()
    );

    if let Some(target) = cli.dry_run {
        let (menu, index) = parse_target(&target)?;
        let run = dry_run(&report, &menu, index).await?;
        println!("Dry run of {menu}[{index}]:");
        for event in run.events {
            println!("  {event:?}");
        }
        if !run.queued_all {
            eprintln!("Some actions could not be queued and were dropped.");
        }
    }
    Ok(())
}

fn print_diagnostics(diags: &[Diagnostic]) {
    if diags.is_empty() {
        return;
    }
    eprintln!("Diagnostics:");
    for diag in diags {
        let level = match diag.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        };
        if let Some(loc) = diag.location {
            eprintln!(
                "- [{}] {}: {} (line {}, column {})",
                level, diag.path, diag.message, loc.line, loc.column
            );
        } else {
            eprintln!("- [{}] {}: {}", level, diag.path, diag.message);
        }
    }
}
