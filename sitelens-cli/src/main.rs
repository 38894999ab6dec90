//! CLI entrypoint for sitelens
//!
//! Wires the HTTP providers into a `Lens`, runs one analysis and prints the
//! report.

mod cli;
mod config;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sitelens::{Lens, SiteReport, StageEvent, Target};
use sitelens_http::{default_client, providers_with_keys};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Reject bad input before any request goes out.
    let target = Target::parse(&cli.url)?;
    let file = config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, file);

    let client = default_client()?;
    let mut builder = Lens::builder();
    for provider in providers_with_keys(&client, &settings.keys) {
        builder = builder.with_provider(provider);
    }
    let lens = settings.apply(builder).build()?;

    info!(url = %target, kinds = lens.config().kinds.len(), "starting analysis");

    let analysis = if cli.quiet {
        lens.analyze(target.url().as_str()).await?
    } else {
        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(print_progress(rx));
        let analysis = lens.analyze_with_progress(target.url().as_str(), tx).await?;
        printer.await?;
        analysis
    };
    let report = SiteReport::from_analysis(&analysis);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    let export_path = match (&cli.export, &cli.export_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join(report.export_file_name())),
        (None, None) => None,
    };
    if let Some(path) = export_path {
        export(&report, &path)?;
        if !cli.quiet {
            eprintln!("Report saved to {}", path.display());
        }
    }

    Ok(())
}

/// Log level from `-v` counts; `RUST_LOG` takes precedence when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<StageEvent>) {
    while let Some(ev) = rx.recv().await {
        let outcome = match ev.source {
            Some(source) => format!("done ({source})"),
            None => "unavailable".to_string(),
        };
        eprintln!(
            "[{}/{}] {} {} ... {outcome}",
            ev.index,
            ev.total,
            ev.kind,
            ev.kind.stage_label()
        );
    }
}

fn export(report: &SiteReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, report.render_text())
        .with_context(|| format!("failed to write report to {}", path.display()))
}
