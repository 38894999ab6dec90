//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use sitelens::{FetchStrategy, QueryKind};

/// How providers of one kind are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One at a time in priority order, falling back on failure
    Priority,
    /// All at once; the fastest informative answer wins
    Latency,
}

impl From<Strategy> for FetchStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Priority => Self::PriorityWithFallback,
            Strategy::Latency => Self::Latency,
        }
    }
}

fn parse_kind(s: &str) -> Result<QueryKind, String> {
    s.parse::<QueryKind>().map_err(|e| e.to_string())
}

/// CLI arguments for sitelens
#[derive(Parser, Debug)]
#[command(name = "sitelens")]
#[command(author, version, about = "Website intelligence from several public data sources")]
#[command(long_about = r#"
sitelens looks a website up in several public data sources at once (DNS over
HTTPS, IP geolocation, header dumps, page metadata APIs and the site itself)
and prints one report in which every field is filled, falling back to an
"unknown" label when no source could answer.

Configuration is read from --config <path>, or ./sitelens.toml when present.
Command-line flags override the file.

Query kinds: reachability, dns, nameservers, dnssec, hosting, headers, seo

Example:
  sitelens https://example.com
  sitelens --kinds dns,hosting --strategy latency https://example.com
  sitelens --deep seo --export-dir reports/ https://example.com
"#)]
pub struct Cli {
    /// Website to analyze (http or https URL)
    pub url: String,

    /// Comma-separated query kinds to run (default: all)
    #[arg(long, value_name = "KINDS", value_delimiter = ',', value_parser = parse_kind)]
    pub kinds: Vec<QueryKind>,

    /// Per-provider timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub provider_timeout_ms: Option<u64>,

    /// Deadline for the whole analysis in milliseconds
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,

    /// Provider selection strategy
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Query every provider of KIND and merge their answers (repeatable)
    #[arg(long, value_name = "KIND", value_parser = parse_kind)]
    pub deep: Vec<QueryKind>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the text report to PATH
    #[arg(long, value_name = "PATH", conflicts_with = "export_dir")]
    pub export: Option<PathBuf>,

    /// Write the text report into DIR under a generated file name
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress lines
    #[arg(short, long)]
    pub quiet: bool,
}
