//! TOML configuration file and its merge with command-line flags.
//!
//! ```toml
//! kinds = ["dns", "hosting", "seo"]
//! strategy = "priority"
//! deep = ["seo"]
//! provider_timeout_ms = 5000
//! deadline_ms = 20000
//!
//! [priority]
//! dns = ["doh-google", "doh-cloudflare"]
//!
//! [keys]
//! linkpreview = "..."
//! opengraph = "..."
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use sitelens::{LensBuilder, MergeStrategy, QueryKind};
use sitelens_http::ApiKeys;

use crate::cli::{Cli, Strategy};

/// Project-level file picked up when `--config` is not given.
pub const PROJECT_FILE: &str = "sitelens.toml";

/// Raw file contents.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub kinds: Option<Vec<QueryKind>>,
    pub strategy: Option<Strategy>,
    pub deep: Vec<QueryKind>,
    pub provider_timeout_ms: Option<u64>,
    pub deadline_ms: Option<u64>,
    pub priority: HashMap<QueryKind, Vec<String>>,
    pub keys: FileKeys,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileKeys {
    pub linkpreview: Option<String>,
    pub opengraph: Option<String>,
}

/// Load `path`, or the project file when present, or defaults.
pub fn load(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(p) => p,
        None if Path::new(PROJECT_FILE).exists() => Path::new(PROJECT_FILE),
        None => return Ok(FileConfig::default()),
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse(text: &str) -> Result<FileConfig> {
    Ok(toml::from_str(text)?)
}

/// Effective settings after applying flags over the file.
#[derive(Debug)]
pub struct Settings {
    pub kinds: Option<Vec<QueryKind>>,
    pub strategy: Option<Strategy>,
    pub deep: Vec<QueryKind>,
    pub provider_timeout: Option<Duration>,
    pub deadline: Option<Duration>,
    pub priority: HashMap<QueryKind, Vec<String>>,
    pub keys: ApiKeys,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let defaults = ApiKeys::default();
        let kinds = if cli.kinds.is_empty() {
            file.kinds
        } else {
            Some(cli.kinds.clone())
        };
        let mut deep = file.deep;
        for k in &cli.deep {
            if !deep.contains(k) {
                deep.push(*k);
            }
        }
        Self {
            kinds,
            strategy: cli.strategy.or(file.strategy),
            deep,
            provider_timeout: cli
                .provider_timeout_ms
                .or(file.provider_timeout_ms)
                .map(Duration::from_millis),
            deadline: cli
                .deadline_ms
                .or(file.deadline_ms)
                .map(Duration::from_millis),
            priority: file.priority,
            keys: ApiKeys {
                linkpreview: file.keys.linkpreview.unwrap_or(defaults.linkpreview),
                opengraph: file.keys.opengraph.unwrap_or(defaults.opengraph),
            },
        }
    }

    /// Apply everything except the providers themselves to `builder`.
    pub fn apply(&self, mut builder: LensBuilder) -> LensBuilder {
        if let Some(kinds) = &self.kinds {
            builder = builder.kinds(kinds);
        }
        if let Some(strategy) = self.strategy {
            builder = builder.fetch_strategy(strategy.into());
        }
        for kind in &self.deep {
            builder = builder.merge_strategy_for(*kind, MergeStrategy::Deep);
        }
        if let Some(t) = self.provider_timeout {
            builder = builder.provider_timeout(t);
        }
        if let Some(d) = self.deadline {
            builder = builder.request_timeout(d);
        }
        for (kind, names) in &self.priority {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            builder = builder.prefer_names_for_kind(*kind, &names);
        }
        builder
    }
}
