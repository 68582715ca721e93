use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::assembler::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::fetcher::DEFAULT_PERIOD_SECS;
use crate::models::MetricCatalog;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Metric table evaluated per instance; the built-in catalog when omitted.
    #[serde(default)]
    pub catalog: MetricCatalog,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Telemetry sampling period in seconds. Must be a multiple of 60.
    #[serde(default = "default_period_secs")]
    pub period_secs: u32,
    /// Upper bound on telemetry reads in flight for one report.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            period_secs: default_period_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

fn default_title() -> String {
    "Cloud Infrastructure Report".into()
}

fn default_period_secs() -> u32 {
    DEFAULT_PERIOD_SECS
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Regions scanned by POST /instances.
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
        }
    }
}

fn default_regions() -> Vec<String> {
    [
        "us-east-1",
        "us-west-2",
        "eu-west-1",
        "me-central-1",
        "ap-southeast-1",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.report.title.trim().is_empty(),
            "report.title must be non-empty"
        );
        anyhow::ensure!(
            self.report.period_secs > 0 && self.report.period_secs % 60 == 0,
            "report.period_secs must be a positive multiple of 60, got {}",
            self.report.period_secs
        );
        anyhow::ensure!(
            self.report.max_concurrent_fetches > 0,
            "report.max_concurrent_fetches must be > 0, got {}",
            self.report.max_concurrent_fetches
        );
        anyhow::ensure!(
            !self.provider.regions.is_empty(),
            "provider.regions must list at least one region"
        );
        anyhow::ensure!(
            !self.catalog.is_empty(),
            "catalog.metrics must list at least one metric"
        );
        let mut seen = HashSet::new();
        for (i, metric) in self.catalog.iter().enumerate() {
            anyhow::ensure!(
                !metric.name.trim().is_empty() && !metric.namespace.trim().is_empty(),
                "catalog.metrics[{}] needs a name and a namespace",
                i
            );
            anyhow::ensure!(
                seen.insert((metric.namespace.as_str(), metric.name.as_str())),
                "catalog.metrics[{}] duplicates {}/{}",
                i,
                metric.namespace,
                metric.name
            );
        }
        Ok(())
    }
}
