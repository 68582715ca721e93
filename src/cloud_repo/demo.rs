// Deterministic in-process provider: fixture inventory and synthetic telemetry.
// Backs the binary when no cloud SDK adapter is wired, and the HTTP tests.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::instrument;

use super::{CloudProvider, MetricQuery, MetricsSource};
use crate::error::SourceError;
use crate::models::{Credentials, Instance, ManagedDbInstance, MetricSample, RegionInventory};

/// Upper bound on synthetic points per query (30 days of 5-minute buckets).
const MAX_POINTS: i64 = 30 * 24 * 12;

/// Namespace published by the in-guest agent; only agent-enabled fixtures report it.
const AGENT_NAMESPACE: &str = "CWAgent";

#[derive(Debug, Clone)]
struct FixtureInstance {
    instance: Instance,
    agent_installed: bool,
}

pub struct DemoProvider {
    regions: Vec<String>,
    compute: Vec<FixtureInstance>,
    managed_db: Vec<ManagedDbInstance>,
}

impl DemoProvider {
    pub fn new(regions: Vec<String>) -> Self {
        Self {
            regions,
            compute: fixture_compute(),
            managed_db: fixture_managed_db(),
        }
    }

    fn agent_instances(&self) -> Vec<String> {
        self.compute
            .iter()
            .filter(|f| f.agent_installed)
            .map(|f| f.instance.id.clone())
            .collect()
    }
}

#[async_trait]
impl CloudProvider for DemoProvider {
    async fn validate_credentials(&self, credentials: &Credentials) -> Result<(), SourceError> {
        if credentials.access_key_id.trim().is_empty() {
            return Err(SourceError::Unauthorized("access key id is empty".into()));
        }
        if credentials.secret_access_key.trim().is_empty() {
            return Err(SourceError::Unauthorized(format!(
                "no secret supplied for access key {}",
                credentials.access_key_id
            )));
        }
        Ok(())
    }

    async fn list_regions(&self, credentials: &Credentials) -> Result<Vec<String>, SourceError> {
        self.validate_credentials(credentials).await?;
        Ok(self.regions.clone())
    }

    #[instrument(skip(self, credentials), fields(repo = "demo", operation = "list_region_instances"))]
    async fn list_region_instances(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> Result<RegionInventory, SourceError> {
        self.validate_credentials(credentials).await?;
        Ok(RegionInventory {
            compute: self
                .compute
                .iter()
                .filter(|f| f.instance.region == region)
                .map(|f| f.instance.clone())
                .collect(),
            managed_db: self
                .managed_db
                .iter()
                .filter(|d| d.region == region)
                .cloned()
                .collect(),
        })
    }

    fn metrics_client(&self, _credentials: &Credentials) -> Arc<dyn MetricsSource> {
        Arc::new(DemoMetrics {
            agent_instances: self.agent_instances(),
        })
    }
}

/// Per-request telemetry client of the demo provider.
pub struct DemoMetrics {
    agent_instances: Vec<String>,
}

#[async_trait]
impl MetricsSource for DemoMetrics {
    async fn get_metric_samples(
        &self,
        query: &MetricQuery<'_>,
    ) -> Result<Vec<MetricSample>, SourceError> {
        if query.namespace == AGENT_NAMESPACE
            && !self.agent_instances.iter().any(|id| id == query.instance_id)
        {
            return Ok(Vec::new());
        }
        Ok(synthetic_series(query))
    }
}

/// Smooth daily cycle plus per-series offset. Emitted newest-first, like an unordered source.
fn synthetic_series(query: &MetricQuery<'_>) -> Vec<MetricSample> {
    let period = i64::from(query.period_secs.max(1));
    let total = query.window.duration().num_seconds();
    let points = (total / period).clamp(0, MAX_POINTS);

    let mut hasher = DefaultHasher::new();
    query.instance_id.hash(&mut hasher);
    query.metric_name.hash(&mut hasher);
    let seed = hasher.finish();
    let phase = (seed % 1000) as f64 / 1000.0 * std::f64::consts::TAU;
    let base = 20.0 + (seed % 40) as f64;

    let (scale, ceiling) = match query.metric_name {
        "NetworkIn" | "NetworkOut" => (250_000.0, f64::MAX),
        "CPUCreditBalance" => (3.0, f64::MAX),
        "CPUCreditUsage" => (0.05, f64::MAX),
        _ => (1.0, 100.0),
    };

    (0..points)
        .rev()
        .map(|i| {
            let timestamp = query.window.start + Duration::seconds(i * period);
            let hours = (i * period) as f64 / 3600.0;
            let wave = (hours / 24.0 * std::f64::consts::TAU + phase).sin();
            let value = ((base + 15.0 * wave) * scale).clamp(0.0, ceiling);
            MetricSample { timestamp, value }
        })
        .collect()
}

fn fixture_compute() -> Vec<FixtureInstance> {
    let entry = |id: &str, name: &str, ty: &str, region: &str, state: &str, agent: bool| {
        FixtureInstance {
            instance: Instance {
                id: id.into(),
                name: name.into(),
                instance_type: ty.into(),
                state: state.into(),
                region: region.into(),
                platform: Some("Linux/UNIX".into()),
                selected: false,
            },
            agent_installed: agent,
        }
    };
    vec![
        entry(
            "i-0123456789abcdef0",
            "Production Web Server",
            "t3.medium",
            "us-west-2",
            "running",
            true,
        ),
        entry(
            "i-0123456789abcdef1",
            "Development Server",
            "t2.micro",
            "us-east-1",
            "running",
            false,
        ),
        entry(
            "i-0123456789abcdef2",
            "Staging Environment",
            "t3.large",
            "eu-west-1",
            "stopped",
            false,
        ),
        entry(
            "i-0123456789abcdef3",
            "Database Backup Server",
            "m5.large",
            "ap-southeast-1",
            "running",
            true,
        ),
        entry(
            "i-0123456789abcdef4",
            "Retired Batch Worker",
            "c5.xlarge",
            "us-east-1",
            "terminated",
            false,
        ),
    ]
}

fn fixture_managed_db() -> Vec<ManagedDbInstance> {
    let entry = |id: &str, name: &str, class: &str, engine: &str, region: &str| ManagedDbInstance {
        id: id.into(),
        name: name.into(),
        instance_class: class.into(),
        engine: engine.into(),
        size: "20 GB".into(),
        state: "available".into(),
        region: region.into(),
        selected: false,
    };
    vec![
        entry(
            "db-0123456789abcdef0",
            "Production Database",
            "db.m5.large",
            "postgres",
            "us-west-2",
        ),
        entry(
            "db-0123456789abcdef1",
            "Development Database",
            "db.t3.micro",
            "mysql",
            "us-east-1",
        ),
        entry(
            "db-0123456789abcdef2",
            "Reporting Database",
            "db.r5.large",
            "aurora-postgresql",
            "eu-west-1",
        ),
    ]
}
