// Shared test helpers: fixtures and a scripted telemetry source
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cloud_insights::cloud_repo::{CloudProvider, MetricQuery, MetricsSource};
use cloud_insights::error::SourceError;
use cloud_insights::models::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

pub fn instance(id: &str, region: &str) -> Instance {
    Instance {
        id: id.into(),
        name: format!("{id}-name"),
        instance_type: "t3.medium".into(),
        state: "running".into(),
        region: region.into(),
        platform: Some("Linux/UNIX".into()),
        selected: true,
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        access_key_id: "AKIATEST".into(),
        secret_access_key: "super-secret-value".into(),
        region: Some("me-central-1".into()),
        account_id: Some("123456789012".into()),
        account_name: Some("Acme Prod".into()),
    }
}

pub fn context() -> ReportContext {
    ReportContext {
        title: "Cloud Infrastructure Report".into(),
        provider: "aws".into(),
        account_name: Some("Acme Prod".into()),
        account_id: Some("123456789012".into()),
    }
}

pub fn catalog(names: &[&str]) -> MetricCatalog {
    MetricCatalog::new(
        1,
        names
            .iter()
            .map(|n| MetricDescriptor::new(n, "AWS/EC2", "%"))
            .collect(),
    )
}

/// Samples one hour apart starting `hours_before` hours before `end`.
pub fn samples(end: DateTime<Utc>, hours_before: i64, values: &[f64]) -> Vec<MetricSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| MetricSample {
            timestamp: end - Duration::hours(hours_before) + Duration::hours(i as i64),
            value: *v,
        })
        .collect()
}

#[derive(Clone)]
pub enum Outcome {
    Samples(Vec<MetricSample>),
    Fail(SourceError),
}

/// Telemetry source answering from a script keyed by (instance id, metric name).
/// Unscripted pairs get `default_values`; per-instance delays reorder completion.
pub struct ScriptedSource {
    script: HashMap<(String, String), Outcome>,
    delays_ms: HashMap<String, u64>,
    default_values: Vec<f64>,
    now: DateTime<Utc>,
    pub calls: AtomicUsize,
    pub regions: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            script: HashMap::new(),
            delays_ms: HashMap::new(),
            default_values: vec![10.0, 20.0, 30.0],
            now,
            calls: AtomicUsize::new(0),
            regions: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, instance_id: &str, metric: &str, outcome: Outcome) -> Self {
        self.script
            .insert((instance_id.into(), metric.into()), outcome);
        self
    }

    pub fn with_delay(mut self, instance_id: &str, ms: u64) -> Self {
        self.delays_ms.insert(instance_id.into(), ms);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSource for ScriptedSource {
    async fn get_metric_samples(
        &self,
        query: &MetricQuery<'_>,
    ) -> Result<Vec<MetricSample>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.regions.lock().unwrap().push(query.region.to_string());
        if let Some(ms) = self.delays_ms.get(query.instance_id) {
            tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
        }
        self.completed
            .lock()
            .unwrap()
            .push(query.instance_id.to_string());
        let key = (query.instance_id.to_string(), query.metric_name.to_string());
        match self.script.get(&key) {
            Some(Outcome::Samples(s)) => Ok(s.clone()),
            Some(Outcome::Fail(e)) => Err(e.clone()),
            None => Ok(samples(self.now, 3, &self.default_values)),
        }
    }
}

/// Inventory provider with a fixed region list; listed regions in `failing` error out.
pub struct ScriptedProvider {
    pub regions: Vec<String>,
    pub failing: HashSet<String>,
    pub inventory: HashMap<String, RegionInventory>,
    pub source: Arc<ScriptedSource>,
}

impl ScriptedProvider {
    pub fn new(regions: &[&str]) -> Self {
        Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
            failing: HashSet::new(),
            inventory: HashMap::new(),
            source: Arc::new(ScriptedSource::new(fixed_now())),
        }
    }
}

#[async_trait]
impl CloudProvider for ScriptedProvider {
    async fn validate_credentials(&self, credentials: &Credentials) -> Result<(), SourceError> {
        if credentials.secret_access_key.is_empty() {
            return Err(SourceError::Unauthorized("empty secret".into()));
        }
        Ok(())
    }

    async fn list_regions(&self, credentials: &Credentials) -> Result<Vec<String>, SourceError> {
        self.validate_credentials(credentials).await?;
        Ok(self.regions.clone())
    }

    async fn list_region_instances(
        &self,
        _credentials: &Credentials,
        region: &str,
    ) -> Result<RegionInventory, SourceError> {
        if self.failing.contains(region) {
            return Err(SourceError::Unavailable(format!("{region} is down")));
        }
        Ok(self.inventory.get(region).cloned().unwrap_or_default())
    }

    fn metrics_client(&self, _credentials: &Credentials) -> Arc<dyn MetricsSource> {
        self.source.clone()
    }
}

/// Section kinds as short tags, for order assertions. Page breaks are dropped.
pub fn outline(sections: &[ReportSection]) -> Vec<String> {
    sections
        .iter()
        .filter_map(|s| match s {
            ReportSection::CoverInfo(_) => Some("cover".to_string()),
            ReportSection::InstanceHeader(h) => Some(format!("header:{}", h.instance_id)),
            ReportSection::InstanceDetailTable(t) => Some(format!("detail:{}", t.instance_id)),
            ReportSection::ChartBlock(b) => {
                Some(format!("chart:{}:{}", b.instance_id, b.metric.name))
            }
            ReportSection::PageBreak => None,
        })
        .collect()
}
