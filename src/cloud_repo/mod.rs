// Cloud provider collaborators: credential check, inventory, telemetry reads

pub mod demo;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SourceError;
use crate::models::{Credentials, MetricSample, RegionInventory};
use crate::window::TimeWindow;

/// Statistic requested from the telemetry source. Reports only chart averages.
pub const STATISTIC_AVERAGE: &str = "Average";

/// One telemetry read: a single metric of a single instance over the report window.
#[derive(Debug, Clone)]
pub struct MetricQuery<'a> {
    pub instance_id: &'a str,
    /// The instance's own region; the endpoint is chosen per query.
    pub region: &'a str,
    pub metric_name: &'a str,
    pub namespace: &'a str,
    pub window: &'a TimeWindow,
    pub period_secs: u32,
    pub statistic: &'static str,
}

/// Telemetry read used by the metric fetcher. An empty vec means "no datapoints", not failure.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn get_metric_samples(
        &self,
        query: &MetricQuery<'_>,
    ) -> Result<Vec<MetricSample>, SourceError>;
}

/// Account-level collaborator. Clients for telemetry are built per request from that
/// request's credentials; nothing here is shared between requests.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    async fn validate_credentials(&self, credentials: &Credentials) -> Result<(), SourceError>;

    async fn list_regions(&self, credentials: &Credentials) -> Result<Vec<String>, SourceError>;

    async fn list_region_instances(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> Result<RegionInventory, SourceError>;

    fn metrics_client(&self, credentials: &Credentials) -> Arc<dyn MetricsSource>;
}
