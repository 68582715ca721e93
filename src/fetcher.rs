// Metric fetch: one telemetry read per (instance, metric), normalized into an ascending series

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cloud_repo::{MetricQuery, MetricsSource, STATISTIC_AVERAGE};
use crate::error::FetchError;
use crate::models::{Instance, MetricDescriptor, MetricSeries};
use crate::window::TimeWindow;

/// Default sampling period: five-minute buckets.
pub const DEFAULT_PERIOD_SECS: u32 = 300;

pub struct MetricFetcher {
    source: Arc<dyn MetricsSource>,
    period_secs: u32,
}

impl MetricFetcher {
    /// `source` is the per-request client built from the request's credentials.
    pub fn new(source: Arc<dyn MetricsSource>, period_secs: u32) -> Self {
        Self {
            source,
            period_secs,
        }
    }

    /// Empty series when the source has no datapoints. Non-finite values and
    /// samples outside `window` are dropped.
    #[instrument(
        skip(self, instance, descriptor, window),
        fields(repo = "telemetry", operation = "fetch", instance_id = %instance.id, metric = %descriptor.name)
    )]
    pub async fn fetch(
        &self,
        instance: &Instance,
        descriptor: &MetricDescriptor,
        window: &TimeWindow,
    ) -> Result<MetricSeries, FetchError> {
        let query = MetricQuery {
            instance_id: &instance.id,
            region: &instance.region,
            metric_name: &descriptor.name,
            namespace: &descriptor.namespace,
            window,
            period_secs: self.period_secs,
            statistic: STATISTIC_AVERAGE,
        };
        let samples = self
            .source
            .get_metric_samples(&query)
            .await
            .map_err(|cause| FetchError {
                instance_id: instance.id.clone(),
                metric: descriptor.name.clone(),
                cause,
            })?;

        let received = samples.len();
        let samples: Vec<_> = samples.into_iter().filter(|s| s.value.is_finite()).collect();
        if samples.len() < received {
            debug!(dropped = received - samples.len(), "dropped non-finite datapoints");
        }
        let finite = samples.len();
        let samples: Vec<_> = samples
            .into_iter()
            .filter(|s| window.contains(s.timestamp))
            .collect();
        if samples.len() < finite {
            debug!(dropped = finite - samples.len(), "dropped datapoints outside window");
        }
        if samples.is_empty() {
            debug!("no datapoints in window");
        }
        Ok(MetricSeries::from_unordered(samples))
    }
}
