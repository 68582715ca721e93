// Report assembly: window -> cover -> per-instance detail + chart blocks, in a fixed order.
// Fetches may overlap; results are consumed in (instance, catalog) order, so completion
// timing never changes the section sequence.

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::chart::ChartRenderer;
use crate::error::{FetchError, ReportError};
use crate::fetcher::MetricFetcher;
use crate::models::{
    ChartBlock, CoverInfo, Instance, InstanceDetailTable, InstanceHeader, InstanceSummaryRow,
    MetricCatalog, MetricDescriptor, MetricSeries, ReportContext, ReportSection,
};
use crate::window::{self, Frequency, TimeWindow};

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Per-report tallies, logged when the report is finalized.
#[derive(Debug, Default, Clone, Copy)]
struct AssemblyStats {
    charts: usize,
    empty: usize,
    fetch_failures: usize,
    render_failures: usize,
}

pub struct ReportAssembler {
    catalog: Arc<MetricCatalog>,
    renderer: ChartRenderer,
    max_concurrent_fetches: usize,
}

impl ReportAssembler {
    pub fn new(catalog: Arc<MetricCatalog>, renderer: ChartRenderer) -> Self {
        Self {
            catalog,
            renderer,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// 1 means strictly sequential fetching.
    pub fn with_max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n.max(1);
        self
    }

    /// Builds the ordered section list. Fails only on request-level errors; per-metric
    /// fetch or render failures drop that one chart.
    #[instrument(
        skip_all,
        fields(provider = %context.provider, frequency = %frequency, instances = instances.len())
    )]
    pub async fn build(
        &self,
        fetcher: &MetricFetcher,
        context: &ReportContext,
        instances: &[Instance],
        frequency: Frequency,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReportSection>, ReportError> {
        if instances.is_empty() {
            return Err(ReportError::EmptySelection);
        }

        let window = window::resolve(frequency, now);
        debug!(start = %window.start, end = %window.end, "window resolved");

        let mut sections = Vec::with_capacity(1 + instances.len() * (3 + self.catalog.len()));
        sections.push(ReportSection::CoverInfo(cover_info(
            context, instances, frequency, window, now,
        )));

        let metrics = &self.catalog.metrics;
        let jobs: Vec<(usize, usize)> = (0..instances.len())
            .flat_map(|i| (0..metrics.len()).map(move |m| (i, m)))
            .collect();
        let window_ref = &window;
        let mut outcomes = stream::iter(jobs)
            .map(move |(i, m)| fetcher.fetch(&instances[i], &metrics[m], window_ref))
            .buffered(self.max_concurrent_fetches)
            .collect::<Vec<_>>()
            .await
            .into_iter();

        let mut stats = AssemblyStats::default();
        for instance in instances {
            sections.push(ReportSection::PageBreak);
            sections.push(ReportSection::InstanceHeader(InstanceHeader {
                instance_id: instance.id.clone(),
                label: instance.label().to_string(),
            }));
            sections.push(ReportSection::InstanceDetailTable(detail_table(instance)));

            for descriptor in metrics {
                let Some(outcome) = outcomes.next() else {
                    break;
                };
                if let Some(block) =
                    self.chart_block(instance, descriptor, &window, outcome, &mut stats)
                {
                    sections.push(ReportSection::ChartBlock(block));
                }
            }
        }

        info!(
            sections = sections.len(),
            charts = stats.charts,
            empty = stats.empty,
            fetch_failures = stats.fetch_failures,
            render_failures = stats.render_failures,
            "report assembled"
        );
        Ok(sections)
    }

    fn chart_block(
        &self,
        instance: &Instance,
        descriptor: &MetricDescriptor,
        window: &TimeWindow,
        outcome: Result<MetricSeries, FetchError>,
        stats: &mut AssemblyStats,
    ) -> Option<ChartBlock> {
        let series = match outcome {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "skipping metric: fetch failed");
                stats.fetch_failures += 1;
                return None;
            }
        };
        let Some(summary) = series.summary() else {
            stats.empty += 1;
            return None;
        };
        match self
            .renderer
            .render(&series, instance.label(), descriptor, window)
        {
            Ok(Some(chart)) => {
                stats.charts += 1;
                Some(ChartBlock {
                    instance_id: instance.id.clone(),
                    instance_label: instance.label().to_string(),
                    metric: descriptor.clone(),
                    summary_text: format!(
                        "{}: {}",
                        descriptor.name,
                        summary.describe(&descriptor.unit)
                    ),
                    summary,
                    chart,
                })
            }
            Ok(None) => {
                stats.empty += 1;
                None
            }
            Err(e) => {
                warn!(instance_id = %instance.id, error = %e, "skipping metric: render failed");
                stats.render_failures += 1;
                None
            }
        }
    }
}

fn cover_info(
    context: &ReportContext,
    instances: &[Instance],
    frequency: Frequency,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> CoverInfo {
    CoverInfo {
        title: context.title.clone(),
        provider: context.provider.clone(),
        account_name: context.account_name.clone(),
        account_id: context.account_id.clone(),
        frequency,
        window,
        generated_at: now,
        instances: instances
            .iter()
            .map(|i| InstanceSummaryRow {
                id: i.id.clone(),
                name: i.name.clone(),
                instance_type: i.instance_type.clone(),
                region: i.region.clone(),
            })
            .collect(),
    }
}

fn detail_table(instance: &Instance) -> InstanceDetailTable {
    let mut rows = vec![
        ("Instance ID".to_string(), instance.id.clone()),
        ("Instance Type".to_string(), instance.instance_type.clone()),
        ("Region".to_string(), instance.region.clone()),
    ];
    if let Some(platform) = instance.platform.as_deref().filter(|p| !p.is_empty()) {
        rows.push(("Platform".to_string(), platform.to_string()));
    }
    rows.push(("State".to_string(), instance.state.clone()));
    InstanceDetailTable {
        instance_id: instance.id.clone(),
        rows,
    }
}
