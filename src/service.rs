// Request boundary: validate, authenticate, assemble, write. One call = one report.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::assembler::ReportAssembler;
use crate::chart::ChartRenderer;
use crate::cloud_repo::CloudProvider;
use crate::config::ReportConfig;
use crate::document::DocumentWriter;
use crate::error::ReportError;
use crate::fetcher::MetricFetcher;
use crate::models::{
    MetricCatalog, REPORT_CONTENT_TYPE, Report, ReportContext, ReportRequest, report_filename,
};
use crate::window::Frequency;

pub struct ReportService {
    provider: Arc<dyn CloudProvider>,
    assembler: ReportAssembler,
    writer: DocumentWriter,
    title: String,
    period_secs: u32,
}

impl ReportService {
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        catalog: Arc<MetricCatalog>,
        config: &ReportConfig,
    ) -> Self {
        let assembler = ReportAssembler::new(catalog, ChartRenderer::default())
            .with_max_concurrent_fetches(config.max_concurrent_fetches);
        Self {
            provider,
            assembler,
            writer: DocumentWriter::new(),
            title: config.title.clone(),
            period_secs: config.period_secs,
        }
    }

    pub fn provider(&self) -> &Arc<dyn CloudProvider> {
        &self.provider
    }

    pub async fn generate(&self, request: ReportRequest) -> Result<Report, ReportError> {
        self.generate_at(request, Utc::now()).await
    }

    /// `now` is the single time snapshot for the whole report.
    #[instrument(
        skip_all,
        fields(provider = %request.provider, frequency = %request.frequency, instances = request.selected_instances.len())
    )]
    pub async fn generate_at(
        &self,
        request: ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<Report, ReportError> {
        let frequency: Frequency = request.frequency.parse()?;
        if request.selected_instances.is_empty() {
            return Err(ReportError::EmptySelection);
        }
        for (index, instance) in request.selected_instances.iter().enumerate() {
            instance.validate(index)?;
        }

        self.provider
            .validate_credentials(&request.credentials)
            .await?;

        let context = ReportContext::from_request(&self.title, &request);
        let fetcher = MetricFetcher::new(
            self.provider.metrics_client(&request.credentials),
            self.period_secs,
        );
        let sections = self
            .assembler
            .build(
                &fetcher,
                &context,
                &request.selected_instances,
                frequency,
                now,
            )
            .await?;

        let writer = self.writer;
        let bytes = tokio::task::spawn_blocking(move || writer.write(&sections))
            .await
            .map_err(|e| ReportError::Write(format!("writer task: {}", e)))??;

        let filename = report_filename(
            context.account_name.as_deref(),
            &context.provider,
            frequency,
            now,
        );
        info!(filename = %filename, bytes = bytes.len(), "report generated");
        Ok(Report {
            filename,
            content_type: REPORT_CONTENT_TYPE,
            bytes: Bytes::from(bytes),
        })
    }
}
