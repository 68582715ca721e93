// Report request, ordered document sections, and the finished report

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Credentials, Instance, MetricDescriptor, SeriesSummary};
use crate::window::{Frequency, TimeWindow};

pub const REPORT_CONTENT_TYPE: &str = "application/pdf";

/// Body of POST /generate-report. `frequency` stays a string so unknown labels
/// surface as `InvalidFrequency` instead of a generic body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub provider: String,
    pub credentials: Credentials,
    pub selected_instances: Vec<Instance>,
    pub frequency: String,
}

/// Account identity and titles shared by every section of one report.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub provider: String,
    pub account_name: Option<String>,
    pub account_id: Option<String>,
}

impl ReportContext {
    pub fn from_request(title: &str, request: &ReportRequest) -> Self {
        Self {
            title: title.to_string(),
            provider: request.provider.clone(),
            account_name: non_blank(request.credentials.account_name.as_deref()),
            account_id: non_blank(request.credentials.account_id.as_deref()),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSummaryRow {
    pub id: String,
    pub name: String,
    pub instance_type: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverInfo {
    pub title: String,
    pub provider: String,
    pub account_name: Option<String>,
    pub account_id: Option<String>,
    pub frequency: Frequency,
    pub window: TimeWindow,
    pub generated_at: DateTime<Utc>,
    pub instances: Vec<InstanceSummaryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceHeader {
    pub instance_id: String,
    pub label: String,
}

/// Property/value rows for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDetailTable {
    pub instance_id: String,
    pub rows: Vec<(String, String)>,
}

/// Rendered line chart. `pixels` is RGB8, row-major, `width * height * 3` bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub title: String,
    pub y_label: String,
    pub x_start: String,
    pub x_end: String,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBlock {
    pub instance_id: String,
    pub instance_label: String,
    pub metric: MetricDescriptor,
    pub summary: SeriesSummary,
    pub summary_text: String,
    pub chart: ChartImage,
}

/// One atomic unit of report content, in final document order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSection {
    CoverInfo(CoverInfo),
    InstanceHeader(InstanceHeader),
    InstanceDetailTable(InstanceDetailTable),
    ChartBlock(ChartBlock),
    PageBreak,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// `<accountName-or-provider>-<frequency>-<YYYYMMDD>.pdf`; same inputs on the same UTC day give the same name.
pub fn report_filename(
    account_name: Option<&str>,
    provider: &str,
    frequency: Frequency,
    generated_at: DateTime<Utc>,
) -> String {
    let owner = account_name
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(provider);
    let mut owner: String = owner
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if owner.is_empty() {
        owner.push_str("report");
    }
    format!(
        "{}-{}-{}.pdf",
        owner,
        frequency.as_str(),
        generated_at.format("%Y%m%d")
    )
}
