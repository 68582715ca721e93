// Domain models: request inputs, metric catalog and series, report sections

mod instance;
mod metric;
mod report;

pub use instance::{Credentials, Instance, InstanceListing, ManagedDbInstance, RegionInventory};
pub use metric::{MetricCatalog, MetricDescriptor, MetricSample, MetricSeries, SeriesSummary};
pub use report::{
    ChartBlock, ChartImage, CoverInfo, InstanceDetailTable, InstanceHeader, InstanceSummaryRow,
    REPORT_CONTENT_TYPE, Report, ReportContext, ReportRequest, ReportSection, report_filename,
};
