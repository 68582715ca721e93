// Metric catalog, samples and per-series summary statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub namespace: String,
    pub unit: String,
}

impl MetricDescriptor {
    pub fn new(name: &str, namespace: &str, unit: &str) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            unit: unit.into(),
        }
    }
}

/// Ordered metric table evaluated for every instance. Order here is order in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCatalog {
    pub version: u32,
    pub metrics: Vec<MetricDescriptor>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            version: 1,
            metrics: vec![
                MetricDescriptor::new("CPUUtilization", "AWS/EC2", "%"),
                MetricDescriptor::new("MemoryUtilization", "CWAgent", "%"),
                MetricDescriptor::new("DiskUsedPercent", "CWAgent", "%"),
                MetricDescriptor::new("NetworkIn", "AWS/EC2", "Bytes"),
                MetricDescriptor::new("NetworkOut", "AWS/EC2", "Bytes"),
                MetricDescriptor::new("CPUCreditUsage", "AWS/EC2", "Count"),
                MetricDescriptor::new("CPUCreditBalance", "AWS/EC2", "Count"),
            ],
        }
    }
}

impl MetricCatalog {
    pub fn new(version: u32, metrics: Vec<MetricDescriptor>) -> Self {
        Self { version, metrics }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricDescriptor> {
        self.metrics.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    /// Average statistic for the sampling period starting at `timestamp`.
    pub value: f64,
}

/// Samples ascending by timestamp. Only constructible through [`MetricSeries::from_unordered`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    samples: Vec<MetricSample>,
}

impl MetricSeries {
    /// Sorts whatever order the source delivered.
    pub fn from_unordered(mut samples: Vec<MetricSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn summary(&self) -> Option<SeriesSummary> {
        SeriesSummary::from_series(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    /// Arithmetic mean of all sample values.
    pub avg: f64,
    pub count: usize,
}

impl SeriesSummary {
    pub fn from_series(series: &MetricSeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let values = series.samples().iter().map(|s| s.value);
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = values.sum();
        let count = series.len();
        Some(Self {
            min,
            max,
            avg: sum / count as f64,
            count,
        })
    }

    /// Two-decimal text shown above each chart.
    pub fn describe(&self, unit: &str) -> String {
        format!(
            "Average {:.2} {unit} | Min {:.2} {unit} | Max {:.2} {unit}",
            self.avg, self.min, self.max
        )
    }
}
