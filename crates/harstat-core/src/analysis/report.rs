use super::group::GroupCounts;
use super::normalize::{NormalizedRecord, Normalizer, UrlPolicy};
use super::percentile::{PercentileMap, SortedSample, check_quantiles};
use super::stats::Stats;
use super::topn::top_n;
use crate::record::{Latency, TransactionRecord};
use crate::{Error, Result};
use serde::Serialize;

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_SIZE_QUANTILES: [f64; 3] = [0.25, 0.5, 0.90];
pub const DEFAULT_LATENCY_QUANTILES: [f64; 4] = [0.10, 0.50, 0.90, 0.99];

/// Knobs of a report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Length bound shared by every ranking
    pub top_n: usize,
    /// Quantiles for request sizes; empty omits the mapping
    pub size_quantiles: Vec<f64>,
    /// Quantiles for request latency; empty omits the mapping
    pub latency_quantiles: Vec<f64>,
    pub url_policy: UrlPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            size_quantiles: DEFAULT_SIZE_QUANTILES.to_vec(),
            latency_quantiles: DEFAULT_LATENCY_QUANTILES.to_vec(),
            url_policy: UrlPolicy::default(),
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_size_quantiles(mut self, quantiles: Vec<f64>) -> Self {
        self.size_quantiles = quantiles;
        self
    }

    pub fn with_latency_quantiles(mut self, quantiles: Vec<f64>) -> Self {
        self.latency_quantiles = quantiles;
        self
    }

    pub fn with_url_policy(mut self, policy: UrlPolicy) -> Self {
        self.url_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_quantiles(&self.size_quantiles)?;
        check_quantiles(&self.latency_quantiles)
    }
}

/// Analytical report over one capture session.
///
/// Rankings borrow the records they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<'a> {
    pub total_records: usize,
    pub latency: Stats<Latency>,
    /// Over the records that carry a server-side latency; absent when none do
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_latency: Option<Stats<Latency>>,
    pub request_size: Stats<u64>,
    pub response_size: Stats<u64>,
    pub by_status: GroupCounts,
    pub by_method: GroupCounts,
    pub by_host: GroupCounts,
    pub by_url_prefix: GroupCounts,
    /// Records left out of `by_host` and `by_url_prefix` because of a malformed URL
    pub skipped_urls: usize,
    pub top_by_latency: Vec<&'a TransactionRecord>,
    pub top_by_request_size: Vec<&'a TransactionRecord>,
    pub top_by_response_size: Vec<&'a TransactionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_size_percentiles: Option<PercentileMap<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_percentiles: Option<PercentileMap<Latency>>,
}

/// Builds a [`Report`] from one normalized view of the records.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    config: ReportConfig,
}

impl ReportComposer {
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn compose<'a>(&self, records: &'a [TransactionRecord]) -> Result<Report<'a>> {
        if records.is_empty() {
            return Err(Error::EmptyReport);
        }

        tracing::debug!("Composing report over {} records", records.len());

        let normalized = Normalizer::new(self.config.url_policy).normalize_all(records)?;
        let skipped_urls = normalized.iter().filter(|r| r.url_key.is_none()).count();

        let latency = Stats::compute_with_std_dev(normalized.iter().map(|r| r.latency))?;
        let request_size =
            Stats::compute_with_std_dev(normalized.iter().map(|r| r.request_size))?;
        let response_size =
            Stats::compute_with_std_dev(normalized.iter().map(|r| r.response_size))?;
        let server_latency = optional_field(Stats::compute_with_std_dev(
            normalized.iter().filter_map(|r| r.server_latency),
        ))?;

        let by_status = GroupCounts::count_by(&normalized, |r| Some(r.status));
        let by_method = GroupCounts::count_by(&normalized, |r| Some(r.method.clone()));
        let by_host =
            GroupCounts::count_by(&normalized, |r| r.url_key.as_ref().map(|k| k.host.clone()));
        let by_url_prefix =
            GroupCounts::count_by(&normalized, |r| r.url_key.as_ref().map(|k| k.prefix.clone()));

        let n = self.config.top_n;
        let top_by_latency = ranked(&normalized, n, |r| r.latency);
        let top_by_request_size = ranked(&normalized, n, |r| r.request_size);
        let top_by_response_size = ranked(&normalized, n, |r| r.response_size);

        let request_size_percentiles = field_percentiles(
            normalized.iter().map(|r| r.request_size).collect(),
            &self.config.size_quantiles,
        )?;
        let latency_percentiles = field_percentiles(
            normalized.iter().map(|r| r.latency).collect(),
            &self.config.latency_quantiles,
        )?;

        if skipped_urls > 0 {
            tracing::warn!(
                "{} of {} records had malformed URLs and were left out of URL groupings",
                skipped_urls,
                records.len()
            );
        }

        tracing::info!(
            "Report complete: {} records, avg latency {:.2} ms, {} status codes",
            records.len(),
            latency.average,
            by_status.len()
        );

        Ok(Report {
            total_records: records.len(),
            latency,
            server_latency,
            request_size,
            response_size,
            by_status,
            by_method,
            by_host,
            by_url_prefix,
            skipped_urls,
            top_by_latency,
            top_by_request_size,
            top_by_response_size,
            request_size_percentiles,
            latency_percentiles,
        })
    }
}

/// Compose a report with `config` in one call.
pub fn compose_report<'a>(
    records: &'a [TransactionRecord],
    config: &ReportConfig,
) -> Result<Report<'a>> {
    ReportComposer::new(config.clone())?.compose(records)
}

fn ranked<'a, K, F>(normalized: &[NormalizedRecord<'a>], n: usize, key: F) -> Vec<&'a TransactionRecord>
where
    K: PartialOrd,
    F: Fn(&NormalizedRecord<'a>) -> K,
{
    top_n(normalized, n, key)
        .into_iter()
        .map(|r| r.record)
        .collect()
}

fn field_percentiles<T: super::stats::Measure>(
    values: Vec<T>,
    quantiles: &[f64],
) -> Result<Option<PercentileMap<T>>> {
    if quantiles.is_empty() {
        return Ok(None);
    }
    SortedSample::new(values)?.percentiles(quantiles).map(Some)
}

/// An empty field yields `None`; every other error still propagates.
fn optional_field<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::EmptyInput) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn record(id: &str, url: &str, latency_ms: f64, request_size: u64) -> TransactionRecord {
        TransactionRecord::new(id, "GET", url)
            .with_status(200)
            .with_latency(Latency::from_millis_f64(latency_ms))
            .with_sizes(request_size, request_size * 10)
    }

    fn ids(records: &[&TransactionRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_latency_ranking_and_stats() {
        let records = vec![
            record("a", "http://h/x", 100.0, 50),
            record("b", "http://h/y", 300.0, 10),
            record("c", "http://h/z", 200.0, 30),
        ];
        let config = ReportConfig::new().with_top_n(2);
        let report = compose_report(&records, &config).unwrap();

        assert_eq!(ids(&report.top_by_latency), vec!["b", "c"]);
        assert_eq!(report.latency.min, Latency::from_millis_f64(100.0));
        assert_eq!(report.latency.max, Latency::from_millis_f64(300.0));
        assert!((report.latency.average - 200.0).abs() < 1e-9);
        assert_eq!(ids(&report.top_by_request_size), vec!["a", "c"]);
        assert_eq!(ids(&report.top_by_response_size), vec!["a", "c"]);
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        let err = compose_report(&[], &ReportConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyReport);
    }

    #[test]
    fn test_status_groups() {
        let records = vec![
            record("1", "http://h/a", 1.0, 1).with_status(404),
            record("2", "http://h/b", 1.0, 1).with_status(404),
            record("3", "http://h/c", 1.0, 1).with_status(200),
        ];
        let report = compose_report(&records, &ReportConfig::default()).unwrap();

        assert_eq!(report.by_status.len(), 2);
        assert_eq!(report.by_status.get("404"), 2);
        assert_eq!(report.by_status.get("200"), 1);
        assert_eq!(report.by_status.total(), records.len());
    }

    #[test]
    fn test_url_prefix_groups() {
        let records = vec![
            record("1", "http://h/a/b/c", 1.0, 1),
            record("2", "http://h/a/b/d", 1.0, 1),
        ];
        let report = compose_report(&records, &ReportConfig::default()).unwrap();

        assert_eq!(report.by_url_prefix.len(), 1);
        assert_eq!(report.by_url_prefix.get("http://h/a/b"), 2);
        assert_eq!(report.by_host.get("h"), 2);
    }

    #[test]
    fn test_malformed_url_skipped_from_url_groups_only() {
        let records = vec![
            record("1", "http://h/a/b", 10.0, 1),
            record("2", "not a url", 500.0, 1).with_status(500),
            record("3", "", 5.0, 1),
        ];
        let report = compose_report(&records, &ReportConfig::default()).unwrap();

        assert_eq!(report.skipped_urls, 2);
        assert_eq!(report.by_url_prefix.total(), 1);
        assert_eq!(report.by_host.total(), 1);
        assert_eq!(report.by_status.total(), 3);
        assert_eq!(report.latency.count, 3);
        assert_eq!(ids(&report.top_by_latency)[0], "2");
    }

    #[test]
    fn test_malformed_url_aborts_when_configured() {
        let records = vec![record("1", "not a url", 1.0, 1)];
        let config = ReportConfig::new().with_url_policy(UrlPolicy::Abort);
        let err = compose_report(&records, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }

    #[test]
    fn test_percentiles_use_configured_quantiles() {
        let records: Vec<TransactionRecord> = (1..=10)
            .map(|i| record(&i.to_string(), "http://h/p", f64::from(i) * 10.0, i as u64))
            .collect();
        let report = compose_report(&records, &ReportConfig::default()).unwrap();

        let sizes = report.request_size_percentiles.as_ref().unwrap();
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes["p25"], 3);
        assert_eq!(sizes["p50"], 5);
        assert_eq!(sizes["p90"], 9);

        let latencies = report.latency_percentiles.as_ref().unwrap();
        assert_eq!(latencies.len(), 4);
        assert_eq!(latencies["p10"], Latency::from_millis_f64(10.0));
        assert_eq!(latencies["p99"], Latency::from_millis_f64(100.0));
    }

    #[test]
    fn test_empty_quantile_set_omits_mapping() {
        let records = vec![record("1", "http://h/a", 1.0, 1)];
        let config = ReportConfig::new()
            .with_size_quantiles(Vec::new())
            .with_latency_quantiles(vec![0.5]);
        let report = compose_report(&records, &config).unwrap();

        assert!(report.request_size_percentiles.is_none());
        assert_eq!(report.latency_percentiles.unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_quantile_rejected_up_front() {
        let config = ReportConfig::new().with_latency_quantiles(vec![0.5, 1.2]);
        let err = ReportComposer::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantile);
    }

    #[test]
    fn test_colliding_quantile_labels_rejected_up_front() {
        let config = ReportConfig::new().with_size_quantiles(vec![0.1234501, 0.1234502]);
        let err = ReportComposer::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantile);

        // Separate sets produce separate maps, so sharing a label across them is fine
        let config = ReportConfig::new()
            .with_size_quantiles(vec![0.5])
            .with_latency_quantiles(vec![0.5]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_latency_only_when_present() {
        let without = vec![record("1", "http://h/a", 1.0, 1)];
        let report = compose_report(&without, &ReportConfig::default()).unwrap();
        assert!(report.server_latency.is_none());

        let with = vec![
            record("1", "http://h/a", 9.0, 1).with_server_latency(Latency::from_millis_f64(4.0)),
            record("2", "http://h/a", 9.0, 1),
        ];
        let report = compose_report(&with, &ReportConfig::default()).unwrap();
        let server = report.server_latency.unwrap();
        assert_eq!(server.count, 1);
        assert_eq!(server.max, Latency::from_millis_f64(4.0));
    }

    #[test]
    fn test_composing_twice_is_identical() {
        let records = vec![
            record("1", "http://h/a/1", 12.5, 40),
            record("2", "http://h/a/2", 12.5, 40).with_status(302),
            record("3", "https://other/x/y", 3.25, 7),
        ];
        let config = ReportConfig::default();

        let first = compose_report(&records, &config).unwrap();
        let second = compose_report(&records, &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
