use crate::OutputFormat;
use crate::export;
use anyhow::{Result, bail};
use harstat_core::analysis::{Report, ReportConfig, UrlPolicy, compose_report};
use harstat_core::filter::{FilterCriteria, filter_records};
use harstat_core::har::HarReader;
use harstat_core::{TransactionRecord, records_from_har};
use std::path::{Path, PathBuf};

/// Settings of one `report` invocation, as gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub top_n: Option<usize>,
    pub size_quantiles: Option<Vec<f64>>,
    pub latency_quantiles: Option<Vec<f64>>,
    /// Abort on the first malformed URL instead of skipping it in URL groupings
    pub strict_urls: bool,
    pub hosts: Vec<String>,
    pub status: Option<String>,
    pub method: Option<String>,
    pub content_type: Option<String>,
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl ReportOptions {
    /// Engine configuration; unset options keep the engine defaults.
    pub fn config(&self) -> ReportConfig {
        let mut config = ReportConfig::default();
        if let Some(top_n) = self.top_n {
            config = config.with_top_n(top_n);
        }
        if let Some(quantiles) = &self.size_quantiles {
            config = config.with_size_quantiles(quantiles.clone());
        }
        if let Some(quantiles) = &self.latency_quantiles {
            config = config.with_latency_quantiles(quantiles.clone());
        }
        if self.strict_urls {
            config = config.with_url_policy(UrlPolicy::Abort);
        }
        config
    }

    pub fn criteria(&self) -> Result<FilterCriteria> {
        // Host patterns may be repeated or comma-separated
        let hosts: Vec<&str> = self
            .hosts
            .iter()
            .flat_map(|h| h.split(','))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .collect();

        let mut criteria = FilterCriteria::new().with_hosts(hosts)?;

        if let Some(status) = &self.status {
            criteria = criteria.with_status(status)?;
        }
        if let Some(method) = &self.method {
            criteria = criteria.with_method(method);
        }
        if let Some(content_type) = &self.content_type {
            criteria = criteria.with_content_type(content_type);
        }

        Ok(criteria)
    }
}

/// Read a HAR file into transaction records, applying the option filters.
pub fn load_records(file: &Path, options: &ReportOptions) -> Result<Vec<TransactionRecord>> {
    let criteria = options.criteria()?;

    let har = HarReader::from_file(file)?;
    HarReader::validate(&har)?;

    let records = filter_records(records_from_har(&har), &criteria);

    if records.is_empty() && !har.log.entries.is_empty() {
        bail!("No entries matched the filter criteria");
    }

    Ok(records)
}

pub fn execute(file: &Path, options: &ReportOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Building report for HAR file: {}", file.display());
    tracing::debug!("Output format: {}", format.as_str());

    let records = load_records(file, options)?;
    let config = options.config();
    let report = compose_report(&records, &config)?;

    if let Some(path) = &options.csv {
        export::write_csv_file(&records, path)?;
    }
    if let Some(path) = &options.json {
        export::write_json_file(&report, path)?;
    }

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &Report<'_>) {
    use console::style;

    println!("\n{}", style("HAR Traffic Report").bold().cyan());
    println!("{}", style("==================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Transactions:       {}", report.total_records);
    println!("  Distinct Hosts:     {}", report.by_host.len());
    if report.skipped_urls > 0 {
        println!(
            "  Malformed URLs:     {}",
            style(report.skipped_urls).yellow()
        );
    }

    println!("\n{}", style("Latency:").bold());
    println!(
        "  Min / Avg / Max:    {:.2} / {:.2} / {:.2} ms",
        report.latency.min.as_millis_f64(),
        report.latency.average,
        report.latency.max.as_millis_f64()
    );
    if let Some(std_dev) = report.latency.std_dev {
        println!("  Std Dev:            {:.2} ms", std_dev);
    }
    if let Some(server) = &report.server_latency {
        println!(
            "  Server Avg:         {:.2} ms ({} samples)",
            server.average, server.count
        );
    }
    if let Some(percentiles) = &report.latency_percentiles {
        for (label, value) in percentiles {
            println!("  {:<20}{}", format!("{}:", label), value);
        }
    }

    println!("\n{}", style("Request Size:").bold());
    println!(
        "  Min / Avg / Max:    {} / {:.1} / {} bytes",
        report.request_size.min, report.request_size.average, report.request_size.max
    );
    if let Some(std_dev) = report.request_size.std_dev {
        println!("  Std Dev:            {:.1} bytes", std_dev);
    }
    if let Some(percentiles) = &report.request_size_percentiles {
        for (label, value) in percentiles {
            println!("  {:<20}{} bytes", format!("{}:", label), value);
        }
    }

    println!("\n{}", style("Response Size:").bold());
    println!(
        "  Min / Avg / Max:    {} / {:.1} / {} bytes",
        report.response_size.min, report.response_size.average, report.response_size.max
    );

    println!("\n{}", style("Status Codes:").bold());
    for (status, count) in report.by_status.by_count_desc() {
        println!("  {:<20}{}", status, count);
    }

    println!("\n{}", style("Methods:").bold());
    for (method, count) in report.by_method.by_count_desc() {
        println!("  {:<20}{}", method, count);
    }

    println!("\n{}", style("Top URL Prefixes:").bold());
    for (prefix, count) in report.by_url_prefix.by_count_desc().iter().take(10) {
        println!("  {:>5}  {}", count, prefix);
    }

    print_ranking("Slowest Requests:", &report.top_by_latency, |r| {
        r.latency.to_string()
    });
    print_ranking("Largest Requests:", &report.top_by_request_size, |r| {
        format!("{} bytes", r.request_size)
    });
    print_ranking("Largest Responses:", &report.top_by_response_size, |r| {
        format!("{} bytes", r.response_size)
    });

    println!();
}

fn print_ranking<F>(title: &str, records: &[&TransactionRecord], value: F)
where
    F: Fn(&TransactionRecord) -> String,
{
    use console::style;

    if records.is_empty() {
        return;
    }

    println!("\n{}", style(title).bold());
    for (i, record) in records.iter().enumerate() {
        println!(
            "  {}. [{}] {} {} - {}",
            i + 1,
            value(record),
            record.method,
            record.status,
            record.url
        );
    }
}

fn output_json(report: &Report<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &Report<'_>) {
    println!("Metric,Value");
    println!("Transactions,{}", report.total_records);
    println!("Malformed URLs,{}", report.skipped_urls);
    println!("Latency Min (ms),{:.2}", report.latency.min.as_millis_f64());
    println!("Latency Avg (ms),{:.2}", report.latency.average);
    println!("Latency Max (ms),{:.2}", report.latency.max.as_millis_f64());
    if let Some(std_dev) = report.latency.std_dev {
        println!("Latency Std Dev (ms),{:.2}", std_dev);
    }
    if let Some(percentiles) = &report.latency_percentiles {
        for (label, value) in percentiles {
            println!("Latency {} (ms),{:.2}", label, value.as_millis_f64());
        }
    }
    println!("Request Size Min (bytes),{}", report.request_size.min);
    println!("Request Size Avg (bytes),{:.2}", report.request_size.average);
    println!("Request Size Max (bytes),{}", report.request_size.max);
    if let Some(std_dev) = report.request_size.std_dev {
        println!("Request Size Std Dev (bytes),{:.2}", std_dev);
    }
    if let Some(percentiles) = &report.request_size_percentiles {
        for (label, value) in percentiles {
            println!("Request Size {} (bytes),{}", label, value);
        }
    }
    println!("Response Size Min (bytes),{}", report.response_size.min);
    println!("Response Size Avg (bytes),{:.2}", report.response_size.average);
    println!("Response Size Max (bytes),{}", report.response_size.max);

    println!();
    println!("Status,Count");
    for (status, count) in report.by_status.iter() {
        println!("{},{}", status, count);
    }
}
