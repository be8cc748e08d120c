//! File outputs for a finished report.
//!
//! The delimited file flattens one input record per line; the JSON document
//! carries the whole report tree.

use anyhow::{Context, Result};
use harstat_core::TransactionRecord;
use harstat_core::analysis::{Report, url_prefix};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "id,method,url,status,latency_ms,server_latency_ms,request_size,response_size,url_prefix";

/// Write one CSV row per record, in input order.
pub fn write_csv<W: Write>(records: &[TransactionRecord], mut out: W) -> Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;

    for record in records {
        let server_latency = record
            .server_latency
            .map(|l| format!("{:.3}", l.as_millis_f64()))
            .unwrap_or_default();
        // Malformed URLs get an empty prefix rather than failing the export.
        let prefix = url_prefix(&record.url).unwrap_or_default();

        writeln!(
            out,
            "{},{},{},{},{:.3},{},{},{},{}",
            csv_field(&record.id),
            csv_field(&record.method),
            csv_field(&record.url),
            record.status,
            record.latency.as_millis_f64(),
            server_latency,
            record.request_size,
            record.response_size,
            csv_field(&prefix),
        )?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_csv_file(records: &[TransactionRecord], path: &Path) -> Result<()> {
    tracing::debug!("Writing CSV rows to: {}", path.display());

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    write_csv(records, BufWriter::new(file))?;

    tracing::info!("Wrote {} CSV rows to {}", records.len(), path.display());
    Ok(())
}

pub fn write_json_file(report: &Report<'_>, path: &Path) -> Result<()> {
    tracing::debug!("Writing JSON report to: {}", path.display());

    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote JSON report to {}", path.display());
    Ok(())
}

/// Quote a field when it holds a delimiter, quote or line break (RFC 4180).
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
