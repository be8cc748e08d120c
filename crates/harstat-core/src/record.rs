//! Transaction records: the immutable input of the statistics engine.
//!
//! A [`TransactionRecord`] is one captured request/response pair. Records are
//! built once by the ingestion side (see [`records_from_har`]) and only ever
//! borrowed by the engine.

use crate::har::{Entry, Har, Header};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Client- or server-observed request latency.
///
/// Serialized as fractional milliseconds, the unit HAR timings use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Latency(Duration);

impl Latency {
    /// Negative or non-finite inputs collapse to zero.
    pub fn from_millis_f64(ms: f64) -> Self {
        if !ms.is_finite() || ms <= 0.0 {
            return Self::default();
        }
        Self(Duration::from_nanos((ms * 1_000_000.0).round() as u64))
    }

    pub fn as_millis_f64(&self) -> f64 {
        self.0.as_secs() as f64 * 1000.0 + f64::from(self.0.subsec_nanos()) / 1_000_000.0
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ms", self.as_millis_f64())
    }
}

impl Serialize for Latency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_millis_f64())
    }
}

impl<'de> Deserialize<'de> for Latency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Latency::from_millis_f64)
    }
}

/// One captured HTTP transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub url: String,
    pub method: String,
    /// `Name: value` lines in capture order
    pub request_headers: Vec<String>,
    pub response_headers: Vec<String>,
    pub request_size: u64,
    pub response_size: u64,
    pub status: i64,
    pub content_type: String,
    pub latency: Latency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_latency: Option<Latency>,
}

impl TransactionRecord {
    /// A record with no headers, zero sizes and zero latency.
    pub fn new(id: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            method: method.into(),
            request_headers: Vec::new(),
            response_headers: Vec::new(),
            request_size: 0,
            response_size: 0,
            status: 0,
            content_type: String::new(),
            latency: Latency::default(),
            server_latency: None,
        }
    }

    pub fn with_status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_server_latency(mut self, latency: Latency) -> Self {
        self.server_latency = Some(latency);
        self
    }

    pub fn with_sizes(mut self, request_size: u64, response_size: u64) -> Self {
        self.request_size = request_size;
        self.response_size = response_size;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Build a record from a HAR entry.
    ///
    /// `index` is the 1-based position of the entry in the archive and becomes
    /// the id unless the entry carries its own `_id`.
    pub fn from_entry(index: usize, entry: &Entry) -> Self {
        let response = &entry.response;

        // content.size is the decoded body; bodySize is what went over the wire
        // and is -1 for cached responses.
        let response_size = if response.content.size >= 0 {
            response.content.size
        } else {
            response.body_size
        };

        let server_latency = (entry.timings.wait >= 0.0)
            .then(|| Latency::from_millis_f64(entry.timings.wait));

        Self {
            id: entry.id.clone().unwrap_or_else(|| index.to_string()),
            url: entry.request.url.clone(),
            method: entry.request.method.clone(),
            request_headers: render_headers(&entry.request.headers),
            response_headers: render_headers(&response.headers),
            request_size: entry.request.body_size.max(0) as u64,
            response_size: response_size.max(0) as u64,
            status: response.status,
            content_type: response.content.mime_type.clone(),
            latency: Latency::from_millis_f64(entry.time),
            server_latency,
        }
    }
}

/// Convert every entry of an archive into a transaction record, in capture order.
pub fn records_from_har(har: &Har) -> Vec<TransactionRecord> {
    let records: Vec<TransactionRecord> = har
        .log
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| TransactionRecord::from_entry(idx + 1, entry))
        .collect();

    tracing::debug!("Built {} transaction records", records.len());
    records
}

fn render_headers(headers: &[Header]) -> Vec<String> {
    headers
        .iter()
        .map(|h| format!("{}: {}", h.name, h.value))
        .collect()
}
