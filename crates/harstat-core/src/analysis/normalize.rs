use crate::record::{Latency, TransactionRecord};
use crate::{Error, Result};
use url::Url;

/// What to do with a record whose URL cannot be parsed as an absolute URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UrlPolicy {
    /// Leave the record out of URL-keyed groupings and keep it everywhere else.
    #[default]
    Skip,
    /// Fail the whole normalization with [`Error::MalformedUrl`].
    Abort,
}

/// URL-derived grouping keys of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlKey {
    pub host: String,
    /// URL with query, fragment and last path segment removed
    pub prefix: String,
}

impl UrlKey {
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedUrl {
            url: raw.to_string(),
            reason,
        };

        let mut url = Url::parse(raw).map_err(|e| malformed(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| malformed("URL has no host".to_string()))?
            .to_string();

        url.set_query(None);
        url.set_fragment(None);

        // Paths of host-bearing URLs always start with '/', so the last slash
        // found is inside the path and never part of "scheme://".
        let serialized = url.as_str();
        let prefix = match serialized.rfind('/') {
            Some(idx) if idx >= serialized.len() - url.path().len() => &serialized[..idx],
            _ => serialized,
        };

        Ok(Self {
            host,
            prefix: prefix.to_string(),
        })
    }
}

/// Grouping key for a URL: `https://host/a/b/c?q=1` becomes `https://host/a/b`.
pub fn url_prefix(raw: &str) -> Result<String> {
    UrlKey::parse(raw).map(|key| key.prefix)
}

/// Scalar view of a transaction record shared by every aggregate.
///
/// Each field is derived exactly once so statistics, percentiles and rankings
/// all see the same value for a given record.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord<'a> {
    pub record: &'a TransactionRecord,
    pub latency: Latency,
    pub server_latency: Option<Latency>,
    pub request_size: u64,
    pub response_size: u64,
    pub status: i64,
    pub method: String,
    /// `None` when the URL was malformed and skipped
    pub url_key: Option<UrlKey>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: UrlPolicy,
}

impl Normalizer {
    pub fn new(policy: UrlPolicy) -> Self {
        Self { policy }
    }

    pub fn normalize<'a>(&self, record: &'a TransactionRecord) -> Result<NormalizedRecord<'a>> {
        let url_key = match UrlKey::parse(&record.url) {
            Ok(key) => Some(key),
            Err(err) if self.policy == UrlPolicy::Skip => {
                tracing::warn!("Record {}: {}; excluded from URL groupings", record.id, err);
                None
            }
            Err(err) => return Err(err),
        };

        Ok(NormalizedRecord {
            record,
            latency: record.latency,
            server_latency: record.server_latency,
            request_size: record.request_size,
            response_size: record.response_size,
            status: record.status,
            method: record.method.to_uppercase(),
            url_key,
        })
    }

    pub fn normalize_all<'a>(
        &self,
        records: &'a [TransactionRecord],
    ) -> Result<Vec<NormalizedRecord<'a>>> {
        records.iter().map(|r| self.normalize(r)).collect()
    }
}
