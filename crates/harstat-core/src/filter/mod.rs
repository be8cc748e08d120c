mod host_pattern;

pub use host_pattern::HostPattern;

use crate::record::TransactionRecord;
use url::Url;

/// Selection applied to transaction records before a report is composed.
///
/// Conditions combine with AND; host patterns combine with OR among themselves.
/// Unset conditions accept every record.
#[derive(Debug, Default)]
pub struct FilterCriteria {
    pub hosts: Vec<HostPattern>,
    pub status: Option<StatusFilter>,
    /// Upper-cased
    pub method: Option<String>,
    /// Lower-cased, matched as a substring of the response content type
    pub content_type: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hosts<I, S>(mut self, patterns: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.hosts.push(HostPattern::parse(pattern.as_ref())?);
        }
        Ok(self)
    }

    pub fn with_status(mut self, pattern: &str) -> crate::Result<Self> {
        self.status = Some(StatusFilter::parse(pattern)?);
        Ok(self)
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = Some(method.to_uppercase());
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_lowercase());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
            && self.status.is_none()
            && self.method.is_none()
            && self.content_type.is_none()
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.matches_host(record)
            && self.status.as_ref().is_none_or(|s| s.matches(record.status))
            && self
                .method
                .as_ref()
                .is_none_or(|m| record.method.eq_ignore_ascii_case(m))
            && self
                .content_type
                .as_ref()
                .is_none_or(|ct| record.content_type.to_lowercase().contains(ct))
    }

    fn matches_host(&self, record: &TransactionRecord) -> bool {
        if self.hosts.is_empty() {
            return true;
        }

        let url = match Url::parse(&record.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Failed to parse URL {}: {}", record.url, e);
                return false;
            }
        };

        match url.host_str() {
            Some(host) => self.hosts.iter().any(|pattern| pattern.matches(host)),
            None => false,
        }
    }
}

/// HTTP status selector
#[derive(Debug, Clone, PartialEq)]
pub enum StatusFilter {
    Exact(i64),
    /// Inclusive bounds
    Range(i64, i64),
}

impl StatusFilter {
    /// Accepts `404`, class shorthand like `4xx`, or an inclusive range `500-599`.
    pub fn parse(pattern: &str) -> crate::Result<Self> {
        let pattern = pattern.trim();

        if let Some(class) = pattern.strip_suffix("xx")
            && class.len() == 1
            && let Some(digit) = class.chars().next().and_then(|c| c.to_digit(10))
        {
            let start = i64::from(digit) * 100;
            return Ok(StatusFilter::Range(start, start + 99));
        }

        let parse_code = |s: &str, what: &str| {
            s.trim().parse::<i64>().map_err(|_| {
                crate::Error::InvalidPattern(format!("Invalid status {}: {}", what, s))
            })
        };

        if let Some((start, end)) = pattern.split_once('-') {
            let start = parse_code(start, "range start")?;
            let end = parse_code(end, "range end")?;
            if start > end {
                return Err(crate::Error::InvalidPattern(format!(
                    "Status range {} is reversed",
                    pattern
                )));
            }
            return Ok(StatusFilter::Range(start, end));
        }

        parse_code(pattern, "code").map(StatusFilter::Exact)
    }

    pub fn matches(&self, status: i64) -> bool {
        match self {
            StatusFilter::Exact(code) => status == *code,
            StatusFilter::Range(start, end) => (*start..=*end).contains(&status),
        }
    }
}

/// Keep the records accepted by `criteria`, preserving their order.
pub fn filter_records(
    records: Vec<TransactionRecord>,
    criteria: &FilterCriteria,
) -> Vec<TransactionRecord> {
    if criteria.is_empty() {
        return records;
    }

    let before = records.len();
    let kept: Vec<TransactionRecord> = records
        .into_iter()
        .filter(|record| criteria.matches(record))
        .collect();

    tracing::debug!("Filter kept {} of {} records", kept.len(), before);
    kept
}
