//! HAR 1.2 document model.
//!
//! Only the parts of the archive that feed transaction records are modelled.
//! Unknown fields are ignored and most optional sections default, so captures
//! exported by browsers that omit `cookies`, `queryString` or `cache` still load.

use serde::{Deserialize, Serialize};

/// Top-level HAR object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Har {
    pub log: Log,
}

/// Main HAR log object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    pub version: String,
    pub creator: Creator,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub version: String,
}

/// One captured request/response exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Present in HAR files exported by some proxies; used as the record id when set.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub started_date_time: String,
    /// Total elapsed time of the request in milliseconds
    pub time: f64,
    pub request: Request,
    pub response: Response,
    #[serde(default)]
    pub timings: Timings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    /// -1 when unknown
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: i64,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub content: Content,
    /// -1 when unknown
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub size: i64,
    #[serde(default)]
    pub mime_type: String,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            size: unknown_size(),
            mime_type: String::new(),
        }
    }
}

/// Phase timings in milliseconds; -1 marks a phase that does not apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "not_applicable")]
    pub send: f64,
    #[serde(default = "not_applicable")]
    pub wait: f64,
    #[serde(default = "not_applicable")]
    pub receive: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            send: not_applicable(),
            wait: not_applicable(),
            receive: not_applicable(),
        }
    }
}

fn unknown_size() -> i64 {
    -1
}

fn not_applicable() -> f64 {
    -1.0
}
