use super::types::Har;
use crate::{Error, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct HarReader;

impl HarReader {
    /// Read and parse a HAR file from the given path
    pub fn from_file(path: &Path) -> Result<Har> {
        tracing::debug!("Reading HAR file from: {}", path.display());

        let file = File::open(path)?;
        let har: Har = serde_json::from_reader(BufReader::new(file))?;

        tracing::info!("Loaded {} entries from {}", har.log.entries.len(), path.display());

        Ok(har)
    }

    /// Parse a HAR document held in memory
    pub fn from_str(content: &str) -> Result<Har> {
        let har: Har = serde_json::from_str(content)?;
        tracing::debug!("Parsed HAR string with {} entries", har.log.entries.len());
        Ok(har)
    }

    /// Check the fields every transaction record depends on.
    ///
    /// An archive without entries is valid here; rejecting it is left to the
    /// report composer, which reports it as an empty session. URLs are not
    /// checked either: an unusable one, empty included, is handled by the
    /// report's URL policy.
    pub fn validate(har: &Har) -> Result<()> {
        if har.log.version.is_empty() {
            return Err(Error::InvalidStructure("Missing HAR version".to_string()));
        }

        for (idx, entry) in har.log.entries.iter().enumerate() {
            if entry.request.method.is_empty() {
                return Err(Error::InvalidStructure(format!(
                    "Entry {} has empty request method",
                    idx
                )));
            }
            if !entry.time.is_finite() {
                return Err(Error::InvalidStructure(format!(
                    "Entry {} has a non-finite time",
                    idx
                )));
            }
        }

        Ok(())
    }
}
