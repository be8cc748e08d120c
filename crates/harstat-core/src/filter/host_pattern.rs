use glob::Pattern;

/// Hostname selector: an exact name, or a glob when the pattern holds `*` or `?`.
///
/// Both forms compare case-insensitively.
#[derive(Debug, Clone)]
pub enum HostPattern {
    Exact(String),
    Glob(Pattern),
}

impl HostPattern {
    pub fn parse(pattern: &str) -> crate::Result<Self> {
        let lowered = pattern.trim().to_lowercase();
        if lowered.is_empty() {
            return Err(crate::Error::InvalidPattern(
                "Host pattern cannot be empty".to_string(),
            ));
        }

        if !lowered.contains(['*', '?']) {
            return Ok(HostPattern::Exact(lowered));
        }

        Pattern::new(&lowered).map(HostPattern::Glob).map_err(|e| {
            crate::Error::InvalidPattern(format!("Invalid glob pattern '{}': {}", pattern, e))
        })
    }

    pub fn matches(&self, hostname: &str) -> bool {
        let hostname = hostname.to_lowercase();
        match self {
            HostPattern::Exact(name) => hostname == *name,
            HostPattern::Glob(glob) => glob.matches(&hostname),
        }
    }
}
