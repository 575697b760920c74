//! Host allow-list matching.
//!
//! # Responsibilities
//! - Extract the host (with non-default port) from a target URL
//! - Match it against compiled regular expressions (search semantics)
//!
//! # Design Decisions
//! - Empty pattern set = always matches (open mode)
//! - Unparseable URL = never matches (fail closed)
//! - Patterns are unanchored; operators anchor with `^...$` themselves

use regex::Regex;
use url::Url;

/// Returns true if `target_url` may be relayed under `patterns`.
pub fn is_allowed(target_url: &str, patterns: &[Regex]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    match target_host(target_url) {
        Some(host) => patterns.iter().any(|rx| rx.is_match(&host)),
        None => false,
    }
}

/// The `host[:port]` part of a URL, port omitted when it is the scheme default.
fn target_host(target_url: &str) -> Option<String> {
    let url = Url::parse(target_url).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Immutable, shareable allow-list compiled once at startup.
#[derive(Debug, Clone, Default)]
pub struct HostGate {
    patterns: Vec<Regex>,
}

impl HostGate {
    /// Compile the given patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True when no patterns are configured.
    pub fn is_open(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_allowed(&self, target_url: &str) -> bool {
        is_allowed(target_url, &self.patterns)
    }
}
