//! Path exemption filter
//!
//! Paths that match the ignore list are neither captured into a payload
//! record nor relayed. Matching is plain substring containment.

/// Set of path substrings exempt from payload logging.
///
/// Built once at startup and never mutated, so it is shared by every
/// exchange without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    entries: Vec<String>,
}

impl IgnoreList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(Into::into)
            .map(|entry| entry.trim().to_string())
            // an empty entry would be contained in every path
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    /// Parse a comma separated list such as `"health,swagger,metrics"`.
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    /// Whether the request path is exempt from capture.
    ///
    /// The root path `/` is always exempt.
    pub fn is_ignored(&self, path: &str) -> bool {
        path == "/" || self.entries.iter().any(|entry| path.contains(entry.as_str()))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
