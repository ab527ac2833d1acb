//! Glob-style wildcard matching for names and type strings.
//!
//! A filter is either `*` (anything), a plain string (exact match), a string
//! with a leading and/or trailing `*` (prefix, suffix or substring match), or
//! a string with an inner `*`, which is compiled to an anchored regex.
//! Compiled patterns live in a [`PatternCache`] shared for the process
//! lifetime.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::RwLock;

/// Compiled wildcard patterns keyed by filter text and case sensitivity.
///
/// Concurrent callers may compile the same pattern twice; the first insert wins.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: RwLock<HashMap<(String, bool), Regex>>,
}

static GLOBAL_CACHE: Lazy<PatternCache> = Lazy::new(PatternCache::new);

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by the query types.
    pub fn global() -> &'static PatternCache {
        &GLOBAL_CACHE
    }

    pub fn len(&self) -> usize {
        self.patterns.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Match `candidate` against `filter`.
    ///
    /// A `None` or `*` filter matches everything; a `None` candidate matches nothing
    /// else.
    pub fn matches(&self, filter: Option<&str>, candidate: Option<&str>, case_sensitive: bool) -> bool {
        let filter = match filter {
            None | Some("*") => return true,
            Some(filter) => filter,
        };
        let candidate = match candidate {
            None => return false,
            Some(candidate) => candidate,
        };

        if needs_regex(filter) {
            return match self.regex_for(filter, case_sensitive) {
                Some(re) => re.is_match(candidate),
                None => false,
            };
        }

        let leading = filter.starts_with('*');
        let trailing = filter.ends_with('*');
        let needle = filter.trim_matches(|c| c == ' ' || c == '*' || c == '\t');

        let (needle, candidate) = if case_sensitive {
            (needle.to_string(), candidate.to_string())
        } else {
            (needle.to_lowercase(), candidate.to_lowercase())
        };

        match (leading, trailing) {
            (true, true) => candidate.contains(&needle),
            (false, true) => candidate.starts_with(&needle),
            (true, false) => candidate.ends_with(&needle),
            (false, false) => candidate == needle,
        }
    }

    fn regex_for(&self, filter: &str, case_sensitive: bool) -> Option<Regex> {
        let key = (filter.to_string(), case_sensitive);
        if let Ok(patterns) = self.patterns.read() {
            if let Some(re) = patterns.get(&key) {
                return Some(re.clone());
            }
        }

        let re = match compile_wildcard(filter, case_sensitive) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!("Failed to compile wildcard filter {:?}: {}", filter, e);
                return None;
            }
        };
        tracing::debug!("Compiled wildcard filter {:?}", filter);

        if let Ok(mut patterns) = self.patterns.write() {
            let entry = patterns.entry(key).or_insert(re);
            return Some(entry.clone());
        }
        None
    }
}

/// An inner `*` (not only at the ends) needs a regex.
fn needs_regex(filter: &str) -> bool {
    let mut inner = filter.chars();
    inner.next();
    inner.next_back();
    filter.chars().count() > 2 && inner.as_str().contains('*')
}

fn compile_wildcard(filter: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    let body = filter
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*?");
    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(!case_sensitive)
        .build()
}

/// Match against the process-wide [`PatternCache`].
pub fn match_with_wildcards(filter: Option<&str>, candidate: Option<&str>, case_sensitive: bool) -> bool {
    PatternCache::global().matches(filter, candidate, case_sensitive)
}
