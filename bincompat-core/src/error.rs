//! Error types for the diff engine.
//!
//! Configuration mistakes (bad query strings, empty aggregators) fail fast with
//! enough context to fix the offending input. Per-file load failures live in
//! [`crate::loader::LoadError`] and never abort a comparison run.

use thiserror::Error;

/// Which query grammar rejected a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    Method,
    Field,
    Event,
    Type,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Method => "method",
            QueryKind::Field => "field",
            QueryKind::Event => "event",
            QueryKind::Type => "type",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by query parsing, diffing and version decisions.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Invalid {kind} query \"{query}\": {reason}")]
    QuerySyntax {
        kind: QueryKind,
        query: String,
        reason: String,
    },

    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Query \"{query}\" matched {count} members where exactly one was expected")]
    AmbiguousMatch { query: String, count: usize },

    #[error("Invalid semantic version \"{version}\": {source}")]
    Version {
        version: String,
        #[source]
        source: semver::Error,
    },
}

impl DiffError {
    pub(crate) fn syntax(kind: QueryKind, query: &str, reason: impl Into<String>) -> Self {
        DiffError::QuerySyntax {
            kind,
            query: query.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn argument(name: &'static str, reason: impl Into<String>) -> Self {
        DiffError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_names_query() {
        let err = DiffError::syntax(QueryKind::Method, "public void (", "missing name");
        let msg = err.to_string();
        assert!(msg.contains("method"));
        assert!(msg.contains("public void ("));
        assert!(msg.contains("missing name"));
    }

    #[test]
    fn test_ambiguous_match_message() {
        let err = DiffError::AmbiguousMatch {
            query: "public * Foo(*)".to_string(),
            count: 2,
        };
        assert!(err.to_string().contains("matched 2 members"));
    }
}
