//! Type-pattern filters for return, parameter and event types.
//!
//! A filter such as `List<int>` is expanded to metadata spelling
//! (``List`1<System.Int32>``) and every contained name gets a leading `*` so
//! namespaces need not be spelled out. `*` matches any sequence; everything
//! else is literal and compared case-insensitively. The whole name must match.

use regex::{Regex, RegexBuilder};

use crate::error::{DiffError, QueryKind, Result};
use crate::typename::{short_to_full, transform_generic_names};

/// Prefix `name` with `*` unless it already starts with one.
pub(crate) fn prepend_star(name: &str) -> String {
    if name.starts_with('*') {
        name.to_string()
    } else {
        format!("*{}", name)
    }
}

/// Wildcard form of a type filter, or `None` when it matches every type.
pub(crate) fn type_wildcard(type_name: &str) -> Option<String> {
    let compact = type_name.replace(' ', "");
    if compact.is_empty() || compact == "*" {
        return None;
    }
    let pattern = if compact.contains('<') {
        transform_generic_names(&compact, prepend_star)
    } else {
        prepend_star(&short_to_full(&compact))
    };
    Some(pattern)
}

/// Compiled type filter.
#[derive(Clone, Debug)]
pub struct TypeFilter {
    pattern: String,
    regex: Regex,
}

impl TypeFilter {
    /// Build a filter; `Ok(None)` means "any type".
    pub fn parse(type_name: &str, kind: QueryKind, query: &str) -> Result<Option<Self>> {
        let Some(pattern) = type_wildcard(type_name) else {
            return Ok(None);
        };
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        // Anchored: `int` must not accept `int[]` or `Nullable<int>`.
        let regex = RegexBuilder::new(&format!("^{}$", body))
            .case_insensitive(true)
            .build()
            .map_err(|e| DiffError::syntax(kind, query, format!("bad type filter: {}", e)))?;
        Ok(Some(Self { pattern, regex }))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, full_name: &str) -> bool {
        self.regex.is_match(full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_filter(type_name: &str) -> TypeFilter {
        TypeFilter::parse(type_name, QueryKind::Method, type_name)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_star_is_no_filter() {
        assert!(TypeFilter::parse("*", QueryKind::Method, "*").unwrap().is_none());
        assert!(TypeFilter::parse(" ", QueryKind::Method, " ").unwrap().is_none());
    }

    #[test]
    fn test_alias_expansion() {
        let f = make_filter("int");
        assert_eq!(f.pattern(), "*System.Int32");
        assert!(f.is_match("System.Int32"));
        assert!(!f.is_match("System.Int64"));
    }

    #[test]
    fn test_generic_filter() {
        let f = make_filter("List<int>");
        assert!(f.is_match("System.Collections.Generic.List`1<System.Int32>"));
        assert!(!f.is_match("System.Collections.Generic.List`1<System.String>"));
        assert!(!f.is_match("System.Collections.Generic.Dictionary`2<System.Int32,System.Int32>"));
    }

    #[test]
    fn test_filter_matches_whole_name() {
        let f = make_filter("int");
        assert!(!f.is_match("System.Int32[]"));
        assert!(!f.is_match("System.Nullable`1<System.Int32>"));

        let f = make_filter("List<int>");
        assert!(!f.is_match(
            "System.Collections.Generic.List`1<System.Collections.Generic.List`1<System.Int32>>"
        ));
        assert!(!f.is_match("System.Collections.Generic.List`1<System.Int32>[]"));
    }

    #[test]
    fn test_generic_wildcard_argument() {
        let f = make_filter("List<*>");
        assert!(f.is_match("System.Collections.Generic.List`1<System.Int32>"));
        assert!(f.is_match("System.Collections.Generic.List`1<Lib.Widget>"));
    }

    #[test]
    fn test_dots_are_literal() {
        let f = make_filter("Lib.Widget");
        assert!(f.is_match("Lib.Widget"));
        assert!(!f.is_match("LibXWidget"));
    }
}
