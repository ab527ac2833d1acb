//! Modifier tokens at the head of a member query.

use crate::model::Access;

/// Tri-state requirement on a boolean member property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Modifier {
    Required,
    Forbidden,
    #[default]
    DontCare,
}

impl Modifier {
    pub fn accepts(self, actual: bool) -> bool {
        match self {
            Modifier::Required => actual,
            Modifier::Forbidden => !actual,
            Modifier::DontCare => true,
        }
    }
}

/// Modifiers shared by every member query. Multi-word tokens come first.
pub(crate) const COMMON_MODIFIERS: &[&str] = &[
    "protected internal",
    "static",
    "public",
    "protected",
    "internal",
    "private",
];

/// Modifier tokens taken from a query, plus the unparsed remainder.
#[derive(Debug, Default)]
pub(crate) struct ParsedModifiers<'q> {
    found: Vec<(&'static str, Modifier)>,
    pub rest: &'q str,
}

impl<'q> ParsedModifiers<'q> {
    /// The first occurrence of `keyword` (or `!keyword`) wins.
    pub fn get(&self, keyword: &str) -> Modifier {
        self.found
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, m)| *m)
            .unwrap_or_default()
    }

    pub fn access(&self) -> AccessFilter {
        AccessFilter {
            public: self.get("public"),
            protected: self.get("protected"),
            internal: self.get("internal"),
            private: self.get("private"),
            protected_internal: self.get("protected internal"),
        }
    }
}

/// Consume `keyword` (possibly several words) followed by whitespace.
fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let mut rest = input;
    for word in keyword.split(' ') {
        rest = rest.trim_start();
        let after = rest.strip_prefix(word)?;
        if !after.starts_with(char::is_whitespace) {
            return None;
        }
        rest = after;
    }
    Some(rest)
}

/// Split leading modifier tokens from `query`.
///
/// `extra` lists the kind-specific tokens accepted besides [`COMMON_MODIFIERS`].
pub(crate) fn split_modifiers<'q>(query: &'q str, extra: &[&'static str]) -> ParsedModifiers<'q> {
    let mut parsed = ParsedModifiers {
        found: Vec::new(),
        rest: query.trim_start(),
    };

    'tokens: loop {
        let (negated, body) = match parsed.rest.strip_prefix('!') {
            Some(body) => (true, body),
            None => (false, parsed.rest),
        };
        for keyword in COMMON_MODIFIERS.iter().chain(extra.iter()) {
            if let Some(after) = strip_keyword(body, keyword) {
                let modifier = if negated {
                    Modifier::Forbidden
                } else {
                    Modifier::Required
                };
                parsed.found.push((*keyword, modifier));
                parsed.rest = after.trim_start();
                continue 'tokens;
            }
        }
        break;
    }
    parsed
}

/// Requirements on member access, one per access keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessFilter {
    pub public: Modifier,
    pub protected: Modifier,
    pub internal: Modifier,
    pub private: Modifier,
    pub protected_internal: Modifier,
}

impl AccessFilter {
    pub fn accepts(&self, access: Access) -> bool {
        self.public.accepts(access.is_public())
            && self.internal.accepts(access.is_assembly())
            && self.private.accepts(access.is_private())
            && self.protected_internal.accepts(access.is_family_or_assembly())
            && self.protected.accepts(access.is_family())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_accepts() {
        assert!(Modifier::Required.accepts(true));
        assert!(!Modifier::Required.accepts(false));
        assert!(Modifier::Forbidden.accepts(false));
        assert!(Modifier::DontCare.accepts(true));
        assert!(Modifier::DontCare.accepts(false));
    }

    #[test]
    fn test_split_modifiers() {
        let parsed = split_modifiers("public !static void Dispose()", &["virtual"]);
        assert_eq!(parsed.get("public"), Modifier::Required);
        assert_eq!(parsed.get("static"), Modifier::Forbidden);
        assert_eq!(parsed.get("virtual"), Modifier::DontCare);
        assert_eq!(parsed.rest, "void Dispose()");
    }

    #[test]
    fn test_protected_internal_is_one_token() {
        let parsed = split_modifiers("protected   internal int x", &[]);
        assert_eq!(parsed.get("protected internal"), Modifier::Required);
        assert_eq!(parsed.get("protected"), Modifier::DontCare);
        assert_eq!(parsed.rest, "int x");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let parsed = split_modifiers("public !public * *", &[]);
        assert_eq!(parsed.get("public"), Modifier::Required);
    }

    #[test]
    fn test_keyword_prefix_is_not_a_modifier() {
        let parsed = split_modifiers("publicity x", &[]);
        assert_eq!(parsed.get("public"), Modifier::DontCare);
        assert_eq!(parsed.rest, "publicity x");
    }

    #[test]
    fn test_access_filter() {
        let filter = split_modifiers("protected * *", &[]).access();
        assert!(filter.accepts(Access::Protected));
        assert!(!filter.accepts(Access::Public));
        assert!(!filter.accepts(Access::ProtectedInternal));
    }
}
