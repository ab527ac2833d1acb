//! Event queries: `[modifiers] [event] <type> <name>`.
//!
//! Modifiers are checked against the event's add accessor.

use once_cell::sync::Lazy;
use regex::Regex;

use super::modifiers::{split_modifiers, AccessFilter, Modifier};
use super::type_filter::prepend_star;
use crate::error::{DiffError, QueryKind, Result};
use crate::matcher::match_with_wildcards;
use crate::model::{EventNode, TypeNode};
use crate::typename::expand_generic_names;

static EVENT_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *(?P<type>[^ ]+(?:<.*>)?) +(?P<name>[^ ]+) *$").unwrap());

const EVENT_MODIFIERS: &[&str] = &["virtual", "event"];

#[derive(Clone, Debug)]
pub struct EventQuery {
    query: String,
    access: AccessFilter,
    is_static: Modifier,
    is_virtual: Modifier,
    type_filter: Option<String>,
    name_filter: Option<String>,
}

impl EventQuery {
    pub fn all() -> Self {
        Self {
            query: "*".to_string(),
            access: AccessFilter::default(),
            is_static: Modifier::DontCare,
            is_virtual: Modifier::DontCare,
            type_filter: None,
            name_filter: None,
        }
    }

    fn with_access(query: &str, access: AccessFilter) -> Self {
        Self {
            query: query.to_string(),
            access,
            ..Self::all()
        }
    }

    pub fn public_events() -> Self {
        Self::with_access(
            "public * *",
            AccessFilter {
                public: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn protected_events() -> Self {
        Self::with_access(
            "protected * *",
            AccessFilter {
                protected: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn internal_events() -> Self {
        Self::with_access(
            "internal * *",
            AccessFilter {
                internal: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn parse(query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(DiffError::argument("query", "event query string was empty"));
        }
        if query.trim() == "*" {
            return Ok(Self::all());
        }

        let modifiers = split_modifiers(query, EVENT_MODIFIERS);
        let caps = EVENT_DEF.captures(modifiers.rest).ok_or_else(|| {
            DiffError::syntax(
                QueryKind::Event,
                query,
                "expected <modifiers> <type> <name>, e.g. public EventHandler *",
            )
        })?;

        // `EventHandler<Args>` should match `System.EventHandler`1<Lib.Args>`.
        let expanded = expand_generic_names(&caps["type"])
            .replace('<', "<*")
            .replace("**", "*");
        let type_filter = prepend_star(&expanded);
        let type_filter = (type_filter != "*").then_some(type_filter);
        let name = &caps["name"];
        let name_filter = (name != "*").then(|| name.to_string());

        Ok(Self {
            query: query.to_string(),
            access: modifiers.access(),
            is_static: modifiers.get("static"),
            is_virtual: modifiers.get("virtual"),
            type_filter,
            name_filter,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn matches(&self, event: &EventNode) -> bool {
        let add = &event.add_method;
        self.access.accepts(add.access)
            && self.is_virtual.accepts(add.is_virtual)
            && self.is_static.accepts(add.is_static)
            && match_with_wildcards(self.name_filter.as_deref(), Some(&event.name), false)
            && match_with_wildcards(
                self.type_filter.as_deref(),
                Some(&event.event_type.full_name()),
                false,
            )
    }

    pub fn events<'a>(&self, owner: &'a TypeNode) -> Vec<&'a EventNode> {
        owner.events.iter().filter(|e| self.matches(e)).collect()
    }
}

impl std::fmt::Display for EventQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Access, TypeKind, TypeReference, Visibility};

    fn make_type() -> TypeNode {
        let mut virtual_event = EventNode::new(
            "Closing",
            TypeReference::parse("System.EventHandler`1<Lib.ClosingArgs>"),
            Access::Public,
        );
        virtual_event.add_method.is_virtual = true;

        TypeNode::new("Lib", "Window", TypeKind::Class, Visibility::Public)
            .with_event(EventNode::new(
                "Opened",
                TypeReference::new("System", "EventHandler"),
                Access::Public,
            ))
            .with_event(virtual_event)
            .with_event(EventNode::new(
                "Moved",
                TypeReference::new("System", "EventHandler"),
                Access::Protected,
            ))
    }

    fn names(query: &EventQuery, ty: &TypeNode) -> Vec<String> {
        query.events(ty).iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_access_presets() {
        let ty = make_type();
        assert_eq!(names(&EventQuery::public_events(), &ty), vec!["Opened", "Closing"]);
        assert_eq!(names(&EventQuery::protected_events(), &ty), vec!["Moved"]);
        assert_eq!(EventQuery::all().events(&ty).len(), 3);
    }

    #[test]
    fn test_virtual_modifier_uses_add_accessor() {
        let ty = make_type();
        let q = EventQuery::parse("public virtual event * *").unwrap();
        assert_eq!(names(&q, &ty), vec!["Closing"]);
        let q = EventQuery::parse("!virtual * *").unwrap();
        assert_eq!(names(&q, &ty), vec!["Opened", "Moved"]);
    }

    #[test]
    fn test_generic_event_type() {
        let ty = make_type();
        let q = EventQuery::parse("EventHandler<ClosingArgs> *").unwrap();
        assert_eq!(names(&q, &ty), vec!["Closing"]);
        let q = EventQuery::parse("* Op*").unwrap();
        assert_eq!(names(&q, &ty), vec!["Opened"]);
    }

    #[test]
    fn test_malformed_query() {
        assert!(matches!(
            EventQuery::parse("public"),
            Err(DiffError::QuerySyntax { kind: QueryKind::Event, .. })
        ));
    }
}
