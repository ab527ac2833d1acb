//! Field queries: `[modifiers] <type> <name>`.
//!
//! Besides the access keywords and `static`, fields accept `const`,
//! `readonly` and `nocompilergenerated`. Compiler-generated fields (property
//! backing fields, event delegate fields, special names) are skipped unless
//! the query says `!nocompilergenerated`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::modifiers::{split_modifiers, AccessFilter, Modifier};
use super::type_filter::prepend_star;
use crate::error::{DiffError, QueryKind, Result};
use crate::matcher::match_with_wildcards;
use crate::model::{FieldNode, TypeNode};
use crate::typename::expand_generic_names;

static FIELD_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *(?P<type>[^ ]+(?:<.*>)?) +(?P<name>[^ ]+) *$").unwrap());

const FIELD_MODIFIERS: &[&str] = &["nocompilergenerated", "const", "readonly"];

#[derive(Clone, Debug)]
pub struct FieldQuery {
    query: String,
    access: AccessFilter,
    is_static: Modifier,
    is_const: Modifier,
    is_readonly: Modifier,
    exclude_compiler_generated: bool,
    type_filter: Option<String>,
    name_filter: Option<String>,
}

impl FieldQuery {
    /// Every field except compiler-generated ones.
    pub fn all() -> Self {
        Self {
            query: "* *".to_string(),
            access: AccessFilter::default(),
            is_static: Modifier::DontCare,
            is_const: Modifier::DontCare,
            is_readonly: Modifier::DontCare,
            exclude_compiler_generated: true,
            type_filter: None,
            name_filter: None,
        }
    }

    pub fn all_including_compiler_generated() -> Self {
        Self {
            query: "!nocompilergenerated * *".to_string(),
            exclude_compiler_generated: false,
            ..Self::all()
        }
    }

    fn with_access(query: &str, access: AccessFilter) -> Self {
        Self {
            query: query.to_string(),
            access,
            ..Self::all()
        }
    }

    pub fn public_fields() -> Self {
        Self::with_access(
            "public * *",
            AccessFilter {
                public: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn protected_fields() -> Self {
        Self::with_access(
            "protected * *",
            AccessFilter {
                protected: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn internal_fields() -> Self {
        Self::with_access(
            "internal * *",
            AccessFilter {
                internal: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn private_fields() -> Self {
        Self::with_access(
            "private * *",
            AccessFilter {
                private: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn parse(query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(DiffError::argument("query", "field query string was empty"));
        }

        let modifiers = split_modifiers(query, FIELD_MODIFIERS);
        let caps = FIELD_DEF.captures(modifiers.rest).ok_or_else(|| {
            DiffError::syntax(
                QueryKind::Field,
                query,
                "expected <modifiers> <type> <name>, e.g. public int *",
            )
        })?;

        let type_filter = prepend_star(&expand_generic_names(&caps["type"]));
        let type_filter = (type_filter != "*").then_some(type_filter);
        let name = &caps["name"];
        let name_filter = (name != "*").then(|| name.to_string());

        Ok(Self {
            query: query.to_string(),
            access: modifiers.access(),
            is_static: modifiers.get("static"),
            is_const: modifiers.get("const"),
            is_readonly: modifiers.get("readonly"),
            exclude_compiler_generated: modifiers.get("nocompilergenerated") != Modifier::Forbidden,
            type_filter,
            name_filter,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn matches(&self, owner: &TypeNode, field: &FieldNode) -> bool {
        self.matches_modifiers(field)
            && match_with_wildcards(
                self.type_filter.as_deref(),
                Some(&field.field_type.full_name()),
                false,
            )
            && match_with_wildcards(self.name_filter.as_deref(), Some(&field.name), false)
            && !(self.exclude_compiler_generated && is_compiler_generated(owner, field))
    }

    fn matches_modifiers(&self, field: &FieldNode) -> bool {
        self.is_const.accepts(field.has_constant())
            && self.access.accepts(field.access)
            && self.is_readonly.accepts(field.is_init_only)
            // Constants are static in metadata; `static` here means a static variable.
            && self.is_static.accepts(field.is_static && !field.has_constant())
    }

    pub fn fields<'a>(&self, owner: &'a TypeNode) -> Vec<&'a FieldNode> {
        owner
            .fields
            .iter()
            .filter(|f| self.matches(owner, f))
            .collect()
    }
}

impl std::fmt::Display for FieldQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query)
    }
}

/// Property backing field, event delegate field or other special-name field.
fn is_compiler_generated(owner: &TypeNode, field: &FieldNode) -> bool {
    field.name.ends_with(">k__BackingField")
        || field.is_special_name
        || owner.events.iter().any(|ev| ev.name == field.name)
}
