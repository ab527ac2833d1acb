//! Type queries: select type definitions by visibility, kind, namespace and name.
//!
//! The textual form is a `;`-separated list, each entry
//! `[api|nocompiler|public|internal|class|struct|interface|enum]* <Namespace.TypeName>`,
//! where the namespace and the name may contain `*` wildcards.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{DiffError, QueryKind, Result};
use crate::matcher::match_with_wildcards;
use crate::model::{ModuleGraph, TypeKind, TypeNode};
use crate::typename::split_top_level;

static TYPE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^ *(?P<mods>(?:(?:api|nocompiler|public|internal|class|struct|interface|enum) +)*) *(?P<name>[^ ]+) *$",
    )
    .unwrap()
});

/// Bit flags selecting which type definitions a [`TypeQuery`] accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeQueryMode(u8);

impl TypeQueryMode {
    pub const NONE: Self = Self(0);
    pub const PUBLIC: Self = Self(1);
    pub const INTERNAL: Self = Self(2);
    pub const NOT_COMPILER_GENERATED: Self = Self(4);
    pub const INTERFACE: Self = Self(8);
    pub const CLASS: Self = Self(16);
    pub const VALUE_TYPE: Self = Self(32);
    pub const ENUM: Self = Self(64);
    const ALL_KINDS: Self = Self(8 | 16 | 32 | 64);
    /// Public, non-compiler-generated types of every kind.
    pub const API_RELEVANT: Self = Self(1 | 4 | 8 | 16 | 32 | 64);
    /// Public and internal types of every kind.
    pub const ALL: Self = Self(1 | 2 | 8 | 16 | 32 | 64);

    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when every flag of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn has_any(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "public" => Self::PUBLIC,
            "internal" => Self::INTERNAL,
            "class" => Self::CLASS,
            "interface" => Self::INTERFACE,
            "struct" => Self::VALUE_TYPE,
            "enum" => Self::ENUM,
            "nocompiler" => Self::NOT_COMPILER_GENERATED,
            "api" => Self::API_RELEVANT,
            _ => Self::NONE,
        }
    }

    /// Fill in "any visibility" and "any kind" when none is given.
    fn completed(self) -> Self {
        let mut mode = self;
        if !mode.has_any(Self::PUBLIC | Self::INTERNAL) {
            mode |= Self::PUBLIC | Self::INTERNAL;
        }
        if !mode.has_any(Self::ALL_KINDS) {
            mode |= Self::ALL_KINDS;
        }
        mode
    }
}

impl BitOr for TypeQueryMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TypeQueryMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A filter over the type definitions of a module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeQuery {
    mode: TypeQueryMode,
    namespace_filter: Option<String>,
    name_filter: Option<String>,
}

impl Default for TypeQuery {
    fn default() -> Self {
        Self::new(TypeQueryMode::ALL)
    }
}

impl TypeQuery {
    pub fn new(mode: TypeQueryMode) -> Self {
        Self {
            mode: mode.completed(),
            namespace_filter: None,
            name_filter: None,
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace_filter = Some(namespace.to_string());
        self
    }

    /// Set the type name filter. `Name<T,U>` is stored as ``Name`2``.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name_filter = Some(generic_arity_name(name));
        self
    }

    pub fn mode(&self) -> TypeQueryMode {
        self.mode
    }

    /// Replace the search mode; it must name a visibility and a kind.
    pub fn set_mode(&mut self, mode: TypeQueryMode) -> Result<()> {
        if !mode.has_any(TypeQueryMode::PUBLIC | TypeQueryMode::INTERNAL) {
            return Err(DiffError::argument(
                "mode",
                "must include PUBLIC and/or INTERNAL to find anything",
            ));
        }
        if !mode.has_any(TypeQueryMode::ALL_KINDS) {
            return Err(DiffError::argument(
                "mode",
                "must include at least one of CLASS, INTERFACE, VALUE_TYPE or ENUM",
            ));
        }
        self.mode = mode;
        Ok(())
    }

    pub fn namespace_filter(&self) -> Option<&str> {
        self.namespace_filter.as_deref()
    }

    pub fn name_filter(&self) -> Option<&str> {
        self.name_filter.as_deref()
    }

    pub fn matches(&self, ty: &TypeNode) -> bool {
        if !self.matches_visibility(ty) {
            return false;
        }
        if self.mode.contains(TypeQueryMode::NOT_COMPILER_GENERATED) && ty.is_compiler_generated() {
            return false;
        }
        if !match_with_wildcards(
            self.namespace_filter.as_deref(),
            Some(ty.effective_namespace()),
            false,
        ) {
            return false;
        }
        if !match_with_wildcards(self.name_filter.as_deref(), Some(&ty.name), false) {
            return false;
        }
        self.matches_kind(ty)
    }

    fn matches_visibility(&self, ty: &TypeNode) -> bool {
        (self.mode.contains(TypeQueryMode::PUBLIC) && ty.is_public())
            || (self.mode.contains(TypeQueryMode::INTERNAL) && !ty.is_public())
    }

    fn matches_kind(&self, ty: &TypeNode) -> bool {
        let flag = match ty.kind {
            TypeKind::Interface => TypeQueryMode::INTERFACE,
            TypeKind::Class => TypeQueryMode::CLASS,
            TypeKind::Struct => TypeQueryMode::VALUE_TYPE,
            TypeKind::Enum => TypeQueryMode::ENUM,
        };
        self.mode.contains(flag)
    }

    /// Matching types of `module`, in module order.
    pub fn types<'a>(&self, module: &'a ModuleGraph) -> Vec<&'a TypeNode> {
        module.types.iter().filter(|t| self.matches(t)).collect()
    }

    /// Parse a `;`-separated query list.
    ///
    /// Entries without modifiers use `default_mode`.
    pub fn parse_list(queries: &str, default_mode: TypeQueryMode) -> Result<Vec<TypeQuery>> {
        let trimmed = queries.trim();
        if trimmed.is_empty() {
            return Err(DiffError::argument("type_queries", "type query list was empty"));
        }

        trimmed
            .split(';')
            .filter(|q| !q.trim().is_empty())
            .map(|q| Self::parse_one(q, default_mode))
            .collect()
    }

    fn parse_one(query: &str, default_mode: TypeQueryMode) -> Result<TypeQuery> {
        let caps = TYPE_QUERY.captures(query).ok_or_else(|| {
            DiffError::syntax(
                QueryKind::Type,
                query,
                "expected [public|internal|class|interface|struct|enum|nocompiler|api] typename",
            )
        })?;

        let mut mode = caps["mods"]
            .split_whitespace()
            .map(TypeQueryMode::from_keyword)
            .fold(TypeQueryMode::NONE, |acc, m| acc | m);
        if mode == TypeQueryMode::NONE {
            mode = default_mode;
        }

        let (namespace, name) = split_namespace(&caps["name"]);
        let mut type_query = TypeQuery::new(mode).with_name(name);
        if let Some(namespace) = namespace {
            type_query = type_query.with_namespace(namespace);
        }
        Ok(type_query)
    }
}

/// Split `Ns.Sub.Name<T>` at the last `.` before any generic argument list.
fn split_namespace(full: &str) -> (Option<&str>, &str) {
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind('.') {
        Some(dot) => (Some(&full[..dot]), &full[dot + 1..]),
        None => (None, full),
    }
}

/// `Name<T,U>` becomes ``Name`2``; other names are returned as-is.
fn generic_arity_name(name: &str) -> String {
    let Some(open) = name.find('<') else {
        return name.to_string();
    };
    let close = name.rfind('>').filter(|c| *c > open).unwrap_or(name.len());
    let arity = split_top_level(&name[open + 1..close], ',').len();
    format!("{}`{}", &name[..open], arity)
}
