//! Method queries: `[modifiers] <returnType> <name>(<args>)`.
//!
//! Examples:
//!
//! - `*` matches every method
//! - `public * *(*)` matches all public methods
//! - `public void Dispose()` matches a parameterless `Dispose`
//! - `protected * *(* a)` matches protected methods with one parameter named like `*a`
//! - `!static public virtual * *(*)` matches public virtual instance methods

use once_cell::sync::Lazy;
use regex::Regex;

use super::modifiers::{split_modifiers, AccessFilter, Modifier};
use super::type_filter::{prepend_star, TypeFilter};
use crate::equivalence::methods_equal;
use crate::error::{DiffError, QueryKind, Result};
use crate::matcher::match_with_wildcards;
use crate::model::{MethodNode, TypeNode};
use crate::typename::{split_top_level, strip_arity};

static METHOD_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<ret>.*<.*>(?: *\[\])?|[^ ()]*(?: *\[\])?) +(?P<name>.+)\( *(?P<args>.*?) *\) *$",
    )
    .unwrap()
});

const METHOD_MODIFIERS: &[&str] = &["virtual"];

/// Filter on one positional parameter.
#[derive(Clone, Debug)]
struct ArgumentFilter {
    type_filter: Option<TypeFilter>,
    name_filter: String,
}

impl ArgumentFilter {
    fn matches(&self, type_name: &str, name: &str) -> bool {
        self.type_filter
            .as_ref()
            .map_or(true, |f| f.is_match(type_name))
            && match_with_wildcards(Some(&self.name_filter), Some(name), false)
    }
}

/// A parsed method query.
#[derive(Clone, Debug)]
pub struct MethodQuery {
    query: String,
    access: AccessFilter,
    is_static: Modifier,
    is_virtual: Modifier,
    name_filter: Option<String>,
    return_type: Option<TypeFilter>,
    /// `None` accepts any parameter list.
    arguments: Option<Vec<ArgumentFilter>>,
}

impl MethodQuery {
    /// Matches every method.
    pub fn all() -> Self {
        Self {
            query: "*".to_string(),
            access: AccessFilter::default(),
            is_static: Modifier::DontCare,
            is_virtual: Modifier::DontCare,
            name_filter: None,
            return_type: None,
            arguments: None,
        }
    }

    fn with_access(query: &str, access: AccessFilter) -> Self {
        Self {
            query: query.to_string(),
            access,
            ..Self::all()
        }
    }

    pub fn public_methods() -> Self {
        Self::with_access(
            "public * *(*)",
            AccessFilter {
                public: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn protected_methods() -> Self {
        Self::with_access(
            "protected * *(*)",
            AccessFilter {
                protected: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn internal_methods() -> Self {
        Self::with_access(
            "internal * *(*)",
            AccessFilter {
                internal: Modifier::Required,
                ..Default::default()
            },
        )
    }

    pub fn private_methods() -> Self {
        Self::with_access(
            "private * *(*)",
            AccessFilter {
                private: Modifier::Required,
                ..Default::default()
            },
        )
    }

    /// Parse a method query string.
    pub fn parse(query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(DiffError::argument("query", "method query string was empty"));
        }
        if query.trim() == "*" {
            return Ok(Self::all());
        }

        let modifiers = split_modifiers(query, METHOD_MODIFIERS);
        let caps = METHOD_DEF.captures(modifiers.rest.trim_end()).ok_or_else(|| {
            DiffError::syntax(
                QueryKind::Method,
                query,
                "expected <modifiers> <return type> <name>(<arguments>), e.g. public void F(*)",
            )
        })?;

        let return_type = TypeFilter::parse(&caps["ret"], QueryKind::Method, query)?;

        let name = &caps["name"];
        let name = name.split('<').next().unwrap_or(name).trim();
        let name_filter = (!name.is_empty()).then(|| name.to_string());

        let arguments = parse_arguments(&caps["args"], query)?;

        tracing::debug!("Parsed method query {:?}", query);
        Ok(Self {
            query: query.to_string(),
            access: modifiers.access(),
            is_static: modifiers.get("static"),
            is_virtual: modifiers.get("virtual"),
            name_filter,
            return_type,
            arguments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Does `method`, declared on `owner`, satisfy this query?
    pub fn matches(&self, owner: &TypeNode, method: &MethodNode) -> bool {
        self.matches_modifiers(method)
            && self.matches_name(owner, method)
            && self.matches_return_type(method)
            && self.matches_arguments(method)
            && !is_event_accessor(owner, method)
    }

    fn matches_modifiers(&self, method: &MethodNode) -> bool {
        self.access.accepts(method.access)
            && self.is_virtual.accepts(method.is_virtual)
            && self.is_static.accepts(method.is_static)
    }

    fn matches_name(&self, owner: &TypeNode, method: &MethodNode) -> bool {
        // Constructors match by their type's name.
        let name = if method.name == ".ctor" {
            strip_arity(&owner.name)
        } else {
            method.name.as_str()
        };
        match_with_wildcards(self.name_filter.as_deref(), Some(name), false)
    }

    fn matches_return_type(&self, method: &MethodNode) -> bool {
        self.return_type
            .as_ref()
            .map_or(true, |f| f.is_match(&method.return_type.full_name()))
    }

    fn matches_arguments(&self, method: &MethodNode) -> bool {
        let Some(filters) = &self.arguments else {
            return true;
        };
        filters.len() == method.parameters.len()
            && filters.iter().zip(&method.parameters).all(|(filter, param)| {
                filter.matches(&param.parameter_type.full_name(), &param.name)
            })
    }

    /// All methods (constructors included) of `owner` matching this query.
    pub fn methods<'a>(&self, owner: &'a TypeNode) -> Vec<&'a MethodNode> {
        owner
            .methods
            .iter()
            .filter(|m| self.matches(owner, m))
            .collect()
    }

    /// The one matching method, `None` if there is none.
    pub fn single_method<'a>(&self, owner: &'a TypeNode) -> Result<Option<&'a MethodNode>> {
        let mut found = self.methods(owner);
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            count => Err(DiffError::AmbiguousMatch {
                query: self.query.clone(),
                count,
            }),
        }
    }
}

impl std::fmt::Display for MethodQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query)
    }
}

/// Accessor methods belong to their event, not the plain method list.
fn is_event_accessor(owner: &TypeNode, method: &MethodNode) -> bool {
    method.is_special_name
        && owner.events.iter().any(|ev| {
            methods_equal(&ev.add_method, method) || methods_equal(&ev.remove_method, method)
        })
}

/// Parse the text between the parentheses.
///
/// `*` accepts any parameter list, an empty string only parameterless methods.
fn parse_arguments(args: &str, query: &str) -> Result<Option<Vec<ArgumentFilter>>> {
    let args = args.trim();
    if args == "*" {
        return Ok(None);
    }
    if args.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let mut filters = Vec::new();
    for arg in split_top_level(args, ',') {
        let arg = arg.trim();
        let Some(split) = last_top_level_space(arg) else {
            return Err(DiffError::syntax(
                QueryKind::Method,
                query,
                format!("argument \"{}\" must be written as <type> <name>", arg),
            ));
        };
        let mut type_name = arg[..split].trim().to_string();
        let mut name = arg[split..].trim();

        // `int [] values`: brackets written after the type belong to it.
        if name.starts_with('[') {
            if let Some(close) = name.rfind(']') {
                type_name.push_str(&name[..=close]);
                name = &name[close + 1..];
            }
        }
        // `int values[]`
        if let Some(open) = name.find('[') {
            type_name.push_str(&name[open..]);
            name = &name[..open];
        }
        let name = name.trim_matches(|c| c == '[' || c == ']' || c == ',' || c == ' ');

        filters.push(ArgumentFilter {
            type_filter: TypeFilter::parse(&type_name, QueryKind::Method, query)?,
            name_filter: prepend_star(name),
        });
    }
    Ok(Some(filters))
}

/// Byte offset of the last space outside `<...>`.
fn last_top_level_space(arg: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut last = None;
    for (idx, c) in arg.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ' ' | '\t' if depth == 0 => last = Some(idx),
            _ => {}
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Access, EventNode, ParameterNode, TypeKind, TypeReference, Visibility};

    fn make_type() -> TypeNode {
        TypeNode::new("Lib", "Widget", TypeKind::Class, Visibility::Public)
            .with_method(
                MethodNode::new("Render", TypeReference::void(), Access::Public).with_virtual(true),
            )
            .with_method(MethodNode::new("Dispose", TypeReference::void(), Access::Public))
            .with_method(
                MethodNode::new("Count", TypeReference::new("System", "Int32"), Access::Protected)
                    .with_parameter(ParameterNode::new(
                        "items",
                        TypeReference::parse("System.Collections.Generic.List`1<System.String>"),
                    )),
            )
            .with_method(
                MethodNode::new("Create", TypeReference::new("Lib", "Widget"), Access::Private)
                    .with_static(true),
            )
            .with_method(MethodNode::new(".ctor", TypeReference::void(), Access::Public))
    }

    fn names(query: &MethodQuery, ty: &TypeNode) -> Vec<String> {
        query.methods(ty).iter().map(|m| m.name.clone()).collect()
    }

    #[test]
    fn test_star_matches_all() {
        let ty = make_type();
        assert_eq!(MethodQuery::parse("*").unwrap().methods(&ty).len(), 5);
        assert_eq!(MethodQuery::all().methods(&ty).len(), 5);
    }

    #[test]
    fn test_public_virtual() {
        let ty = make_type();
        let q = MethodQuery::parse("public virtual * *(*)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Render"]);
    }

    #[test]
    fn test_negated_virtual() {
        let ty = make_type();
        let q = MethodQuery::parse("public !virtual * *(*)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Dispose", ".ctor"]);
    }

    #[test]
    fn test_exact_signature() {
        let ty = make_type();
        let q = MethodQuery::parse("public void Dispose()").unwrap();
        assert_eq!(names(&q, &ty), vec!["Dispose"]);
        assert!(q.single_method(&ty).unwrap().is_some());
    }

    #[test]
    fn test_constructor_matches_type_name() {
        let ty = make_type();
        let q = MethodQuery::parse("public * Widget()").unwrap();
        assert_eq!(names(&q, &ty), vec![".ctor"]);
    }

    #[test]
    fn test_generic_argument_filter() {
        let ty = make_type();
        let q = MethodQuery::parse("protected int Count(List<string> items)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Count"]);

        let q = MethodQuery::parse("* *(List<int> items)").unwrap();
        assert!(q.methods(&ty).is_empty());

        let q = MethodQuery::parse("* *(List<*> *)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Count"]);
    }

    #[test]
    fn test_static_and_private_presets() {
        let ty = make_type();
        assert_eq!(names(&MethodQuery::private_methods(), &ty), vec!["Create"]);
        assert_eq!(names(&MethodQuery::protected_methods(), &ty), vec!["Count"]);
        let q = MethodQuery::parse("static * *(*)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Create"]);
    }

    #[test]
    fn test_single_method_ambiguous() {
        let ty = make_type();
        let err = MethodQuery::public_methods().single_method(&ty).unwrap_err();
        assert!(matches!(err, DiffError::AmbiguousMatch { count: 3, .. }));
        assert!(MethodQuery::parse("* Missing(*)")
            .unwrap()
            .single_method(&ty)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_event_accessors_excluded() {
        let ev = EventNode::new("Changed", TypeReference::new("System", "EventHandler"), Access::Public);
        let ty = make_type()
            .with_method(ev.add_method.clone())
            .with_method(ev.remove_method.clone())
            .with_event(ev);
        assert_eq!(MethodQuery::public_methods().methods(&ty).len(), 3);
    }

    #[test]
    fn test_malformed_queries() {
        assert!(matches!(
            MethodQuery::parse("public void"),
            Err(DiffError::QuerySyntax { .. })
        ));
        assert!(matches!(
            MethodQuery::parse("void F(int)"),
            Err(DiffError::QuerySyntax { .. })
        ));
        assert!(matches!(
            MethodQuery::parse("  "),
            Err(DiffError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_return_and_argument_types_match_exactly() {
        let list_of_int = TypeReference::parse("System.Collections.Generic.List`1<System.Int32>");
        let nested_list = TypeReference::parse(
            "System.Collections.Generic.List`1<System.Collections.Generic.List`1<System.Int32>>",
        );
        let ty = TypeNode::new("Lib", "A", TypeKind::Class, Visibility::Public)
            .with_method(MethodNode::new("Plain", TypeReference::parse("System.Int32"), Access::Public))
            .with_method(MethodNode::new("Arr", TypeReference::parse("System.Int32[]"), Access::Public))
            .with_method(MethodNode::new(
                "Nullable",
                TypeReference::parse("System.Nullable`1<System.Int32>"),
                Access::Public,
            ))
            .with_method(
                MethodNode::new("Flat", TypeReference::void(), Access::Public)
                    .with_parameter(ParameterNode::new("x", list_of_int)),
            )
            .with_method(
                MethodNode::new("Nested", TypeReference::void(), Access::Public)
                    .with_parameter(ParameterNode::new("x", nested_list)),
            );

        let q = MethodQuery::parse("public int *(*)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Plain"]);

        let q = MethodQuery::parse("* *(List<int> x)").unwrap();
        assert_eq!(names(&q, &ty), vec!["Flat"]);
    }

    #[test]
    fn test_array_brackets_after_name() {
        let ty = TypeNode::new("Lib", "A", TypeKind::Class, Visibility::Public).with_method(
            MethodNode::new("Sum", TypeReference::void(), Access::Public)
                .with_parameter(ParameterNode::new("values", TypeReference::parse("System.Int32[]"))),
        );
        let q = MethodQuery::parse("* * Sum(int values[])").unwrap();
        assert_eq!(q.methods(&ty).len(), 1);
    }
}
