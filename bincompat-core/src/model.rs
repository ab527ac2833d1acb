//! Data model for loaded module metadata.
//!
//! These types are the read-only object graph the diff engine works on: a
//! module with its types, and each type with its fields, methods, events,
//! base type and interfaces. Graphs are produced by a [`crate::loader::ModuleLoader`]
//! and never mutated by the diff engine.

use serde::{Deserialize, Serialize};

use crate::typename::{matching_angle, split_top_level, split_type_suffix};

/// Type-level visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
        }
    }
}

/// Kind of type definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
        }
    }
}

/// Member accessibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    #[default]
    Private,
    /// Family.
    Protected,
    /// Assembly.
    Internal,
    /// Family or assembly.
    #[serde(alias = "protected internal")]
    ProtectedInternal,
    /// Family and assembly.
    #[serde(alias = "private protected")]
    PrivateProtected,
}

impl Access {
    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Access::Private)
    }

    pub fn is_family(&self) -> bool {
        matches!(self, Access::Protected)
    }

    pub fn is_assembly(&self) -> bool {
        matches!(self, Access::Internal)
    }

    pub fn is_family_or_assembly(&self) -> bool {
        matches!(self, Access::ProtectedInternal)
    }

    /// C# keyword(s) for this access level.
    pub fn keyword(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
            Access::Protected => "protected",
            Access::Internal => "internal",
            Access::ProtectedInternal => "protected internal",
            Access::PrivateProtected => "private protected",
        }
    }
}

/// A reference to a type, as used by signatures, base types and interfaces.
///
/// Deserializes from either a structured object or a CLR full-name string
/// such as ``System.Collections.Generic.List`1<System.Int32>`` or `Outer/Inner`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeReferenceRepr")]
pub struct TypeReference {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<Box<TypeReference>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,
    /// Array, pointer or by-ref decoration, e.g. `[]` or `&`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub suffix: String,
    /// Name of the module that defines the type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Deserialize)]
struct TypeReferenceFields {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    declaring_type: Option<Box<TypeReference>>,
    #[serde(default)]
    generic_arguments: Vec<TypeReference>,
    #[serde(default)]
    generic_parameters: Vec<String>,
    #[serde(default)]
    suffix: String,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeReferenceRepr {
    Name(String),
    Fields(TypeReferenceFields),
}

impl From<TypeReferenceRepr> for TypeReference {
    fn from(repr: TypeReferenceRepr) -> Self {
        match repr {
            TypeReferenceRepr::Name(name) => TypeReference::parse(&name),
            TypeReferenceRepr::Fields(f) => TypeReference {
                name: f.name,
                namespace: f.namespace,
                declaring_type: f.declaring_type,
                generic_arguments: f.generic_arguments,
                generic_parameters: f.generic_parameters,
                suffix: f.suffix,
                scope: f.scope,
            },
        }
    }
}

impl TypeReference {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    /// `System.Void`.
    pub fn void() -> Self {
        Self::new("System", "Void")
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_generic_argument(mut self, argument: TypeReference) -> Self {
        self.generic_arguments.push(argument);
        self
    }

    /// Parse a CLR full name.
    ///
    /// Handles nesting (`Ns.Outer/Inner`), generic instances
    /// (``Ns.List`1<System.Int32>``) and trailing decorations (`[]`, `&`, `*`).
    pub fn parse(full_name: &str) -> Self {
        let full_name = full_name.trim();
        let (head, arguments, suffix) = match full_name.find('<') {
            Some(open) => {
                let close = matching_angle(full_name, open).unwrap_or(full_name.len());
                let inner = &full_name[open + 1..close.min(full_name.len())];
                let arguments = split_top_level(inner, ',')
                    .into_iter()
                    .map(str::trim)
                    .filter(|arg| !arg.is_empty())
                    .map(TypeReference::parse)
                    .collect();
                let suffix = full_name.get(close + 1..).unwrap_or("");
                (&full_name[..open], arguments, suffix)
            }
            None => {
                let (head, suffix) = split_type_suffix(full_name);
                (head, Vec::new(), suffix)
            }
        };

        let mut segments = head.split('/');
        let outermost = segments.next().unwrap_or("");
        let mut current = Self::from_dotted(outermost);
        for nested in segments {
            current = TypeReference {
                name: nested.to_string(),
                declaring_type: Some(Box::new(current)),
                ..Default::default()
            };
        }
        current.generic_arguments = arguments;
        current.suffix = suffix.to_string();
        current
    }

    fn from_dotted(name: &str) -> Self {
        match name.rfind('.') {
            Some(dot) => Self::new(&name[..dot], &name[dot + 1..]),
            None => Self::new("", name),
        }
    }

    /// Full name without generic arguments or decoration.
    pub fn element_name(&self) -> String {
        match &self.declaring_type {
            Some(declaring) => format!("{}/{}", declaring.element_name(), self.name),
            None if self.namespace.is_empty() => self.name.clone(),
            None => format!("{}.{}", self.namespace, self.name),
        }
    }

    /// CLR full name, including generic arguments and decoration.
    pub fn full_name(&self) -> String {
        let mut out = self.element_name();
        if !self.generic_arguments.is_empty() {
            out.push('<');
            for (i, arg) in self.generic_arguments.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&arg.full_name());
            }
            out.push('>');
        }
        out.push_str(&self.suffix);
        out
    }

    /// Generic parameter placeholder such as `!0` or `!!T`.
    pub fn is_generic_placeholder(&self) -> bool {
        self.name.starts_with('!')
    }
}

impl std::fmt::Display for TypeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// A method parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterNode {
    pub name: String,
    pub parameter_type: TypeReference,
    #[serde(default)]
    pub is_in: bool,
    #[serde(default)]
    pub is_out: bool,
}

impl ParameterNode {
    pub fn new(name: &str, parameter_type: TypeReference) -> Self {
        Self {
            name: name.to_string(),
            parameter_type,
            is_in: false,
            is_out: false,
        }
    }

    pub fn out(mut self) -> Self {
        self.is_out = true;
        self
    }
}

fn default_true() -> bool {
    true
}

/// A method, constructor or accessor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    #[serde(default = "TypeReference::void")]
    pub return_type: TypeReference,
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_virtual: bool,
    /// False for abstract and extern methods.
    #[serde(default = "default_true")]
    pub has_body: bool,
    /// Set on property and event accessors, constructors and operators.
    #[serde(default)]
    pub is_special_name: bool,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
}

impl Default for MethodNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            return_type: TypeReference::void(),
            parameters: Vec::new(),
            access: Access::Private,
            is_static: false,
            is_virtual: false,
            has_body: true,
            is_special_name: false,
            generic_parameters: Vec::new(),
        }
    }
}

impl MethodNode {
    pub fn new(name: &str, return_type: TypeReference, access: Access) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            access,
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterNode) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_virtual(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == ".ctor" || self.name == ".cctor"
    }
}

/// A field, including enum constants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub field_type: TypeReference,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, alias = "readonly")]
    pub is_init_only: bool,
    /// Literal value for `const` fields. An explicit JSON `null` is a
    /// `const` holding null, not a missing value.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub constant: Option<serde_json::Value>,
    #[serde(default)]
    pub is_special_name: bool,
}

impl FieldNode {
    pub fn new(name: &str, field_type: TypeReference, access: Access) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            access,
            ..Default::default()
        }
    }

    pub fn with_constant(mut self, value: serde_json::Value) -> Self {
        self.is_static = true;
        self.constant = Some(value);
        self
    }

    pub fn has_constant(&self) -> bool {
        self.constant.is_some()
    }
}

/// `Some` whenever the key is present, including `null`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// An event with its accessor methods.
///
/// When deserializing, missing accessors are synthesized from an optional
/// `access` (default private), `is_static` and `is_virtual`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EventNodeRepr")]
pub struct EventNode {
    pub name: String,
    pub event_type: TypeReference,
    pub add_method: MethodNode,
    pub remove_method: MethodNode,
}

#[derive(Deserialize)]
struct EventNodeRepr {
    name: String,
    event_type: TypeReference,
    #[serde(default)]
    access: Access,
    #[serde(default)]
    is_static: bool,
    #[serde(default)]
    is_virtual: bool,
    add_method: Option<MethodNode>,
    remove_method: Option<MethodNode>,
}

impl From<EventNodeRepr> for EventNode {
    fn from(repr: EventNodeRepr) -> Self {
        let mut event = EventNode::new(&repr.name, repr.event_type, repr.access);
        for accessor in [&mut event.add_method, &mut event.remove_method] {
            accessor.is_static = repr.is_static;
            accessor.is_virtual = repr.is_virtual;
        }
        if let Some(add) = repr.add_method {
            event.add_method = add;
        }
        if let Some(remove) = repr.remove_method {
            event.remove_method = remove;
        }
        event
    }
}

impl EventNode {
    /// Event with synthesized `add_`/`remove_` accessors of the given access.
    pub fn new(name: &str, event_type: TypeReference, access: Access) -> Self {
        let accessor = |prefix: &str| MethodNode {
            name: format!("{}{}", prefix, name),
            parameters: vec![ParameterNode::new("value", event_type.clone())],
            access,
            is_special_name: true,
            ..Default::default()
        };
        Self {
            name: name.to_string(),
            add_method: accessor("add_"),
            remove_method: accessor("remove_"),
            event_type,
        }
    }
}

/// A type definition within a module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    /// Metadata name, including the arity marker for generic types (``List`1``).
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub base_type: Option<TypeReference>,
    #[serde(default)]
    pub interfaces: Vec<TypeReference>,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
    #[serde(default)]
    pub events: Vec<EventNode>,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    /// Enclosing type for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeReference>,
    #[serde(default)]
    pub is_special_name: bool,
    #[serde(default)]
    pub custom_attributes: Vec<String>,
    /// Defining module, stamped by [`ModuleGraph::normalize`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TypeNode {
    pub fn new(namespace: &str, name: &str, kind: TypeKind, visibility: Visibility) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind,
            visibility,
            ..Default::default()
        }
    }

    pub fn with_base(mut self, base: TypeReference) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn with_interface(mut self, interface: TypeReference) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_method(mut self, method: MethodNode) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: FieldNode) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_event(mut self, event: EventNode) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn nested_in(mut self, declaring: TypeReference) -> Self {
        self.declaring_type = Some(declaring);
        self
    }

    /// CLR full name (`Ns.Name`, or `Ns.Outer/Inner` for nested types).
    pub fn full_name(&self) -> String {
        match &self.declaring_type {
            Some(declaring) => format!("{}/{}", declaring.element_name(), self.name),
            None if self.namespace.is_empty() => self.name.clone(),
            None => format!("{}.{}", self.namespace, self.name),
        }
    }

    /// Namespace of the outermost declaring type; nested types carry none of their own.
    pub fn effective_namespace(&self) -> &str {
        if !self.namespace.is_empty() {
            return &self.namespace;
        }
        let mut current = self.declaring_type.as_ref();
        while let Some(declaring) = current {
            if !declaring.namespace.is_empty() {
                return &declaring.namespace;
            }
            current = declaring.declaring_type.as_deref();
        }
        ""
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Compiler-synthesized type: special name, `<Module>`, or marked `CompilerGenerated`.
    pub fn is_compiler_generated(&self) -> bool {
        self.is_special_name
            || self.name == "<Module>"
            || self
                .custom_attributes
                .iter()
                .any(|attr| attr.ends_with("CompilerGeneratedAttribute"))
    }
}

/// A loaded module: the unit a loader produces from one file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleGraph {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Names of referenced modules.
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeNode>,
}

impl ModuleGraph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, ty: TypeNode) -> Self {
        self.types.push(ty);
        self
    }

    /// Stamp this module's name as the scope of every type that has none.
    pub fn normalize(mut self) -> Self {
        for ty in &mut self.types {
            if ty.scope.is_none() {
                ty.scope = Some(self.name.clone());
            }
        }
        self
    }

    pub fn find_type(&self, full_name: &str) -> Option<&TypeNode> {
        self.types.iter().find(|t| t.full_name() == full_name)
    }
}
