//! Structural equality rules: "is this the same member in both versions?"
//!
//! Members are compared over a fixed set of semantic attributes (name,
//! signature types, access, modifiers), never by identity. The same rules
//! deduplicate aggregated query results.
//!
//! Generic parameter placeholders (`!0`, `!!T`) compare equal to anything.
//! Readers disagree on how they spell unresolved generic parameters, so the
//! leniency can hide a genuine change of a generic argument.

use crate::model::{EventNode, FieldNode, MethodNode, TypeNode, TypeReference};
use crate::typename::strip_arity;

/// Same type definition: full name and defining scope.
pub fn types_equal(a: &TypeNode, b: &TypeNode) -> bool {
    a.full_name() == b.full_name() && a.scope == b.scope
}

/// Names match ignoring arity, or either side is a placeholder.
fn same_type_name(a: &str, b: &str) -> bool {
    a.starts_with('!') || b.starts_with('!') || strip_arity(a) == strip_arity(b)
}

/// Reference-level type identity, used for interfaces and generic arguments.
pub fn type_references_equal(a: &TypeReference, b: &TypeReference) -> bool {
    let declaring_equal = match (&a.declaring_type, &b.declaring_type) {
        (None, None) => true,
        (Some(x), Some(y)) => type_references_equal(x, y),
        _ => false,
    };

    same_type_name(&a.name, &b.name)
        && a.namespace == b.namespace
        && a.suffix == b.suffix
        && declaring_equal
        && a.scope == b.scope
        && generic_parameters_equal(&a.generic_parameters, &b.generic_parameters)
        // Only instantiated generics carry arguments to compare.
        && (a.generic_arguments.is_empty()
            || b.generic_arguments.is_empty()
            || generic_arguments_equal(&a.generic_arguments, &b.generic_arguments))
}

/// Position-wise equality of generic arguments.
pub fn generic_arguments_equal(a: &[TypeReference], b: &[TypeReference]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| type_references_equal(x, y))
}

/// Position-wise equality of generic parameter names; placeholders match anything.
pub fn generic_parameters_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x == y || x.starts_with('!') || y.starts_with('!'))
}

/// Same method: name, return type, access, modifiers, generic arity and parameter types.
pub fn methods_equal(a: &MethodNode, b: &MethodNode) -> bool {
    a.name == b.name
        && a.return_type.full_name() == b.return_type.full_name()
        && a.parameters.len() == b.parameters.len()
        && a.access == b.access
        && a.is_virtual == b.is_virtual
        && a.is_static == b.is_static
        && a.generic_parameters.len() == b.generic_parameters.len()
        && a
            .parameters
            .iter()
            .zip(&b.parameters)
            .all(|(pa, pb)| pa.parameter_type.full_name() == pb.parameter_type.full_name())
}

/// Same field: access, static, const, readonly, name and type.
pub fn fields_equal(a: &FieldNode, b: &FieldNode) -> bool {
    a.access == b.access
        && a.is_static == b.is_static
        && a.has_constant() == b.has_constant()
        && a.is_init_only == b.is_init_only
        && a.name == b.name
        && a.field_type.full_name() == b.field_type.full_name()
}

/// Same event: name, type and add accessor. The remove accessor is assumed symmetric.
pub fn events_equal(a: &EventNode, b: &EventNode) -> bool {
    a.name == b.name
        && a.event_type.full_name() == b.event_type.full_name()
        && methods_equal(&a.add_method, &b.add_method)
}
