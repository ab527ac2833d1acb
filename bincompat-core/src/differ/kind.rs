//! Member kinds the type differ compares.
//!
//! Each kind knows how to select its items from a type and when two items are
//! the same member; [`diff_members`] runs the list differ over any of them.

use serde::Serialize;

use super::changes::DiffCollection;
use super::list::diff_collection;
use crate::equivalence::{events_equal, fields_equal, methods_equal, type_references_equal};
use crate::model::{EventNode, FieldNode, MethodNode, TypeNode, TypeReference};
use crate::query::QueryAggregator;

pub trait MemberKind {
    type Item: Clone + Serialize;

    /// Plural label used in reports.
    const LABEL: &'static str;

    fn select<'a>(aggregator: &QueryAggregator, ty: &'a TypeNode) -> Vec<&'a Self::Item>;

    fn equal(a: &Self::Item, b: &Self::Item) -> bool;
}

pub struct Methods;
pub struct Fields;
pub struct Events;
/// Implemented interfaces; compared by reference identity, not queried.
pub struct Interfaces;

impl MemberKind for Methods {
    type Item = MethodNode;
    const LABEL: &'static str = "methods";

    fn select<'a>(aggregator: &QueryAggregator, ty: &'a TypeNode) -> Vec<&'a MethodNode> {
        aggregator.select_methods(ty)
    }

    fn equal(a: &MethodNode, b: &MethodNode) -> bool {
        methods_equal(a, b)
    }
}

impl MemberKind for Fields {
    type Item = FieldNode;
    const LABEL: &'static str = "fields";

    fn select<'a>(aggregator: &QueryAggregator, ty: &'a TypeNode) -> Vec<&'a FieldNode> {
        aggregator.select_fields(ty)
    }

    fn equal(a: &FieldNode, b: &FieldNode) -> bool {
        fields_equal(a, b)
    }
}

impl MemberKind for Events {
    type Item = EventNode;
    const LABEL: &'static str = "events";

    fn select<'a>(aggregator: &QueryAggregator, ty: &'a TypeNode) -> Vec<&'a EventNode> {
        aggregator.select_events(ty)
    }

    fn equal(a: &EventNode, b: &EventNode) -> bool {
        events_equal(a, b)
    }
}

impl MemberKind for Interfaces {
    type Item = TypeReference;
    const LABEL: &'static str = "interfaces";

    fn select<'a>(_aggregator: &QueryAggregator, ty: &'a TypeNode) -> Vec<&'a TypeReference> {
        ty.interfaces.iter().collect()
    }

    fn equal(a: &TypeReference, b: &TypeReference) -> bool {
        type_references_equal(a, b)
    }
}

/// Removed and added members of kind `K` between two versions of a type.
pub fn diff_members<K: MemberKind>(
    aggregator: &QueryAggregator,
    old: &TypeNode,
    new: &TypeNode,
) -> DiffCollection<K::Item> {
    let old_items = K::select(aggregator, old);
    let new_items = K::select(aggregator, new);
    let diff = diff_collection(&old_items, &new_items, K::equal);
    if !diff.is_empty() {
        tracing::debug!(
            ty = %old.full_name(),
            kind = K::LABEL,
            added = diff.added_count(),
            removed = diff.removed_count(),
            "Member changes"
        );
    }
    diff
}
