//! Differences between two versions of one type.

use serde::Serialize;

use super::changes::{DiffCollection, DiffSummary};
use super::kind::{diff_members, Events, Fields, Interfaces, Methods};
use crate::error::{DiffError, Result};
use crate::model::{EventNode, FieldNode, MethodNode, TypeNode, TypeReference};
use crate::query::QueryAggregator;

/// Member-level changes of a type present in both versions.
///
/// Only produced when something changed; [`TypeDiff::compute`] returns
/// `None` for an unchanged type.
#[derive(Clone, Debug, Serialize)]
pub struct TypeDiff {
    pub full_name: String,
    #[serde(skip)]
    pub old_type: TypeNode,
    #[serde(skip)]
    pub new_type: TypeNode,
    pub base_type_changed: bool,
    pub interfaces: DiffCollection<TypeReference>,
    pub fields: DiffCollection<FieldNode>,
    pub methods: DiffCollection<MethodNode>,
    pub events: DiffCollection<EventNode>,
}

impl TypeDiff {
    /// Compare two versions of a type through the aggregator's member queries.
    ///
    /// Fails when the aggregator has no field or method queries configured.
    pub fn compute(
        old: &TypeNode,
        new: &TypeNode,
        aggregator: &QueryAggregator,
    ) -> Result<Option<TypeDiff>> {
        if aggregator.field_queries.is_empty() {
            return Err(DiffError::argument(
                "aggregator",
                "no field queries configured",
            ));
        }
        if aggregator.method_queries.is_empty() {
            return Err(DiffError::argument(
                "aggregator",
                "no method queries configured",
            ));
        }

        // Interfaces have no base type.
        let base_type_changed = !old.is_interface() && base_type_changed(old, new);
        let interfaces = diff_members::<Interfaces>(aggregator, old, new);
        let fields = diff_members::<Fields>(aggregator, old, new);
        let methods = diff_members::<Methods>(aggregator, old, new);
        let events = diff_members::<Events>(aggregator, old, new);

        if !base_type_changed
            && interfaces.is_empty()
            && fields.is_empty()
            && methods.is_empty()
            && events.is_empty()
        {
            return Ok(None);
        }

        Ok(Some(TypeDiff {
            full_name: old.full_name(),
            old_type: old.clone(),
            new_type: new.clone(),
            base_type_changed,
            interfaces,
            fields,
            methods,
            events,
        }))
    }

    pub fn has_changed_base_type(&self) -> bool {
        self.base_type_changed
    }

    /// Full name of the old base type, if any.
    pub fn old_base_name(&self) -> Option<String> {
        self.old_type.base_type.as_ref().map(TypeReference::full_name)
    }

    pub fn new_base_name(&self) -> Option<String> {
        self.new_type.base_type.as_ref().map(TypeReference::full_name)
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            types_changed: 1,
            base_types_changed: usize::from(self.base_type_changed),
            interfaces_added: self.interfaces.added_count(),
            interfaces_removed: self.interfaces.removed_count(),
            fields_added: self.fields.added_count(),
            fields_removed: self.fields.removed_count(),
            methods_added: self.methods.added_count(),
            methods_removed: self.methods.removed_count(),
            events_added: self.events.added_count(),
            events_removed: self.events.removed_count(),
            ..Default::default()
        }
    }
}

/// Base types compare by full name only.
fn base_type_changed(old: &TypeNode, new: &TypeNode) -> bool {
    match (&old.base_type, &new.base_type) {
        (None, None) => false,
        (Some(a), Some(b)) => a.full_name() != b.full_name(),
        _ => true,
    }
}
