//! Union of queries per member kind: the definition of "API surface".

use super::{EventQuery, FieldQuery, MethodQuery, TypeQuery, TypeQueryMode};
use crate::equivalence::{events_equal, fields_equal, methods_equal};
use crate::error::Result;
use crate::model::{EventNode, FieldNode, MethodNode, ModuleGraph, TypeNode};

/// Type, method, field and event queries whose results are united.
///
/// Results of a kind are deduplicated (first occurrence wins) when more than
/// one query of that kind is configured.
#[derive(Clone, Debug, Default)]
pub struct QueryAggregator {
    pub type_queries: Vec<TypeQuery>,
    pub method_queries: Vec<MethodQuery>,
    pub field_queries: Vec<FieldQuery>,
    pub event_queries: Vec<EventQuery>,
}

impl QueryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Public, non-compiler-generated types with their public and protected members.
    pub fn public_api() -> Self {
        Self {
            type_queries: vec![TypeQuery::new(TypeQueryMode::API_RELEVANT)],
            method_queries: vec![MethodQuery::public_methods(), MethodQuery::protected_methods()],
            field_queries: vec![FieldQuery::public_fields(), FieldQuery::protected_fields()],
            event_queries: vec![EventQuery::public_events(), EventQuery::protected_events()],
        }
    }

    /// [`public_api`](Self::public_api) plus internal types and members.
    pub fn externally_visible() -> Self {
        let mut agg = Self::public_api();
        agg.type_queries.push(TypeQuery::new(TypeQueryMode::INTERNAL));
        agg.method_queries.push(MethodQuery::internal_methods());
        agg.field_queries.push(FieldQuery::internal_fields());
        agg.event_queries.push(EventQuery::internal_events());
        agg
    }

    /// Add every entry of a `;`-separated type query list.
    pub fn add_type_queries(&mut self, queries: &str, default_mode: TypeQueryMode) -> Result<()> {
        self.type_queries
            .extend(TypeQuery::parse_list(queries, default_mode)?);
        Ok(())
    }

    pub fn add_method_query(&mut self, query: &str) -> Result<()> {
        self.method_queries.push(MethodQuery::parse(query)?);
        Ok(())
    }

    pub fn add_field_query(&mut self, query: &str) -> Result<()> {
        self.field_queries.push(FieldQuery::parse(query)?);
        Ok(())
    }

    pub fn add_event_query(&mut self, query: &str) -> Result<()> {
        self.event_queries.push(EventQuery::parse(query)?);
        Ok(())
    }

    /// Types of `module` matched by any type query, deduplicated by full name.
    pub fn select_types<'a>(&self, module: &'a ModuleGraph) -> Vec<&'a TypeNode> {
        let found: Vec<_> = self
            .type_queries
            .iter()
            .flat_map(|q| q.types(module))
            .collect();
        distinct_by(found, self.type_queries.len(), |a, b| {
            a.full_name() == b.full_name()
        })
    }

    pub fn select_methods<'a>(&self, ty: &'a TypeNode) -> Vec<&'a MethodNode> {
        let found: Vec<_> = self
            .method_queries
            .iter()
            .flat_map(|q| q.methods(ty))
            .collect();
        distinct_by(found, self.method_queries.len(), |a, b| methods_equal(a, b))
    }

    pub fn select_fields<'a>(&self, ty: &'a TypeNode) -> Vec<&'a FieldNode> {
        let found: Vec<_> = self
            .field_queries
            .iter()
            .flat_map(|q| q.fields(ty))
            .collect();
        distinct_by(found, self.field_queries.len(), |a, b| fields_equal(a, b))
    }

    pub fn select_events<'a>(&self, ty: &'a TypeNode) -> Vec<&'a EventNode> {
        let found: Vec<_> = self
            .event_queries
            .iter()
            .flat_map(|q| q.events(ty))
            .collect();
        distinct_by(found, self.event_queries.len(), |a, b| events_equal(a, b))
    }
}

/// Drop later items equal to an earlier one; a single query cannot produce duplicates.
fn distinct_by<T: Copy>(items: Vec<T>, query_count: usize, equal: impl Fn(T, T) -> bool) -> Vec<T> {
    if query_count <= 1 {
        return items;
    }
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !kept.iter().any(|k| equal(*k, item)) {
            kept.push(item);
        }
    }
    kept
}
