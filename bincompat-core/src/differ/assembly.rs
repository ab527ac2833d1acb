//! Whole-module diff: added/removed types plus per-type member changes.

use rayon::prelude::*;
use serde::Serialize;

use super::changes::{DiffCollection, DiffSummary};
use super::list::diff_collection;
use super::type_diff::TypeDiff;
use crate::equivalence::types_equal;
use crate::error::{DiffError, Result};
use crate::model::{ModuleGraph, TypeNode};
use crate::query::QueryAggregator;

/// Result of comparing two versions of a module.
///
/// Types keep the order the loader discovered them in; sort explicitly when
/// canonical ordering is needed.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AssemblyDiffCollection {
    pub added_removed_types: DiffCollection<TypeNode>,
    pub changed_types: Vec<TypeDiff>,
}

impl AssemblyDiffCollection {
    pub fn is_empty(&self) -> bool {
        self.added_removed_types.is_empty() && self.changed_types.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary {
            types_added: self.added_removed_types.added_count(),
            types_removed: self.added_removed_types.removed_count(),
            ..Default::default()
        };
        for changed in &self.changed_types {
            summary.merge(&changed.summary());
        }
        summary
    }
}

/// Compare two module graphs through the aggregator's queries.
///
/// Types are paired by full name; removed and added types are reported whole
/// and not member-diffed. Pairs are diffed in parallel, preserving order.
pub fn diff_modules(
    old: &ModuleGraph,
    new: &ModuleGraph,
    aggregator: &QueryAggregator,
) -> Result<AssemblyDiffCollection> {
    if aggregator.type_queries.is_empty() {
        return Err(DiffError::argument("aggregator", "no type queries configured"));
    }

    let old_types = aggregator.select_types(old);
    let new_types = aggregator.select_types(new);
    tracing::debug!(
        old = %old.name,
        new = %new.name,
        old_types = old_types.len(),
        new_types = new_types.len(),
        "Diffing modules"
    );

    let added_removed_types =
        diff_collection(&old_types, &new_types, |a, b| a.full_name() == b.full_name());

    let type_diffs: Vec<Option<TypeDiff>> = old_types
        .par_iter()
        .map(|old_type| {
            match new_types.iter().find(|candidate| types_equal(old_type, candidate)) {
                Some(new_type) => {
                    tracing::debug!(ty = %old_type.full_name(), "Diffing type");
                    TypeDiff::compute(old_type, new_type, aggregator)
                }
                None => Ok(None),
            }
        })
        .collect::<Result<_>>()?;

    Ok(AssemblyDiffCollection {
        added_removed_types,
        changed_types: type_diffs.into_iter().flatten().collect(),
    })
}
