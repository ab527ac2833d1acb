//! What a downstream usage search has to look for.
//!
//! Walking method bodies for call sites is out of scope; this module only
//! derives the search targets from a diff.

use serde::Serialize;

use crate::differ::{AssemblyDiffCollection, TypeDiff};
use crate::printer::{event_signature, field_signature, method_signature};

/// A single search to run against consumer code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "search", rename_all = "snake_case")]
pub enum UsageQuery {
    /// Any use of the type.
    UsesType { type_name: String },
    /// Types implementing the interface.
    ImplementsInterface { type_name: String },
    UsesMethods { type_name: String, methods: Vec<String> },
    UsesEvents { type_name: String, events: Vec<String> },
    AccessesFields { type_name: String, fields: Vec<String> },
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UsageSearchPlan {
    pub queries: Vec<UsageQuery>,
    /// Removed constants: consumers copied the value, so only type uses can be found.
    pub warnings: Vec<String>,
}

impl UsageSearchPlan {
    pub fn from_diff(diff: &AssemblyDiffCollection) -> Self {
        let mut plan = Self::default();
        plan.add_diff(diff);
        plan
    }

    pub fn from_diffs<'a>(diffs: impl IntoIterator<Item = &'a AssemblyDiffCollection>) -> Self {
        let mut plan = Self::default();
        for diff in diffs {
            plan.add_diff(diff);
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn add_diff(&mut self, diff: &AssemblyDiffCollection) {
        for removed in diff.added_removed_types.removed() {
            self.push(UsageQuery::UsesType {
                type_name: removed.full_name(),
            });
        }

        for changed in &diff.changed_types {
            if changed.old_type.is_interface() {
                self.add_interface_change(changed);
            } else if changed.old_type.is_enum() {
                // Enum constants are inlined; search uses of the enum itself.
                if changed.fields.removed_count() > 0 {
                    self.uses_type(changed);
                }
            } else {
                self.add_removed_events(changed);
                self.add_removed_methods(changed);
                self.add_removed_fields(changed);
                if changed.interfaces.removed_count() > 0 || changed.has_changed_base_type() {
                    self.uses_type(changed);
                }
            }
        }
    }

    /// Queries are deduplicated; the same type may be reached for several reasons.
    fn push(&mut self, query: UsageQuery) {
        if !self.queries.contains(&query) {
            self.queries.push(query);
        }
    }

    fn uses_type(&mut self, changed: &TypeDiff) {
        self.push(UsageQuery::UsesType {
            type_name: changed.full_name.clone(),
        });
    }

    fn add_interface_change(&mut self, changed: &TypeDiff) {
        // Every implementer breaks when an interface changes.
        self.push(UsageQuery::ImplementsInterface {
            type_name: changed.full_name.clone(),
        });
        self.add_removed_methods(changed);
        self.add_removed_events(changed);
    }

    fn add_removed_methods(&mut self, changed: &TypeDiff) {
        let methods: Vec<String> = changed
            .methods
            .removed()
            .map(|m| method_signature(m, false))
            .collect();
        if !methods.is_empty() {
            self.push(UsageQuery::UsesMethods {
                type_name: changed.full_name.clone(),
                methods,
            });
        }
    }

    fn add_removed_events(&mut self, changed: &TypeDiff) {
        let events: Vec<String> = changed.events.removed().map(event_signature).collect();
        if !events.is_empty() {
            self.push(UsageQuery::UsesEvents {
                type_name: changed.full_name.clone(),
                events,
            });
        }
    }

    fn add_removed_fields(&mut self, changed: &TypeDiff) {
        let fields: Vec<String> = changed
            .fields
            .removed()
            .filter(|f| !f.has_constant())
            .map(field_signature)
            .collect();
        if !fields.is_empty() {
            self.push(UsageQuery::AccessesFields {
                type_name: changed.full_name.clone(),
                fields,
            });
        }

        for constant in changed.fields.removed().filter(|f| f.has_constant()) {
            let warning = format!(
                "Constants are copied by value into consumers: field {} of {}",
                field_signature(constant),
                changed.full_name
            );
            tracing::warn!("{}", warning);
            self.warnings.push(warning);
            self.uses_type(changed);
        }
    }
}
