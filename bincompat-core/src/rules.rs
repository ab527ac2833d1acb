//! Breaking-change classification.
//!
//! A rule inspects an [`AssemblyDiffCollection`] and answers whether it is
//! breaking. Only removals and re-parenting break binary consumers; added
//! types and members never do.

use serde::Serialize;

use crate::differ::{AssemblyDiffCollection, TypeDiff};

/// A verdict over a module diff. `true` means breaking.
pub trait Rule {
    fn name(&self) -> &'static str;

    fn detect(&self, diff: &AssemblyDiffCollection) -> bool;
}

/// First condition that made a diff breaking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "type", rename_all = "snake_case")]
pub enum BreakingReason {
    TypeRemoved(String),
    BaseTypeChanged(String),
    InterfaceRemoved(String),
    EventRemoved(String),
    FieldRemoved(String),
    MethodRemoved(String),
}

impl std::fmt::Display for BreakingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakingReason::TypeRemoved(ty) => write!(f, "type {} was removed", ty),
            BreakingReason::BaseTypeChanged(ty) => write!(f, "base type of {} changed", ty),
            BreakingReason::InterfaceRemoved(ty) => write!(f, "{} no longer implements an interface", ty),
            BreakingReason::EventRemoved(ty) => write!(f, "an event was removed from {}", ty),
            BreakingReason::FieldRemoved(ty) => write!(f, "a field was removed from {}", ty),
            BreakingReason::MethodRemoved(ty) => write!(f, "a method was removed from {}", ty),
        }
    }
}

/// Removed type, changed base type, or removed interface, event, field or method.
#[derive(Clone, Copy, Debug, Default)]
pub struct BreakingChangeRule;

impl BreakingChangeRule {
    pub fn new() -> Self {
        Self
    }

    /// The first breaking condition found, checked in a fixed order:
    /// removed types, then base types, interfaces, events, fields and
    /// methods across all changed types.
    pub fn reason(&self, diff: &AssemblyDiffCollection) -> Option<BreakingReason> {
        if let Some(ty) = diff.added_removed_types.removed().next() {
            return Some(BreakingReason::TypeRemoved(ty.full_name()));
        }

        let checks: [(fn(&TypeDiff) -> bool, fn(String) -> BreakingReason); 5] = [
            (|t| t.has_changed_base_type(), BreakingReason::BaseTypeChanged),
            (|t| t.interfaces.removed_count() > 0, BreakingReason::InterfaceRemoved),
            (|t| t.events.removed_count() > 0, BreakingReason::EventRemoved),
            (|t| t.fields.removed_count() > 0, BreakingReason::FieldRemoved),
            (|t| t.methods.removed_count() > 0, BreakingReason::MethodRemoved),
        ];
        checks.iter().find_map(|(breaks, reason)| {
            diff.changed_types
                .iter()
                .find(|t| breaks(t))
                .map(|t| reason(t.full_name.clone()))
        })
    }
}

impl Rule for BreakingChangeRule {
    fn name(&self) -> &'static str {
        "breaking-change"
    }

    fn detect(&self, diff: &AssemblyDiffCollection) -> bool {
        match self.reason(diff) {
            Some(reason) => {
                tracing::debug!(rule = self.name(), %reason, "Breaking change detected");
                true
            }
            None => false,
        }
    }
}
