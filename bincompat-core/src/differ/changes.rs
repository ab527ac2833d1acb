//! Change records and result collections for metadata diffs.

use serde::Serialize;

/// Direction of a change between the old and new version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOperation {
    Added,
    Removed,
}

impl DiffOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffOperation::Added => "added",
            DiffOperation::Removed => "removed",
        }
    }

    /// `+` or `-`, as used by the text report.
    pub fn sign(&self) -> char {
        match self {
            DiffOperation::Added => '+',
            DiffOperation::Removed => '-',
        }
    }
}

/// One added or removed item.
#[derive(Clone, Debug, Serialize)]
pub struct DiffEntry<T> {
    pub operation: DiffOperation,
    pub item: T,
}

/// Added and removed items of one kind, in discovery order.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct DiffCollection<T> {
    entries: Vec<DiffEntry<T>>,
}

impl<T> Default for DiffCollection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> DiffCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: DiffOperation, item: T) {
        self.entries.push(DiffEntry { operation, item });
    }

    pub fn added(&self) -> impl Iterator<Item = &T> {
        self.with_operation(DiffOperation::Added)
    }

    pub fn removed(&self) -> impl Iterator<Item = &T> {
        self.with_operation(DiffOperation::Removed)
    }

    fn with_operation(&self, operation: DiffOperation) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(move |e| e.operation == operation)
            .map(|e| &e.item)
    }

    pub fn added_count(&self) -> usize {
        self.added().count()
    }

    pub fn removed_count(&self) -> usize {
        self.removed().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry<T>> {
        self.entries.iter()
    }
}

impl<'a, T> IntoIterator for &'a DiffCollection<T> {
    type Item = &'a DiffEntry<T>;
    type IntoIter = std::slice::Iter<'a, DiffEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Summary statistics for an assembly diff.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub types_added: usize,
    pub types_removed: usize,
    pub types_changed: usize,

    pub base_types_changed: usize,

    pub interfaces_added: usize,
    pub interfaces_removed: usize,

    pub fields_added: usize,
    pub fields_removed: usize,

    pub methods_added: usize,
    pub methods_removed: usize,

    pub events_added: usize,
    pub events_removed: usize,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: &DiffSummary) {
        self.types_added += other.types_added;
        self.types_removed += other.types_removed;
        self.types_changed += other.types_changed;
        self.base_types_changed += other.base_types_changed;
        self.interfaces_added += other.interfaces_added;
        self.interfaces_removed += other.interfaces_removed;
        self.fields_added += other.fields_added;
        self.fields_removed += other.fields_removed;
        self.methods_added += other.methods_added;
        self.methods_removed += other.methods_removed;
        self.events_added += other.events_added;
        self.events_removed += other.events_removed;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();

        let groups = [
            ("types", self.types_added, self.types_removed),
            ("interfaces", self.interfaces_added, self.interfaces_removed),
            ("fields", self.fields_added, self.fields_removed),
            ("methods", self.methods_added, self.methods_removed),
            ("events", self.events_added, self.events_removed),
        ];
        for (label, added, removed) in groups {
            let mut group = Vec::new();
            if added > 0 {
                group.push(format!("{} added", added));
            }
            if removed > 0 {
                group.push(format!("{} removed", removed));
            }
            if !group.is_empty() {
                parts.push(format!("{}: {}", label, group.join(", ")));
            }
        }

        if self.base_types_changed > 0 {
            parts.push(format!("base types changed: {}", self.base_types_changed));
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join("; ")
        }
    }
}
