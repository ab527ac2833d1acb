//! bincompat core - metadata diff engine for binary-breaking API changes.
//!
//! Compares two versions of a compiled library at the metadata level, selects
//! the API surface with a small query language, and decides whether the
//! differences break previously compiled consumers.
//!
//! # Features
//!
//! - **Query language**: `public virtual * *(*)`-style member filters with wildcards
//! - **Structural equivalence**: Members compared by name, signature and modifiers
//! - **Parallel diffing**: Type pairs diffed concurrently via Rayon
//! - **Breaking-change rule**: Removals and re-parenting break, additions do not
//! - **Version decision**: Major bump on breaking changes
//!
//! # Usage
//!
//! ```
//! use bincompat_core::model::{Access, MethodNode, ModuleGraph, TypeKind, TypeNode, TypeReference, Visibility};
//! use bincompat_core::{classify_breaking_change, compute_assembly_diff, QueryAggregator};
//!
//! let a = TypeNode::new("Lib", "A", TypeKind::Class, Visibility::Public);
//! let old = ModuleGraph::new("Lib")
//!     .with_type(a.clone().with_method(MethodNode::new("M", TypeReference::void(), Access::Public)))
//!     .normalize();
//! let new = ModuleGraph::new("Lib").with_type(a).normalize();
//!
//! let diff = compute_assembly_diff(&old, &new, &QueryAggregator::public_api()).unwrap();
//! assert!(classify_breaking_change(&diff));
//! ```

pub mod differ;
pub mod equivalence;
pub mod error;
pub mod impact;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod printer;
pub mod query;
pub mod rules;
pub mod scanner;
pub mod typename;
pub mod version;

pub use differ::{AssemblyDiffCollection, DiffCollection, DiffOperation, DiffSummary, TypeDiff};
pub use error::{DiffError, QueryKind, Result};
pub use loader::{JsonModuleLoader, LoadError, ModuleLoader};
pub use matcher::match_with_wildcards;
pub use model::ModuleGraph;
pub use printer::DiffPrinter;
pub use query::{QueryAggregator, TypeQueryMode};
pub use rules::{BreakingChangeRule, BreakingReason, Rule};
pub use version::{AnalysisResult, SemanticVersionAnalyzer};

/// Compare two module graphs through the aggregator's queries.
pub fn compute_assembly_diff(
    old: &ModuleGraph,
    new: &ModuleGraph,
    aggregator: &QueryAggregator,
) -> Result<AssemblyDiffCollection> {
    differ::diff_modules(old, new, aggregator)
}

/// `true` when the diff breaks binary compatibility.
pub fn classify_breaking_change(diff: &AssemblyDiffCollection) -> bool {
    BreakingChangeRule::new().detect(diff)
}
