//! Structural diff engine for module graphs.
//!
//! Compares two versions of a module at the metadata level and reports what
//! was added to or removed from its API surface.
//!
//! # Features
//!
//! - **Type-level diffing**: Added and removed types across the module
//! - **Member-level diffing**: Methods, fields, events and interfaces per type
//! - **Base type tracking**: Re-parented types are flagged
//! - **Parallel processing**: Type pairs are diffed concurrently via Rayon
//!
//! # Example
//!
//! ```
//! use bincompat_core::differ::diff_modules;
//! use bincompat_core::model::ModuleGraph;
//! use bincompat_core::query::QueryAggregator;
//!
//! let old = ModuleGraph::new("Lib");
//! let new = ModuleGraph::new("Lib");
//! let diff = diff_modules(&old, &new, &QueryAggregator::public_api()).unwrap();
//! assert!(diff.is_empty());
//! ```

pub mod assembly;
pub mod changes;
pub mod kind;
pub mod list;
pub mod type_diff;

pub use assembly::{diff_modules, AssemblyDiffCollection};
pub use changes::{DiffCollection, DiffEntry, DiffOperation, DiffSummary};
pub use kind::{diff_members, Events, Fields, Interfaces, MemberKind, Methods};
pub use list::{diff_collection, diff_lists};
pub use type_diff::TypeDiff;
