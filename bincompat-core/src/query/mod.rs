//! Member filter language.
//!
//! Small textual queries select the types and members that make up the API
//! surface being compared.
//!
//! # Features
//!
//! - **Method queries**: `public virtual * *(*)`, `!static public void Dispose()`
//! - **Field queries**: `public const int *`, `!nocompilergenerated * *`
//! - **Event queries**: `protected EventHandler<*> *`
//! - **Type queries**: `api Lib.*; internal Lib.Internal.*`
//! - **Aggregation**: [`QueryAggregator`] unites queries per member kind

mod aggregator;
mod event;
mod field;
mod method;
mod modifiers;
mod type_filter;
mod types;

pub use aggregator::QueryAggregator;
pub use event::EventQuery;
pub use field::FieldQuery;
pub use method::MethodQuery;
pub use modifiers::{AccessFilter, Modifier};
pub use type_filter::TypeFilter;
pub use types::{TypeQuery, TypeQueryMode};
