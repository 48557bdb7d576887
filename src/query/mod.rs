//! Query module
//!
//! Filtering and ordering primitives used by the database facade.
//! Everything here operates on plain records and knows nothing about
//! storage or persistence.

mod filter;
mod order;

pub use filter::Filter;
pub use order::{cmp_values, sort_by_field};
