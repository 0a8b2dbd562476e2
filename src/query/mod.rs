//! Query primitives shared by the store adapters, the reference resolver
//! and the aggregation pipeline.
//!
//! Every primitive evaluates in memory against a [`bson::Document`] and can be
//! translated to the equivalent MongoDB query document, so the in-memory and
//! MongoDB stores answer the same [`FindQuery`](crate::repository::FindQuery)
//! identically.

pub mod filter;
pub mod path;
pub mod projection;
pub mod sort;

pub use filter::Filter;
pub use projection::Projection;
pub use sort::{SortOrder, SortSpec};
