//! Catalog domain module.
//!
//! # Module Structure
//!
//! - `model`: datasets, resources, filters, pagination and statistics records
//! - `envelope`: decoding of list responses into a tagged union
//! - `pagination`: page reconstruction from list envelopes
//! - `statistics`: statistics derived from a loaded dataset list

pub mod envelope;
mod model;
pub mod pagination;
pub mod statistics;

pub use envelope::{ListResponse, PagedEnvelope};
pub use model::{Dataset, FilterPatch, Filters, Pagination, Resource, Statistics};
pub use statistics::compute_statistics;
