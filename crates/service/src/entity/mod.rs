//! Generic CRUD over one entity kind.
//!
//! Three-layer split like the rest of the crate: [`merge`] decides which patch
//! fields reach storage, [`service`] holds the operations.

pub mod merge;
pub mod service;

pub use merge::MergePolicy;
pub use service::EntityService;
