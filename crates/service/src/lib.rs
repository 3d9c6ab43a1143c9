//! Service layer providing the CRUD contract for lecturers, courses and students.
//! - One generic [`entity::EntityService`] parameterized by a static [`schema::EntitySchema`].
//! - Storage sits behind the [`storage::DocumentStore`] trait and is injected at construction.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod schema;
pub mod record;
pub mod storage;
pub mod entity;
#[cfg(test)]
pub mod test_support;

pub use entity::{EntityService, MergePolicy};
pub use errors::ServiceError;
pub use record::{Document, Record};
pub use schema::EntitySchema;
pub use storage::DocumentStore;
