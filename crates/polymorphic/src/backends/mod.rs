//! Persistence Backends
//!
//! Cascade deletion only needs one capability from storage: delete the rows of
//! an entity type that match a set of equality conditions. [`RelatedRowStore`]
//! captures that, with an in-memory implementation and a PostgreSQL one built
//! on sqlx.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryRowStore;
pub use postgres::PgRelatedRowStore;
pub use store::RelatedRowStore;
