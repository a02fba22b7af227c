//! PostgreSQL row-store for dbseed.
//!
//! Exposes the synchronous [`dbseed_generate::RowStore`] contract over a
//! single `sqlx` connection driven by a private current-thread runtime.

pub mod error;
pub mod sql;
pub mod store;
pub mod target;

pub use error::PgStoreError;
pub use store::PgRowStore;
pub use target::PgTarget;
