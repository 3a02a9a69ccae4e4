//! Role-store client for the terrace platform.
//!
//! The hosted relational database owns two relations relevant to access
//! control: the generic per-user role relation and the provider-membership
//! relation. This crate provides the read-only client for both:
//!
//! - [`RoleStore`]: the trait seam consumed by the access pipeline
//! - [`InMemoryRoleStore`]: in-process implementation for tests and local runs
//! - `PgRoleStore`: sqlx-backed implementation (behind the `postgres` feature)
//!
//! The store deliberately returns the raw role text from the relation.
//! Interpreting it against the closed role set is the caller's concern, so an
//! unknown value in the database degrades gracefully instead of failing the
//! query layer.

pub mod error;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod store;

pub use error::DirectoryError;
#[cfg(feature = "postgres")]
pub use postgres::PgRoleStore;
pub use store::{InMemoryRoleStore, RoleStore};
