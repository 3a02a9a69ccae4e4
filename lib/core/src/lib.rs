//! Core domain types and utilities for the terrace platform.
//!
//! This crate provides the foundational types and error handling shared by
//! the terrace property-management platform crates: strongly-typed IDs and
//! the common `Result` alias.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::UserId;
