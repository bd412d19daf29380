//! # Domain Layer
//!
//! Catalog models, request context and the error taxonomy.
//! This layer performs no I/O.

mod error;
pub mod models;

pub use error::*;
pub use models::*;

pub(crate) use models::current_timestamp;
