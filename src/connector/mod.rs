//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Storage (DuckDB, in-memory)
//! - Authorization providers (static grants, deny-all)
//! - Wiring, configuration and logging setup

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
