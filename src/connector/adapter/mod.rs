mod duckdb_repo_store;
mod in_memory_repo_store;
mod static_authorization_provider;

pub use duckdb_repo_store::*;
pub use in_memory_repo_store::*;
pub use static_authorization_provider::*;
