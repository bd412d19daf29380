mod authorization_provider;
mod repo_store;

pub use authorization_provider::*;
pub use repo_store::*;
