mod access_control;
mod create_repo;
mod get_repo;
mod list_repos;
pub mod query_ranking;

pub use access_control::*;
pub use create_repo::*;
pub use get_repo::*;
pub use list_repos::*;
pub use query_ranking::{rank_by_uri, rank_repos, MatchTier};
