use async_trait::async_trait;

use crate::domain::{DomainError, NewRepo, Repo};

/// Durable storage for repository records.
///
/// Implementations must enforce uniqueness of `uri` in the storage itself so
/// that [`RepoStore::try_insert_new`] stays correct under concurrent callers.
#[async_trait]
pub trait RepoStore: Send + Sync {
    /// Inserts the record unless one with the same URI exists. Both cases
    /// return `Ok`; an existing record is left untouched.
    async fn try_insert_new(&self, repo: NewRepo) -> Result<(), DomainError>;

    async fn find_by_uri(&self, uri: &str) -> Result<Option<Repo>, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Repo>, DomainError>;

    /// All records in ascending id order. `filter` is a lowercase substring
    /// the URI must contain; it may be applied loosely.
    async fn scan(&self, filter: Option<&str>) -> Result<Vec<Repo>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
