use async_trait::async_trait;

use crate::domain::{Actor, DomainError, Repo};

/// External service that knows which private repositories an actor may see.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Repositories the provider affirms the actor may view.
    async fn list_accessible_repos(&self, actor: &Actor) -> Result<Vec<Repo>, DomainError>;

    /// Looks up a single repository on the actor's behalf. Fails with
    /// [`DomainError::Unauthorized`] when the actor may not see it.
    async fn get_repo(&self, actor: &Actor, uri: &str) -> Result<Repo, DomainError>;

    fn name(&self) -> &str;
}
