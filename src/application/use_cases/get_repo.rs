use std::sync::Arc;

use super::access_control::AccessControlGate;
use crate::application::{AuthorizationProvider, RepoStore};
use crate::domain::{DomainError, Repo, RequestContext};

/// Point lookups by URI or id.
pub struct GetRepoUseCase {
    repo_store: Arc<dyn RepoStore>,
    gate: AccessControlGate,
}

impl GetRepoUseCase {
    pub fn new(
        repo_store: Arc<dyn RepoStore>,
        authorization: Arc<dyn AuthorizationProvider>,
    ) -> Self {
        Self {
            repo_store,
            gate: AccessControlGate::new(authorization),
        }
    }

    pub async fn get_by_uri(&self, ctx: &RequestContext, uri: &str) -> Result<Repo, DomainError> {
        ctx.guard("repository lookup", self.repo_store.find_by_uri(uri))
            .await?
            .ok_or_else(|| DomainError::not_found(format!("repository with uri {}", uri)))
    }

    pub async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> Result<Repo, DomainError> {
        ctx.guard("repository lookup", self.repo_store.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found(format!("repository with id {}", id)))
    }

    /// Like [`GetRepoUseCase::get_by_uri`], but a private repository must
    /// also be confirmed by the authorization provider.
    pub async fn get_verified(&self, ctx: &RequestContext, uri: &str) -> Result<Repo, DomainError> {
        let repo = self.get_by_uri(ctx, uri).await?;
        self.gate.verify(ctx, &repo).await?;
        Ok(repo)
    }
}
