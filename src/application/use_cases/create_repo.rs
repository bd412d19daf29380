use std::sync::Arc;

use tracing::debug;

use crate::application::RepoStore;
use crate::domain::{DomainError, NewRepo, RequestContext, DEFAULT_BRANCH};

/// Registers repositories in the catalog. Creating a URI that already
/// exists succeeds and leaves the stored record untouched.
pub struct CreateRepoUseCase {
    repo_store: Arc<dyn RepoStore>,
    default_branch: String,
}

impl CreateRepoUseCase {
    pub fn new(repo_store: Arc<dyn RepoStore>) -> Self {
        Self {
            repo_store,
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub async fn try_insert_new(
        &self,
        ctx: &RequestContext,
        uri: &str,
        description: &str,
        fork: bool,
        private: bool,
    ) -> Result<(), DomainError> {
        let new_repo = NewRepo::new(uri)
            .with_description(description)
            .with_fork(fork)
            .with_private(private)
            .with_default_branch(self.default_branch.clone());
        self.insert(ctx, new_repo).await
    }

    pub async fn insert(&self, ctx: &RequestContext, new_repo: NewRepo) -> Result<(), DomainError> {
        new_repo.validate()?;
        let uri = new_repo.uri().to_string();

        ctx.guard("repository insert", self.repo_store.try_insert_new(new_repo))
            .await?;

        debug!("Ensured repository {} exists", uri);
        Ok(())
    }
}
