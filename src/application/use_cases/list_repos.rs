use std::sync::Arc;

use tracing::debug;

use super::access_control::{AccessControlGate, GateOutcome};
use super::query_ranking::{rank_repos, storage_filter};
use crate::application::{AuthorizationProvider, RepoStore};
use crate::domain::{DomainError, Repo, RepoListOp, RequestContext};

/// One page of listing results together with how it was produced.
#[derive(Debug, Clone, Default)]
pub struct ListOutcome {
    pub repos: Vec<Repo>,
    pub provider_invoked: bool,
}

/// Lists catalog repositories: scan, rank by query, drop what the actor may
/// not see, then cut the requested page.
pub struct ListReposUseCase {
    repo_store: Arc<dyn RepoStore>,
    gate: AccessControlGate,
}

impl ListReposUseCase {
    pub fn new(
        repo_store: Arc<dyn RepoStore>,
        authorization: Arc<dyn AuthorizationProvider>,
    ) -> Self {
        Self {
            repo_store,
            gate: AccessControlGate::new(authorization),
        }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        op: Option<&RepoListOp>,
    ) -> Result<Vec<Repo>, DomainError> {
        Ok(self.execute_with_outcome(ctx, op).await?.repos)
    }

    pub async fn execute_with_outcome(
        &self,
        ctx: &RequestContext,
        op: Option<&RepoListOp>,
    ) -> Result<ListOutcome, DomainError> {
        let query = op.map(RepoListOp::query).unwrap_or_default();
        let filter = storage_filter(query);

        let candidates = ctx
            .guard("repository scan", self.repo_store.scan(filter.as_deref()))
            .await?;
        let candidate_count = candidates.len();

        let ranked = rank_repos(query, candidates);
        let matched_count = ranked.len();

        let GateOutcome {
            visible,
            provider_invoked,
        } = self.gate.filter(ctx, ranked).await?;
        let visible_count = visible.len();

        let repos = match op {
            Some(op) => op.paginate(visible),
            None => visible,
        };

        debug!(
            "Listed repositories for {:?}: {} candidates, {} matched, {} visible, {} returned (provider invoked: {})",
            query,
            candidate_count,
            matched_count,
            visible_count,
            repos.len(),
            provider_invoked
        );

        Ok(ListOutcome {
            repos,
            provider_invoked,
        })
    }
}
