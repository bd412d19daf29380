use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::AuthorizationProvider;
use crate::domain::{DomainError, Repo, RequestContext};

/// Result of running candidates through the gate.
#[derive(Debug, Clone, Default)]
pub struct GateOutcome {
    /// Candidates the actor may see, in the order they were given.
    pub visible: Vec<Repo>,
    /// Whether the authorization provider was asked for the accessible set.
    pub provider_invoked: bool,
}

/// Decides which repositories an actor may see.
///
/// Public repositories are always visible. Private ones are visible only
/// when the provider lists them as accessible to an authenticated actor who
/// carries an external token. Anything that cannot be confirmed is dropped.
pub struct AccessControlGate {
    provider: Arc<dyn AuthorizationProvider>,
}

impl AccessControlGate {
    pub fn new(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self { provider }
    }

    pub async fn filter(
        &self,
        ctx: &RequestContext,
        candidates: Vec<Repo>,
    ) -> Result<GateOutcome, DomainError> {
        if ctx.insecure_skip() {
            return Ok(GateOutcome {
                visible: candidates,
                provider_invoked: false,
            });
        }

        let private_count = candidates.iter().filter(|r| r.is_private()).count();
        if private_count == 0 {
            return Ok(GateOutcome {
                visible: candidates,
                provider_invoked: false,
            });
        }

        if !ctx.actor().can_query_provider() {
            debug!(
                "Hiding {} private candidates from actor without provider credentials",
                private_count
            );
            return Ok(GateOutcome {
                visible: retain_visible(candidates, None),
                provider_invoked: false,
            });
        }

        let accessible = self.accessible_uris(ctx).await?;
        let visible = retain_visible(candidates, Some(&accessible));
        Ok(GateOutcome {
            visible,
            provider_invoked: true,
        })
    }

    /// Confirms a single repository for a direct lookup.
    ///
    /// Unlike [`AccessControlGate::filter`], denial surfaces as
    /// [`DomainError::Unauthorized`] and provider failures propagate.
    pub async fn verify(&self, ctx: &RequestContext, repo: &Repo) -> Result<(), DomainError> {
        if ctx.insecure_skip() || !repo.is_private() {
            return Ok(());
        }

        if !ctx.actor().can_query_provider() {
            return Err(DomainError::unauthorized(format!(
                "no credentials to access repository {}",
                repo.uri()
            )));
        }

        ctx.guard(
            "authorization lookup",
            self.provider.get_repo(ctx.actor(), repo.uri()),
        )
        .await
        .map(|_| ())
    }

    async fn accessible_uris(&self, ctx: &RequestContext) -> Result<HashSet<String>, DomainError> {
        let listed = ctx
            .guard(
                "accessible repository listing",
                self.provider.list_accessible_repos(ctx.actor()),
            )
            .await;

        match listed {
            Ok(repos) => {
                debug!(
                    "{} affirmed {} accessible repositories for {}",
                    self.provider.name(),
                    repos.len(),
                    ctx.actor().login()
                );
                Ok(repos.iter().map(|r| r.uri().to_lowercase()).collect())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(
                    "Failed to list accessible repositories from {}: {}. Hiding private repositories.",
                    self.provider.name(),
                    e
                );
                Ok(HashSet::new())
            }
        }
    }
}

/// Keeps public repositories plus private ones present in `accessible`.
/// With no accessible set every private repository is dropped.
fn retain_visible(candidates: Vec<Repo>, accessible: Option<&HashSet<String>>) -> Vec<Repo> {
    candidates
        .into_iter()
        .filter(|repo| {
            !repo.is_private()
                || accessible.is_some_and(|set| set.contains(&repo.uri().to_lowercase()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::StaticAuthorizationProvider;
    use crate::domain::{Actor, DEFAULT_BRANCH};

    fn repo(id: i64, uri: &str, private: bool) -> Repo {
        Repo::reconstitute(
            id,
            uri.to_string(),
            String::new(),
            false,
            private,
            DEFAULT_BRANCH.to_string(),
            0,
        )
    }

    fn uris(repos: &[Repo]) -> Vec<&str> {
        repos.iter().map(Repo::uri).collect()
    }

    fn authed() -> RequestContext {
        RequestContext::new(Actor::new("1", "test").with_external_token("token"))
    }

    fn mixed() -> Vec<Repo> {
        vec![
            repo(1, "a/local", false),
            repo(2, "a/localPrivate", true),
            repo(3, "github.com/is/public", false),
            repo(4, "github.com/is/privateButAccessible", true),
            repo(5, "github.com/is/inaccessibleBecausePrivate", true),
        ]
    }

    #[tokio::test]
    async fn anonymous_sees_only_public_without_provider_call() {
        let provider = Arc::new(StaticAuthorizationProvider::new());
        let gate = AccessControlGate::new(provider.clone());

        let outcome = gate
            .filter(&RequestContext::anonymous(), mixed())
            .await
            .unwrap();

        assert_eq!(uris(&outcome.visible), vec!["a/local", "github.com/is/public"]);
        assert!(!outcome.provider_invoked);
        assert_eq!(provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn authenticated_actor_sees_affirmed_private_repos() {
        let provider = Arc::new(
            StaticAuthorizationProvider::new()
                .grant("test", ["github.com/is/privateButAccessible"]),
        );
        let gate = AccessControlGate::new(provider.clone());

        let outcome = gate.filter(&authed(), mixed()).await.unwrap();

        assert_eq!(
            uris(&outcome.visible),
            vec![
                "a/local",
                "github.com/is/public",
                "github.com/is/privateButAccessible"
            ]
        );
        assert!(outcome.provider_invoked);
        assert_eq!(provider.list_calls(), 1);
    }

    #[tokio::test]
    async fn authenticated_actor_without_token_is_not_looked_up() {
        let provider = Arc::new(
            StaticAuthorizationProvider::new().grant("test", ["a/localPrivate"]),
        );
        let gate = AccessControlGate::new(provider.clone());
        let ctx = RequestContext::new(Actor::new("1", "test"));

        let outcome = gate.filter(&ctx, mixed()).await.unwrap();

        assert_eq!(outcome.visible.len(), 2);
        assert_eq!(provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn no_private_candidates_skips_provider() {
        let provider = Arc::new(StaticAuthorizationProvider::new());
        let gate = AccessControlGate::new(provider.clone());
        let candidates = vec![repo(1, "a/b", false), repo(2, "c/d", false)];

        let outcome = gate.filter(&authed(), candidates).await.unwrap();

        assert_eq!(outcome.visible.len(), 2);
        assert!(!outcome.provider_invoked);
        assert_eq!(provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn insecure_skip_shows_everything() {
        let provider = Arc::new(StaticAuthorizationProvider::new());
        let gate = AccessControlGate::new(provider.clone());
        let ctx = RequestContext::anonymous().with_insecure_skip(true);

        let outcome = gate.filter(&ctx, mixed()).await.unwrap();

        assert_eq!(outcome.visible.len(), 5);
        assert_eq!(provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_fails_closed() {
        let provider = Arc::new(StaticAuthorizationProvider::failing("rate limited"));
        let gate = AccessControlGate::new(provider.clone());

        let outcome = gate.filter(&authed(), mixed()).await.unwrap();

        assert_eq!(uris(&outcome.visible), vec!["a/local", "github.com/is/public"]);
        assert!(outcome.provider_invoked);
    }

    #[tokio::test]
    async fn accessible_set_matches_case_insensitively() {
        let provider = Arc::new(
            StaticAuthorizationProvider::new()
                .grant("test", ["GitHub.com/Is/PrivateButAccessible"]),
        );
        let gate = AccessControlGate::new(provider);

        let outcome = gate.filter(&authed(), mixed()).await.unwrap();

        assert!(uris(&outcome.visible).contains(&"github.com/is/privateButAccessible"));
    }

    #[tokio::test]
    async fn verify_denies_anonymous_access_to_private_repo() {
        let provider = Arc::new(StaticAuthorizationProvider::new());
        let gate = AccessControlGate::new(provider.clone());

        let err = gate
            .verify(&RequestContext::anonymous(), &repo(1, "x/y", true))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(provider.get_calls(), 0);
    }

    #[tokio::test]
    async fn verify_consults_provider_for_private_repo() {
        let provider = Arc::new(StaticAuthorizationProvider::new().grant("test", ["x/y"]));
        let gate = AccessControlGate::new(provider.clone());

        gate.verify(&authed(), &repo(1, "x/y", true)).await.unwrap();
        let err = gate
            .verify(&authed(), &repo(2, "x/z", true))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(provider.get_calls(), 2);
    }

    #[tokio::test]
    async fn verify_allows_public_repo_without_lookup() {
        let provider = Arc::new(StaticAuthorizationProvider::new());
        let gate = AccessControlGate::new(provider.clone());

        gate.verify(&RequestContext::anonymous(), &repo(1, "x/y", false))
            .await
            .unwrap();
        assert_eq!(provider.get_calls(), 0);
    }
}
