use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::AuthorizationProvider;
use crate::domain::{Actor, DomainError, Repo, DEFAULT_BRANCH};

/// Authorization provider backed by a fixed table of grants, keyed by login.
///
/// Counts how often each operation is called so callers can assert whether
/// the provider was consulted. Grants can be loaded from JSON of the form
/// `{"alice": ["github.com/org/private-repo"]}`.
pub struct StaticAuthorizationProvider {
    grants: HashMap<String, HashSet<String>>,
    failure: Option<String>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl StaticAuthorizationProvider {
    pub fn new() -> Self {
        Self {
            grants: HashMap::new(),
            failure: None,
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails with a provider error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let grants: HashMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| DomainError::invalid_input(format!("Invalid grants JSON: {}", e)))?;

        Ok(grants
            .into_iter()
            .fold(Self::new(), |provider, (login, uris)| provider.grant(login, uris)))
    }

    pub fn grant<I, S>(mut self, login: impl Into<String>, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grants
            .entry(login.into())
            .or_default()
            .extend(uris.into_iter().map(|uri| uri.into().to_lowercase()));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), DomainError> {
        match &self.failure {
            Some(message) => Err(DomainError::provider(message.clone())),
            None => Ok(()),
        }
    }

    fn granted(&self, actor: &Actor) -> Option<&HashSet<String>> {
        self.grants.get(actor.login())
    }
}

impl Default for StaticAuthorizationProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn external_repo(uri: &str) -> Repo {
    Repo::reconstitute(
        0,
        uri.to_string(),
        String::new(),
        false,
        true,
        DEFAULT_BRANCH.to_string(),
        0,
    )
}

#[async_trait]
impl AuthorizationProvider for StaticAuthorizationProvider {
    async fn list_accessible_repos(&self, actor: &Actor) -> Result<Vec<Repo>, DomainError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut uris: Vec<&String> = self
            .granted(actor)
            .map(|set| set.iter().collect())
            .unwrap_or_default();
        uris.sort();

        Ok(uris.into_iter().map(|uri| external_repo(uri)).collect())
    }

    async fn get_repo(&self, actor: &Actor, uri: &str) -> Result<Repo, DomainError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let key = uri.to_lowercase();
        if self.granted(actor).is_some_and(|set| set.contains(&key)) {
            Ok(external_repo(uri))
        } else {
            Err(DomainError::unauthorized(format!(
                "{} may not access {}",
                actor.login(),
                uri
            )))
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Provider used when no external authorization is configured: it affirms
/// nothing, so private repositories stay hidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllAuthorizationProvider;

#[async_trait]
impl AuthorizationProvider for DenyAllAuthorizationProvider {
    async fn list_accessible_repos(&self, _actor: &Actor) -> Result<Vec<Repo>, DomainError> {
        Ok(Vec::new())
    }

    async fn get_repo(&self, _actor: &Actor, uri: &str) -> Result<Repo, DomainError> {
        Err(DomainError::unauthorized(format!(
            "no authorization provider configured for {}",
            uri
        )))
    }

    fn name(&self) -> &str {
        "deny-all"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Actor {
        Actor::new("1", "alice").with_external_token("t")
    }

    #[tokio::test]
    async fn lists_grants_for_login_only() {
        let provider = StaticAuthorizationProvider::new()
            .grant("alice", ["b/repo", "a/repo"])
            .grant("bob", ["c/repo"]);

        let repos = provider.list_accessible_repos(&alice()).await.unwrap();
        let uris: Vec<&str> = repos.iter().map(Repo::uri).collect();

        assert_eq!(uris, vec!["a/repo", "b/repo"]);
        assert!(repos.iter().all(Repo::is_private));
        assert_eq!(provider.list_calls(), 1);
    }

    #[tokio::test]
    async fn get_repo_denies_ungranted_uri() {
        let provider = StaticAuthorizationProvider::new().grant("alice", ["a/repo"]);

        assert!(provider.get_repo(&alice(), "A/Repo").await.is_ok());
        let err = provider.get_repo(&alice(), "z/repo").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(provider.get_calls(), 2);
    }

    #[tokio::test]
    async fn failing_provider_errors_and_counts() {
        let provider = StaticAuthorizationProvider::failing("down");

        let err = provider.list_accessible_repos(&alice()).await.unwrap_err();
        assert!(matches!(err, DomainError::ProviderError(_)));
        assert_eq!(provider.list_calls(), 1);
    }

    #[test]
    fn loads_grants_from_json() {
        let provider =
            StaticAuthorizationProvider::from_json(r#"{"alice": ["GitHub.com/o/r"]}"#).unwrap();
        assert!(provider
            .granted(&alice())
            .is_some_and(|set| set.contains("github.com/o/r")));

        assert!(StaticAuthorizationProvider::from_json("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn deny_all_affirms_nothing() {
        let provider = DenyAllAuthorizationProvider;
        assert!(provider.list_accessible_repos(&alice()).await.unwrap().is_empty());
        assert!(provider
            .get_repo(&alice(), "a/b")
            .await
            .unwrap_err()
            .is_unauthorized());
    }
}
