use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::{
    AuthorizationProvider, CreateRepoUseCase, GetRepoUseCase, ListReposUseCase, RepoStore,
};
use crate::connector::{DenyAllAuthorizationProvider, DuckdbRepoStore, InMemoryRepoStore};
use crate::domain::{Actor, RequestContext, DEFAULT_BRANCH};

pub const DEFAULT_DATA_DIR: &str = "~/.repocatalog";
const DB_FILE_NAME: &str = "repocatalog.duckdb";

#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep the catalog in process memory instead of a DuckDB file.
    pub memory_storage: bool,
    /// Branch recorded for repositories created without one.
    pub default_branch: String,
    /// Deadline applied to every context built by [`Container::request_context`].
    pub request_timeout: Option<Duration>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            memory_storage: false,
            default_branch: DEFAULT_BRANCH.to_string(),
            request_timeout: None,
        }
    }
}

impl ContainerConfig {
    /// Construct from environment variables:
    ///
    /// | Variable                         | Default          |
    /// |----------------------------------|------------------|
    /// | `REPOCATALOG_DATA_DIR`           | `~/.repocatalog` |
    /// | `REPOCATALOG_MEMORY_STORAGE`     | `false`          |
    /// | `REPOCATALOG_DEFAULT_BRANCH`     | `master`         |
    /// | `REPOCATALOG_REQUEST_TIMEOUT_MS` | none             |
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let memory_storage = var("REPOCATALOG_MEMORY_STORAGE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.memory_storage);

        let request_timeout = var("REPOCATALOG_REQUEST_TIMEOUT_MS").and_then(|v| {
            match v.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(e) => {
                    warn!(
                        "Ignoring invalid REPOCATALOG_REQUEST_TIMEOUT_MS '{}': {}",
                        v, e
                    );
                    None
                }
            }
        });

        Self {
            data_dir: var("REPOCATALOG_DATA_DIR").unwrap_or(defaults.data_dir),
            memory_storage,
            default_branch: var("REPOCATALOG_DEFAULT_BRANCH")
                .filter(|b| !b.trim().is_empty())
                .unwrap_or(defaults.default_branch),
            request_timeout,
        }
    }
}

pub struct Container {
    repo_store: Arc<dyn RepoStore>,
    authorization: Arc<dyn AuthorizationProvider>,
    config: ContainerConfig,
}

impl Container {
    /// Wires the catalog. Without an authorization provider every private
    /// repository stays hidden from gated requests.
    pub fn new(
        config: ContainerConfig,
        authorization: Option<Arc<dyn AuthorizationProvider>>,
    ) -> Result<Self> {
        let repo_store: Arc<dyn RepoStore> = if config.memory_storage {
            debug!("Using in-memory repository storage");
            Arc::new(InMemoryRepoStore::new())
        } else {
            let data_dir = expand_tilde(&config.data_dir);
            std::fs::create_dir_all(&data_dir)?;
            let db_path = PathBuf::from(&data_dir).join(DB_FILE_NAME);

            match DuckdbRepoStore::new(&db_path) {
                Ok(store) => {
                    debug!("Using DuckDB repository storage at {:?}", db_path);
                    Arc::new(store)
                }
                Err(e) => {
                    warn!(
                        "Failed to initialize DuckDB ({}): {}. Falling back to in-memory storage.",
                        db_path.display(),
                        e
                    );
                    Arc::new(InMemoryRepoStore::new())
                }
            }
        };

        let authorization = authorization.unwrap_or_else(|| {
            debug!("No authorization provider configured; private repositories are hidden");
            Arc::new(DenyAllAuthorizationProvider) as Arc<dyn AuthorizationProvider>
        });

        Ok(Self {
            repo_store,
            authorization,
            config,
        })
    }

    pub fn create_use_case(&self) -> CreateRepoUseCase {
        CreateRepoUseCase::new(self.repo_store.clone())
            .with_default_branch(self.config.default_branch.clone())
    }

    pub fn get_use_case(&self) -> GetRepoUseCase {
        GetRepoUseCase::new(self.repo_store.clone(), self.authorization.clone())
    }

    pub fn list_use_case(&self) -> ListReposUseCase {
        ListReposUseCase::new(self.repo_store.clone(), self.authorization.clone())
    }

    /// A gated context for `actor`, carrying the configured request timeout.
    pub fn request_context(&self, actor: Actor) -> RequestContext {
        let ctx = RequestContext::new(actor);
        match self.config.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }

    pub fn memory_storage(&self) -> bool {
        self.config.memory_storage
    }

    pub fn authorization_provider(&self) -> &str {
        self.authorization.name()
    }
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ContainerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ContainerConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.data_dir, DEFAULT_DATA_DIR);
        assert!(!config.memory_storage);
        assert_eq!(config.default_branch, DEFAULT_BRANCH);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("REPOCATALOG_DATA_DIR", "/tmp/catalog"),
            ("REPOCATALOG_MEMORY_STORAGE", "TRUE"),
            ("REPOCATALOG_DEFAULT_BRANCH", "main"),
            ("REPOCATALOG_REQUEST_TIMEOUT_MS", "250"),
        ]);
        assert_eq!(config.data_dir, "/tmp/catalog");
        assert!(config.memory_storage);
        assert_eq!(config.default_branch, "main");
        assert_eq!(config.request_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn invalid_timeout_and_blank_branch_are_ignored() {
        let config = config_from(&[
            ("REPOCATALOG_REQUEST_TIMEOUT_MS", "soon"),
            ("REPOCATALOG_DEFAULT_BRANCH", "  "),
        ]);
        assert!(config.request_timeout.is_none());
        assert_eq!(config.default_branch, DEFAULT_BRANCH);
    }

    #[test]
    fn expand_tilde_leaves_other_paths() {
        assert_eq!(expand_tilde("/var/data"), "/var/data");
        assert_eq!(expand_tilde("rel/~"), "rel/~");
    }

    #[tokio::test]
    async fn memory_container_uses_configured_default_branch() {
        let config = ContainerConfig {
            memory_storage: true,
            default_branch: "trunk".to_string(),
            ..ContainerConfig::default()
        };
        let container = Container::new(config, None).unwrap();
        assert!(container.memory_storage());
        assert_eq!(container.data_dir(), DEFAULT_DATA_DIR);
        assert_eq!(container.authorization_provider(), "deny-all");

        let ctx = container
            .request_context(Actor::anonymous())
            .with_insecure_skip(true);
        container
            .create_use_case()
            .try_insert_new(&ctx, "a/b", "", false, false)
            .await
            .unwrap();

        let repo = container.get_use_case().get_by_uri(&ctx, "a/b").await.unwrap();
        assert_eq!(repo.default_branch(), "trunk");
    }

    #[test]
    fn request_context_applies_timeout() {
        let config = ContainerConfig {
            memory_storage: true,
            request_timeout: Some(Duration::from_secs(5)),
            ..ContainerConfig::default()
        };
        let container = Container::new(config, None).unwrap();
        let ctx = container.request_context(Actor::anonymous());
        assert!(ctx.deadline().is_some());
        assert!(!ctx.insecure_skip());
    }
}
