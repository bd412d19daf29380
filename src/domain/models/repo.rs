use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_BRANCH: &str = "master";

/// A repository record as stored in the catalog.
///
/// `uri` and `id` are immutable once assigned; `created_at` is set by the
/// store on first insert and never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    id: i64,
    uri: String,
    description: String,
    fork: bool,
    private: bool,
    default_branch: String,
    created_at: i64,
}

impl Repo {
    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(
        id: i64,
        uri: String,
        description: String,
        fork: bool,
        private: bool,
        default_branch: String,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            uri,
            description,
            fork,
            private,
            default_branch,
            created_at,
        }
    }

    /// Materializes a creation payload with the id and timestamp a store assigned.
    pub fn from_new(id: i64, new_repo: NewRepo, created_at: i64) -> Self {
        Self {
            id,
            uri: new_repo.uri,
            description: new_repo.description,
            fork: new_repo.fork,
            private: new_repo.private,
            default_branch: new_repo.default_branch,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_fork(&self) -> bool {
        self.fork
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Creation payload for [`Repo`]; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepo {
    uri: String,
    description: String,
    fork: bool,
    private: bool,
    default_branch: String,
}

impl NewRepo {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            description: String::new(),
            fork: false,
            private: false,
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_fork(mut self, fork: bool) -> Self {
        self.fork = fork;
        self
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_fork(&self) -> bool {
        self.fork
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Rejects URIs that can never be looked up again: empty, or padded with
    /// whitespace.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.uri.trim().is_empty() {
            return Err(DomainError::invalid_input("repository uri must not be empty"));
        }
        if self.uri.trim() != self.uri {
            return Err(DomainError::invalid_input(format!(
                "repository uri {:?} has leading or trailing whitespace",
                self.uri
            )));
        }
        Ok(())
    }
}

pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
