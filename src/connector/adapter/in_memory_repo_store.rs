use std::collections::{hash_map::Entry, BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::RepoStore;
use crate::domain::{current_timestamp, DomainError, NewRepo, Repo};

#[derive(Default)]
struct Tables {
    /// Primary rows keyed by id, so iteration is ascending id order.
    rows: BTreeMap<i64, Repo>,
    /// Unique index on uri.
    by_uri: HashMap<String, i64>,
    next_id: i64,
}

/// Process-local catalog storage for tests and ephemeral catalogs.
pub struct InMemoryRepoStore {
    tables: Mutex<Tables>,
}

impl InMemoryRepoStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_id: 1,
                ..Tables::default()
            }),
        }
    }
}

impl Default for InMemoryRepoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoStore for InMemoryRepoStore {
    async fn try_insert_new(&self, repo: NewRepo) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id;

        match tables.by_uri.entry(repo.uri().to_string()) {
            Entry::Occupied(_) => {
                debug!("Repository {} already exists; insert ignored", repo.uri());
                return Ok(());
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        tables.next_id += 1;
        tables
            .rows
            .insert(id, Repo::from_new(id, repo, current_timestamp()));
        Ok(())
    }

    async fn find_by_uri(&self, uri: &str) -> Result<Option<Repo>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .by_uri
            .get(uri)
            .and_then(|id| tables.rows.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Repo>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables.rows.get(&id).cloned())
    }

    async fn scan(&self, filter: Option<&str>) -> Result<Vec<Repo>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .rows
            .values()
            .filter(|repo| filter.map_or(true, |needle| repo.uri().to_lowercase().contains(needle)))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables.rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_ascending_ids() {
        let store = InMemoryRepoStore::new();
        store.try_insert_new(NewRepo::new("a/b")).await.unwrap();
        store.try_insert_new(NewRepo::new("c/d")).await.unwrap();

        let first = store.find_by_uri("a/b").await.unwrap().unwrap();
        let second = store.find_by_uri("c/d").await.unwrap().unwrap();
        assert!(first.id() < second.id());
        assert_eq!(store.find_by_id(second.id()).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn duplicate_insert_keeps_original_record() {
        let store = InMemoryRepoStore::new();
        store
            .try_insert_new(NewRepo::new("a/b").with_description("first"))
            .await
            .unwrap();
        let original = store.find_by_uri("a/b").await.unwrap().unwrap();

        store
            .try_insert_new(NewRepo::new("a/b").with_description("second").with_private(true))
            .await
            .unwrap();

        let after = store.find_by_uri("a/b").await.unwrap().unwrap();
        assert_eq!(after, original);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn scan_applies_lowercase_filter_in_id_order() {
        let store = InMemoryRepoStore::new();
        for uri in ["Z/def", "a/b", "def/x"] {
            store.try_insert_new(NewRepo::new(uri)).await.unwrap();
        }

        let all: Vec<String> = store
            .scan(None)
            .await
            .unwrap()
            .iter()
            .map(|r| r.uri().to_string())
            .collect();
        assert_eq!(all, vec!["Z/def", "a/b", "def/x"]);

        let filtered: Vec<String> = store
            .scan(Some("def"))
            .await
            .unwrap()
            .iter()
            .map(|r| r.uri().to_string())
            .collect();
        assert_eq!(filtered, vec!["Z/def", "def/x"]);
    }

    #[tokio::test]
    async fn missing_records_are_none() {
        let store = InMemoryRepoStore::new();
        assert!(store.find_by_uri("nope").await.unwrap().is_none());
        assert!(store.find_by_id(42).await.unwrap().is_none());
    }
}
