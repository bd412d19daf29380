use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection, Params, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::RepoStore;
use crate::domain::{current_timestamp, DomainError, NewRepo, Repo};

const REPO_COLUMNS: &str = "id, uri, description, fork, private, default_branch, created_at";

/// DuckDB-backed catalog storage.
///
/// Uniqueness of `uri` is a table constraint; inserts use
/// `ON CONFLICT (uri) DO NOTHING` so racing creators all succeed and only
/// the first row survives.
pub struct DuckdbRepoStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbRepoStore {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE SEQUENCE IF NOT EXISTS repos_id_seq START 1;

            CREATE TABLE IF NOT EXISTS repos (
                id BIGINT PRIMARY KEY DEFAULT nextval('repos_id_seq'),
                uri TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                fork BOOLEAN NOT NULL DEFAULT false,
                private BOOLEAN NOT NULL DEFAULT false,
                default_branch TEXT NOT NULL,
                created_at BIGINT NOT NULL
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB repos schema initialized");
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> duckdb::Result<Repo> {
        Ok(Repo::reconstitute(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn query_one<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Option<Repo>, DomainError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params, Self::map_row) {
            Ok(repo) => Ok(Some(repo)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to query repository: {}",
                e
            ))),
        }
    }

    fn query_all<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<Repo>, DomainError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params, Self::map_row)
            .map_err(|e| DomainError::storage(format!("Failed to scan repositories: {}", e)))?;

        let mut repos = Vec::new();
        for row in rows {
            repos
                .push(row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?);
        }
        Ok(repos)
    }
}

#[async_trait]
impl RepoStore for DuckdbRepoStore {
    async fn try_insert_new(&self, repo: NewRepo) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;

        let inserted = conn
            .execute(
                r#"
                INSERT INTO repos (uri, description, fork, private, default_branch, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT (uri) DO NOTHING
                "#,
                params![
                    repo.uri(),
                    repo.description(),
                    repo.is_fork(),
                    repo.is_private(),
                    repo.default_branch(),
                    current_timestamp(),
                ],
            )
            .map_err(|e| DomainError::storage(format!("Failed to insert repository: {}", e)))?;

        if inserted == 0 {
            debug!("Repository {} already exists; insert ignored", repo.uri());
        }
        Ok(())
    }

    async fn find_by_uri(&self, uri: &str) -> Result<Option<Repo>, DomainError> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {} FROM repos WHERE uri = ?1", REPO_COLUMNS);
        Self::query_one(&conn, &sql, params![uri])
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Repo>, DomainError> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {} FROM repos WHERE id = ?1", REPO_COLUMNS);
        Self::query_one(&conn, &sql, params![id])
    }

    async fn scan(&self, filter: Option<&str>) -> Result<Vec<Repo>, DomainError> {
        let conn = self.conn.lock().await;

        match filter {
            Some(needle) => {
                let sql = format!(
                    "SELECT {} FROM repos WHERE contains(lower(uri), ?1) ORDER BY id",
                    REPO_COLUMNS
                );
                Self::query_all(&conn, &sql, params![needle])
            }
            None => {
                let sql = format!("SELECT {} FROM repos ORDER BY id", REPO_COLUMNS);
                Self::query_all(&conn, &sql, [])
            }
        }
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM repos", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count repositories: {}", e)))?;
        Ok(count as u64)
    }
}
