use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

use crate::{Error, Result};

/// A persisted blog article, created only after a full pipeline success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogRecord {
    pub id: Uuid,
    pub owner: String,
    pub source_title: String,
    pub source_link: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl BlogRecord {
    pub fn new(owner: &str, source_title: &str, source_link: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            source_title: source_title.to_string(),
            source_link: source_link.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Persistence collaborator for blog records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn save(&self, record: &BlogRecord) -> Result<()>;

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<BlogRecord>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>>;
}

/// Where the store file lives: the configured path, or the platform data dir
pub fn resolve_store_path(config: &crate::config::Config) -> anyhow::Result<PathBuf> {
    match &config.app.store_path {
        Some(path) => Ok(path.clone()),
        None => Ok(dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
            .join("blogscribe")
            .join("blogs.jsonl")),
    }
}

/// File-backed store, one JSON record per line
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<Vec<BlogRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content =
            fs_err::read_to_string(&self.path).map_err(|e| Error::Persistence(e.to_string()))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| Error::Persistence(format!("corrupt store entry: {}", e)))
            })
            .collect()
    }
}

#[async_trait]
impl BlogStore for JsonFileStore {
    async fn save(&self, record: &BlogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs_err::create_dir_all(parent).map_err(|e| Error::Persistence(e.to_string()))?;
        }

        let line =
            serde_json::to_string(record).map_err(|e| Error::Persistence(e.to_string()))?;

        let mut file = fs_err::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Persistence(e.to_string()))?;

        writeln!(file, "{}", line).map_err(|e| Error::Persistence(e.to_string()))?;

        tracing::info!(id = %record.id, title = %record.source_title, "blog article saved");
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<BlogRecord>> {
        let records = self.read_all()?;
        Ok(records
            .into_iter()
            .filter(|record| record.owner == owner)
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>> {
        let records = self.read_all()?;
        Ok(records.into_iter().find(|record| record.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saved_records_are_listed_per_owner() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("blogs.jsonl"));

        let alice = BlogRecord::new("alice", "Demo Video", "https://youtu.be/abc123", "text a");
        let bob = BlogRecord::new("bob", "Other Video", "https://youtu.be/def456", "text b");

        store.save(&alice).await.unwrap();
        store.save(&bob).await.unwrap();

        let listed = store.list_by_owner("alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].source_title, "Demo Video");
    }

    #[tokio::test]
    async fn get_by_id_finds_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("blogs.jsonl"));

        let record = BlogRecord::new("alice", "Demo Video", "https://youtu.be/abc123", "text");
        store.save(&record).await.unwrap();

        let found = store.get_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.content, "text");

        let missing = store.get_by_id(Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("blogs.jsonl"));

        assert!(store.list_by_owner("alice").await.unwrap().is_empty());
    }
}
