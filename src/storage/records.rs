//! Persistent record storage: one JSON array file plus an id-counter sidecar.

use crate::domain::Certificate;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Storage seam for the certificate collection.
///
/// Operations work on the whole collection; callers serialise access themselves.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads every record in stored (insertion) order.
    async fn load(&self) -> Result<Vec<Certificate>>;

    /// Replaces the stored collection.
    async fn save(&self, records: &[Certificate]) -> Result<()>;

    /// Hands out the next id and persists the counter past it.
    ///
    /// Ids are never reused, even after the record holding the highest id is deleted.
    async fn allocate_id(&self, records: &[Certificate]) -> Result<i64>;
}

/// `RecordStore` backed by a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    seq_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seq_path = sibling(&path, ".seq");
        Self { path, seq_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seq_path(&self) -> &Path {
        &self.seq_path
    }

    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Creates the parent directory and an empty `[]` file if they are missing.
    pub async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        if !self.exists().await {
            write_atomically(&self.path, b"[]").await?;
            info!(path = %self.path.display(), "Initialized empty certificates file");
        }
        Ok(())
    }

    async fn read_counter(&self) -> Result<i64> {
        match fs::read_to_string(&self.seq_path).await {
            Ok(s) => s
                .trim()
                .parse::<i64>()
                .with_context(|| format!("corrupt id counter in {}", self.seq_path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", self.seq_path.display()))
            }
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Certificate>> {
        let data = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let records: Vec<Certificate> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        debug!(count = records.len(), "Loaded certificates");
        Ok(records)
    }

    async fn save(&self, records: &[Certificate]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomically(&self.path, json.as_bytes()).await?;
        debug!(count = records.len(), "Saved certificates");
        Ok(())
    }

    async fn allocate_id(&self, records: &[Certificate]) -> Result<i64> {
        let counter = self.read_counter().await?;
        let after_existing = records
            .iter()
            .map(|c| c.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .context("id space exhausted")?;
        let id = counter.max(after_existing).max(1);
        let next = id.checked_add(1).context("id space exhausted")?;
        write_atomically(&self.seq_path, next.to_string().as_bytes()).await?;
        Ok(id)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes to `<path>.tmp` then renames over `path`, so readers never see a partial file.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
