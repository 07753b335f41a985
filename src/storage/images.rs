//! Image blob storage.
//!
//! Images are plain files in one directory, named `<unix-millis>-<random>.<ext>` and referenced
//! from records by their public path `/images/<file>`.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/images";

// A clash needs the same millisecond and the same random suffix; retry rather than overwrite.
const MAX_NAME_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct ImageStore {
    root_dir: PathBuf,
}

impl ImageStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Ensure directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root_dir)
            .await
            .with_context(|| format!("failed to create {}", self.root_dir.display()))?;
        info!(path = %self.root_dir.display(), "Initialized image store");
        Ok(())
    }

    pub fn generate_file_name(extension: &str) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..=1_000_000_000);
        format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, extension)
    }

    /// Maps a public path (`/images/<file>`) to the file on disk.
    ///
    /// Only the final path component is used, so the result always lies inside the root.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let name = Path::new(public_path).file_name()?;
        Some(self.root_dir.join(name))
    }

    /// Writes a new image and returns its public path.
    pub async fn store(&self, bytes: &[u8], extension: &str) -> Result<String> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = Self::generate_file_name(extension);
            let path = self.root_dir.join(&name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to create {}", path.display()))
                }
            };

            if let Err(e) = write_all(&mut file, bytes).await {
                drop(file);
                fs::remove_file(&path).await.ok();
                return Err(e).with_context(|| format!("failed to write {}", path.display()));
            }

            debug!(file = %name, size_bytes = bytes.len(), "Stored image");
            return Ok(format!("{}/{}", PUBLIC_PREFIX, name));
        }
        Err(anyhow::anyhow!(
            "could not find a free image file name after {} attempts",
            MAX_NAME_ATTEMPTS
        ))
    }

    /// Deletes the image behind `public_path`. Returns `false` if it was already gone.
    pub async fn remove(&self, public_path: &str) -> Result<bool> {
        let Some(path) = self.resolve(public_path) else {
            warn!(image = %public_path, "Record image path has no file name; nothing to delete");
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed image");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("failed to delete {}", path.display())),
        }
    }

    pub async fn exists(&self, public_path: &str) -> bool {
        match self.resolve(public_path) {
            Some(path) => fs::metadata(path).await.is_ok(),
            None => false,
        }
    }

    /// Writes and deletes a scratch file.
    pub async fn check_writable(&self) -> Result<()> {
        let scratch = self.root_dir.join(".write-check");
        fs::write(&scratch, b"ok")
            .await
            .with_context(|| format!("{} is not writable", self.root_dir.display()))?;
        fs::remove_file(&scratch).await?;
        Ok(())
    }
}

async fn write_all(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
