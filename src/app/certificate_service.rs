//! The Certificate Service.
//!
//! Single owner of the records file and the image directory. Every operation is a full
//! read-modify-write cycle, so callers must hold exclusive access (the HTTP layer keeps the
//! service behind a mutex).

use crate::app::error::{StoreError, StoreResult};
use crate::domain::{sort_by_date_desc, Certificate, CertificateDraft};
use crate::infra::config::StoreConfig;
use crate::storage::{ImageStore, JsonFileStore, RecordStore};
use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

pub struct CertificateService {
    records: Box<dyn RecordStore>,
    images: ImageStore,
}

impl CertificateService {
    pub fn new(records: Box<dyn RecordStore>, images: ImageStore) -> Self {
        Self { records, images }
    }

    /// Opens the JSON-file backed service, creating the records file and image directory on
    /// first run.
    pub async fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        let records = JsonFileStore::new(&config.certificates_file);
        records.init().await?;
        let images = ImageStore::new(&config.images_dir);
        images.init().await?;
        Ok(Self::new(Box::new(records), images))
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Validates the draft, stores its image and appends the new record.
    ///
    /// Validation happens before any disk access. If the records file cannot be rewritten, the
    /// image written for this call is removed again.
    pub async fn create(&self, draft: CertificateDraft) -> StoreResult<Certificate> {
        let new = draft.validate().map_err(StoreError::Validation)?;

        let mut records = self.records.load().await?;
        let id = self.records.allocate_id(&records).await?;
        let image = self
            .images
            .store(&new.image.bytes, new.image.extension())
            .await?;

        let certificate = Certificate {
            id,
            title: new.title,
            issuer: new.issuer,
            date: new.date,
            image,
            short_description: new.short_description,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        records.push(certificate.clone());

        if let Err(e) = self.records.save(&records).await {
            if let Err(cleanup) = self.images.remove(&certificate.image).await {
                warn!(image = %certificate.image, error = %cleanup, "Failed to remove orphaned image");
            }
            return Err(e.into());
        }

        info!(id = certificate.id, title = %certificate.title, "Certificate added");
        Ok(certificate)
    }

    /// All records, newest `date` first.
    pub async fn list(&self) -> StoreResult<Vec<Certificate>> {
        let mut records = self.records.load().await?;
        sort_by_date_desc(&mut records);
        Ok(records)
    }

    /// Removes the first record with `id` and its image. A missing image file is not an error.
    pub async fn delete(&self, id: i64) -> StoreResult<Certificate> {
        let mut records = self.records.load().await?;
        let index = records
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if !self.images.remove(&records[index].image).await? {
            warn!(id, image = %records[index].image, "Image already missing");
        }

        let removed = records.remove(index);
        self.records.save(&records).await?;

        info!(id, title = %removed.title, "Certificate deleted");
        Ok(removed)
    }

    /// Number of stored records. Fails if the records file is unreadable.
    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.records.load().await?.len())
    }
}
