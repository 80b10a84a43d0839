//! JSON record store
//!
//! One file per detail page at `<output-dir>/<identifier>.json`. The output
//! directory is `<root>/<UTC date of run start>` and is created before any
//! worker starts.

use crate::listing::Listing;
use crate::CrawlError;
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Directory of persisted listing records for one run
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    temp_counter: AtomicU64,
}

impl JsonStore {
    /// Creates `<root>/<today, UTC>` with all parents
    pub async fn for_today(root: &Path) -> Result<Self, CrawlError> {
        Self::create(root, Utc::now().date_naive()).await
    }

    /// Creates `<root>/<date>` with all parents
    ///
    /// # Returns
    ///
    /// * `Ok(JsonStore)` - The directory exists and is ready for writes
    /// * `Err(CrawlError::OutputDir)` - The directory could not be created
    pub async fn create(root: &Path, date: NaiveDate) -> Result<Self, CrawlError> {
        let dir = root.join(date.format("%Y-%m-%d").to_string());

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| CrawlError::OutputDir {
                path: dir.display().to_string(),
                source,
            })?;

        Ok(Self {
            dir,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of the record with `identifier`
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}.json", identifier))
    }

    /// Writes `listing` as indented JSON under `identifier`
    ///
    /// The record is written to a temporary sibling and renamed into place,
    /// so readers never see a partial file. An existing record with the same
    /// identifier is replaced.
    pub async fn write(&self, identifier: &str, listing: &Listing) -> Result<PathBuf, CrawlError> {
        let json = listing.to_json()?;
        let path = self.path_for(identifier);

        let sequence = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .dir
            .join(format!(".{}.json.{}.tmp", identifier, sequence));

        let written = match tokio::fs::write(&temp, json.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&temp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // A failed write can leave a partial temp file behind
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::info!("Writing json to {}", path.display());
        Ok(path)
    }
}
