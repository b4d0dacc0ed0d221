use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{CommitOutcome, SeatStore};
use crate::config::StorageBackend;
use crate::error::{StoreError, StoreResult};
use crate::models::{Seat, SeatState};

/// On-disk layout: `{ "seats": [ ... ] }`, rewritten wholesale on every commit.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SeatDocument {
    seats: Vec<Seat>,
}

/// Seat store backed by a single JSON document.
///
/// Every load re-reads the file, so other processes sharing the document observe
/// each commit. Writes go to a sibling temp file that is renamed over the
/// document, so a reader sees either the old or the new document in full.
#[derive(Debug)]
pub struct FileSeatStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileSeatStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> StoreResult<Option<SeatDocument>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut doc: SeatDocument = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Malformed(format!("{}: {}", self.path.display(), e))
        })?;
        doc.seats.sort_by_key(|s| s.number);
        Ok(Some(doc))
    }

    async fn write_document(&self, doc: &SeatDocument) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "seats.json".into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SeatStore for FileSeatStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::File
    }

    async fn initialize(&self, total_seats: u32) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(doc) = self.read_document().await? {
            if !doc.seats.is_empty() {
                debug!("Seat document {} already holds {} seats", self.path.display(), doc.seats.len());
                return Ok(());
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let doc = SeatDocument {
            seats: (1..=total_seats).map(Seat::free).collect(),
        };
        self.write_document(&doc).await?;
        info!("Initialized {} seats in {}", total_seats, self.path.display());
        Ok(())
    }

    async fn load(&self) -> StoreResult<Vec<Seat>> {
        match self.read_document().await? {
            Some(doc) => Ok(doc.seats),
            None => Err(StoreError::Unavailable(format!(
                "seat document {} does not exist",
                self.path.display()
            ))),
        }
    }

    async fn find_by_number(&self, number: u32) -> StoreResult<Option<Seat>> {
        let seats = self.load().await?;
        Ok(seats.into_iter().find(|s| s.number == number))
    }

    async fn commit(&self, seat: &Seat, expected: SeatState) -> StoreResult<CommitOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_document().await?.ok_or_else(|| {
            StoreError::Unavailable(format!("seat document {} does not exist", self.path.display()))
        })?;

        match doc.seats.iter_mut().find(|s| s.number == seat.number) {
            Some(current) if current.state() == expected => *current = seat.clone(),
            _ => return Ok(CommitOutcome::Conflict),
        }
        self.write_document(&doc).await?;
        Ok(CommitOutcome::Committed)
    }
}
