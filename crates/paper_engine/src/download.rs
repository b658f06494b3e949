use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use paper_logging::{paper_info, paper_warn};
use thiserror::Error;

use crate::filename::{pdf_filename, remote_filename, ARCHIVE_FILENAME};
use crate::{ArchiveEntry, DownloadGateway, NetworkError, PersistError, Persister};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("another download is already in progress")]
    Busy,
    #[error("download failed: {0}")]
    Network(#[from] NetworkError),
    #[error("could not save download: {0}")]
    Persist(#[from] PersistError),
}

/// Single-slot busy flag shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct DownloadSlot {
    busy: Arc<AtomicBool>,
}

impl DownloadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the slot without waiting. `None` while another guard is alive.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot when dropped, including when the owning future is dropped.
#[derive(Debug)]
pub struct SlotGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Runs single and bulk downloads one at a time and saves the payloads.
#[derive(Clone)]
pub struct DownloadOrchestrator {
    gateway: Arc<dyn DownloadGateway>,
    persister: Arc<dyn Persister>,
    slot: DownloadSlot,
}

impl DownloadOrchestrator {
    pub fn new(gateway: Arc<dyn DownloadGateway>, persister: Arc<dyn Persister>) -> Self {
        Self {
            gateway,
            persister,
            slot: DownloadSlot::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Fetches one PDF through the remote and saves it as `{Title_With_Underscores}.pdf`.
    pub async fn download_single(&self, pdf_url: &str, title: &str) -> Result<PathBuf, DownloadError> {
        // Taken before the first await; a second caller is refused without any request.
        let _guard = self.slot.try_acquire().ok_or(DownloadError::Busy)?;

        let filename = pdf_filename(title);
        paper_info!("Downloading {} as {}", pdf_url, filename);
        let bytes = self
            .gateway
            .download_pdf(pdf_url, &remote_filename(title))
            .await
            .inspect_err(|err| paper_warn!("Download of {} failed: {}", pdf_url, err))?;

        self.save(&bytes, &filename)
    }

    /// Sends every entry, in order, to the archive endpoint and saves the result
    /// as `papers.zip`. An empty list is sent as well.
    pub async fn download_bulk(&self, entries: &[ArchiveEntry]) -> Result<PathBuf, DownloadError> {
        let _guard = self.slot.try_acquire().ok_or(DownloadError::Busy)?;

        paper_info!("Requesting archive of {} papers", entries.len());
        let bytes = self
            .gateway
            .download_archive(entries)
            .await
            .inspect_err(|err| paper_warn!("Archive download failed: {}", err))?;

        self.save(&bytes, ARCHIVE_FILENAME)
    }

    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, DownloadError> {
        let path = self
            .persister
            .persist(bytes, filename)
            .inspect_err(|err| paper_warn!("Saving {} failed: {}", filename, err))?;
        paper_info!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }
}
