use crate::pagination;
use crate::view_model::PageViewModel;
use crate::Effect;

/// Entries per listing page on the remote service.
pub const PAGE_SIZE: u32 = 50;

/// Identifies the most recently initiated fetch; responses tagged with an
/// older generation are discarded.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub title: String,
    pub authors: String,
    /// Subjects for listing entries, the abstract for search results.
    pub subjects_or_abstract: String,
    pub pdf_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Category(String),
    Search(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Single,
    Bulk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    InFlight,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { location: String },
    Failed { message: String },
}

/// The last download the user started. `None` on [`PageState`] means idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub kind: DownloadKind,
    pub status: DownloadStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    selector: Option<Selector>,
    skip: u32,
    page_size: u32,
    total_entries: u32,
    items: Vec<Paper>,
    status: PageStatus,
    generation: Generation,
    error: Option<String>,
    download: Option<DownloadJob>,
    dirty: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            selector: None,
            skip: 0,
            page_size: PAGE_SIZE,
            total_entries: 0,
            items: Vec::new(),
            status: PageStatus::Idle,
            generation: 0,
            error: None,
            download: None,
            dirty: false,
        }
    }
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_entries(&self) -> u32 {
        self.total_entries
    }

    pub fn items(&self) -> &[Paper] {
        &self.items
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn download(&self) -> Option<&DownloadJob> {
        self.download.as_ref()
    }

    pub fn download_in_flight(&self) -> bool {
        matches!(
            self.download,
            Some(DownloadJob {
                status: DownloadStatus::InFlight,
                ..
            })
        )
    }

    pub fn view(&self) -> PageViewModel {
        let pages = match self.selector {
            Some(Selector::Category(_)) => {
                pagination::compute(self.total_entries, self.page_size, self.skip)
            }
            Some(Selector::Search(_)) | None => Vec::new(),
        };
        PageViewModel {
            selector: self.selector.clone(),
            status: self.status,
            skip: self.skip,
            page_size: self.page_size,
            total_entries: self.total_entries,
            papers: self.items.clone(),
            pages,
            error: self.error.clone(),
            download: self.download.clone(),
            download_controls_enabled: self.selector.is_some() && !self.download_in_flight(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.selector.is_some() && generation == self.generation
    }

    /// A valid skip is page-aligned and inside the listing (only 0 for an empty one).
    pub(crate) fn is_valid_skip(&self, skip: u32) -> bool {
        skip % self.page_size == 0 && (skip == 0 || skip < self.total_entries)
    }

    /// Replaces the selector and drops everything fetched for the previous one.
    pub(crate) fn select(&mut self, selector: Selector) {
        self.selector = Some(selector);
        self.skip = 0;
        self.total_entries = 0;
        self.items.clear();
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_skip(&mut self, skip: u32) {
        self.skip = skip;
        self.mark_dirty();
    }

    /// Bumps the generation and returns the fetch for the current selector.
    pub(crate) fn start_fetch(&mut self) -> Option<Effect> {
        let selector = self.selector.clone()?;
        self.generation += 1;
        self.status = PageStatus::Loading;
        self.error = None;
        self.mark_dirty();
        let generation = self.generation;
        Some(match selector {
            Selector::Category(category) => Effect::FetchListing {
                generation,
                category,
                skip: self.skip,
            },
            Selector::Search(query) => Effect::FetchSearch { generation, query },
        })
    }

    pub(crate) fn apply_listing(&mut self, mut papers: Vec<Paper>, total_entries: u32) {
        papers.truncate(self.page_size as usize);
        self.items = papers;
        self.total_entries = total_entries;
        self.status = PageStatus::Loaded;
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn apply_search(&mut self, mut papers: Vec<Paper>) {
        papers.truncate(self.page_size as usize);
        self.total_entries = papers.len() as u32;
        self.items = papers;
        self.status = PageStatus::Loaded;
        self.error = None;
        self.mark_dirty();
    }

    /// Items and totals from the last success stay on screen.
    pub(crate) fn apply_failure(&mut self, message: String) {
        self.status = PageStatus::Error;
        self.error = Some(message);
        self.mark_dirty();
    }

    /// Moves skip back onto the listing after the total shrank under it.
    /// Returns true when skip changed.
    pub(crate) fn clamp_skip(&mut self) -> bool {
        if self.is_valid_skip(self.skip) {
            return false;
        }
        let last_page_skip = if self.total_entries == 0 {
            0
        } else {
            (self.total_entries - 1) / self.page_size * self.page_size
        };
        self.set_skip(last_page_skip);
        true
    }

    /// Discards the selector; bumping the generation retires in-flight fetches.
    pub(crate) fn leave(&mut self) {
        self.selector = None;
        self.generation += 1;
        self.skip = 0;
        self.total_entries = 0;
        self.items.clear();
        self.status = PageStatus::Idle;
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn start_download(&mut self, kind: DownloadKind) {
        self.download = Some(DownloadJob {
            kind,
            status: DownloadStatus::InFlight,
            message: None,
        });
        self.mark_dirty();
    }

    /// Returns false when no download of `kind` was in flight.
    pub(crate) fn finish_download(&mut self, kind: DownloadKind, outcome: DownloadOutcome) -> bool {
        match &mut self.download {
            Some(job) if job.kind == kind && job.status == DownloadStatus::InFlight => {
                let (status, message) = match outcome {
                    DownloadOutcome::Saved { location } => (DownloadStatus::Done, location),
                    DownloadOutcome::Failed { message } => (DownloadStatus::Failed, message),
                };
                job.status = status;
                job.message = Some(message);
                self.dirty = true;
                true
            }
            _ => false,
        }
    }
}
