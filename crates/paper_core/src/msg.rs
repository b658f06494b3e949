use crate::{DownloadKind, DownloadOutcome, Generation, Paper};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User opened a category listing (always starts at the first page).
    CategorySelected(String),
    /// User submitted a free-text search.
    SearchSubmitted(String),
    /// User clicked a page in the pagination strip.
    PageSelected(u32),
    NextPage,
    PreviousPage,
    /// Re-issue the current selector at the current skip.
    Refresh,
    /// User left the listing; in-flight responses must no longer apply.
    NavigatedAway,
    /// Engine completion for a listing fetch.
    ListingLoaded {
        generation: Generation,
        papers: Vec<Paper>,
        total_entries: u32,
    },
    /// Engine completion for a search fetch.
    SearchLoaded {
        generation: Generation,
        papers: Vec<Paper>,
    },
    /// Engine failure for either fetch kind.
    FetchFailed {
        generation: Generation,
        message: String,
    },
    /// User asked for the PDF of the paper at `index` on the current page.
    DownloadClicked { index: usize },
    /// Download a PDF that is not necessarily on the current page.
    DownloadRequested { pdf_url: String, title: String },
    /// User asked for every paper on the current page as one archive.
    DownloadAllClicked,
    /// Engine completion for a download.
    DownloadFinished {
        kind: DownloadKind,
        outcome: DownloadOutcome,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
