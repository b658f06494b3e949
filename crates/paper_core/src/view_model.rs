use crate::{DownloadJob, PageLink, PageStatus, Paper, Selector};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageViewModel {
    pub selector: Option<Selector>,
    pub status: PageStatus,
    pub skip: u32,
    pub page_size: u32,
    pub total_entries: u32,
    pub papers: Vec<Paper>,
    /// Derived on every call to `PageState::view`; empty for search results.
    pub pages: Vec<PageLink>,
    pub error: Option<String>,
    pub download: Option<DownloadJob>,
    pub download_controls_enabled: bool,
    pub dirty: bool,
}
