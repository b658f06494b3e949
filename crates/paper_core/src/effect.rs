use crate::Generation;

/// IO requested by [`crate::update`]; executed by the engine, never by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchListing {
        generation: Generation,
        category: String,
        skip: u32,
    },
    FetchSearch {
        generation: Generation,
        query: String,
    },
    DownloadSingle {
        pdf_url: String,
        title: String,
    },
    /// Items keep the order they had on the page.
    DownloadBulk { items: Vec<BulkItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    pub pdf_url: String,
    pub title: String,
}
