//! Paper browser core: pure paging state machine, pagination and view-model helpers.
mod effect;
mod msg;
mod pagination;
mod state;
mod update;
mod view_model;

pub use effect::{BulkItem, Effect};
pub use msg::Msg;
pub use pagination::{compute as compute_pages, PageLink};
pub use state::{
    DownloadJob, DownloadKind, DownloadOutcome, DownloadStatus, Generation, PageState,
    PageStatus, Paper, Selector, PAGE_SIZE,
};
pub use update::update;
pub use view_model::PageViewModel;
