//! Paper browser engine: remote gateway, downloads and effect execution.
mod download;
mod engine;
mod filename;
mod gateway;
mod persist;
mod types;
mod wire;

pub use download::{DownloadError, DownloadOrchestrator, DownloadSlot, SlotGuard};
pub use engine::{EngineCommand, EngineHandle};
pub use filename::{pdf_filename, remote_filename, ARCHIVE_FILENAME};
pub use gateway::{DownloadGateway, FetchGateway, GatewaySettings, ReqwestGateway};
pub use persist::{ensure_output_dir, AtomicFileWriter, DirectoryPersister, PersistError, Persister};
pub use types::{
    ArchiveEntry, DownloadKind, EngineEvent, FailureKind, Listing, NetworkError, Paper, RequestId,
};
