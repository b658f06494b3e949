use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use paper_logging::paper_debug;

use crate::{
    ArchiveEntry, DirectoryPersister, DownloadKind, DownloadOrchestrator, EngineEvent,
    FetchGateway, GatewaySettings, NetworkError, ReqwestGateway, RequestId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    FetchListing {
        request: RequestId,
        category: String,
        skip: u32,
    },
    FetchSearch {
        request: RequestId,
        query: String,
    },
    DownloadSingle {
        pdf_url: String,
        title: String,
    },
    DownloadBulk {
        entries: Vec<ArchiveEntry>,
    },
}

/// Runs commands on a background tokio runtime. Every command is its own task,
/// so events come back in completion order, not submission order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Engine talking to the remote service and saving downloads into `persister`.
    pub fn new(settings: GatewaySettings, persister: DirectoryPersister) -> Result<Self, NetworkError> {
        let gateway = Arc::new(ReqwestGateway::new(settings)?);
        let downloads = DownloadOrchestrator::new(gateway.clone(), Arc::new(persister));
        Ok(Self::with_parts(gateway, downloads))
    }

    pub fn with_parts(fetcher: Arc<dyn FetchGateway>, downloads: DownloadOrchestrator) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let downloads = downloads.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), &downloads, command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// `Timeout` when nothing completed in time, `Disconnected` once the engine thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

async fn handle_command(
    fetcher: &dyn FetchGateway,
    downloads: &DownloadOrchestrator,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchListing {
            request,
            category,
            skip,
        } => {
            let result = fetcher.fetch_listing(&category, skip).await;
            paper_debug!("Listing request={} ok={}", request, result.is_ok());
            EngineEvent::ListingFetched { request, result }
        }
        EngineCommand::FetchSearch { request, query } => {
            let result = fetcher.fetch_search(&query).await;
            paper_debug!("Search request={} ok={}", request, result.is_ok());
            EngineEvent::SearchFetched { request, result }
        }
        EngineCommand::DownloadSingle { pdf_url, title } => EngineEvent::DownloadCompleted {
            kind: DownloadKind::Single,
            result: downloads.download_single(&pdf_url, &title).await,
        },
        EngineCommand::DownloadBulk { entries } => EngineEvent::DownloadCompleted {
            kind: DownloadKind::Bulk,
            result: downloads.download_bulk(&entries).await,
        },
    };
    let _ = event_tx.send(event);
}
