use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use paper_core::{BulkItem, DownloadKind, DownloadOutcome, Effect, Msg, Paper};
use paper_engine::{ArchiveEntry, DownloadError, EngineCommand, EngineEvent, EngineHandle};
use paper_logging::{paper_debug, paper_info, paper_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            paper_debug!("Effect {:?}", effect);
            self.engine.send(to_command(effect));
        }
    }

    pub fn try_next(&self) -> Option<Msg> {
        self.engine.try_recv().map(to_msg)
    }

    pub fn next_timeout(&self, timeout: Duration) -> Result<Msg, RecvTimeoutError> {
        self.engine.recv_timeout(timeout).map(to_msg)
    }
}

fn to_command(effect: Effect) -> EngineCommand {
    match effect {
        Effect::FetchListing {
            generation,
            category,
            skip,
        } => EngineCommand::FetchListing {
            request: generation,
            category,
            skip,
        },
        Effect::FetchSearch { generation, query } => EngineCommand::FetchSearch {
            request: generation,
            query,
        },
        Effect::DownloadSingle { pdf_url, title } => {
            paper_info!("Download requested: {}", title);
            EngineCommand::DownloadSingle { pdf_url, title }
        }
        Effect::DownloadBulk { items } => EngineCommand::DownloadBulk {
            entries: items.into_iter().map(map_bulk_item).collect(),
        },
    }
}

fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ListingFetched { request, result } => match result {
            Ok(listing) => Msg::ListingLoaded {
                generation: request,
                papers: listing.papers.into_iter().map(map_paper).collect(),
                total_entries: listing.total_entries,
            },
            Err(err) => Msg::FetchFailed {
                generation: request,
                message: err.to_string(),
            },
        },
        EngineEvent::SearchFetched { request, result } => match result {
            Ok(papers) => Msg::SearchLoaded {
                generation: request,
                papers: papers.into_iter().map(map_paper).collect(),
            },
            Err(err) => Msg::FetchFailed {
                generation: request,
                message: err.to_string(),
            },
        },
        EngineEvent::DownloadCompleted { kind, result } => match result {
            Ok(path) => Msg::DownloadFinished {
                kind: map_kind(kind),
                outcome: DownloadOutcome::Saved {
                    location: path.display().to_string(),
                },
            },
            Err(err) => {
                if matches!(err, DownloadError::Busy) {
                    paper_warn!("Engine refused a download while busy");
                }
                Msg::DownloadFinished {
                    kind: map_kind(kind),
                    outcome: DownloadOutcome::Failed {
                        message: err.to_string(),
                    },
                }
            }
        },
    }
}

fn map_paper(paper: paper_engine::Paper) -> Paper {
    Paper {
        title: paper.title,
        authors: paper.authors,
        subjects_or_abstract: paper.subjects_or_abstract,
        pdf_url: paper.pdf_url,
    }
}

fn map_bulk_item(item: BulkItem) -> ArchiveEntry {
    ArchiveEntry {
        pdf_url: item.pdf_url,
        title: item.title,
    }
}

fn map_kind(kind: paper_engine::DownloadKind) -> DownloadKind {
    match kind {
        paper_engine::DownloadKind::Single => DownloadKind::Single,
        paper_engine::DownloadKind::Bulk => DownloadKind::Bulk,
    }
}
