use std::fmt;
use std::path::PathBuf;

use crate::DownloadError;

/// Opaque tag the caller attaches to a fetch; echoed back on completion.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub title: String,
    pub authors: String,
    pub subjects_or_abstract: String,
    pub pdf_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub papers: Vec<Paper>,
    pub total_entries: u32,
}

/// One `[pdf_url, title]` pair of a bulk archive request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub pdf_url: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Single,
    Bulk,
}

#[derive(Debug)]
pub enum EngineEvent {
    ListingFetched {
        request: RequestId,
        result: Result<Listing, NetworkError>,
    },
    SearchFetched {
        request: RequestId,
        result: Result<Vec<Paper>, NetworkError>,
    },
    DownloadCompleted {
        kind: DownloadKind,
        result: Result<PathBuf, DownloadError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct NetworkError {
    pub kind: FailureKind,
    pub message: String,
}

impl NetworkError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// The body was not the JSON shape the endpoint promises.
    Decode,
    /// The remote answered but reported a failure of its own.
    Remote,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Remote => write!(f, "remote error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
