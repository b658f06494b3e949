use std::time::Duration;

use futures_util::StreamExt;
use paper_logging::{paper_debug, paper_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::wire::{ListingResponse, SearchResponse};
use crate::{ArchiveEntry, FailureKind, Listing, NetworkError, Paper};

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Root of the remote service; endpoint paths are appended to it.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Bound for listing and search calls.
    pub request_timeout: Duration,
    /// Bound for PDF and archive downloads, which can be much larger.
    pub download_timeout: Duration,
    pub max_body_bytes: u64,
    pub max_download_bytes: u64,
}

impl GatewaySettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(300),
            max_body_bytes: 5 * 1024 * 1024,
            max_download_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Listing and search endpoints. Stateless: no caching, no retry.
#[async_trait::async_trait]
pub trait FetchGateway: Send + Sync {
    async fn fetch_listing(&self, category: &str, skip: u32) -> Result<Listing, NetworkError>;

    /// Callers must not pass an empty query.
    async fn fetch_search(&self, query: &str) -> Result<Vec<Paper>, NetworkError>;
}

/// PDF and archive endpoints; both return the raw payload.
#[async_trait::async_trait]
pub trait DownloadGateway: Send + Sync {
    async fn download_pdf(&self, pdf_url: &str, filename: &str) -> Result<Vec<u8>, NetworkError>;

    async fn download_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, NetworkError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, NetworkError> {
        if settings.base_url.cannot_be_a_base() {
            return Err(NetworkError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| NetworkError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, NetworkError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NetworkError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .push(path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        max_bytes: u64,
    ) -> Result<Vec<u8>, NetworkError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, NetworkError> {
        paper_debug!("GET {}", url);
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(self.settings.request_timeout);
        let body = self.send(request, self.settings.max_body_bytes).await?;
        serde_json::from_slice(&body)
            .map_err(|err| NetworkError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl FetchGateway for ReqwestGateway {
    async fn fetch_listing(&self, category: &str, skip: u32) -> Result<Listing, NetworkError> {
        let skip = skip.to_string();
        let url = self.endpoint("arxiv_papers", &[("category", category), ("skip", &skip)])?;
        let response: ListingResponse = self.get_json(url).await?;
        Ok(Listing {
            papers: response.papers.into_iter().map(Paper::from).collect(),
            total_entries: response.total_entries,
        })
    }

    async fn fetch_search(&self, query: &str) -> Result<Vec<Paper>, NetworkError> {
        let url = self.endpoint("search", &[("query", query)])?;
        let response: SearchResponse = self.get_json(url).await?;
        if let Some(message) = response.error {
            paper_warn!("Search for {:?} failed remotely: {}", query, message);
            return Err(NetworkError::new(FailureKind::Remote, message));
        }
        Ok(response.results.into_iter().map(Paper::from).collect())
    }
}

#[async_trait::async_trait]
impl DownloadGateway for ReqwestGateway {
    async fn download_pdf(&self, pdf_url: &str, filename: &str) -> Result<Vec<u8>, NetworkError> {
        let url = self.endpoint("download_pdf", &[("pdf_url", pdf_url), ("filename", filename)])?;
        paper_debug!("GET {}", url);
        let request = self.client.get(url).timeout(self.settings.download_timeout);
        self.send(request, self.settings.max_download_bytes).await
    }

    async fn download_archive(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, NetworkError> {
        let url = self.endpoint("download_all_pdfs", &[])?;
        let pairs: Vec<[&str; 2]> = entries
            .iter()
            .map(|entry| [entry.pdf_url.as_str(), entry.title.as_str()])
            .collect();
        let body = serde_json::to_vec(&pairs)
            .map_err(|err| NetworkError::new(FailureKind::Decode, err.to_string()))?;
        paper_debug!("POST {} entries={}", url, entries.len());
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(self.settings.download_timeout);
        self.send(request, self.settings.max_download_bytes).await
    }
}

fn too_large(max_bytes: u64, actual: u64) -> NetworkError {
    NetworkError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        return NetworkError::new(FailureKind::Timeout, err.to_string());
    }
    NetworkError::new(FailureKind::Network, err.to_string())
}
