//! JSON shapes of the remote listing and search endpoints.
//!
//! The remote scrapes its upstream and leaves out fields it could not find,
//! so every string defaults to empty.

use serde::Deserialize;

use crate::Paper;

#[derive(Debug, Deserialize)]
pub(crate) struct ListingResponse {
    #[serde(default)]
    pub papers: Vec<ListingEntry>,
    pub total_entries: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: String,
    #[serde(default)]
    subjects: String,
    #[serde(default)]
    pdf_url: String,
}

impl From<ListingEntry> for Paper {
    fn from(entry: ListingEntry) -> Self {
        Paper {
            title: entry.title,
            authors: entry.authors,
            subjects_or_abstract: entry.subjects,
            pdf_url: entry.pdf_url,
        }
    }
}

/// Failures inside the search endpoint come back as `200 {"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: String,
    #[serde(default, rename = "abstract")]
    summary: String,
    #[serde(default)]
    pdf_url: String,
}

impl From<SearchEntry> for Paper {
    fn from(entry: SearchEntry) -> Self {
        Paper {
            title: entry.title,
            authors: entry.authors,
            subjects_or_abstract: entry.summary,
            pdf_url: entry.pdf_url,
        }
    }
}
