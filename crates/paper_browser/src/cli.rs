use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "paper-browser",
    version,
    about = "Browse, search and download papers from a remote paper repository"
)]
pub struct Cli {
    /// Root URL of the paper service.
    #[arg(long, env = "PAPER_BROWSER_BASE_URL", value_name = "URL")]
    pub base_url: Url,

    /// Directory that downloaded PDFs and archives are saved into.
    #[arg(long, value_name = "DIR", default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Timeout for listing and search requests.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Timeout for PDF and archive downloads.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub download_timeout_secs: u64,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of a category listing.
    List {
        /// Category code, e.g. cs.AI.
        category: String,
        /// 1-based page number.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Free-text search.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Download a single PDF.
    Download { pdf_url: String, title: String },
    /// Download every paper on a listing page as papers.zip.
    DownloadAll {
        category: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Interactive browsing session.
    Browse {
        /// Category to open first.
        category: Option<String>,
    },
}
