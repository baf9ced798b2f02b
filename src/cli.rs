//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};

/// Default seconds between status polls with `create --async --wait`.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Generate PDF and XPS documents with DocRaptor.
///
/// The API key is taken from --api-key or DOCRAPTOR_API_KEY; the service URL
/// from --base-url or DOCRAPTOR_URL.
#[derive(Parser, Debug)]
#[command(name = "docraptor")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API key (overrides DOCRAPTOR_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Service base URL (overrides DOCRAPTOR_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Service operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a document from HTML content or a URL
    Create(CreateArgs),
    /// List previously created documents
    List(ListArgs),
    /// Show the status of an async job
    Status(StatusArgs),
    /// Download a finished async document
    Download(DownloadArgs),
}

/// Arguments for `docraptor create`.
#[derive(ClapArgs, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["content", "content_file", "url"])
))]
pub struct CreateArgs {
    /// Inline HTML to render
    #[arg(long)]
    pub content: Option<String>,

    /// File containing the HTML to render
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Publicly reachable URL to render
    #[arg(long)]
    pub url: Option<String>,

    /// Document name
    #[arg(long)]
    pub name: Option<String>,

    /// Output type, sent to the service as given (default pdf)
    #[arg(long = "type")]
    pub document_type: Option<String>,

    /// Create a free, watermarked test document
    #[arg(long)]
    pub test: bool,

    /// Queue an async job and print its status id
    #[arg(long = "async")]
    pub async_job: bool,

    /// With --async, poll until the job finishes and download the result
    #[arg(long, requires = "async_job")]
    pub wait: bool,

    /// Seconds between status polls (1-300)
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub poll_interval: u64,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report service failures as typed errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `docraptor list`.
#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// Page to fetch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Documents per page (1-100)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=100))]
    pub per_page: u64,

    /// Report service failures as typed errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `docraptor status`.
#[derive(ClapArgs, Debug)]
pub struct StatusArgs {
    /// Job status id returned by `create --async`
    pub id: String,

    /// Report service failures as typed errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `docraptor download`.
#[derive(ClapArgs, Debug)]
pub struct DownloadArgs {
    /// Download key reported by a completed status
    pub key: String,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
