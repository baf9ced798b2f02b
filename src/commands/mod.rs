//! CLI command handlers.

mod create;
mod download;
mod list;
mod status;

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use docraptor::ResponseMeta;
use tempfile::NamedTempFile;

pub use create::run_create_command;
pub use download::run_download_command;
pub use list::run_list_command;
pub use status::run_status_command;

/// Writes `bytes` to stdout.
fn write_output(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes).context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")
}

/// Copies a buffered document into `path`, refusing failed responses.
fn persist_tempfile(file: &mut NamedTempFile, meta: &ResponseMeta, path: &Path) -> Result<u64> {
    if !meta.is_success() {
        let mut body = Vec::new();
        file.read_to_end(&mut body)
            .context("failed to read error response body")?;
        bail!(
            "request failed (HTTP {}): {}",
            meta.status(),
            String::from_utf8_lossy(&body).trim()
        );
    }
    let mut out = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    std::io::copy(file, &mut out).with_context(|| format!("failed to write {}", path.display()))
}
