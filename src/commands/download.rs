//! Download command handler: fetch a finished document.

use std::path::Path;

use anyhow::{Result, bail};
use docraptor::DocRaptor;
use tracing::info;

use crate::cli::DownloadArgs;

use super::{persist_tempfile, write_output};

pub async fn run_download_command(client: &DocRaptor, args: &DownloadArgs) -> Result<()> {
    save_download(client, Some(&args.key), args.output.as_deref()).await
}

/// Downloads `key` (or the client's cached key) to `output` or stdout.
pub(super) async fn save_download(
    client: &DocRaptor,
    key: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            let bytes = client
                .download_with(key, |file, meta| persist_tempfile(file, meta, path))
                .await??;
            info!(path = %path.display(), bytes, "document saved");
            Ok(())
        }
        None => {
            let response = client.download(key).await?;
            if !response.is_success() {
                bail!(
                    "document download failed (HTTP {}): {}",
                    response.status(),
                    response.text().trim()
                );
            }
            write_output(response.body())
        }
    }
}
