//! Create command handler: render a document, optionally via an async job.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use docraptor::{CreateOptions, DocRaptor, JobStatus};
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::CreateArgs;

use super::download::save_download;
use super::{persist_tempfile, write_output};

pub async fn run_create_command(client: &DocRaptor, args: &CreateArgs) -> Result<()> {
    let options = build_options(args)?.into_value();

    if args.async_job {
        let created = if args.strict {
            client.create_strict(options).await?
        } else {
            client.create(options).await?
        };
        let Some(status_id) = created.status_id() else {
            let response = created.response();
            bail!(
                "document creation failed (HTTP {}): {}",
                response.status(),
                response.text().trim()
            );
        };

        if !args.wait {
            println!("{status_id}");
            return Ok(());
        }
        info!(status_id, "waiting for async job");
        wait_for_completion(client, Duration::from_secs(args.poll_interval)).await?;
        return save_download(client, None, args.output.as_deref()).await;
    }

    if let Some(path) = args.output.as_deref() {
        let handler = |file: &mut tempfile::NamedTempFile, meta: &docraptor::ResponseMeta| {
            persist_tempfile(file, meta, path)
        };
        let bytes = if args.strict {
            client.create_strict_with(options, handler).await??
        } else {
            client.create_with(options, handler).await??
        };
        info!(path = %path.display(), bytes, "document saved");
        return Ok(());
    }

    let response = if args.strict {
        client.create_strict(options).await?
    } else {
        client.create(options).await?
    }
    .into_response();
    if !response.is_success() {
        bail!(
            "document creation failed (HTTP {}): {}",
            response.status(),
            response.text().trim()
        );
    }
    write_output(response.body())
}

fn build_options(args: &CreateArgs) -> Result<CreateOptions> {
    let mut options = if let Some(content) = &args.content {
        CreateOptions::from_content(content.clone())
    } else if let Some(path) = &args.content_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        CreateOptions::from_content(content)
    } else if let Some(url) = &args.url {
        CreateOptions::from_url(url.clone())
    } else {
        // clap enforces the source group; an empty mapping lets the client report it.
        CreateOptions::default()
    };

    if let Some(name) = &args.name {
        options = options.name(name.clone());
    }
    if let Some(document_type) = &args.document_type {
        options = options.document_type(document_type.clone());
    }
    Ok(options.test(args.test).async_job(args.async_job))
}

/// Polls the client's cached job until it completes or fails.
async fn wait_for_completion(client: &DocRaptor, interval: Duration) -> Result<()> {
    loop {
        let record = client.status_strict(None).await?;
        match record.status() {
            Some(JobStatus::Completed) => {
                info!(download_key = ?record.download_key(), "async job completed");
                return Ok(());
            }
            Some(JobStatus::Failed) => {
                bail!("document job failed: {}", Value::Object(record.fields().clone()));
            }
            status => {
                debug!(?status, "job not finished yet");
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Args, Command};

    fn create_args(argv: &[&str]) -> CreateArgs {
        let mut full = vec!["docraptor", "create"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full).unwrap().command {
            Command::Create(args) => args,
            other => panic!("expected create command, got {other:?}"),
        }
    }

    #[test]
    fn test_build_options_from_flags() {
        let args = create_args(&["--url", "https://example.com", "--type", "xls", "--test"]);
        let value = build_options(&args).unwrap().into_value();
        assert_eq!(value["document_url"], "https://example.com");
        assert_eq!(value["document_type"], "xls");
        assert_eq!(value["test"], true);
        assert_eq!(value["async"], false);
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_build_options_reads_content_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p>from file</p>").unwrap();

        let args = create_args(&["--content-file", path.to_str().unwrap(), "--async"]);
        let value = build_options(&args).unwrap().into_value();
        assert_eq!(value["document_content"], "<p>from file</p>");
        assert_eq!(value["async"], true);
    }

    #[test]
    fn test_build_options_missing_content_file_errors() {
        let args = create_args(&["--content-file", "/nonexistent/page.html"]);
        assert!(build_options(&args).is_err());
    }
}
