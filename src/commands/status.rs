//! Status command handler: print an async job's status record.

use anyhow::{Result, bail};
use docraptor::DocRaptor;

use crate::cli::StatusArgs;

pub async fn run_status_command(client: &DocRaptor, args: &StatusArgs) -> Result<()> {
    let record = if args.strict {
        client.status_strict(Some(&args.id)).await?
    } else {
        client.status(Some(&args.id)).await?
    };
    let http_status = record.http_status();
    println!("{}", serde_json::to_string_pretty(&record.into_value())?);

    if !(200..300).contains(&http_status) {
        bail!("status request failed (HTTP {http_status})");
    }
    Ok(())
}
