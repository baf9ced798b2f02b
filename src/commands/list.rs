//! List command handler: print one page of document history.

use anyhow::{Result, bail};
use docraptor::DocRaptor;
use serde_json::json;
use tracing::debug;

use crate::cli::ListArgs;

use super::write_output;

pub async fn run_list_command(client: &DocRaptor, args: &ListArgs) -> Result<()> {
    let options = json!({"page": args.page, "per_page": args.per_page});
    debug!(page = args.page, per_page = args.per_page, "listing documents");

    let response = if args.strict {
        client.list_docs_strict(options).await?
    } else {
        client.list_docs(options).await?
    };
    if !response.is_success() {
        bail!(
            "document listing failed (HTTP {}): {}",
            response.status(),
            response.text().trim()
        );
    }
    write_output(response.body())
}
