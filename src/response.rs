//! Buffered HTTP responses and scoped temporary-file handoff.
//!
//! Handlers passed to `create_with` / `download_with` receive the body in a
//! [`NamedTempFile`] positioned at the start. The file is removed as soon as
//! the handler returns, and also when it panics (drop runs during unwinding).

use std::io::Seek;

use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::DocRaptorError;

/// Filename prefix for buffered document files.
pub const TEMPFILE_PREFIX: &str = "docraptor";

/// Status line and headers of a service response.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    status: u16,
    headers: HeaderMap,
    url: String,
}

impl ResponseMeta {
    pub(crate) fn from_response(response: &reqwest::Response) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            url: response.url().to_string(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `Content-Type` header, if present and valid UTF-8.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Final URL of the request.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A complete response from the service, body held in memory.
///
/// Soft calls return this unchanged even when the service reports failure;
/// check [`is_success`](Self::is_success) before trusting the body.
#[derive(Debug, Clone)]
pub struct DocumentResponse {
    meta: ResponseMeta,
    body: Vec<u8>,
}

impl DocumentResponse {
    /// Reads the full body of `response`.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, DocRaptorError> {
        let meta = ResponseMeta::from_response(&response);
        let body = response
            .bytes()
            .await
            .map_err(|e| DocRaptorError::network(meta.url.clone(), e))?
            .to_vec();
        debug!(status = meta.status, bytes = body.len(), "read response body");
        Ok(Self { meta, body })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(status: u16, body: &[u8]) -> Self {
        Self {
            meta: ResponseMeta {
                status,
                headers: HeaderMap::new(),
                url: "https://docraptor.com/docs".to_string(),
            },
            body: body.to_vec(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.meta.status
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.meta.is_success()
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.meta.headers
    }

    /// Status line and headers.
    #[must_use]
    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::MalformedResponse`] if the body does not
    /// deserialize into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DocRaptorError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| DocRaptorError::malformed(format!("response body is not valid JSON: {e}")))
    }

    /// Consumes the response, returning the body bytes.
    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Streams `response` into a fresh temporary file and rewinds it.
///
/// On error the partially written file is dropped, which deletes it.
pub(crate) async fn buffer_to_tempfile(
    response: reqwest::Response,
) -> Result<(NamedTempFile, ResponseMeta), DocRaptorError> {
    let meta = ResponseMeta::from_response(&response);
    let mut temp = tempfile::Builder::new()
        .prefix(TEMPFILE_PREFIX)
        .tempfile()
        .map_err(|e| DocRaptorError::io("creating temporary file", e))?;

    // The cloned handle shares the file cursor, so rewinding `temp` below
    // also resets what the async writer advanced.
    let handle = temp
        .as_file()
        .try_clone()
        .map_err(|e| DocRaptorError::io("opening temporary file", e))?;
    let mut writer = BufWriter::new(tokio::fs::File::from_std(handle));
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DocRaptorError::network(meta.url.clone(), e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DocRaptorError::io("writing temporary file", e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DocRaptorError::io("flushing temporary file", e))?;
    drop(writer);

    temp.rewind()
        .map_err(|e| DocRaptorError::io("rewinding temporary file", e))?;
    debug!(
        path = %temp.path().display(),
        bytes = bytes_written,
        "buffered response into temporary file"
    );
    Ok((temp, meta))
}

/// Hands `temp` to `handler` and deletes it afterwards.
pub(crate) fn run_handler<R, F>(
    mut temp: NamedTempFile,
    meta: &ResponseMeta,
    handler: F,
) -> Result<R, DocRaptorError>
where
    F: FnOnce(&mut NamedTempFile, &ResponseMeta) -> R,
{
    let result = handler(&mut temp, meta);
    temp.close()
        .map_err(|e| DocRaptorError::io("removing temporary file", e))?;
    Ok(result)
}
