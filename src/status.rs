//! Job status records returned by `GET /status/{id}`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::DocRaptorError;

/// Captures everything after the first `/download/` segment.
#[allow(clippy::expect_used)]
static DOWNLOAD_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".*?/download/(.+)").expect("download key regex is valid") // Static pattern, safe to panic
});

/// Server-side state of a generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted, not yet picked up.
    Queued,
    /// Rendering in progress.
    Working,
    /// Finished; a download key is available.
    Completed,
    /// Rendering failed.
    Failed,
    /// A state this client does not know about, kept verbatim.
    Other(String),
}

impl JobStatus {
    fn parse(raw: &str) -> Self {
        match raw {
            "queued" => Self::Queued,
            "working" => Self::Working,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether polling can stop.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::Working => f.write_str("working"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Parsed status payload plus the HTTP status it arrived with.
///
/// Soft status calls return a record even for failed requests, so `fields`
/// may be partial or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    http_status: u16,
    fields: Map<String, Value>,
}

impl StatusRecord {
    /// Builds a record from a response body.
    ///
    /// When the job is completed, the download key is pulled out of
    /// `download_url` and stored under `download_key`.
    ///
    /// # Errors
    ///
    /// - [`DocRaptorError::MalformedResponse`] if a successful body is not a JSON
    ///   object, or a completed job has a missing or unrecognized `download_url`.
    pub fn from_body(http_status: u16, body: &[u8]) -> Result<Self, DocRaptorError> {
        let success = (200..300).contains(&http_status);
        let fields = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) if !success => Map::new(),
            Ok(other) => {
                return Err(DocRaptorError::malformed(format!(
                    "status body is not a JSON object: {other}"
                )));
            }
            Err(e) => {
                return Err(DocRaptorError::malformed(format!(
                    "status body is not valid JSON: {e}"
                )));
            }
        };

        let mut record = Self {
            http_status,
            fields,
        };
        if record.status() == Some(JobStatus::Completed) {
            let download_url = record
                .download_url()
                .ok_or_else(|| DocRaptorError::malformed("completed status has no download_url"))?;
            let key = extract_download_key(download_url)?;
            record
                .fields
                .insert("download_key".to_string(), Value::from(key));
        }
        Ok(record)
    }

    /// HTTP status code of the status request.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Job state, if the payload carried one.
    #[must_use]
    pub fn status(&self) -> Option<JobStatus> {
        self.fields
            .get("status")
            .and_then(Value::as_str)
            .map(JobStatus::parse)
    }

    /// `download_url` from the payload.
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        self.fields.get("download_url").and_then(Value::as_str)
    }

    /// Download key, present only for completed jobs.
    #[must_use]
    pub fn download_key(&self) -> Option<&str> {
        self.fields.get("download_key").and_then(Value::as_str)
    }

    /// Looks up any payload field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All payload fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the record, returning the payload as a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Extracts the key following `/download/` in a download URL.
///
/// # Errors
///
/// Returns [`DocRaptorError::MalformedResponse`] if the URL has no
/// `/download/<key>` segment.
pub fn extract_download_key(download_url: &str) -> Result<String, DocRaptorError> {
    DOWNLOAD_KEY_PATTERN
        .captures(download_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            DocRaptorError::malformed(format!(
                "download_url does not contain a /download/ key: {download_url}"
            ))
        })
}
