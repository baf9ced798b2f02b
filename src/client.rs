//! The DocRaptor service client.
//!
//! One [`DocRaptor`] value owns a pooled HTTP client, the API key cache and
//! the session slots used as default arguments for `status` / `download`.
//!
//! # Example
//!
//! ```no_run
//! use docraptor::{DocRaptor, JobStatus};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), docraptor::DocRaptorError> {
//! let client = DocRaptor::from_env()?;
//! client.api_key(Some("YOUR_API_KEY"))?;
//!
//! client
//!     .create_strict(json!({"document_content": "<h1>Hi</h1>", "async": true}))
//!     .await?;
//! loop {
//!     let record = client.status_strict(None).await?;
//!     if record.status().is_some_and(|s| s.is_terminal()) {
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//! }
//! let pdf = client.download(None).await?;
//! std::fs::write("hi.pdf", pdf.body()).ok();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::error::DocRaptorError;
use crate::options::{CreateParams, ListParams, with_strict_flag};
use crate::response::{DocumentResponse, ResponseMeta, buffer_to_tempfile, run_handler};
use crate::session::Session;
use crate::status::StatusRecord;
use crate::user_agent;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Result of a create call that did not use a handler.
#[derive(Debug, Clone)]
pub enum Created {
    /// Synchronous render, or any response on the soft failure path.
    Response(DocumentResponse),
    /// Async job accepted; its id is also cached on the client.
    Queued {
        /// Job id to poll with.
        status_id: String,
        /// The acceptance response.
        response: DocumentResponse,
    },
}

impl Created {
    /// The underlying response.
    #[must_use]
    pub fn response(&self) -> &DocumentResponse {
        match self {
            Self::Response(response) | Self::Queued { response, .. } => response,
        }
    }

    /// Job id, for queued async creates.
    #[must_use]
    pub fn status_id(&self) -> Option<&str> {
        match self {
            Self::Queued { status_id, .. } => Some(status_id),
            Self::Response(_) => None,
        }
    }

    /// Consumes the outcome, returning the response.
    #[must_use]
    pub fn into_response(self) -> DocumentResponse {
        match self {
            Self::Response(response) | Self::Queued { response, .. } => response,
        }
    }
}

/// Client for the DocRaptor document generation API.
///
/// Create, list and status requests authenticate with HTTP basic auth (API
/// key as username, empty password). Download requests are sent without
/// credentials; download URLs are capability URLs issued by the service.
#[derive(Debug)]
pub struct DocRaptor {
    http: Client,
    base_url: Url,
    credentials: Credentials,
    session: Session,
}

impl DocRaptor {
    /// Builds a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::Network`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, DocRaptorError> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(user_agent::default_client_user_agent);
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DocRaptorError::network(config.base_url.as_str(), e))?;
        debug!(base_url = %config.base_url, "DocRaptor client initialized");
        Ok(Self {
            http,
            base_url: config.base_url,
            credentials: Credentials::new(config.api_key),
            session: Session::default(),
        })
    }

    /// Builds a client from `DOCRAPTOR_URL` (default `https://docraptor.com/`).
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::InvalidUrl`] for a bad `DOCRAPTOR_URL`, or
    /// [`DocRaptorError::Network`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, DocRaptorError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Resolves the API key used for authenticated calls.
    ///
    /// An explicit `key` is cached on this client for later calls; otherwise
    /// the cached key, then `DOCRAPTOR_API_KEY`, is used.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::NoApiKeyProvided`] when no key is available.
    pub fn api_key(&self, key: Option<&str>) -> Result<String, DocRaptorError> {
        self.credentials.resolve(key)
    }

    /// Session slots reused as default `status` / `download` arguments.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Service root URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Creates a document.
    ///
    /// Failed requests come back as [`Created::Response`] unless `options`
    /// sets `raise_exception_on_failure`. When `async` is set, the returned
    /// job id is cached for [`status`](Self::status).
    ///
    /// # Errors
    ///
    /// - [`DocRaptorError::InvalidArgument`] if `options` is not a mapping.
    /// - [`DocRaptorError::NoContent`] without `document_content` / `document_url`.
    /// - [`DocRaptorError::NoApiKeyProvided`] if no key resolves.
    /// - [`DocRaptorError::DocumentCreationFailure`] on the strict path.
    /// - [`DocRaptorError::MalformedResponse`] if an accepted async job has no `status_id`.
    /// - Transport errors.
    #[instrument(skip(self, options))]
    pub async fn create(&self, options: Value) -> Result<Created, DocRaptorError> {
        let (params, response) = self.send_create(options).await?;
        let response = DocumentResponse::read(response).await?;

        if !response.is_success() {
            if params.strict {
                return Err(DocRaptorError::DocumentCreationFailure {
                    status_code: response.status(),
                    body: response.text(),
                });
            }
            warn!(status = response.status(), "document creation failed");
            return Ok(Created::Response(response));
        }

        if params.async_job {
            let status_id = parse_status_id(&response)?;
            self.session.set_status_id(status_id.clone());
            info!(status_id = %status_id, "async document job queued");
            return Ok(Created::Queued {
                status_id,
                response,
            });
        }

        info!(bytes = response.body().len(), "document created");
        Ok(Created::Response(response))
    }

    /// Creates a document, turning remote failures into
    /// [`DocRaptorError::DocumentCreationFailure`].
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create), with the strict path always on.
    pub async fn create_strict(&self, options: Value) -> Result<Created, DocRaptorError> {
        self.create(with_strict_flag(options)).await
    }

    /// Creates a document and hands the response body to `handler` as a
    /// rewound temporary file, returning the handler's value.
    ///
    /// The file is deleted once `handler` returns or panics.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create), plus [`DocRaptorError::Io`] if the
    /// temporary file cannot be written or removed.
    #[instrument(skip(self, options, handler))]
    pub async fn create_with<R, F>(&self, options: Value, handler: F) -> Result<R, DocRaptorError>
    where
        F: FnOnce(&mut NamedTempFile, &ResponseMeta) -> R,
    {
        let (params, response) = self.send_create(options).await?;

        if params.strict && !response.status().is_success() {
            let response = DocumentResponse::read(response).await?;
            return Err(DocRaptorError::DocumentCreationFailure {
                status_code: response.status(),
                body: response.text(),
            });
        }

        let (temp, meta) = buffer_to_tempfile(response).await?;
        run_handler(temp, &meta, handler)
    }

    /// Strict form of [`create_with`](Self::create_with).
    ///
    /// # Errors
    ///
    /// Same as [`create_with`](Self::create_with), with the strict path always on.
    pub async fn create_strict_with<R, F>(
        &self,
        options: Value,
        handler: F,
    ) -> Result<R, DocRaptorError>
    where
        F: FnOnce(&mut NamedTempFile, &ResponseMeta) -> R,
    {
        self.create_with(with_strict_flag(options), handler).await
    }

    /// Lists previously created documents (`page=1`, `per_page=100` by default).
    ///
    /// # Errors
    ///
    /// - [`DocRaptorError::InvalidArgument`] if `options` is not a mapping.
    /// - [`DocRaptorError::NoApiKeyProvided`] if no key resolves.
    /// - [`DocRaptorError::DocumentListingFailure`] on the strict path.
    /// - Transport errors.
    #[instrument(skip(self, options))]
    pub async fn list_docs(&self, options: Value) -> Result<DocumentResponse, DocRaptorError> {
        let params = ListParams::from_options(options)?;
        let api_key = self.api_key(None)?;

        let mut url = self.endpoint("docs")?;
        url.query_pairs_mut().extend_pairs(params.query_pairs());

        debug!(url = %url, "listing documents");
        let response = self
            .http
            .get(url.clone())
            .basic_auth(api_key, Some(""))
            .send()
            .await
            .map_err(|e| DocRaptorError::network(url.as_str(), e))?;
        let response = DocumentResponse::read(response).await?;

        if !response.is_success() {
            if params.strict {
                return Err(DocRaptorError::DocumentListingFailure {
                    status_code: response.status(),
                    body: response.text(),
                });
            }
            warn!(status = response.status(), "document listing failed");
        }
        Ok(response)
    }

    /// Strict form of [`list_docs`](Self::list_docs).
    ///
    /// # Errors
    ///
    /// Same as [`list_docs`](Self::list_docs), with the strict path always on.
    pub async fn list_docs_strict(&self, options: Value) -> Result<DocumentResponse, DocRaptorError> {
        self.list_docs(with_strict_flag(options)).await
    }

    /// Checks an async job, defaulting to the last queued `status_id`.
    ///
    /// The parsed payload is returned whatever the HTTP outcome. A completed
    /// job's download key is cached for [`download`](Self::download).
    ///
    /// # Errors
    ///
    /// - [`DocRaptorError::InvalidArgument`] with no id and nothing cached.
    /// - [`DocRaptorError::NoApiKeyProvided`] if no key resolves.
    /// - [`DocRaptorError::MalformedResponse`] for an unusable payload.
    /// - Transport errors.
    pub async fn status(&self, id: Option<&str>) -> Result<StatusRecord, DocRaptorError> {
        self.fetch_status(id, false).await
    }

    /// Like [`status`](Self::status), but a failed request becomes
    /// [`DocRaptorError::DocumentStatusFailure`].
    ///
    /// # Errors
    ///
    /// Same as [`status`](Self::status), plus the status failure.
    pub async fn status_strict(&self, id: Option<&str>) -> Result<StatusRecord, DocRaptorError> {
        self.fetch_status(id, true).await
    }

    #[instrument(skip(self))]
    async fn fetch_status(
        &self,
        id: Option<&str>,
        raise_on_failure: bool,
    ) -> Result<StatusRecord, DocRaptorError> {
        let status_id = match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.session.status_id().ok_or_else(|| {
                DocRaptorError::invalid_argument(
                    "no status id given and no async job has been created",
                )
            })?,
        };
        let api_key = self.api_key(None)?;

        let mut url = self.resource_url("status", &status_id)?;
        url.query_pairs_mut().append_pair("output", "json");

        debug!(url = %url, "checking job status");
        let response = self
            .http
            .get(url.clone())
            .basic_auth(api_key, Some(""))
            .send()
            .await
            .map_err(|e| DocRaptorError::network(url.as_str(), e))?;
        let response = DocumentResponse::read(response).await?;

        if !response.is_success() {
            if raise_on_failure {
                return Err(DocRaptorError::DocumentStatusFailure {
                    status_code: response.status(),
                    body: response.text(),
                });
            }
            warn!(status = response.status(), status_id = %status_id, "status check failed");
        }

        let record = StatusRecord::from_body(response.status(), response.body())?;
        if let Some(key) = record.download_key() {
            self.session.set_download_key(key);
        }
        info!(
            status_id = %status_id,
            job_status = %record.status().map(|s| s.to_string()).unwrap_or_default(),
            "job status checked"
        );
        Ok(record)
    }

    /// Downloads a finished document, defaulting to the last cached download key.
    ///
    /// The request carries no credentials. The raw response is returned
    /// whatever the HTTP outcome.
    ///
    /// # Errors
    ///
    /// - [`DocRaptorError::InvalidArgument`] with no key and nothing cached.
    /// - Transport errors.
    #[instrument(skip(self))]
    pub async fn download(&self, key: Option<&str>) -> Result<DocumentResponse, DocRaptorError> {
        let response = self.send_download(key).await?;
        let response = DocumentResponse::read(response).await?;
        if response.is_success() {
            info!(bytes = response.body().len(), "document downloaded");
        } else {
            warn!(status = response.status(), "document download failed");
        }
        Ok(response)
    }

    /// Downloads a finished document into a rewound temporary file handed to
    /// `handler`, returning the handler's value.
    ///
    /// The file is deleted once `handler` returns or panics.
    ///
    /// # Errors
    ///
    /// Same as [`download`](Self::download), plus [`DocRaptorError::Io`] if
    /// the temporary file cannot be written or removed.
    #[instrument(skip(self, handler))]
    pub async fn download_with<R, F>(
        &self,
        key: Option<&str>,
        handler: F,
    ) -> Result<R, DocRaptorError>
    where
        F: FnOnce(&mut NamedTempFile, &ResponseMeta) -> R,
    {
        let response = self.send_download(key).await?;
        let (temp, meta) = buffer_to_tempfile(response).await?;
        run_handler(temp, &meta, handler)
    }

    async fn send_create(
        &self,
        options: Value,
    ) -> Result<(CreateParams, reqwest::Response), DocRaptorError> {
        let params = CreateParams::from_options(options)?;
        let api_key = self.api_key(None)?;

        let mut url = self.endpoint("docs")?;
        if params.async_job {
            url.query_pairs_mut().append_pair("output", "json");
        }

        debug!(
            url = %url,
            async_job = params.async_job,
            strict = params.strict,
            "submitting document"
        );
        let response = self
            .http
            .post(url.clone())
            .basic_auth(api_key, Some(""))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(params.form_body())
            .send()
            .await
            .map_err(|e| DocRaptorError::network(url.as_str(), e))?;
        Ok((params, response))
    }

    async fn send_download(&self, key: Option<&str>) -> Result<reqwest::Response, DocRaptorError> {
        let download_key = match key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => key.to_string(),
            None => self.session.download_key().ok_or_else(|| {
                DocRaptorError::invalid_argument(
                    "no download key given and no completed status has been seen",
                )
            })?,
        };
        let url = self.resource_url("download", &download_key)?;

        debug!(url = %url, "downloading document");
        self.http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DocRaptorError::network(url.as_str(), e))
    }

    fn endpoint(&self, path: &str) -> Result<Url, DocRaptorError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| DocRaptorError::invalid_url(format!("{}{path}", self.base_url)))
    }

    /// `{collection}/{id}` with `id` kept as one percent-encoded path segment.
    fn resource_url(&self, collection: &str, id: &str) -> Result<Url, DocRaptorError> {
        if matches!(id, "." | "..") {
            return Err(DocRaptorError::invalid_argument(format!(
                "{id:?} is not a valid {collection} identifier"
            )));
        }
        let mut url = self.endpoint(collection)?;
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.push(id);
            }
            Err(()) => return Err(DocRaptorError::invalid_url(self.base_url.as_str())),
        }
        Ok(url)
    }
}

fn parse_status_id(response: &DocumentResponse) -> Result<String, DocRaptorError> {
    let payload: Value = response.json()?;
    match payload.get("status_id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(DocRaptorError::malformed(
            "async create response has no status_id",
        )),
    }
}
