//! Client library for the DocRaptor document generation service.
//!
//! DocRaptor renders HTML (inline or from a URL) into PDF and XPS
//! documents. This crate wraps its four endpoints:
//!
//! - [`DocRaptor::create`] - `POST /docs`, synchronous or async jobs
//! - [`DocRaptor::list_docs`] - `GET /docs`, paginated history
//! - [`DocRaptor::status`] - `GET /status/{id}`, async job polling
//! - [`DocRaptor::download`] - `GET /download/{key}`, finished output
//!
//! Create, list and status have a soft form that hands back failed responses
//! and a `_strict` form that turns them into [`DocRaptorError`] values.
//!
//! # Architecture
//!
//! - [`config`] - base URL, timeouts and API key resolution
//! - [`options`] - option mappings merged over operation defaults
//! - [`response`] - buffered responses and scoped temporary files
//! - [`status`] - job status records and download key extraction
//! - [`session`] - per-client `status_id` / `download_key` slots

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod client;
pub mod config;
mod error;
pub mod options;
pub mod response;
pub mod session;
pub mod status;
mod user_agent;

// Re-export commonly used types
pub use client::{Created, DocRaptor};
pub use config::{API_KEY_ENV, BASE_URL_ENV, ClientConfig, Credentials, DEFAULT_BASE_URL};
pub use error::DocRaptorError;
pub use options::CreateOptions;
pub use response::{DocumentResponse, ResponseMeta};
pub use session::Session;
pub use status::{JobStatus, StatusRecord, extract_download_key};
