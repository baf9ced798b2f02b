//! Client configuration and API key resolution.
//!
//! The base URL is fixed when a client is built. The API key is resolved on
//! every authenticated call: explicit argument, then the client's cached key,
//! then `DOCRAPTOR_API_KEY`.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;
use url::Url;

use crate::error::DocRaptorError;

/// Environment variable holding the fallback API key.
pub const API_KEY_ENV: &str = "DOCRAPTOR_API_KEY";

/// Environment variable overriding the service base URL.
pub const BASE_URL_ENV: &str = "DOCRAPTOR_URL";

/// Public endpoint used when `DOCRAPTOR_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://docraptor.com/";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes; synchronous creates block until rendered).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Settings applied when constructing a [`DocRaptor`](crate::DocRaptor) client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Service root; endpoint paths are joined onto it.
    pub base_url: Url,
    /// Key seeded into the client's credential cache.
    pub api_key: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
    /// User-Agent override; `None` uses the crate default.
    pub user_agent: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Builds a config pointing at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, DocRaptorError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            api_key: None,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            user_agent: None,
        })
    }

    /// Builds a config from `DOCRAPTOR_URL`, falling back to the public endpoint.
    ///
    /// The API key is not read here; it is looked up lazily on each call so a
    /// key exported after construction is still honored.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::InvalidUrl`] if `DOCRAPTOR_URL` is not a valid URL.
    pub fn from_env() -> Result<Self, DocRaptorError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DocRaptorError> {
        let base_url = non_blank(lookup(BASE_URL_ENV));
        let base_url = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        debug!(base_url, "resolved DocRaptor base URL");
        Self::new(base_url)
    }

    /// Seeds the credential cache with `key`.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = non_blank(Some(key.into()));
        self
    }

    /// Overrides connect and read timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self.read_timeout_secs = read_timeout_secs;
        self
    }

    /// Overrides the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Parses a base URL, forcing a trailing slash so `Url::join` appends paths.
fn parse_base_url(raw: &str) -> Result<Url, DocRaptorError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|_| DocRaptorError::invalid_url(raw))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(DocRaptorError::invalid_url(raw));
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Per-client API key cache.
#[derive(Default)]
pub struct Credentials {
    cached: Mutex<Option<String>>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.cached().map(|_| "<redacted>");
        f.debug_struct("Credentials").field("cached", &cached).finish()
    }
}

impl Credentials {
    /// Creates a cache, optionally pre-seeded.
    #[must_use]
    pub fn new(initial: Option<String>) -> Self {
        Self {
            cached: Mutex::new(non_blank(initial)),
        }
    }

    /// Resolves the API key, reading `DOCRAPTOR_API_KEY` as the last resort.
    ///
    /// An explicit key replaces the cached one for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::NoApiKeyProvided`] when no source yields a key.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<String, DocRaptorError> {
        self.resolve_with(explicit, |name| std::env::var(name).ok())
    }

    /// Same as [`resolve`](Self::resolve) with an injectable environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::NoApiKeyProvided`] when no source yields a key.
    pub fn resolve_with(
        &self,
        explicit: Option<&str>,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, DocRaptorError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
            *cached = Some(key.to_string());
            return Ok(key.to_string());
        }
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }
        match non_blank(env_lookup(API_KEY_ENV)) {
            Some(key) => {
                debug!("using API key from {API_KEY_ENV}");
                Ok(key)
            }
            None => Err(DocRaptorError::NoApiKeyProvided),
        }
    }

    /// Key currently held in the cache, if any.
    #[must_use]
    pub fn cached(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_without_any_source_fails() {
        let creds = Credentials::default();
        let result = creds.resolve_with(None, no_env);
        assert!(matches!(result, Err(DocRaptorError::NoApiKeyProvided)));
    }

    #[test]
    fn test_explicit_key_is_cached_for_later_calls() {
        let creds = Credentials::default();
        assert_eq!(creds.resolve_with(Some("abc"), no_env).unwrap(), "abc");
        assert_eq!(creds.resolve_with(None, no_env).unwrap(), "abc");
        assert_eq!(creds.cached().as_deref(), Some("abc"));
    }

    #[test]
    fn test_explicit_key_replaces_cached_key() {
        let creds = Credentials::new(Some("old".to_string()));
        assert_eq!(creds.resolve_with(Some("new"), no_env).unwrap(), "new");
        assert_eq!(creds.cached().as_deref(), Some("new"));
    }

    #[test]
    fn test_cached_key_wins_over_environment() {
        let creds = Credentials::new(Some("cached".to_string()));
        let key = creds
            .resolve_with(None, |_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(key, "cached");
    }

    #[test]
    fn test_environment_fallback_is_not_cached() {
        let creds = Credentials::default();
        let key = creds
            .resolve_with(None, |name| {
                assert_eq!(name, API_KEY_ENV);
                Some("from-env".to_string())
            })
            .unwrap();
        assert_eq!(key, "from-env");
        assert!(creds.cached().is_none());
    }

    #[test]
    fn test_blank_keys_count_as_absent() {
        let creds = Credentials::new(Some("   ".to_string()));
        let result = creds.resolve_with(Some(""), |_| Some(" ".to_string()));
        assert!(matches!(result, Err(DocRaptorError::NoApiKeyProvided)));
    }

    #[test]
    fn test_config_defaults_to_public_endpoint() {
        let config = ClientConfig::from_lookup(no_env).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.connect_timeout_secs, CONNECT_TIMEOUT_SECS);
        assert_eq!(config.read_timeout_secs, READ_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_honors_url_override() {
        let config = ClientConfig::from_lookup(|name| {
            (name == BASE_URL_ENV).then(|| "http://localhost:3000".to_string())
        })
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = ClientConfig::new("https://proxy.example.com/docraptor").unwrap();
        assert_eq!(
            config.base_url.join("docs").unwrap().as_str(),
            "https://proxy.example.com/docraptor/docs"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(DocRaptorError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::new("ftp://docraptor.com"),
            Err(DocRaptorError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let config = ClientConfig::new(DEFAULT_BASE_URL)
            .unwrap()
            .with_api_key("secret-key-123");
        let creds = Credentials::new(config.api_key.clone());
        for rendered in [format!("{config:?}"), format!("{creds:?}")] {
            assert!(!rendered.contains("secret-key-123"), "key leaked: {rendered}");
            assert!(rendered.contains("<redacted>"), "got: {rendered}");
        }
    }

    #[test]
    fn test_with_api_key_ignores_blank() {
        let config = ClientConfig::new(DEFAULT_BASE_URL)
            .unwrap()
            .with_api_key("  ");
        assert!(config.api_key.is_none());
    }
}
