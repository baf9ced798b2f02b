//! User-Agent string sent with every service request.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/docraptor/docraptor-rs";

/// Default User-Agent (crate name and version).
#[must_use]
pub(crate) fn default_client_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("docraptor-rs/{version} (+{PROJECT_UA_URL})")
}
