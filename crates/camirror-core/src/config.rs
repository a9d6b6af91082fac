//! Mirror configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default records endpoint (Mozilla remote-settings, `security-state/intermediates`).
pub const DEFAULT_RECORDS_URL: &str = "https://firefox.settings.services.mozilla.com/v1/buckets/security-state/collections/intermediates/records/";

/// Default attachment CDN base URL. Must end with a slash so record
/// locations can be joined onto it.
pub const DEFAULT_ATTACHMENT_BASE_URL: &str =
    "https://firefox-settings-attachments.cdn.mozilla.net/";

/// Filename for the path-keyed mirror of the raw records response.
pub const RECORDS_FILENAME: &str = "records.json";

/// Default filename for the concatenated trust-anchor bundle.
pub const DEFAULT_BUNDLE_FILENAME: &str = "ca-bundle.pem";

/// Default courtesy delay before every outbound request, in seconds.
pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 3;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Mirror configuration.
///
/// All knobs are explicit; nothing is read from global state after
/// construction. The destination directory must already exist; the mirror
/// never creates it.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// URL of the records endpoint (the manifest).
    pub records_url: String,

    /// Base URL attachment locations are joined onto. Trailing slash required.
    pub attachment_base_url: String,

    /// Directory receiving the manifest mirror, cached attachments, and the
    /// final bundle.
    pub dest_dir: PathBuf,

    /// Contact email embedded in the User-Agent so the remote host can reach
    /// us if the crawler misbehaves. Should come from env or a secret store,
    /// never source control.
    pub contact_email: Option<String>,

    /// Fixed delay applied before every outbound request (courtesy
    /// rate-limiting, not adaptive backoff).
    pub request_delay_secs: u64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Filename of the bundle, relative to `dest_dir`.
    pub bundle_filename: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            records_url: DEFAULT_RECORDS_URL.to_string(),
            attachment_base_url: DEFAULT_ATTACHMENT_BASE_URL.to_string(),
            dest_dir: PathBuf::from("."),
            contact_email: None,
            request_delay_secs: DEFAULT_REQUEST_DELAY_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bundle_filename: DEFAULT_BUNDLE_FILENAME.to_string(),
        }
    }
}

impl MirrorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `CAMIRROR_RECORDS_URL` | Records endpoint |
    /// | `CAMIRROR_ATTACHMENT_BASE_URL` | Attachment CDN base |
    /// | `CAMIRROR_DEST_DIR` | Destination directory |
    /// | `CAMIRROR_CONTACT_EMAIL` | Crawler contact address |
    /// | `CAMIRROR_REQUEST_DELAY` | Per-request delay in seconds |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            records_url: std::env::var("CAMIRROR_RECORDS_URL").unwrap_or(defaults.records_url),
            attachment_base_url: std::env::var("CAMIRROR_ATTACHMENT_BASE_URL")
                .unwrap_or(defaults.attachment_base_url),
            dest_dir: std::env::var("CAMIRROR_DEST_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dest_dir),
            contact_email: std::env::var("CAMIRROR_CONTACT_EMAIL").ok(),
            request_delay_secs: std::env::var("CAMIRROR_REQUEST_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_delay_secs),
            timeout_secs: defaults.timeout_secs,
            bundle_filename: defaults.bundle_filename,
        }
    }

    /// Set the records endpoint.
    pub fn with_records_url(mut self, url: impl Into<String>) -> Self {
        self.records_url = url.into();
        self
    }

    /// Set the attachment base URL.
    pub fn with_attachment_base_url(mut self, url: impl Into<String>) -> Self {
        self.attachment_base_url = url.into();
        self
    }

    /// Set the destination directory.
    pub fn with_dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = dir.into();
        self
    }

    /// Set the contact email.
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    /// Set the per-request courtesy delay in seconds.
    pub fn with_request_delay_secs(mut self, secs: u64) -> Self {
        self.request_delay_secs = secs;
        self
    }

    /// Set the bundle filename.
    pub fn with_bundle_filename(mut self, name: impl Into<String>) -> Self {
        self.bundle_filename = name.into();
        self
    }

    /// Per-request courtesy delay as a [`Duration`].
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    /// User-Agent value identifying the crawler and a contact channel.
    pub fn user_agent(&self) -> String {
        match &self.contact_email {
            Some(email) => format!(
                "camirror/{} (contact: {})",
                env!("CARGO_PKG_VERSION"),
                email
            ),
            None => format!("camirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Path of the raw manifest mirror.
    pub fn records_path(&self) -> PathBuf {
        self.dest_dir.join(RECORDS_FILENAME)
    }

    /// Path of the final bundle.
    pub fn bundle_path(&self) -> PathBuf {
        self.dest_dir.join(&self.bundle_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_defaults() {
        std::env::remove_var("CAMIRROR_RECORDS_URL");
        std::env::remove_var("CAMIRROR_CONTACT_EMAIL");
        std::env::remove_var("CAMIRROR_REQUEST_DELAY");

        let config = MirrorConfig::from_env();
        assert_eq!(config.records_url, DEFAULT_RECORDS_URL);
        assert!(config.contact_email.is_none());
        assert_eq!(config.request_delay_secs, DEFAULT_REQUEST_DELAY_SECS);
    }

    #[test]
    #[serial]
    fn from_env_overrides() {
        std::env::set_var("CAMIRROR_RECORDS_URL", "https://example.com/records/");
        std::env::set_var("CAMIRROR_REQUEST_DELAY", "0");

        let config = MirrorConfig::from_env();
        assert_eq!(config.records_url, "https://example.com/records/");
        assert_eq!(config.request_delay_secs, 0);

        std::env::remove_var("CAMIRROR_RECORDS_URL");
        std::env::remove_var("CAMIRROR_REQUEST_DELAY");
    }

    #[test]
    fn builder_methods() {
        let config = MirrorConfig::default()
            .with_records_url("https://example.com/v1/records/")
            .with_dest_dir("/tmp/certs")
            .with_contact_email("ops@example.com")
            .with_request_delay_secs(0);

        assert_eq!(config.records_url, "https://example.com/v1/records/");
        assert_eq!(config.dest_dir, PathBuf::from("/tmp/certs"));
        assert_eq!(config.request_delay(), Duration::ZERO);
    }

    #[test]
    fn user_agent_includes_contact() {
        let config = MirrorConfig::default().with_contact_email("ops@example.com");
        let ua = config.user_agent();
        assert!(ua.starts_with("camirror/"));
        assert!(ua.contains("contact: ops@example.com"));
    }

    #[test]
    fn user_agent_without_contact() {
        let ua = MirrorConfig::default().user_agent();
        assert!(!ua.contains("contact"));
    }
}
