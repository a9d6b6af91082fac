//! Verified blob cache: the content-addressed fetch-and-cache core.
//!
//! [`BlobCache::fetch`] returns validated bytes for a URL, serving them from
//! the local store when a cached copy matches its integrity expectation and
//! fetching from the remote source otherwise. Fresh bytes are validated
//! before they are persisted; bytes that fail validation are discarded and
//! never written through.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::config::MirrorConfig;
use crate::digest::{IntegrityExpectation, IntegrityViolation};
use crate::error::{MirrorError, MirrorResult};
use crate::events::{CacheMissReason, FetchEvent, ProgressSink, TracingSink};
use crate::store::{BlobStore, FsBlobStore};

/// Verified blob cache.
///
/// Holds one HTTP client configured with the crawler User-Agent; at most one
/// outbound request is made per [`fetch`](Self::fetch) call, preceded by a
/// fixed courtesy delay. There are no retries: a validation failure after a
/// fetch is fatal, not retried.
pub struct BlobCache {
    client: reqwest::Client,
    store: Arc<dyn BlobStore>,
    sink: Arc<dyn ProgressSink>,
    request_delay: Duration,
}

impl BlobCache {
    /// Create a cache backed by the filesystem, narrating through `tracing`.
    pub fn new(config: &MirrorConfig) -> MirrorResult<Self> {
        Self::with_store(config, Arc::new(FsBlobStore))
    }

    /// Create a cache over a custom blob store.
    pub fn with_store(config: &MirrorConfig, store: Arc<dyn BlobStore>) -> MirrorResult<Self> {
        let mut default_headers = HeaderMap::new();
        let ua = HeaderValue::from_str(&config.user_agent()).map_err(|e| MirrorError::Config {
            message: format!("invalid user-agent value: {}", e),
        })?;
        default_headers.insert(USER_AGENT, ua);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| MirrorError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            store,
            sink: Arc::new(TracingSink),
            request_delay: config.request_delay(),
        })
    }

    /// Replace the progress sink.
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fetch the blob at `url`, caching it at `cache_path`.
    ///
    /// With an expectation, a cached file matching both size and digest is
    /// returned without any network access; on any mismatch or absence the
    /// blob is fetched fresh, re-validated, and written through. Without an
    /// expectation no validation is possible, so the cache is never read and
    /// the blob is always fetched fresh (it is still mirrored at
    /// `cache_path` for inspection).
    pub async fn fetch(
        &self,
        url: &Url,
        cache_path: &Path,
        expectation: Option<&IntegrityExpectation>,
    ) -> MirrorResult<Vec<u8>> {
        if let Some(expectation) = expectation {
            match self.store.get(cache_path).await? {
                Some(bytes) => match expectation.check(&bytes) {
                    Ok(()) => {
                        self.sink.emit(&FetchEvent::CacheHit {
                            path: cache_path.to_path_buf(),
                        });
                        return Ok(bytes);
                    }
                    Err(violation) => {
                        // A stale or corrupt cache entry is a narrated miss,
                        // not an error: the authoritative copy is upstream.
                        self.sink.emit(&FetchEvent::CacheMiss {
                            path: cache_path.to_path_buf(),
                            reason: CacheMissReason::Invalid(violation),
                        });
                    }
                },
                None => {
                    self.sink.emit(&FetchEvent::CacheMiss {
                        path: cache_path.to_path_buf(),
                        reason: CacheMissReason::Absent,
                    });
                }
            }
        }

        self.sink.emit(&FetchEvent::FetchStart {
            url: url.to_string(),
        });

        // Fixed courtesy delay before every outbound request.
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let bytes = self.get_bytes(url).await?;

        if let Some(expectation) = expectation {
            if let Err(violation) = expectation.check(&bytes) {
                self.sink.emit(&FetchEvent::FetchFailed {
                    url: url.to_string(),
                    violation: violation.clone(),
                });
                // Bad bytes are dropped here, never written to the store.
                return Err(integrity_error(url, violation));
            }
        }

        self.sink.emit(&FetchEvent::FetchVerified {
            url: url.to_string(),
            bytes: bytes.len(),
        });

        self.store.put(cache_path, &bytes).await?;
        Ok(bytes)
    }

    /// Perform a single GET, mapping non-success statuses to network errors.
    async fn get_bytes(&self, url: &Url) -> MirrorResult<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(MirrorError::Network {
                message: format!("HTTP {} fetching {}", status.as_u16(), url),
            });
        }

        let bytes = response.bytes().await.map_err(|e| MirrorError::Network {
            message: format!("failed to read response body: {}", e),
        })?;

        Ok(bytes.to_vec())
    }
}

/// Convert a post-fetch violation into the fatal error for this URL.
fn integrity_error(url: &Url, violation: IntegrityViolation) -> MirrorError {
    match violation {
        IntegrityViolation::Size { expected, actual } => MirrorError::SizeMismatch {
            url: url.to_string(),
            expected,
            actual,
        },
        IntegrityViolation::Digest { expected, actual } => MirrorError::DigestMismatch {
            url: url.to_string(),
            expected,
            actual,
        },
    }
}
