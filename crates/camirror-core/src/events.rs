//! Structured progress events.
//!
//! The cache and bundle writer narrate each fetch through a [`ProgressSink`]
//! rather than printing; consumers decide how events are rendered. The
//! default sink forwards to `tracing`.

use std::path::PathBuf;

use crate::digest::IntegrityViolation;

/// One step in the lifecycle of a verified fetch.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// A cached blob matched its expectation; no network access.
    CacheHit { path: PathBuf },

    /// The cache could not satisfy the fetch.
    CacheMiss {
        path: PathBuf,
        reason: CacheMissReason,
    },

    /// About to perform the network request (after the courtesy delay).
    FetchStart { url: String },

    /// Fetched bytes passed validation (or none was requested).
    FetchVerified { url: String, bytes: usize },

    /// Fetched bytes failed validation; the run is about to abort.
    FetchFailed {
        url: String,
        violation: IntegrityViolation,
    },
}

/// Why a cached blob could not be used.
#[derive(Debug, Clone)]
pub enum CacheMissReason {
    /// No file at the cache path.
    Absent,

    /// A file existed but failed size or digest validation.
    Invalid(IntegrityViolation),
}

/// Consumer of fetch lifecycle events.
pub trait ProgressSink: Send + Sync {
    /// Handle one event. Called before any failure is raised, so the last
    /// events narrate what went wrong.
    fn emit(&self, event: &FetchEvent);
}

/// Sink that renders events through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: &FetchEvent) {
        match event {
            FetchEvent::CacheHit { path } => {
                tracing::info!(path = %path.display(), "cache hit");
            }
            FetchEvent::CacheMiss { path, reason } => match reason {
                CacheMissReason::Absent => {
                    tracing::debug!(path = %path.display(), "not in cache");
                }
                CacheMissReason::Invalid(violation) => {
                    tracing::warn!(
                        path = %path.display(),
                        ?violation,
                        "cached blob failed validation, refetching"
                    );
                }
            },
            FetchEvent::FetchStart { url } => {
                tracing::info!(%url, "fetching");
            }
            FetchEvent::FetchVerified { url, bytes } => {
                tracing::info!(%url, bytes, "fetched and verified");
            }
            FetchEvent::FetchFailed { url, violation } => {
                tracing::error!(%url, ?violation, "fetched bytes failed validation");
            }
        }
    }
}

/// Sink that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: &FetchEvent) {}
}
