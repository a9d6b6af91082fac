//! Verified mirror of a remote certificate collection.
//!
//! camirror mirrors the records of a remote-settings style collection and
//! their binary attachments to local disk, then emits one concatenated
//! trust-anchor bundle (usable as e.g. a `CURLOPT_CAINFO_BLOB` input). The
//! core is [`BlobCache`], a content-addressed fetch-and-cache layer:
//!
//! - A cached attachment matching its manifest size and SHA-256 digest is
//!   served without any network access.
//! - Anything else is fetched fresh (one request, after a fixed courtesy
//!   delay), re-validated, and written through atomically.
//! - Bytes that fail validation abort the run and are never cached.
//!
//! The record list itself carries no integrity metadata, so it is always
//! fetched fresh and only mirrored path-keyed. That asymmetry is deliberate:
//! the manifest's freshness is the point of each run.
//!
//! # Quick Start
//!
//! ```no_run
//! use camirror_core::{sync, BlobCache, MirrorConfig};
//!
//! # async fn example() -> camirror_core::MirrorResult<()> {
//! let config = MirrorConfig::from_env().with_dest_dir("intermediate_certs");
//! let cache = BlobCache::new(&config)?;
//!
//! let summary = sync(&cache, &config).await?;
//! println!(
//!     "{} records bundled into {}",
//!     summary.record_count,
//!     summary.bundle_path.display()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `CAMIRROR_RECORDS_URL` | Records endpoint (default: Mozilla `security-state/intermediates`) |
//! | `CAMIRROR_ATTACHMENT_BASE_URL` | Attachment CDN base URL |
//! | `CAMIRROR_DEST_DIR` | Destination directory (must pre-exist) |
//! | `CAMIRROR_CONTACT_EMAIL` | Contact address embedded in the User-Agent |
//! | `CAMIRROR_REQUEST_DELAY` | Per-request courtesy delay in seconds (default: 3) |

pub mod bundle;
pub mod cache;
pub mod config;
pub mod digest;
pub mod error;
pub mod events;
pub mod records;
pub mod store;

// Re-export main types
pub use bundle::{sync, write_bundle, SyncSummary};
pub use cache::BlobCache;
pub use config::{
    MirrorConfig, DEFAULT_ATTACHMENT_BASE_URL, DEFAULT_BUNDLE_FILENAME, DEFAULT_RECORDS_URL,
    RECORDS_FILENAME,
};
pub use digest::{sha256_hex, IntegrityExpectation, IntegrityViolation};
pub use error::{MirrorError, MirrorResult};
pub use events::{CacheMissReason, FetchEvent, NullSink, ProgressSink, TracingSink};
pub use records::{
    fetch_record_list, resolve_attachment, AttachmentMeta, Record, RecordList, ResolvedAttachment,
};
pub use store::{BlobStore, FsBlobStore, MemBlobStore};
