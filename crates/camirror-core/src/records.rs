//! Record list fetching and attachment resolution.
//!
//! The records endpoint returns a JSON document with a `data` array; each
//! record carries an `attachment` descriptor naming the blob to mirror:
//!
//! ```text
//! data[0].attachment.filename = "9VZ7Yd...Uolc=.pem"
//! data[0].attachment.hash     = "6915db4e...98bd9a2d"
//! data[0].attachment.location = "security-state-staging/intermediates/4792....pem"
//! data[0].attachment.size     = 2060
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::cache::BlobCache;
use crate::config::MirrorConfig;
use crate::digest::IntegrityExpectation;
use crate::error::{MirrorError, MirrorResult};

/// The parsed records response, order-preserving.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordList {
    /// Records in the order the remote source returned them.
    pub data: Vec<Record>,
}

/// One manifest entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Descriptor of the attachment blob.
    pub attachment: AttachmentMeta,
}

/// Attachment descriptor within a record.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentMeta {
    /// Local filename the blob is cached under.
    pub filename: String,

    /// Path segment joined onto the attachment base URL.
    pub location: String,

    /// Byte count of the blob.
    pub size: u64,

    /// Hex-encoded SHA-256 digest of the blob.
    pub hash: String,
}

/// A record's attachment resolved to concrete fetch inputs.
#[derive(Debug, Clone)]
pub struct ResolvedAttachment {
    /// Source URL of the blob.
    pub url: Url,

    /// Cache path under the destination directory.
    pub path: PathBuf,

    /// Integrity expectation from the manifest.
    pub expectation: IntegrityExpectation,
}

/// Fetch and parse the record list.
///
/// The manifest carries no integrity metadata for itself, so it is always
/// fetched fresh (never served from cache) and mirrored path-keyed at
/// `<dest_dir>/records.json` for inspection.
pub async fn fetch_record_list(
    cache: &BlobCache,
    config: &MirrorConfig,
) -> MirrorResult<RecordList> {
    let url = Url::parse(&config.records_url).map_err(|e| MirrorError::Config {
        message: format!("invalid records URL {:?}: {}", config.records_url, e),
    })?;

    let bytes = cache.fetch(&url, &config.records_path(), None).await?;

    serde_json::from_slice(&bytes).map_err(|e| MirrorError::Schema {
        message: format!("failed to parse record list: {}", e),
    })
}

/// Resolve a record to its fetch inputs.
///
/// Pure mapping: the attachment base URL joined with the record's location,
/// and the destination directory joined with its filename. Filenames that
/// could escape the destination directory are rejected.
pub fn resolve_attachment(
    config: &MirrorConfig,
    record: &Record,
) -> MirrorResult<ResolvedAttachment> {
    let attachment = &record.attachment;

    if !is_safe_filename(&attachment.filename) {
        return Err(MirrorError::Schema {
            message: format!("unsafe attachment filename: {:?}", attachment.filename),
        });
    }

    let base = Url::parse(&config.attachment_base_url).map_err(|e| MirrorError::Config {
        message: format!(
            "invalid attachment base URL {:?}: {}",
            config.attachment_base_url, e
        ),
    })?;
    let url = base.join(&attachment.location).map_err(|e| MirrorError::Schema {
        message: format!("invalid attachment location {:?}: {}", attachment.location, e),
    })?;

    Ok(ResolvedAttachment {
        url,
        path: config.dest_dir.join(&attachment.filename),
        expectation: IntegrityExpectation::new(attachment.size, attachment.hash.clone()),
    })
}

/// A filename is safe when it stays inside the destination directory:
/// non-empty, no path separators, not a dot-dot component.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, location: &str) -> Record {
        Record {
            attachment: AttachmentMeta {
                filename: filename.to_string(),
                location: location.to_string(),
                size: 2060,
                hash: "6915db4e2c315f0ef561152eb43c24a83ff0b2a53b17f99b0016401498bd9a2d"
                    .to_string(),
            },
        }
    }

    #[test]
    fn parses_records_response() {
        let json = r#"{
            "data": [
                {
                    "attachment": {
                        "filename": "first.pem",
                        "location": "security-state/intermediates/aa.pem",
                        "size": 3,
                        "hash": "ABC123"
                    },
                    "schema": 1700000000000,
                    "last_modified": 1700000000000
                },
                {
                    "attachment": {
                        "filename": "second.pem",
                        "location": "security-state/intermediates/bb.pem",
                        "size": 4,
                        "hash": "def456"
                    }
                }
            ]
        }"#;

        let list: RecordList = serde_json::from_str(json).unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].attachment.filename, "first.pem");
        assert_eq!(list.data[1].attachment.size, 4);
    }

    #[test]
    fn missing_attachment_fields_fail_parse() {
        let json = r#"{"data": [{"attachment": {"filename": "a.pem"}}]}"#;
        let err = serde_json::from_str::<RecordList>(json).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn resolves_url_and_path() {
        let config = MirrorConfig::default()
            .with_attachment_base_url("https://cdn.example.com/")
            .with_dest_dir("/var/certs");

        let resolved =
            resolve_attachment(&config, &record("local.pem", "bucket/remote.pem")).unwrap();

        assert_eq!(
            resolved.url.as_str(),
            "https://cdn.example.com/bucket/remote.pem"
        );
        assert_eq!(resolved.path, PathBuf::from("/var/certs/local.pem"));
        assert_eq!(resolved.expectation.size, 2060);
    }

    #[test]
    fn rejects_traversal_filenames() {
        let config = MirrorConfig::default().with_dest_dir("/var/certs");

        for bad in ["../evil.pem", "a/b.pem", "a\\b.pem", "..", ""] {
            let err = resolve_attachment(&config, &record(bad, "bucket/x.pem")).unwrap_err();
            assert!(
                matches!(err, MirrorError::Schema { .. }),
                "filename {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = MirrorConfig::default().with_attachment_base_url("not a url");
        let err = resolve_attachment(&config, &record("a.pem", "bucket/x.pem")).unwrap_err();
        assert!(matches!(err, MirrorError::Config { .. }));
    }
}
