//! Content digests and integrity expectations.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Expected size and digest for a blob, always paired.
///
/// A fetch either has a full expectation or none at all; modeling the pair as
/// one value makes the both-or-neither invariant structural instead of a
/// runtime assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityExpectation {
    /// Expected byte count.
    pub size: u64,

    /// Expected hex-encoded SHA-256 digest. Compared case-insensitively.
    pub digest: String,
}

/// Why a blob failed its integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Byte count differs from the expectation.
    Size { expected: u64, actual: u64 },

    /// Digest differs from the expectation.
    Digest { expected: String, actual: String },
}

impl IntegrityExpectation {
    /// Create an expectation from a size and a hex digest.
    pub fn new(size: u64, digest: impl Into<String>) -> Self {
        Self {
            size,
            digest: digest.into(),
        }
    }

    /// Check `bytes` against the expectation.
    ///
    /// Size is compared first (cheap), then the digest. Hex comparison is
    /// ASCII-case-insensitive: upstream manifests are not consistent about
    /// digest casing.
    pub fn check(&self, bytes: &[u8]) -> Result<(), IntegrityViolation> {
        let actual_size = bytes.len() as u64;
        if actual_size != self.size {
            return Err(IntegrityViolation::Size {
                expected: self.size,
                actual: actual_size,
            });
        }

        let actual_digest = sha256_hex(bytes);
        if !actual_digest.eq_ignore_ascii_case(&self.digest) {
            return Err(IntegrityViolation::Digest {
                expected: self.digest.clone(),
                actual: actual_digest,
            });
        }

        Ok(())
    }
}
