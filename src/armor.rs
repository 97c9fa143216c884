//! Versioned armoring for envelope bytes
//!
//! Provides base64url encoding with a version prefix for encrypted data.
//! The armored format is:
//! - Free of whitespace (including newlines)
//! - Safe to embed in URLs
//! - Safe to pass unescaped in a POSIX shell
//!
//! The version tag makes the envelope self-describing, so a future layout
//! change can be introduced under a new tag while old envelopes remain
//! decryptable.

use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Magic prefix for all cryptext versions
const MAGIC_PREFIX: &str = "cryptext";

/// Version 1 magic marker
const V1_MAGIC: &str = "cryptext1:";

/// Wrap bytes in armor, returning the armored string
///
/// Format: cryptext1:{base64url-no-padding}
pub fn wrap(body: &[u8]) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(body);
    format!("{}{}", V1_MAGIC, encoded)
}

/// Unwrap an armored string, returning the original bytes
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    if armored.len() < V1_MAGIC.len() {
        return Err(CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            "input size smaller than magic marker; likely truncated",
        ));
    }

    if let Some(encoded) = armored.strip_prefix(V1_MAGIC) {
        let body = URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
            CryptextError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                format!("base64 decoding failed: {}", e),
                e,
            )
        })?;
        Ok(body)
    } else if armored.starts_with(MAGIC_PREFIX) {
        Err(CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            "input claims to be cryptext, but not a version we support",
        ))
    } else {
        Err(CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            "input unrecognized as cryptext data",
        ))
    }
}
