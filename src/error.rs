use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to the user's
    /// input or actions.
    ///
    /// Use of Internal is never a guarantee the error is not, for example,
    /// due to a user error - merely that the code cannot confidently
    /// determine that it is.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete. Recoverable; the caller
    /// should re-prompt.
    User,
}

/// Condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Plaintext or passphrase was empty or whitespace-only.
    InvalidInput,
    /// The envelope failed to parse: unrecognized or future-version armor,
    /// bad base64, truncated or trailing data, or unsupported embedded
    /// key-derivation parameters.
    MalformedEnvelope,
    /// Authentication failed due to an incorrect passphrase or tampering
    /// or corruption. The cases are intentionally indistinguishable.
    DecryptionFailed,
    /// The scrypt or AES-GCM primitive failed to execute, or the cipher
    /// configuration is outside the supported range.
    CryptoBackend,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// Interaction with stdin/stdout failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct CryptextError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl CryptextError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving
    /// the original as source. Category and kind carry over.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CryptextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_category_and_kind() {
        let err = CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "authentication failed",
        )
        .with_context("decryption failed");

        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
        assert_eq!(err.message(), "decryption failed");
        assert!(err.source_error().is_some());
    }

    #[test]
    fn test_new_has_no_kind() {
        let err = CryptextError::new(ErrorCategory::Internal, "boom");
        assert_eq!(err.kind, None);
        assert!(err.source_error().is_none());
    }
}
