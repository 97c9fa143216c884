//! Text encryption service
//!
//! `CipherService` is the string-level API: validate inputs, seal UTF-8
//! text into an armored envelope, and open envelopes back into text. Each
//! call is an independent transformation; the service holds configuration
//! only and no mutable state, so it is freely shareable across threads.

use crate::armor;
use crate::config::CipherConfig;
use crate::crypt;
use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};

#[derive(Debug, Clone)]
pub struct CipherService {
    config: CipherConfig,
}

impl CipherService {
    /// Creates a service with the given configuration, rejecting
    /// configurations outside the supported parameter bounds.
    pub fn new(config: CipherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Encrypt text with a passphrase, returning the armored envelope.
    ///
    /// Both arguments must contain at least one non-whitespace character.
    /// The text itself is encrypted verbatim, whitespace included. Every
    /// call uses a fresh salt and nonce, so encrypting the same text twice
    /// yields different envelopes.
    pub fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<String> {
        validate_nonblank(plaintext, "plaintext")?;
        validate_nonblank(passphrase, "passphrase")?;

        let sealed = crypt::seal(passphrase.as_bytes(), plaintext.as_bytes(), &self.config)
            .map_err(|e| e.with_context("encryption failed"))?;
        Ok(armor::wrap(&sealed))
    }

    /// Decrypt an armored envelope with a passphrase, returning the
    /// original text exactly as it was encrypted.
    ///
    /// The key-derivation parameters embedded in the envelope are used, so
    /// envelopes produced under any supported configuration decrypt here.
    pub fn decrypt(&self, envelope: &str, passphrase: &str) -> Result<String> {
        validate_nonblank(passphrase, "passphrase")?;

        let sealed = armor::unwrap(envelope).map_err(|e| e.with_context("failed to unarmor"))?;
        let plaintext = crypt::open(passphrase.as_bytes(), &sealed)
            .map_err(|e| e.with_context("failed to decrypt"))?;
        String::from_utf8(plaintext).map_err(|_| {
            CryptextError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                "decrypted payload is not valid UTF-8 text",
            )
        })
    }
}

impl Default for CipherService {
    fn default() -> Self {
        Self {
            config: CipherConfig::default(),
        }
    }
}

fn validate_nonblank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidInput,
            format!("{} must not be empty or whitespace-only", what),
        ));
    }
    Ok(())
}
