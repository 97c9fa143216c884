//! Cipher configuration
//!
//! Holds the knobs a deployment may want to tune: scrypt cost parameters
//! and salt length. An explicit struct passed at service construction;
//! there is no process-wide mutable configuration.

use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};

/// Supported range for scrypt log2(N). Envelopes embedding values outside
/// this range are rejected as malformed rather than honored, which bounds
/// the memory an attacker-supplied envelope can make key derivation use.
pub const SCRYPT_LOG_N_MIN: u8 = 10;
pub const SCRYPT_LOG_N_MAX: u8 = 22;

/// Supported range for scrypt r (block size).
pub const SCRYPT_R_MIN: u32 = 1;
pub const SCRYPT_R_MAX: u32 = 32;

/// Supported range for scrypt p (parallelization).
pub const SCRYPT_P_MIN: u32 = 1;
pub const SCRYPT_P_MAX: u32 = 16;

/// Supported range for salt length in bytes.
pub const SALT_LEN_MIN: usize = 8;
pub const SALT_LEN_MAX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfig {
    /// scrypt CPU/memory cost as log2(N).
    pub scrypt_log_n: u8,
    /// scrypt block size.
    pub scrypt_r: u32,
    /// scrypt parallelization.
    pub scrypt_p: u32,
    /// Length of the random salt generated per encryption, in bytes.
    pub salt_len: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            scrypt_log_n: 15, // N = 32768
            scrypt_r: 8,
            scrypt_p: 1,
            salt_len: 16,
        }
    }
}

impl CipherConfig {
    /// Checks that every parameter is within the supported range.
    pub fn validate(&self) -> Result<()> {
        if !kdf_params_supported(self.scrypt_log_n, self.scrypt_r, self.scrypt_p) {
            return Err(CryptextError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CryptoBackend,
                "scrypt parameters outside the supported range",
            ));
        }
        if !salt_len_supported(self.salt_len) {
            return Err(CryptextError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CryptoBackend,
                "salt length outside the supported range",
            ));
        }
        Ok(())
    }
}

/// Shared bounds check, used both for validating a configuration and for
/// vetting parameters embedded in an envelope before honoring them.
pub(crate) fn kdf_params_supported(log_n: u8, r: u32, p: u32) -> bool {
    (SCRYPT_LOG_N_MIN..=SCRYPT_LOG_N_MAX).contains(&log_n)
        && (SCRYPT_R_MIN..=SCRYPT_R_MAX).contains(&r)
        && (SCRYPT_P_MIN..=SCRYPT_P_MAX).contains(&p)
}

pub(crate) fn salt_len_supported(len: usize) -> bool {
    (SALT_LEN_MIN..=SALT_LEN_MAX).contains(&len)
}
