//! Sealing/opening using scrypt + AES-256-GCM
//!
//! This module implements passphrase-based encryption using:
//! - scrypt for key derivation from passphrase
//! - AES-256-GCM for authenticated encryption
//!
//! The binary envelope format (v1, as carried inside the armor) is:
//! - scrypt log2(N): 1 byte
//! - scrypt r: 4 bytes (big-endian u32)
//! - scrypt p: 4 bytes (big-endian u32)
//! - salt length: 1 byte
//! - salt: variable length
//! - nonce: 12 bytes
//! - length: 8 bytes (big-endian signed int64)
//! - ciphertext: variable length (includes 16-byte GCM tag)
//!
//! The key-derivation parameters are embedded so that opening an envelope
//! never depends on the configuration of the service that opens it; they
//! are validated against the supported bounds before being honored.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::{Params, scrypt};
use std::mem::size_of;
use zeroize::Zeroizing;

use crate::config::{self, CipherConfig};
use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};

/// Length of nonce in bytes, fixed at the AES-GCM standard 96 bits.
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Length of derived key in bytes (AES-256)
const KEY_LEN: usize = 32;

/// Derive a 32-byte key from a passphrase and salt using scrypt
fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let params = Params::new(log_n, r, p, KEY_LEN).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::CryptoBackend,
            "failed to create scrypt params",
            e,
        )
    })?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt(passphrase, salt, &params, &mut key[..]).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::CryptoBackend,
            "scrypt key derivation failed",
            e,
        )
    })?;

    Ok(key)
}

/// Encrypt plaintext with a passphrase using a fresh random salt and nonce
///
/// Salt length and scrypt cost come from `config`; both are recorded in the
/// returned envelope bytes.
pub fn seal(passphrase: &[u8], plaintext: &[u8], config: &CipherConfig) -> Result<Vec<u8>> {
    config.validate()?;

    let mut salt = vec![0u8; config.salt_len];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    seal_with(passphrase, plaintext, config, &salt, &nonce)
}

/// Encrypt plaintext with a passphrase using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `seal()` which generates random
/// salt/nonce.
pub fn seal_with(
    passphrase: &[u8],
    plaintext: &[u8],
    config: &CipherConfig,
    salt: &[u8],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    if !config::kdf_params_supported(config.scrypt_log_n, config.scrypt_r, config.scrypt_p)
        || !config::salt_len_supported(salt.len())
    {
        return Err(CryptextError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::CryptoBackend,
            "cipher configuration outside the supported range",
        ));
    }

    let key = derive_key(
        passphrase,
        salt,
        config.scrypt_log_n,
        config.scrypt_r,
        config.scrypt_p,
    )?;

    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| {
        CryptextError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::CryptoBackend,
            "cipher rejected derived key",
        )
    })?;

    let nonce_obj = Nonce::from(*nonce);
    let ciphertext = cipher.encrypt(&nonce_obj, plaintext).map_err(|_| {
        CryptextError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::CryptoBackend,
            "cipher failed to seal plaintext",
        )
    })?;

    let ciphertext_len = ciphertext.len() as i64;
    let mut output = Vec::with_capacity(
        size_of::<u8>() * 2
            + size_of::<u32>() * 2
            + salt.len()
            + NONCE_LEN
            + size_of::<i64>()
            + ciphertext.len(),
    );
    output.push(config.scrypt_log_n);
    output.extend_from_slice(&config.scrypt_r.to_be_bytes());
    output.extend_from_slice(&config.scrypt_p.to_be_bytes());
    output.push(salt.len() as u8);
    output.extend_from_slice(salt);
    output.extend_from_slice(nonce);
    output.extend_from_slice(&ciphertext_len.to_be_bytes()); // big-endian i64
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Decrypt envelope bytes with a passphrase
///
/// The key is re-derived from the salt and scrypt parameters embedded in
/// the envelope, so this does not take a configuration.
pub fn open(passphrase: &[u8], envelope: &[u8]) -> Result<Vec<u8>> {
    let mut pos = 0;

    if envelope.len() < pos + size_of::<u8>() {
        return Err(malformed("input likely truncated while reading scrypt cost"));
    }
    let log_n = envelope[pos];
    pos += size_of::<u8>();

    if envelope.len() < pos + size_of::<u32>() {
        return Err(malformed(
            "input likely truncated while reading scrypt block size",
        ));
    }
    let r_bytes: [u8; 4] = envelope[pos..pos + size_of::<u32>()]
        .try_into()
        .map_err(|_| malformed("failed to read scrypt block size"))?;
    let r = u32::from_be_bytes(r_bytes);
    pos += size_of::<u32>();

    if envelope.len() < pos + size_of::<u32>() {
        return Err(malformed(
            "input likely truncated while reading scrypt parallelization",
        ));
    }
    let p_bytes: [u8; 4] = envelope[pos..pos + size_of::<u32>()]
        .try_into()
        .map_err(|_| malformed("failed to read scrypt parallelization"))?;
    let p = u32::from_be_bytes(p_bytes);
    pos += size_of::<u32>();

    if !config::kdf_params_supported(log_n, r, p) {
        return Err(malformed(
            "embedded key-derivation parameters outside the supported range",
        ));
    }

    if envelope.len() < pos + size_of::<u8>() {
        return Err(malformed("input likely truncated while reading salt length"));
    }
    let salt_len = envelope[pos] as usize;
    pos += size_of::<u8>();

    if !config::salt_len_supported(salt_len) {
        return Err(malformed("embedded salt length outside the supported range"));
    }

    if envelope.len() < pos + salt_len {
        return Err(malformed("input likely truncated while reading salt"));
    }
    let salt = &envelope[pos..pos + salt_len];
    pos += salt_len;

    if envelope.len() < pos + NONCE_LEN {
        return Err(malformed("input likely truncated while reading nonce"));
    }
    let nonce: [u8; NONCE_LEN] = envelope[pos..pos + NONCE_LEN]
        .try_into()
        .map_err(|_| malformed("failed to read nonce"))?;
    pos += NONCE_LEN;

    if envelope.len() < pos + size_of::<i64>() {
        return Err(malformed("input likely truncated while reading ciphertext"));
    }
    let length_bytes: [u8; 8] = envelope[pos..pos + size_of::<i64>()]
        .try_into()
        .map_err(|_| malformed("failed to read length"))?;
    let ciphertext_len = i64::from_be_bytes(length_bytes);
    pos += size_of::<i64>();

    if ciphertext_len < 0 {
        return Err(malformed(
            "negative ciphertext length (when interpreted as a big-endian i64)",
        ));
    }

    // Check if length exceeds platform's maximum isize. *Valid* input
    // can fail this check if the platform's isize is small.
    if ciphertext_len > isize::MAX as i64 {
        return Err(malformed("ciphertext length exceeds this system's max isize"));
    }

    let ciphertext_len = ciphertext_len as usize;

    if ciphertext_len < TAG_LEN {
        return Err(malformed("ciphertext shorter than the authentication tag"));
    }

    if ciphertext_len > envelope.len() {
        return Err(malformed(
            "truncated or corrupt input; claimed length greater than available input",
        ));
    }

    if envelope.len() < pos + ciphertext_len {
        return Err(malformed(
            "truncated or corrupt input (while reading ciphertext)",
        ));
    }
    let ciphertext = &envelope[pos..pos + ciphertext_len];
    pos += ciphertext_len;

    if pos < envelope.len() {
        return Err(malformed("invalid input: unexpected data after ciphertext"));
    }

    let key = derive_key(passphrase, salt, log_n, r, p)?;
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| {
        CryptextError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::CryptoBackend,
            "cipher rejected derived key",
        )
    })?;
    let nonce_obj = Nonce::from(nonce);
    let plaintext = cipher.decrypt(&nonce_obj, ciphertext).map_err(|_| {
        CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "corrupt input, tampered-with data, or wrong passphrase",
        )
    })?;

    Ok(plaintext)
}

fn malformed(msg: &str) -> CryptextError {
    CryptextError::with_kind(ErrorCategory::User, ErrorKind::MalformedEnvelope, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap scrypt cost so the suite stays fast; the bounds are the same
    /// ones production parameters are validated against.
    fn test_config() -> CipherConfig {
        CipherConfig {
            scrypt_log_n: 12,
            scrypt_r: 8,
            scrypt_p: 1,
            salt_len: 16,
        }
    }

    /// Offset of the length field for a 16-byte salt envelope.
    fn length_offset() -> usize {
        1 + 4 + 4 + 1 + 16 + NONCE_LEN
    }

    #[test]
    fn test_empty_plaintext() {
        let passphrase = "test";
        let plaintext = b"";

        let envelope = seal(passphrase.as_bytes(), plaintext, &test_config()).unwrap();
        let decrypted = open(passphrase.as_bytes(), &envelope).unwrap();

        assert_eq!(plaintext, &decrypted[..]);
    }

    #[test]
    fn test_small_plaintext() {
        let passphrase = "test";
        let plaintext = b"hello";

        let envelope = seal(passphrase.as_bytes(), plaintext, &test_config()).unwrap();
        let decrypted = open(passphrase.as_bytes(), &envelope).unwrap();

        assert_eq!(plaintext, &decrypted[..]);
    }

    #[test]
    fn test_deterministic_encryption() {
        let passphrase = "test";
        let plaintext = b"hello world";
        let salt = [1u8; 16];
        let nonce = [2u8; NONCE_LEN];

        let config = test_config();
        let e1 = seal_with(passphrase.as_bytes(), plaintext, &config, &salt, &nonce).unwrap();
        let e2 = seal_with(passphrase.as_bytes(), plaintext, &config, &salt, &nonce).unwrap();

        // Same salt/nonce produces identical envelope bytes
        assert_eq!(e1, e2);

        // Both decrypt to same plaintext
        let p1 = open(passphrase.as_bytes(), &e1).unwrap();
        let p2 = open(passphrase.as_bytes(), &e2).unwrap();
        assert_eq!(plaintext, &p1[..]);
        assert_eq!(plaintext, &p2[..]);
    }

    #[test]
    fn test_different_nonce_different_ciphertext() {
        let passphrase = "test";
        let plaintext = b"hello world";
        let salt = [1u8; 16];
        let nonce1 = [2u8; NONCE_LEN];
        let nonce2 = [3u8; NONCE_LEN];

        let config = test_config();
        let e1 = seal_with(passphrase.as_bytes(), plaintext, &config, &salt, &nonce1).unwrap();
        let e2 = seal_with(passphrase.as_bytes(), plaintext, &config, &salt, &nonce2).unwrap();

        // Different nonce produces different ciphertext
        assert_ne!(e1, e2);

        // Both decrypt to same plaintext
        let p1 = open(passphrase.as_bytes(), &e1).unwrap();
        let p2 = open(passphrase.as_bytes(), &e2).unwrap();
        assert_eq!(plaintext, &p1[..]);
        assert_eq!(plaintext, &p2[..]);
    }

    #[test]
    fn test_wrong_passphrase() {
        let plaintext = b"secret data";

        let envelope = seal(b"correct", plaintext, &test_config()).unwrap();
        let result = open(b"wrong", &envelope);

        let err = result.expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
        assert_eq!(err.category, ErrorCategory::User);
        assert!(
            err.message()
                .contains("corrupt input, tampered-with data, or wrong passphrase")
        );
    }

    #[test]
    fn test_tampered_ciphertext() {
        let passphrase = b"test";
        let mut envelope = seal(passphrase, b"payload", &test_config()).unwrap();

        let last = envelope.len() - 1;
        envelope[last] ^= 0x01;

        let err = open(passphrase, &envelope).expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
    }

    #[test]
    fn test_truncated_header() {
        let envelope = vec![12u8, 0, 0]; // Ends mid block-size field
        let err = open(b"test", &envelope).expect_err("expected truncation error");

        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("input likely truncated while reading scrypt block size")
        );
    }

    #[test]
    fn test_truncated_salt() {
        let mut envelope = Vec::new();
        envelope.push(12u8);
        envelope.extend_from_slice(&8u32.to_be_bytes());
        envelope.extend_from_slice(&1u32.to_be_bytes());
        envelope.push(16u8);
        envelope.extend_from_slice(&[0u8; 3]); // Incomplete salt

        let err = open(b"test", &envelope).expect_err("expected truncation error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("input likely truncated while reading salt")
        );
    }

    #[test]
    fn test_truncated_nonce() {
        let mut envelope = Vec::new();
        envelope.push(12u8);
        envelope.extend_from_slice(&8u32.to_be_bytes());
        envelope.extend_from_slice(&1u32.to_be_bytes());
        envelope.push(16u8);
        envelope.extend_from_slice(&[0u8; 16]);
        envelope.extend_from_slice(&[0u8; 3]); // Incomplete nonce

        let err = open(b"test", &envelope).expect_err("expected truncation error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("input likely truncated while reading nonce")
        );
    }

    #[test]
    fn test_unsupported_embedded_params() {
        let mut envelope = Vec::new();
        envelope.push(42u8); // log2(N) far above the supported bound
        envelope.extend_from_slice(&8u32.to_be_bytes());
        envelope.extend_from_slice(&1u32.to_be_bytes());
        envelope.push(16u8);
        envelope.extend_from_slice(&[0u8; 16 + NONCE_LEN + 8 + TAG_LEN]);

        let err = open(b"test", &envelope).expect_err("expected unsupported params error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("embedded key-derivation parameters outside the supported range")
        );
    }

    #[test]
    fn test_unsupported_embedded_salt_len() {
        let mut envelope = Vec::new();
        envelope.push(12u8);
        envelope.extend_from_slice(&8u32.to_be_bytes());
        envelope.extend_from_slice(&1u32.to_be_bytes());
        envelope.push(200u8); // Salt length above the supported bound
        envelope.extend_from_slice(&[0u8; 255]);

        let err = open(b"test", &envelope).expect_err("expected unsupported salt error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("embedded salt length outside the supported range")
        );
    }

    #[test]
    fn test_negative_length() {
        let passphrase = b"test";
        let mut envelope = seal(passphrase, b"hello", &test_config()).unwrap();

        let negative: i64 = -1;
        let off = length_offset();
        envelope[off..off + 8].copy_from_slice(&negative.to_be_bytes());

        let err = open(passphrase, &envelope).expect_err("expected negative length error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(err.message().contains("negative ciphertext length"));
    }

    #[test]
    fn test_length_exceeds_available() {
        let passphrase = b"test";
        let mut envelope = seal(passphrase, b"hello", &test_config()).unwrap();

        // Modify length to be larger than actual data
        let huge_length: i64 = 1000000;
        let off = length_offset();
        envelope[off..off + 8].copy_from_slice(&huge_length.to_be_bytes());

        let err = open(passphrase, &envelope).expect_err("expected truncation error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("truncated or corrupt input; claimed length greater than available input")
        );
    }

    #[test]
    fn test_length_shorter_than_tag() {
        let passphrase = b"test";
        let mut envelope = seal(passphrase, b"hello", &test_config()).unwrap();

        let tiny: i64 = 5;
        let off = length_offset();
        envelope[off..off + 8].copy_from_slice(&tiny.to_be_bytes());
        envelope.truncate(off + 8 + 5);

        let err = open(passphrase, &envelope).expect_err("expected short ciphertext error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("ciphertext shorter than the authentication tag")
        );
    }

    #[test]
    fn test_trailing_data() {
        let passphrase = b"test";
        let mut envelope = seal(passphrase, b"hello", &test_config()).unwrap();

        // Add trailing junk
        envelope.push(0xFF);

        let err = open(passphrase, &envelope).expect_err("expected trailing data error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert!(
            err.message()
                .contains("invalid input: unexpected data after ciphertext")
        );
    }

    #[test]
    fn test_all_byte_values() {
        let passphrase = b"test";
        let plaintext: Vec<u8> = (0..=255).collect();

        let envelope = seal(passphrase, &plaintext, &test_config()).unwrap();
        let decrypted = open(passphrase, &envelope).unwrap();

        assert_eq!(plaintext, decrypted);
    }

    #[test]
    fn test_large_plaintext() {
        let passphrase = b"test";
        let plaintext = vec![0x42u8; 128 * 1024]; // 128KB

        let envelope = seal(passphrase, &plaintext, &test_config()).unwrap();
        let decrypted = open(passphrase, &envelope).unwrap();

        assert_eq!(plaintext, decrypted);
    }

    #[test]
    fn test_unusual_salt_length_roundtrip() {
        let config = CipherConfig {
            salt_len: 24,
            ..test_config()
        };

        let envelope = seal(b"test", b"payload", &config).unwrap();
        let decrypted = open(b"test", &envelope).unwrap();

        assert_eq!(b"payload", &decrypted[..]);
    }

    #[test]
    fn test_seal_rejects_invalid_config() {
        let config = CipherConfig {
            scrypt_log_n: 40,
            ..test_config()
        };

        let err = seal(b"test", b"payload", &config).expect_err("expected config error");
        assert_eq!(err.kind, Some(ErrorKind::CryptoBackend));
        assert_eq!(err.category, ErrorCategory::Internal);
    }
}
