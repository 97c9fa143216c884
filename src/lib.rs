//! Cryptext - Passphrase-based text encryption
//!
//! Encrypts UTF-8 text under a passphrase using scrypt key derivation and
//! AES-256-GCM authenticated encryption, producing a self-contained armored
//! envelope that can be pasted anywhere a plain string fits.

#![forbid(unsafe_code)]

pub mod armor;
pub mod config;
pub mod crypt;
pub mod error;
pub mod passphrase;
pub mod service;

pub use config::CipherConfig;
pub use error::{CryptextError, ErrorCategory, ErrorKind, Result};
pub use service::CipherService;
