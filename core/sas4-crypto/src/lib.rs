//! Payload encryption for the SAS4 licensing API.
//!
//! Every request body sent to the remote platform (except bare GETs) is
//! serialized to JSON, encrypted with AES-256-CBC under a static passphrase
//! and wrapped as `{"payload": "<base64>"}`.
//!
//! The output follows the OpenSSL "Salted__" convention used by CryptoJS:
//! `base64("Salted__" || salt || ciphertext)`, with key and IV derived from
//! the passphrase and a fresh random salt via `EVP_BytesToKey` (MD5).

mod cipher;
mod error;
mod key;

pub use cipher::{EncryptedEnvelope, PayloadCipher, SALT_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{DerivedKey, IV_SIZE, KEY_SIZE};
