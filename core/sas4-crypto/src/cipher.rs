//! AES-256-CBC payload encoding in the OpenSSL "Salted__" format.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the per-message salt in bytes.
pub const SALT_SIZE: usize = 8;

const SALT_MAGIC: &[u8; 8] = b"Salted__";

/// Request body shape expected by the remote API: `{"payload": "<cipher output>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub payload: String,
}

/// Encrypts JSON documents under a static passphrase.
///
/// Two encodings of the same document differ (fresh salt per call) but decrypt
/// to the same JSON.
#[derive(Clone)]
pub struct PayloadCipher {
    passphrase: Zeroizing<String>,
}

impl PayloadCipher {
    /// Creates a cipher for the given passphrase.
    pub fn new(passphrase: impl Into<String>) -> CryptoResult<Self> {
        let passphrase = passphrase.into();
        if passphrase.is_empty() {
            return Err(CryptoError::EmptyKey);
        }
        Ok(Self {
            passphrase: Zeroizing::new(passphrase),
        })
    }

    /// Serializes `document` to JSON and encrypts it with a random salt.
    pub fn encode<T: Serialize + ?Sized>(&self, document: &T) -> CryptoResult<String> {
        let mut salt = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        self.encode_with_salt(document, salt)
    }

    /// Like [`encode`](Self::encode) but with a caller-chosen salt.
    ///
    /// Only useful for reproducing known vectors; production callers should
    /// let the cipher draw a salt.
    pub fn encode_with_salt<T: Serialize + ?Sized>(
        &self,
        document: &T,
        salt: [u8; SALT_SIZE],
    ) -> CryptoResult<String> {
        let plaintext = Zeroizing::new(serde_json::to_vec(document)?);
        let key = DerivedKey::derive(self.passphrase.as_bytes(), &salt);

        let ciphertext = Aes256CbcEnc::new_from_slices(key.key(), key.iv())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

        let mut bytes = Vec::with_capacity(SALT_MAGIC.len() + SALT_SIZE + ciphertext.len());
        bytes.extend_from_slice(SALT_MAGIC);
        bytes.extend_from_slice(&salt);
        bytes.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(&bytes))
    }

    /// Encrypts `document` and wraps it in the `{payload}` envelope.
    pub fn envelope<T: Serialize + ?Sized>(&self, document: &T) -> CryptoResult<EncryptedEnvelope> {
        Ok(EncryptedEnvelope {
            payload: self.encode(document)?,
        })
    }

    /// Decrypts a payload produced by [`encode`](Self::encode) (or by CryptoJS
    /// with the same passphrase) and deserializes it.
    pub fn decode<T: DeserializeOwned>(&self, encoded: &str) -> CryptoResult<T> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;

        let header_len = SALT_MAGIC.len() + SALT_SIZE;
        if bytes.len() <= header_len || &bytes[..SALT_MAGIC.len()] != SALT_MAGIC {
            return Err(CryptoError::Decryption("missing salt header".to_string()));
        }

        let salt = &bytes[SALT_MAGIC.len()..header_len];
        let key = DerivedKey::derive(self.passphrase.as_bytes(), salt);

        let plaintext = Zeroizing::new(
            Aes256CbcDec::new_from_slices(key.key(), key.iv())
                .map_err(|e| CryptoError::Decryption(e.to_string()))?
                .decrypt_padded_vec_mut::<Pkcs7>(&bytes[header_len..])
                .map_err(|_| {
                    CryptoError::Decryption("bad padding (wrong key or tampered data)".to_string())
                })?,
        );

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}
