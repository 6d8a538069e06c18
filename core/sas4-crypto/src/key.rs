//! Passphrase-based key and IV derivation.
//!
//! Implements OpenSSL's `EVP_BytesToKey` with MD5 and a single iteration,
//! which is what CryptoJS uses when handed a passphrase instead of a key.

use md5::{Digest, Md5};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;

/// AES key and IV derived from a passphrase and salt, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl DerivedKey {
    /// Derives key material from `passphrase` and an 8-byte `salt`.
    pub fn derive(passphrase: &[u8], salt: &[u8]) -> Self {
        let mut material = Vec::with_capacity(KEY_SIZE + IV_SIZE + 16);
        let mut previous: Vec<u8> = Vec::new();

        while material.len() < KEY_SIZE + IV_SIZE {
            let mut hasher = Md5::new();
            hasher.update(&previous);
            hasher.update(passphrase);
            hasher.update(salt);
            previous = hasher.finalize().to_vec();
            material.extend_from_slice(&previous);
        }

        let mut key = [0u8; KEY_SIZE];
        let mut iv = [0u8; IV_SIZE];
        key.copy_from_slice(&material[..KEY_SIZE]);
        iv.copy_from_slice(&material[KEY_SIZE..KEY_SIZE + IV_SIZE]);

        material.zeroize();
        previous.zeroize();

        Self { key, iv }
    }

    /// Returns the key bytes.
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Returns the IV bytes.
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}
