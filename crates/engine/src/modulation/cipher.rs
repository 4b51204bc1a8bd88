//! Authenticated encryption of the persisted payload

use crate::module::Module;
use crate::Document;
use chacha20poly1305::aead::Aead as _;
use chacha20poly1305::{ChaCha20Poly1305, KeyInit as _, Nonce};
use settle_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::any::Any;
use std::fmt;

/// 96-bit AEAD nonce, stored as the payload prefix.
const NONCE_LEN: usize = 12;
/// Poly1305 authentication tag appended to the ciphertext.
const TAG_LEN: usize = 16;

/// Module that encrypts the serialized document with ChaCha20-Poly1305.
///
/// The key is derived as SHA-256 of the password. Each save draws a fresh
/// random nonce and prepends it to the ciphertext, so the same document
/// never produces the same file twice. Decryption failures surface as
/// [`Error::InvalidPassword`] because a wrong password and a tampered file
/// are indistinguishable under an AEAD.
pub struct CipherModule {
    key: [u8; 32],
}

impl CipherModule {
    /// Cipher keyed from a password.
    pub fn new(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        Self { key: digest.into() }
    }
}

impl fmt::Debug for CipherModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never reveal key material
        f.debug_struct("CipherModule").finish_non_exhaustive()
    }
}

impl<T: Document> Module<T> for CipherModule {
    fn name(&self) -> &'static str {
        "cipher"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn encrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| Error::Cipher(e.to_string()))?;
        let mut nonce = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), data.as_slice())
            .map_err(|e| Error::Cipher(e.to_string()))?;
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        *data = out;
        Ok(())
    }

    fn decrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(Error::Cipher(format!(
                "encrypted payload is too short ({} bytes)",
                data.len()
            )));
        }
        let cipher = ChaCha20Poly1305::new_from_slice(&self.key)
            .map_err(|e| Error::Cipher(e.to_string()))?;
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::InvalidPassword)?;
        *data = plaintext;
        Ok(())
    }
}
