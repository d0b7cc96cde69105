//! The credential vault.
//!
//! Wraps a single process-wide master key (256 bits) and offers
//! `encrypt`/`decrypt` over AES-256-GCM. The nonce (96 bits, fresh and
//! random per call) is prefixed to the returned ciphertext. Plaintext
//! credentials exist only transiently in memory in the caller; the vault
//! never logs either.

pub mod error;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;

pub use error::{Result, VaultError};

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// The process-wide master key, loaded once at startup before any worker
/// starts and never mutated afterward.
#[derive(Clone)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    /// Parse a master key from a hex or base64-encoded string, as it would
    /// arrive from a `server.masterEncryptionKey` configuration value.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.len() == KEY_LEN * 2 {
            if let Ok(bytes) = hex::decode(trimmed) {
                if bytes.len() == KEY_LEN {
                    let mut key = [0u8; KEY_LEN];
                    key.copy_from_slice(&bytes);
                    return Ok(Self(key));
                }
            }
        }

        let bytes = BASE64
            .decode(trimmed)
            .map_err(|e| VaultError::InvalidKey(e.to_string()))?;
        if bytes.len() != KEY_LEN {
            return Err(VaultError::InvalidKey(format!(
                "master key must decode to {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self(key))
    }

    /// Generate a fresh random key. Used by operators to provision
    /// `masterEncryptionKey`, and by tests.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey").field("key", &"<redacted>").finish()
    }
}

/// The Credential Vault. Cheap to clone; holds only the master key.
#[derive(Clone, Debug)]
pub struct Vault {
    key: MasterKey,
}

impl Vault {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext`, returning a base64 string of `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key.0)
            .map_err(|_| VaultError::InvalidKey("bad key length".into()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| VaultError::InvalidCiphertext)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`Vault::encrypt`]. Fails with
    /// [`VaultError::InvalidCiphertext`] on any tag mismatch, truncation, or
    /// non-matching key.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String> {
        let blob = BASE64
            .decode(ciphertext_b64)
            .map_err(|_| VaultError::InvalidCiphertext)?;

        if blob.len() < NONCE_LEN {
            return Err(VaultError::InvalidCiphertext);
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.key.0)
            .map_err(|_| VaultError::InvalidKey("bad key length".into()))?;

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| VaultError::InvalidCiphertext)?;

        String::from_utf8(plaintext).map_err(|_| VaultError::InvalidCiphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let vault = Vault::new(MasterKey::generate());
        let ciphertext = vault.encrypt("super-secret-smtp-password").unwrap();
        assert_ne!(ciphertext, "super-secret-smtp-password");
        let plaintext = vault.decrypt(&ciphertext).unwrap();
        assert_eq!(plaintext, "super-secret-smtp-password");
    }

    #[test]
    fn wrong_key_fails() {
        let vault_a = Vault::new(MasterKey::generate());
        let vault_b = Vault::new(MasterKey::generate());
        let ciphertext = vault_a.encrypt("hunter2").unwrap();
        assert!(matches!(
            vault_b.decrypt(&ciphertext),
            Err(VaultError::InvalidCiphertext)
        ));
    }

    #[test]
    fn single_bit_mutation_fails() {
        let vault = Vault::new(MasterKey::generate());
        let ciphertext = vault.encrypt("flip a bit somewhere").unwrap();
        let mut blob = BASE64.decode(&ciphertext).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let mutated = BASE64.encode(blob);
        assert!(matches!(
            vault.decrypt(&mutated),
            Err(VaultError::InvalidCiphertext)
        ));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let vault = Vault::new(MasterKey::generate());
        assert!(matches!(
            vault.decrypt("aGVsbG8="),
            Err(VaultError::InvalidCiphertext)
        ));
    }

    #[test]
    fn parse_key_from_hex_and_base64() {
        let raw = MasterKey::generate();
        let vault = Vault::new(raw);
        let hex_key = hex::encode([7u8; KEY_LEN]);
        let parsed = MasterKey::parse(&hex_key).unwrap();
        let _ = Vault::new(parsed);

        let ciphertext = vault.encrypt("x").unwrap();
        assert!(vault.decrypt(&ciphertext).is_ok());
    }

    #[test]
    fn rejects_wrong_length_key() {
        assert!(MasterKey::parse("tooshort").is_err());
    }
}
