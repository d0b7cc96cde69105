use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Any tag mismatch, truncation, or wrong key surfaces as this single
    /// variant — the vault never distinguishes "wrong key" from "corrupted
    /// ciphertext" for a caller.
    #[error("vault.invalid_ciphertext")]
    InvalidCiphertext,

    #[error("invalid master key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
