//! Credential shapes stored, encrypted, inside a tenant's profile
//! `credentials_ciphertext` field.

use serde::{Deserialize, Serialize};

use pinguin_vault::Vault;

use crate::error::{Result, SenderError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailCredentials {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsCredentials {
    pub api_base_url: String,
    pub account_id: String,
    pub auth_token: String,
    pub from_number: String,
}

pub fn decrypt_email_credentials(vault: &Vault, ciphertext: &str) -> Result<EmailCredentials> {
    let plaintext = vault
        .decrypt(ciphertext)
        .map_err(|e| SenderError::Config(e.to_string()))?;
    serde_json::from_str(&plaintext).map_err(|e| SenderError::Config(e.to_string()))
}

pub fn decrypt_sms_credentials(vault: &Vault, ciphertext: &str) -> Result<SmsCredentials> {
    let plaintext = vault
        .decrypt(ciphertext)
        .map_err(|e| SenderError::Config(e.to_string()))?;
    serde_json::from_str(&plaintext).map_err(|e| SenderError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinguin_vault::MasterKey;

    #[test]
    fn email_credentials_round_trip_through_vault() {
        let vault = Vault::new(MasterKey::generate());
        let creds = EmailCredentials {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            smtp_username: "svc".into(),
            smtp_password: "hunter2".into(),
            from_address: "noreply@example.com".into(),
        };
        let ciphertext = vault.encrypt(&serde_json::to_string(&creds).unwrap()).unwrap();
        let decrypted = decrypt_email_credentials(&vault, &ciphertext).unwrap();
        assert_eq!(decrypted.smtp_host, creds.smtp_host);
        assert_eq!(decrypted.smtp_password, creds.smtp_password);
    }

    #[test]
    fn malformed_ciphertext_is_a_config_error() {
        let vault = Vault::new(MasterKey::generate());
        assert!(decrypt_email_credentials(&vault, "not-valid-base64!!").is_err());
    }
}
