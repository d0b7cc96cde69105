use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::credentials::EmailCredentials;
use crate::error::{Result, SenderError};
use crate::sender::{OutboundMessage, Sender};

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailSender {
    pub fn new(credentials: &EmailCredentials) -> Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&credentials.smtp_host)
            .map_err(|e| SenderError::Config(e.to_string()))?
            .port(credentials.smtp_port)
            .credentials(Credentials::new(
                credentials.smtp_username.clone(),
                credentials.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            mailer,
            from_address: credentials.from_address.clone(),
        })
    }
}

#[async_trait]
impl Sender for EmailSender {
    async fn send(&self, message: OutboundMessage<'_>) -> Result<()> {
        let subject = message.subject.unwrap_or("Notification");

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| SenderError::Config(format!("invalid from address: {e}")))?,
            )
            .to(message
                .recipient
                .parse()
                .map_err(|e| SenderError::Permanent(format!("invalid recipient address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.to_string())
            .map_err(|e| SenderError::Permanent(e.to_string()))?;

        match self.mailer.send(email).await {
            Ok(_) => Ok(()),
            Err(e) if is_transient_smtp_error(&e) => Err(SenderError::Transient(e.to_string())),
            Err(e) => Err(SenderError::Permanent(e.to_string())),
        }
    }
}

/// SMTP 4xx reply codes (421 service unavailable, 450/451/452 mailbox
/// busy/local error/storage) are worth retrying; everything else — 5xx
/// rejections, auth failures, malformed addresses — is terminal.
fn is_transient_smtp_error(err: &lettre::transport::smtp::Error) -> bool {
    let s = err.to_string();
    ["421", "450", "451", "452"].iter().any(|code| s.starts_with(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_host() {
        let creds = EmailCredentials {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: "u".into(),
            smtp_password: "p".into(),
            from_address: "noreply@example.com".into(),
        };
        assert!(EmailSender::new(&creds).is_err());
    }
}
