use async_trait::async_trait;
use reqwest::Client;

use crate::credentials::SmsCredentials;
use crate::error::{Result, SenderError};
use crate::sender::{OutboundMessage, Sender};

/// Sends SMS through a Twilio-shaped HTTP API: `POST {base_url}/Messages`
/// with basic auth and a form body. Any account reachable through that
/// contract (Twilio itself, a compatible gateway) works without changes.
pub struct SmsSender {
    client: Client,
    credentials: SmsCredentials,
}

impl SmsSender {
    pub fn new(credentials: SmsCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }
}

#[async_trait]
impl Sender for SmsSender {
    async fn send(&self, message: OutboundMessage<'_>) -> Result<()> {
        let url = format!("{}/Messages", self.credentials.api_base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.account_id, Some(&self.credentials.auth_token))
            .form(&[
                ("To", message.recipient),
                ("From", self.credentials.from_number.as_str()),
                ("Body", message.body),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SenderError::Transient(e.to_string())
                } else {
                    SenderError::Permanent(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() || status.as_u16() == 429 {
            Err(SenderError::Transient(format!("{status}: {body}")))
        } else {
            Err(SenderError::Permanent(format!("{status}: {body}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(base_url: String) -> SmsCredentials {
        SmsCredentials {
            api_base_url: base_url,
            account_id: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+15550000000".into(),
        }
    }

    #[tokio::test]
    async fn success_response_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Messages"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let sender = SmsSender::new(credentials(server.uri()));
        let result = sender
            .send(OutboundMessage {
                recipient: "+15551234567",
                subject: None,
                body: "hello",
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Messages"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let sender = SmsSender::new(credentials(server.uri()));
        let result = sender
            .send(OutboundMessage {
                recipient: "+15551234567",
                subject: None,
                body: "hello",
            })
            .await;
        assert!(matches!(result, Err(SenderError::Transient(_))));
    }

    #[tokio::test]
    async fn bad_request_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Messages"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let sender = SmsSender::new(credentials(server.uri()));
        let result = sender
            .send(OutboundMessage {
                recipient: "+15551234567",
                subject: None,
                body: "hello",
            })
            .await;
        assert!(matches!(result, Err(SenderError::Permanent(_))));
    }
}
