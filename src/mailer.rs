use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Outbound message handed to the delivery collaborator. The auth core
/// only ever needs "send this text to this address".
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("failed to reach mail service: {0}")]
    Transport(String),
    #[error("mail service rejected the message: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, msg: &EmailMessage) -> Result<(), MailerError>;
}

/// Delivery over a JSON HTTP relay.
#[derive(Clone)]
pub struct HttpMailer {
    http: reqwest::Client,
    service_url: String,
    from: String,
}

impl HttpMailer {
    pub fn new(service_url: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            service_url,
            from,
        }
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, msg: &EmailMessage) -> Result<(), MailerError> {
        let url = format!("{}/email", self.service_url);
        let request = SendEmailRequest {
            from: &self.from,
            to: &msg.to,
            subject: &msg.subject,
            text: &msg.body,
        };

        self.http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "mail service unreachable");
                MailerError::Transport(e.to_string())
            })?
            .error_for_status()
            .map_err(|e| {
                error!(error = %e, "mail service returned error");
                MailerError::Rejected(e.to_string())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_shape() {
        let request = SendEmailRequest {
            from: "no-reply@trailhead.app",
            to: "hiker@example.com",
            subject: "Your password reset token (valid for 10 minutes)",
            text: "Forgot your password?",
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("hiker@example.com"));
        assert!(json.contains("\"subject\""));
        assert!(json.contains("\"text\""));
    }
}
