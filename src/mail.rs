use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::MailConfig;

/// Outbound mail transport. Boxed in `AppState` so tests can swap in a no-op.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text_content: String,
}

/// Sends mail through an HTTP transactional-mail API.
pub struct HttpMailer {
    http: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if !self.config.is_configured() {
            warn!(%to, "mail transport not configured; dropping message");
            return Ok(());
        }
        let payload = SendEmailBody {
            sender: EmailAddress {
                email: self.config.sender.clone(),
            },
            to: vec![EmailAddress {
                email: to.to_string(),
            }],
            subject: subject.to_string(),
            text_content: body.to_string(),
        };
        let resp = self
            .http
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("mail API returned {}", resp.status());
        }
        info!(%to, %subject, "email sent");
        Ok(())
    }
}

/// Fire-and-forget delivery: the request that triggered the mail never waits
/// on the transport, and a failed send is logged and discarded.
pub fn send_in_background(mailer: Arc<dyn Mailer>, to: String, subject: String, body: String) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &subject, &body).await {
            warn!(error = %e, %to, "background email delivery failed");
        }
    });
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unconfigured_transport_drops_mail_without_error() {
        let mailer = HttpMailer::new(MailConfig {
            api_url: String::new(),
            api_key: String::new(),
            sender: "noreply@example.com".into(),
        });
        mailer
            .send("jane@example.com", "Hello", "body")
            .await
            .expect("unconfigured transport must not fail the caller");
    }

    #[tokio::test]
    async fn background_send_records_message() {
        let mailer = Arc::new(testing::RecordingMailer::new());
        send_in_background(
            mailer.clone(),
            "jane@example.com".into(),
            "Confirm your email".into(),
            "body".into(),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[("jane@example.com".to_string(), "Confirm your email".to_string())]
        );
    }
}
