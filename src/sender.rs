use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Per-recipient delivery failure. Expected provider rejections and
/// transport errors both land here; the dispatcher converts them into a
/// failed attempt record, never into a caller-visible error.
#[derive(Debug, Error)]
#[error("delivery failed: {message}")]
pub struct SendError {
    pub message: String,
}

impl SendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One-shot delivery capability: one attempt, provider message id on success.
#[async_trait]
pub trait ChannelSender: Send + Sync + 'static {
    async fn send(&self, to: &str, body: &str) -> Result<String, SendError>;
}

/// Local-mode sender: logs the outbound message instead of calling the
/// provider.
pub struct LogSender;

pub const LOCAL_MESSAGE_ID: &str = "local-message-id";

#[async_trait]
impl ChannelSender for LogSender {
    async fn send(&self, to: &str, body: &str) -> Result<String, SendError> {
        info!(to = %to, body = %body, "sms not sent in log mode");
        Ok(LOCAL_MESSAGE_ID.to_string())
    }
}

/// Twilio Messages API client.
pub struct TwilioSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

impl TwilioSender {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl ChannelSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> Result<String, SendError> {
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|err| SendError::new(format!("twilio request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SendError::new(format!(
                "twilio rejected message ({status}): {detail}"
            )));
        }

        let message: TwilioMessageResponse = response
            .json()
            .await
            .map_err(|err| SendError::new(format!("invalid twilio response: {err}")))?;

        Ok(message.sid)
    }
}
