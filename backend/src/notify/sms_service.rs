use std::time::Duration;

use log::info;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const SMS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("messaging provider rejected the message ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

#[derive(Deserialize)]
struct MessageCreated {
    sid: String,
}

/// Outbound SMS over the Twilio message-create contract. Credentials and the
/// alert numbers are fixed at startup; the client is shared and read-only.
#[derive(Clone)]
pub struct SmsService {
    client: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    to_number: String,
    from_number: String,
}

impl SmsService {
    pub fn new(
        client: Client,
        api_base: String,
        account_sid: String,
        auth_token: String,
        to_number: String,
        from_number: String,
    ) -> Self {
        Self {
            client,
            api_base,
            account_sid,
            auth_token,
            to_number,
            from_number,
        }
    }

    /// Sends one alert SMS and returns the provider's message SID. Attempted at
    /// most once; a failure here must fail the surrounding request.
    pub async fn send_alert(&self, body: &str) -> Result<String, SmsError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );
        let params = [
            ("Body", body),
            ("To", self.to_number.as_str()),
            ("From", self.from_number.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .timeout(SMS_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(SmsError::Rejected { status, detail });
        }

        let message: MessageCreated = response.json().await?;
        info!("Alert message sent with SID: {}", message.sid);
        Ok(message.sid)
    }
}
