use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::alert::{AlertBackend, AlertError};
use crate::config::DiscordConfig;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct DiscordMessage<'a> {
    content: &'a str,
}

/// Posts alerts to a Discord webhook
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder().timeout(DELIVERY_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        })
    }
}

#[async_trait]
impl AlertBackend for DiscordNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, message: &str) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&DiscordMessage { content: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::Status(status));
        }
        Ok(())
    }
}
