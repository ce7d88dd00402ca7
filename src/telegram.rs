use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::alert::{AlertBackend, AlertError};
use crate::config::TelegramConfig;

/// Sends alerts to a Telegram chat through the Bot API
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
            chat: parse_recipient(&config.chat_id),
        }
    }

    /// Point the bot at another Bot API server
    pub fn with_api_url(mut self, url: reqwest::Url) -> Self {
        self.bot = self.bot.set_api_url(url);
        self
    }
}

/// Numeric ids address a chat, anything else a channel username (`@channel`)
fn parse_recipient(chat_id: &str) -> Recipient {
    let chat_id = chat_id.trim();
    match chat_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.to_string()),
    }
}

#[async_trait]
impl AlertBackend for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, message: &str) -> Result<(), AlertError> {
        self.bot
            .send_message(self.chat.clone(), message)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_from_chat_id() {
        assert_eq!(parse_recipient("-1001234567890"), Recipient::Id(ChatId(-1001234567890)));
        assert_eq!(parse_recipient(" 42 "), Recipient::Id(ChatId(42)));
        assert_eq!(
            parse_recipient("@wallet_alerts"),
            Recipient::ChannelUsername("@wallet_alerts".to_string())
        );
    }
}
