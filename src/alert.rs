use async_trait::async_trait;
use bigdecimal::BigDecimal;
use eyre::Result;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::AlertSettings;
use crate::discord::DiscordNotifier;
use crate::telegram::TelegramNotifier;
use crate::units::format_decimal;

/// Delivery failure of a single backend
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("unexpected status code: {0}")]
    Status(reqwest::StatusCode),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// A notification channel
#[async_trait]
pub trait AlertBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &str) -> Result<(), AlertError>;
}

/// Balance below threshold for one wallet
#[derive(Debug, Clone)]
pub struct LowBalanceAlert<'a> {
    pub network: &'a str,
    pub address: &'a str,
    pub balance: &'a BigDecimal,
    pub threshold: &'a BigDecimal,
    pub coin: &'a str,
    pub explorer: &'a str,
}

impl LowBalanceAlert<'_> {
    pub fn message(&self) -> String {
        let explorer = self.explorer.trim_end_matches('/');
        format!(
            "🚨 **{network}** Alert 🚨\n\nAddress: [{address}]({explorer}/{address})\nBalance: {balance} {coin}\nThreshold: {threshold} {coin}\n\n",
            network = self.network,
            address = self.address,
            explorer = explorer,
            balance = format_decimal(self.balance),
            threshold = format_decimal(self.threshold),
            coin = self.coin,
        )
    }
}

/// Per-alert delivery counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans an alert out to every configured backend
pub struct AlertDispatcher {
    backends: Vec<Box<dyn AlertBackend>>,
}

impl AlertDispatcher {
    pub fn new(backends: Vec<Box<dyn AlertBackend>>) -> Self {
        Self { backends }
    }

    /// Backends enabled in the settings: Discord first, then Telegram
    pub fn from_settings(settings: &AlertSettings) -> Result<Self> {
        let mut backends: Vec<Box<dyn AlertBackend>> = Vec::new();
        if let Some(discord) = &settings.discord {
            backends.push(Box::new(DiscordNotifier::new(discord)?));
        }
        if let Some(telegram) = &settings.telegram {
            backends.push(Box::new(TelegramNotifier::new(telegram)));
        }
        if backends.is_empty() {
            warn!("no alert backend configured, alerts will only be logged");
        }
        Ok(Self::new(backends))
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Deliver to each backend in turn; failures are logged and counted
    pub async fn send_alert(&self, alert: &LowBalanceAlert<'_>) -> DispatchOutcome {
        let message = alert.message();
        let mut outcome = DispatchOutcome::default();

        if self.backends.is_empty() {
            warn!(network = alert.network, address = alert.address, "low balance alert not delivered: {}", message.trim_end());
            return outcome;
        }

        for backend in &self.backends {
            match backend.deliver(&message).await {
                Ok(()) => {
                    info!(backend = backend.name(), network = alert.network, address = alert.address, "alert sent");
                    outcome.delivered += 1;
                }
                Err(e) => {
                    error!(backend = backend.name(), network = alert.network, address = alert.address, error = %e, "failed to send alert");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    struct Recording {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AlertBackend for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(&self, message: &str) -> Result<(), AlertError> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl AlertBackend for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn deliver(&self, _message: &str) -> Result<(), AlertError> {
            Err(AlertError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    fn alert<'a>(balance: &'a BigDecimal, threshold: &'a BigDecimal) -> LowBalanceAlert<'a> {
        LowBalanceAlert {
            network: "Ethereum",
            address: "0x28C6c06298d514Db089934071355E5743bf21d60",
            balance,
            threshold,
            coin: "ETH",
            explorer: "https://etherscan.io/address/",
        }
    }

    #[test]
    fn message_layout() {
        let balance = BigDecimal::from_str("0.500000000000000000").unwrap();
        let threshold = BigDecimal::from_str("1.0").unwrap();
        assert_eq!(
            alert(&balance, &threshold).message(),
            "🚨 **Ethereum** Alert 🚨\n\n\
             Address: [0x28C6c06298d514Db089934071355E5743bf21d60](https://etherscan.io/address/0x28C6c06298d514Db089934071355E5743bf21d60)\n\
             Balance: 0.5 ETH\n\
             Threshold: 1 ETH\n\n"
        );
    }

    #[tokio::test]
    async fn failing_backend_does_not_stop_the_others() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = AlertDispatcher::new(vec![
            Box::new(Broken),
            Box::new(Recording { sent: sent.clone() }),
        ]);

        let balance = BigDecimal::from_str("0.5").unwrap();
        let threshold = BigDecimal::from_str("1").unwrap();
        let outcome = dispatcher.send_alert(&alert(&balance, &threshold)).await;

        assert_eq!(outcome, DispatchOutcome { delivered: 1, failed: 1 });
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_backends_only_logs() {
        let dispatcher = AlertDispatcher::from_settings(&AlertSettings::default()).unwrap();
        assert!(dispatcher.backend_names().is_empty());

        let balance = BigDecimal::from_str("0").unwrap();
        let threshold = BigDecimal::from_str("1").unwrap();
        let outcome = dispatcher.send_alert(&alert(&balance, &threshold)).await;
        assert_eq!(outcome, DispatchOutcome::default());
    }
}
