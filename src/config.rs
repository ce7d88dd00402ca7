use bigdecimal::BigDecimal;
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Kind of RPC/API a network speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Evm,
    Icon,
    Cosmos,
}

/// Wallet to watch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub address: String,
    pub name: String,
    /// Only wallets with alerts enabled are checked
    #[serde(default)]
    pub alert: bool,
}

/// A single network with its wallets
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(rename = "type")]
    pub chain: ChainType,
    pub rpc: String,
    pub explorer: String,
    pub coin: String,
    pub name: String,
    pub decimals: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub threshold: BigDecimal,
    /// Cosmos bank denom, falls back to `coin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denom: Option<String>,
    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

impl NetworkConfig {
    pub fn denom(&self) -> &str {
        self.denom.as_deref().unwrap_or(&self.coin)
    }

    /// Wallets with alerts enabled, in configured order
    pub fn alert_wallets(&self) -> impl Iterator<Item = &WalletConfig> {
        self.wallets.iter().filter(|w| w.alert)
    }
}

/// Networks file (JSON or YAML)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(alias = "info")]
    pub networks: Vec<NetworkConfig>,
}

impl Config {
    /// Load configuration from a JSON or YAML file, picked by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        };
        config.wrap_err_with(|| format!("malformed config {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Discord webhook target
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

/// Telegram bot target
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Alert backends enabled through the environment
#[derive(Debug, Clone, Default)]
pub struct AlertSettings {
    pub discord: Option<DiscordConfig>,
    pub telegram: Option<TelegramConfig>,
}

impl AlertSettings {
    pub fn is_empty(&self) -> bool {
        self.discord.is_none() && self.telegram.is_none()
    }
}

const DEFAULT_CONFIG_PATH: &str = "./wallets.json";
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RUN_DEADLINE_SECS: u64 = 300;

/// Runtime settings, built once at startup and passed by reference
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    /// Bound on a single balance request
    pub rpc_timeout: Duration,
    /// Bound on establishing a connection to an endpoint
    pub connect_timeout: Duration,
    /// Bound on the whole run
    pub run_deadline: Duration,
    pub alerts: AlertSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            run_deadline: Duration::from_secs(DEFAULT_RUN_DEADLINE_SECS),
            alerts: AlertSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| -> Result<Duration> {
            match get(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| eyre!("invalid {key}={raw}: {e}")),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let discord = get("DISCORD_WEBHOOK_URL").map(|webhook_url| DiscordConfig { webhook_url });
        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (Some(_), None) => {
                warn!("TELEGRAM_BOT_TOKEN is set without TELEGRAM_CHAT_ID, telegram alerts disabled");
                None
            }
            (None, Some(_)) => {
                warn!("TELEGRAM_CHAT_ID is set without TELEGRAM_BOT_TOKEN, telegram alerts disabled");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            config_path: get("WALLETS_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            rpc_timeout: secs("RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT_SECS)?,
            connect_timeout: secs("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
            run_deadline: secs("RUN_DEADLINE_SECS", DEFAULT_RUN_DEADLINE_SECS)?,
            alerts: AlertSettings { discord, telegram },
        })
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }
}
