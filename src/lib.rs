pub mod alert;
pub mod config;
pub mod discord;
pub mod logger;
pub mod monitoring;
pub mod providers;
pub mod telegram;
pub mod units;

pub use alert::{AlertBackend, AlertDispatcher, AlertError, DispatchOutcome, LowBalanceAlert};
pub use config::{AlertSettings, ChainType, Config, NetworkConfig, Settings, WalletConfig};
pub use discord::DiscordNotifier;
pub use logger::init_tracing;
pub use monitoring::{BalanceMonitor, NetworkReport, RunSummary, WalletBalance};
pub use providers::{BalanceFetcher, CosmosFetcher, EvmFetcher, FetchError, IconFetcher};
pub use telegram::TelegramNotifier;
pub use units::{exceeds_threshold, format_decimal, to_decimal_unit};
