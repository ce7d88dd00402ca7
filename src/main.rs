use balance_alerter::{init_tracing, AlertDispatcher, BalanceMonitor, Config, Settings};
use eyre::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a local .env file
    dotenv::dotenv().ok();
    init_tracing();

    let mut settings = Settings::from_env()?;
    if let Some(path) = std::env::args().nth(1) {
        settings = settings.with_config_path(path);
    }

    let config = Config::from_file(&settings.config_path)?;
    let dispatcher = AlertDispatcher::from_settings(&settings.alerts)?;

    info!(
        config = %settings.config_path.display(),
        networks = config.networks.len(),
        backends = ?dispatcher.backend_names(),
        started_at = %chrono::Utc::now().to_rfc3339(),
        "balance check started"
    );

    let monitor = BalanceMonitor::new(&config, &settings, dispatcher);
    let summary = monitor.run_with_deadline(settings.run_deadline).await?;

    info!(
        networks_checked = summary.networks_checked,
        networks_skipped = summary.networks_skipped,
        wallets_checked = summary.wallets_checked,
        wallets_failed = summary.wallets_failed,
        below_threshold = summary.wallets_below_threshold,
        alerts_delivered = summary.alerts_delivered,
        alerts_failed = summary.alerts_failed,
        "balance check finished"
    );

    Ok(())
}
