use bigdecimal::BigDecimal;
use eyre::{eyre, Result};
use num_bigint::BigUint;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::alert::{AlertDispatcher, LowBalanceAlert};
use crate::config::{Config, NetworkConfig, Settings, WalletConfig};
use crate::logger::{print_balance_row, print_network_footer, print_network_header};
use crate::providers::{self, BalanceFetcher, FetchError};
use crate::units::{exceeds_threshold, to_decimal_unit};

/// Balance of one evaluated wallet
#[derive(Debug, Clone)]
pub struct WalletBalance {
    pub name: String,
    pub address: String,
    pub balance: BigUint,
    pub decimal: BigDecimal,
    pub below_threshold: bool,
}

/// Outcome of checking one network
#[derive(Debug, Clone, Default)]
pub struct NetworkReport {
    pub network: String,
    pub balances: Vec<WalletBalance>,
    pub failed_wallets: usize,
    pub alerts_delivered: usize,
    pub alerts_failed: usize,
}

/// Totals for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub networks_checked: usize,
    pub networks_skipped: usize,
    pub wallets_checked: usize,
    pub wallets_failed: usize,
    pub wallets_below_threshold: usize,
    pub alerts_delivered: usize,
    pub alerts_failed: usize,
}

impl RunSummary {
    fn record(&mut self, report: &NetworkReport) {
        self.networks_checked += 1;
        self.wallets_checked += report.balances.len();
        self.wallets_failed += report.failed_wallets;
        self.wallets_below_threshold += report.balances.iter().filter(|b| b.below_threshold).count();
        self.alerts_delivered += report.alerts_delivered;
        self.alerts_failed += report.alerts_failed;
    }
}

/// Walks every network and wallet once
pub struct BalanceMonitor<'a> {
    config: &'a Config,
    settings: &'a Settings,
    dispatcher: AlertDispatcher,
}

impl<'a> BalanceMonitor<'a> {
    pub fn new(config: &'a Config, settings: &'a Settings, dispatcher: AlertDispatcher) -> Self {
        Self {
            config,
            settings,
            dispatcher,
        }
    }

    /// Check all networks in configured order
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for network in &self.config.networks {
            print_network_header(network);

            match providers::connect(network, self.settings) {
                Ok(fetcher) => {
                    let report = self.check_network(network, fetcher.as_ref()).await;
                    summary.record(&report);
                }
                Err(e) => {
                    error!(network = %network.name, rpc = %network.rpc, error = %e, "skipping network, client setup failed");
                    summary.networks_skipped += 1;
                }
            }

            print_network_footer();
        }

        summary
    }

    /// `run` bounded by `deadline`; an expired deadline is an error
    pub async fn run_with_deadline(&self, deadline: Duration) -> Result<RunSummary> {
        tokio::time::timeout(deadline, self.run())
            .await
            .map_err(|_| eyre!("balance check exceeded the run deadline of {:?}", deadline))
    }

    /// Check the alert-enabled wallets of one network with the given fetcher
    pub async fn check_network(
        &self,
        network: &NetworkConfig,
        fetcher: &dyn BalanceFetcher,
    ) -> NetworkReport {
        let mut report = NetworkReport {
            network: network.name.clone(),
            ..Default::default()
        };

        for wallet in network.alert_wallets() {
            let balance = match self.check_wallet(network, wallet, fetcher).await {
                Ok(balance) => balance,
                Err(e) => {
                    warn!(network = %network.name, wallet = %wallet.name, address = %wallet.address, error = %e, "skipping wallet");
                    report.failed_wallets += 1;
                    continue;
                }
            };

            print_balance_row(&balance.address, &balance.decimal, &balance.balance, &network.threshold);

            if balance.below_threshold {
                let alert = LowBalanceAlert {
                    network: &network.name,
                    address: &wallet.address,
                    balance: &balance.decimal,
                    threshold: &network.threshold,
                    coin: &network.coin,
                    explorer: &network.explorer,
                };
                let outcome = self.dispatcher.send_alert(&alert).await;
                report.alerts_delivered += outcome.delivered;
                report.alerts_failed += outcome.failed;
            }

            report.balances.push(balance);
        }

        report
    }

    async fn check_wallet(
        &self,
        network: &NetworkConfig,
        wallet: &WalletConfig,
        fetcher: &dyn BalanceFetcher,
    ) -> Result<WalletBalance, FetchError> {
        let balance = fetcher.fetch_balance(&wallet.address).await?;
        let decimal = to_decimal_unit(&balance, network.decimals);
        let below_threshold = exceeds_threshold(&decimal, &network.threshold);

        debug!(network = %network.name, wallet = %wallet.name, %balance, below_threshold, "balance fetched");
        if below_threshold {
            info!(network = %network.name, wallet = %wallet.name, address = %wallet.address, "balance below threshold");
        }

        Ok(WalletBalance {
            name: wallet.name.clone(),
            address: wallet.address.clone(),
            balance,
            decimal,
            below_threshold,
        })
    }
}
