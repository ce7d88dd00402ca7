use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::NetworkConfig;
use crate::units::format_decimal;

const SEPARATOR_WIDTH: usize = 125;

/// Diagnostics go to stderr so stdout carries only the balance report
pub fn init_tracing() {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// One aligned report row: address, balance in coins, raw balance, threshold
pub fn format_row(address: &str, balance: &str, raw: &str, threshold: &str) -> String {
    format!("{:<50} {:<35} {:<25} {:<20}", address, balance, raw, threshold)
}

/// Network name, column titles and separator
pub fn format_network_header(network: &NetworkConfig) -> String {
    let columns = format_row(
        "Address",
        &format!("Balance ({})", network.coin),
        "Balance",
        "Threshold",
    );
    format!("Network: {}\n{}\n{}", network.name, columns, "-".repeat(SEPARATOR_WIDTH))
}

pub fn format_balance_row(
    address: &str,
    decimal: &BigDecimal,
    raw: &BigUint,
    threshold: &BigDecimal,
) -> String {
    format_row(
        address,
        &format_decimal(decimal),
        &raw.to_string(),
        &format_decimal(threshold),
    )
}

pub fn print_network_header(network: &NetworkConfig) {
    println!("{}", format_network_header(network));
}

pub fn print_balance_row(address: &str, decimal: &BigDecimal, raw: &BigUint, threshold: &BigDecimal) {
    println!("{}", format_balance_row(address, decimal, raw, threshold));
}

pub fn print_network_footer() {
    println!("\n");
}
