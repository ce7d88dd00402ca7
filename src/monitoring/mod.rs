pub mod balance;

pub use balance::{BalanceMonitor, NetworkReport, RunSummary, WalletBalance};
