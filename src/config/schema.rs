//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a sweep run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::registry::{builtin_networks, NetworkProfile};

/// Root configuration for the sweeper.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Address every swept balance is sent to.
    pub destination: Option<String>,

    /// Where the accounts come from.
    pub accounts: AccountsConfig,

    /// Sweep engine tuning.
    pub sweep: SweepConfig,

    /// Report output settings.
    pub report: ReportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Networks to sweep, in order. Replaces the built-in registry when present.
    pub networks: Vec<NetworkProfile>,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            destination: None,
            accounts: AccountsConfig::default(),
            sweep: SweepConfig::default(),
            report: ReportConfig::default(),
            observability: ObservabilityConfig::default(),
            networks: builtin_networks(),
        }
    }
}

/// Account source selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSource {
    /// Newest `evm-wallets-*.json` in `wallets_dir`.
    WalletFile,
    /// Private keys in the variables named by `env_keys`.
    Env,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub source: AccountSource,

    /// Directory holding the key-generation output.
    pub wallets_dir: String,

    /// Substring identifying wallet files.
    pub file_prefix: String,

    /// Variables read when `source = "env"`.
    pub env_keys: Vec<String>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            source: AccountSource::WalletFile,
            wallets_dir: "wallets".to_string(),
            file_prefix: "evm-wallets-".to_string(),
            env_keys: vec![
                "PRIVATE_KEY".to_string(),
                "PRIVATE_KEY_TECHNICAL".to_string(),
                "PRIVATE_KEY_MARKETING".to_string(),
                "PRIVATE_KEY_OTHER".to_string(),
            ],
        }
    }
}

/// Sweep engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Networks processed at once.
    pub max_concurrent_networks: usize,

    /// Accounts processed at once within one network.
    pub max_concurrent_accounts: usize,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Upper bound on waiting for a receipt, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Confirmations required, counting the inclusion block itself.
    pub confirmation_blocks: u32,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Gas price used when a node reports none, in gwei.
    pub fallback_gas_price_gwei: u64,

    /// Gas units of a plain native-currency transfer.
    pub transfer_gas_limit: u64,

    /// Connection attempts per network (transient failures only).
    pub connect_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub retry_max_delay_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrent_networks: 3,
            max_concurrent_accounts: 4,
            rpc_timeout_secs: 15,
            confirmation_timeout_secs: 180,
            confirmation_blocks: 1,
            receipt_poll_interval_ms: 2000,
            fallback_gas_price_gwei: 20,
            transfer_gas_limit: 21_000,
            connect_attempts: 3,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the sweep report is written to.
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "wallets".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Write a Prometheus text snapshot next to the report.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SweeperConfig::default();
        assert!(config.destination.is_none());
        assert_eq!(config.networks.len(), 6);
        assert_eq!(config.sweep.fallback_gas_price_gwei, 20);
        assert_eq!(config.sweep.transfer_gas_limit, 21_000);
        assert_eq!(config.accounts.source, AccountSource::WalletFile);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SweeperConfig = toml::from_str(
            r#"
            destination = "0x8eB8Bf106EbC9834a2586D04F73866C7436Ce298"

            [sweep]
            confirmation_timeout_secs = 60

            [accounts]
            source = "env"
            "#,
        )
        .unwrap();
        assert_eq!(config.sweep.confirmation_timeout_secs, 60);
        assert_eq!(config.sweep.max_concurrent_networks, 3);
        assert_eq!(config.accounts.source, AccountSource::Env);
        assert_eq!(config.accounts.env_keys.len(), 4);
        assert_eq!(config.networks.len(), 6);
    }

    #[test]
    fn test_networks_replace_builtin() {
        let config: SweeperConfig = toml::from_str(
            r#"
            [[networks]]
            name = "Local"
            chain_id = 31337
            rpc_url = "http://127.0.0.1:8545"
            currency = "ETH"
            explorer_url = "http://localhost/tx/{tx}"
            "#,
        )
        .unwrap();
        assert_eq!(config.networks.len(), 1);
        assert_eq!(config.networks[0].chain_id, 31337);
        assert!(config.networks[0].rpc_url_env.is_none());
    }
}
