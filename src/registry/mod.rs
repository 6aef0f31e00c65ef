//! Network registry.
//!
//! Static description of every network a sweep visits. Entries are
//! self-contained: adding or removing one never affects another.

use serde::{Deserialize, Serialize};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Placeholder in explorer templates replaced by the transaction hash.
const TX_PLACEHOLDER: &str = "{tx}";

/// One target network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkProfile {
    /// Human-readable name used in logs and reports.
    pub name: String,

    /// EIP-155 chain identifier.
    pub chain_id: u64,

    /// JSON-RPC endpoint. May contain `${VAR}` placeholders.
    pub rpc_url: String,

    /// Environment variable that replaces `rpc_url` when set.
    #[serde(default)]
    pub rpc_url_env: Option<String>,

    /// Additional endpoints tried when the primary fails.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Native currency symbol (e.g. "BNB").
    pub currency: String,

    /// Transaction explorer template; `{tx}` is replaced by the hash,
    /// otherwise the hash is appended.
    pub explorer_url: String,
}

impl NetworkProfile {
    /// Build a profile with no env override and no failovers.
    pub fn new(
        name: impl Into<String>,
        chain_id: u64,
        rpc_url: impl Into<String>,
        currency: impl Into<String>,
        explorer_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id,
            rpc_url: rpc_url.into(),
            rpc_url_env: None,
            failover_urls: Vec::new(),
            currency: currency.into(),
            explorer_url: explorer_url.into(),
        }
    }

    fn with_env(mut self, var: &str) -> Self {
        self.rpc_url_env = Some(var.to_string());
        self
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_link(&self, tx_hash: &str) -> String {
        if self.explorer_url.contains(TX_PLACEHOLDER) {
            self.explorer_url.replace(TX_PLACEHOLDER, tx_hash)
        } else {
            format!("{}{}", self.explorer_url, tx_hash)
        }
    }

    /// Resolve the primary endpoint against the process environment.
    pub fn resolve_rpc_url(&self) -> BlockchainResult<String> {
        self.resolve_with(|var| std::env::var(var).ok())
    }

    /// Resolve the failover endpoints; unresolvable entries are dropped.
    pub fn resolve_failover_urls(&self) -> Vec<String> {
        self.failover_urls
            .iter()
            .filter_map(|url| expand_placeholders(url, &|var| std::env::var(var).ok()).ok())
            .collect()
    }

    /// Resolve the primary endpoint with an explicit variable lookup.
    pub fn resolve_with<F>(&self, lookup: F) -> BlockchainResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(var) = &self.rpc_url_env {
            if let Some(url) = lookup(var).filter(|v| !v.trim().is_empty()) {
                return Ok(url);
            }
        }
        expand_placeholders(&self.rpc_url, &lookup)
    }

    /// Environment variables this profile reads, with whether each is required.
    pub fn env_vars(&self) -> Vec<(String, bool)> {
        let mut vars: Vec<(String, bool)> = placeholder_names(&self.rpc_url)
            .into_iter()
            .map(|name| (name, true))
            .collect();
        if let Some(var) = &self.rpc_url_env {
            vars.push((var.clone(), false));
        }
        vars
    }
}

fn placeholder_names(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                names.push(after[..end].to_string());
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

fn expand_placeholders<F>(template: &str, lookup: &F) -> BlockchainResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = template.to_string();
    for name in placeholder_names(template) {
        let value = lookup(&name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                BlockchainError::InvalidEndpoint(format!("environment variable {} not set", name))
            })?;
        resolved = resolved.replace(&format!("${{{}}}", name), &value);
    }
    Ok(resolved)
}

/// The built-in registry, in sweep order.
pub fn builtin_networks() -> Vec<NetworkProfile> {
    vec![
        NetworkProfile::new(
            "BSC Mainnet",
            56,
            "https://bsc-dataseed1.binance.org/",
            "BNB",
            "https://bscscan.com/tx/{tx}",
        )
        .with_env("BSC_RPC_URL"),
        NetworkProfile::new(
            "BSC Testnet",
            97,
            "https://data-seed-prebsc-1-s1.binance.org:8545/",
            "BNB",
            "https://testnet.bscscan.com/tx/{tx}",
        )
        .with_env("BSC_TESTNET_RPC_URL"),
        NetworkProfile::new(
            "Ethereum Mainnet",
            1,
            "https://mainnet.infura.io/v3/${INFURA_API_KEY}",
            "ETH",
            "https://etherscan.io/tx/{tx}",
        )
        .with_env("ETHEREUM_RPC_URL"),
        NetworkProfile::new(
            "Ethereum Sepolia",
            11155111,
            "https://sepolia.infura.io/v3/${INFURA_API_KEY}",
            "ETH",
            "https://sepolia.etherscan.io/tx/{tx}",
        )
        .with_env("SEPOLIA_RPC_URL"),
        NetworkProfile::new(
            "Polygon Mainnet",
            137,
            "https://polygon-rpc.com/",
            "MATIC",
            "https://polygonscan.com/tx/{tx}",
        )
        .with_env("POLYGON_RPC_URL"),
        NetworkProfile::new(
            "Polygon Amoy Testnet",
            80002,
            "https://rpc-amoy.polygon.technology/",
            "MATIC",
            "https://amoy.polygonscan.com/tx/{tx}",
        )
        .with_env("AMOY_RPC_URL"),
    ]
}
