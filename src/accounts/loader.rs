//! Account set loading from the key-generation output or the environment.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::accounts::{Account, AccountError};
use crate::config::schema::{AccountSource, AccountsConfig};

/// Shape of an `evm-wallets-*.json` file. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct WalletFile {
    #[serde(default)]
    wallets: Vec<WalletEntry>,
}

#[derive(Debug, Deserialize)]
struct WalletEntry {
    id: u32,
    address: Address,
    #[serde(rename = "privateKey")]
    private_key: String,
}

/// Loads the accounts to sweep.
#[derive(Debug, Clone)]
pub struct AccountLoader {
    config: AccountsConfig,
}

impl AccountLoader {
    pub fn new(config: AccountsConfig) -> Self {
        Self { config }
    }

    /// Load every account from the configured source.
    ///
    /// Fails with [`AccountError::NoAccountsFound`] when the source holds none.
    pub fn load(&self) -> Result<Vec<Account>, AccountError> {
        let accounts = match self.config.source {
            AccountSource::WalletFile => self.load_wallet_file()?,
            AccountSource::Env => self.load_env(|var| std::env::var(var).ok())?,
        };
        let accounts = dedupe(accounts);
        if accounts.is_empty() {
            return Err(AccountError::NoAccountsFound(
                "account source is empty".to_string(),
            ));
        }
        tracing::info!(count = accounts.len(), source = ?self.config.source, "Accounts loaded");
        Ok(accounts)
    }

    /// Newest wallet file in the configured directory.
    pub fn latest_wallet_file(&self) -> Result<PathBuf, AccountError> {
        let dir = Path::new(&self.config.wallets_dir);
        if !dir.is_dir() {
            return Err(AccountError::NoAccountsFound(format!(
                "wallets directory {} does not exist; run the key generator first",
                dir.display()
            )));
        }

        let entries = fs::read_dir(dir).map_err(|source| AccountError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(&self.config.file_prefix))
            .max()
            .map(|name| dir.join(name))
            .ok_or_else(|| {
                AccountError::NoAccountsFound(format!(
                    "no {}* files in {}",
                    self.config.file_prefix,
                    dir.display()
                ))
            })
    }

    fn load_wallet_file(&self) -> Result<Vec<Account>, AccountError> {
        let path = self.latest_wallet_file()?;
        let path_str = path.display().to_string();
        tracing::info!(path = %path_str, "Loading wallets");

        let content = fs::read_to_string(&path).map_err(|source| AccountError::Io {
            path: path_str.clone(),
            source,
        })?;
        let file: WalletFile = serde_json::from_str(&content).map_err(|source| AccountError::Parse {
            path: path_str,
            source,
        })?;

        Ok(file
            .wallets
            .into_iter()
            .map(|w| Account::new(w.id, w.address, w.private_key))
            .collect())
    }

    /// Build accounts from the configured key variables, deriving each address.
    pub fn load_env<F>(&self, lookup: F) -> Result<Vec<Account>, AccountError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut accounts = Vec::new();
        for (idx, var) in self.config.env_keys.iter().enumerate() {
            let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) else {
                continue;
            };
            let trimmed = key.trim();
            let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
            match hex.parse::<PrivateKeySigner>() {
                Ok(signer) => accounts.push(Account::new(idx as u32 + 1, signer.address(), trimmed)),
                Err(_) => tracing::warn!(var = %var, "Skipping key that does not derive an address"),
            }
        }
        Ok(accounts)
    }
}

/// Keep the first account for each address.
fn dedupe(accounts: Vec<Account>) -> Vec<Account> {
    let mut seen = HashSet::new();
    accounts
        .into_iter()
        .filter(|account| {
            let fresh = seen.insert(account.address);
            if !fresh {
                tracing::warn!(id = account.id, address = %account.address, "Duplicate account ignored");
            }
            fresh
        })
        .collect()
}

/// Presence of one key variable, without its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKeyStatus {
    pub name: String,
    pub present: bool,
    pub length: usize,
}

/// Report which key variables are set and how long they are.
pub fn env_key_report<F>(names: &[String], lookup: F) -> Vec<EnvKeyStatus>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .map(|name| {
            let value = lookup(name).unwrap_or_default();
            EnvKeyStatus {
                name: name.clone(),
                present: !value.is_empty(),
                length: value.len(),
            }
        })
        .collect()
}
