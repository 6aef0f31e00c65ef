//! Balance lookup, for the sweep and for the read-only survey.

use alloy::primitives::{Address, U256};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

use crate::accounts::Account;
use crate::blockchain::rpc::{NetworkConnector, NetworkRpc};
use crate::blockchain::types::BlockchainResult;
use crate::registry::NetworkProfile;

/// Reads native balances from one network.
#[derive(Clone)]
pub struct BalanceScanner {
    rpc: Arc<dyn NetworkRpc>,
}

impl BalanceScanner {
    pub fn new(rpc: Arc<dyn NetworkRpc>) -> Self {
        Self { rpc }
    }

    pub async fn balance_of(&self, account: &Account) -> BlockchainResult<U256> {
        self.rpc.get_balance(account.address).await
    }
}

/// One account's balance on one network.
#[derive(Debug, Clone)]
pub struct AccountBalance {
    pub wallet_id: u32,
    pub address: Address,
    pub balance: Result<U256, String>,
}

/// All balances of one network, or why none could be read.
#[derive(Debug, Clone)]
pub struct NetworkBalances {
    pub network_name: String,
    pub currency: String,
    pub connection_error: Option<String>,
    pub balances: Vec<AccountBalance>,
}

impl NetworkBalances {
    pub fn funded(&self) -> usize {
        self.balances
            .iter()
            .filter(|b| b.balance.as_ref().is_ok_and(|v| !v.is_zero()))
            .count()
    }
}

/// Read every account's balance on every network without moving anything.
///
/// Results come back in registry order regardless of completion order.
pub async fn survey_balances(
    connector: &dyn NetworkConnector,
    networks: &[NetworkProfile],
    accounts: &[Account],
    max_concurrent_networks: usize,
) -> Vec<NetworkBalances> {
    stream::iter(networks)
        .map(|profile| survey_network(connector, profile, accounts))
        .buffered(max_concurrent_networks.max(1))
        .collect()
        .await
}

async fn survey_network(
    connector: &dyn NetworkConnector,
    profile: &NetworkProfile,
    accounts: &[Account],
) -> NetworkBalances {
    let mut result = NetworkBalances {
        network_name: profile.name.clone(),
        currency: profile.currency.clone(),
        connection_error: None,
        balances: Vec::with_capacity(accounts.len()),
    };

    let scanner = match connector.connect(profile).await {
        Ok(rpc) => BalanceScanner::new(rpc),
        Err(e) => {
            tracing::warn!(network = %profile.name, error = %e, "Network unreachable");
            result.connection_error = Some(e.to_string());
            return result;
        }
    };

    for account in accounts {
        let balance = scanner.balance_of(account).await.map_err(|e| e.to_string());
        result.balances.push(AccountBalance {
            wallet_id: account.id,
            address: account.address,
            balance,
        });
    }
    result
}
