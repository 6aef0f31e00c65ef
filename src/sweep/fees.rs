//! Transfer fee estimation.

use alloy::primitives::U256;

use crate::blockchain::rpc::NetworkRpc;
use crate::blockchain::types::{BlockchainResult, FeeParameters};
use crate::config::SweepConfig;

const GWEI: u128 = 1_000_000_000;

/// Price and gas budget for one native transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Wei per gas unit.
    pub gas_price: u128,
    pub gas_limit: u64,
    /// The node offered no usable price; the configured floor was used.
    pub used_fallback: bool,
}

impl FeeQuote {
    /// Total fee budget in wei.
    pub fn cost(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_limit)
    }
}

/// Computes the cost of a standard transfer on one network.
#[derive(Debug, Clone, Copy)]
pub struct FeeEstimator {
    fallback_gas_price: u128,
    gas_limit: u64,
}

impl FeeEstimator {
    pub fn new(fallback_gas_price: u128, gas_limit: u64) -> Self {
        Self {
            fallback_gas_price,
            gas_limit,
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(u128::from(config.fallback_gas_price_gwei) * GWEI, config.transfer_gas_limit)
    }

    /// Query the network and price a transfer. Query failures are returned
    /// as-is; there is no retry.
    pub async fn estimate(&self, rpc: &dyn NetworkRpc) -> BlockchainResult<FeeQuote> {
        let params = rpc.get_fee_parameters().await?;
        Ok(self.select(params))
    }

    /// Legacy gas price, then EIP-1559 max fee, then the floor.
    pub fn select(&self, params: FeeParameters) -> FeeQuote {
        let offered = params
            .gas_price
            .filter(|p| *p > 0)
            .or(params.max_fee_per_gas.filter(|p| *p > 0));

        match offered {
            Some(gas_price) => FeeQuote {
                gas_price,
                gas_limit: self.gas_limit,
                used_fallback: false,
            },
            None => FeeQuote {
                gas_price: self.fallback_gas_price,
                gas_limit: self.gas_limit,
                used_fallback: true,
            },
        }
    }
}
