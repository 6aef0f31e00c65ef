//! Shared utilities for integration testing.
//!
//! `MockNetwork` is an in-memory ledger implementing `NetworkRpc`; transfers
//! move value and burn the full fee budget, so a swept account really is
//! empty on the next run.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use wallet_sweeper::accounts::Account;
use wallet_sweeper::blockchain::{
    BlockchainError, BlockchainResult, FeeParameters, NetworkConnector, NetworkRpc, ReceiptSummary, TransferRequest,
};
use wallet_sweeper::config::SweepConfig;
use wallet_sweeper::registry::NetworkProfile;

/// How submitted transfers resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptMode {
    /// Mined successfully in the next block.
    Confirm,
    /// Mined but reverted; only the fee is charged.
    Revert,
    /// Never mined.
    Never,
}

/// One broadcast transfer as seen by the mock.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub from: Address,
    pub request: TransferRequest,
    pub tx_hash: TxHash,
}

pub struct MockNetwork {
    balances: Mutex<HashMap<Address, U256>>,
    fees: Mutex<FeeParameters>,
    failing_balances: Mutex<HashSet<Address>>,
    hanging_balances: Mutex<HashSet<Address>>,
    rejected_senders: Mutex<HashSet<Address>>,
    fee_error: Mutex<bool>,
    receipt_mode: Mutex<ReceiptMode>,
    receipts: Mutex<HashMap<TxHash, ReceiptSummary>>,
    submitted: Mutex<Vec<Submitted>>,
    head: AtomicU64,
    head_failures: AtomicU32,
}

impl MockNetwork {
    /// Network reporting a legacy gas price of `gas_price` wei.
    pub fn new(gas_price: u128) -> Arc<Self> {
        Arc::new(Self {
            balances: Mutex::new(HashMap::new()),
            fees: Mutex::new(FeeParameters {
                gas_price: Some(gas_price),
                max_fee_per_gas: None,
            }),
            failing_balances: Mutex::new(HashSet::new()),
            hanging_balances: Mutex::new(HashSet::new()),
            rejected_senders: Mutex::new(HashSet::new()),
            fee_error: Mutex::new(false),
            receipt_mode: Mutex::new(ReceiptMode::Confirm),
            receipts: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            head: AtomicU64::new(100),
            head_failures: AtomicU32::new(0),
        })
    }

    pub fn set_balance(&self, address: Address, amount: u128) {
        self.balances.lock().unwrap().insert(address, U256::from(amount));
    }

    pub fn balance(&self, address: Address) -> U256 {
        self.balances.lock().unwrap().get(&address).copied().unwrap_or_default()
    }

    pub fn set_fee_parameters(&self, params: FeeParameters) {
        *self.fees.lock().unwrap() = params;
    }

    pub fn fail_balance_of(&self, address: Address) {
        self.failing_balances.lock().unwrap().insert(address);
    }

    /// Never answer balance queries for `address`.
    pub fn hang_balance_of(&self, address: Address) {
        self.hanging_balances.lock().unwrap().insert(address);
    }

    /// Refuse every broadcast from `address` the way a node refuses an
    /// underfunded transaction.
    pub fn reject_submissions_from(&self, address: Address) {
        self.rejected_senders.lock().unwrap().insert(address);
    }

    pub fn fail_fee_queries(&self) {
        *self.fee_error.lock().unwrap() = true;
    }

    pub fn set_receipt_mode(&self, mode: ReceiptMode) {
        *self.receipt_mode.lock().unwrap() = mode;
    }

    /// Fail the next `n` block-number queries with a transport error.
    pub fn fail_head_queries(&self, n: u32) {
        self.head_failures.store(n, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkRpc for MockNetwork {
    async fn get_block_number(&self) -> BlockchainResult<u64> {
        let pending = self.head_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.head_failures.store(pending - 1, Ordering::SeqCst);
            return Err(BlockchainError::Transport("connection reset by peer".into()));
        }
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        let hangs = self.hanging_balances.lock().unwrap().contains(&address);
        if hangs {
            std::future::pending::<()>().await;
        }
        if self.failing_balances.lock().unwrap().contains(&address) {
            return Err(BlockchainError::Rpc {
                code: -32603,
                message: "internal error".into(),
            });
        }
        Ok(self.balance(address))
    }

    async fn get_fee_parameters(&self) -> BlockchainResult<FeeParameters> {
        if *self.fee_error.lock().unwrap() {
            return Err(BlockchainError::Timeout(1));
        }
        Ok(*self.fees.lock().unwrap())
    }

    async fn submit_transfer(&self, from: &Account, request: &TransferRequest) -> BlockchainResult<TxHash> {
        let fee = U256::from(request.gas_price) * U256::from(request.gas_limit);
        let mode = *self.receipt_mode.lock().unwrap();

        let rejected = self.rejected_senders.lock().unwrap().contains(&from.address);
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(&from.address).copied().unwrap_or_default();
        if rejected || available < request.value + fee {
            return Err(BlockchainError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".into(),
            });
        }

        let mut submitted = self.submitted.lock().unwrap();
        let tx_hash = B256::with_last_byte(submitted.len() as u8 + 1);
        submitted.push(Submitted {
            from: from.address,
            request: request.clone(),
            tx_hash,
        });

        let block = self.head.fetch_add(1, Ordering::SeqCst) + 1;
        match mode {
            ReceiptMode::Confirm => {
                balances.insert(from.address, available - request.value - fee);
                *balances.entry(request.to).or_default() += request.value;
                self.receipts.lock().unwrap().insert(
                    tx_hash,
                    ReceiptSummary {
                        success: true,
                        block_number: Some(block),
                        gas_used: request.gas_limit,
                    },
                );
            }
            ReceiptMode::Revert => {
                balances.insert(from.address, available - fee);
                self.receipts.lock().unwrap().insert(
                    tx_hash,
                    ReceiptSummary {
                        success: false,
                        block_number: Some(block),
                        gas_used: request.gas_limit,
                    },
                );
            }
            ReceiptMode::Never => {}
        }
        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        Ok(self.receipts.lock().unwrap().get(&tx_hash).copied())
    }
}

/// Connector serving mocks by chain id.
#[derive(Default)]
pub struct MockConnector {
    networks: Mutex<HashMap<u64, Arc<MockNetwork>>>,
    unreachable: Mutex<HashSet<u64>>,
    mismatched: Mutex<HashSet<u64>>,
    connects: AtomicU32,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, chain_id: u64, network: Arc<MockNetwork>) {
        self.networks.lock().unwrap().insert(chain_id, network);
    }

    /// Refuse connections to `chain_id` with a transport error.
    pub fn set_unreachable(&self, chain_id: u64) {
        self.unreachable.lock().unwrap().insert(chain_id);
    }

    /// Answer connections to `chain_id` with a chain-id mismatch.
    pub fn set_mismatched(&self, chain_id: u64) {
        self.mismatched.lock().unwrap().insert(chain_id);
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkConnector for MockConnector {
    async fn connect(&self, profile: &NetworkProfile) -> BlockchainResult<Arc<dyn NetworkRpc>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.lock().unwrap().contains(&profile.chain_id) {
            return Err(BlockchainError::Transport("connection refused".into()));
        }
        if self.mismatched.lock().unwrap().contains(&profile.chain_id) {
            return Err(BlockchainError::ChainMismatch {
                expected: profile.chain_id,
                actual: profile.chain_id + 1,
            });
        }
        let network = self
            .networks
            .lock()
            .unwrap()
            .get(&profile.chain_id)
            .cloned()
            .ok_or_else(|| BlockchainError::Transport("no such network".into()))?;
        Ok(network)
    }
}

pub fn profile(name: &str, chain_id: u64) -> NetworkProfile {
    NetworkProfile::new(name, chain_id, "http://127.0.0.1:8545", "TST", "https://scan.test/tx/{tx}")
}

pub fn account(id: u32, byte: u8) -> Account {
    Account::new(id, Address::repeat_byte(byte), "not-a-real-key")
}

pub fn destination() -> Address {
    Address::repeat_byte(0xde)
}

/// Fast settings: fee of `gas_limit * price`, short waits, quick retries.
pub fn settings(gas_limit: u64) -> SweepConfig {
    SweepConfig {
        transfer_gas_limit: gas_limit,
        confirmation_timeout_secs: 1,
        receipt_poll_interval_ms: 5,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 5,
        ..SweepConfig::default()
    }
}

pub fn temp_dir() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("sweeper_it_{}", uuid::Uuid::new_v4()));
    p
}
