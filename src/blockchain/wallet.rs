//! Transaction signing for sweep accounts.
//!
//! # Security
//! - Keys come from the loaded [`Account`] and stay inside `SecretString`
//! - Keys are never logged or serialized
//! - A key that does not control the account's address is refused

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use secrecy::ExposeSecret;

use crate::accounts::Account;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Signer bound to one account on one chain.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Accepts keys with or without the `0x` prefix.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer, chain_id })
    }

    /// Build the signer for `account`, checking it controls the account's address.
    pub fn for_account(account: &Account, chain_id: u64) -> BlockchainResult<Self> {
        let wallet = Self::from_private_key(account.signing_key().expose_secret(), chain_id)?;
        if wallet.address() != account.address {
            return Err(BlockchainError::Wallet(format!(
                "signing key for wallet {} does not control {}",
                account.id, account.address
            )));
        }
        Ok(wallet)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a fully populated request and return the EIP-2718 encoded envelope.
    pub async fn sign_transaction(&self, request: TransactionRequest) -> BlockchainResult<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope = request
            .with_from(self.address())
            .build(&wallet)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;
        Ok(Bytes::from(envelope.encoded_2718()))
    }
}
