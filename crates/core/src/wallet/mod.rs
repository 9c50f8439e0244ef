pub mod local;
pub mod session;

use std::sync::Arc;

use alloy::{
    primitives::{Address, Signature},
    sol_types::Eip712Domain,
};
use async_trait::async_trait;
use sealbid_abi::PublicKey;
use tokio::sync::broadcast;

use crate::{config::NetworkConfig, error::WalletError, ledger::LedgerWriter};

pub use local::LocalWallet;
pub use session::{Session, SessionManager};

/// Notifications that make the current authorization stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Disconnected,
}

/// The injected wallet: authorization, chain identity, typed-data signing and a
/// write path to the contract.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    async fn sign_typed_data(
        &self,
        account: Address,
        domain: &Eip712Domain,
        binding: &PublicKey,
    ) -> Result<Signature, WalletError>;

    fn ledger_writer(&self, account: Address, config: &NetworkConfig) -> Arc<dyn LedgerWriter>;

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}
