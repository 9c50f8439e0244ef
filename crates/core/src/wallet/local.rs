use std::sync::Arc;

use alloy::{
    primitives::{Address, Signature},
    providers::Provider,
    signers::{Signer, local::PrivateKeySigner},
    sol_types::{Eip712Domain, SolStruct},
};
use async_trait::async_trait;
use sealbid_abi::PublicKey;
use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    config::NetworkConfig,
    error::WalletError,
    ledger::{ContractWriter, LedgerWriter},
};

use super::{Wallet, WalletEvent};

const EVENT_CAPACITY: usize = 16;

/// Wallet backed by a private key and an rpc provider. The provider is expected
/// to carry a wallet filler for the same key so that contract writes are signed.
pub struct LocalWallet<P>
where
    P: Provider + Clone,
{
    provider: P,
    signer: PrivateKeySigner,
    events: broadcast::Sender<WalletEvent>,
}

impl<P> LocalWallet<P>
where
    P: Provider + Clone,
{
    pub fn new(provider: P, signer: PrivateKeySigner) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            signer,
            events,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Forwards an external account or chain change to subscribed sessions.
    pub fn notify(&self, event: WalletEvent) {
        if let Err(err) = self.events.send(event) {
            debug!(event = ?err.0, "no session subscribed to wallet events");
        }
    }
}

#[async_trait]
impl<P> Wallet for LocalWallet<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.signer.address()])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn switch_chain(&self, _chain_id: u64) -> Result<(), WalletError> {
        Err(WalletError::Unsupported(
            "a local key wallet is bound to its rpc endpoint",
        ))
    }

    async fn sign_typed_data(
        &self,
        account: Address,
        domain: &Eip712Domain,
        binding: &PublicKey,
    ) -> Result<Signature, WalletError> {
        if account != self.signer.address() {
            let reason = format!("account {account} is not held");
            return Err(WalletError::Rejected(reason));
        }
        let hash = binding.eip712_signing_hash(domain);
        Ok(self.signer.sign_hash(&hash).await?)
    }

    fn ledger_writer(&self, _account: Address, config: &NetworkConfig) -> Arc<dyn LedgerWriter> {
        Arc::new(
            ContractWriter::new(self.provider.clone(), config.contract)
                .with_gas_limits(config.bid_gas_limit, config.finalize_gas_limit),
        )
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
