use std::sync::Arc;

use alloy::{primitives::B256, providers::DynProvider, signers::local::PrivateKeySigner};
use eyre::Result;
use sealbid_core::{
    ActivityLog, LedgerActions, LocalWallet, NetworkConfig, SessionManager, SnapshotStore,
    sync::RefreshTrigger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CancelBid,
    ClaimRefund,
    Finalize,
}

/// Binds a session to the local key and sends one write. `provider` must sign
/// with `signer`.
pub async fn run(
    provider: DynProvider,
    signer: PrivateKeySigner,
    config: Arc<NetworkConfig>,
    action: Action,
) -> Result<B256> {
    let wallet = Arc::new(LocalWallet::new(provider, signer));
    let session = SessionManager::new(Some(wallet), config.clone())
        .connect()
        .await?;

    let actions = LedgerActions::new(
        session,
        config,
        SnapshotStore::new(),
        ActivityLog::new(),
        RefreshTrigger::new(),
    );

    let tx_hash = match action {
        Action::CancelBid => actions.cancel_bid().await?,
        Action::ClaimRefund => actions.claim_refund().await?,
        Action::Finalize => actions.request_finalize().await?,
    };
    Ok(tx_hash)
}
