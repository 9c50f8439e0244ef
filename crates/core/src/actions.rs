//! Non-bid writes: cancelling, refunds, finalization and owner administration.

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use tracing::info;

use crate::{
    activity::ActivityLog,
    config::NetworkConfig,
    error::Error,
    ledger::LedgerCall,
    sync::{RefreshTrigger, SnapshotStore},
    time::bounded,
    wallet::Session,
};

pub struct LedgerActions {
    session: Session,
    config: Arc<NetworkConfig>,
    store: SnapshotStore,
    activity: ActivityLog,
    refresh: RefreshTrigger,
}

impl LedgerActions {
    pub fn new(
        session: Session,
        config: Arc<NetworkConfig>,
        store: SnapshotStore,
        activity: ActivityLog,
        refresh: RefreshTrigger,
    ) -> Self {
        Self {
            session,
            config,
            store,
            activity,
            refresh,
        }
    }

    pub async fn cancel_bid(&self) -> Result<B256, Error> {
        self.execute(LedgerCall::CancelBid).await
    }

    pub async fn claim_refund(&self) -> Result<B256, Error> {
        self.execute(LedgerCall::ClaimRefund).await
    }

    pub async fn request_finalize(&self) -> Result<B256, Error> {
        self.execute(LedgerCall::RequestFinalize).await
    }

    pub async fn pause(&self) -> Result<B256, Error> {
        self.execute(LedgerCall::Pause).await
    }

    pub async fn unpause(&self) -> Result<B256, Error> {
        self.execute(LedgerCall::Unpause).await
    }

    pub async fn update_beneficiary(&self, to: Address) -> Result<B256, Error> {
        self.execute(LedgerCall::UpdateBeneficiary(to)).await
    }

    pub async fn update_fee_collector(&self, to: Address) -> Result<B256, Error> {
        self.execute(LedgerCall::UpdateFeeCollector(to)).await
    }

    pub async fn transfer_ownership(&self, owner: Address) -> Result<B256, Error> {
        self.execute(LedgerCall::TransferOwnership(owner)).await
    }

    pub async fn withdraw_fees(&self) -> Result<B256, Error> {
        self.execute(LedgerCall::WithdrawFees).await
    }

    /// Sends `call`, waits for inclusion, then requests a refresh. Every outcome
    /// leaves one activity entry.
    pub async fn execute(&self, call: LedgerCall) -> Result<B256, Error> {
        let action = call.to_string();
        let result = match self.check(&call) {
            Ok(()) => self.send_and_confirm(call).await,
            Err(err) => Err(err),
        };

        let label = capitalize(&action);
        match &result {
            Ok(tx_hash) => {
                info!(tx = %tx_hash, %action, "ledger action confirmed");
                let message = format!("{label} confirmed");
                self.activity.success(message, Some(*tx_hash));
                self.refresh.request();
            }
            Err(err) => {
                let message = format!("{label} failed: {err}");
                self.activity.error(message, err.tx_hash());
            }
        }
        result
    }

    fn check(&self, call: &LedgerCall) -> Result<(), Error> {
        let unmet = Error::PreconditionUnmet;
        if !self.session.is_active() {
            return Err(unmet("wallet session is not active"));
        }
        match call {
            LedgerCall::SubmitBid { .. } => {
                return Err(unmet("bids go through the submission pipeline"));
            }
            LedgerCall::UpdateBeneficiary(to)
            | LedgerCall::UpdateFeeCollector(to)
            | LedgerCall::TransferOwnership(to)
                if to.is_zero() =>
            {
                return Err(unmet("target address is zero"));
            }
            _ => {}
        }
        if call.requires_owner() && !self.is_owner() {
            return Err(unmet("session account is not the auction owner"));
        }
        Ok(())
    }

    /// Only trusts the latest snapshot; unknown ownership counts as not owner.
    fn is_owner(&self) -> bool {
        let account = self.session.account();
        self.store
            .latest()
            .and_then(|view| view.admin.clone())
            .is_some_and(|admin| admin.is_owner(account))
    }

    async fn send_and_confirm(&self, call: LedgerCall) -> Result<B256, Error> {
        let writer = self.session.writer();
        let limit = self.config.call_timeout;
        let tx_hash = bounded(limit, "transaction send", writer.send(call))
            .await?
            .map_err(|err| err.into_rejection(None))?;
        self.activity.pending("Transaction sent", Some(tx_hash));

        let limit = self.config.confirmation_timeout;
        let confirmation = bounded(limit, "transaction confirmation", writer.confirm(tx_hash));
        tokio::select! {
            biased;
            _ = self.session.invalidated() => Err(Error::SessionInvalidated),
            confirmed = confirmation => {
                confirmed?.map_err(|err| err.into_rejection(Some(tx_hash)))?;
                Ok(tx_hash)
            }
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
