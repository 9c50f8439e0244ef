use std::{
    future::Future,
    sync::{Arc, OnceLock},
};

use alloy::primitives::{B256, utils::parse_ether};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    activity::ActivityLog,
    attestation::AttestationSigner,
    config::NetworkConfig,
    encryption::{BidPreparer, EncryptionService},
    error::{Error, ErrorKind},
    ledger::LedgerCall,
    sync::RefreshTrigger,
    time::bounded,
    types::{
        bid::{BidPayload, BidRequest, SubmissionReceipt},
        primitives::Wei,
    },
    wallet::Session,
};

use super::state::SubmissionState;

const NO_ENCRYPTION: &str = "encryption service not initialized";

/// Drives one bid at a time through encrypt, sign, submit and confirm.
///
/// At most one attempt is in flight. A second call while one is running fails
/// with [`Error::AlreadySubmitting`] before touching any external service.
pub struct SubmissionOrchestrator {
    session: Session,
    config: Arc<NetworkConfig>,
    signer: Arc<AttestationSigner>,
    preparer: OnceLock<BidPreparer>,
    activity: ActivityLog,
    refresh: RefreshTrigger,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionOrchestrator {
    pub fn new(
        session: Session,
        config: Arc<NetworkConfig>,
        signer: Arc<AttestationSigner>,
        activity: ActivityLog,
        refresh: RefreshTrigger,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            session,
            config,
            signer,
            preparer: OnceLock::new(),
            activity,
            refresh,
            state,
        }
    }

    /// Returns `false` if a service was already attached.
    pub fn attach_encryption(&self, service: Arc<dyn EncryptionService>) -> bool {
        self.preparer
            .set(BidPreparer::new(service, self.config.call_timeout))
            .is_ok()
    }

    pub fn has_encryption(&self) -> bool {
        self.preparer.get().is_some()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub async fn submit(&self, request: BidRequest) -> Result<SubmissionReceipt, Error> {
        let (attempt, deposit) = match self.begin(&request) {
            Ok(started) => started,
            Err(err) => {
                let message = format!("Bid not submitted: {err}");
                self.activity.error(message, None);
                return Err(err);
            }
        };
        self.activity.pending("Encrypting bid", None);

        let result = self.run(&attempt, &request.bid_amount, deposit).await;
        match &result {
            Ok(receipt) => {
                let tx_hash = receipt.tx_hash;
                attempt.settle(SubmissionState::Succeeded { tx_hash });
                info!(tx = %tx_hash, "bid confirmed");
                self.activity.success("Bid confirmed", Some(tx_hash));
                self.refresh.request();
            }
            Err(err) => {
                let tx_hash = err.tx_hash().or_else(|| attempt.tx_hash());
                attempt.settle(SubmissionState::Failed {
                    kind: err.kind(),
                    reason: err.to_string(),
                    tx_hash,
                });
                let message = format!("Bid submission failed: {err}");
                self.activity.error(message, tx_hash);
            }
        }
        result
    }

    /// Claims the single in-flight slot. No I/O happens here.
    fn begin(&self, request: &BidRequest) -> Result<(Attempt<'_>, Wei), Error> {
        let checked = self.check(request);
        let mut in_flight = false;
        self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                in_flight = true;
                return false;
            }
            if checked.is_err() {
                return false;
            }
            *state = SubmissionState::Encrypting;
            true
        });

        if in_flight {
            return Err(Error::AlreadySubmitting);
        }
        let deposit = checked?;
        let attempt = Attempt {
            state: &self.state,
            settled: false,
        };
        Ok((attempt, deposit))
    }

    fn check(&self, request: &BidRequest) -> Result<Wei, Error> {
        let unmet = Error::PreconditionUnmet;
        if !self.session.is_active() {
            return Err(unmet("wallet session is not active"));
        }
        if !self.has_encryption() {
            return Err(unmet(NO_ENCRYPTION));
        }
        if self.signer.public_key().is_none() {
            return Err(unmet("encryption public key not derived"));
        }
        if request.bid_amount.trim().is_empty() {
            return Err(unmet("bid amount is empty"));
        }
        let deposit = request.deposit.trim();
        if deposit.is_empty() {
            return Err(unmet("deposit is empty"));
        }
        if deposit.starts_with('-') {
            return Err(unmet("deposit is negative"));
        }
        parse_ether(deposit)
            .map(Wei::new)
            .map_err(|_| unmet("deposit is not a valid amount"))
    }

    async fn run(
        &self,
        attempt: &Attempt<'_>,
        amount: &str,
        deposit: Wei,
    ) -> Result<SubmissionReceipt, Error> {
        let preparer = self
            .preparer
            .get()
            .ok_or(Error::PreconditionUnmet(NO_ENCRYPTION))?;
        let account = self.session.account();
        let encryption = preparer.prepare(amount, account, self.config.contract);
        let encrypted = self.while_bound(encryption).await?;

        attempt.enter(SubmissionState::Signing);
        let signing = self.signer.attest(&encrypted.handle);
        let attestation = self.while_bound(signing).await?;

        attempt.enter(SubmissionState::Submitting);
        let writer = self.session.writer();
        let call = LedgerCall::SubmitBid {
            payload: BidPayload::new(encrypted, attestation),
            value: deposit,
        };
        // Never cancelled once started.
        let limit = self.config.call_timeout;
        let tx_hash = bounded(limit, "bid submission", writer.send(call))
            .await?
            .map_err(|err| err.into_rejection(None))?;
        debug!(tx = %tx_hash, "bid transaction broadcast");
        self.activity.pending("Bid transaction sent", Some(tx_hash));

        attempt.enter(SubmissionState::Confirming { tx_hash });
        let limit = self.config.confirmation_timeout;
        self.while_bound(async {
            bounded(limit, "bid confirmation", writer.confirm(tx_hash))
                .await?
                .map_err(|err| err.into_rejection(Some(tx_hash)))
        })
        .await?;

        Ok(SubmissionReceipt { tx_hash, deposit })
    }

    /// Abandons `stage` as soon as the session is invalidated.
    async fn while_bound<T>(
        &self,
        stage: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        tokio::select! {
            biased;
            _ = self.session.invalidated() => Err(Error::SessionInvalidated),
            result = stage => result,
        }
    }
}

/// Holds the in-flight slot. Dropped without settling, it records the attempt
/// as abandoned so the slot is never left claimed.
struct Attempt<'a> {
    state: &'a watch::Sender<SubmissionState>,
    settled: bool,
}

impl Attempt<'_> {
    fn enter(&self, stage: SubmissionState) {
        self.state.send_replace(stage);
    }

    fn tx_hash(&self) -> Option<B256> {
        self.state.borrow().tx_hash()
    }

    fn settle(mut self, terminal: SubmissionState) {
        self.settled = true;
        self.state.send_replace(terminal);
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let tx_hash = self.tx_hash();
        self.state.send_replace(SubmissionState::Failed {
            kind: ErrorKind::Abandoned,
            reason: "submission dropped before completion".to_string(),
            tx_hash,
        });
    }
}
