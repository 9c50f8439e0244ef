use std::sync::Arc;

use alloy::primitives::B256;

use crate::{
    actions::LedgerActions,
    activity::ActivityLog,
    attestation::AttestationSigner,
    config::NetworkConfig,
    encryption::{EncryptionBackend, EncryptionService, initialize},
    error::Error,
    ledger::LedgerReader,
    orchestrator::{SubmissionOrchestrator, SubmissionState},
    sync::{Poller, PollerHandle, RefreshTrigger, SnapshotStore, StateReader, store::ViewReceiver},
    types::{
        bid::{BidRequest, SubmissionReceipt},
        snapshot::AuctionView,
    },
    wallet::Session,
};

/// Everything one bound session needs: live auction view, bid pipeline, ledger
/// actions and the activity log. Polling stops when the session ends or the
/// client is dropped.
pub struct AuctionClient {
    session: Session,
    config: Arc<NetworkConfig>,
    store: SnapshotStore,
    activity: ActivityLog,
    refresh: RefreshTrigger,
    signer: Arc<AttestationSigner>,
    orchestrator: SubmissionOrchestrator,
    actions: LedgerActions,
    poller: PollerHandle,
}

impl AuctionClient {
    /// Must be called from within a tokio runtime; starts polling immediately.
    pub fn new(
        session: Session,
        ledger: Arc<dyn LedgerReader>,
        config: Arc<NetworkConfig>,
    ) -> Self {
        let store = SnapshotStore::new();
        let activity = ActivityLog::new();
        let refresh = RefreshTrigger::new();

        let reader = StateReader::new(ledger, config.clone()).with_account(session.account());
        let poller = Poller::new(
            reader,
            store.clone(),
            activity.clone(),
            refresh.clone(),
            config.poll_interval,
        )
        .spawn(session.child_token());

        let signer = Arc::new(AttestationSigner::new(
            session.clone(),
            config.signing_domain(),
            config.call_timeout,
        ));
        let orchestrator = SubmissionOrchestrator::new(
            session.clone(),
            config.clone(),
            signer.clone(),
            activity.clone(),
            refresh.clone(),
        );
        let actions = LedgerActions::new(
            session.clone(),
            config.clone(),
            store.clone(),
            activity.clone(),
            refresh.clone(),
        );

        Self {
            session,
            config,
            store,
            activity,
            refresh,
            signer,
            orchestrator,
            actions,
            poller,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Brings up the encryption service through `backend` and attaches it.
    pub async fn initialize_encryption(
        &self,
        backend: &dyn EncryptionBackend,
    ) -> Result<B256, Error> {
        let service = initialize(backend, &self.config, &self.activity).await?;
        self.attach_encryption(service).await
    }

    /// Derives the service public key and enables bid submission. Returns the
    /// normalized key.
    pub async fn attach_encryption(
        &self,
        service: Arc<dyn EncryptionService>,
    ) -> Result<B256, Error> {
        let key = match self.signer.derive_public_key(service.as_ref()).await {
            Ok(key) => key,
            Err(err) => {
                self.activity
                    .error(format!("Failed to read encryption public key: {err}"), None);
                return Err(err);
            }
        };
        if self.orchestrator.attach_encryption(service) {
            self.activity.info("Encryption service ready");
        }
        Ok(key)
    }

    pub async fn submit_bid(&self, request: BidRequest) -> Result<SubmissionReceipt, Error> {
        self.orchestrator.submit(request).await
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.orchestrator.state()
    }

    pub fn subscribe_submission(&self) -> tokio::sync::watch::Receiver<SubmissionState> {
        self.orchestrator.subscribe()
    }

    pub fn actions(&self) -> &LedgerActions {
        &self.actions
    }

    pub fn latest(&self) -> Option<Arc<AuctionView>> {
        self.store.latest()
    }

    pub fn subscribe(&self) -> ViewReceiver {
        self.store.subscribe()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn refresh(&self) {
        self.refresh.request();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Ends the session; polling and any in-flight confirmation wait stop.
    pub fn disconnect(&self) {
        self.poller.stop();
        self.session.end();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::Address;

    use super::*;
    use crate::{
        activity::EventLevel,
        error::ErrorKind,
        testing::{MockEncryption, MockReader, MockWallet, session_with, wait_until},
        wallet::WalletEvent,
    };

    async fn client(
        ledger: Arc<MockReader>,
        poll_interval: Duration,
    ) -> (AuctionClient, Arc<MockWallet>) {
        let mut config = NetworkConfig::sepolia(Address::repeat_byte(0x42));
        config.poll_interval = poll_interval;
        let wallet = Arc::new(MockWallet::new(config.chain_id));
        let session = session_with(wallet.clone(), &config).await;
        (AuctionClient::new(session, ledger, Arc::new(config)), wallet)
    }

    fn request() -> BidRequest {
        BidRequest {
            bid_amount: "0.25".into(),
            deposit: "0.01".into(),
        }
    }

    #[tokio::test]
    async fn first_poll_publishes_a_view() {
        let ledger = Arc::new(MockReader::default());
        let (client, wallet) = client(ledger, Duration::from_secs(3_600)).await;
        let mut views = client.subscribe();

        views.wait_for(|view| view.is_some()).await.expect("view");

        let view = client.latest().expect("view");
        let bidder = view.bidder.as_ref().map(|b| b.account);
        assert_eq!(bidder, Some(wallet.address()));
    }

    #[tokio::test]
    async fn successful_bid_triggers_one_extra_poll() {
        let ledger = Arc::new(MockReader::default());
        let (client, _wallet) = client(ledger.clone(), Duration::from_secs(3_600)).await;
        wait_until(|| ledger.core_calls() == 1).await;

        client
            .attach_encryption(Arc::new(MockEncryption::default()))
            .await
            .expect("attached");
        client.submit_bid(request()).await.expect("submitted");

        wait_until(|| ledger.core_calls() == 2).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ledger.core_calls(), 2);
    }

    #[tokio::test]
    async fn failed_poll_keeps_last_view_and_polling_continues() {
        let ledger = Arc::new(MockReader::default());
        let (client, _wallet) = client(ledger.clone(), Duration::from_millis(20)).await;
        wait_until(|| client.latest().is_some()).await;
        let before = client.latest();

        ledger.set_fail_core(true);
        let failed_at = ledger.core_calls();
        wait_until(|| ledger.core_calls() >= failed_at + 2).await;

        assert_eq!(client.latest(), before);
        assert!(client.activity().count(EventLevel::Error) >= 1);
        assert!(client.is_polling());
    }

    #[tokio::test]
    async fn bid_without_encryption_is_refused() {
        let ledger = Arc::new(MockReader::default());
        let (client, _wallet) = client(ledger, Duration::from_secs(3_600)).await;

        let err = client.submit_bid(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionUnmet);
        assert_eq!(client.submission_state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn wallet_change_stops_polling() {
        let ledger = Arc::new(MockReader::default());
        let (client, wallet) = client(ledger, Duration::from_secs(3_600)).await;

        wallet.emit(WalletEvent::Disconnected);

        wait_until(|| !client.is_polling()).await;
        assert!(!client.session().is_active());
    }
}
