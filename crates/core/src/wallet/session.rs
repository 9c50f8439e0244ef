use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{config::NetworkConfig, error::Error, ledger::LedgerWriter, time::bounded};

use super::{Wallet, WalletEvent};

/// A bound (account, signing capability, contract-write capability) tuple.
///
/// Sessions are never patched: an account or chain change cancels the session
/// and the caller builds a new one. Dropping the last handle cancels it too.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    account: Address,
    chain_id: u64,
    wallet: Arc<dyn Wallet>,
    writer: Arc<dyn LedgerWriter>,
    token: CancellationToken,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl Session {
    pub fn account(&self) -> Address {
        self.inner.account
    }

    pub fn chain_id(&self) -> u64 {
        self.inner.chain_id
    }

    pub fn wallet(&self) -> &Arc<dyn Wallet> {
        &self.inner.wallet
    }

    pub fn writer(&self) -> &Arc<dyn LedgerWriter> {
        &self.inner.writer
    }

    pub fn is_active(&self) -> bool {
        !self.inner.token.is_cancelled()
    }

    /// Resolves once the session has been invalidated or ended.
    pub async fn invalidated(&self) {
        self.inner.token.cancelled().await
    }

    pub fn end(&self) {
        self.inner.token.cancel();
    }

    /// Token for work whose lifetime is bounded by this session.
    pub fn child_token(&self) -> CancellationToken {
        self.inner.token.child_token()
    }
}

pub struct SessionManager {
    wallet: Option<Arc<dyn Wallet>>,
    config: Arc<NetworkConfig>,
}

impl SessionManager {
    pub fn new(wallet: Option<Arc<dyn Wallet>>, config: Arc<NetworkConfig>) -> Self {
        Self { wallet, config }
    }

    pub async fn connect(&self) -> Result<Session, Error> {
        let wallet = self.wallet.clone().ok_or_else(|| Error::WalletUnavailable {
            reason: "no wallet capability present".to_string(),
        })?;
        let limit = self.config.call_timeout;

        // Subscribe first so a change racing the handshake still invalidates.
        let events = wallet.subscribe();

        let accounts = bounded(limit, "account authorization", wallet.request_accounts())
            .await?
            .map_err(|err| Error::WalletUnavailable {
                reason: err.to_string(),
            })?;
        let Some(&account) = accounts.first() else {
            return Err(Error::WalletUnavailable {
                reason: "wallet authorized no accounts".to_string(),
            });
        };

        let chain_id = self.ensure_chain(wallet.as_ref()).await?;

        let writer = wallet.ledger_writer(account, &self.config);
        let token = CancellationToken::new();
        tokio::spawn(watch_wallet(events, token.clone()));

        info!(%account, chain_id, "wallet session bound");

        Ok(Session {
            inner: Arc::new(SessionInner {
                account,
                chain_id,
                wallet,
                writer,
                token,
            }),
        })
    }

    async fn ensure_chain(&self, wallet: &dyn Wallet) -> Result<u64, Error> {
        let limit = self.config.call_timeout;
        let expected = self.config.chain_id;

        let actual = read_chain_id(wallet, limit).await?;
        if actual == expected {
            return Ok(actual);
        }

        if !self.config.switch_network {
            return Err(Error::NetworkMismatch { expected, actual });
        }

        warn!(expected, actual, "wrong wallet network, requesting switch");
        bounded(limit, "network switch", wallet.switch_chain(expected))
            .await?
            .map_err(Error::NetworkSwitchRejected)?;

        let actual = read_chain_id(wallet, limit).await?;
        if actual != expected {
            return Err(Error::NetworkMismatch { expected, actual });
        }
        Ok(actual)
    }
}

async fn read_chain_id(wallet: &dyn Wallet, limit: std::time::Duration) -> Result<u64, Error> {
    bounded(limit, "chain identity", wallet.chain_id())
        .await?
        .map_err(|err| Error::WalletUnavailable {
            reason: err.to_string(),
        })
}

async fn watch_wallet(mut events: broadcast::Receiver<WalletEvent>, token: CancellationToken) {
    let reason = tokio::select! {
        _ = token.cancelled() => return,
        event = events.recv() => match event {
            Ok(event) => format!("{event:?}"),
            Err(RecvError::Lagged(n)) => format!("missed {n} wallet events"),
            Err(RecvError::Closed) => "wallet event channel closed".to_string(),
        },
    };
    debug!(%reason, "invalidating wallet session");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{error::ErrorKind, testing::MockWallet};

    fn config() -> Arc<NetworkConfig> {
        Arc::new(NetworkConfig::sepolia(Address::repeat_byte(0xaa)))
    }

    #[tokio::test]
    async fn binds_first_authorized_account() {
        let wallet = Arc::new(MockWallet::new(config().chain_id));
        let manager = SessionManager::new(Some(wallet.clone()), config());

        let session = manager.connect().await.expect("connects");
        assert_eq!(session.account(), wallet.address());
        assert_eq!(session.chain_id(), config().chain_id);
        assert!(session.is_active());
    }

    #[tokio::test]
    async fn missing_wallet_is_unavailable() {
        let manager = SessionManager::new(None, config());
        let err = manager.connect().await.err().expect("fails");
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
    }

    #[tokio::test]
    async fn wrong_chain_without_switch_is_mismatch() {
        let mut cfg = NetworkConfig::sepolia(Address::repeat_byte(0xaa));
        cfg.switch_network = false;
        let wallet = Arc::new(MockWallet::new(1));
        let manager = SessionManager::new(Some(wallet.clone()), Arc::new(cfg));

        let err = manager.connect().await.err().expect("fails");
        let Error::NetworkMismatch { expected, actual } = err else {
            panic!("expected a network mismatch, got {err:?}");
        };
        assert_eq!((expected, actual), (11_155_111, 1));
        assert_eq!(wallet.switch_requests(), 0);
    }

    #[tokio::test]
    async fn rejected_switch_surfaces_as_switch_rejected() {
        let wallet = Arc::new(MockWallet::new(1).rejecting_switch());
        let manager = SessionManager::new(Some(wallet.clone()), config());

        let err = manager.connect().await.err().expect("fails");
        assert_eq!(err.kind(), ErrorKind::NetworkSwitchRejected);
        assert_eq!(wallet.switch_requests(), 1);
    }

    #[tokio::test]
    async fn accepted_switch_binds_session() {
        let wallet = Arc::new(MockWallet::new(1));
        let manager = SessionManager::new(Some(wallet.clone()), config());

        let session = manager.connect().await.expect("switches then connects");
        assert_eq!(session.chain_id(), config().chain_id);
        assert_eq!(wallet.switch_requests(), 1);
    }

    #[tokio::test]
    async fn account_change_invalidates_session() {
        let wallet = Arc::new(MockWallet::new(config().chain_id));
        let manager = SessionManager::new(Some(wallet.clone()), config());
        let session = manager.connect().await.expect("connects");
        let child = session.child_token();

        wallet.emit(WalletEvent::AccountsChanged(vec![Address::repeat_byte(1)]));

        tokio::time::timeout(Duration::from_secs(1), session.invalidated())
            .await
            .expect("session invalidated");
        assert!(!session.is_active());
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn dropping_session_cancels_its_work() {
        let wallet = Arc::new(MockWallet::new(config().chain_id));
        let manager = SessionManager::new(Some(wallet), config());
        let session = manager.connect().await.expect("connects");
        let child = session.child_token();

        drop(session);
        assert!(child.is_cancelled());
    }
}
