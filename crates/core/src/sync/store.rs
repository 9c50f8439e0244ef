use std::sync::Arc;

use tokio::sync::watch;

use crate::types::snapshot::AuctionView;

pub type ViewReceiver = watch::Receiver<Option<Arc<AuctionView>>>;

/// Latest complete view. Replaced wholesale, so readers see either the old
/// view or the new one and never a mix.
#[derive(Clone)]
pub struct SnapshotStore {
    tx: Arc<watch::Sender<Option<Arc<AuctionView>>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn replace(&self, view: AuctionView) -> Arc<AuctionView> {
        let view = Arc::new(view);
        self.tx.send_replace(Some(view.clone()));
        view
    }

    pub fn latest(&self) -> Option<Arc<AuctionView>> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> ViewReceiver {
        self.tx.subscribe()
    }
}
