use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{activity::ActivityLog, error::Error};

use super::{reader::StateReader, store::SnapshotStore};

/// Requests one out-of-cycle poll. Requests made while a poll is running
/// coalesce into a single follow-up poll.
#[derive(Debug, Clone, Default)]
pub struct RefreshTrigger(Arc<Notify>);

impl RefreshTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.notify_one();
    }

    pub(crate) async fn requested(&self) {
        self.0.notified().await
    }
}

pub struct Poller {
    reader: StateReader,
    store: SnapshotStore,
    activity: ActivityLog,
    refresh: RefreshTrigger,
    period: Duration,
}

impl Poller {
    pub fn new(
        reader: StateReader,
        store: SnapshotStore,
        activity: ActivityLog,
        refresh: RefreshTrigger,
        period: Duration,
    ) -> Self {
        Self {
            reader,
            store,
            activity,
            refresh,
            period,
        }
    }

    /// Polls immediately, then every period and on each refresh request, until
    /// `token` is cancelled or the handle is dropped.
    pub fn spawn(self, token: CancellationToken) -> PollerHandle {
        let task = tokio::spawn(self.run(token.clone()));
        PollerHandle { token, task }
    }

    /// One poll. On failure the stored view is left as it was.
    pub async fn tick(&self) -> Result<(), Error> {
        match self.reader.poll().await {
            Ok(view) => {
                self.store.replace(view);
                Ok(())
            }
            Err(err) => {
                let err = Error::StaleDataIgnored {
                    reason: err.to_string(),
                };
                warn!(%err, "poll failed");
                self.activity.error("Failed to fetch auction data", None);
                Err(err)
            }
        }
    }

    async fn run(self, token: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
                _ = self.refresh.requested() => debug!("out-of-cycle refresh"),
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = self.tick() => {}
            }
        }
        debug!("poller stopped");
    }
}

/// Stops the poller when dropped.
pub struct PollerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
        self.task.abort();
    }
}
