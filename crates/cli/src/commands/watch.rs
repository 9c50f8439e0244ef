use std::sync::Arc;

use alloy::{primitives::Address, providers::DynProvider};
use eyre::Result;
use sealbid_core::{
    ActivityLog, NetworkConfig, SnapshotStore,
    sync::{Poller, RefreshTrigger},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::status::{render, state_reader};

/// Polls until Ctrl-C, printing every new view.
pub async fn watch(
    provider: DynProvider,
    config: Arc<NetworkConfig>,
    account: Option<Address>,
) -> Result<()> {
    let store = SnapshotStore::new();
    let mut views = store.subscribe();
    let poller = Poller::new(
        state_reader(provider, config.clone(), account),
        store,
        ActivityLog::new(),
        RefreshTrigger::new(),
        config.poll_interval,
    );
    let _handle = poller.spawn(CancellationToken::new());

    info!(contract = %config.contract, period = ?config.poll_interval, "watching auction");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if let Some(view) = view {
                    println!("{}", render(&view));
                }
            }
        }
    }
    Ok(())
}
