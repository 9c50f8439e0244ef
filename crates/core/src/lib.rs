pub mod actions;
pub mod activity;
pub mod attestation;
pub mod client;
pub mod config;
pub mod encryption;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod phase;
pub mod sync;
pub mod types;
pub mod wallet;

mod time;

#[cfg(test)]
mod testing;

pub use actions::LedgerActions;
pub use activity::{ActivityLog, EventLevel, PipelineEvent};
pub use client::AuctionClient;
pub use config::NetworkConfig;
pub use error::*;
pub use ledger::{ContractReader, ContractWriter, LedgerCall, LedgerReader, LedgerWriter};
pub use orchestrator::{SubmissionOrchestrator, SubmissionState};
pub use phase::*;
pub use sync::{SnapshotStore, StateReader};
pub use types::*;
pub use wallet::{LocalWallet, Session, SessionManager, Wallet, WalletEvent};
