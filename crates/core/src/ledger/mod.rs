//! Seams to the auction contract. Reads and writes are separate traits so an
//! observer can hold a reader without any signing capability.

pub mod contract;

use std::fmt;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::{
    error::{LedgerError, WriteError},
    types::{
        bid::BidPayload,
        primitives::{BlockNumber, Wei},
        snapshot::{AdminInfo, AuctionFacts},
    },
};

pub use contract::{ContractReader, ContractWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidderFacts {
    pub deposit: Wei,
    pub has_bid: bool,
    pub cancelled: bool,
}

#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn auction_facts(&self) -> Result<AuctionFacts, LedgerError>;

    async fn block_number(&self) -> Result<BlockNumber, LedgerError>;

    /// `None` when the contract reports no estimate.
    async fn estimated_end_time(&self) -> Result<Option<u64>, LedgerError>;

    async fn min_bid_deposit(&self) -> Result<Wei, LedgerError>;

    async fn bidder_facts(&self, account: Address) -> Result<BidderFacts, LedgerError>;

    async fn pending_refund(&self, account: Address) -> Result<Wei, LedgerError>;

    async fn round_bidders(&self) -> Result<Vec<Address>, LedgerError>;

    async fn admin_info(&self) -> Result<AdminInfo, LedgerError>;
}

#[derive(Debug)]
pub enum LedgerCall {
    SubmitBid { payload: BidPayload, value: Wei },
    CancelBid,
    ClaimRefund,
    RequestFinalize,
    Pause,
    Unpause,
    UpdateBeneficiary(Address),
    UpdateFeeCollector(Address),
    TransferOwnership(Address),
    WithdrawFees,
}

impl LedgerCall {
    pub fn requires_owner(&self) -> bool {
        matches!(
            self,
            Self::Pause
                | Self::Unpause
                | Self::UpdateBeneficiary(_)
                | Self::UpdateFeeCollector(_)
                | Self::TransferOwnership(_)
                | Self::WithdrawFees
        )
    }
}

impl fmt::Display for LedgerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubmitBid { .. } => f.write_str("submit bid"),
            Self::CancelBid => f.write_str("cancel bid"),
            Self::ClaimRefund => f.write_str("claim refund"),
            Self::RequestFinalize => f.write_str("request finalize"),
            Self::Pause => f.write_str("pause auction"),
            Self::Unpause => f.write_str("unpause auction"),
            Self::UpdateBeneficiary(to) => write!(f, "update beneficiary to {to}"),
            Self::UpdateFeeCollector(to) => write!(f, "update fee collector to {to}"),
            Self::TransferOwnership(to) => write!(f, "transfer ownership to {to}"),
            Self::WithdrawFees => f.write_str("withdraw fees"),
        }
    }
}

/// A write has two observable outcomes: included or rejected. `send` returns
/// once the transaction is broadcast; it cannot be recalled after that.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn send(&self, call: LedgerCall) -> Result<B256, WriteError>;

    async fn confirm(&self, tx_hash: B256) -> Result<(), WriteError>;
}
