use alloy::primitives::{Address, U256};

use crate::phase::{AuctionPhase, PhaseView};

use super::primitives::{BlockNumber, Round, Wei};

/// Raw auction facts as returned by `getAuctionInfo()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionFacts {
    pub round: Round,
    pub end_block: BlockNumber,
    pub phase_ordinal: u64,
    pub max_deposit: Wei,
    pub leading_bidder: Option<Address>,
    pub valid_bidders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionSnapshot {
    pub round: Round,
    pub phase: AuctionPhase,
    pub leading_bidder: Option<Address>,
    pub valid_bidders: u64,
    pub end_block: BlockNumber,
    pub current_block: BlockNumber,
    pub min_deposit: Wei,
    pub max_deposit: Wei,
    /// Unix seconds.
    pub estimated_end: Option<u64>,
}

impl AuctionSnapshot {
    pub fn new(
        facts: AuctionFacts,
        current_block: BlockNumber,
        min_deposit: Wei,
        estimated_end: Option<u64>,
    ) -> Self {
        Self {
            round: facts.round,
            phase: AuctionPhase::from_ordinal(facts.phase_ordinal),
            leading_bidder: facts.leading_bidder,
            valid_bidders: facts.valid_bidders,
            end_block: facts.end_block,
            current_block,
            min_deposit,
            max_deposit: facts.max_deposit,
            estimated_end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BidderRecord {
    pub deposit: Wei,
    pub has_bid: bool,
    pub cancelled: bool,
    pub pending_refund: Wei,
}

impl BidderRecord {
    /// A cancelled flag without a bid is not a state the contract can produce;
    /// treat it as no bid at all.
    pub fn new(deposit: Wei, has_bid: bool, cancelled: bool, pending_refund: Wei) -> Self {
        Self {
            deposit,
            has_bid,
            cancelled: cancelled && has_bid,
            pending_refund,
        }
    }

    pub fn has_active_bid(&self) -> bool {
        self.has_bid && !self.cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderState {
    pub account: Address,
    pub record: Option<BidderRecord>,
    pub round_bidders: Option<Vec<Address>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminInfo {
    pub paused: bool,
    pub owner: Address,
    pub beneficiary: Address,
    pub fee_collector: Address,
    pub collected_fees: Wei,
}

impl AdminInfo {
    pub fn is_owner(&self, account: Address) -> bool {
        self.owner == account
    }
}

/// Everything one poll produced. Built whole, then swapped in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionView {
    pub auction: AuctionSnapshot,
    pub display: PhaseView,
    pub bidder: Option<BidderState>,
    pub admin: Option<AdminInfo>,
}

pub(crate) fn non_zero(address: Address) -> Option<Address> {
    if address.is_zero() {
        None
    } else {
        Some(address)
    }
}

pub(crate) fn non_zero_timestamp(value: U256) -> Option<u64> {
    if value.is_zero() {
        None
    } else {
        Some(value.saturating_to::<u64>())
    }
}
