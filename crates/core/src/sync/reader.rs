use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{debug, warn};

use crate::{
    config::{FALLBACK_MIN_DEPOSIT, NetworkConfig},
    error::{Error, LedgerError},
    ledger::LedgerReader,
    phase::PhaseView,
    time::bounded,
    types::{
        primitives::Wei,
        snapshot::{AdminInfo, AuctionSnapshot, AuctionView, BidderRecord, BidderState},
    },
};

type Bounded<T> = Result<Result<T, LedgerError>, Error>;

/// Builds one consistent view from several independent, fallible reads.
///
/// The auction facts and block height are required; the estimated end time and
/// minimum deposit fall back to defaults; bidder and admin reads are best effort.
pub struct StateReader {
    ledger: Arc<dyn LedgerReader>,
    account: Option<Address>,
    config: Arc<NetworkConfig>,
}

impl StateReader {
    pub fn new(ledger: Arc<dyn LedgerReader>, config: Arc<NetworkConfig>) -> Self {
        Self {
            ledger,
            account: None,
            config,
        }
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub async fn poll(&self) -> Result<AuctionView, Error> {
        let limit = self.config.call_timeout;
        let ledger = self.ledger.as_ref();

        let (facts, block, estimated_end, min_deposit, bidder, admin) = tokio::join!(
            bounded(limit, "auction facts", ledger.auction_facts()),
            bounded(limit, "block height", ledger.block_number()),
            bounded(limit, "estimated end time", ledger.estimated_end_time()),
            bounded(limit, "minimum deposit", ledger.min_bid_deposit()),
            self.poll_bidder(),
            self.poll_admin(),
        );

        let facts = required(facts)?;
        let current_block = required(block)?;
        let estimated_end = fallback(estimated_end, "estimated end time").unwrap_or(None);
        let default_deposit = Wei::new(FALLBACK_MIN_DEPOSIT);
        let min_deposit = fallback(min_deposit, "minimum deposit").unwrap_or(default_deposit);

        let auction = AuctionSnapshot::new(facts, current_block, min_deposit, estimated_end);
        let display = PhaseView::derive(&auction, self.config.timing());
        debug!(
            round = auction.round.as_u64(),
            phase = %auction.phase,
            block = current_block.as_u64(),
            "auction state polled"
        );

        Ok(AuctionView {
            auction,
            display,
            bidder,
            admin,
        })
    }

    async fn poll_bidder(&self) -> Option<BidderState> {
        let account = self.account?;
        let limit = self.config.call_timeout;
        let ledger = self.ledger.as_ref();

        let (facts, refund, round_bidders) = tokio::join!(
            bounded(limit, "bidder record", ledger.bidder_facts(account)),
            bounded(limit, "pending refund", ledger.pending_refund(account)),
            bounded(limit, "round bidders", ledger.round_bidders()),
        );

        let facts = fallback(facts, "bidder record");
        let refund = fallback(refund, "pending refund");
        let record = match (facts, refund) {
            (Some(facts), Some(refund)) => {
                Some(BidderRecord::new(facts.deposit, facts.has_bid, facts.cancelled, refund))
            }
            _ => None,
        };

        Some(BidderState {
            account,
            record,
            round_bidders: fallback(round_bidders, "round bidders"),
        })
    }

    async fn poll_admin(&self) -> Option<AdminInfo> {
        let admin = bounded(
            self.config.call_timeout,
            "admin info",
            self.ledger.admin_info(),
        )
        .await;
        fallback(admin, "admin info")
    }
}

fn required<T>(read: Bounded<T>) -> Result<T, Error> {
    Ok(read??)
}

fn fallback<T>(read: Bounded<T>, what: &'static str) -> Option<T> {
    match required(read) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, "{what} read failed");
            None
        }
    }
}
