use std::{fmt, sync::Arc};

use alloy::{
    primitives::{Address, utils::format_ether},
    providers::DynProvider,
};
use eyre::Result;
use sealbid_core::{
    ContractReader, NetworkConfig, StateReader,
    types::{AuctionView, Wei},
};

pub fn state_reader(
    provider: DynProvider,
    config: Arc<NetworkConfig>,
    account: Option<Address>,
) -> StateReader {
    let ledger = Arc::new(ContractReader::new(provider, config.contract));
    let reader = StateReader::new(ledger, config);
    match account {
        Some(account) => reader.with_account(account),
        None => reader,
    }
}

pub async fn status(
    provider: DynProvider,
    config: Arc<NetworkConfig>,
    account: Option<Address>,
) -> Result<AuctionView> {
    Ok(state_reader(provider, config, account).poll().await?)
}

pub fn render(view: &AuctionView) -> String {
    StatusReport(view).to_string()
}

/// Human-readable multi-line view of one poll.
pub struct StatusReport<'a>(pub &'a AuctionView);

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auction = &self.0.auction;
        let display = &self.0.display;
        let current = auction.current_block.as_u64();
        let end = auction.end_block.as_u64();

        writeln!(f, "round            {}", auction.round.as_u64())?;
        writeln!(f, "phase            {}", display.phase)?;
        writeln!(f, "block            {current} / end {end}")?;
        writeln!(
            f,
            "remaining        {} blocks (~{})",
            display.blocks_remaining, display.countdown
        )?;
        writeln!(f, "progress         {:.1}%", display.progress)?;
        if let Some(end) = auction.estimated_end {
            writeln!(f, "estimated end    {}", format_utc(end))?;
        }
        writeln!(f, "min deposit      {} ETH", eth(auction.min_deposit))?;
        writeln!(f, "max deposit      {} ETH", eth(auction.max_deposit))?;
        writeln!(f, "valid bidders    {}", auction.valid_bidders)?;
        match auction.leading_bidder {
            Some(leader) => writeln!(f, "leading bidder   {leader}")?,
            None => writeln!(f, "leading bidder   -")?,
        }
        writeln!(f, "decryption       {:?}", display.decryption)?;

        if let Some(bidder) = &self.0.bidder {
            writeln!(f, "account          {}", bidder.account)?;
            match &bidder.record {
                Some(record) => {
                    let bid = if record.cancelled {
                        "cancelled"
                    } else if record.has_bid {
                        "placed"
                    } else {
                        "none"
                    };
                    writeln!(f, "  bid            {bid}")?;
                    writeln!(f, "  deposit        {} ETH", eth(record.deposit))?;
                    writeln!(f, "  refund         {} ETH", eth(record.pending_refund))?;
                }
                None => writeln!(f, "  bidder record unavailable")?,
            }
            if let Some(bidders) = &bidder.round_bidders {
                writeln!(f, "  round bidders  {}", bidders.len())?;
            }
        }

        if let Some(admin) = &self.0.admin {
            writeln!(f, "paused           {}", admin.paused)?;
            writeln!(f, "owner            {}", admin.owner)?;
            writeln!(f, "beneficiary      {}", admin.beneficiary)?;
            writeln!(f, "fee collector    {}", admin.fee_collector)?;
            writeln!(f, "collected fees   {} ETH", eth(admin.collected_fees))?;
        }
        Ok(())
    }
}

fn eth(amount: Wei) -> String {
    format_ether(amount.as_u256())
}

/// Formats unix seconds as `YYYY-MM-DD HH:MM:SS UTC`.
fn format_utc(unix: u64) -> String {
    let (year, month, day) = civil_from_days(unix / 86_400);
    let secs = unix % 86_400;
    let (hours, minutes, seconds) = (secs / 3_600, secs / 60 % 60, secs % 60);
    format!("{year:04}-{month:02}-{day:02} {hours:02}:{minutes:02}:{seconds:02} UTC")
}

// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
